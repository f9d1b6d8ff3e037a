//! Line-oriented terminal prompts.
//!
//! Every prompt shows the current value in brackets; an empty answer keeps it. Invalid answers
//! are reported and asked again. End of input is an error so the caller can stop cleanly.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use registry_core::constants::DATE_FORMAT;
use registry_core::record::{BoundedCount, Choice, CtcaeGrade, LabelList, Toxicity};
use std::io::{BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Writes a line of output.
    pub fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(anyhow!("input closed"));
        }
        Ok(line.trim().to_owned())
    }

    pub fn text(&mut self, label: &str, current: &str) -> Result<String> {
        let answer = self.ask(&format!("{label} [{current}]: "))?;
        Ok(if answer.is_empty() {
            current.to_owned()
        } else {
            answer
        })
    }

    pub fn date(&mut self, label: &str, current: NaiveDate) -> Result<NaiveDate> {
        loop {
            let current_text = current.format(DATE_FORMAT).to_string();
            let answer = self.ask(&format!("{label} (YYYY-MM-DD) [{current_text}]: "))?;
            if answer.is_empty() {
                return Ok(current);
            }
            match NaiveDate::parse_from_str(&answer, DATE_FORMAT) {
                Ok(date) => return Ok(date),
                Err(_) => self.say("  Please enter a date as YYYY-MM-DD.")?,
            }
        }
    }

    pub fn count(&mut self, label: &str, current: BoundedCount) -> Result<BoundedCount> {
        loop {
            let answer = self.ask(&format!("{label} (0-{}) [{current}]: ", BoundedCount::MAX))?;
            if answer.is_empty() {
                return Ok(current);
            }
            let parsed = answer
                .parse::<u32>()
                .map_err(|e| e.to_string())
                .and_then(BoundedCount::new);
            match parsed {
                Ok(count) => return Ok(count),
                Err(_) => self.say(format!(
                    "  Please enter a whole number from 0 to {}.",
                    BoundedCount::MAX
                ))?,
            }
        }
    }

    /// Single choice from a closed set. Accepts the option number or its label.
    pub fn choice<T: Choice>(&mut self, label: &str, current: T) -> Result<T> {
        self.say(format!("{label}:"))?;
        for (i, option) in T::OPTIONS.iter().enumerate() {
            let mark = if *option == current { '*' } else { ' ' };
            self.say(format!("  {mark}{}) {}", i + 1, option.label()))?;
        }

        loop {
            let answer = self.ask(&format!("{label} [{}]: ", current.label()))?;
            if answer.is_empty() {
                return Ok(current);
            }
            let picked = pick_number(&answer, T::OPTIONS.len())
                .map(|i| T::OPTIONS[i])
                .or_else(|| T::from_label(&answer));
            match picked {
                Some(option) => return Ok(option),
                None => self.say("  Please pick one of the listed options.")?,
            }
        }
    }

    /// CTCAE grade for one toxicity, with the help text for each admissible grade.
    pub fn grade(&mut self, toxicity: Toxicity, current: CtcaeGrade) -> Result<CtcaeGrade> {
        let grades = toxicity.grades();
        self.say(format!("{}:", toxicity.title()))?;
        for (i, grade) in grades.iter().enumerate() {
            let mark = if *grade == current { '*' } else { ' ' };
            let help = toxicity.description(*grade).unwrap_or_default();
            self.say(format!("  {mark}{}) {}: {help}", i + 1, toxicity.label(*grade)))?;
        }

        loop {
            let answer = self.ask(&format!(
                "{} [{}]: ",
                toxicity.title(),
                toxicity.label(current)
            ))?;
            if answer.is_empty() {
                return Ok(current);
            }
            let picked = pick_number(&answer, grades.len())
                .map(|i| grades[i])
                .or_else(|| toxicity.parse_label(&answer));
            match picked {
                Some(grade) => return Ok(grade),
                None => self.say("  Please pick one of the listed grades.")?,
            }
        }
    }

    /// Multiple choice. Answers are option numbers separated by commas; `-` clears the list.
    pub fn multi(
        &mut self,
        label: &str,
        options: &[(&str, Option<&str>)],
        current: &LabelList,
    ) -> Result<LabelList> {
        self.say(format!("{label}:"))?;
        for (i, (option, help)) in options.iter().enumerate() {
            let mark = if current.contains(option) { '*' } else { ' ' };
            match help {
                Some(help) => self.say(format!("  {mark}{}) {option}: {help}", i + 1))?,
                None => self.say(format!("  {mark}{}) {option}", i + 1))?,
            }
        }

        loop {
            let answer = self.ask(&format!("{label} (e.g. 1,3; '-' for none) [{current}]: "))?;
            if answer.is_empty() {
                return Ok(current.clone());
            }
            if answer == "-" {
                return Ok(LabelList::default());
            }
            let picked: Option<Vec<&str>> = answer
                .split(',')
                .map(|part| pick_number(part, options.len()).map(|i| options[i].0))
                .collect();
            match picked {
                Some(labels) => return Ok(LabelList::new(labels)),
                None => self.say("  Please list option numbers separated by commas.")?,
            }
        }
    }
}

/// Parses a 1-based option number into an index.
fn pick_number(answer: &str, len: usize) -> Option<usize> {
    let n = answer.trim().parse::<usize>().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

/// Pairs plain option labels with no help text.
pub fn plain(options: &[&'static str]) -> Vec<(&'static str, Option<&'static str>)> {
    options.iter().map(|o| (*o, None)).collect()
}
