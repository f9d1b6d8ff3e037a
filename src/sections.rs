//! The data-entry form, section by section.

use crate::prompt::{Prompter, plain};
use anyhow::Result;
use registry_core::record::choices::{
    EXTREMITY_STAGES, HISTOLOGY_OPTIONS, NON_EXTREMITY_STAGE, NON_RETROPERITONEAL_STAGE,
    RETROPERITONEUM_STAGES, SYSTEMIC_TREATMENT_OPTIONS,
};
use registry_core::record::{Event, FormInput, SideEffectSection, StagingSystem, Toxicity, YesNo};
use std::io::{BufRead, Write};

/// Walks every section after the MRN, offering the current values as defaults.
///
/// Conditional questions are only asked when their companion answer is Yes (or Present).
pub fn fill_form<R: BufRead, W: Write>(p: &mut Prompter<R, W>, f: &mut FormInput) -> Result<()> {
    p.say("\n== Patient Details ==")?;
    f.date_of_birth = p.date("Date of Birth", f.date_of_birth)?;
    f.last_radiotherapy_date = p.date("Date of Last Radiotherapy", f.last_radiotherapy_date)?;
    f.follow_up_date = p.date("Follow-up date", f.follow_up_date)?;

    p.say("\n== Pathology ==")?;
    f.histology = p.multi("Histology", &plain(HISTOLOGY_OPTIONS), &f.histology)?;
    f.grade = p.choice("Grade", f.grade)?;
    f.necrosis = p.choice("Necrosis", f.necrosis)?;
    f.lvi = p.choice("LVI", f.lvi)?;
    f.mitotic_count = p.count("Mitotic Count", f.mitotic_count)?;
    f.location = p.choice("Location", f.location)?;

    p.say("\n== Clinical Stage ==")?;
    let system = f.location.staging_system();
    if system != StagingSystem::Extremity {
        p.say(staging_hint(EXTREMITY_STAGES, NON_EXTREMITY_STAGE))?;
    }
    f.clinical_stage_extremity = p.multi(
        "Clinical Stage Extremity",
        EXTREMITY_STAGES,
        &f.clinical_stage_extremity,
    )?;
    if system != StagingSystem::Retroperitoneum {
        p.say(staging_hint(RETROPERITONEUM_STAGES, NON_RETROPERITONEAL_STAGE))?;
    }
    f.clinical_stage_retroperitoneum = p.multi(
        "Clinical Stage Retroperitoneum",
        RETROPERITONEUM_STAGES,
        &f.clinical_stage_retroperitoneum,
    )?;
    f.biopsy_date = p.date("Biopsy date", f.biopsy_date)?;

    p.say("\n== Recurrent Tumor ==")?;
    f.recurrent_tumor = p.choice("Recurrent Tumor", f.recurrent_tumor)?;
    if f.recurrent_tumor.is_yes() {
        f.recurrence_date = p.date("Recurrence date", f.recurrence_date)?;
        f.surgery_date = p.date("Surgery date", f.surgery_date)?;
    }

    p.say("\n== Systemic Treatment ==")?;
    f.systemic_treatment = p.multi(
        "Systemic Treatment",
        &plain(SYSTEMIC_TREATMENT_OPTIONS),
        &f.systemic_treatment,
    )?;
    f.systemic_treatment_first_date =
        p.date("Systemic Treatment first date", f.systemic_treatment_first_date)?;
    f.systemic_treatment_last_date =
        p.date("Systemic Treatment last date", f.systemic_treatment_last_date)?;

    p.say("\n== Treatment Details ==")?;
    f.dose_per_fraction = p.count("Dose per Fraction", f.dose_per_fraction)?;
    f.fractionation = p.count("Fractionation", f.fractionation)?;

    side_effects(p, f)?;
    f.overall_tolerance = p.choice("Overall Tolerance", f.overall_tolerance)?;

    p.say("\n== Outcome ==")?;
    f.local_recurrence = event(p, "Local Recurrence", f.local_recurrence)?;
    f.regional_recurrence = event(p, "Regional Recurrence", f.regional_recurrence)?;
    f.distant_recurrence = event(p, "Distant Recurrence", f.distant_recurrence)?;
    f.death.occurred = p.choice("Death", f.death.occurred)?;
    if f.death.occurred.is_yes() {
        f.death.date = p.date("Death date", f.death.date)?;
        f.death.cancer_related = p.choice("Cancer Related Death", f.death.cancer_related)?;
    }

    Ok(())
}

fn side_effects<R: BufRead, W: Write>(p: &mut Prompter<R, W>, f: &mut FormInput) -> Result<()> {
    let mut section = None;
    for toxicity in Toxicity::ALL.iter().copied() {
        if section != Some(toxicity.section()) {
            section = Some(toxicity.section());
            p.say(format!("\n== {} ==", toxicity.section().title()))?;
            if toxicity.section() == SideEffectSection::Urinary {
                f.dysuria = p.choice("Dysuria", f.dysuria)?;
            }
        }

        let grade = p.grade(toxicity, f.side_effects.get(toxicity))?;
        f.side_effects
            .set(toxicity, grade)
            .map_err(anyhow::Error::msg)?;

        if toxicity == Toxicity::UrinaryObstruction {
            f.ureteral_stenosis = p.choice("Ureteral Stenosis", f.ureteral_stenosis)?;
            if f.ureteral_stenosis.is_present() {
                f.ureteral_stenosis_date =
                    p.date("Ureteral Stenosis Date", f.ureteral_stenosis_date)?;
            }
        }
    }
    Ok(())
}

fn event<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    label: &str,
    current: Event,
) -> Result<Event> {
    let occurred: YesNo = p.choice(label, current.occurred)?;
    let date = if occurred.is_yes() {
        p.date(&format!("{label} date"), current.date)?
    } else {
        current.date
    };
    Ok(Event { occurred, date })
}

/// Points at the marker option of a staging system that does not match the location.
fn staging_hint(options: &[(&str, Option<&str>)], marker: &str) -> String {
    const NOTE: &str = "  Location uses the other staging system; usually";
    match options.iter().position(|(option, _)| *option == marker) {
        Some(i) => format!("{NOTE} {} ({marker}).", i + 1),
        None => format!("{NOTE} {marker}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use registry_core::record::{CtcaeGrade, Location, Presence};
    use registry_types::Mrn;
    use std::io::Cursor;

    #[test]
    fn accepting_every_default_keeps_the_form() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let mut form = FormInput::blank(Mrn::new("A1"), today);
        form.location = Location::Trunk;
        let expected = form.clone();

        let answers = "\n".repeat(200);
        let mut p = Prompter::new(Cursor::new(answers.into_bytes()), Vec::new());
        fill_form(&mut p, &mut form).expect("fill form");
        assert_eq!(form, expected);
    }

    #[test]
    fn mismatched_staging_system_is_hinted_not_selected() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let mut form = FormInput::blank(Mrn::new("A1"), today);
        form.location = Location::Trunk;

        let answers = "\n".repeat(200);
        let mut p = Prompter::new(Cursor::new(answers.into_bytes()), Vec::new());
        fill_form(&mut p, &mut form).expect("fill form");

        assert!(form.clinical_stage_extremity.is_empty());
        assert!(form.clinical_stage_retroperitoneum.is_empty());
        let out = String::from_utf8(p.into_output()).expect("utf8");
        assert!(out.contains(&format!("({NON_EXTREMITY_STAGE})")), "{out}");
        assert!(out.contains(&format!("({NON_RETROPERITONEAL_STAGE})")), "{out}");
    }

    #[test]
    fn staging_hint_names_marker_option() {
        let hint = staging_hint(EXTREMITY_STAGES, NON_EXTREMITY_STAGE);
        let n = EXTREMITY_STAGES
            .iter()
            .position(|(o, _)| *o == NON_EXTREMITY_STAGE)
            .expect("marker is an option")
            + 1;
        assert!(hint.contains(&format!("usually {n} (")), "{hint}");
    }

    #[test]
    fn conditional_questions_follow_companion_answers() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let mut form = FormInput::blank(Mrn::new("A1"), today);
        form.ureteral_stenosis = Presence::Present;

        // Patient details and pathology keep defaults up to the recurrence question.
        let mut answers = String::new();
        answers.push_str(&"\n".repeat(3)); // dates
        answers.push_str(&"\n".repeat(6)); // histology .. location
        answers.push_str(&"\n".repeat(3)); // staging, biopsy date
        answers.push_str("Yes\n2023-01-01\n2023-02-02\n");
        answers.push_str(&"\n".repeat(200));

        let mut p = Prompter::new(Cursor::new(answers.into_bytes()), Vec::new());
        fill_form(&mut p, &mut form).expect("fill form");

        assert!(form.recurrent_tumor.is_yes());
        assert_eq!(form.recurrence_date, NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid"));
        assert_eq!(form.surgery_date, NaiveDate::from_ymd_opt(2023, 2, 2).expect("valid"));
        assert_eq!(form.side_effects.get(Toxicity::Cystitis), CtcaeGrade::Absent);
    }
}
