mod prompt;
mod sections;

use anyhow::Result;
use prompt::Prompter;
use registry_core::config::{store_path_from_env_value, today_from_env_value};
use registry_core::constants::{STORE_PATH_ENV, TODAY_ENV};
use registry_core::{FormSession, FormState, RecordStore, RegistryConfig, RegistryError};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the interactive registry form
///
/// Prompts for an MRN, pre-fills the form from the store (or defaults for a new patient),
/// walks every section and then offers the Calculate and Save Information actions.
///
/// # Environment Variables
/// - `REGISTRY_STORE_PATH`: CSV store file (default: "registry_data/patients.csv")
/// - `REGISTRY_TODAY`: fixed calculation date, `YYYY-MM-DD` (default: the local date)
/// - `RUST_LOG`: log filter (default directive: "registry=info")
fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store_path = store_path_from_env_value(std::env::var(STORE_PATH_ENV).ok());
    let today = today_from_env_value(std::env::var(TODAY_ENV).ok())?;
    let cfg = Arc::new(RegistryConfig::new(store_path, today)?);

    tracing::info!("++ Registry store at {}", cfg.store_path().display());
    let store = RecordStore::new(cfg);

    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
    run(&store, &mut prompter)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Calculate,
    Save,
    ChangeMrn,
    Edit,
    Quit,
}

impl Action {
    const MENU: &'static [(char, Action, &'static str)] = &[
        ('c', Action::Calculate, "Calculate"),
        ('s', Action::Save, "Save Information"),
        ('m', Action::ChangeMrn, "Change MRN"),
        ('e', Action::Edit, "Edit form"),
        ('q', Action::Quit, "Quit"),
    ];

    fn parse(answer: &str) -> Option<Action> {
        let key = answer.trim().chars().next()?.to_ascii_lowercase();
        Self::MENU
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, action, _)| *action)
    }
}

fn run<R: BufRead, W: Write>(store: &RecordStore, p: &mut Prompter<R, W>) -> Result<()> {
    p.say("Sarcoma Radiotherapy Registry")?;
    let mut session = FormSession::new(store);
    enter_mrn(&mut session, p)?;

    loop {
        let state = session.state();
        let options: Vec<String> = Action::MENU
            .iter()
            .map(|(key, _, label)| format!("[{key}] {label}"))
            .collect();
        p.say(format!("\n{}  ({state:?})", options.join("  ")))?;

        let answer = p.text("Action", "")?;
        match Action::parse(&answer) {
            Some(Action::Calculate) => {
                let derived = *session.calculate(store.config().today());
                p.say(format!("Age: {}", derived.age))?;
                p.say(format!(
                    "Time since treatment (months): {}",
                    derived.follow_up_months
                ))?;
                p.say(format!(
                    "Time to local / regional / distant recurrence: {} / {} / {}",
                    derived.time_to_local_recurrence,
                    derived.time_to_regional_recurrence,
                    derived.time_to_distant_recurrence
                ))?;
                p.say(format!("Time to death: {}", derived.time_to_death))?;
            }
            Some(Action::Save) => match session.save() {
                Ok(record) => p.say(format!(
                    "Information saved successfully for MRN {}",
                    record.mrn
                ))?,
                Err(RegistryError::Validation(msg)) => p.say(format!("Cannot save: {msg}"))?,
                Err(e) => {
                    tracing::error!("Save error: {}", e);
                    p.say(format!("Error saving information: {e}"))?;
                }
            },
            Some(Action::ChangeMrn) => enter_mrn(&mut session, p)?,
            Some(Action::Edit) => edit_form(&mut session, p)?,
            Some(Action::Quit) => return Ok(()),
            None => p.say("Please choose one of the listed actions.")?,
        }
    }
}

/// Prompts for an MRN until the lookup succeeds, then walks the form.
fn enter_mrn<R: BufRead, W: Write>(
    session: &mut FormSession<'_>,
    p: &mut Prompter<R, W>,
) -> Result<()> {
    loop {
        let raw = p.text("MRN", session.input().mrn.as_str())?;
        match session.enter_mrn(&raw) {
            Ok(FormState::Loaded) => p.say("Existing record found; fields are pre-filled.")?,
            Ok(FormState::New) => p.say("No record found; starting a new patient.")?,
            Ok(_) => p.say("No MRN entered.")?,
            Err(RegistryError::InvalidInput(msg)) => {
                p.say(format!("Invalid MRN: {msg}"))?;
                continue;
            }
            Err(e) => {
                tracing::error!("Lookup error: {}", e);
                p.say(format!("Error reading the registry: {e}"))?;
                continue;
            }
        }
        return edit_form(session, p);
    }
}

fn edit_form<R: BufRead, W: Write>(
    session: &mut FormSession<'_>,
    p: &mut Prompter<R, W>,
) -> Result<()> {
    let mut form = session.input().clone();
    sections::fill_form(p, &mut form)?;
    session.edit(|f| *f = form);
    Ok(())
}
