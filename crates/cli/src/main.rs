use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use registry_core::config::{store_path_from_env_value, today_from_env_value};
use registry_core::constants::{STORE_PATH_ENV, TODAY_ENV};
use registry_core::{
    calculate_age, calculate_months, DerivedIntervals, FormFile, FormSession, FormState,
    PatientRecord, RecordStore, RegistryConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Sarcoma radiotherapy registry CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Months between two dates (day of month is ignored)
    Months {
        /// Start date (YYYY-MM-DD)
        start: NaiveDate,
        /// End date (YYYY-MM-DD)
        end: NaiveDate,
    },
    /// Age in whole years
    Age {
        /// Date of birth (YYYY-MM-DD)
        birth_date: NaiveDate,
        /// Evaluate as of this date instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List all stored rows
    List,
    /// Show the first stored row for an MRN
    Lookup {
        /// Medical record number
        mrn: String,
    },
    /// Write a YAML form pre-filled from the store, or with defaults for a new patient
    Template {
        /// Medical record number
        mrn: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Calculate a YAML form and optionally save it
    Submit {
        /// YAML form file
        file: PathBuf,
        /// Append the calculated record to the store
        #[arg(long)]
        save: bool,
        /// Calculate as of this date instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn load_config() -> Result<Arc<RegistryConfig>, Box<dyn std::error::Error>> {
    let store_path = store_path_from_env_value(std::env::var(STORE_PATH_ENV).ok());
    let today = today_from_env_value(std::env::var(TODAY_ENV).ok())?;
    Ok(Arc::new(RegistryConfig::new(store_path, today)?))
}

fn print_derived(derived: &DerivedIntervals) {
    println!("Age: {}", derived.age);
    println!("Time since treatment (months): {}", derived.follow_up_months);
    println!(
        "Time to local recurrence: {}",
        derived.time_to_local_recurrence
    );
    println!(
        "Time to regional recurrence: {}",
        derived.time_to_regional_recurrence
    );
    println!(
        "Time to distant recurrence: {}",
        derived.time_to_distant_recurrence
    );
    println!("Time to death: {}", derived.time_to_death);
}

fn print_row(record: &PatientRecord) {
    println!(
        "MRN: {}, Born: {}, Age: {}, Follow-up: {} months, Histology: {}",
        record.mrn, record.date_of_birth, record.age, record.follow_up_months, record.histology
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Months { start, end }) => {
            println!("{}", calculate_months(start, end));
        }
        Some(Commands::Age { birth_date, today }) => {
            let today = match today {
                Some(today) => today,
                None => load_config()?.today(),
            };
            println!("{}", calculate_age(birth_date, today));
        }
        Some(Commands::List) => {
            let store = RecordStore::new(load_config()?);
            match store.load_all() {
                Ok(rows) if rows.is_empty() => println!("No records found."),
                Ok(rows) => rows.iter().for_each(print_row),
                Err(e) => eprintln!("Error loading registry: {}", e),
            }
        }
        Some(Commands::Lookup { mrn }) => {
            let store = RecordStore::new(load_config()?);
            match store.find(&mrn) {
                Ok(Some(record)) => print!("{}", FormFile::render_record(&record)?),
                Ok(None) => println!("No record found for MRN '{}'", mrn.trim()),
                Err(e) => eprintln!("Error looking up MRN: {}", e),
            }
        }
        Some(Commands::Template { mrn, output }) => {
            let store = RecordStore::new(load_config()?);
            let mut session = FormSession::new(&store);
            match session.enter_mrn(&mrn) {
                Ok(state) => {
                    match output {
                        Some(path) => {
                            FormFile::save(&path, session.input())?;
                            let origin = if state == FormState::Loaded {
                                "pre-filled from the store"
                            } else {
                                "with defaults"
                            };
                            println!("Wrote form {} to {}", origin, path.display());
                        }
                        None => print!("{}", FormFile::render(session.input())?),
                    }
                }
                Err(e) => eprintln!("Error preparing form: {}", e),
            }
        }
        Some(Commands::Submit { file, save, today }) => {
            let cfg = load_config()?;
            let today = today.unwrap_or_else(|| cfg.today());
            let store = RecordStore::new(cfg);

            let input = match FormFile::load(&file) {
                Ok(input) => input,
                Err(e) => {
                    eprintln!("Error reading form {}: {}", file.display(), e);
                    return Ok(());
                }
            };

            let mut session = FormSession::new(&store);
            session.fill(input);
            print_derived(session.calculate(today));

            if save {
                match session.save() {
                    Ok(record) => println!("Information saved for MRN {}", record.mrn),
                    Err(e) => eprintln!("Error saving record: {}", e),
                }
            }
        }
        None => {
            println!("Use 'registry --help' for commands");
        }
    }

    Ok(())
}
