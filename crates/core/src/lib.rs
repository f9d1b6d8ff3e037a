//! # Registry Core
//!
//! Core logic for the soft-tissue sarcoma radiotherapy registry.
//!
//! This crate contains the record model and pure data operations:
//! - Interval arithmetic for ages and months since treatment ([`intervals`])
//! - The typed patient record with its choice sets and CTCAE grades ([`record`])
//! - The CSV table codec ([`table`]) and the append-only store ([`repositories::records`])
//! - The data-entry form session ([`form`]) and YAML form files ([`form_file`])
//!
//! **No front-end concerns**: prompting, argument parsing and terminal output belong in the
//! `registry` CLI and the `registry-run` binary.

pub mod config;
pub mod constants;
pub mod error;
pub mod form;
pub mod form_file;
pub mod intervals;
pub mod record;
pub mod repositories;
pub mod table;
pub mod validation;

pub use config::RegistryConfig;
pub use error::{RegistryError, RegistryResult};
pub use form::{FormSession, FormState};
pub use form_file::FormFile;
pub use intervals::{calculate_age, calculate_months};
pub use record::{DerivedIntervals, FormInput, PatientRecord};
pub use repositories::records::{find_by_mrn, RecordStore};

pub use registry_types::{Applicable, Mrn, NOT_APPLICABLE};
