//! YAML form files.
//!
//! A form file is a filled-in data-entry form that can be edited outside the interactive front
//! end and submitted later:
//!
//! ```yaml
//! form_version: 1
//! patient:
//!   mrn: A123
//!   date_of_birth: 1970-08-20
//!   last_radiotherapy_date: 2022-01-15
//!   ...
//! ```
//!
//! Parsing is strict (unknown keys are rejected) and errors name the failing field.

use crate::error::{RegistryError, RegistryResult};
use crate::record::{FormInput, PatientRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version written by [`FormFile::render`] and the only one accepted by [`FormFile::parse`].
pub const FORM_VERSION: u32 = 1;

/// YAML form file translation.
pub struct FormFile;

impl FormFile {
    /// Parse a form from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `patient.grade`)
    /// when the YAML does not match the expected schema.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Translation` on a schema mismatch and
    /// `RegistryError::InvalidInput` on an unsupported `form_version`.
    pub fn parse(yaml_text: &str) -> RegistryResult<FormInput> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, FormFileWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(RegistryError::Translation(format!(
                    "Form schema mismatch at {path}: {source}"
                )));
            }
        };

        if wire.form_version != FORM_VERSION {
            return Err(RegistryError::InvalidInput(format!(
                "Expected form_version {FORM_VERSION}, got {}",
                wire.form_version
            )));
        }

        Ok(wire.patient)
    }

    /// Render a form as YAML text.
    pub fn render(input: &FormInput) -> RegistryResult<String> {
        let wire = FormFileWireRef {
            form_version: FORM_VERSION,
            patient: input,
        };
        serde_yaml::to_string(&wire).map_err(RegistryError::YamlSerialization)
    }

    /// Read and parse a form file.
    pub fn load(path: &Path) -> RegistryResult<FormInput> {
        let text = std::fs::read_to_string(path).map_err(RegistryError::FileRead)?;
        Self::parse(&text)
    }

    /// Render a form and write it to `path`, replacing any existing file.
    pub fn save(path: &Path, input: &FormInput) -> RegistryResult<()> {
        let text = Self::render(input)?;
        std::fs::write(path, text).map_err(RegistryError::FileWrite)
    }

    /// Render a stored row as YAML text for display.
    pub fn render_record(record: &PatientRecord) -> RegistryResult<String> {
        serde_yaml::to_string(record).map_err(RegistryError::YamlSerialization)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FormFileWire {
    form_version: u32,
    patient: FormInput,
}

#[derive(Serialize)]
struct FormFileWireRef<'a> {
    form_version: u32,
    patient: &'a FormInput,
}
