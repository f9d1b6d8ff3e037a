//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and the
//! form as an `Arc<RegistryConfig>`. Nothing below the binaries reads environment variables;
//! the `*_from_env_value` helpers take the raw value so the binaries decide where it comes from.

use crate::constants::{DATE_FORMAT, DEFAULT_DATA_DIR, DEFAULT_STORE_FILENAME};
use crate::validation::validate_store_path;
use crate::{RegistryError, RegistryResult};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    store_path: PathBuf,
    today: Option<NaiveDate>,
}

impl RegistryConfig {
    /// Create a new `RegistryConfig`.
    ///
    /// `today` pins the calculation date; `None` means the local calendar date at the time of
    /// each calculation.
    pub fn new(store_path: PathBuf, today: Option<NaiveDate>) -> RegistryResult<Self> {
        validate_store_path(&store_path)?;

        Ok(Self { store_path, today })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// The date used for age calculation and new-form defaults.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Resolve the store path from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `registry_data/patients.csv` relative to the
/// working directory.
pub fn store_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(DEFAULT_DATA_DIR).join(DEFAULT_STORE_FILENAME))
}

/// Parse a pinned calculation date (`YYYY-MM-DD`) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `None`.
pub fn today_from_env_value(value: Option<String>) -> RegistryResult<Option<NaiveDate>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    value
        .map(|v| {
            NaiveDate::parse_from_str(&v, DATE_FORMAT).map_err(|e| {
                RegistryError::InvalidInput(format!("'{v}' is not a YYYY-MM-DD date: {e}"))
            })
        })
        .transpose()
}
