//! Input validation utilities.
//!
//! Checks applied to configuration and user input before they reach the store.

use crate::constants::STORE_EXTENSION;
use crate::{RegistryError, RegistryResult};
use std::path::Path;

/// Validates that a path is usable as the registry store.
///
/// - Rejects empty paths
/// - Requires a `.csv` extension (case-insensitive)
/// - Rejects paths that name an existing directory
///
/// The file itself does not have to exist yet.
///
/// # Errors
///
/// Returns a `RegistryError::InvalidInput` if the path is unusable.
pub fn validate_store_path(path: &Path) -> RegistryResult<()> {
    if path.as_os_str().is_empty() {
        return Err(RegistryError::InvalidInput(
            "store path cannot be empty".into(),
        ));
    }

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(STORE_EXTENSION));
    if !is_csv {
        return Err(RegistryError::InvalidInput(format!(
            "store path must end in .{STORE_EXTENSION}: {}",
            path.display()
        )));
    }

    if path.is_dir() {
        return Err(RegistryError::InvalidInput(format!(
            "store path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validates an MRN typed for lookup or save.
///
/// Checks apply to the trimmed text, the same text lookups match on.
pub fn validate_mrn_input(raw: &str) -> RegistryResult<()> {
    const MAX_MRN_LEN: usize = 64;

    let mrn = raw.trim();
    if mrn.len() > MAX_MRN_LEN {
        return Err(RegistryError::InvalidInput(format!(
            "MRN exceeds maximum length of {} characters",
            MAX_MRN_LEN
        )));
    }

    if mrn.chars().any(|c| c.is_control()) {
        return Err(RegistryError::InvalidInput(
            "MRN must not contain control characters".into(),
        ));
    }

    Ok(())
}
