//! Constants used throughout the registry core crate.
//!
//! This module contains path, filename and sentinel constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for registry data when no explicit store path is configured.
pub const DEFAULT_DATA_DIR: &str = "registry_data";

/// Filename of the registry table inside the default data directory.
pub const DEFAULT_STORE_FILENAME: &str = "patients.csv";

/// Required extension of the registry store file.
pub const STORE_EXTENSION: &str = "csv";

/// Date format used for every date cell and every date typed at a prompt.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Year, month and day of the date substituted for missing date cells.
pub const SENTINEL_DATE_YMD: (i32, u32, u32) = (1900, 1, 1);

/// Inclusive upper bound of the bounded integer inputs (mitotic count, dose, fractions).
pub const BOUNDED_INPUT_MAX: u32 = 100;

/// Environment variable naming the registry store file.
pub const STORE_PATH_ENV: &str = "REGISTRY_STORE_PATH";

/// Environment variable pinning "today" for age and interval calculations.
pub const TODAY_ENV: &str = "REGISTRY_TODAY";
