//! Repository management modules.
//!
//! The registry has a single repository: the patient table in [`records`].

pub mod records;
