//! Data-entry form session.
//!
//! A [`FormSession`] is the context shared by the "Calculate" and "Save Information" actions.
//! It owns the editable [`FormInput`] and the [`DerivedIntervals`] from the last calculation,
//! and moves through these states:
//!
//! ```text
//!            enter_mrn("")             enter_mrn(hit)
//!   Empty <----------------- * -----------------------> Loaded
//!                            |                            |  ^
//!                            | enter_mrn(miss)  calculate |  | edit / save
//!                            v                            v  |
//!                           New ----- calculate ----> Calculated
//!                            ^                            |
//!                            +------ edit (from New) -----+
//! ```
//!
//! Saving is only possible from `Calculated`. Any edit after a calculation discards it, so a
//! saved row never carries intervals computed from different input.

use crate::error::{RegistryError, RegistryResult};
use crate::record::{DerivedIntervals, FormInput, PatientRecord};
use crate::repositories::records::RecordStore;
use chrono::NaiveDate;
use registry_types::Mrn;

/// Where the form is in the enter, calculate, save cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    /// No MRN entered.
    Empty,
    /// MRN matched a stored row; the form was pre-populated from it.
    Loaded,
    /// MRN matched nothing; the form holds defaults.
    New,
    /// Derived values are computed and held for saving.
    Calculated,
}

/// How the current form contents were obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    Empty,
    Loaded,
    New,
}

/// One user's form session over a store.
#[derive(Debug)]
pub struct FormSession<'a> {
    store: &'a RecordStore,
    input: FormInput,
    origin: Origin,
    derived: Option<DerivedIntervals>,
}

impl<'a> FormSession<'a> {
    /// Starts an empty session. Dates default to the configured "today".
    pub fn new(store: &'a RecordStore) -> Self {
        let today = store.config().today();
        Self {
            store,
            input: FormInput::blank(Mrn::default(), today),
            origin: Origin::Empty,
            derived: None,
        }
    }

    pub fn state(&self) -> FormState {
        if self.derived.is_some() {
            return FormState::Calculated;
        }
        match self.origin {
            Origin::Empty => FormState::Empty,
            Origin::Loaded => FormState::Loaded,
            Origin::New => FormState::New,
        }
    }

    pub fn input(&self) -> &FormInput {
        &self.input
    }

    /// The values from the last calculation, if it is still current.
    pub fn derived(&self) -> Option<&DerivedIntervals> {
        self.derived.as_ref()
    }

    /// Sets the MRN and re-populates the whole form.
    ///
    /// The store is consulted synchronously. A hit pre-populates from the first matching row,
    /// a miss resets every field to its default. Any calculation is discarded.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::StorageRead` if the store cannot be loaded; the session is left
    /// unchanged.
    pub fn enter_mrn(&mut self, raw: &str) -> RegistryResult<FormState> {
        crate::validation::validate_mrn_input(raw)?;
        let mrn = Mrn::new(raw);
        let today = self.store.config().today();

        let (input, origin) = if mrn.is_empty() {
            (FormInput::blank(mrn, today), Origin::Empty)
        } else {
            match self.store.find(mrn.as_str())? {
                Some(record) => {
                    tracing::debug!(mrn = %mrn, "pre-populating form from stored row");
                    (record.to_form_input(), Origin::Loaded)
                }
                None => {
                    tracing::debug!(mrn = %mrn, "no stored row; new patient");
                    (FormInput::blank(mrn, today), Origin::New)
                }
            }
        };

        self.input = input;
        self.origin = origin;
        self.derived = None;

        Ok(self.state())
    }

    /// Replaces the form contents wholesale, as when a filled-in form file is submitted.
    ///
    /// The MRN is taken from `input`; no lookup is made.
    pub fn fill(&mut self, input: FormInput) {
        self.origin = if input.mrn.is_empty() {
            Origin::Empty
        } else {
            Origin::New
        };
        self.input = input;
        self.derived = None;
    }

    /// Applies an edit to the form fields. Any calculation is discarded.
    ///
    /// The MRN should be changed through [`FormSession::enter_mrn`], which also re-populates.
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut FormInput),
    {
        f(&mut self.input);
        self.derived = None;
    }

    /// Runs "Calculate": computes age, follow-up and time-to-event values as of `today`.
    pub fn calculate(&mut self, today: NaiveDate) -> &DerivedIntervals {
        self.derived
            .insert(DerivedIntervals::compute(&self.input, today))
    }

    /// Runs "Save Information": appends the current form and its calculation as a new row.
    ///
    /// # Errors
    ///
    /// - `RegistryError::Validation` if "Calculate" has not run since the last change; nothing
    ///   is written
    /// - `RegistryError::StorageRead` / `StorageWrite` from the store
    pub fn save(&mut self) -> RegistryResult<PatientRecord> {
        let Some(derived) = self.derived.as_ref() else {
            return Err(RegistryError::Validation(
                "please calculate age and time since treatment first".into(),
            ));
        };

        let record = PatientRecord::from_form(&self.input, derived);
        self.store.append(record.clone())?;

        self.origin = Origin::Loaded;
        self.derived = None;

        Ok(record)
    }
}

// ============================================================================
// TESTS
// ============================================================================
