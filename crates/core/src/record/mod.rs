//! Registry record model.
//!
//! Three shapes of the same patient submission live here:
//!
//! - [`FormInput`]: everything the user edits on the form. Conditional fields always hold a
//!   value so that toggling a companion answer back and forth does not lose what was typed.
//! - [`DerivedIntervals`]: what "Calculate" produces from a `FormInput` and today's date.
//! - [`PatientRecord`]: one persisted row. Conditional fields are [`Applicable`], so a value
//!   whose companion answer is "No" is the `N/A` sentinel rather than a stale date.
//!
//! The on-disk row format lives in [`crate::table`].

pub mod choices;
pub mod labels;
pub mod side_effects;

use crate::constants::{BOUNDED_INPUT_MAX, SENTINEL_DATE_YMD};
use crate::intervals::{calculate_age, calculate_months};
use chrono::NaiveDate;
use registry_types::{Applicable, Mrn, NOT_APPLICABLE};
use serde::{Deserialize, Serialize};

pub use choices::{Choice, Finding, Grade, Location, Presence, StagingSystem, Tolerance, YesNo};
pub use labels::LabelList;
pub use side_effects::{CtcaeGrade, SideEffectSection, Toxicity, ToxicityGrades};

/// Date substituted for an absent date cell when a stored row is loaded into the form.
pub fn sentinel_date() -> NaiveDate {
    let (y, m, d) = SENTINEL_DATE_YMD;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Integer input bounded to `0..=100` (mitotic count, dose per fraction, fractions).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BoundedCount(u32);

impl BoundedCount {
    pub const MAX: u32 = BOUNDED_INPUT_MAX;

    pub fn new(value: u32) -> Result<Self, String> {
        if value > Self::MAX {
            return Err(format!("{value} exceeds the maximum of {}", Self::MAX));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for BoundedCount {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BoundedCount::new(value)
    }
}

impl From<BoundedCount> for u32 {
    fn from(value: BoundedCount) -> Self {
        value.0
    }
}

impl std::fmt::Display for BoundedCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An outcome event (recurrence) as entered on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Event {
    #[serde(default)]
    pub occurred: YesNo,
    #[serde(default = "sentinel_date")]
    pub date: NaiveDate,
}

impl Event {
    fn not_occurred(date: NaiveDate) -> Self {
        Self {
            occurred: YesNo::No,
            date,
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Event::not_occurred(sentinel_date())
    }
}

/// Death as entered on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeathEvent {
    #[serde(default)]
    pub occurred: YesNo,
    #[serde(default = "sentinel_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub cancer_related: YesNo,
}

impl Default for DeathEvent {
    fn default() -> Self {
        Self {
            occurred: YesNo::No,
            date: sentinel_date(),
            cancer_related: YesNo::No,
        }
    }
}

/// Editable contents of the data-entry form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormInput {
    #[serde(default)]
    pub mrn: Mrn,
    pub date_of_birth: NaiveDate,
    pub last_radiotherapy_date: NaiveDate,
    pub follow_up_date: NaiveDate,

    #[serde(default)]
    pub histology: LabelList,
    #[serde(default)]
    pub grade: Grade,
    #[serde(default)]
    pub necrosis: Finding,
    #[serde(default)]
    pub lvi: Finding,
    #[serde(default)]
    pub mitotic_count: BoundedCount,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub clinical_stage_extremity: LabelList,
    #[serde(default)]
    pub clinical_stage_retroperitoneum: LabelList,
    pub biopsy_date: NaiveDate,

    #[serde(default)]
    pub recurrent_tumor: YesNo,
    #[serde(default = "sentinel_date")]
    pub recurrence_date: NaiveDate,
    #[serde(default = "sentinel_date")]
    pub surgery_date: NaiveDate,

    #[serde(default)]
    pub systemic_treatment: LabelList,
    pub systemic_treatment_first_date: NaiveDate,
    pub systemic_treatment_last_date: NaiveDate,

    #[serde(default)]
    pub dose_per_fraction: BoundedCount,
    #[serde(default)]
    pub fractionation: BoundedCount,

    #[serde(default)]
    pub dysuria: Presence,
    #[serde(default)]
    pub ureteral_stenosis: Presence,
    #[serde(default = "sentinel_date")]
    pub ureteral_stenosis_date: NaiveDate,
    #[serde(default)]
    pub side_effects: ToxicityGrades,
    #[serde(default)]
    pub overall_tolerance: Tolerance,

    #[serde(default)]
    pub local_recurrence: Event,
    #[serde(default)]
    pub regional_recurrence: Event,
    #[serde(default)]
    pub distant_recurrence: Event,
    #[serde(default)]
    pub death: DeathEvent,
}

impl FormInput {
    /// A fresh form for a patient with no stored record. Every date starts at `today`.
    pub fn blank(mrn: Mrn, today: NaiveDate) -> Self {
        Self {
            mrn,
            date_of_birth: today,
            last_radiotherapy_date: today,
            follow_up_date: today,
            histology: LabelList::default(),
            grade: Grade::default(),
            necrosis: Finding::default(),
            lvi: Finding::default(),
            mitotic_count: BoundedCount::default(),
            location: Location::default(),
            clinical_stage_extremity: LabelList::default(),
            clinical_stage_retroperitoneum: LabelList::default(),
            biopsy_date: today,
            recurrent_tumor: YesNo::No,
            recurrence_date: today,
            surgery_date: today,
            systemic_treatment: LabelList::default(),
            systemic_treatment_first_date: today,
            systemic_treatment_last_date: today,
            dose_per_fraction: BoundedCount::default(),
            fractionation: BoundedCount::default(),
            dysuria: Presence::default(),
            ureteral_stenosis: Presence::default(),
            ureteral_stenosis_date: today,
            side_effects: ToxicityGrades::default(),
            overall_tolerance: Tolerance::default(),
            local_recurrence: Event::not_occurred(today),
            regional_recurrence: Event::not_occurred(today),
            distant_recurrence: Event::not_occurred(today),
            death: DeathEvent {
                occurred: YesNo::No,
                date: today,
                cancer_related: YesNo::No,
            },
        }
    }
}

/// Values produced by "Calculate".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DerivedIntervals {
    /// Whole years between date of birth and the calculation date.
    pub age: i32,
    /// Months from last radiotherapy to follow-up.
    pub follow_up_months: i32,
    pub time_to_local_recurrence: Applicable<i32>,
    pub time_to_regional_recurrence: Applicable<i32>,
    pub time_to_distant_recurrence: Applicable<i32>,
    pub time_to_death: Applicable<i32>,
}

impl DerivedIntervals {
    /// Computes every derived interval. Time-to-event values are measured from the last
    /// radiotherapy date and are `N/A` unless the event occurred.
    pub fn compute(input: &FormInput, today: NaiveDate) -> Self {
        let since_treatment = |event_date: NaiveDate| {
            calculate_months(input.last_radiotherapy_date, event_date)
        };
        let event_months = |event: &Event| {
            Applicable::when(event.occurred.is_yes(), since_treatment(event.date))
        };

        Self {
            age: calculate_age(input.date_of_birth, today),
            follow_up_months: since_treatment(input.follow_up_date),
            time_to_local_recurrence: event_months(&input.local_recurrence),
            time_to_regional_recurrence: event_months(&input.regional_recurrence),
            time_to_distant_recurrence: event_months(&input.distant_recurrence),
            time_to_death: Applicable::when(
                input.death.occurred.is_yes(),
                since_treatment(input.death.date),
            ),
        }
    }
}

/// One persisted registry row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    pub mrn: Mrn,
    pub date_of_birth: NaiveDate,
    pub age: i32,
    pub last_radiotherapy_date: NaiveDate,
    pub follow_up_date: NaiveDate,
    pub follow_up_months: i32,

    pub histology: LabelList,
    pub grade: Grade,
    pub necrosis: Finding,
    pub lvi: Finding,
    pub mitotic_count: BoundedCount,
    pub location: Location,
    pub clinical_stage_extremity: LabelList,
    pub clinical_stage_retroperitoneum: LabelList,
    pub biopsy_date: NaiveDate,

    pub recurrent_tumor: YesNo,
    pub recurrence_date: Applicable<NaiveDate>,
    pub surgery_date: Applicable<NaiveDate>,

    pub systemic_treatment: LabelList,
    pub systemic_treatment_first_date: NaiveDate,
    pub systemic_treatment_last_date: NaiveDate,

    pub dose_per_fraction: BoundedCount,
    pub fractionation: BoundedCount,

    pub dysuria: Presence,
    pub ureteral_stenosis: Presence,
    pub ureteral_stenosis_date: Applicable<NaiveDate>,
    pub side_effects: ToxicityGrades,
    pub overall_tolerance: Tolerance,

    pub local_recurrence: YesNo,
    pub local_recurrence_date: Applicable<NaiveDate>,
    pub time_to_local_recurrence: Applicable<i32>,
    pub regional_recurrence: YesNo,
    pub regional_recurrence_date: Applicable<NaiveDate>,
    pub time_to_regional_recurrence: Applicable<i32>,
    pub distant_recurrence: YesNo,
    pub distant_recurrence_date: Applicable<NaiveDate>,
    pub time_to_distant_recurrence: Applicable<i32>,
    pub death: YesNo,
    pub death_date: Applicable<NaiveDate>,
    pub cancer_related_death: Applicable<YesNo>,
    pub time_to_death: Applicable<i32>,
}

impl PatientRecord {
    /// Builds the row persisted by "Save Information".
    ///
    /// Conditional values are kept only when their companion answer is "Yes" (or "Present"
    /// for ureteral stenosis). An empty MRN is stored as the `N/A` sentinel.
    pub fn from_form(input: &FormInput, derived: &DerivedIntervals) -> Self {
        let mrn = if input.mrn.is_empty() {
            Mrn::new(NOT_APPLICABLE)
        } else {
            input.mrn.clone()
        };
        let recurrent = input.recurrent_tumor.is_yes();
        let event_date = |event: &Event| Applicable::when(event.occurred.is_yes(), event.date);
        let died = input.death.occurred.is_yes();

        Self {
            mrn,
            date_of_birth: input.date_of_birth,
            age: derived.age,
            last_radiotherapy_date: input.last_radiotherapy_date,
            follow_up_date: input.follow_up_date,
            follow_up_months: derived.follow_up_months,
            histology: input.histology.clone(),
            grade: input.grade,
            necrosis: input.necrosis,
            lvi: input.lvi,
            mitotic_count: input.mitotic_count,
            location: input.location,
            clinical_stage_extremity: input.clinical_stage_extremity.clone(),
            clinical_stage_retroperitoneum: input.clinical_stage_retroperitoneum.clone(),
            biopsy_date: input.biopsy_date,
            recurrent_tumor: input.recurrent_tumor,
            recurrence_date: Applicable::when(recurrent, input.recurrence_date),
            surgery_date: Applicable::when(recurrent, input.surgery_date),
            systemic_treatment: input.systemic_treatment.clone(),
            systemic_treatment_first_date: input.systemic_treatment_first_date,
            systemic_treatment_last_date: input.systemic_treatment_last_date,
            dose_per_fraction: input.dose_per_fraction,
            fractionation: input.fractionation,
            dysuria: input.dysuria,
            ureteral_stenosis: input.ureteral_stenosis,
            ureteral_stenosis_date: Applicable::when(
                input.ureteral_stenosis.is_present(),
                input.ureteral_stenosis_date,
            ),
            side_effects: input.side_effects.clone(),
            overall_tolerance: input.overall_tolerance,
            local_recurrence: input.local_recurrence.occurred,
            local_recurrence_date: event_date(&input.local_recurrence),
            time_to_local_recurrence: derived.time_to_local_recurrence,
            regional_recurrence: input.regional_recurrence.occurred,
            regional_recurrence_date: event_date(&input.regional_recurrence),
            time_to_regional_recurrence: derived.time_to_regional_recurrence,
            distant_recurrence: input.distant_recurrence.occurred,
            distant_recurrence_date: event_date(&input.distant_recurrence),
            time_to_distant_recurrence: derived.time_to_distant_recurrence,
            death: input.death.occurred,
            death_date: Applicable::when(died, input.death.date),
            cancer_related_death: Applicable::when(died, input.death.cancer_related),
            time_to_death: derived.time_to_death,
        }
    }

    /// Pre-populates a form from this row. `N/A` dates come back as the sentinel date.
    pub fn to_form_input(&self) -> FormInput {
        let or_sentinel =
            |date: Applicable<NaiveDate>| date.into_option().unwrap_or_else(sentinel_date);
        let event = |occurred: YesNo, date: Applicable<NaiveDate>| Event {
            occurred,
            date: or_sentinel(date),
        };

        FormInput {
            mrn: self.mrn.clone(),
            date_of_birth: self.date_of_birth,
            last_radiotherapy_date: self.last_radiotherapy_date,
            follow_up_date: self.follow_up_date,
            histology: self.histology.clone(),
            grade: self.grade,
            necrosis: self.necrosis,
            lvi: self.lvi,
            mitotic_count: self.mitotic_count,
            location: self.location,
            clinical_stage_extremity: self.clinical_stage_extremity.clone(),
            clinical_stage_retroperitoneum: self.clinical_stage_retroperitoneum.clone(),
            biopsy_date: self.biopsy_date,
            recurrent_tumor: self.recurrent_tumor,
            recurrence_date: or_sentinel(self.recurrence_date),
            surgery_date: or_sentinel(self.surgery_date),
            systemic_treatment: self.systemic_treatment.clone(),
            systemic_treatment_first_date: self.systemic_treatment_first_date,
            systemic_treatment_last_date: self.systemic_treatment_last_date,
            dose_per_fraction: self.dose_per_fraction,
            fractionation: self.fractionation,
            dysuria: self.dysuria,
            ureteral_stenosis: self.ureteral_stenosis,
            ureteral_stenosis_date: or_sentinel(self.ureteral_stenosis_date),
            side_effects: self.side_effects.clone(),
            overall_tolerance: self.overall_tolerance,
            local_recurrence: event(self.local_recurrence, self.local_recurrence_date),
            regional_recurrence: event(self.regional_recurrence, self.regional_recurrence_date),
            distant_recurrence: event(self.distant_recurrence, self.distant_recurrence_date),
            death: DeathEvent {
                occurred: self.death,
                date: or_sentinel(self.death_date),
                cancer_related: self.cancer_related_death.into_option().unwrap_or_default(),
            },
        }
    }
}
