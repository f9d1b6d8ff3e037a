//! Tabular wire format of the registry store.
//!
//! The store is a single CSV sheet. The first row is the header [`COLUMNS`]; every following
//! row is one [`PatientRecord`] in append order.
//!
//! Decoding is by header name, so column order in an existing file does not matter and
//! unknown columns are ignored. Individual cells are decoded leniently with a stated default
//! per field type:
//!
//! | Field type | Absent or unparseable cell |
//! |---|---|
//! | date | sentinel date 1900-01-01 |
//! | conditional date / months | `N/A` |
//! | integer | 0 |
//! | single choice | the choice's default |
//! | CTCAE grade | grade 0 |
//! | label list | empty list |
//!
//! Non-empty cells that fail to decode are logged at `warn`. Structural problems (malformed
//! CSV, no `MRN` header) are errors.

use crate::constants::DATE_FORMAT;
use crate::record::{
    sentinel_date, BoundedCount, Choice, CtcaeGrade, LabelList, PatientRecord, Toxicity,
    ToxicityGrades,
};
use chrono::NaiveDate;
use registry_types::{Applicable, Mrn, ValueError, NOT_APPLICABLE};
use std::collections::HashMap;
use std::io;

/// Header row of the registry table, in write order.
pub const COLUMNS: &[&str] = &[
    "MRN",
    "Date_of_Birth",
    "Age",
    "Date_of_Last_Radiotherapy",
    "Follow_up_date",
    "Follow_up_time",
    "Histology",
    "Grade",
    "Necrosis",
    "LVI",
    "Mitotic_Count",
    "Location",
    "Clinical_Stage_Extremity",
    "Clinical_Stage_Retroperitoneum",
    "Biopsy_date",
    "Recurrent_Tumor",
    "Recurrence_date",
    "Surgery_date",
    "Systemic_Treatment",
    "Systemic_Treatment_first_date",
    "Systemic_Treatment_last_date",
    "Dose_per_Fraction",
    "Fractionation",
    "Dysuria",
    "Cystitis",
    "Bladder_Perforation",
    "Hematuria",
    "Urinary_Fistula",
    "Urinary_Obstruction",
    "Ureteral_Stenosis",
    "Ureteral_Stenosis_Date",
    "Urinary_Retention",
    "Diarrhea",
    "Nausea",
    "Bowel_Perforation",
    "Bowel_Obstruction",
    "Proctitis",
    "Rectal_Fistula",
    "Rectal_Hemorrhage",
    "Rectal_Pain",
    "Rectal_Perforation",
    "Rectal_Stenosis",
    "Organ_Failure",
    "Fatigue",
    "Pneumonitis",
    "Esophagitis",
    "Overall_Tolerance",
    "Local_Recurrence",
    "Local_Recurrence_date",
    "Time_to_Local_Recurrence",
    "Regional_Recurrence",
    "Regional_Recurrence_date",
    "Time_to_Regional_Recurrence",
    "Distant_Recurrence",
    "Distant_Recurrence_date",
    "Time_to_Distant_Recurrence",
    "Death",
    "Death_date",
    "Cancer_Related_Death",
    "Time_to_Death",
];

/// Column every table must carry.
pub const KEY_COLUMN: &str = "MRN";

/// Header spellings found in older registry sheets, with the column each one stands for.
/// A legacy header is only used when the current one is absent.
pub const LEGACY_COLUMNS: &[(&str, &str)] = &[
    ("Mytotic_Count", "Mitotic_Count"),
    ("Dose", "Dose_per_Fraction"),
    ("Overal_tolerance", "Overall_Tolerance"),
    ("Time_to_local_recurrence", "Time_to_Local_Recurrence"),
    ("Regional_recurrence", "Regional_Recurrence"),
    ("Time_to_regional_recurrence", "Time_to_Regional_Recurrence"),
    ("Distant_recurrence", "Distant_Recurrence"),
    ("Time_to_distant_recurrence", "Time_to_Distant_Recurrence"),
    ("time_to_death", "Time_to_Death"),
];

/// Errors produced while reading or writing the registry table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Reads every row of a registry table.
pub fn read_table<R: io::Read>(reader: R) -> Result<Vec<PatientRecord>, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut header: HashMap<String, usize> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_owned(), i))
        .collect();
    for (legacy, current) in LEGACY_COLUMNS {
        if let Some(&i) = header.get(*legacy) {
            header.entry((*current).to_owned()).or_insert(i);
        }
    }

    if !header.contains_key(KEY_COLUMN) {
        return Err(TableError::MissingColumn(KEY_COLUMN));
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let cells = RowCells {
            header: &header,
            record: &record,
            line,
        };
        rows.push(decode_row(&cells));
    }

    Ok(rows)
}

/// Writes a complete registry table, header first.
pub fn write_table<W: io::Write>(writer: W, rows: &[PatientRecord]) -> Result<(), TableError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(COLUMNS)?;
    for row in rows {
        csv_writer.write_record(encode_row(row))?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Encodes one record as cells aligned with [`COLUMNS`].
pub fn encode_row(record: &PatientRecord) -> Vec<String> {
    COLUMNS
        .iter()
        .map(|column| encode_cell(record, column))
        .collect()
}

fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn encode_cell(r: &PatientRecord, column: &str) -> String {
    match column {
        "MRN" => r.mrn.to_string(),
        "Date_of_Birth" => encode_date(r.date_of_birth),
        "Age" => r.age.to_string(),
        "Date_of_Last_Radiotherapy" => encode_date(r.last_radiotherapy_date),
        "Follow_up_date" => encode_date(r.follow_up_date),
        "Follow_up_time" => r.follow_up_months.to_string(),
        "Histology" => r.histology.encode(),
        "Grade" => r.grade.label().to_owned(),
        "Necrosis" => r.necrosis.label().to_owned(),
        "LVI" => r.lvi.label().to_owned(),
        "Mitotic_Count" => r.mitotic_count.to_string(),
        "Location" => r.location.label().to_owned(),
        "Clinical_Stage_Extremity" => r.clinical_stage_extremity.encode(),
        "Clinical_Stage_Retroperitoneum" => r.clinical_stage_retroperitoneum.encode(),
        "Biopsy_date" => encode_date(r.biopsy_date),
        "Recurrent_Tumor" => r.recurrent_tumor.label().to_owned(),
        "Recurrence_date" => r.recurrence_date.map(encode_date).to_string(),
        "Surgery_date" => r.surgery_date.map(encode_date).to_string(),
        "Systemic_Treatment" => r.systemic_treatment.encode(),
        "Systemic_Treatment_first_date" => encode_date(r.systemic_treatment_first_date),
        "Systemic_Treatment_last_date" => encode_date(r.systemic_treatment_last_date),
        "Dose_per_Fraction" => r.dose_per_fraction.to_string(),
        "Fractionation" => r.fractionation.to_string(),
        "Dysuria" => r.dysuria.label().to_owned(),
        "Ureteral_Stenosis" => r.ureteral_stenosis.label().to_owned(),
        "Ureteral_Stenosis_Date" => r.ureteral_stenosis_date.map(encode_date).to_string(),
        "Overall_Tolerance" => r.overall_tolerance.label().to_owned(),
        "Local_Recurrence" => r.local_recurrence.label().to_owned(),
        "Local_Recurrence_date" => r.local_recurrence_date.map(encode_date).to_string(),
        "Time_to_Local_Recurrence" => r.time_to_local_recurrence.to_string(),
        "Regional_Recurrence" => r.regional_recurrence.label().to_owned(),
        "Regional_Recurrence_date" => r.regional_recurrence_date.map(encode_date).to_string(),
        "Time_to_Regional_Recurrence" => r.time_to_regional_recurrence.to_string(),
        "Distant_Recurrence" => r.distant_recurrence.label().to_owned(),
        "Distant_Recurrence_date" => r.distant_recurrence_date.map(encode_date).to_string(),
        "Time_to_Distant_Recurrence" => r.time_to_distant_recurrence.to_string(),
        "Death" => r.death.label().to_owned(),
        "Death_date" => r.death_date.map(encode_date).to_string(),
        "Cancer_Related_Death" => r.cancer_related_death.map(|c| c.label()).to_string(),
        "Time_to_Death" => r.time_to_death.to_string(),
        other => match toxicity_for_column(other) {
            Some(toxicity) => toxicity.label(r.side_effects.get(toxicity)).to_owned(),
            None => String::new(),
        },
    }
}

fn toxicity_for_column(column: &str) -> Option<Toxicity> {
    Toxicity::ALL.iter().copied().find(|t| t.column() == column)
}

/// Cells of one data row, addressed by column name.
struct RowCells<'a> {
    header: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
    line: u64,
}

impl RowCells<'_> {
    /// Trimmed cell text; empty when the column is missing from this table.
    fn cell(&self, column: &str) -> &str {
        self.header
            .get(column)
            .and_then(|&i| self.record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn defaulted(&self, column: &str, value: &str, fallback: &str) {
        tracing::warn!(
            line = self.line,
            column,
            value,
            "unreadable registry cell; using {}",
            fallback
        );
    }

    fn date(&self, column: &str) -> NaiveDate {
        let cell = self.cell(column);
        if cell.is_empty() {
            return sentinel_date();
        }
        parse_date(cell).unwrap_or_else(|| {
            self.defaulted(column, cell, "sentinel date");
            sentinel_date()
        })
    }

    fn applicable<T>(
        &self,
        column: &str,
        parse_value: impl FnOnce(&str) -> Option<T>,
    ) -> Applicable<T> {
        match Applicable::parse(self.cell(column), parse_value) {
            Ok(value) => value,
            Err(ValueError::Invalid(text)) => {
                self.defaulted(column, &text, NOT_APPLICABLE);
                Applicable::NotApplicable
            }
        }
    }

    fn applicable_date(&self, column: &str) -> Applicable<NaiveDate> {
        self.applicable(column, parse_date)
    }

    fn int(&self, column: &str) -> i32 {
        let cell = self.cell(column);
        if cell.is_empty() {
            return 0;
        }
        parse_int(cell).unwrap_or_else(|| {
            self.defaulted(column, cell, "0");
            0
        })
    }

    fn applicable_int(&self, column: &str) -> Applicable<i32> {
        self.applicable(column, parse_int)
    }

    fn count(&self, column: &str) -> BoundedCount {
        let value = self.int(column);
        u32::try_from(value)
            .ok()
            .and_then(|v| BoundedCount::new(v).ok())
            .unwrap_or_else(|| {
                self.defaulted(column, &value.to_string(), "0");
                BoundedCount::default()
            })
    }

    fn choice<T: Choice>(&self, column: &str) -> T {
        let cell = self.cell(column);
        if cell.is_empty() {
            return T::default();
        }
        T::from_label(cell).unwrap_or_else(|| {
            self.defaulted(column, cell, T::default().label());
            T::default()
        })
    }

    fn applicable_choice<T: Choice>(&self, column: &str) -> Applicable<T> {
        self.applicable(column, T::from_label)
    }

    fn labels(&self, column: &str) -> LabelList {
        let cell = self.cell(column);
        LabelList::decode(cell).unwrap_or_else(|| {
            self.defaulted(column, cell, "empty list");
            LabelList::default()
        })
    }

    fn grades(&self) -> ToxicityGrades {
        let mut grades = ToxicityGrades::default();
        for toxicity in Toxicity::ALL.iter().copied() {
            let column = toxicity.column();
            let cell = self.cell(column);
            if cell.is_empty() {
                continue;
            }
            match toxicity.parse_label(cell) {
                Some(grade) => {
                    // parse_label only returns admissible grades
                    let _ = grades.set(toxicity, grade);
                }
                None => self.defaulted(column, cell, toxicity.label(CtcaeGrade::Absent)),
            }
        }
        grades
    }
}

/// Parses a stored date. Spreadsheet exports sometimes append a midnight time; only the
/// leading `YYYY-MM-DD` is read in that case.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell, DATE_FORMAT)
        .ok()
        .or_else(|| {
            cell.get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, DATE_FORMAT).ok())
        })
}

/// Parses a stored integer, accepting whole floats such as `14.0`.
fn parse_int(cell: &str) -> Option<i32> {
    if let Ok(value) = cell.parse::<i32>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

fn decode_row(c: &RowCells<'_>) -> PatientRecord {
    PatientRecord {
        mrn: Mrn::new(c.cell("MRN")),
        date_of_birth: c.date("Date_of_Birth"),
        age: c.int("Age"),
        last_radiotherapy_date: c.date("Date_of_Last_Radiotherapy"),
        follow_up_date: c.date("Follow_up_date"),
        follow_up_months: c.int("Follow_up_time"),
        histology: c.labels("Histology"),
        grade: c.choice("Grade"),
        necrosis: c.choice("Necrosis"),
        lvi: c.choice("LVI"),
        mitotic_count: c.count("Mitotic_Count"),
        location: c.choice("Location"),
        clinical_stage_extremity: c.labels("Clinical_Stage_Extremity"),
        clinical_stage_retroperitoneum: c.labels("Clinical_Stage_Retroperitoneum"),
        biopsy_date: c.date("Biopsy_date"),
        recurrent_tumor: c.choice("Recurrent_Tumor"),
        recurrence_date: c.applicable_date("Recurrence_date"),
        surgery_date: c.applicable_date("Surgery_date"),
        systemic_treatment: c.labels("Systemic_Treatment"),
        systemic_treatment_first_date: c.date("Systemic_Treatment_first_date"),
        systemic_treatment_last_date: c.date("Systemic_Treatment_last_date"),
        dose_per_fraction: c.count("Dose_per_Fraction"),
        fractionation: c.count("Fractionation"),
        dysuria: c.choice("Dysuria"),
        ureteral_stenosis: c.choice("Ureteral_Stenosis"),
        ureteral_stenosis_date: c.applicable_date("Ureteral_Stenosis_Date"),
        side_effects: c.grades(),
        overall_tolerance: c.choice("Overall_Tolerance"),
        local_recurrence: c.choice("Local_Recurrence"),
        local_recurrence_date: c.applicable_date("Local_Recurrence_date"),
        time_to_local_recurrence: c.applicable_int("Time_to_Local_Recurrence"),
        regional_recurrence: c.choice("Regional_Recurrence"),
        regional_recurrence_date: c.applicable_date("Regional_Recurrence_date"),
        time_to_regional_recurrence: c.applicable_int("Time_to_Regional_Recurrence"),
        distant_recurrence: c.choice("Distant_Recurrence"),
        distant_recurrence_date: c.applicable_date("Distant_Recurrence_date"),
        time_to_distant_recurrence: c.applicable_int("Time_to_Distant_Recurrence"),
        death: c.choice("Death"),
        death_date: c.applicable_date("Death_date"),
        cancer_related_death: c.applicable_choice("Cancer_Related_Death"),
        time_to_death: c.applicable_int("Time_to_Death"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        DeathEvent, DerivedIntervals, Event, FormInput, Grade, Location, Presence, YesNo,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn sample_record() -> PatientRecord {
        let mut input = FormInput::blank(Mrn::new("A123"), date(2024, 6, 1));
        input.date_of_birth = date(1965, 2, 3);
        input.last_radiotherapy_date = date(2022, 4, 20);
        input.histology = LabelList::new(["Myxofibrosarcoma", "Glomus tumour, malignant"]);
        input.grade = Grade::III;
        input.location = Location::Retroperitoneum;
        input.clinical_stage_retroperitoneum = LabelList::new(["cT2b", "cN0", "M0"]);
        input.clinical_stage_extremity = LabelList::new(["Non Extremity"]);
        input.ureteral_stenosis = Presence::Present;
        input.ureteral_stenosis_date = date(2023, 3, 3);
        input
            .side_effects
            .set(Toxicity::Cystitis, CtcaeGrade::II)
            .expect("cystitis admits II");
        input.local_recurrence = Event {
            occurred: YesNo::Yes,
            date: date(2023, 10, 1),
        };
        input.death = DeathEvent {
            occurred: YesNo::Yes,
            date: date(2024, 2, 1),
            cancer_related: YesNo::No,
        };

        let derived = DerivedIntervals::compute(&input, date(2024, 6, 1));
        PatientRecord::from_form(&input, &derived)
    }

    #[test]
    fn columns_are_unique_and_cover_every_toxicity() {
        let mut seen = std::collections::HashSet::new();
        for column in COLUMNS {
            assert!(seen.insert(*column), "duplicate column {column}");
        }
        for toxicity in Toxicity::ALL {
            assert!(
                COLUMNS.contains(&toxicity.column()),
                "missing column for {}",
                toxicity.column()
            );
        }
    }

    #[test]
    fn encoded_row_is_aligned_with_header() {
        let row = encode_row(&sample_record());
        assert_eq!(row.len(), COLUMNS.len());
        assert!(row.iter().all(|cell| !cell.is_empty()), "no cell may be blank");
    }

    #[test]
    fn write_then_read_restores_record() {
        let record = sample_record();
        let mut buffer = Vec::new();
        write_table(&mut buffer, std::slice::from_ref(&record)).expect("write table");

        let rows = read_table(buffer.as_slice()).expect("read table");
        assert_eq!(rows, vec![record]);
    }

    #[test]
    fn empty_table_still_has_header() {
        let mut buffer = Vec::new();
        write_table(&mut buffer, &[]).expect("write table");
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text.trim_end(), COLUMNS.join(","));
        assert!(read_table(text.as_bytes()).expect("read table").is_empty());
    }

    #[test]
    fn sentinel_cells_are_written_literally() {
        let record = sample_record();
        let row = encode_row(&record);
        let cell = |name: &str| {
            let i = COLUMNS.iter().position(|c| *c == name).expect("known column");
            row[i].clone()
        };
        assert_eq!(cell("Recurrence_date"), "N/A");
        assert_eq!(cell("Time_to_Regional_Recurrence"), "N/A");
        assert_eq!(cell("Time_to_Local_Recurrence"), "18");
        assert_eq!(cell("Cancer_Related_Death"), "No");
        assert_eq!(cell("Cystitis"), "II");
        assert_eq!(cell("Hematuria"), "Absent");
        assert_eq!(cell("Fatigue"), "None");
    }

    #[test]
    fn missing_mrn_header_is_an_error() {
        let err = read_table("Name,Age\nx,1\n".as_bytes()).expect_err("no MRN column");
        assert!(matches!(err, TableError::MissingColumn("MRN")));
    }

    #[test]
    fn ragged_rows_are_an_error() {
        let err = read_table("MRN,Age\nA1,3,extra\n".as_bytes()).expect_err("ragged row");
        assert!(matches!(err, TableError::Csv(_)));
    }

    #[test]
    fn sparse_table_decodes_with_defaults() {
        let text = "MRN,Grade,Histology,Biopsy_date,Necrosis,Age,Cystitis\n A9 ,Bogus,['x'],,Absent,41.0,VII\n";
        let rows = read_table(text.as_bytes()).expect("read sparse table");
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.mrn.as_str(), "A9");
        assert_eq!(row.grade, Grade::NotReported);
        assert!(row.histology.is_empty());
        assert_eq!(row.biopsy_date, sentinel_date());
        assert_eq!(row.date_of_birth, sentinel_date());
        assert_eq!(row.necrosis, crate::record::Finding::Absent);
        assert_eq!(row.age, 41);
        assert_eq!(row.side_effects.get(Toxicity::Cystitis), CtcaeGrade::Absent);
        assert_eq!(row.recurrence_date, Applicable::NotApplicable);
    }

    #[test]
    fn conditional_cells_fall_back_to_not_applicable() {
        let text = "MRN,Recurrence_date,Time_to_Death,Cancer_Related_Death\n\
                    A1,soon,N/A,Maybe\n\
                    A2,2020-01-01 00:00:00,7.0,Yes\n";
        let rows = read_table(text.as_bytes()).expect("read table");

        assert_eq!(rows[0].recurrence_date, Applicable::NotApplicable);
        assert_eq!(rows[0].time_to_death, Applicable::NotApplicable);
        assert_eq!(rows[0].cancer_related_death, Applicable::NotApplicable);

        assert_eq!(rows[1].recurrence_date, Applicable::Value(date(2020, 1, 1)));
        assert_eq!(rows[1].time_to_death, Applicable::Value(7));
        assert_eq!(rows[1].cancer_related_death, Applicable::Value(YesNo::Yes));
    }

    #[test]
    fn legacy_headers_are_read_as_current_columns() {
        let text = "MRN,Mytotic_Count,Dose,Overal_tolerance,time_to_death,Time_to_Death\nA1,12,3,Poor,7,9\n";
        let rows = read_table(text.as_bytes()).expect("read legacy table");
        let row = &rows[0];
        assert_eq!(row.mitotic_count.get(), 12);
        assert_eq!(row.dose_per_fraction.get(), 3);
        assert_eq!(row.overall_tolerance, crate::record::Tolerance::Poor);
        assert_eq!(row.time_to_death, Applicable::Value(9), "current header wins");
    }

    #[test]
    fn parse_date_accepts_spreadsheet_timestamps() {
        assert_eq!(parse_date("2021-03-01"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("2021-03-01 00:00:00"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("01/03/2021"), None);
    }

    #[test]
    fn parse_int_accepts_whole_floats_only() {
        assert_eq!(parse_int("14"), Some(14));
        assert_eq!(parse_int("14.0"), Some(14));
        assert_eq!(parse_int("14.5"), None);
        assert_eq!(parse_int("-3"), Some(-3));
    }
}
