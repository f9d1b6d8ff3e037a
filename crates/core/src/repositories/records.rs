//! Patient registry store.
//!
//! All submissions live in one CSV file (see [`crate::table`] for the row format). The store
//! is append-only: saving a patient whose MRN is already present adds a second row, and lookups
//! return the first row that matches.
//!
//! ## Write path
//!
//! Every append rewrites the whole table:
//!
//! 1. Reload the current table from disk (a missing file is an empty table)
//! 2. Push the new row
//! 3. Write the table to a temporary file in the same directory
//! 4. Rename it over the store path
//!
//! The rename means a reader never sees a half-written table, and a failed write leaves the
//! previous file untouched. There is no locking between processes; two concurrent appends can
//! lose one row.

use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::record::PatientRecord;
use crate::table::{read_table, write_table};
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// LOOKUP
// ============================================================================

/// Returns the first row whose MRN equals `mrn` after trimming. Matching is case-sensitive and
/// an empty MRN never matches.
pub fn find_by_mrn<'a>(rows: &'a [PatientRecord], mrn: &str) -> Option<&'a PatientRecord> {
    let mrn = mrn.trim();
    if mrn.is_empty() {
        return None;
    }
    rows.iter().find(|row| row.mrn.matches(mrn))
}

// ============================================================================
// RECORD STORE
// ============================================================================

/// File-backed store of patient rows.
#[derive(Clone, Debug)]
pub struct RecordStore {
    cfg: Arc<RegistryConfig>,
}

impl RecordStore {
    /// Creates a store over the configured path. Nothing is read until the first call.
    pub fn new(cfg: Arc<RegistryConfig>) -> Self {
        Self { cfg }
    }

    pub fn path(&self) -> &Path {
        self.cfg.store_path()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.cfg
    }

    /// Loads every stored row in file order.
    ///
    /// A store file that does not exist yet is an empty table.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::StorageRead` if the file exists but cannot be read or is not a
    /// registry table.
    pub fn load_all(&self) -> RegistryResult<Vec<PatientRecord>> {
        let path = self.path();
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %path.display(),
                    "registry store not found; treating as empty"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(RegistryError::storage_read(path, e)),
        };

        let rows = read_table(BufReader::new(file))
            .map_err(|e| RegistryError::storage_read(path, e))?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "loaded registry store");

        Ok(rows)
    }

    /// Loads the store and returns the first row for `mrn`, if any.
    pub fn find(&self, mrn: &str) -> RegistryResult<Option<PatientRecord>> {
        let rows = self.load_all()?;
        Ok(find_by_mrn(&rows, mrn).cloned())
    }

    /// Appends one row and persists the whole table atomically.
    ///
    /// Returns the table as written. The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// - `RegistryError::StorageRead` if the existing table cannot be loaded
    /// - `RegistryError::StorageWrite` if the new table cannot be written; the previous file is
    ///   left as it was
    pub fn append(&self, record: PatientRecord) -> RegistryResult<Vec<PatientRecord>> {
        let mut rows = self.load_all()?;
        let mrn = record.mrn.to_string();
        rows.push(record);

        self.persist(&rows)?;
        tracing::info!(
            path = %self.path().display(),
            mrn = %mrn,
            rows = rows.len(),
            "appended registry row"
        );

        Ok(rows)
    }

    fn persist(&self, rows: &[PatientRecord]) -> RegistryResult<()> {
        let path = self.path();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| RegistryError::storage_write(path, e))?;

        let temp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| RegistryError::storage_write(path, e))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            write_table(&mut writer, rows).map_err(|e| RegistryError::storage_write(path, e))?;
            writer
                .flush()
                .map_err(|e| RegistryError::storage_write(path, e))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| RegistryError::storage_write(path, e))?;
        temp.persist(path)
            .map_err(|e| RegistryError::storage_write(path, e.error))?;

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        CtcaeGrade, DerivedIntervals, FormInput, Grade, LabelList, Presence, Toxicity, YesNo,
    };
    use chrono::NaiveDate;
    use registry_types::{Applicable, Mrn};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn setup_test_store() -> (TempDir, RecordStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = Arc::new(
            RegistryConfig::new(
                temp_dir.path().join("registry_data").join("patients.csv"),
                Some(date(2024, 6, 1)),
            )
            .expect("Failed to create config"),
        );
        (temp_dir, RecordStore::new(cfg))
    }

    fn record_for(mrn: &str) -> PatientRecord {
        let today = date(2024, 6, 1);
        let mut input = FormInput::blank(Mrn::new(mrn), today);
        input.date_of_birth = date(1980, 1, 1);
        input.last_radiotherapy_date = date(2023, 1, 1);
        input.histology = LabelList::new(["Myxoid liposarcoma", "Glomus tumour, malignant"]);
        let derived = DerivedIntervals::compute(&input, today);
        PatientRecord::from_form(&input, &derived)
    }

    #[test]
    fn test_load_all_missing_file_is_empty() {
        let (_temp, store) = setup_test_store();
        let rows = store.load_all().expect("missing store should load");
        assert!(rows.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_creates_directory_and_file() {
        let (_temp, store) = setup_test_store();
        let rows = store.append(record_for("A1")).expect("append should succeed");
        assert_eq!(rows.len(), 1);
        assert!(store.path().is_file());

        let loaded = store.load_all().expect("reload");
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_append_grows_table_by_one() {
        let (_temp, store) = setup_test_store();
        store.append(record_for("A1")).expect("first append");
        store.append(record_for("B2")).expect("second append");

        let before = store.load_all().expect("load").len();
        store.append(record_for("C3")).expect("third append");
        assert_eq!(store.load_all().expect("load").len(), before + 1);
    }

    #[test]
    fn test_saving_same_mrn_twice_keeps_both_rows() {
        let (_temp, store) = setup_test_store();
        let mut first = record_for("A1");
        first.grade = Grade::I;
        let mut second = record_for("A1");
        second.grade = Grade::III;

        store.append(first).expect("first append");
        store.append(second).expect("second append");

        let rows = store.load_all().expect("load");
        assert_eq!(rows.len(), 2);
        let found = store.find("A1").expect("find").expect("row exists");
        assert_eq!(found.grade, Grade::I, "lookup returns the first row");
    }

    #[test]
    fn test_lists_and_sentinels_survive_reload() {
        let (_temp, store) = setup_test_store();
        let mut record = record_for("A1");
        record.ureteral_stenosis = Presence::Absent;
        record.ureteral_stenosis_date = Applicable::NotApplicable;
        record.recurrent_tumor = YesNo::No;
        record
            .side_effects
            .set(Toxicity::RectalPain, CtcaeGrade::III)
            .expect("rectal pain admits III");

        store.append(record.clone()).expect("append");
        let loaded = store.find("A1").expect("find").expect("row exists");

        assert_eq!(loaded.histology, record.histology);
        assert_eq!(loaded.recurrence_date, Applicable::NotApplicable);
        assert_eq!(loaded.ureteral_stenosis_date, Applicable::NotApplicable);
        assert_eq!(loaded.side_effects.get(Toxicity::RectalPain), CtcaeGrade::III);

        let text = fs::read_to_string(store.path()).expect("read store");
        assert!(text.contains("N/A"), "sentinel is written literally");
    }

    #[test]
    fn test_empty_mrn_is_persisted_as_sentinel() {
        let (_temp, store) = setup_test_store();
        store.append(record_for("")).expect("append");

        let rows = store.load_all().expect("load");
        assert_eq!(rows[0].mrn.as_str(), "N/A");
    }

    #[test]
    fn test_find_trims_and_is_case_sensitive() {
        let (_temp, store) = setup_test_store();
        store.append(record_for("AbC9")).expect("append");

        assert!(store.find("  AbC9 ").expect("find").is_some());
        assert!(store.find("abc9").expect("find").is_none());
        assert!(store.find("").expect("find").is_none());
    }

    #[test]
    fn test_find_by_mrn_returns_first_match() {
        let rows = vec![record_for("X"), record_for("Y"), record_for("X")];
        let found = find_by_mrn(&rows, "X").expect("match");
        assert!(std::ptr::eq(found, &rows[0]));
        assert!(find_by_mrn(&rows, "Z").is_none());
        assert!(find_by_mrn(&rows, "   ").is_none());
    }

    #[test]
    fn test_corrupt_store_is_storage_read_error() {
        let (_temp, store) = setup_test_store();
        fs::create_dir_all(store.path().parent().expect("has parent")).expect("mkdir");
        fs::write(store.path(), "Name,Age\nBob,3\n").expect("write corrupt store");

        let err = store.load_all().expect_err("not a registry table");
        assert!(matches!(err, RegistryError::StorageRead { .. }));

        let err = store.append(record_for("A1")).expect_err("append must not overwrite");
        assert!(matches!(err, RegistryError::StorageRead { .. }));
        let text = fs::read_to_string(store.path()).expect("read store");
        assert_eq!(text, "Name,Age\nBob,3\n");
    }

    #[test]
    fn test_store_reads_rows_written_by_spreadsheet_tools() {
        let (_temp, store) = setup_test_store();
        fs::create_dir_all(store.path().parent().expect("has parent")).expect("mkdir");
        fs::write(
            store.path(),
            "Histology,MRN,Grade,Date_of_Birth\n\"[\"\"Angiosarcoma\"\"]\",Q7,II,1975-05-05 00:00:00\n",
        )
        .expect("write store");

        let row = store.find("Q7").expect("find").expect("row exists");
        assert_eq!(row.grade, Grade::II);
        assert!(row.histology.contains("Angiosarcoma"));
        assert_eq!(row.date_of_birth, date(1975, 5, 5));
    }

    #[test]
    fn test_write_failure_is_storage_write_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("registry_data");
        fs::write(&blocker, "not a directory").expect("write blocker file");
        let cfg = Arc::new(
            RegistryConfig::new(blocker.join("patients.csv"), Some(date(2024, 6, 1)))
                .expect("Failed to create config"),
        );
        let store = RecordStore::new(cfg);

        let err = store
            .persist(&[record_for("A1")])
            .expect_err("parent is a regular file");
        match err {
            RegistryError::StorageWrite { path, .. } => assert_eq!(path, store.path()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            fs::read_to_string(&blocker).expect("read blocker"),
            "not a directory"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_append_leaves_previous_file_untouched() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, store) = setup_test_store();
        store.append(record_for("A1")).expect("first append");
        let before = fs::read_to_string(store.path()).expect("read store");

        let dir = store.path().parent().expect("has parent").to_path_buf();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).expect("chmod");
        if tempfile::NamedTempFile::new_in(&dir).is_ok() {
            // Permission bits are not enforced for this user (e.g. root).
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).expect("chmod");
            return;
        }

        let result = store.append(record_for("B2"));
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).expect("chmod");

        let err = result.expect_err("directory is read-only");
        assert!(matches!(err, RegistryError::StorageWrite { .. }));
        assert_eq!(fs::read_to_string(store.path()).expect("read store"), before);
        assert_eq!(store.load_all().expect("reload").len(), 1);
    }
}
