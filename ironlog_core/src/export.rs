//! CSV export of recorded sets.
//!
//! Produces one row per set across every journal session. The export is
//! written to a temp file, synced, and then renamed over the destination so a
//! reader never sees a half-written file.

use crate::store::Journal;
use crate::{Error, Result, SessionRecord, SetRecord};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    session_id: String,
    exercise_id: String,
    set_index: u32,
    weight: Option<f64>,
    reps: u32,
    recorded_at: String,
    session_duration: Option<u64>,
}

impl CsvRow {
    fn new(session: &SessionRecord, set: &SetRecord) -> Self {
        CsvRow {
            date: session.date_key.to_string(),
            session_id: session.id.to_string(),
            exercise_id: set.exercise_id.clone(),
            set_index: set.set_index,
            weight: set.weight,
            reps: set.reps,
            recorded_at: set.recorded_at.to_rfc3339(),
            session_duration: session.duration_seconds,
        }
    }
}

/// Export every set in the journal at `journal_path` to `csv_path`
///
/// Returns the number of rows written (headers excluded). The destination is
/// replaced, not appended to.
pub fn export_sets_csv(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let journal = Journal::load(journal_path)?;
    write_sets_csv(&journal, csv_path)
}

/// Write the sets of `journal` to `csv_path`
pub fn write_sets_csv(journal: &Journal, csv_path: &Path) -> Result<usize> {
    let parent = csv_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    let mut count = 0;
    for session in journal.sessions.values() {
        for set in &session.sets {
            writer.serialize(CsvRow::new(session, set))?;
            count += 1;
        }
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sets to {:?}", count, csv_path);
    Ok(count)
}
