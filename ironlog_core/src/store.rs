//! File-backed workout journal.
//!
//! All sessions live in one JSON document keyed by date. Every write is a
//! load-modify-save under an exclusive lock on a sidecar `.lock` file, and the
//! document itself is replaced atomically through a temp file in the same
//! directory.

use crate::gateway::PersistenceGateway;
use crate::{Error, Result, SessionRecord, SetRecord};
use chrono::{DateTime, NaiveDate, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Every recorded session, keyed by calendar date
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub sessions: BTreeMap<NaiveDate, SessionRecord>,
}

impl Journal {
    /// Load the journal with a shared lock.
    ///
    /// Returns an empty journal if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns an empty journal.
    /// Read-only callers use this; writers go through [`Journal::update`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match read_locked(path) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                tracing::debug!("No journal at {:?}, starting empty", path);
                return Ok(Self::default());
            }
            Err(e) => {
                tracing::warn!("Unable to read journal {:?}: {}. Starting empty.", path, e);
                return Ok(Self::default());
            }
        };

        match serde_json::from_str::<Journal>(&contents) {
            Ok(journal) => {
                tracing::debug!(
                    "Loaded journal with {} sessions from {:?}",
                    journal.sessions.len(),
                    path
                );
                Ok(journal)
            }
            Err(e) => {
                tracing::warn!("Failed to parse journal {:?}: {}. Starting empty.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Load the journal for a read-modify-write.
    ///
    /// Unlike [`Journal::load`], an unreadable file is an error so the caller
    /// never saves over it. A file that reads but does not parse is moved to
    /// `<name>.corrupt-<timestamp>` and the journal starts empty.
    fn load_for_update(path: &Path) -> Result<Self> {
        let Some(contents) = read_locked(path)? else {
            return Ok(Self::default());
        };

        match serde_json::from_str::<Journal>(&contents) {
            Ok(journal) => Ok(journal),
            Err(e) => {
                let quarantine = corrupt_path(path);
                std::fs::rename(path, &quarantine)?;
                tracing::warn!(
                    "Failed to parse journal {:?}: {}. Moved it to {:?} and starting empty.",
                    path,
                    e,
                    quarantine
                );
                Ok(Self::default())
            }
        }
    }

    /// Atomically replace the journal file with this journal
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("journal path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved journal to {:?}", path);
        Ok(())
    }

    /// Load, modify and save the journal while holding the journal lock
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut Journal) -> Result<()>,
    {
        let lock = acquire_lock(path)?;

        let mut journal = Self::load_for_update(path)?;
        f(&mut journal)?;
        journal.save(path)?;

        lock.unlock()?;
        Ok(journal)
    }

    /// Create the session for `date_key` unless it already exists
    pub fn ensure_session(&mut self, date_key: NaiveDate, started_at: DateTime<Utc>) -> &SessionRecord {
        let session = self
            .sessions
            .entry(date_key)
            .or_insert_with(|| SessionRecord::new(date_key));
        if session.started_at.is_none() {
            session.started_at = Some(started_at);
        }
        session
    }

    /// Insert or overwrite the set with the same exercise and set index
    pub fn upsert_set(&mut self, date_key: NaiveDate, set: &SetRecord) -> Result<()> {
        let session = self
            .sessions
            .get_mut(&date_key)
            .ok_or_else(|| Error::Store(format!("no session for {}", date_key)))?;

        match session
            .sets
            .iter_mut()
            .find(|s| s.exercise_id == set.exercise_id && s.set_index == set.set_index)
        {
            Some(existing) => *existing = set.clone(),
            None => session.sets.push(set.clone()),
        }
        Ok(())
    }

    pub fn finish_session(&mut self, date_key: NaiveDate, duration_seconds: u64) -> Result<()> {
        let session = self
            .sessions
            .get_mut(&date_key)
            .ok_or_else(|| Error::Store(format!("no session for {}", date_key)))?;
        session.duration_seconds = Some(duration_seconds);
        Ok(())
    }
}

/// Read the whole file under a shared lock; `None` when it doesn't exist
fn read_locked(path: &Path) -> Result<Option<String>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(Some(contents))
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3f")));
    path.with_file_name(name)
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

fn acquire_lock(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?;
    lock.lock_exclusive()?;
    Ok(lock)
}

/// [`PersistenceGateway`] over a journal file
#[derive(Clone, Debug)]
pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Journal> {
        Journal::load(&self.path)
    }
}

impl PersistenceGateway for JournalStore {
    fn ensure_session_started(
        &mut self,
        date_key: NaiveDate,
        started_at: DateTime<Utc>,
    ) -> Result<()> {
        Journal::update(&self.path, |journal| {
            journal.ensure_session(date_key, started_at);
            Ok(())
        })?;
        tracing::debug!("Ensured session for {}", date_key);
        Ok(())
    }

    fn record_set(&mut self, date_key: NaiveDate, set: &SetRecord) -> Result<()> {
        Journal::update(&self.path, |journal| journal.upsert_set(date_key, set))?;
        tracing::debug!(
            "Recorded {} set {} for {}",
            set.exercise_id,
            set.set_index,
            date_key
        );
        Ok(())
    }

    fn finish_session(&mut self, date_key: NaiveDate, duration_seconds: u64) -> Result<()> {
        Journal::update(&self.path, |journal| {
            journal.finish_session(date_key, duration_seconds)
        })?;
        tracing::info!("Session {} finished after {}s", date_key, duration_seconds);
        Ok(())
    }
}
