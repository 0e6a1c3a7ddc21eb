//! Session history for the calendar view.
//!
//! Summarizes journal sessions within a window of days so a caller can show
//! which dates had a workout and how much was done.

use crate::store::Journal;
use crate::{Result, SessionRecord};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Per-date workout summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub date_key: NaiveDate,
    pub exercises: usize,
    pub sets: usize,
    /// Sum of weight × reps over weighted sets
    pub volume: f64,
    pub duration_seconds: Option<u64>,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(session: &SessionRecord) -> Self {
        let exercises = session
            .sets
            .iter()
            .map(|s| s.exercise_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let volume = session
            .sets
            .iter()
            .map(|s| s.weight.unwrap_or(0.0) * f64::from(s.reps))
            .sum();

        SessionSummary {
            date_key: session.date_key,
            exercises,
            sets: session.sets.len(),
            volume,
            duration_seconds: session.duration_seconds,
        }
    }
}

/// Sessions from the last `days` days up to and including `today`, newest first
///
/// A window reaching past the earliest representable date covers everything.
pub fn recent_sessions(journal: &Journal, today: NaiveDate, days: i64) -> Vec<SessionSummary> {
    let cutoff = Duration::try_days(days.max(1) - 1)
        .and_then(|span| today.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN);

    let summaries: Vec<SessionSummary> = journal
        .sessions
        .range(cutoff..=today)
        .rev()
        .map(|(_, session)| SessionSummary::from(session))
        .collect();

    tracing::debug!(
        "Found {} sessions between {} and {}",
        summaries.len(),
        cutoff,
        today
    );
    summaries
}

/// Load the journal at `path` and summarize its recent sessions
pub fn load_recent_sessions(
    path: &Path,
    today: NaiveDate,
    days: i64,
) -> Result<Vec<SessionSummary>> {
    let journal = Journal::load(path)?;
    Ok(recent_sessions(&journal, today, days))
}
