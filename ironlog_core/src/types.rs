//! Core domain types for ironlog.
//!
//! This module defines the fundamental types used throughout the system:
//! - Plans, plan items and rep targets
//! - The engine cursor and completed-set log entries
//! - Session and set records owned by the persistence gateway
//! - Effects emitted by the engine for the gateway to apply

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Plan Types
// ============================================================================

/// Rep target for an exercise: an exact count, an inclusive range, or free text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RepTarget {
    Exact(u32),
    Range { min: u32, max: u32 },
    Text(String),
}

impl RepTarget {
    /// Parse a rep target such as `"10"`, `"8-12"` or `"AMRAP"`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<u32>() {
            return RepTarget::Exact(n);
        }

        if let Some((lo, hi)) = trimmed.split_once(['-', '–']) {
            if let (Ok(min), Ok(max)) = (lo.trim().parse::<u32>(), hi.trim().parse::<u32>()) {
                if min <= max {
                    return RepTarget::Range { min, max };
                }
            }
        }

        RepTarget::Text(trimmed.to_string())
    }

    /// Lowest rep count the target asks for, if it is numeric
    pub fn minimum(&self) -> Option<u32> {
        match self {
            RepTarget::Exact(n) => Some(*n),
            RepTarget::Range { min, .. } => Some(*min),
            RepTarget::Text(_) => None,
        }
    }
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepTarget::Exact(n) => write!(f, "{}", n),
            RepTarget::Range { min, max } => write!(f, "{}-{}", min, max),
            RepTarget::Text(s) => f.write_str(s),
        }
    }
}

impl From<RepTarget> for String {
    fn from(target: RepTarget) -> Self {
        target.to_string()
    }
}

impl From<String> for RepTarget {
    fn from(raw: String) -> Self {
        RepTarget::parse(&raw)
    }
}

/// One exercise slot in a plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub exercise_id: String,
    pub exercise_name: String,
    /// 1-based training day this item belongs to
    pub day: u32,
    pub order_index: u32,
    pub target_sets: u32,
    pub target_reps: RepTarget,
}

/// A complete training plan, items sorted by `(day, order_index)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub items: Vec<PlanItem>,
}

/// The items of a single plan day, in execution order
///
/// This is the only plan shape the workout engine sees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub plan_id: String,
    pub plan_name: String,
    pub day: u32,
    pub items: Vec<PlanItem>,
}

impl PlanDay {
    /// Sum of target sets across the day's items, saturating at `u32::MAX`
    pub fn total_sets(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.target_sets))
    }
}

// ============================================================================
// Engine Types
// ============================================================================

/// Position of the engine within a plan day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// 0-based index into the day's items; equals `items.len()` once finished
    pub exercise_index: usize,
    /// 1-based set number within the current item
    pub set_number: u32,
}

impl Cursor {
    pub fn start() -> Self {
        Self {
            exercise_index: 0,
            set_number: 1,
        }
    }
}

/// A set the user has submitted during the current session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletedSet {
    pub exercise_id: String,
    pub set_index: u32,
    pub weight: Option<f64>,
    pub reps: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Transient rest countdown state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestState {
    pub is_resting: bool,
    pub seconds_remaining: u32,
}

/// Input for submitting the current set
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetInput {
    /// Load lifted; `None` or zero for bodyweight work
    pub weight: Option<f64>,
    pub reps: i64,
    /// Rest before the next set; absent or non-positive falls back to the default
    pub rest_seconds: Option<i64>,
}

impl SetInput {
    pub fn new(weight: Option<f64>, reps: i64) -> Self {
        Self {
            weight,
            reps,
            rest_seconds: None,
        }
    }

    pub fn with_rest(mut self, rest_seconds: i64) -> Self {
        self.rest_seconds = Some(rest_seconds);
        self
    }
}

// ============================================================================
// Persistence Types
// ============================================================================

/// A set as stored by the persistence gateway
///
/// Keyed by `(date_key, exercise_id, set_index)`; resubmitting the same key
/// overwrites the previous values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub exercise_id: String,
    pub set_index: u32,
    pub weight: Option<f64>,
    pub reps: u32,
    pub recorded_at: DateTime<Utc>,
}

/// A workout session for one calendar date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub date_key: NaiveDate,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
}

impl SessionRecord {
    pub fn new(date_key: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date_key,
            started_at: None,
            duration_seconds: None,
            sets: Vec::new(),
        }
    }
}

/// Persistence work requested by the engine
///
/// The engine never performs I/O itself; callers hand these to a gateway.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    EnsureSessionStarted {
        date_key: NaiveDate,
        started_at: DateTime<Utc>,
    },
    RecordSet {
        date_key: NaiveDate,
        set: SetRecord,
    },
    FinishSession {
        date_key: NaiveDate,
        duration_seconds: u64,
    },
}
