#![forbid(unsafe_code)]

//! Core domain model and workout session engine for ironlog.
//!
//! This crate provides:
//! - Domain types (plans, cursor, completed sets, sessions, effects)
//! - Plan normalization and built-in FBW/SPLIT templates
//! - Session clock and rest timer
//! - The workout engine state machine
//! - Persistence gateway, effect dispatcher and file-backed journal
//! - History summaries and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod clock;
pub mod timer;
pub mod plan;
pub mod templates;
pub mod engine;
pub mod gateway;
pub mod store;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use clock::{Clock, SessionClock};
pub use timer::{RestHandle, RestTimer, TickOutcome};
pub use plan::{normalize_plan, normalize_plan_str, JsonPlanFile, PlanSource};
pub use templates::{build_template, BuiltinPlan, TemplateKind};
pub use engine::{EnginePhase, EngineSnapshot, WorkoutEngine, DEFAULT_REST_SECONDS};
pub use gateway::{apply_effects, DispatchReport, EffectDispatcher, PersistenceGateway};
pub use store::{Journal, JournalStore};
pub use history::{load_recent_sessions, recent_sessions, SessionSummary};
pub use export::export_sets_csv;
