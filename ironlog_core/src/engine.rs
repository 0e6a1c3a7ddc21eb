//! Workout session engine.
//!
//! Drives a user through one plan day a set at a time:
//!
//! ```text
//! Idle --start_session--> Lifting <--tick/end_rest-- Resting
//!                            |  \--submit_set (more sets)--^
//!                            \--submit_set (last set)--> Finished
//! ```
//!
//! Commands mutate the engine synchronously and return the persistence
//! [`Effect`]s they produced. The engine never waits on I/O; callers hand the
//! effects to a dispatcher (see [`crate::gateway`]).

use crate::clock::{Clock, SessionClock};
use crate::timer::{RestHandle, RestTimer, TickOutcome};
use crate::{
    CompletedSet, Cursor, Effect, Error, PlanDay, PlanItem, Result, SetInput, SetRecord,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Rest period used when a submission does not specify a positive one
pub const DEFAULT_REST_SECONDS: u32 = 60;

/// Engine phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Idle,
    Lifting,
    Resting,
    Finished,
}

/// Read-only view of the engine for rendering
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub phase: EnginePhase,
    pub current_exercise: Option<PlanItem>,
    pub cursor: Option<Cursor>,
    pub is_rest: bool,
    pub seconds_remaining: u32,
    pub progress: f64,
    pub remaining_sets: u32,
    pub completed_sets: u32,
    pub total_sets: u32,
    pub is_finished: bool,
    pub elapsed_seconds: u64,
}

/// State machine for one plan day.
///
/// The engine owns its [`PlanDay`]; to switch days, build a new engine.
#[derive(Debug)]
pub struct WorkoutEngine {
    day: PlanDay,
    total_sets: u32,
    phase: EnginePhase,
    cursor: Option<Cursor>,
    completed: Vec<CompletedSet>,
    rest: RestTimer,
    session_clock: SessionClock,
    clock: Clock,
    date_key: Option<NaiveDate>,
    default_rest_seconds: u32,
}

impl WorkoutEngine {
    pub fn new(day: PlanDay) -> Self {
        let total_sets = day.total_sets();
        Self {
            day,
            total_sets,
            phase: EnginePhase::Idle,
            cursor: None,
            completed: Vec::new(),
            rest: RestTimer::new(),
            session_clock: SessionClock::default(),
            clock: Clock::System,
            date_key: None,
            default_rest_seconds: DEFAULT_REST_SECONDS,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Override the fallback rest period. Zero keeps the built-in default.
    pub fn with_default_rest(mut self, seconds: u32) -> Self {
        if seconds > 0 {
            self.default_rest_seconds = seconds;
        }
        self
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn plan_day(&self) -> &PlanDay {
        &self.day
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Begin (or restart) the session at the first set of the first exercise.
    ///
    /// Clears the completed-set log and any running rest. A day without any
    /// target sets goes straight to `Finished`. Always requests that a session
    /// record exists for today.
    pub fn start_session(&mut self) -> Vec<Effect> {
        let now = self.clock.now();
        let date_key = self.clock.today();

        self.rest.cancel();
        self.completed.clear();
        self.date_key = Some(date_key);
        self.session_clock.start(now);

        match self.next_active_index(0) {
            Some(index) => {
                self.cursor = Some(Cursor {
                    exercise_index: index,
                    set_number: 1,
                });
                self.phase = EnginePhase::Lifting;
                tracing::info!(
                    "Started session for {} day {} ({} sets)",
                    self.day.plan_name,
                    self.day.day,
                    self.total_sets
                );
            }
            None => {
                self.cursor = Some(self.finished_cursor());
                self.phase = EnginePhase::Finished;
                self.session_clock.stop(now);
                tracing::info!(
                    "Plan day {} has no target sets; session finished immediately",
                    self.day.day
                );
            }
        }

        vec![Effect::EnsureSessionStarted {
            date_key,
            started_at: now,
        }]
    }

    /// Record the current set, advance the cursor, and start resting.
    ///
    /// Invalid input is rejected before anything changes. Submitting while
    /// resting ends the rest first. After the last set of the day the engine
    /// finishes instead of resting.
    pub fn submit_set(&mut self, input: SetInput) -> Result<Vec<Effect>> {
        if matches!(self.phase, EnginePhase::Idle | EnginePhase::Finished) {
            return Err(Error::InvalidState(format!(
                "cannot submit a set while {:?}",
                self.phase
            )));
        }

        let reps = validate_reps(input.reps)?;
        let weight = validate_weight(input.weight)?;
        let rest_seconds = match input.rest_seconds {
            Some(s) if s > 0 => u32::try_from(s).unwrap_or(u32::MAX),
            _ => self.default_rest_seconds,
        };

        let (cursor, date_key) = match (self.cursor, self.date_key) {
            (Some(cursor), Some(date_key)) => (cursor, date_key),
            _ => return Err(Error::InvalidState("session has not been started".into())),
        };
        let item = self
            .day
            .items
            .get(cursor.exercise_index)
            .ok_or_else(|| Error::InvalidState("cursor is past the last exercise".into()))?;
        let exercise_id = item.exercise_id.clone();
        let target_sets = item.target_sets;

        if self.phase == EnginePhase::Resting {
            tracing::debug!("Set submitted during rest; ending rest early");
            self.rest.cancel();
            self.phase = EnginePhase::Lifting;
        }

        let now = self.clock.now();
        self.completed.push(CompletedSet {
            exercise_id: exercise_id.clone(),
            set_index: cursor.set_number,
            weight,
            reps,
            submitted_at: now,
        });

        tracing::debug!(
            "Completed {} set {}/{}: {} reps @ {:?}",
            exercise_id,
            cursor.set_number,
            target_sets,
            reps,
            weight
        );

        let mut effects = vec![Effect::RecordSet {
            date_key,
            set: SetRecord {
                exercise_id,
                set_index: cursor.set_number,
                weight,
                reps,
                recorded_at: now,
            },
        }];

        let next = if cursor.set_number < target_sets {
            Some(Cursor {
                exercise_index: cursor.exercise_index,
                set_number: cursor.set_number + 1,
            })
        } else {
            self.next_active_index(cursor.exercise_index + 1)
                .map(|index| Cursor {
                    exercise_index: index,
                    set_number: 1,
                })
        };

        match next {
            Some(next) => {
                self.cursor = Some(next);
                self.rest.start(rest_seconds);
                self.phase = EnginePhase::Resting;
            }
            None => {
                self.cursor = Some(self.finished_cursor());
                self.phase = EnginePhase::Finished;
                self.session_clock.stop(now);
                let duration_seconds = self.session_clock.elapsed(now);
                tracing::info!(
                    "Workout finished: {} sets in {}s",
                    self.completed.len(),
                    duration_seconds
                );
                effects.push(Effect::FinishSession {
                    date_key,
                    duration_seconds,
                });
            }
        }

        Ok(effects)
    }

    /// One elapsed second for the rest period identified by `handle`.
    pub fn tick(&mut self, handle: RestHandle) -> TickOutcome {
        if self.phase != EnginePhase::Resting {
            return TickOutcome::Stale;
        }

        let outcome = self.rest.tick(handle);
        if outcome == TickOutcome::Expired {
            self.phase = EnginePhase::Lifting;
            tracing::debug!("Rest finished");
        }
        outcome
    }

    /// Skip the remaining rest. Does nothing outside of a rest period.
    pub fn end_rest(&mut self) {
        if self.phase == EnginePhase::Resting {
            tracing::debug!("Rest skipped with {}s left", self.rest.seconds_remaining());
            self.rest.cancel();
            self.phase = EnginePhase::Lifting;
        }
    }

    /// Tear down: cancel any rest and discard all session state.
    pub fn reset(&mut self) {
        self.rest.cancel();
        self.completed.clear();
        self.cursor = None;
        self.date_key = None;
        self.session_clock.reset();
        self.phase = EnginePhase::Idle;
    }

    // ------------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------------

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Item under the cursor; `None` when idle or finished
    pub fn current_exercise(&self) -> Option<&PlanItem> {
        match self.phase {
            EnginePhase::Lifting | EnginePhase::Resting => self
                .cursor
                .and_then(|c| self.day.items.get(c.exercise_index)),
            EnginePhase::Idle | EnginePhase::Finished => None,
        }
    }

    pub fn completed(&self) -> &[CompletedSet] {
        &self.completed
    }

    pub fn completed_sets(&self) -> u32 {
        self.completed.len() as u32
    }

    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }

    pub fn remaining_sets(&self) -> u32 {
        self.total_sets.saturating_sub(self.completed_sets())
    }

    /// Fraction of target sets completed, in [0, 1]; 0 for a day with no sets
    pub fn progress(&self) -> f64 {
        if self.total_sets == 0 {
            return 0.0;
        }
        (f64::from(self.completed_sets()) / f64::from(self.total_sets)).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == EnginePhase::Finished
    }

    pub fn is_resting(&self) -> bool {
        self.phase == EnginePhase::Resting
    }

    pub fn seconds_remaining(&self) -> u32 {
        if self.is_resting() {
            self.rest.seconds_remaining()
        } else {
            0
        }
    }

    /// Handle of the running rest, for scheduling ticks
    pub fn rest_handle(&self) -> Option<RestHandle> {
        if self.is_resting() {
            self.rest.handle()
        } else {
            None
        }
    }

    pub fn date_key(&self) -> Option<NaiveDate> {
        self.date_key
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.session_clock.elapsed(self.clock.now())
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            phase: self.phase,
            current_exercise: self.current_exercise().cloned(),
            cursor: self.cursor,
            is_rest: self.is_resting(),
            seconds_remaining: self.seconds_remaining(),
            progress: self.progress(),
            remaining_sets: self.remaining_sets(),
            completed_sets: self.completed_sets(),
            total_sets: self.total_sets,
            is_finished: self.is_finished(),
            elapsed_seconds: self.elapsed_seconds(),
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// First item at or after `from` that has any target sets
    fn next_active_index(&self, from: usize) -> Option<usize> {
        self.day
            .items
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, item)| item.target_sets > 0)
            .map(|(index, _)| index)
    }

    fn finished_cursor(&self) -> Cursor {
        Cursor {
            exercise_index: self.day.items.len(),
            set_number: 1,
        }
    }
}

fn validate_reps(reps: i64) -> Result<u32> {
    if reps <= 0 {
        return Err(Error::InvalidInput(format!(
            "reps must be a positive integer, got {}",
            reps
        )));
    }
    u32::try_from(reps).map_err(|_| Error::InvalidInput(format!("reps out of range: {}", reps)))
}

fn validate_weight(weight: Option<f64>) -> Result<Option<f64>> {
    match weight {
        Some(w) if !w.is_finite() || w < 0.0 => Err(Error::InvalidInput(format!(
            "weight must be a non-negative number, got {}",
            w
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepTarget;
    use chrono::{DateTime, Duration, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn item(id: &str, order_index: u32, sets: u32) -> PlanItem {
        PlanItem {
            exercise_id: id.into(),
            exercise_name: id.to_uppercase(),
            day: 1,
            order_index,
            target_sets: sets,
            target_reps: RepTarget::Range { min: 8, max: 12 },
        }
    }

    fn day_with(sets: &[u32]) -> PlanDay {
        PlanDay {
            plan_id: "test".into(),
            plan_name: "Test Plan".into(),
            day: 1,
            items: sets
                .iter()
                .enumerate()
                .map(|(i, s)| item(&format!("ex{}", i), i as u32, *s))
                .collect(),
        }
    }

    fn engine(sets: &[u32]) -> WorkoutEngine {
        WorkoutEngine::new(day_with(sets)).with_clock(Clock::fixed(t0()))
    }

    fn set(reps: i64, rest: i64) -> SetInput {
        SetInput::new(Some(50.0), reps).with_rest(rest)
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = engine(&[3]);
        assert_eq!(engine.phase(), EnginePhase::Idle);
        assert!(engine.current_exercise().is_none());
        assert_eq!(engine.total_sets(), 3);
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn test_start_session_emits_ensure_effect() {
        let mut engine = engine(&[3]);
        let effects = engine.start_session();

        assert_eq!(
            effects,
            vec![Effect::EnsureSessionStarted {
                date_key: Clock::fixed(t0()).today(),
                started_at: t0(),
            }]
        );
        assert_eq!(engine.phase(), EnginePhase::Lifting);
        assert_eq!(engine.cursor(), Some(Cursor::start()));
        assert_eq!(engine.current_exercise().unwrap().exercise_id, "ex0");
    }

    #[test]
    fn test_n_submissions_finish_plan() {
        logging_init();
        let mut engine = engine(&[2, 3, 1]);
        engine.start_session();

        for _ in 0..6 {
            assert!(!engine.is_finished());
            engine.submit_set(set(8, 30)).unwrap();
            engine.end_rest();
        }

        assert!(engine.is_finished());
        assert_eq!(engine.progress(), 1.0);
        assert_eq!(engine.remaining_sets(), 0);
        assert_eq!(engine.completed_sets(), 6);
        assert!(engine.current_exercise().is_none());
    }

    #[test]
    fn test_zero_set_plan_finishes_immediately() {
        let mut engine = engine(&[0, 0]);
        let effects = engine.start_session();

        assert_eq!(effects.len(), 1);
        assert!(engine.is_finished());
        assert_eq!(engine.progress(), 0.0);
        assert!(!engine.progress().is_nan());
        assert_eq!(engine.remaining_sets(), 0);
    }

    #[test]
    fn test_huge_set_targets_do_not_overflow() {
        let mut engine = engine(&[4_000_000_000, 4_000_000_000]);
        assert_eq!(engine.total_sets(), u32::MAX);

        engine.start_session();
        engine.submit_set(SetInput::new(None, 5)).unwrap();
        assert!(engine.progress() > 0.0 && engine.progress() < 1.0);
    }

    #[test]
    fn test_empty_plan_finishes_immediately() {
        let mut engine = engine(&[]);
        engine.start_session();
        assert!(engine.is_finished());
        assert_eq!(engine.cursor().unwrap().exercise_index, 0);
    }

    #[test]
    fn test_zero_set_items_are_skipped() {
        let mut engine = engine(&[0, 1, 0, 1]);
        engine.start_session();
        assert_eq!(engine.cursor().unwrap().exercise_index, 1);

        engine.submit_set(set(5, 10)).unwrap();
        assert_eq!(
            engine.cursor(),
            Some(Cursor {
                exercise_index: 3,
                set_number: 1
            })
        );

        engine.submit_set(set(5, 10)).unwrap();
        assert!(engine.is_finished());
    }

    #[test]
    fn test_cursor_monotonic() {
        let mut engine = engine(&[2, 1, 3]);
        engine.start_session();

        let mut last_index = 0;
        while !engine.is_finished() {
            let cursor = engine.cursor().unwrap();
            let target = engine.current_exercise().unwrap().target_sets;
            assert!(cursor.set_number <= target);
            assert!(cursor.exercise_index >= last_index);
            last_index = cursor.exercise_index;
            engine.submit_set(set(6, 20)).unwrap();
        }

        let finished = engine.cursor().unwrap();
        assert!(finished.exercise_index >= last_index);
        assert_eq!(finished.exercise_index, 3);
    }

    #[test]
    fn test_start_session_twice_resets() {
        let mut engine = engine(&[3, 3]);
        engine.start_session();
        engine.submit_set(set(8, 30)).unwrap();
        engine.submit_set(set(8, 30)).unwrap();
        assert_eq!(engine.completed_sets(), 2);

        engine.start_session();
        engine.start_session();
        assert_eq!(engine.completed_sets(), 0);
        assert_eq!(engine.cursor(), Some(Cursor::start()));
        assert!(!engine.is_resting());
        assert_eq!(engine.phase(), EnginePhase::Lifting);
    }

    #[test]
    fn test_rest_visible_immediately() {
        let mut engine = engine(&[2]);
        engine.start_session();
        engine.submit_set(set(8, 45)).unwrap();

        assert!(engine.is_resting());
        assert_eq!(engine.seconds_remaining(), 45);
    }

    #[test]
    fn test_end_rest_zeroes_countdown() {
        let mut engine = engine(&[2]);
        engine.start_session();
        engine.submit_set(set(8, 120)).unwrap();
        let handle = engine.rest_handle().unwrap();
        engine.tick(handle);

        engine.end_rest();
        let snapshot = engine.snapshot();
        assert!(!snapshot.is_rest);
        assert_eq!(snapshot.seconds_remaining, 0);
        assert_eq!(snapshot.phase, EnginePhase::Lifting);

        // Ticks for the skipped rest are ignored
        assert_eq!(engine.tick(handle), TickOutcome::Stale);
    }

    #[test]
    fn test_end_rest_outside_rest_is_noop() {
        let mut engine = engine(&[2]);
        engine.end_rest();
        assert_eq!(engine.phase(), EnginePhase::Idle);

        engine.start_session();
        engine.end_rest();
        assert_eq!(engine.phase(), EnginePhase::Lifting);
    }

    #[test]
    fn test_ticks_expire_rest() {
        let mut engine = engine(&[2]);
        engine.start_session();
        engine.submit_set(set(8, 3)).unwrap();
        let handle = engine.rest_handle().unwrap();

        assert_eq!(engine.tick(handle), TickOutcome::Running(2));
        assert_eq!(engine.tick(handle), TickOutcome::Running(1));
        assert_eq!(engine.tick(handle), TickOutcome::Expired);
        assert_eq!(engine.phase(), EnginePhase::Lifting);
        assert_eq!(engine.seconds_remaining(), 0);
        assert_eq!(engine.rest_handle(), None);
    }

    #[test]
    fn test_scenario_single_exercise_three_sets() {
        let mut engine = engine(&[3]);
        engine.start_session();

        engine.submit_set(set(10, 10)).unwrap();
        assert!(engine.is_resting());
        assert_eq!(engine.seconds_remaining(), 10);
        assert_eq!(engine.completed_sets(), 1);

        engine.submit_set(set(10, 10)).unwrap();
        assert!(engine.is_resting());
        assert_eq!(engine.seconds_remaining(), 10);
        assert_eq!(engine.completed_sets(), 2);

        engine.submit_set(set(10, 10)).unwrap();
        assert!(engine.is_finished());
        assert!(!engine.is_resting());
        assert_eq!(engine.seconds_remaining(), 0);
        assert_eq!(engine.completed_sets(), 3);
    }

    #[test]
    fn test_scenario_two_exercises_one_set_each() {
        let mut engine = engine(&[1, 1]);
        engine.start_session();

        engine.submit_set(set(5, 60)).unwrap();
        assert_eq!(
            engine.cursor(),
            Some(Cursor {
                exercise_index: 1,
                set_number: 1
            })
        );
        assert!(engine.is_resting());

        engine.submit_set(set(5, 60)).unwrap();
        assert!(engine.is_finished());
    }

    #[test]
    fn test_invalid_reps_rejected_without_mutation() {
        let mut engine = engine(&[2]);
        engine.start_session();
        engine.submit_set(set(8, 30)).unwrap();
        let before = engine.snapshot();

        for reps in [0, -3] {
            let err = engine.submit_set(set(reps, 30)).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
        let err = engine
            .submit_set(SetInput::new(Some(-5.0), 8))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = engine
            .submit_set(SetInput::new(Some(f64::NAN), 8))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        // Still resting with the same countdown
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_submit_when_idle_or_finished_is_rejected() {
        let mut engine = engine(&[1]);
        assert!(matches!(
            engine.submit_set(set(5, 10)),
            Err(Error::InvalidState(_))
        ));

        engine.start_session();
        engine.submit_set(set(5, 10)).unwrap();
        assert!(engine.is_finished());
        assert!(matches!(
            engine.submit_set(set(5, 10)),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_rest_defaults_when_missing_or_non_positive() {
        let mut engine = engine(&[4]);
        engine.start_session();

        engine.submit_set(SetInput::new(None, 8)).unwrap();
        assert_eq!(engine.seconds_remaining(), DEFAULT_REST_SECONDS);

        engine.submit_set(SetInput::new(None, 8).with_rest(0)).unwrap();
        assert_eq!(engine.seconds_remaining(), DEFAULT_REST_SECONDS);

        engine.submit_set(SetInput::new(None, 8).with_rest(-10)).unwrap();
        assert_eq!(engine.seconds_remaining(), DEFAULT_REST_SECONDS);
    }

    #[test]
    fn test_configured_default_rest() {
        let mut engine = engine(&[2]).with_default_rest(90);
        engine.start_session();
        engine.submit_set(SetInput::new(None, 8)).unwrap();
        assert_eq!(engine.seconds_remaining(), 90);
    }

    #[test]
    fn test_submit_during_rest_restarts_timer() {
        let mut engine = engine(&[3]);
        engine.start_session();
        engine.submit_set(set(8, 100)).unwrap();
        let first = engine.rest_handle().unwrap();

        engine.submit_set(set(8, 20)).unwrap();
        let second = engine.rest_handle().unwrap();

        assert_ne!(first, second);
        assert_eq!(engine.seconds_remaining(), 20);
        assert_eq!(engine.tick(first), TickOutcome::Stale);
        assert_eq!(engine.seconds_remaining(), 20);
        assert_eq!(engine.completed_sets(), 2);
    }

    #[test]
    fn test_record_set_effect_contents() {
        let mut engine = engine(&[2]);
        engine.start_session();
        engine.clock_mut().advance(Duration::seconds(40));

        let effects = engine
            .submit_set(SetInput::new(None, 12).with_rest(30))
            .unwrap();

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::RecordSet { set, .. } => {
                assert_eq!(set.exercise_id, "ex0");
                assert_eq!(set.set_index, 1);
                assert_eq!(set.weight, None);
                assert_eq!(set.reps, 12);
                assert_eq!(set.recorded_at, t0() + Duration::seconds(40));
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_finish_emits_duration() {
        let mut engine = engine(&[1, 1]);
        engine.start_session();
        engine.clock_mut().advance(Duration::seconds(90));
        engine.submit_set(set(5, 60)).unwrap();
        engine.clock_mut().advance(Duration::seconds(150));

        let effects = engine.submit_set(set(5, 60)).unwrap();
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            effects[1],
            Effect::FinishSession {
                duration_seconds: 240,
                ..
            }
        ));

        // Clock is frozen once finished
        engine.clock_mut().advance(Duration::seconds(1000));
        assert_eq!(engine.elapsed_seconds(), 240);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut engine = engine(&[3]);
        engine.start_session();
        engine.submit_set(set(8, 30)).unwrap();
        let handle = engine.rest_handle().unwrap();

        engine.reset();
        assert_eq!(engine.phase(), EnginePhase::Idle);
        assert_eq!(engine.cursor(), None);
        assert_eq!(engine.completed_sets(), 0);
        assert_eq!(engine.tick(handle), TickOutcome::Stale);
        assert_eq!(engine.elapsed_seconds(), 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut engine = engine(&[2]);
        engine.start_session();
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["phase"], "lifting");
        assert_eq!(json["total_sets"], 2);
        assert_eq!(json["current_exercise"]["target_reps"], "8-12");
    }

    fn logging_init() {
        crate::logging::init_test();
    }
}
