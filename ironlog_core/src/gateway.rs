//! Persistence gateway and effect dispatch.
//!
//! The engine emits [`Effect`]s; this module applies them to a
//! [`PersistenceGateway`]. Failures are logged and counted, never propagated
//! back to the engine, and never retried.

use crate::{Effect, Result, SetRecord};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::mpsc::{channel, Sender};
use std::thread::JoinHandle;

/// Idempotent storage operations the engine depends on
pub trait PersistenceGateway {
    /// Create the session for `date_key` if it does not exist yet.
    fn ensure_session_started(&mut self, date_key: NaiveDate, started_at: DateTime<Utc>)
        -> Result<()>;

    /// Upsert a set keyed by `(date_key, exercise_id, set_index)`.
    fn record_set(&mut self, date_key: NaiveDate, set: &SetRecord) -> Result<()>;

    /// Store the session's final duration.
    fn finish_session(&mut self, date_key: NaiveDate, duration_seconds: u64) -> Result<()>;
}

/// Outcome counts for applied effects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub applied: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn merge(&mut self, other: DispatchReport) {
        self.applied += other.applied;
        self.failed += other.failed;
    }
}

/// Apply effects in order, logging (not returning) failures
pub fn apply_effects<G>(gateway: &mut G, effects: impl IntoIterator<Item = Effect>) -> DispatchReport
where
    G: PersistenceGateway + ?Sized,
{
    let mut report = DispatchReport::default();

    for effect in effects {
        let result = match &effect {
            Effect::EnsureSessionStarted {
                date_key,
                started_at,
            } => gateway.ensure_session_started(*date_key, *started_at),
            Effect::RecordSet { date_key, set } => gateway.record_set(*date_key, set),
            Effect::FinishSession {
                date_key,
                duration_seconds,
            } => gateway.finish_session(*date_key, *duration_seconds),
        };

        match result {
            Ok(()) => report.applied += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!("Failed to persist {:?}: {}", effect, e);
            }
        }
    }

    report
}

/// Applies effects on a background thread so the caller never waits on I/O
pub struct EffectDispatcher {
    tx: Option<Sender<Vec<Effect>>>,
    worker: Option<JoinHandle<DispatchReport>>,
}

impl EffectDispatcher {
    /// Move `gateway` onto a worker thread and start draining effects.
    pub fn spawn<G>(mut gateway: G) -> Self
    where
        G: PersistenceGateway + Send + 'static,
    {
        let (tx, rx) = channel::<Vec<Effect>>();

        let worker = std::thread::spawn(move || {
            let mut total = DispatchReport::default();
            for effects in rx {
                total.merge(apply_effects(&mut gateway, effects));
            }
            tracing::debug!(
                "Effect worker stopped: {} applied, {} failed",
                total.applied,
                total.failed
            );
            total
        });

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Queue effects for the worker. Returns immediately.
    pub fn dispatch(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        if tx.send(effects).is_err() {
            tracing::warn!("Effect worker is gone; dropping effects");
        }
    }

    /// Wait for queued effects to drain and stop the worker.
    pub fn shutdown(mut self) -> DispatchReport {
        self.stop()
    }

    fn stop(&mut self) -> DispatchReport {
        // Closing the channel ends the worker loop once the queue is empty
        drop(self.tx.take());
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_else(|_| {
                tracing::warn!("Effect worker panicked");
                DispatchReport::default()
            }),
            None => DispatchReport::default(),
        }
    }
}

impl Drop for EffectDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
