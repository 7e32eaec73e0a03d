//! Observable outcomes of silently-tolerated merge failures.
//!
//! A guard that errors or is not `true` skips its subtree, and a computed field
//! that fails is left untouched. Neither stops the merge; both are reported to
//! a [`MergeObserver`] so callers can log, count or assert on them.

use std::sync::Mutex;

use serde::Serialize;

/// Something the engine tolerated instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MergeEvent {
    /// A guard evaluated to something other than boolean `true`.
    GuardRejected { condition: String, result: String },
    /// A guard could not be evaluated.
    GuardFailed { condition: String, error: String },
    /// A computed field could not be evaluated; the field was left as is.
    ComputedFieldFailed {
        expression: String,
        output_field: String,
        error: String,
    },
    /// A computed value could not be written without collapsing a mapping.
    ComputedFieldRejected {
        expression: String,
        output_field: String,
    },
}

/// Receives [`MergeEvent`]s. Shared across merges, so it must be thread-safe.
pub trait MergeObserver: Send + Sync {
    fn observe(&self, event: &MergeEvent);
}

/// Default observer: writes events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MergeObserver for TracingObserver {
    fn observe(&self, event: &MergeEvent) {
        match event {
            MergeEvent::GuardRejected { condition, result } => {
                tracing::debug!(%condition, %result, "group guard not satisfied, skipping subtree");
            }
            MergeEvent::GuardFailed { condition, error } => {
                tracing::debug!(%condition, %error, "group guard failed to evaluate, skipping subtree");
            }
            MergeEvent::ComputedFieldFailed {
                expression,
                output_field,
                error,
            } => {
                tracing::debug!(%expression, %output_field, %error, "computed field skipped");
            }
            MergeEvent::ComputedFieldRejected {
                expression,
                output_field,
            } => {
                tracing::debug!(
                    %expression,
                    %output_field,
                    "computed field would overwrite a mapping, skipped"
                );
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<MergeEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events observed so far.
    pub fn events(&self) -> Vec<MergeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<MergeEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl MergeObserver for RecordingObserver {
    fn observe(&self, event: &MergeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_observer_collects_and_drains() {
        let observer = RecordingObserver::new();
        observer.observe(&MergeEvent::GuardFailed {
            condition: "New.x >".to_string(),
            error: "syntax".to_string(),
        });
        assert_eq!(observer.events().len(), 1);
        assert_eq!(observer.take().len(), 1);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = MergeEvent::ComputedFieldFailed {
            expression: "New.a - Existing.a".to_string(),
            output_field: "delta".to_string(),
            error: "undefined".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "computed_field_failed");
        assert_eq!(value["output_field"], "delta");
    }
}
