//! Observability hook.
//!
//! The engine reports what it does as [`FoldEvent`]s to an injected [`FoldObserver`] instead of
//! printing. [`TracingObserver`] forwards events to `tracing`.

use crate::error::{HostError, RuleError};
use crate::region::CollapseRegion;
use crate::retry::RetryStop;
use std::cell::RefCell;
use std::ops::Range;
use std::time::Duration;

/// Something the engine did or decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldEvent {
    /// A rule was skipped because its pattern does not compile.
    RuleSkipped {
        /// Index of the rule in the list being processed.
        rule: usize,
        /// Why the rule was skipped.
        error: RuleError,
    },
    /// A rule was run against the document.
    RuleMatched {
        /// Index of the rule in the list being processed.
        rule: usize,
        /// Number of raw matches.
        matches: usize,
        /// Number of matches spanning more than one line.
        actionable: usize,
    },
    /// A multi-line match had no newline that could end its first line.
    DegenerateMatch {
        /// Index of the rule that produced the match.
        rule: usize,
        /// The match range (char offsets).
        range: Range<usize>,
    },
    /// A candidate region was dropped because an earlier region overlaps it.
    OverlapRejected {
        /// Index of the rule that produced the candidate.
        rule: usize,
        /// The rejected candidate.
        region: CollapseRegion,
    },
    /// A resolution pass finished.
    RegionsResolved {
        /// Number of accepted regions.
        regions: usize,
    },
    /// A batch was applied to the host.
    BatchApplied {
        /// Regions created.
        created: usize,
        /// Existing regions expanded.
        expanded: usize,
        /// Existing regions collapsed.
        collapsed: usize,
        /// Existing regions removed.
        removed: usize,
        /// Edits the host refused.
        rejected: usize,
    },
    /// The host refused a single edit inside a batch.
    EditRejected {
        /// The host error.
        error: HostError,
    },
    /// The host refused a whole batch.
    BatchRejected {
        /// The host error.
        error: HostError,
    },
    /// An attach-time retry was scheduled.
    RetryScheduled {
        /// The attempt number that will run (0-based).
        attempt: u32,
        /// Delay before it runs.
        delay: Duration,
    },
    /// Attach-time application stopped.
    RetryStopped {
        /// Attempts that ran.
        attempts: u32,
        /// Why it stopped.
        reason: RetryStop,
    },
}

/// Receives engine events.
pub trait FoldObserver {
    /// Handle one event.
    fn on_event(&self, event: &FoldEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FoldObserver for NoopObserver {
    fn on_event(&self, _event: &FoldEvent) {}
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FoldObserver for TracingObserver {
    fn on_event(&self, event: &FoldEvent) {
        match event {
            FoldEvent::RuleSkipped { rule, error } => {
                tracing::warn!(rule, %error, "skipping rule");
            }
            FoldEvent::RuleMatched {
                rule,
                matches,
                actionable,
            } => {
                tracing::debug!(rule, matches, actionable, "rule matched");
            }
            FoldEvent::DegenerateMatch { rule, range } => {
                tracing::warn!(rule, ?range, "multi-line match without a newline");
            }
            FoldEvent::OverlapRejected { rule, region } => {
                tracing::trace!(
                    rule,
                    start = region.start,
                    end = region.end,
                    "overlapping region rejected"
                );
            }
            FoldEvent::RegionsResolved { regions } => {
                tracing::debug!(regions, "regions resolved");
            }
            FoldEvent::BatchApplied {
                created,
                expanded,
                collapsed,
                removed,
                rejected,
            } => {
                tracing::debug!(created, expanded, collapsed, removed, rejected, "batch applied");
            }
            FoldEvent::EditRejected { error } => {
                tracing::warn!(%error, "host rejected region edit");
            }
            FoldEvent::BatchRejected { error } => {
                tracing::debug!(%error, "host rejected batch");
            }
            FoldEvent::RetryScheduled { attempt, delay } => {
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retry scheduled");
            }
            FoldEvent::RetryStopped { attempts, reason } => {
                tracing::debug!(attempts, ?reason, "attach application stopped");
            }
        }
    }
}

/// Keeps every event in memory. Handy for tests and diagnostics dumps.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<FoldEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the recorded events.
    pub fn events(&self) -> Vec<FoldEvent> {
        self.events.borrow().clone()
    }
}

impl FoldObserver for RecordingObserver {
    fn on_event(&self, event: &FoldEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
