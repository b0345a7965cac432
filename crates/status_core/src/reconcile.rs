use std::time::{Duration, Instant};

use agent_logging::{agent_debug, agent_trace};

use crate::status::StatusLabel;

/// Minimum time a committed label stays on screen.
pub const MIN_DWELL: Duration = Duration::from_millis(600);

pub type TimerId = u64;

/// What the caller must do after offering a candidate to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The label is now on screen.
    Committed {
        label: StatusLabel,
        cancelled: Option<TimerId>,
    },
    /// The dwell window is still open; a timer must fire after `delay`.
    Deferred {
        timer_id: TimerId,
        delay: Duration,
        cancelled: Option<TimerId>,
    },
    /// A timer fired that is no longer pending.
    Stale,
}

/// Debounces candidate labels so that each committed label stays visible for
/// at least [`MIN_DWELL`].
///
/// The reconciler never reads a clock: every call receives `now` from the
/// caller. Timers are owned by the caller too; the reconciler only hands out
/// ids and remembers which one is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReconciler {
    min_dwell: Duration,
    committed: StatusLabel,
    last_commit_at: Option<Instant>,
    pending: Option<TimerId>,
    next_timer_id: TimerId,
}

impl Default for StatusReconciler {
    fn default() -> Self {
        Self::with_min_dwell(MIN_DWELL)
    }
}

impl StatusReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_dwell(min_dwell: Duration) -> Self {
        Self {
            min_dwell,
            committed: StatusLabel::Idle,
            last_commit_at: None,
            pending: None,
            next_timer_id: 1,
        }
    }

    pub fn committed(&self) -> &StatusLabel {
        &self.committed
    }

    pub fn last_commit_at(&self) -> Option<Instant> {
        self.last_commit_at
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending
    }

    /// Offers a freshly derived candidate. A candidate equal to the label on
    /// screen drops any pending timer and leaves the dwell window untouched.
    pub fn commit(&mut self, candidate: StatusLabel, now: Instant) -> CommitOutcome {
        let cancelled = self.pending.take();
        if candidate == self.committed {
            return CommitOutcome::Committed {
                label: candidate,
                cancelled,
            };
        }
        let elapsed = self
            .last_commit_at
            .map(|at| now.saturating_duration_since(at));

        match elapsed {
            Some(elapsed) if elapsed < self.min_dwell => {
                let timer_id = self.next_timer_id;
                self.next_timer_id += 1;
                self.pending = Some(timer_id);
                let delay = self.min_dwell - elapsed;
                agent_trace!(
                    "status '{}' deferred by {:?} (timer {})",
                    candidate,
                    delay,
                    timer_id
                );
                CommitOutcome::Deferred {
                    timer_id,
                    delay,
                    cancelled,
                }
            }
            _ => self.apply(candidate, now, cancelled),
        }
    }

    /// Handles a timer firing. `candidate` must be derived from the latest
    /// inputs at fire time, not remembered from when the timer was scheduled.
    pub fn fire(&mut self, timer_id: TimerId, candidate: StatusLabel, now: Instant) -> CommitOutcome {
        if self.pending != Some(timer_id) {
            agent_trace!("ignoring stale status timer {}", timer_id);
            return CommitOutcome::Stale;
        }
        self.pending = None;
        self.apply(candidate, now, None)
    }

    fn apply(
        &mut self,
        label: StatusLabel,
        now: Instant,
        cancelled: Option<TimerId>,
    ) -> CommitOutcome {
        if label != self.committed {
            agent_debug!("status '{}' -> '{}'", self.committed, label);
            self.committed = label.clone();
            self.last_commit_at = Some(now);
        }
        CommitOutcome::Committed { label, cancelled }
    }
}
