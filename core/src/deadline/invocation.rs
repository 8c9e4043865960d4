use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::metrics::DeadlineMetrics;

static NEXT_INVOCATION_ID: AtomicU64 = AtomicU64::new(1);

/// Whole milliseconds as a log field, clamped at `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
  u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Lifecycle of a single `run` call.
///
/// ```text
/// Running → Completed   work delivered before the timer
/// Running → TimedOut    timer fired first, signal raised
/// Running → Abandoned   work dropped by its dispatcher without delivering
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum InvocationState {
  Running,
  Completed,
  TimedOut,
  Abandoned,
}

impl InvocationState {
  pub(crate) fn is_terminal(&self) -> bool {
    !matches!(self, InvocationState::Running)
  }
}

#[derive(Debug)]
pub(crate) struct Invocation<'a> {
  id: u64,
  deadline_name: &'a str,
  timeout: Duration,
  started_at: Instant,
  state: InvocationState,
  metrics: Option<&'a DeadlineMetrics>,
}

impl<'a> Invocation<'a> {
  pub(crate) fn start(deadline_name: &'a str, timeout: Duration, metrics: Option<&'a DeadlineMetrics>) -> Self {
    let id = NEXT_INVOCATION_ID.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(
      deadline = deadline_name,
      invocation_id = id,
      timeout_ms = saturating_millis(timeout),
      "invocation started"
    );
    if let Some(m) = metrics {
      m.increment_invocations_started_count();
    }
    Self {
      id,
      deadline_name,
      timeout,
      started_at: Instant::now(),
      state: InvocationState::Running,
      metrics,
    }
  }

  pub(crate) fn id(&self) -> u64 {
    self.id
  }

  pub(crate) fn state(&self) -> InvocationState {
    self.state
  }

  /// Moves to a terminal state. Returns `false` if the invocation had already settled.
  pub(crate) fn finish(&mut self, next: InvocationState) -> bool {
    if self.state.is_terminal() || !next.is_terminal() {
      return false;
    }
    self.state = next;

    let elapsed = self.started_at.elapsed();
    let elapsed_ms = saturating_millis(elapsed);
    match next {
      InvocationState::Completed => {
        tracing::debug!(deadline = self.deadline_name, invocation_id = self.id, elapsed_ms, "invocation completed");
      }
      InvocationState::TimedOut => {
        tracing::debug!(
          deadline = self.deadline_name,
          invocation_id = self.id,
          timeout_ms = saturating_millis(self.timeout),
          elapsed_ms,
          "invocation timed out"
        );
      }
      InvocationState::Abandoned => {
        tracing::warn!(deadline = self.deadline_name, invocation_id = self.id, elapsed_ms, "work abandoned without a result");
      }
      InvocationState::Running => {}
    }

    if let Some(m) = self.metrics {
      match next {
        InvocationState::Completed => m.increment_invocations_completed_count(),
        InvocationState::TimedOut => m.increment_invocations_timed_out_count(),
        _ => {}
      }
      m.record_invocation_duration(elapsed);
    }
    true
  }
}
