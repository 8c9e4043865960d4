//! The deadline (timeout) executor.
//!
//! A [`Deadline`] races a unit of work against a timer. The work runs
//! concurrently with a [`CancellationObserver`]; if the timer wins the
//! observer is cancelled and the caller gets [`DeadlineError::TimedOut`]
//! right away. Cancellation is cooperative: the executor never waits for
//! the work to stop and cannot force it to.
//!
//! ```rust
//! use std::time::Duration;
//! use nexus_deadline_core_rs::{Deadline, DeadlineError};
//!
//! # async fn example() {
//! let deadline = Deadline::new(Duration::from_millis(50));
//! let result: Result<(), DeadlineError<std::io::Error>> = deadline
//!   .run(|stopper| async move {
//!     tokio::select! {
//!       _ = tokio::time::sleep(Duration::from_secs(10)) => Ok(()),
//!       _ = stopper.cancelled() => Ok(()),
//!     }
//!   })
//!   .await;
//! assert!(matches!(result, Err(DeadlineError::TimedOut)));
//! # }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use nexus_deadline_utils_rs::concurrent::{
  result_slot, CancellationObserver, CancellationSignal, ResultSlot, ResultSlotError,
};

use crate::dispatch::Runnable;
use crate::metrics::DeadlineMetrics;

mod config;
mod config_option;
mod deadline_error;
mod invocation;
mod panic_policy;


pub use self::{config::*, config_option::*, deadline_error::*, panic_policy::*};

pub(crate) use self::invocation::InvocationState;

use self::invocation::Invocation;
use self::panic_policy::panic_message;

enum WorkOutcome<T, E> {
  Returned(Result<T, E>),
  Panicked(Box<dyn Any + Send>),
}

/// Write end handed to the spawned work. Delivery never blocks; once the
/// caller has stopped listening the outcome is dropped on the spot.
struct WorkSlot<T, E> {
  invocation_id: u64,
  slot: ResultSlot<WorkOutcome<T, E>>,
}

impl<T, E> WorkSlot<T, E> {
  fn deliver(self, outcome: WorkOutcome<T, E>) {
    if self.slot.deliver(outcome).is_err() {
      tracing::trace!(invocation_id = self.invocation_id, "late result discarded");
    }
  }
}

/// Owns the invocation's signal. If `run` is dropped before the race settles
/// the signal is raised, so cooperative work stops instead of running for nobody.
struct CancelOnDrop {
  invocation_id: u64,
  signal: CancellationSignal,
  armed: bool,
}

impl CancelOnDrop {
  fn disarm(&mut self) {
    self.armed = false;
  }
}

impl Drop for CancelOnDrop {
  fn drop(&mut self) {
    if self.armed && self.signal.raise() {
      tracing::debug!(invocation_id = self.invocation_id, "run dropped before settling, work cancelled");
    }
  }
}

#[derive(Debug, Clone)]
pub struct Deadline {
  config: Arc<Config>,
  metrics: Option<DeadlineMetrics>,
}

static_assertions::assert_impl_all!(Deadline: Send, Sync);

impl Deadline {
  pub fn new(timeout: Duration) -> Self {
    Self::new_with_config(Config::from([ConfigOption::with_timeout(timeout)]))
  }

  pub fn new_with_config(config: Config) -> Self {
    let metrics = config
      .meter
      .as_ref()
      .map(|meter| DeadlineMetrics::new(meter, &config.name));
    Self {
      config: Arc::new(config),
      metrics,
    }
  }

  pub fn timeout(&self) -> Duration {
    self.config.timeout
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Runs async `work` under this deadline.
  ///
  /// Returns the work's own result if it finishes first, or
  /// [`DeadlineError::TimedOut`] once the timeout elapses. In the latter case
  /// the observer passed to `work` is cancelled and whatever the work later
  /// returns is dropped.
  pub async fn run<F, Fut, T, E>(&self, work: F) -> Result<T, DeadlineError<E>>
  where
    F: FnOnce(CancellationObserver) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static, {
    self
      .race(move |observer, slot: WorkSlot<T, E>| async move {
        let outcome = match AssertUnwindSafe(async move { work(observer).await })
          .catch_unwind()
          .await
        {
          Ok(result) => WorkOutcome::Returned(result),
          Err(payload) => WorkOutcome::Panicked(payload),
        };
        slot.deliver(outcome);
      })
      .await
  }

  /// Runs synchronous `work` on the blocking thread pool under this deadline.
  ///
  /// Blocking work can only notice cancellation by polling
  /// [`CancellationObserver::is_cancelled`] between steps.
  pub async fn run_blocking<F, T, E>(&self, work: F) -> Result<T, DeadlineError<E>>
  where
    F: FnOnce(CancellationObserver) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static, {
    self
      .race(move |observer, slot: WorkSlot<T, E>| async move {
        match tokio::task::spawn_blocking(move || work(observer)).await {
          Ok(result) => slot.deliver(WorkOutcome::Returned(result)),
          Err(join_error) if join_error.is_panic() => slot.deliver(WorkOutcome::Panicked(join_error.into_panic())),
          Err(join_error) => {
            tracing::warn!(invocation_id = slot.invocation_id, error = %join_error, "blocking work cancelled");
          }
        }
      })
      .await
  }

  async fn race<P, Fut, T, E>(&self, producer: P) -> Result<T, DeadlineError<E>>
  where
    P: FnOnce(CancellationObserver, WorkSlot<T, E>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static, {
    let mut invocation = Invocation::start(&self.config.name, self.config.timeout, self.metrics.as_ref());
    let mut guard = CancelOnDrop {
      invocation_id: invocation.id(),
      signal: CancellationSignal::new(),
      armed: true,
    };
    let observer = guard.signal.observer();
    let (slot, receiver) = result_slot::<WorkOutcome<T, E>>();
    let slot = WorkSlot {
      invocation_id: invocation.id(),
      slot,
    };

    let timer = tokio::time::sleep(self.config.timeout);
    tokio::pin!(timer);

    if self.config.timeout.is_zero() {
      // The work still starts, but already sees itself cancelled.
      guard.signal.raise();
    }

    self
      .config
      .dispatcher
      .schedule(Runnable::new(move || producer(observer, slot)))
      .await;

    let result = if guard.signal.is_raised() {
      invocation.finish(InvocationState::TimedOut);
      Err(DeadlineError::TimedOut)
    } else {
      tokio::select! {
        biased;
        delivered = receiver.receive() => {
          guard.disarm();
          self.settle(&mut invocation, delivered)
        }
        _ = &mut timer => {
          guard.signal.raise();
          invocation.finish(InvocationState::TimedOut);
          Err(DeadlineError::TimedOut)
        }
      }
    };
    debug_assert!(invocation.state().is_terminal());
    result
  }

  fn settle<T, E>(
    &self,
    invocation: &mut Invocation<'_>,
    delivered: Result<WorkOutcome<T, E>, ResultSlotError>,
  ) -> Result<T, DeadlineError<E>> {
    match delivered {
      Ok(WorkOutcome::Returned(result)) => {
        invocation.finish(InvocationState::Completed);
        result.map_err(DeadlineError::Work)
      }
      Ok(WorkOutcome::Panicked(payload)) => {
        invocation.finish(InvocationState::Completed);
        match self.config.panic_policy {
          PanicPolicy::Propagate => std::panic::resume_unwind(payload),
          PanicPolicy::Capture => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(
              deadline = %self.config.name,
              invocation_id = invocation.id(),
              panic = %message,
              "work panicked"
            );
            Err(DeadlineError::Panicked(message))
          }
        }
      }
      Err(ResultSlotError::Abandoned) => {
        invocation.finish(InvocationState::Abandoned);
        Err(DeadlineError::Abandoned)
      }
    }
  }
}
