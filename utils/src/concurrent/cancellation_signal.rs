use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[cfg(test)]
mod tests;

#[derive(Debug)]
struct Inner {
  cancelled: AtomicBool,
  notify: Notify,
}

/// Write side of a one-shot cancellation flag.<br/>
/// It starts open and can only ever be closed, once. Single writer: not `Clone`,
/// readers get a [`CancellationObserver`].
#[derive(Debug)]
pub struct CancellationSignal {
  inner: Arc<Inner>,
}

static_assertions::assert_impl_all!(CancellationSignal: Send, Sync);

impl CancellationSignal {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Inner {
        cancelled: AtomicBool::new(false),
        notify: Notify::new(),
      }),
    }
  }

  pub fn observer(&self) -> CancellationObserver {
    CancellationObserver {
      inner: self.inner.clone(),
    }
  }

  /// Closes the signal and wakes every observer awaiting it.
  ///
  /// Returns `true` only for the call that performed the transition; later calls are no-ops.
  pub fn raise(&self) -> bool {
    let raised = self
      .inner
      .cancelled
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_ok();
    if raised {
      tracing::trace!("cancellation signal raised");
      self.inner.notify.notify_waiters();
    }
    raised
  }

  pub fn is_raised(&self) -> bool {
    self.inner.cancelled.load(Ordering::Acquire)
  }
}

impl Default for CancellationSignal {
  fn default() -> Self {
    Self::new()
  }
}

/// Read side of a [`CancellationSignal`].
///
/// Observing is voluntary: work that never checks keeps running. Dropping the
/// signal without raising it is not a cancellation.
#[derive(Debug, Clone)]
pub struct CancellationObserver {
  inner: Arc<Inner>,
}

static_assertions::assert_impl_all!(CancellationObserver: Send, Sync);

impl CancellationObserver {
  pub fn is_cancelled(&self) -> bool {
    self.inner.cancelled.load(Ordering::Acquire)
  }

  /// Resolves once the signal is raised, immediately if it already was.
  pub async fn cancelled(&self) {
    loop {
      let notified = self.inner.notify.notified();
      tokio::pin!(notified);
      // Register before checking the flag so a raise in between is not missed.
      notified.as_mut().enable();
      if self.is_cancelled() {
        return;
      }
      notified.await;
    }
  }
}

impl PartialEq for CancellationObserver {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Eq for CancellationObserver {}
