//! Dispatchers decide where a unit of work runs.
//!
//! The executor never spawns directly: it wraps the work in a [`Runnable`] and
//! hands it to whichever [`Dispatcher`] the deadline was configured with.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::runtime::{Builder, Runtime};

#[cfg(test)]
mod tests;

pub struct Runnable(Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + 'static>);

impl Runnable {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    Self(Box::new(move || Box::pin(f()) as BoxFuture<'static, ()>))
  }

  pub async fn run(self) {
    (self.0)().await;
  }
}

impl Debug for Runnable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Runnable")
  }
}

#[async_trait]
pub trait Dispatcher: Debug + Send + Sync + 'static {
  /// Starts `runner` concurrently and returns without waiting for it.
  async fn schedule(&self, runner: Runnable);
}

// --- TokioRuntimeContextDispatcher implementation

/// Spawns onto the Tokio runtime of the calling context.
#[derive(Debug, Clone, Default)]
pub struct TokioRuntimeContextDispatcher;

impl TokioRuntimeContextDispatcher {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl Dispatcher for TokioRuntimeContextDispatcher {
  async fn schedule(&self, runner: Runnable) {
    tokio::spawn(runner.run());
  }
}

// --- TokioRuntimeDispatcher implementation

/// Dispatcher that executes work on a dedicated Tokio runtime.
///
/// Work scheduled here keeps the caller's runtime free for the timer, which
/// matters when the guarded dependency is badly behaved.
///
/// ## Runtime lifecycle
/// The runtime is owned via `Option<Arc<Runtime>>`. When the last clone is
/// dropped it calls `shutdown_background()`, so dropping from inside an async
/// context is safe. Work still running at that point is abandoned.
///
/// ```rust
/// use nexus_deadline_core_rs::dispatch::{Dispatcher, Runnable, TokioRuntimeDispatcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = TokioRuntimeDispatcher::single_worker()?;
/// dispatcher.schedule(Runnable::new(|| async move {
///   // async work
/// })).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokioRuntimeDispatcher {
  runtime: Option<Arc<Runtime>>,
}

impl TokioRuntimeDispatcher {
  pub fn new() -> Result<Self, std::io::Error> {
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    Ok(Self::with_runtime(runtime))
  }

  pub fn single_worker() -> Result<Self, std::io::Error> {
    Self::with_worker_threads(1)
  }

  pub fn with_worker_threads(worker_threads: usize) -> Result<Self, std::io::Error> {
    let runtime = Builder::new_multi_thread()
      .worker_threads(worker_threads)
      .enable_all()
      .build()?;
    Ok(Self::with_runtime(runtime))
  }

  pub fn with_runtime(runtime: Runtime) -> Self {
    Self {
      runtime: Some(Arc::new(runtime)),
    }
  }
}

#[async_trait]
impl Dispatcher for TokioRuntimeDispatcher {
  async fn schedule(&self, runner: Runnable) {
    // `runtime` is only taken in `Drop`
    if let Some(runtime) = &self.runtime {
      runtime.spawn(runner.run());
    }
  }
}

impl Drop for TokioRuntimeDispatcher {
  fn drop(&mut self) {
    if let Some(runtime_arc) = self.runtime.take() {
      if Arc::strong_count(&runtime_arc) == 1 {
        if let Ok(runtime) = Arc::try_unwrap(runtime_arc) {
          runtime.shutdown_background();
        }
      }
    }
  }
}
