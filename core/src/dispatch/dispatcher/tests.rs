use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::dispatch::{Dispatcher, Runnable, TokioRuntimeContextDispatcher, TokioRuntimeDispatcher};

#[tokio::test]
async fn test_runnable_runs_its_future() {
  let counter = Arc::new(AtomicUsize::new(0));
  let cloned = counter.clone();
  Runnable::new(move || async move {
    cloned.fetch_add(1, Ordering::SeqCst);
  })
  .run()
  .await;
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_context_dispatcher_does_not_wait_for_the_runnable() {
  let dispatcher = TokioRuntimeContextDispatcher::new();
  let (started_tx, started_rx) = oneshot::channel();
  let (release_tx, release_rx) = oneshot::channel::<()>();

  dispatcher
    .schedule(Runnable::new(move || async move {
      let _ = started_tx.send(());
      let _ = release_rx.await;
    }))
    .await;

  // schedule returned while the runnable is still parked on `release_rx`
  tokio::time::timeout(Duration::from_secs(1), started_rx)
    .await
    .expect("runnable never started")
    .unwrap();
  let _ = release_tx.send(());
}

#[tokio::test]
async fn test_dedicated_runtime_dispatcher_runs_work() {
  let dispatcher = TokioRuntimeDispatcher::single_worker().unwrap();
  let (tx, rx) = oneshot::channel();

  dispatcher
    .schedule(Runnable::new(move || async move {
      tokio::time::sleep(Duration::from_millis(5)).await;
      let _ = tx.send(std::thread::current().name().map(str::to_string));
    }))
    .await;

  let thread_name = tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
  assert!(thread_name.is_some());
  // dropping inside an async context must not panic
  drop(dispatcher);
}
