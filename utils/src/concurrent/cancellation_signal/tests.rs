use std::time::Duration;

use crate::concurrent::CancellationSignal;

#[test]
fn test_new_signal_is_open() {
  let signal = CancellationSignal::new();
  let observer = signal.observer();
  assert!(!signal.is_raised());
  assert!(!observer.is_cancelled());
}

#[test]
fn test_raise_is_idempotent() {
  let signal = CancellationSignal::new();
  assert!(signal.raise());
  assert!(!signal.raise());
  assert!(!signal.raise());
  assert!(signal.is_raised());
}

#[test]
fn test_every_observer_sees_the_raise() {
  let signal = CancellationSignal::new();
  let observers = (0..4).map(|_| signal.observer()).collect::<Vec<_>>();
  let cloned = observers[0].clone();

  signal.raise();

  assert!(observers.iter().all(|o| o.is_cancelled()));
  assert!(cloned.is_cancelled());
  assert_eq!(cloned, observers[0]);
}

#[tokio::test]
async fn test_cancelled_resolves_immediately_when_already_raised() {
  let signal = CancellationSignal::new();
  signal.raise();

  let result = tokio::time::timeout(Duration::from_millis(100), signal.observer().cancelled()).await;
  assert!(result.is_ok());
}

#[tokio::test]
async fn test_cancelled_wakes_waiting_tasks() {
  let signal = CancellationSignal::new();

  let handles = (0..3)
    .map(|_| {
      let observer = signal.observer();
      tokio::spawn(async move {
        observer.cancelled().await;
        observer.is_cancelled()
      })
    })
    .collect::<Vec<_>>();

  tokio::time::sleep(Duration::from_millis(10)).await;
  signal.raise();

  for handle in handles {
    let observed = tokio::time::timeout(Duration::from_secs(1), handle)
      .await
      .expect("observer was not woken")
      .unwrap();
    assert!(observed);
  }
}

#[tokio::test]
async fn test_dropping_signal_does_not_cancel() {
  let signal = CancellationSignal::new();
  let observer = signal.observer();
  drop(signal);

  assert!(!observer.is_cancelled());
  let result = tokio::time::timeout(Duration::from_millis(20), observer.cancelled()).await;
  assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_raise_races_with_many_waiters() {
  for _ in 0..50 {
    let signal = CancellationSignal::new();
    let observer = signal.observer();
    let waiter = tokio::spawn(async move { observer.cancelled().await });
    let raiser = tokio::spawn(async move {
      tokio::task::yield_now().await;
      signal.raise()
    });

    assert!(raiser.await.unwrap());
    tokio::time::timeout(Duration::from_secs(1), waiter)
      .await
      .expect("waiter missed the raise")
      .unwrap();
  }
}
