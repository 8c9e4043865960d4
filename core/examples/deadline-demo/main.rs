use std::env;
use std::time::Duration;

use clap::Parser;
use nexus_deadline_core_rs::metrics::LIB_NAME;
use nexus_deadline_core_rs::{CancellationObserver, Config, ConfigOption, Deadline, DeadlineError, PanicPolicy};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
  /// Deadline applied to the simulated dependency, e.g. `100ms` or `2s`.
  #[clap(long, default_value = "100ms", value_parser = humantime::parse_duration)]
  timeout: Duration,

  /// How long the simulated dependency takes.
  #[clap(long, default_value = "10ms", value_parser = humantime::parse_duration)]
  work: Duration,

  /// Make the dependency fail with its own error instead of succeeding.
  #[clap(long)]
  fail: bool,

  /// Ignore the cancellation signal and keep running after the deadline.
  #[clap(long)]
  stubborn: bool,

  /// Run the dependency as blocking code on the blocking thread pool.
  #[clap(long)]
  blocking: bool,
}

#[derive(Debug, Error)]
enum DependencyError {
  #[error("dependency: refused after {0:?}")]
  Refused(Duration),
}

async fn call_dependency(args: &Args, stopper: CancellationObserver) -> Result<&'static str, DependencyError> {
  let work = args.work;
  let fail = args.fail;
  if args.stubborn {
    tokio::time::sleep(work).await;
  } else {
    tokio::select! {
      _ = tokio::time::sleep(work) => {}
      _ = stopper.cancelled() => {
        tracing::info!("dependency noticed cancellation, giving up");
        return Ok("abandoned");
      }
    }
  }
  if fail {
    Err(DependencyError::Refused(work))
  } else {
    Ok("pong")
  }
}

fn call_dependency_blocking(work: Duration, fail: bool, stopper: CancellationObserver) -> Result<&'static str, DependencyError> {
  let step = Duration::from_millis(1);
  let mut spent = Duration::ZERO;
  while spent < work {
    if stopper.is_cancelled() {
      tracing::info!(?spent, "blocking dependency noticed cancellation, giving up");
      return Ok("abandoned");
    }
    std::thread::sleep(step);
    spent += step;
  }
  if fail {
    Err(DependencyError::Refused(work))
  } else {
    Ok("pong")
  }
}

#[tokio::main]
async fn main() {
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "deadline_demo=info,nexus_deadline_core_rs=debug");
  }
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let args = Args::parse();
  let deadline = Deadline::new_with_config(Config::from([
    ConfigOption::with_timeout(args.timeout),
    ConfigOption::with_name("demo"),
    ConfigOption::with_panic_policy(PanicPolicy::Capture),
    ConfigOption::with_meter(opentelemetry::global::meter(LIB_NAME)),
  ]));

  tracing::info!(timeout = ?args.timeout, work = ?args.work, "started");

  let result = if args.blocking {
    let (work, fail) = (args.work, args.fail);
    deadline
      .run_blocking(move |stopper| call_dependency_blocking(work, fail, stopper))
      .await
  } else {
    let args = std::sync::Arc::new(args);
    let cloned = args.clone();
    deadline
      .run(move |stopper| async move { call_dependency(&cloned, stopper).await })
      .await
  };

  match result {
    Ok(reply) => tracing::info!(reply, "dependency answered in time"),
    Err(DeadlineError::TimedOut) => tracing::warn!("dependency timed out"),
    Err(DeadlineError::Work(e)) => tracing::warn!(error = %e, "dependency failed"),
    Err(e) => tracing::error!(error = %e, "dependency did not deliver"),
  }

  // give a stubborn dependency a moment to finish so its discarded result shows in the log
  tokio::time::sleep(Duration::from_millis(50)).await;
  tracing::info!("done");
}
