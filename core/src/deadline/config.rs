use std::sync::Arc;
use std::time::Duration;

use opentelemetry::metrics::Meter;

use crate::deadline::{ConfigOption, PanicPolicy};
use crate::dispatch::{Dispatcher, TokioRuntimeContextDispatcher};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_NAME: &str = "deadline";

#[derive(Debug, Clone)]
pub struct Config {
  pub timeout: Duration,
  pub name: String,
  pub dispatcher: Arc<dyn Dispatcher>,
  pub panic_policy: PanicPolicy,
  pub meter: Option<Meter>,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      timeout: DEFAULT_TIMEOUT,
      name: DEFAULT_NAME.to_string(),
      dispatcher: Arc::new(TokioRuntimeContextDispatcher::new()),
      panic_policy: PanicPolicy::default(),
      meter: None,
    }
  }
}

impl Config {
  pub fn from(options: impl IntoIterator<Item = ConfigOption>) -> Config {
    let mut config = Config::default();
    for option in options {
      option.apply(&mut config);
    }
    config
  }

  pub fn is_metrics_enabled(&self) -> bool {
    self.meter.is_some()
  }
}
