use std::sync::Arc;
use std::time::Duration;

use opentelemetry::metrics::Meter;

use crate::deadline::{Config, PanicPolicy};
use crate::dispatch::Dispatcher;

#[derive(Debug, Clone)]
pub enum ConfigOption {
  SetTimeout(Duration),
  SetName(String),
  SetDispatcher(Arc<dyn Dispatcher>),
  SetPanicPolicy(PanicPolicy),
  SetMeter(Meter),
}

impl ConfigOption {
  pub(crate) fn apply(self, config: &mut Config) {
    match self {
      ConfigOption::SetTimeout(timeout) => {
        config.timeout = timeout;
      }
      ConfigOption::SetName(name) => {
        config.name = name;
      }
      ConfigOption::SetDispatcher(dispatcher) => {
        config.dispatcher = dispatcher;
      }
      ConfigOption::SetPanicPolicy(policy) => {
        config.panic_policy = policy;
      }
      ConfigOption::SetMeter(meter) => {
        config.meter = Some(meter);
      }
    }
  }

  pub fn with_timeout(timeout: Duration) -> ConfigOption {
    ConfigOption::SetTimeout(timeout)
  }

  pub fn with_name(name: impl Into<String>) -> ConfigOption {
    ConfigOption::SetName(name.into())
  }

  pub fn with_dispatcher(dispatcher: impl Dispatcher) -> ConfigOption {
    ConfigOption::SetDispatcher(Arc::new(dispatcher))
  }

  pub fn with_panic_policy(policy: PanicPolicy) -> ConfigOption {
    ConfigOption::SetPanicPolicy(policy)
  }

  pub fn with_meter(meter: Meter) -> ConfigOption {
    ConfigOption::SetMeter(meter)
  }
}
