use std::time::Duration;

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

pub const LIB_NAME: &str = "nexus-deadline";

#[derive(Debug, Clone)]
pub struct DeadlineMetrics {
  invocations_started_count: Counter<u64>,
  invocations_completed_count: Counter<u64>,
  invocations_timed_out_count: Counter<u64>,
  invocation_duration: Histogram<f64>,
  attributes: Vec<KeyValue>,
}

static_assertions::assert_impl_all!(DeadlineMetrics: Send, Sync);

impl DeadlineMetrics {
  pub fn new(meter: &Meter, deadline_name: &str) -> Self {
    DeadlineMetrics {
      invocations_started_count: meter
        .u64_counter("nexus_deadline_invocations_started_count")
        .with_description("Number of deadline invocations started")
        .with_unit("1")
        .build(),
      invocations_completed_count: meter
        .u64_counter("nexus_deadline_invocations_completed_count")
        .with_description("Number of deadline invocations whose work finished in time")
        .with_unit("1")
        .build(),
      invocations_timed_out_count: meter
        .u64_counter("nexus_deadline_invocations_timed_out_count")
        .with_description("Number of deadline invocations that timed out")
        .with_unit("1")
        .build(),
      invocation_duration: meter
        .f64_histogram("nexus_deadline_invocation_duration_seconds")
        .with_description("Time the caller waited on a deadline invocation in seconds")
        .with_unit("s")
        .build(),
      attributes: vec![KeyValue::new("deadline", deadline_name.to_string())],
    }
  }

  pub fn increment_invocations_started_count(&self) {
    self.invocations_started_count.add(1, &self.attributes);
  }

  pub fn increment_invocations_completed_count(&self) {
    self.invocations_completed_count.add(1, &self.attributes);
  }

  pub fn increment_invocations_timed_out_count(&self) {
    self.invocations_timed_out_count.add(1, &self.attributes);
  }

  pub fn record_invocation_duration(&self, elapsed: Duration) {
    self
      .invocation_duration
      .record(elapsed.as_secs_f64(), &self.attributes);
  }
}
