use std::any::Any;

/// What the executor does when the work panics before the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicPolicy {
  /// Resume the panic on the caller, as if the work had run inline.
  #[default]
  Propagate,
  /// Report the panic as [`DeadlineError::Panicked`](crate::deadline::DeadlineError::Panicked).
  Capture,
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&'static str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  }
}
