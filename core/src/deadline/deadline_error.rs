use thiserror::Error;

/// Outcome of a [`Deadline`](crate::deadline::Deadline) invocation that did not produce a value.
///
/// `TimedOut` is only ever produced by the executor. The work's own error is
/// carried untouched in `Work` and renders exactly as it would on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeadlineError<E> {
  #[error("deadline: timed out")]
  TimedOut,
  #[error("{0}")]
  Work(E),
  #[error("deadline: work panicked: {0}")]
  Panicked(String),
  #[error("deadline: work abandoned before delivering a result")]
  Abandoned,
}

impl<E> DeadlineError<E> {
  pub fn is_timed_out(&self) -> bool {
    matches!(self, DeadlineError::TimedOut)
  }

  pub fn is_work_error(&self) -> bool {
    matches!(self, DeadlineError::Work(_))
  }

  pub fn work_error(&self) -> Option<&E> {
    match self {
      DeadlineError::Work(e) => Some(e),
      _ => None,
    }
  }

  pub fn into_work_error(self) -> Option<E> {
    match self {
      DeadlineError::Work(e) => Some(e),
      _ => None,
    }
  }
}

impl<E> From<E> for DeadlineError<E> {
  fn from(error: E) -> Self {
    DeadlineError::Work(error)
  }
}
