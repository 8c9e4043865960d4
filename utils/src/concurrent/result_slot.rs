use std::fmt::{Debug, Formatter};

use thiserror::Error;
use tokio::sync::oneshot;


#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultSlotError {
  #[error("result slot: dropped without delivering a value")]
  Abandoned,
}

/// Creates a single-delivery channel.
///
/// Delivery never blocks: if the receiver has already gone away the value is
/// handed back to the writer instead of being queued.
pub fn result_slot<T>() -> (ResultSlot<T>, ResultReceiver<T>) {
  let (sender, receiver) = oneshot::channel();
  (ResultSlot { sender }, ResultReceiver { receiver })
}

pub struct ResultSlot<T> {
  sender: oneshot::Sender<T>,
}

impl<T> Debug for ResultSlot<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ResultSlot")
      .field("abandoned", &self.sender.is_closed())
      .finish()
  }
}

impl<T> ResultSlot<T> {
  pub fn deliver(self, value: T) -> Result<(), T> {
    self.sender.send(value)
  }

  /// Whether the receiving side has stopped listening.
  pub fn is_abandoned(&self) -> bool {
    self.sender.is_closed()
  }
}

pub struct ResultReceiver<T> {
  receiver: oneshot::Receiver<T>,
}

impl<T> Debug for ResultReceiver<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ResultReceiver").finish()
  }
}

impl<T> ResultReceiver<T> {
  pub async fn receive(self) -> Result<T, ResultSlotError> {
    self.receiver.await.map_err(|_| ResultSlotError::Abandoned)
  }
}
