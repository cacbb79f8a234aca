//! The notification queue: an ordered, bounded channel between the
//! engine (sole producer) and the transport layer (sole consumer).

use roshambo_model::Update;
use tokio::sync::mpsc;

/// Default queue depth. Matches the burst a full room can produce over
/// a few rounds while the consumer is catching up.
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// The consumer end. Drain with `recv().await`; events arrive in
/// emission order. Already-buffered events stay readable after the
/// engine side is dropped.
pub type UpdateReceiver = mpsc::Receiver<Update>;

/// The producer end held by the engine. Cheap to clone.
#[derive(Clone)]
pub struct UpdateSender {
    tx: mpsc::Sender<Update>,
}

/// Creates a bounded update queue.
pub fn update_queue(capacity: usize) -> (UpdateSender, UpdateReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (UpdateSender { tx }, rx)
}

impl UpdateSender {
    /// Pushes an update, fire-and-forget.
    ///
    /// Never blocks the engine: when the queue is full the update is
    /// dropped and logged. Engine correctness does not depend on the
    /// consumer keeping up — notifications are best-effort.
    pub fn push(&self, update: Update) {
        use mpsc::error::TrySendError;

        match self.tx.try_send(update) {
            Ok(()) => {}
            Err(TrySendError::Full(update)) => {
                tracing::warn!(
                    recipient = %update.recipient().id,
                    "update queue full, dropping notification"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("update queue closed, consumer gone");
            }
        }
    }
}
