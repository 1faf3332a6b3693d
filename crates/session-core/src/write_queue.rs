use core_types::ChunkWriter;
use futures::stream::StreamExt;
use futures_channel::mpsc;
use session_protocol::{SessionError, SessionEvent};
use tracing::{debug, warn};

/// Clonable handle for enqueueing outgoing chunks
///
/// Enqueueing never blocks and never fails visibly; once the drain task
/// stops (port closed), enqueued chunks are dropped.
#[derive(Clone)]
pub struct WriteSender {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl WriteSender {
    /// Append a chunk to the outgoing buffer
    pub fn enqueue(&self, data: Vec<u8>) {
        let _ = self.tx.unbounded_send(data);
    }
}

/// Spawn the drain task that owns the write capability.
///
/// Exactly one drain task exists per open port. It awaits the next chunk,
/// then non-blockingly drains everything else already buffered, and issues
/// a single write for the whole batch. The task stops when every
/// [`WriteSender`] is dropped.
///
/// A failed write is reported through the event channel and otherwise
/// swallowed: the read loop is the authoritative failure detector, and a
/// transient write error must not tear the session down on its own.
pub fn spawn_drain<W>(mut writer: W, event_tx: mpsc::Sender<SessionEvent>) -> WriteSender
where
    W: ChunkWriter,
{
    let (tx, mut rx) = mpsc::unbounded::<Vec<u8>>();

    tokio::spawn(async move {
        while let Some(mut batch) = rx.next().await {
            // Coalesce whatever else is already queued into one write
            while let Ok(Some(more)) = rx.try_next() {
                batch.extend_from_slice(&more);
            }

            if let Err(e) = writer.write(&batch).await {
                warn!("write of {} bytes failed: {}", batch.len(), e);
                let error = SessionError::WriteFailed(e.to_string());
                let _ = event_tx.clone().try_send(SessionEvent::Error {
                    message: error.to_string(),
                });
            }
        }

        debug!("drain task stopped");
    });

    WriteSender { tx }
}
