use crate::session_actor::SessionMessage;
use core_types::ChunkReader;
use framing::{Eol, LineSplitter, Utf8Stream};
use futures::{future::FutureExt, sink::SinkExt, stream::StreamExt};
use futures_channel::{mpsc, oneshot};
use session_protocol::SessionEvent;
use tracing::debug;

/// Spawn the read loop for an open port.
///
/// The loop races `read_chunk` against the shutdown signal. Each non-empty
/// chunk is published verbatim as `BinaryReceived`, then decoded and fed to
/// the line splitter; every completed line goes out as `LineReceived` before
/// the next chunk is requested. Data sends are awaited, so a slow receiver
/// backpressures the loop rather than dropping events.
///
/// End-of-stream, read error, and shutdown all leave through the same exit:
/// `ReadEnded` is sent to the session actor and the done channel is signaled
/// so a pending close can stop waiting.
pub(crate) fn spawn_read_loop<R>(
    mut reader: R,
    eol: Eol,
    mut event_tx: mpsc::Sender<SessionEvent>,
    actor_tx: mpsc::UnboundedSender<SessionMessage>,
    mut shutdown_rx: mpsc::Receiver<()>,
    done_tx: oneshot::Sender<()>,
) where
    R: ChunkReader,
{
    tokio::spawn(async move {
        let mut decoder = Utf8Stream::new();
        let mut splitter = LineSplitter::with_eol(eol);

        let failure = loop {
            let read_fut = reader.read_chunk().fuse();
            let shutdown_fut = shutdown_rx.next().fuse();

            futures::pin_mut!(read_fut, shutdown_fut);

            let read_result = futures::select! {
                res = read_fut => Some(res),
                _ = shutdown_fut => None, // Shutdown signal
            };

            match read_result {
                Some(Ok(Some(data))) if !data.is_empty() => {
                    // Data events are awaited: a full channel pauses the
                    // loop until the receiver catches up instead of losing
                    // text. A send error means the receiver is gone.
                    if event_tx
                        .send(SessionEvent::BinaryReceived {
                            data: data.clone(),
                        })
                        .await
                        .is_err()
                    {
                        debug!("read loop: event receiver dropped");
                        break None;
                    }

                    let mut delivered = true;
                    let text = decoder.push(&data);
                    for line in splitter.push(&text) {
                        if event_tx
                            .send(SessionEvent::LineReceived { line })
                            .await
                            .is_err()
                        {
                            delivered = false;
                            break;
                        }
                    }
                    if !delivered {
                        debug!("read loop: event receiver dropped");
                        break None;
                    }
                }
                Some(Ok(Some(_))) => {} // Empty read is OK
                Some(Ok(None)) => {
                    debug!("read loop: end of stream");
                    break None;
                }
                Some(Err(e)) => {
                    debug!("read loop: read error: {}", e);
                    break Some(e.to_string());
                }
                None => {
                    // Cancellation is not an error
                    debug!("read loop: shutdown signal received");
                    break None;
                }
            }
        };

        // Notify the actor, then signal completion so a pending close can
        // proceed. The actor ignores ReadEnded while it is tearing down.
        let _ = actor_tx.unbounded_send(SessionMessage::ReadEnded { error: failure });
        let _ = done_tx.send(());
        debug!("read loop stopped");
    });
}
