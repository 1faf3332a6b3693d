use crate::actor::spawn_actor;
use crate::session_actor::{SessionActor, SessionMessage};
use crate::shared::SessionShared;
use core_types::Transport;
use futures_channel::{mpsc, oneshot};
use session_protocol::{ConnectionState, SelectOutcome, SessionConfig, SessionEvent};
use std::sync::Arc;

/// Capacity of the event channel handed to the caller. Data events are
/// awaited, so a full channel backpressures the read loop. Lifecycle and
/// error events are sent best-effort and the newest are dropped when the
/// receiver stops draining.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Handle to a running serial session
///
/// All operations are non-blocking sends into the session actor; status
/// queries read shared atomics and never wait on the actor. The handle is
/// cheap to clone. Dropping every clone stops the actor, which closes the
/// port on its way out.
///
/// # Example
///
/// ```ignore
/// let (session, mut events) = SerialSession::spawn(transport, SessionConfig::default());
/// session.select().await;
/// session.open();
/// while let Some(event) = events.next().await {
///     if let SessionEvent::LineReceived { line } = event {
///         println!("{line}");
///     }
/// }
/// ```
#[derive(Clone)]
pub struct SerialSession {
    actor_tx: mpsc::UnboundedSender<SessionMessage>,
    shared: Arc<SessionShared>,
}

impl SerialSession {
    /// Spawn the session actor on the current tokio runtime.
    ///
    /// Returns the session handle and the event receiver.
    pub fn spawn<T>(transport: T, config: SessionConfig) -> (Self, mpsc::Receiver<SessionEvent>)
    where
        T: Transport + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (actor_tx, actor_rx) = mpsc::unbounded();
        let shared = Arc::new(SessionShared::new());

        let actor = SessionActor::new(
            transport,
            config,
            shared.clone(),
            event_tx.clone(),
            actor_tx.clone(),
        );
        spawn_actor(actor, actor_rx, event_tx);

        (Self { actor_tx, shared }, event_rx)
    }

    /// Pick a device: closes any open connection, revokes old grants and
    /// requests a new one. Resolves once the actor finished selecting.
    pub async fn select(&self) -> SelectOutcome {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .actor_tx
            .unbounded_send(SessionMessage::Select { reply: reply_tx })
            .is_err()
        {
            return SelectOutcome::NoDevice;
        }
        reply_rx.await.unwrap_or(SelectOutcome::NoDevice)
    }

    /// Open the selected device. A no-op while already open or opening.
    /// Failures surface as error events, never as a return value.
    pub fn open(&self) {
        let _ = self.actor_tx.unbounded_send(SessionMessage::Open);
    }

    /// Close the connection and wait for teardown to finish. Idempotent;
    /// returns immediately when nothing is open. Bounded internally, so it
    /// never hangs on an uncooperative transport.
    pub async fn close(&self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .actor_tx
            .unbounded_send(SessionMessage::Close { reply: reply_tx })
            .is_err()
        {
            return;
        }
        let _ = reply_rx.await;
    }

    /// Enqueue raw bytes for transmission. Silently ignored while not open.
    pub fn send_binary(&self, data: Vec<u8>) {
        let _ = self
            .actor_tx
            .unbounded_send(SessionMessage::Write { data });
    }

    /// Enqueue UTF-8 text for transmission. Silently ignored while not open.
    pub fn send_text(&self, text: &str) {
        self.send_binary(text.as_bytes().to_vec());
    }

    /// Replace the configuration. Takes effect on the next open.
    pub fn configure(&self, config: SessionConfig) {
        let _ = self
            .actor_tx
            .unbounded_send(SessionMessage::Configure { config });
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// True while the port is open and the read loop is running
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// True while a device is selected (open or not)
    pub fn is_selected(&self) -> bool {
        self.shared.is_selected()
    }

    /// Resolved chip name of the selected device. `None` without a selected
    /// device; `Some("Unknown")` for an unrecognized one.
    pub fn device_name(&self) -> Option<String> {
        self.shared.device_name()
    }
}
