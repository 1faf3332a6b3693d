use crate::actor::Actor;
use crate::read_loop::spawn_read_loop;
use crate::retry::{spawn_retry, RetryHandle};
use crate::shared::SessionShared;
use crate::write_queue::{spawn_drain, WriteSender};
use async_trait::async_trait;
use core_types::{identity, DeviceHandle, Transport};
use futures_channel::{mpsc, oneshot};
use session_protocol::{
    ConnectionState, SelectOutcome, SessionConfig, SessionError, SessionEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Hard bound on close teardown. The read loop confirms its exit through a
/// completion channel; if the transport refuses to cooperate within this
/// window the session is forced to `Closed` anyway.
pub(crate) const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Delay between revoking old grants and requesting a new one, giving the
/// platform time to release the previous port.
const SELECT_SETTLE: Duration = Duration::from_millis(50);

/// Commands processed by [`SessionActor`]
#[derive(Debug)]
pub enum SessionMessage {
    /// Pick a device: revoke old grants, request a new one
    Select {
        reply: oneshot::Sender<SelectOutcome>,
    },

    /// Open the selected device with the current configuration
    Open,

    /// Close the connection; replies once teardown finished
    Close { reply: oneshot::Sender<()> },

    /// Enqueue outgoing bytes (ignored while not open)
    Write { data: Vec<u8> },

    /// Replace the configuration, effective on the next open
    Configure { config: SessionConfig },

    /// Read loop terminated (end-of-stream, error, or shutdown)
    ReadEnded { error: Option<String> },

    /// Retry timer elapsed; attempt a reopen if still armed
    RetryTick,
}

/// SessionActor owns the connection lifecycle
///
/// Responsibilities:
/// - Validate and apply every state transition
/// - Open/close the device handle, spawn read loop and drain task
/// - Route outgoing writes to the drain task while open
/// - Schedule reopen attempts after failures
/// - Publish events and shared status for the facade
pub struct SessionActor<T: Transport> {
    transport: T,
    device: Option<T::Device>,
    config: SessionConfig,
    shared: Arc<SessionShared>,
    event_tx: mpsc::Sender<SessionEvent>,
    /// Loops back into this actor's own mailbox (read loop, retry timer)
    self_tx: mpsc::UnboundedSender<SessionMessage>,
    write_tx: Option<WriteSender>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    done_rx: Option<oneshot::Receiver<()>>,
    retry: Option<RetryHandle>,
    retry_armed: bool,
}

impl<T: Transport + 'static> SessionActor<T> {
    pub(crate) fn new(
        transport: T,
        config: SessionConfig,
        shared: Arc<SessionShared>,
        event_tx: mpsc::Sender<SessionEvent>,
        self_tx: mpsc::UnboundedSender<SessionMessage>,
    ) -> Self {
        Self {
            transport,
            device: None,
            config,
            shared,
            event_tx,
            self_tx,
            write_tx: None,
            shutdown_tx: None,
            done_rx: None,
            retry: None,
            retry_armed: false,
        }
    }

    fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    fn emit(&mut self, event: SessionEvent) {
        let _ = self.event_tx.try_send(event);
    }

    fn emit_error(&mut self, error: SessionError) {
        self.emit(SessionEvent::Error {
            message: error.to_string(),
        });
    }

    /// Apply a validated state transition and publish the matching events
    fn transition(&mut self, new_state: ConnectionState) -> Result<(), SessionError> {
        let current = self.state();
        if current == new_state {
            return Ok(());
        }
        if !current.can_transition_to(new_state) {
            return Err(SessionError::InvalidTransition(format!(
                "{:?} -> {:?}",
                current, new_state
            )));
        }

        debug!(from = ?current, to = ?new_state, "state transition");
        self.shared.set_state(new_state);
        self.emit(SessionEvent::StateChanged { state: new_state });

        match new_state {
            ConnectionState::Open => self.emit(SessionEvent::Opened),
            ConnectionState::Closed => self.emit(SessionEvent::Closed),
            _ => {}
        }

        Ok(())
    }

    /// Store the active device and publish selection status
    fn set_device(&mut self, device: Option<T::Device>) {
        let name = device
            .as_ref()
            .map(|d| d.info())
            .and_then(|dev_info| identity::resolve(Some(&dev_info)).map(String::from));
        self.shared.set_selected(device.is_some(), name);
        self.device = device;
    }

    /// Re-resolve the device handle from the transport's permission list.
    /// A handle going stale between opens is normal (unplug, revocation).
    async fn refresh_device(&mut self) {
        match self.transport.permitted_devices().await {
            Ok(devices) => self.set_device(devices.into_iter().next()),
            Err(e) => {
                warn!("permission list unavailable: {}", e);
                self.set_device(None);
            }
        }
    }

    fn schedule_retry(&mut self) {
        if !self.retry_armed || self.config.reconnect_interval.is_zero() {
            return;
        }
        debug!("scheduling reopen in {:?}", self.config.reconnect_interval);
        self.retry = Some(spawn_retry(
            self.self_tx.clone(),
            self.config.reconnect_interval,
        ));
    }

    async fn handle_open(&mut self, user_initiated: bool) {
        if user_initiated {
            // Arming happens here and nowhere else; only close() disarms
            self.retry_armed = !self.config.reconnect_interval.is_zero();
        }

        match self.state() {
            ConnectionState::Open | ConnectionState::Opening => {
                debug!("open ignored: already {:?}", self.state());
                return;
            }
            ConnectionState::Closing => {
                debug!("open ignored: close in progress");
                return;
            }
            ConnectionState::Closed => {}
        }

        // A fresh attempt supersedes any pending timer
        self.retry = None;

        self.refresh_device().await;
        let device = match self.device.clone() {
            Some(device) => device,
            None => {
                self.emit_error(SessionError::OpenFailed("no device selected".into()));
                self.schedule_retry();
                return;
            }
        };

        if let Err(e) = self.transition(ConnectionState::Opening) {
            warn!("{}", e);
            return;
        }

        // Snapshot: a configure() during the session applies on the next open
        let config = self.config.clone();

        match device.open(config.baud).await {
            Ok((reader, writer)) => {
                let (shutdown_tx, shutdown_rx) = mpsc::channel(8);
                let (done_tx, done_rx) = oneshot::channel();

                spawn_read_loop(
                    reader,
                    config.eol.clone(),
                    self.event_tx.clone(),
                    self.self_tx.clone(),
                    shutdown_rx,
                    done_tx,
                );

                self.write_tx = Some(spawn_drain(writer, self.event_tx.clone()));
                self.shutdown_tx = Some(shutdown_tx);
                self.done_rx = Some(done_rx);

                if let Err(e) = self.transition(ConnectionState::Open) {
                    warn!("{}", e);
                }
                info!("port open at {} baud", config.baud);
            }
            Err(e) => {
                let _ = self.transition(ConnectionState::Closed);
                self.emit_error(SessionError::OpenFailed(e.to_string()));
                self.schedule_retry();
            }
        }
    }

    /// Release the writer, stop the read loop, close the device.
    ///
    /// Bounded by [`CLOSE_TIMEOUT`]: if the read loop confirmation or the
    /// device close does not complete in time, teardown proceeds anyway and
    /// a `CloseTimeout` error event is published.
    async fn teardown_connection(&mut self) {
        // Dropping the only sender stops the drain task after it flushes
        self.write_tx = None;

        if let Some(mut shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.try_send(());
        }

        let done_rx = self.done_rx.take();
        let device = self.device.clone();

        let cleanup = async {
            if let Some(done_rx) = done_rx {
                let _ = done_rx.await;
            }
            if let Some(device) = device {
                let _ = device.close().await;
            }
        };

        if timeout(CLOSE_TIMEOUT, cleanup).await.is_err() {
            let error = SessionError::CloseTimeout(CLOSE_TIMEOUT);
            warn!("{}", error);
            self.emit_error(error);
        }
    }

    async fn handle_close(&mut self) {
        // Explicit close is the only thing that disarms retry
        self.retry_armed = false;
        self.retry = None;

        if self.state() == ConnectionState::Closed {
            debug!("close ignored: already closed");
            return;
        }

        if let Err(e) = self.transition(ConnectionState::Closing) {
            warn!("{}", e);
            return;
        }

        self.teardown_connection().await;
        let _ = self.transition(ConnectionState::Closed);
        info!("port closed");
    }

    async fn handle_select(&mut self) -> SelectOutcome {
        // Tear down any existing connection first
        self.retry = None;
        if self.state().can_close() {
            let _ = self.transition(ConnectionState::Closing);
            self.teardown_connection().await;
            let _ = self.transition(ConnectionState::Closed);
        }
        self.set_device(None);

        // Revoke stale grants so the permission list holds at most the
        // device chosen below
        if let Ok(devices) = self.transport.permitted_devices().await {
            for device in devices {
                let _ = device.forget().await;
            }
        }
        tokio::time::sleep(SELECT_SETTLE).await;

        match self.transport.request_device().await {
            Ok(device) => {
                self.set_device(Some(device));
                let name = self.shared.device_name();
                info!(name = ?name, "device selected");
                self.emit(SessionEvent::DeviceSelected { name: name.clone() });

                if self.config.auto_reopen {
                    self.handle_open(false).await;
                }

                SelectOutcome::Selected { name }
            }
            Err(e) => {
                self.emit_error(SessionError::SelectionRejected(e.to_string()));
                SelectOutcome::NoDevice
            }
        }
    }

    fn handle_write(&mut self, data: Vec<u8>) {
        if self.state() != ConnectionState::Open {
            debug!("ignoring write of {} bytes: port not open", data.len());
            return;
        }
        if let Some(write_tx) = &self.write_tx {
            write_tx.enqueue(data);
        }
    }

    async fn handle_read_ended(&mut self, error: Option<String>) {
        if self.state() != ConnectionState::Open {
            // Teardown already in progress; the close path owns cleanup
            return;
        }

        debug!("read loop ended while open");
        self.teardown_connection().await;
        let _ = self.transition(ConnectionState::Closed);

        if let Some(reason) = error {
            self.emit_error(SessionError::ReadFailed(reason));
        }
        self.schedule_retry();
    }

    async fn handle_retry_tick(&mut self) {
        if !self.retry_armed || self.state() != ConnectionState::Closed {
            return;
        }
        info!("retrying open");
        self.handle_open(false).await;
    }
}

#[async_trait]
impl<T: Transport + 'static> Actor for SessionActor<T> {
    type Message = SessionMessage;

    fn name(&self) -> &'static str {
        "SessionActor"
    }

    async fn handle(&mut self, msg: SessionMessage) -> Result<(), SessionError> {
        match msg {
            SessionMessage::Select { reply } => {
                let outcome = self.handle_select().await;
                let _ = reply.send(outcome);
            }
            SessionMessage::Open => self.handle_open(true).await,
            SessionMessage::Close { reply } => {
                self.handle_close().await;
                let _ = reply.send(());
            }
            SessionMessage::Write { data } => self.handle_write(data),
            SessionMessage::Configure { config } => {
                debug!(?config, "configuration replaced");
                self.config = config;
            }
            SessionMessage::ReadEnded { error } => self.handle_read_ended(error).await,
            SessionMessage::RetryTick => self.handle_retry_tick().await,
        }

        Ok(())
    }

    async fn shutdown(&mut self) {
        // Close the port when the facade goes away
        if self.state().can_close() {
            let _ = self.transition(ConnectionState::Closing);
            self.teardown_connection().await;
            let _ = self.transition(ConnectionState::Closed);
        }
    }
}
