//! # Transport Mock
//!
//! Scripted in-memory transport for exercising the session engine without
//! hardware. Tests drive the device side: feed read chunks, inject read
//! errors or end-of-stream, script open failures, inspect recorded writes.
//!
//! Reads block until a step is fed, so an idle mock behaves like a quiet
//! serial port rather than a closed one.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

use async_trait::async_trait;
use core_types::{
    ChunkReader, ChunkWriter, DeviceHandle, DeviceInfo, Transport, TransportError,
};
use futures::stream::StreamExt;
use futures_channel::mpsc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
enum ReadStep {
    Data(Vec<u8>),
    Error(String),
    Eos,
}

#[derive(Debug)]
struct DeviceState {
    info: DeviceInfo,
    /// Feed end of the live reader, present while open
    feed_tx: Mutex<Option<mpsc::UnboundedSender<ReadStep>>>,
    /// Steps scripted before the device was opened
    pending: Mutex<VecDeque<ReadStep>>,
    written: Mutex<Vec<Vec<u8>>>,
    open_failures: Mutex<VecDeque<String>>,
    open_count: AtomicUsize,
    hang_on_close: AtomicBool,
    write_error: Mutex<Option<String>>,
    forgotten: AtomicBool,
}

/// A scripted serial device
#[derive(Debug, Clone)]
pub struct MockDevice {
    state: Arc<DeviceState>,
}

impl MockDevice {
    pub fn new(vid: u16, pid: u16) -> Self {
        Self::with_info(DeviceInfo::new(vid, pid))
    }

    pub fn with_info(info: DeviceInfo) -> Self {
        Self {
            state: Arc::new(DeviceState {
                info,
                feed_tx: Mutex::new(None),
                pending: Mutex::new(VecDeque::new()),
                written: Mutex::new(Vec::new()),
                open_failures: Mutex::new(VecDeque::new()),
                open_count: AtomicUsize::new(0),
                hang_on_close: AtomicBool::new(false),
                write_error: Mutex::new(None),
                forgotten: AtomicBool::new(false),
            }),
        }
    }

    fn feed(&self, step: ReadStep) {
        if let Ok(guard) = self.state.feed_tx.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.unbounded_send(step);
                return;
            }
        }
        if let Ok(mut pending) = self.state.pending.lock() {
            pending.push_back(step);
        }
    }

    /// Make bytes arrive on the next read
    pub fn push_chunk(&self, data: &[u8]) {
        self.feed(ReadStep::Data(data.to_vec()));
    }

    /// Make the next read fail
    pub fn push_read_error(&self, reason: &str) {
        self.feed(ReadStep::Error(reason.to_string()));
    }

    /// Make the stream end cleanly on the next read
    pub fn push_eos(&self) {
        self.feed(ReadStep::Eos);
    }

    /// Script the next `reasons.len()` opens to fail, in order
    pub fn fail_next_opens(&self, reasons: &[&str]) {
        if let Ok(mut failures) = self.state.open_failures.lock() {
            failures.extend(reasons.iter().map(|r| r.to_string()));
        }
    }

    /// Every subsequent write fails with the given reason
    pub fn fail_writes(&self, reason: &str) {
        if let Ok(mut guard) = self.state.write_error.lock() {
            *guard = Some(reason.to_string());
        }
    }

    /// `close()` never resolves, simulating an uncooperative platform
    pub fn hang_on_close(&self) {
        self.state.hang_on_close.store(true, Ordering::Release);
    }

    /// How many times `open` succeeded
    pub fn open_count(&self) -> usize {
        self.state.open_count.load(Ordering::Acquire)
    }

    /// Everything written so far, one entry per write call
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state
            .written
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// All written bytes flattened into one stream
    pub fn written_bytes(&self) -> Vec<u8> {
        self.written().concat()
    }

    pub fn is_forgotten(&self) -> bool {
        self.state.forgotten.load(Ordering::Acquire)
    }
}

#[async_trait]
impl DeviceHandle for MockDevice {
    type Reader = MockReader;
    type Writer = MockWriter;

    fn info(&self) -> DeviceInfo {
        self.state.info
    }

    async fn open(&self, _baud: u32) -> Result<(Self::Reader, Self::Writer), TransportError> {
        if let Ok(mut failures) = self.state.open_failures.lock() {
            if let Some(reason) = failures.pop_front() {
                return Err(TransportError::OpenFailed(reason));
            }
        }

        let (feed_tx, feed_rx) = mpsc::unbounded();

        // Replay steps scripted before open
        if let Ok(mut pending) = self.state.pending.lock() {
            for step in pending.drain(..) {
                let _ = feed_tx.unbounded_send(step);
            }
        }

        if let Ok(mut guard) = self.state.feed_tx.lock() {
            *guard = Some(feed_tx);
        }
        self.state.open_count.fetch_add(1, Ordering::AcqRel);

        Ok((
            MockReader { feed_rx },
            MockWriter {
                state: self.state.clone(),
            },
        ))
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.state.hang_on_close.load(Ordering::Acquire) {
            futures::future::pending::<()>().await;
        }
        if let Ok(mut guard) = self.state.feed_tx.lock() {
            *guard = None;
        }
        Ok(())
    }

    async fn forget(&self) -> Result<(), TransportError> {
        self.state.forgotten.store(true, Ordering::Release);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockReader {
    feed_rx: mpsc::UnboundedReceiver<ReadStep>,
}

#[async_trait]
impl ChunkReader for MockReader {
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.feed_rx.next().await {
            Some(ReadStep::Data(data)) => Ok(Some(data)),
            Some(ReadStep::Error(reason)) => Err(TransportError::Io(reason)),
            // Feed dropped (device closed) reads like end-of-stream
            Some(ReadStep::Eos) | None => Ok(None),
        }
    }
}

#[derive(Debug)]
pub struct MockWriter {
    state: Arc<DeviceState>,
}

#[async_trait]
impl ChunkWriter for MockWriter {
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if let Ok(guard) = self.state.write_error.lock() {
            if let Some(reason) = guard.as_ref() {
                return Err(TransportError::Io(reason.clone()));
            }
        }
        if let Ok(mut written) = self.state.written.lock() {
            written.push(data.to_vec());
        }
        Ok(())
    }
}

struct TransportState {
    permitted: Mutex<Vec<MockDevice>>,
    grants: Mutex<VecDeque<MockDevice>>,
}

/// A scripted transport
///
/// `request_device` hands out pre-scripted grants in order and rejects once
/// they run out, mirroring a user dismissing the picker. A granted device
/// joins the permission list, where it stays until forgotten.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<TransportState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(TransportState {
                permitted: Mutex::new(Vec::new()),
                grants: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Seed a device into the permission list (granted in a previous run)
    pub fn permit(&self, device: MockDevice) {
        if let Ok(mut permitted) = self.state.permitted.lock() {
            permitted.push(device);
        }
    }

    /// Script the outcome of the next `request_device` call
    pub fn grant_on_request(&self, device: MockDevice) {
        if let Ok(mut grants) = self.state.grants.lock() {
            grants.push_back(device);
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Device = MockDevice;

    async fn permitted_devices(&self) -> Result<Vec<Self::Device>, TransportError> {
        let devices = self
            .state
            .permitted
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        Ok(devices
            .into_iter()
            .filter(|device| !device.is_forgotten())
            .collect())
    }

    async fn request_device(&self) -> Result<Self::Device, TransportError> {
        let granted = self
            .state
            .grants
            .lock()
            .ok()
            .and_then(|mut grants| grants.pop_front());

        match granted {
            Some(device) => {
                self.permit(device.clone());
                Ok(device)
            }
            None => Err(TransportError::Rejected),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_reads_in_order() {
        let device = MockDevice::new(0x1a86, 0x7523);
        device.push_chunk(b"one");
        device.push_chunk(b"two");
        device.push_eos();

        let (mut reader, _writer) = device.open(115200).await.unwrap();
        assert_eq!(reader.read_chunk().await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(reader.read_chunk().await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(reader.read_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_chunks_fed_after_open() {
        let device = MockDevice::new(0x1a86, 0x7523);
        let (mut reader, _writer) = device.open(115200).await.unwrap();

        device.push_chunk(b"late");
        assert_eq!(reader.read_chunk().await.unwrap(), Some(b"late".to_vec()));
    }

    #[tokio::test]
    async fn test_writes_recorded() {
        let device = MockDevice::new(0x1a86, 0x7523);
        let (_reader, mut writer) = device.open(115200).await.unwrap();

        writer.write(b"hello").await.unwrap();
        writer.write(b" world").await.unwrap();
        assert_eq!(device.written_bytes(), b"hello world");
    }

    #[tokio::test]
    async fn test_scripted_open_failure() {
        let device = MockDevice::new(0x1a86, 0x7523);
        device.fail_next_opens(&["device busy"]);

        let err = device.open(115200).await.unwrap_err();
        assert!(matches!(err, TransportError::OpenFailed(_)));

        // The next open succeeds
        assert!(device.open(115200).await.is_ok());
        assert_eq!(device.open_count(), 1);
    }

    #[tokio::test]
    async fn test_request_rejects_without_grant() {
        let transport = MockTransport::new();
        let err = transport.request_device().await.unwrap_err();
        assert!(matches!(err, TransportError::Rejected));
    }

    #[tokio::test]
    async fn test_granted_device_joins_permission_list() {
        let transport = MockTransport::new();
        transport.grant_on_request(MockDevice::new(0x0403, 0x6001));

        let device = transport.request_device().await.unwrap();
        let permitted = transport.permitted_devices().await.unwrap();
        assert_eq!(permitted.len(), 1);

        device.forget().await.unwrap();
        assert!(transport.permitted_devices().await.unwrap().is_empty());
    }
}
