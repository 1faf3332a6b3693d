use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The external party declined or cancelled a permission request.
    #[error("Permission request rejected")]
    Rejected,
    #[error("Failed to open device: {0}")]
    OpenFailed(String),
    #[error("Device not open")]
    NotOpen,
    #[error("IO error: {0}")]
    Io(String),
}

/// USB identification codes of a granted device, as far as the transport
/// can report them. Either field may be absent for virtual ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

impl DeviceInfo {
    pub fn new(vid: u16, pid: u16) -> Self {
        Self {
            vid: Some(vid),
            pid: Some(pid),
        }
    }
}

/// The user-mediated device-access layer (WebSerial-style).
///
/// The transport owns discovery and the permission UI; the engine only ever
/// sees the list of currently granted devices and a way to ask for a new
/// grant. Both operations can fail asynchronously at any point; a device
/// in the permitted list is not guaranteed to be reachable.
#[async_trait]
pub trait Transport: Send + Sync {
    type Device: DeviceHandle;

    /// Enumerate currently permitted devices. Zero or one in practice.
    async fn permitted_devices(&self) -> Result<Vec<Self::Device>, TransportError>;

    /// Ask the external party to grant access to a new device.
    ///
    /// Returns [`TransportError::Rejected`] when the request is declined or
    /// cancelled, a normal outcome rather than a transport fault.
    async fn request_device(&self) -> Result<Self::Device, TransportError>;
}

/// An opaque reference to a granted device.
///
/// Cloning the handle does not duplicate the underlying grant; all clones
/// refer to the same device.
#[async_trait]
pub trait DeviceHandle: Clone + Send + Sync + 'static {
    type Reader: ChunkReader;
    type Writer: ChunkWriter;

    /// Vendor/product identification for identity resolution.
    fn info(&self) -> DeviceInfo;

    /// Open at the given baud rate, yielding read and write capabilities.
    async fn open(&self, baud: u32) -> Result<(Self::Reader, Self::Writer), TransportError>;

    /// Close the underlying device. Capabilities must be released first.
    async fn close(&self) -> Result<(), TransportError>;

    /// Revoke this device's permission grant.
    async fn forget(&self) -> Result<(), TransportError>;
}

/// Read capability: pull the next chunk off the stream.
#[async_trait]
pub trait ChunkReader: Send + 'static {
    /// Next chunk of bytes, or `Ok(None)` on a clean end-of-stream.
    ///
    /// Dropping the returned future cancels the read cooperatively.
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Write capability. Failures are reported but individual writes carry no
/// delivery guarantee.
#[async_trait]
pub trait ChunkWriter: Send + 'static {
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_serialization() {
        let info = DeviceInfo::new(0x1a86, 0x7523);
        let json = serde_json::to_string(&info).unwrap();
        let restored: DeviceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, info);
    }

    #[test]
    fn test_device_info_default_has_no_ids() {
        let info = DeviceInfo::default();
        assert_eq!(info.vid, None);
        assert_eq!(info.pid, None);
    }
}
