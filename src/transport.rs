//! Transport contract and thin receive-only adapters (§4.7, §6.2).
//!
//! Grounded on the reference crate's `mbus::serial::MBusDeviceHandle` and
//! `mbus::tcp::MBusTcpHandle` connect/read/close shape, simplified here to
//! the sniffer's receive-only contract (no write path, no addressing
//! handshake) and ported onto `tokio-serial`/`tokio::net::TcpStream`.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;

use crate::error::NasaError;

/// Lifecycle events a transport reports to its driver (§6.2).
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Error(String),
    Reconnecting { delay: std::time::Duration },
}

/// The abstract transport contract (§6.2): connect, read a chunk, close.
/// Implementations are receive-only — the sniffer never writes to the bus.
#[async_trait]
pub trait Transport: Send {
    async fn connect(&mut self) -> Result<(), NasaError>;
    async fn read(&mut self) -> Result<Bytes, NasaError>;
    async fn close(&mut self) -> Result<(), NasaError>;
}

const READ_CHUNK_SIZE: usize = 4096;

/// A serial transport over `tokio-serial` (§4.7).
pub struct SerialTransport {
    port_path: String,
    baud_rate: u32,
    port: Option<tokio_serial::SerialStream>,
}

impl SerialTransport {
    pub fn new(port_path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_path: port_path.into(),
            baud_rate,
            port: None,
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<(), NasaError> {
        use tokio_serial::SerialPortBuilderExt;
        let port = tokio_serial::new(&self.port_path, self.baud_rate)
            .open_native_async()
            .map_err(|e| NasaError::Transport(format!("serial open {}: {e}", self.port_path)))?;
        self.port = Some(port);
        Ok(())
    }

    async fn read(&mut self) -> Result<Bytes, NasaError> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| NasaError::Transport("serial port not connected".to_string()))?;
        let mut buf = BytesMut::zeroed(READ_CHUNK_SIZE);
        let n = port
            .read(&mut buf)
            .await
            .map_err(|e| NasaError::Transport(format!("serial read: {e}")))?;
        buf.truncate(n);
        Ok(buf.freeze())
    }

    async fn close(&mut self) -> Result<(), NasaError> {
        self.port = None;
        Ok(())
    }
}

/// A TCP transport over `tokio::net::TcpStream`, for bus-to-IP gateways (§4.7).
pub struct TcpTransport {
    host: String,
    port: u16,
    stream: Option<tokio::net::TcpStream>,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<(), NasaError> {
        let stream = tokio::net::TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| NasaError::Transport(format!("tcp connect {}:{}: {e}", self.host, self.port)))?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn read(&mut self) -> Result<Bytes, NasaError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| NasaError::Transport("tcp stream not connected".to_string()))?;
        let mut buf = BytesMut::zeroed(READ_CHUNK_SIZE);
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| NasaError::Transport(format!("tcp read: {e}")))?;
        if n == 0 {
            return Err(NasaError::Transport("tcp connection closed by peer".to_string()));
        }
        buf.truncate(n);
        Ok(buf.freeze())
    }

    async fn close(&mut self) -> Result<(), NasaError> {
        self.stream = None;
        Ok(())
    }
}

/// Bounded exponential backoff around `transport.connect()`, matching the
/// reference crate's auto-baud-detection retry loop but simplified to a
/// single fixed baud/address (§4.7).
pub async fn connect_with_backoff(
    transport: &mut dyn Transport,
    max_attempts: u32,
) -> Result<(), NasaError> {
    let mut delay = std::time::Duration::from_millis(250);
    let mut last_err = None;

    for attempt in 1..=max_attempts {
        match transport.connect().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(attempt, %e, "transport connect failed, retrying");
                last_err = Some(e);
                if attempt < max_attempts {
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(std::time::Duration::from_secs(30));
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| NasaError::Transport("connect failed".to_string())))
}
