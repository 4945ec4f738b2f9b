//! Serial transport
//!
//! The bridge enumerates as a USB CDC device (an Arduino running the relay
//! sketch). `serialport` is blocking, so every port call runs on the
//! blocking pool.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use serialport::{ClearBuffer, SerialPort, SerialPortType};
use tracing::{debug, trace, warn};

use crate::{Transport, error::*};

/// Open port shared with the blocking task currently using it
type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

/// Serial transport for the sensor bridge
///
/// A port call whose future is dropped keeps running on the blocking pool
/// until its read timeout; the transport stays open and closable meanwhile.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    read_timeout: Duration,
    port: Option<SharedPort>,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            port: None,
            read_timeout: Duration::from_secs(1),
        }
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Wrap a port that is already open
    pub fn from_port(port_name: impl Into<String>, port: Box<dyn SerialPort>) -> Self {
        let baud_rate = port.baud_rate().unwrap_or(0);
        let read_timeout = port.timeout();
        Self {
            port_name: port_name.into(),
            baud_rate,
            read_timeout,
            port: Some(Arc::new(Mutex::new(port))),
        }
    }

    /// Find the first USB port whose product or manufacturer mentions `hint`
    ///
    /// Ports are checked in name order.
    pub fn discover(hint: &str) -> Result<String> {
        let mut ports = serialport::available_ports()?;
        ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));

        ports
            .into_iter()
            .find(|p| match &p.port_type {
                SerialPortType::UsbPort(info) => [&info.product, &info.manufacturer]
                    .into_iter()
                    .flatten()
                    .any(|s| s.contains(hint)),
                _ => false,
            })
            .map(|p| p.port_name)
            .ok_or_else(|| Error::PortNotFound(hint.to_string()))
    }

    /// Run a blocking port operation off the async executor
    async fn with_port<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SerialPort) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let port = Arc::clone(self.port.as_ref().ok_or(Error::NotConnected)?);

        tokio::task::spawn_blocking(move || {
            let mut port = port.lock();
            op(port.as_mut())
        })
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} at {} baud...", self.port_name, self.baud_rate);

        let port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(self.read_timeout)
            .open()?;

        debug!("Opened {}", self.port_name);

        self.port = Some(Arc::new(Mutex::new(port)));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let Some(port) = self.port.take() else {
            return Ok(());
        };

        // Wait out any call abandoned mid-flight so the device is free to reopen
        tokio::task::spawn_blocking(move || drop(port.lock()))
            .await
            .map_err(|e| Error::Io(io::Error::other(e)))?;

        debug!("Closed {}", self.port_name);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let data = data.to_vec();

        trace!("Sending {} bytes: {}", data.len(), hex::encode(&data[..data.len().min(16)]));

        self.with_port(move |port| {
            port.write_all(&data)?;
            port.flush()?;
            Ok(())
        })
        .await
    }

    async fn read(&mut self, max: usize) -> Result<BytesMut> {
        let buf = self
            .with_port(move |port| {
                let mut buf = vec![0u8; max];
                match port.read(&mut buf) {
                    Ok(n) => {
                        buf.truncate(n);
                        Ok(buf)
                    }
                    Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Vec::new()),
                    Err(e) => Err(Error::Io(e)),
                }
            })
            .await?;

        if !buf.is_empty() {
            trace!("Received {} bytes: {}", buf.len(), hex::encode(&buf[..buf.len().min(16)]));
        }

        Ok(BytesMut::from(&buf[..]))
    }

    async fn bytes_available(&mut self) -> Result<usize> {
        self.with_port(|port| Ok(port.bytes_to_read()? as usize)).await
    }

    async fn clear(&mut self) -> Result<()> {
        self.with_port(|port| Ok(port.clear(ClearBuffer::All)?)).await
    }

    fn port_name(&self) -> String {
        self.port_name.clone()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_open() {
            warn!("Serial transport dropped while still open");
        }
    }
}
