//! Scripted transport for tests and emulation
//!
//! The mock replays a queue of device bytes and records everything the host
//! writes. A `MockHandle` shares the same state so a test can keep feeding
//! and inspecting the link after the transport has been boxed away.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::trace;

use crate::{Transport, error::*};

/// One scripted read outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Incoming {
    Byte(u8),
    /// A read that returns nothing, as when the read timeout expires
    Idle,
}

#[derive(Debug, Default)]
struct MockState {
    incoming: VecDeque<Incoming>,
    written: Vec<u8>,
    open: bool,
    /// Keep returning empty reads instead of failing once the script runs out
    stall_when_drained: bool,
}

/// In-memory transport replaying scripted device output
///
/// # Examples
///
/// ```
/// use as608_transport::{MockTransport, Transport};
///
/// #[tokio::main]
/// async fn main() -> as608_transport::Result<()> {
///     let (mut transport, handle) = MockTransport::new();
///     handle.push(&[0x00, 0x01]);
///
///     transport.open().await?;
///     transport.write(&[0x01]).await?;
///     assert_eq!(transport.read(8).await?.as_ref(), &[0x00, 0x01]);
///     assert_eq!(handle.written(), vec![0x01]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    name: String,
}

/// Control side of a `MockTransport`
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock that reports a closed connection once its script is drained
    pub fn new() -> (Self, MockHandle) {
        Self::with_name("mock")
    }

    /// Create a mock with a custom port name
    pub fn with_name(name: impl Into<String>) -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));

        let transport = Self {
            state: Arc::clone(&state),
            name: name.into(),
        };

        (transport, MockHandle { state })
    }
}

impl MockHandle {
    /// Queue bytes the device will send
    pub fn push(&self, bytes: &[u8]) {
        let mut state = self.state.lock();
        state.incoming.extend(bytes.iter().copied().map(Incoming::Byte));
    }

    /// Queue `count` reads that time out without data
    pub fn push_idle(&self, count: usize) {
        let mut state = self.state.lock();
        state
            .incoming
            .extend(std::iter::repeat_n(Incoming::Idle, count));
    }

    /// Return empty reads forever once the script is drained
    pub fn stall_when_drained(&self) {
        self.state.lock().stall_when_drained = true;
    }

    /// Everything the host has written so far
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().written.clone()
    }

    /// Scripted items not yet consumed
    pub fn pending(&self) -> usize {
        self.state.lock().incoming.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.open {
            return Err(Error::AlreadyConnected);
        }
        state.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotConnected);
        }
        trace!("Mock write: {}", hex::encode(data));
        state.written.extend_from_slice(data);
        Ok(())
    }

    async fn read(&mut self, max: usize) -> Result<BytesMut> {
        let read = {
            let mut state = self.state.lock();
            if !state.open {
                return Err(Error::NotConnected);
            }

            let front = state.incoming.front().copied();
            match front {
                None if state.stall_when_drained => Some(BytesMut::new()),
                None => None,
                Some(Incoming::Idle) => {
                    state.incoming.pop_front();
                    Some(BytesMut::new())
                }
                Some(Incoming::Byte(_)) => {
                    let mut buf = BytesMut::with_capacity(max);
                    while buf.len() < max {
                        match state.incoming.front().copied() {
                            Some(Incoming::Byte(b)) => {
                                buf.extend_from_slice(&[b]);
                                state.incoming.pop_front();
                            }
                            _ => break,
                        }
                    }
                    Some(buf)
                }
            }
        };

        match read {
            Some(buf) => {
                if buf.is_empty() {
                    // Let timers and other tasks progress during idle reads
                    tokio::task::yield_now().await;
                }
                Ok(buf)
            }
            None => Err(Error::ConnectionClosed),
        }
    }

    async fn bytes_available(&mut self) -> Result<usize> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotConnected);
        }

        // An idle item models one poll that found nothing
        if state.incoming.front() == Some(&Incoming::Idle) {
            state.incoming.pop_front();
            return Ok(0);
        }

        let available = state
            .incoming
            .iter()
            .take_while(|item| matches!(item, Incoming::Byte(_)))
            .count();

        if available == 0 && state.incoming.is_empty() && !state.stall_when_drained {
            return Err(Error::ConnectionClosed);
        }
        Ok(available)
    }

    async fn clear(&mut self) -> Result<()> {
        // Scripted output models bytes the device sends after the command, so
        // there is nothing stale to discard.
        Ok(())
    }

    fn port_name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_requires_open() {
        let (mut transport, _handle) = MockTransport::new();
        assert!(matches!(transport.read(1).await, Err(Error::NotConnected)));
        assert!(matches!(transport.write(&[1]).await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_mock_reads_in_order() {
        let (mut transport, handle) = MockTransport::new();
        handle.push(&[1, 2, 3]);
        transport.open().await.unwrap();

        assert_eq!(transport.read(2).await.unwrap().as_ref(), &[1, 2]);
        assert_eq!(transport.bytes_available().await.unwrap(), 1);
        assert_eq!(transport.read(2).await.unwrap().as_ref(), &[3]);
    }

    #[tokio::test]
    async fn test_mock_idle_reads() {
        let (mut transport, handle) = MockTransport::new();
        handle.push_idle(2);
        handle.push(&[7]);
        transport.open().await.unwrap();

        assert!(transport.read(1).await.unwrap().is_empty());
        assert_eq!(transport.bytes_available().await.unwrap(), 0);
        assert_eq!(transport.bytes_available().await.unwrap(), 1);
        assert_eq!(transport.read(1).await.unwrap().as_ref(), &[7]);
    }

    #[tokio::test]
    async fn test_mock_drained() {
        let (mut transport, handle) = MockTransport::new();
        transport.open().await.unwrap();
        assert!(matches!(transport.read(1).await, Err(Error::ConnectionClosed)));

        handle.stall_when_drained();
        assert!(transport.read(1).await.unwrap().is_empty());
        assert_eq!(transport.bytes_available().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_records_writes() {
        let (mut transport, handle) = MockTransport::with_name("bench");
        transport.open().await.unwrap();
        transport.write(&[0x0E, 0x04, 0x06]).await.unwrap();

        assert_eq!(handle.written(), vec![0x0E, 0x04, 0x06]);
        assert_eq!(transport.port_name(), "bench");
        assert!(matches!(transport.open().await, Err(Error::AlreadyConnected)));
    }
}
