//! Session management for the sensor link
//!
//! A session tracks where the serial link is in its lifecycle:
//! - Handshake progress (waiting for the bridge to bring the sensor up)
//! - The single command currently in flight, if any
//! - Whether a framing error has made the byte stream untrustworthy

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::command::Command;
use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No handshake attempted yet
    Disconnected,

    /// Waiting for `InitializationComplete`
    Initializing,

    /// Idle and ready for the next command
    Ready,

    /// A command has been written and has not reached a terminal state
    Busy(Command),

    /// Stream desynchronized or device failed; must re-initialize
    Abandoned,
}

/// Session manager
///
/// Enforces one in-flight command per link.
/// Thread-safe and can be cloned cheaply (Arc internally).
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Commands that reached a terminal state since the handshake
    completed: AtomicU32,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                completed: AtomicU32::new(0),
                state: parking_lot::RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if the handshake completed and no command is outstanding
    pub fn is_ready(&self) -> bool {
        matches!(self.state(), SessionState::Ready)
    }

    /// Check if a command is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self.state(), SessionState::Busy(_))
    }

    /// Number of commands run to completion in this session
    pub fn completed_commands(&self) -> u32 {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Enter the handshake phase
    pub fn begin_initialization(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        match *state {
            SessionState::Disconnected | SessionState::Abandoned => {
                self.inner.completed.store(0, Ordering::Release);
                *state = SessionState::Initializing;
                Ok(())
            }
            other => Err(Error::InvalidSessionState(format!(
                "Cannot initialize from state: {:?}",
                other
            ))),
        }
    }

    /// Mark the handshake as complete
    pub fn complete_initialization(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Initializing {
            return Err(Error::InvalidSessionState(format!(
                "Cannot complete initialization from state: {:?}",
                *state
            )));
        }

        *state = SessionState::Ready;
        Ok(())
    }

    /// Claim the link for `command`
    ///
    /// Fails if another command is still outstanding or the link is not ready.
    pub fn begin(&self, command: Command) -> Result<()> {
        let mut state = self.inner.state.write();

        match *state {
            SessionState::Ready => {
                *state = SessionState::Busy(command);
                Ok(())
            }
            SessionState::Disconnected | SessionState::Initializing => {
                Err(Error::SessionNotInitialized)
            }
            SessionState::Busy(current) => Err(Error::InvalidSessionState(format!(
                "Cannot issue {} while {} is in flight",
                command, current
            ))),
            SessionState::Abandoned => Err(Error::InvalidSessionState(
                "Session abandoned after a fatal protocol error".into(),
            )),
        }
    }

    /// Release the link after the outstanding command reached a terminal state
    pub fn finish(&self) {
        let mut state = self.inner.state.write();

        if let SessionState::Busy(_) = *state {
            *state = SessionState::Ready;
            self.inner.completed.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Give up on the byte stream
    pub fn abandon(&self) {
        *self.inner.state.write() = SessionState::Abandoned;
    }

    /// Close session
    pub fn close(&self) {
        self.inner.completed.store(0, Ordering::Release);
        *self.inner.state.write() = SessionState::Disconnected;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
