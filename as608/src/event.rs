//! Sensor event notifications
//!
//! Events are advisory: they are sent on an unbounded channel and dropped
//! silently when nobody listens.

use as608_core::{Command, DeviceState};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Something observable happened on the sensor link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorEvent {
    /// A status byte was received
    StatusChanged(DeviceState),

    /// The sensor is waiting for a finger; prompt the user
    FingerRequested,

    /// Image payload bytes downloaded so far
    Progress { received: usize, total: usize },

    /// A command reached its success state
    Completed(Command),

    /// A command or the handshake failed
    Failed(String),
}

/// Sending half held by the sensor
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<UnboundedSender<SensorEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<SensorEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Fresh channel, returning the sink and its receiver
    pub(crate) fn channel() -> (Self, UnboundedReceiver<SensorEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }

    pub(crate) fn emit(&self, event: SensorEvent) {
        if let Some(tx) = &self.tx {
            // A closed receiver only means nobody is listening any more
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_listener() {
        EventSink::default().emit(SensorEvent::FingerRequested);

        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(SensorEvent::Completed(Command::GetImage));
    }

    #[test]
    fn test_emit_delivers_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(SensorEvent::StatusChanged(DeviceState::NoFingerDetected));
        sink.emit(SensorEvent::FingerRequested);

        assert_eq!(
            rx.try_recv().unwrap(),
            SensorEvent::StatusChanged(DeviceState::NoFingerDetected)
        );
        assert_eq!(rx.try_recv().unwrap(), SensorEvent::FingerRequested);
        assert!(rx.try_recv().is_err());
    }
}
