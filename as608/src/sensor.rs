//! Protocol engine
//!
//! Drives the sensor bridge through its handshake, single-shot commands and
//! the chunked image upload. Every public operation resolves only once the
//! device reaches a terminal state for it, or the link fails.

use std::time::Duration;

use bytes::BytesMut;
use image::GrayImage;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use as608_core::{Command, DeviceState, FrameStep, ImageTransfer, RawImageBuffer, Session};
use as608_matcher::FeaturePipeline;
use as608_transport::{SerialTransport, Transport};
use as608_types::{DeviceParameters, FingerprintRecord};

use crate::config::SensorConfig;
use crate::error::{Error, Result};
use crate::event::{EventSink, SensorEvent};

/// AS608 fingerprint sensor
///
/// High-level interface over any [`Transport`]. Methods take `&mut self`, so
/// only one command can be outstanding per sensor.
///
/// # Examples
///
/// ```no_run
/// use as608::{Sensor, SensorConfig};
///
/// #[tokio::main]
/// async fn main() -> as608::Result<()> {
///     let mut sensor = Sensor::serial(SensorConfig::default());
///
///     sensor.connect().await?;
///     let image = sensor.capture_image().await?;
///     println!("Captured {}x{}", image.width(), image.height());
///
///     sensor.close().await?;
///     Ok(())
/// }
/// ```
pub struct Sensor {
    transport: Box<dyn Transport>,
    session: Session,
    config: SensorConfig,
    events: EventSink,
}

impl Sensor {
    /// Create a sensor over an existing transport
    pub fn new(transport: Box<dyn Transport>, config: SensorConfig) -> Self {
        Self {
            transport,
            session: Session::new(),
            config,
            events: EventSink::default(),
        }
    }

    /// Create a sensor on the serial port named in `config`
    pub fn serial(config: SensorConfig) -> Self {
        let transport = SerialTransport::new(config.port_name.clone(), config.baud_rate)
            .with_read_timeout(config.read_timeout());
        Self::new(Box::new(transport), config)
    }

    /// Send events to an existing channel
    pub fn with_events(mut self, tx: UnboundedSender<SensorEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    /// Replace the event channel with a fresh one and return its receiver
    pub fn subscribe(&mut self) -> UnboundedReceiver<SensorEvent> {
        let (sink, rx) = EventSink::channel();
        self.events = sink;
        rx
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn port_name(&self) -> String {
        self.transport.port_name()
    }

    /// Check if the link is open and the handshake completed
    pub fn is_ready(&self) -> bool {
        self.transport.is_open() && self.session.is_ready()
    }

    /// Open the transport without running the handshake
    pub async fn open(&mut self) -> Result<()> {
        info!("Opening {}...", self.transport.port_name());
        self.transport.open().await?;
        Ok(())
    }

    /// Open the transport if needed, then wait for the sensor to come up
    pub async fn connect(&mut self) -> Result<()> {
        if !self.transport.is_open() {
            self.open().await?;
        }
        self.initialize().await
    }

    /// Close the transport and reset the session
    pub async fn close(&mut self) -> Result<()> {
        if !self.transport.is_open() {
            self.session.close();
            return Ok(());
        }

        info!("Closing {}...", self.transport.port_name());
        self.transport.close().await?;
        self.session.close();
        Ok(())
    }

    /// Wait for the initialization handshake
    ///
    /// Status bytes other than the two terminal ones are skipped, and empty
    /// reads are retried. Only `command_deadline_ms` bounds the wait.
    ///
    /// # Errors
    ///
    /// - `DeviceInit` if the sensor reports `InitializationFailed`
    /// - `UnknownState` for bytes outside the state table
    /// - transport errors
    pub async fn initialize(&mut self) -> Result<()> {
        self.session.begin_initialization()?;
        info!("Waiting for sensor initialization...");

        let result = with_deadline(self.config.command_deadline(), self.await_initialization()).await;

        match result {
            Ok(()) => {
                self.session.complete_initialization()?;
                info!("Sensor initialized");
                Ok(())
            }
            Err(e) => {
                self.session.abandon();
                warn!("Initialization failed: {}", e);
                self.events.emit(SensorEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Capture a fingerprint into the sensor's image buffer
    ///
    /// `NoFingerDetected` is reported as [`SensorEvent::FingerRequested`] and
    /// the wait continues until the device reaches a terminal state.
    ///
    /// # Errors
    ///
    /// `CommandFailed` for any terminal state other than `CommandSuccess`.
    pub async fn capture_fingerprint_image(&mut self) -> Result<()> {
        self.begin(Command::GetImage)?;
        let result = with_deadline(self.config.command_deadline(), self.await_capture()).await;
        self.conclude(Command::GetImage, result)
    }

    /// Upload the captured image as packed 4-bit pixels
    ///
    /// # Errors
    ///
    /// - `ProtocolDesync` when the frame alternation is broken
    /// - `ImageSizeMismatch` when the total differs from `expected`
    /// - `DataTimeout` when a chunk payload does not arrive in time
    pub async fn download_fingerprint_image(&mut self, expected: usize) -> Result<RawImageBuffer> {
        self.begin(Command::UpImage)?;
        let result =
            with_deadline(self.config.command_deadline(), self.await_download(expected)).await;
        self.conclude(Command::UpImage, result)
    }

    /// Write one sensor system register
    pub async fn write_register(&mut self, address: u8, value: u8) -> Result<()> {
        self.begin(Command::WriteRegister)?;
        let result = with_deadline(
            self.config.command_deadline(),
            self.await_register_write(address, value),
        )
        .await;
        self.conclude(Command::WriteRegister, result)
    }

    /// Ask the bridge to print the sensor parameter block and read it
    ///
    /// Waits until at least as many bytes as lines are buffered, then reads
    /// the fixed number of lines. A line cut short by a read timeout is kept
    /// as received.
    pub async fn read_device_parameters(&mut self) -> Result<DeviceParameters> {
        self.begin(Command::PrintDeviceParameters)?;
        let result = with_deadline(self.config.command_deadline(), self.await_parameters()).await;
        self.conclude(Command::PrintDeviceParameters, result)
    }

    /// Capture, upload and decode one image with the configured geometry
    pub async fn capture_image(&mut self) -> Result<GrayImage> {
        self.capture_fingerprint_image().await?;

        let expected = self.config.expected_image_bytes();
        let raw = self.download_fingerprint_image(expected).await?;
        let image = raw.into_image(self.config.image_width, self.config.image_height)?;

        debug!("Decoded {}x{} image", image.width(), image.height());
        Ok(image)
    }

    /// Capture an image and run it through `pipeline` into a record
    pub async fn capture_record<P>(&mut self, pipeline: &P) -> Result<FingerprintRecord>
    where
        P: FeaturePipeline + ?Sized,
    {
        let image = self.capture_image().await?;
        Ok(as608_matcher::build_record(image, pipeline)?)
    }

    // Helper methods

    fn begin(&self, command: Command) -> Result<()> {
        self.session.begin(command)?;
        debug!("Issuing {}", command);
        Ok(())
    }

    fn conclude<T>(&self, command: Command, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => {
                self.session.finish();
                debug!("{} complete", command);
                self.events.emit(SensorEvent::Completed(command));
            }
            Err(e) if e.requires_reconnect() => {
                self.session.abandon();
                warn!("{} failed, abandoning session: {}", command, e);
                self.events.emit(SensorEvent::Failed(e.to_string()));
            }
            Err(e) => {
                self.session.finish();
                warn!("{} failed: {}", command, e);
                self.events.emit(SensorEvent::Failed(e.to_string()));
            }
        }
        result
    }

    async fn send(&mut self, command: Command, args: &[u8]) -> Result<()> {
        debug_assert_eq!(args.len(), command.argument_len());

        self.transport.clear().await?;

        let mut frame = Vec::with_capacity(1 + args.len());
        frame.push(u8::from(command));
        frame.extend_from_slice(args);

        trace!("Sending: {:02X?}", frame);
        self.transport.write(&frame).await?;
        Ok(())
    }

    /// Next byte from the link, retrying empty reads
    async fn next_byte(&mut self) -> Result<u8> {
        loop {
            let buf = self.transport.read(1).await?;
            if let Some(&byte) = buf.first() {
                return Ok(byte);
            }
        }
    }

    /// Next framing status byte, reported raw so the transfer can judge it
    async fn next_frame_status(&mut self) -> Result<u8> {
        let byte = self.next_byte().await?;
        if let Ok(state) = DeviceState::try_from(byte) {
            trace!("Frame status: {}", state);
            self.events.emit(SensorEvent::StatusChanged(state));
        }
        Ok(byte)
    }

    async fn next_state(&mut self) -> Result<DeviceState> {
        let byte = self.next_byte().await?;
        let state = DeviceState::try_from(byte)?;
        trace!("Status: {}", state);
        self.events.emit(SensorEvent::StatusChanged(state));
        Ok(state)
    }

    /// Poll until `needed` bytes are buffered or the data timeout elapses
    async fn wait_for(&mut self, needed: usize) -> Result<()> {
        let timeout = self.config.data_timeout();
        let poll = self.config.poll_interval();
        let start = Instant::now();

        loop {
            let available = self.transport.bytes_available().await?;
            if available >= needed {
                return Ok(());
            }

            let waited = start.elapsed();
            if waited >= timeout {
                return Err(Error::DataTimeout {
                    waited,
                    needed,
                    available,
                });
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Read exactly `len` bytes already known to be buffered
    async fn read_exact(&mut self, len: usize) -> Result<BytesMut> {
        let mut payload = BytesMut::with_capacity(len);

        while payload.len() < len {
            let chunk = self.transport.read(len - payload.len()).await?;
            if chunk.is_empty() {
                return Err(as608_transport::Error::ReadTimeout.into());
            }
            payload.extend_from_slice(&chunk);
        }

        Ok(payload)
    }

    /// Bytes up to and including `\n`, or up to the first empty read
    async fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();

        loop {
            let buf = self.transport.read(1).await?;
            let Some(&byte) = buf.first() else {
                break;
            };
            line.push(byte);
            if byte == b'\n' {
                break;
            }
        }

        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    async fn await_initialization(&mut self) -> Result<()> {
        loop {
            match self.next_state().await? {
                DeviceState::InitializationComplete => return Ok(()),
                state @ DeviceState::InitializationFailed => {
                    return Err(as608_core::Error::DeviceInit { state }.into());
                }
                DeviceState::Initializing => debug!("Sensor initializing..."),
                other => debug!("Ignoring {} during initialization", other),
            }
        }
    }

    async fn await_capture(&mut self) -> Result<()> {
        self.send(Command::GetImage, &[]).await?;

        loop {
            match self.next_state().await? {
                DeviceState::CommandSuccess => {
                    info!("Fingerprint image captured");
                    return Ok(());
                }
                DeviceState::NoFingerDetected => {
                    debug!("No finger on the sensor, waiting...");
                    self.events.emit(SensorEvent::FingerRequested);
                }
                state => {
                    return Err(as608_core::Error::CommandFailed {
                        command: Command::GetImage,
                        state,
                    }
                    .into());
                }
            }
        }
    }

    async fn await_download(&mut self, expected: usize) -> Result<RawImageBuffer> {
        self.send(Command::UpImage, &[]).await?;

        let mut transfer = ImageTransfer::new(expected);

        loop {
            let status = self.next_frame_status().await?;
            if transfer.begin_frame(status)? == FrameStep::Complete {
                break;
            }

            let len = usize::from(self.next_byte().await?);
            self.wait_for(len).await?;
            let payload = self.read_exact(len).await?;
            transfer.accept_payload(&payload);

            trace!(
                "Chunk {}: {} bytes ({}/{})",
                transfer.chunks(),
                len,
                transfer.received(),
                expected
            );
            self.events.emit(SensorEvent::Progress {
                received: transfer.received(),
                total: expected,
            });

            let end = self.next_frame_status().await?;
            transfer.end_frame(end)?;
        }

        let chunks = transfer.chunks();
        let buffer = transfer.finish()?;
        info!("Image downloaded: {} bytes in {} chunks", buffer.len(), chunks);
        Ok(buffer)
    }

    async fn await_register_write(&mut self, address: u8, value: u8) -> Result<()> {
        self.send(Command::WriteRegister, &[address, value]).await?;

        match self.next_state().await? {
            DeviceState::CommandSuccess => {
                debug!("Register 0x{:02X} set to 0x{:02X}", address, value);
                Ok(())
            }
            state => Err(as608_core::Error::CommandFailed {
                command: Command::WriteRegister,
                state,
            }
            .into()),
        }
    }

    async fn await_parameters(&mut self) -> Result<DeviceParameters> {
        self.send(Command::PrintDeviceParameters, &[]).await?;

        let count = self.config.parameter_lines;
        self.wait_for(count).await?;

        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.read_line().await?);
        }

        let params = DeviceParameters::from_lines(lines);
        debug!("Device parameters: {}", params);
        Ok(params)
    }
}

/// Apply the optional caller-level deadline to a whole operation
async fn with_deadline<T>(
    deadline: Option<Duration>,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, operation)
            .await
            .map_err(|_| Error::Deadline(limit))?,
        None => operation.await,
    }
}
