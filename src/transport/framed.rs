//! Length-prefixed message framing over a blocking byte stream.

use std::io::{ErrorKind, Read, Write};
use std::time::Instant;

use bytes::{BufMut, BytesMut};
use tracing::{debug, info, instrument, trace, warn};

use super::TransportConfig;
use super::metrics::{MessageDirection, Metrics, MetricsSnapshot};
use crate::protocol::{Error, FrameHeader, HEADER_SIZE, MessageType, Result};

/// One received frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    text: String,
}

impl Frame {
    /// Create a frame from a type and text payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the text length does not fit the
    /// header's `i32` length field.
    pub fn new(msg_type: MessageType, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let len = i32::try_from(text.len()).map_err(|_| Error::PayloadTooLarge {
            size: text.len(),
            max: i32::MAX as usize,
        })?;
        Ok(Self {
            header: FrameHeader::new(msg_type.as_i32(), len),
            text,
        })
    }

    /// Get message type, if known
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        self.header.message_type()
    }

    /// Get raw type code
    #[must_use]
    pub fn code(&self) -> i32 {
        self.header.msg_type_code()
    }

    /// Get payload text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Take the payload text
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Frames text messages over one exclusively owned stream.
///
/// Reads and writes alternate on the owning thread; partial reads are
/// accumulated until the exact frame length arrives.
///
/// A failure that may leave the stream mid-frame (see [`Error::is_fatal`])
/// takes the transport out of sync; every later send and receive then
/// fails with [`Error::OutOfSync`].
#[derive(Debug)]
pub struct MessageTransport<S> {
    stream: S,
    config: TransportConfig,
    metrics: Metrics,
    in_sync: bool,
}

impl<S: Read + Write> MessageTransport<S> {
    /// Wrap an already connected stream.
    pub fn new(stream: S, config: TransportConfig) -> Self {
        Self {
            stream,
            config,
            metrics: Metrics::default(),
            in_sync: true,
        }
    }

    /// Send one frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the peer stopped accepting bytes,
    /// [`Error::PayloadTooLarge`] if `text` exceeds the configured maximum.
    #[instrument(level = "trace", skip(self, text), fields(len = text.len()))]
    pub fn send(&mut self, msg_type: MessageType, text: &str) -> Result<()> {
        self.ensure_in_sync()?;

        // nothing is written for an oversized payload, so the stream stays usable
        let max = self.config.max_payload_len.min(i32::MAX as usize);
        if text.len() > max {
            self.metrics.record_error();
            return Err(Error::PayloadTooLarge {
                size: text.len(),
                max,
            });
        }

        let started = Instant::now();
        let result = self.write_frame(msg_type, text);
        match &result {
            Ok(()) => self.metrics.record_message(
                MessageDirection::Sent,
                Some(msg_type),
                text.len(),
                started.elapsed(),
            ),
            Err(err) => self.record_failure(err),
        }
        result
    }

    fn write_frame(&mut self, msg_type: MessageType, text: &str) -> Result<()> {
        let payload = text.as_bytes();
        // bounded by i32::MAX in send
        let header = FrameHeader::new(msg_type.as_i32(), payload.len() as i32);
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        header.write_to(&mut buf);
        buf.put_slice(payload);

        self.stream
            .write_all(&buf)
            .map_err(|e| Error::from_io(e, "sending frame"))?;
        self.stream
            .flush()
            .map_err(|e| Error::from_io(e, "sending frame"))?;
        trace!(%msg_type, "frame sent");
        Ok(())
    }

    /// Receive one frame, blocking until it is complete.
    ///
    /// INFO frames are logged and still returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the stream ends mid-frame,
    /// [`Error::InvalidLength`]/[`Error::PayloadTooLarge`] for a bad header,
    /// [`Error::InvalidUtf8`] for a non-text payload (the frame is consumed,
    /// so the stream stays in sync).
    #[instrument(level = "trace", skip(self))]
    pub fn receive(&mut self) -> Result<Frame> {
        self.ensure_in_sync()?;

        let started = Instant::now();
        let result = self.read_frame();
        match &result {
            Ok(frame) => self.metrics.record_message(
                MessageDirection::Received,
                frame.message_type(),
                frame.text.len(),
                started.elapsed(),
            ),
            Err(err) => self.record_failure(err),
        }
        result
    }

    fn ensure_in_sync(&self) -> Result<()> {
        if self.in_sync {
            Ok(())
        } else {
            Err(Error::OutOfSync)
        }
    }

    fn record_failure(&mut self, err: &Error) {
        self.metrics.record_error();
        if err.is_fatal() {
            warn!(error = %err, "onelab stream lost frame alignment");
            self.in_sync = false;
        }
    }

    /// Whether the stream still sits on a frame boundary
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.in_sync
    }

    fn read_frame(&mut self) -> Result<Frame> {
        let mut raw = [0u8; HEADER_SIZE];
        self.read_full(&mut raw, "reading frame header")?;
        let header = FrameHeader::from_bytes(raw);
        let len = header.validate(self.config.max_payload_len)?;

        let mut payload = vec![0u8; len];
        self.read_full(&mut payload, "reading frame payload")?;
        let text = String::from_utf8(payload)?;

        match header.message_type() {
            Some(MessageType::Info) => info!(text = %text, "onelab info"),
            Some(msg_type) => trace!(%msg_type, len, "frame received"),
            None => debug!(code = header.msg_type_code(), len, "frame with unknown type"),
        }

        Ok(Frame { header, text })
    }

    /// Fill `buf` completely, looping over short reads.
    fn read_full(&mut self, buf: &mut [u8], during: &'static str) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::ConnectionClosed { during }),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::from_io(e, during)),
            }
        }
        Ok(())
    }

    /// Counters for this transport
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.totals()
    }

    /// Borrow the underlying stream
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Release the underlying stream
    #[must_use]
    pub fn into_inner(self) -> S {
        self.stream
    }
}
