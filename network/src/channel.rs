//! Length-delimited framing over a byte stream.
//!
//! `receive` reads the connection-subtype transport header (and strips
//! it), then the length field, then exactly the declared number of body
//! bytes. `send` assembles header + length + body and writes them as one
//! logical frame. The decoded length is reported through `tracing` as a
//! diagnostic event only — it never changes control flow.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info, warn};

use crate::error::{TransportError, TransportResult};
use crate::framing::FrameLength;

/// Default cap on a declared body length, guarding allocation against a
/// corrupt or hostile length field.
pub const DEFAULT_MAX_FRAME: usize = 16 * 1024 * 1024;

/// Connection-subtype parameters of the frame layout
/// `[header bytes][body-length field][body bytes]`.
#[derive(Clone)]
pub struct ChannelConfig {
    header: Vec<u8>,
    length: Arc<dyn FrameLength>,
    max_frame: usize,
}

impl ChannelConfig {
    pub fn new(length: impl FrameLength + 'static) -> Self {
        Self {
            header: Vec::new(),
            length: Arc::new(length),
            max_frame: DEFAULT_MAX_FRAME,
        }
    }

    /// Fixed transport header emitted before the length field on write and
    /// stripped on read (e.g. a TPDU). Empty by default.
    pub fn header(mut self, header: impl Into<Vec<u8>>) -> Self {
        self.header = header.into();
        self
    }

    /// Caps the declared body length accepted on receive.
    pub fn max_frame(mut self, max_frame: usize) -> Self {
        self.max_frame = max_frame;
        self
    }
}

impl std::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("header_len", &self.header.len())
            .field("length_field", &self.length.size())
            .field("max_frame", &self.max_frame)
            .finish()
    }
}

/// One framed stream connection: exactly one payload per read, one frame
/// per write.
///
/// The channel owns its stream; `&mut self` per call serializes access.
/// There is no implicit retry anywhere — failures go straight back to the
/// caller, and closing the stream fails any in-flight read or write.
pub struct FramedChannel<S> {
    stream: S,
    config: ChannelConfig,
}

impl<S> FramedChannel<S> {
    pub fn new(stream: S, config: ChannelConfig) -> Self {
        Self { stream, config }
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> FramedChannel<S> {
    /// Writes one frame: header bytes, encoded body length, body.
    pub async fn send(&mut self, payload: &[u8]) -> TransportResult<()> {
        let len_bytes = self.config.length.encode(payload.len())?;

        // One buffer, one write: a frame is a single logical unit.
        let mut frame =
            Vec::with_capacity(self.config.header.len() + len_bytes.len() + payload.len());
        frame.extend_from_slice(&self.config.header);
        frame.extend_from_slice(&len_bytes);
        frame.extend_from_slice(payload);

        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;

        debug!(bytes = payload.len(), "sent frame");
        Ok(())
    }

    /// Reads exactly one frame and returns its body.
    pub async fn receive(&mut self) -> TransportResult<Bytes> {
        if !self.config.header.is_empty() {
            let mut header = vec![0u8; self.config.header.len()];
            self.read_section(&mut header, "header").await?;
        }

        let mut len_bytes = vec![0u8; self.config.length.size()];
        self.read_section(&mut len_bytes, "length field").await?;
        let len = self.config.length.decode(&len_bytes)?;

        debug!(length = len, "received frame length");

        if len > self.config.max_frame {
            warn!(length = len, max = self.config.max_frame, "oversized frame rejected");
            return Err(TransportError::FrameTooLarge {
                len,
                max: self.config.max_frame,
            });
        }

        let mut body = vec![0u8; len];
        self.read_section(&mut body, "body").await?;
        Ok(Bytes::from(body))
    }

    async fn read_section(
        &mut self,
        buf: &mut [u8],
        section: &'static str,
    ) -> TransportResult<()> {
        self.stream.read_exact(buf).await.map_err(|e| {
            warn!(section, error = %e, "frame read failed");
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                TransportError::UnexpectedEof { section }
            } else {
                TransportError::Io(e)
            }
        })?;
        Ok(())
    }
}

impl FramedChannel<TcpStream> {
    /// Connects to a remote peer and wraps the stream in a framed channel.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        config: ChannelConfig,
    ) -> TransportResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        if let Ok(peer) = stream.peer_addr() {
            info!(%peer, "connected");
        }
        Ok(Self::new(stream, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::{AsciiLength, BinaryLength};

    fn config() -> ChannelConfig {
        ChannelConfig::new(BinaryLength::new(2))
    }

    #[tokio::test]
    async fn frame_round_trip() {
        let (client, server) = tokio::io::duplex(256);
        let mut tx = FramedChannel::new(client, config());
        let mut rx = FramedChannel::new(server, config());

        tx.send(b"0800 network management").await.unwrap();
        let body = rx.receive().await.unwrap();
        assert_eq!(&body[..], b"0800 network management");
    }

    #[tokio::test]
    async fn send_produces_expected_wire_bytes() {
        let (client, mut server) = tokio::io::duplex(256);
        let mut tx = FramedChannel::new(client, config());
        tx.send(b"ABC").await.unwrap();
        drop(tx);

        let mut wire = Vec::new();
        server.read_to_end(&mut wire).await.unwrap();
        assert_eq!(wire, vec![0x00, 0x03, b'A', b'B', b'C']);
    }

    #[tokio::test]
    async fn header_is_emitted_and_stripped() {
        let cfg = ChannelConfig::new(BinaryLength::new(2)).header(vec![0x60, 0x00, 0x00, 0x00, 0x00]);
        let (client, server) = tokio::io::duplex(256);
        let mut tx = FramedChannel::new(client, cfg.clone());
        let mut rx = FramedChannel::new(server, cfg);

        tx.send(b"payload").await.unwrap();
        let body = rx.receive().await.unwrap();
        assert_eq!(&body[..], b"payload");
    }

    #[tokio::test]
    async fn ascii_length_interoperates() {
        let cfg = ChannelConfig::new(AsciiLength::new(4));
        let (client, server) = tokio::io::duplex(256);
        let mut tx = FramedChannel::new(client, cfg.clone());
        let mut rx = FramedChannel::new(server, cfg);

        tx.send(b"hello").await.unwrap();

        // The wire carries "0005" then the body.
        let body = rx.receive().await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn eof_inside_body_is_reported() {
        let (mut client, server) = tokio::io::duplex(256);
        // Declare 10 body bytes but deliver only 3, then close.
        client.write_all(&[0x00, 0x0A, b'A', b'B', b'C']).await.unwrap();
        drop(client);

        let mut rx = FramedChannel::new(server, config());
        let err = rx.receive().await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::UnexpectedEof { section: "body" }
        ));
    }

    #[tokio::test]
    async fn eof_before_length_field_is_reported() {
        let (client, server) = tokio::io::duplex(256);
        drop(client);

        let mut rx = FramedChannel::new(server, config());
        let err = rx.receive().await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::UnexpectedEof {
                section: "length field"
            }
        ));
    }

    #[tokio::test]
    async fn oversized_declared_length_rejected_before_read() {
        let (mut client, server) = tokio::io::duplex(256);
        client.write_all(&[0xFF, 0xFF]).await.unwrap();

        let mut rx = FramedChannel::new(server, config().max_frame(1024));
        let err = rx.receive().await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::FrameTooLarge {
                len: 0xFFFF,
                max: 1024
            }
        ));
    }

    #[tokio::test]
    async fn length_overflow_rejected_on_send() {
        let (client, _server) = tokio::io::duplex(256);
        let mut tx = FramedChannel::new(client, ChannelConfig::new(BinaryLength::new(1)));

        let err = tx.send(&[0u8; 300]).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::LengthOverflow { len: 300, width: 1 }
        ));
    }
}
