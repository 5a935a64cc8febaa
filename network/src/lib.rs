//! # Switchwire Channel Framing
//!
//! ## Purpose
//!
//! Delivers exactly one message payload per read, and exactly one frame per
//! write, on top of a raw byte stream. A frame is
//! `[header bytes][body-length field][body bytes]`; the header size and the
//! length-field encoding are connection-subtype parameters, supplied as a
//! [`ChannelConfig`] with a pluggable [`FrameLength`] strategy.
//!
//! ## Architecture Role
//!
//! ```text
//! switchwire-codec → [switchwire-network] → TCP peer
//!        ↓                   ↓                 ↓
//!   Message Bytes       Frame Header       Byte Stream
//!   (payload)           + Body             (tokio)
//! ```
//!
//! This crate never interprets the payload — packagers do that. It also
//! performs no retries: a read blocks (awaits) until a full frame arrives
//! or the stream fails, and closing the stream surfaces as an error on any
//! in-flight call. Reconnect and keep-alive policy belong to the
//! connection-management layer above.

pub mod channel;
pub mod error;
pub mod framing;

pub use channel::{ChannelConfig, FramedChannel};
pub use error::TransportError;
pub use framing::{AsciiLength, BinaryLength, FrameLength};
