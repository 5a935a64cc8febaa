//! # Switchwire Protocol Codec
//!
//! ## Purpose
//!
//! The "rules" layer of the switch: everything that turns a component tree
//! into wire bytes and back.
//!
//! - **Field codecs** ([`FieldCodec`] and its strategies) — per-field
//!   encode/decode under several physical formats: fixed-length,
//!   length-prefixed (binary, ASCII-digit, or BCD length), and raw-byte
//!   payloads.
//! - **Binary packager** ([`BinaryPackager`]) — assembles/parses a flat
//!   byte buffer by walking an ordered table of field codecs.
//! - **XML packager** ([`XmlPackager`]) — builds/serializes the component
//!   tree through a streaming parse-event protocol with an explicit stack.
//!
//! ## Architecture Role
//!
//! ```text
//! switchwire-message → [switchwire-codec] → switchwire-network
//!        ↑                    ↓                    ↓
//!   Component Tree       Pack/Unpack           Framed
//!   (pure data)          Rules                 Stream
//! ```
//!
//! ## What This Crate Does NOT Contain
//!
//! - Stream framing or socket management (belongs in `switchwire-network`)
//! - The tree types themselves (belong in `switchwire-message`)
//! - Cryptographic or MAC processing (out of scope for the core)
//!
//! Every pack/unpack call returns a freshly allocated buffer; packagers hold
//! no mutable scratch state, so a `&self` call is safe from one thread at a
//! time without locking.

pub mod error;
pub mod field;
pub mod hextext;
pub mod packager;
pub mod xml;

pub use error::{
    ConfigurationError, DecodeError, PackError, ParseError, ProtocolError, ProtocolResult,
};
pub use field::{FieldCodec, FixedChar, LlAsciiChar, LlBcdChar, LlBinaryBytes, LlBinaryChar};
pub use packager::BinaryPackager;
pub use xml::XmlPackager;
