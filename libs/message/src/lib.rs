//! # Switchwire Component Tree
//!
//! In-memory representation of an ISO 8583-style transaction message.
//!
//! A message is a tree: a composite [`IsoMsg`] owns an ordered set of
//! children addressed by field number, where each child is either a textual
//! leaf, a raw-byte leaf, or a nested sub-message. The tree is built by
//! application code (or by a packager during unpack), serialized once, and
//! discarded — nothing here persists or touches IO.
//!
//! ## Architecture Role
//!
//! ```text
//! Application → [switchwire-message] → switchwire-codec → switchwire-network
//!      ↑               ↓                     ↓                  ↓
//!  Business        Component            Pack/Unpack         Framed
//!  Logic           Tree                 Bytes               Stream
//! ```
//!
//! This crate is pure data: no codecs, no sockets, no logging. Packing
//! rules live in `switchwire-codec`, framing in `switchwire-network`.

mod component;

pub use component::{Component, IsoMsg};
