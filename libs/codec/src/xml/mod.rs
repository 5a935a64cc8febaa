//! Tree-text packager: the `<isomsg>`/`<field>` textual form of a
//! component tree.
//!
//! Unpacking is event-driven — the [`reader`] tokenizer streams
//! open/close events into a [`TreeBuilder`] that keeps an explicit stack
//! of composites, never a full document tree. Packing walks the tree and
//! emits the structural inverse.
//!
//! Wire grammar:
//!
//! ```text
//! <isomsg [id="N"]>
//!   ( <field id="N" value="V" [type="binary"]/> | <isomsg id="N">...</isomsg> )*
//! </isomsg>
//! ```
//!
//! `type="binary"` marks a hex-pair value decoding to a binary leaf.

pub mod reader;

use switchwire_message::{Component, IsoMsg};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::hextext;
use self::reader::{attribute, XmlEvent, XmlReader};

pub const ISOMSG_TAG: &str = "isomsg";
pub const FIELD_TAG: &str = "field";
pub const ID_ATTR: &str = "id";
pub const VALUE_ATTR: &str = "value";
pub const TYPE_ATTR: &str = "type";
pub const TYPE_BINARY: &str = "binary";

/// Explicit-stack tree builder fed one parse event at a time.
///
/// The stack holds owned composites; a nested message is attached to its
/// parent when its close event arrives, so no node is ever reachable from
/// two places. When a close empties the stack the popped composite is
/// pushed back — that keeps exactly one retrievable root for [`finish`]
/// after the final close. This push-back is part of the observable
/// contract and is preserved deliberately: a malformed stream with a
/// second top-level close simply finds a non-empty stack, and no further
/// intent is inferred for it.
///
/// [`finish`]: TreeBuilder::finish
pub struct TreeBuilder {
    stack: Vec<IsoMsg>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Applies one event to the stack. Tags other than `isomsg`/`field`
    /// are ignored.
    pub fn handle(&mut self, event: XmlEvent) -> Result<(), ParseError> {
        match event {
            XmlEvent::Open { name, attributes } if name == ISOMSG_TAG => {
                self.open_msg(&attributes)
            }
            XmlEvent::Open { name, attributes } if name == FIELD_TAG => {
                self.open_field(&attributes)
            }
            XmlEvent::Close { name } if name == ISOMSG_TAG => {
                if let Some(closed) = self.stack.pop() {
                    match self.stack.last_mut() {
                        Some(parent) => parent.set(closed.into()),
                        // Keep the last root retrievable by finish().
                        None => self.stack.push(closed),
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn open_msg(&mut self, attributes: &[(String, String)]) -> Result<(), ParseError> {
        match attribute(attributes, ID_ATTR) {
            Some(id) => {
                let number = parse_number(ID_ATTR, id)?;
                if self.stack.is_empty() {
                    return Err(ParseError::InnerWithoutOuter);
                }
                self.stack.push(IsoMsg::new(number));
                Ok(())
            }
            None => {
                if !self.stack.is_empty() {
                    return Err(ParseError::UnexpectedRoot);
                }
                self.stack.push(IsoMsg::root());
                Ok(())
            }
        }
    }

    fn open_field(&mut self, attributes: &[(String, String)]) -> Result<(), ParseError> {
        let id = attribute(attributes, ID_ATTR);
        let value = attribute(attributes, VALUE_ATTR);
        let (id, value) = match (id, value) {
            (Some(id), Some(value)) => (id, value),
            _ => return Err(ParseError::InvalidField),
        };
        let number = parse_number(ID_ATTR, id)?;

        let component = if attribute(attributes, TYPE_ATTR) == Some(TYPE_BINARY) {
            Component::Binary {
                number,
                value: hextext::decode(value)?,
            }
        } else {
            Component::Field {
                number,
                value: value.to_owned(),
            }
        };

        match self.stack.last_mut() {
            Some(top) => {
                top.set(component);
                Ok(())
            }
            None => Err(ParseError::FieldWithoutMessage),
        }
    }

    /// Ends the event stream: pops exactly one composite as the parse
    /// result, or fails when no message was produced.
    pub fn finish(mut self) -> Result<IsoMsg, ParseError> {
        self.stack.pop().ok_or(ParseError::EmptyDocument)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(attr: &'static str, value: &str) -> Result<u32, ParseError> {
    value.parse().map_err(|_| ParseError::BadAttribute {
        attr,
        value: value.to_owned(),
    })
}

/// Packs/unpacks component trees in the tree-text form.
///
/// Stateless: each call works on its own buffers, so one instance can be
/// shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlPackager;

impl XmlPackager {
    pub fn new() -> Self {
        Self
    }

    /// Serializes `msg` to the textual wire form.
    pub fn pack(&self, msg: &IsoMsg) -> Vec<u8> {
        let mut out = String::new();
        write_msg(&mut out, msg, 0, false);
        debug!(bytes = out.len(), "packed xml message");
        out.into_bytes()
    }

    /// Parses `data` and merges the resulting tree into `dest` (fields
    /// present in the document overwrite same-numbered fields in `dest`;
    /// others are untouched). Returns the number of bytes consumed.
    pub fn unpack(&self, dest: &mut IsoMsg, data: &[u8]) -> Result<usize, ParseError> {
        let parsed = self.parse(data).map_err(|e| {
            warn!(error = %e, "xml unpack failed");
            e
        })?;
        dest.merge(parsed);
        debug!(bytes = data.len(), fields = dest.len(), "unpacked xml message");
        Ok(data.len())
    }

    fn parse(&self, data: &[u8]) -> Result<IsoMsg, ParseError> {
        let mut reader = XmlReader::new(data);
        let mut builder = TreeBuilder::new();
        while let Some(event) = reader.next_event()? {
            builder.handle(event)?;
        }
        builder.finish()
    }
}

fn write_msg(out: &mut String, msg: &IsoMsg, depth: usize, nested: bool) {
    indent(out, depth);
    if nested && msg.number() != IsoMsg::ROOT {
        out.push_str(&format!("<{} {}=\"{}\">\n", ISOMSG_TAG, ID_ATTR, msg.number()));
    } else {
        out.push_str(&format!("<{ISOMSG_TAG}>\n"));
    }

    for child in msg.children() {
        match child {
            Component::Field { number, value } => {
                indent(out, depth + 1);
                out.push_str(&format!(
                    "<{} {}=\"{}\" {}=\"{}\"/>\n",
                    FIELD_TAG,
                    ID_ATTR,
                    number,
                    VALUE_ATTR,
                    reader::escape(value)
                ));
            }
            Component::Binary { number, value } => {
                indent(out, depth + 1);
                out.push_str(&format!(
                    "<{} {}=\"{}\" {}=\"{}\" {}=\"{}\"/>\n",
                    FIELD_TAG,
                    ID_ATTR,
                    number,
                    VALUE_ATTR,
                    hextext::encode(value),
                    TYPE_ATTR,
                    TYPE_BINARY
                ));
            }
            Component::Msg(inner) => write_msg(out, inner, depth + 1, true),
        }
    }

    indent(out, depth);
    out.push_str(&format!("</{ISOMSG_TAG}>\n"));
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn unpack_simple_field_into_empty_destination() {
        let doc = br#"<isomsg><field id="12" value="ABC"/></isomsg>"#;
        let mut dest = IsoMsg::root();
        let consumed = XmlPackager::new().unpack(&mut dest, doc).unwrap();

        assert_eq!(dest.get(12).unwrap().as_text(), Some("ABC"));
        assert_eq!(consumed, doc.len());
    }

    #[test]
    fn unpack_nested_submessage() {
        let doc = br#"<isomsg><isomsg id="5"><field id="1" value="x"/></isomsg></isomsg>"#;
        let mut dest = IsoMsg::root();
        XmlPackager::new().unpack(&mut dest, doc).unwrap();

        let sub = dest.get(5).unwrap().as_msg().unwrap();
        assert_eq!(sub.number(), 5);
        assert_eq!(sub.get(1).unwrap().as_text(), Some("x"));
    }

    #[test]
    fn unpack_binary_field() {
        let doc = br#"<isomsg><field id="3" value="0A0B" type="binary"/></isomsg>"#;
        let mut dest = IsoMsg::root();
        XmlPackager::new().unpack(&mut dest, doc).unwrap();

        assert_eq!(dest.get(3).unwrap().as_binary(), Some(&[0x0A, 0x0B][..]));
    }

    #[test]
    fn odd_length_binary_value_fails() {
        let doc = br#"<isomsg><field id="3" value="0A0" type="binary"/></isomsg>"#;
        let mut dest = IsoMsg::root();
        let err = XmlPackager::new().unpack(&mut dest, doc).unwrap_err();
        assert_eq!(
            err,
            ParseError::BinaryValue(DecodeError::OddHexLength { len: 3 })
        );
    }

    #[test]
    fn empty_stream_fails() {
        let mut dest = IsoMsg::root();
        let err = XmlPackager::new().unpack(&mut dest, b"  ").unwrap_err();
        assert_eq!(err, ParseError::EmptyDocument);
    }

    #[test]
    fn inner_without_outer_fails() {
        let doc = br#"<isomsg id="5"><field id="1" value="x"/></isomsg>"#;
        let mut dest = IsoMsg::root();
        let err = XmlPackager::new().unpack(&mut dest, doc).unwrap_err();
        assert_eq!(err, ParseError::InnerWithoutOuter);
    }

    #[test]
    fn field_missing_value_fails() {
        let doc = br#"<isomsg><field id="12"/></isomsg>"#;
        let mut dest = IsoMsg::root();
        let err = XmlPackager::new().unpack(&mut dest, doc).unwrap_err();
        assert_eq!(err, ParseError::InvalidField);
    }

    #[test]
    fn second_root_open_fails() {
        let doc = br#"<isomsg><isomsg><field id="1" value="x"/></isomsg></isomsg>"#;
        let mut dest = IsoMsg::root();
        let err = XmlPackager::new().unpack(&mut dest, doc).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedRoot);
    }

    #[test]
    fn unpack_merges_into_destination() {
        let mut dest = IsoMsg::root();
        dest.set_field(11, "000001");
        dest.set_field(12, "OLD");

        XmlPackager::new()
            .unpack(&mut dest, br#"<isomsg><field id="12" value="NEW"/></isomsg>"#)
            .unwrap();

        assert_eq!(dest.get(11).unwrap().as_text(), Some("000001"));
        assert_eq!(dest.get(12).unwrap().as_text(), Some("NEW"));
    }

    #[test]
    fn close_pushes_root_back_for_final_pop() {
        let mut builder = TreeBuilder::new();
        builder
            .handle(XmlEvent::Open {
                name: ISOMSG_TAG.into(),
                attributes: vec![],
            })
            .unwrap();
        builder
            .handle(XmlEvent::Close {
                name: ISOMSG_TAG.into(),
            })
            .unwrap();

        // The close emptied the stack and the root was pushed back.
        let root = builder.finish().unwrap();
        assert!(root.is_root());
    }

    #[test]
    fn pack_round_trips_through_unpack() {
        let mut inner = IsoMsg::new(127);
        inner.set_field(2, "sub-value");

        let mut msg = IsoMsg::root();
        msg.set_field(0, "0800");
        msg.set_field(70, "301");
        msg.set_binary(52, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        msg.set(inner.into());

        let bytes = XmlPackager::new().pack(&msg);
        let mut parsed = IsoMsg::root();
        XmlPackager::new().unpack(&mut parsed, &bytes).unwrap();

        assert_eq!(parsed, msg);
    }

    #[test]
    fn pack_escapes_markup_in_values() {
        let mut msg = IsoMsg::root();
        msg.set_field(48, r#"a & b <c> "d""#);

        let bytes = XmlPackager::new().pack(&msg);
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("&amp;"));
        assert!(text.contains("&lt;"));

        let mut parsed = IsoMsg::root();
        XmlPackager::new().unpack(&mut parsed, &bytes).unwrap();
        assert_eq!(parsed.get(48).unwrap().as_text(), Some(r#"a & b <c> "d""#));
    }
}
