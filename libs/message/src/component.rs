//! Component tree types: leaf fields, binary leaf fields, composite messages.
//!
//! The three shapes are a closed set, so they are modeled as one sum type
//! rather than a trait hierarchy — every operation that walks a tree
//! (merge, serialize) dispatches exhaustively over exactly these cases.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of a message tree.
///
/// Field numbers are unique among the direct children of one composite.
/// A composite owns its children exclusively; there are no back-references
/// from child to parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    /// Textual leaf field.
    Field { number: u32, value: String },
    /// Raw-byte leaf field.
    Binary { number: u32, value: Vec<u8> },
    /// Composite node: a top-level message (`number == 0`) or a
    /// sub-message nested as a field of its parent.
    Msg(IsoMsg),
}

impl Component {
    /// Field number this component occupies in its parent.
    pub fn number(&self) -> u32 {
        match self {
            Component::Field { number, .. } => *number,
            Component::Binary { number, .. } => *number,
            Component::Msg(msg) => msg.number(),
        }
    }

    /// Textual value, if this is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Component::Field { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Raw byte value, if this is a binary leaf.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Component::Binary { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Nested composite, if this is a sub-message.
    pub fn as_msg(&self) -> Option<&IsoMsg> {
        match self {
            Component::Msg(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Composite message node.
///
/// Children are kept in insertion order; that order is what the tree-text
/// serializer walks. The binary packager ignores it and follows its codec
/// table order instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsoMsg {
    number: u32,
    children: IndexMap<u32, Component>,
}

impl IsoMsg {
    /// Field number that denotes a top-level message.
    pub const ROOT: u32 = 0;

    /// Creates an empty composite. `number == 0` means top-level; any other
    /// value means this composite nests as a field of its parent.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            children: IndexMap::new(),
        }
    }

    /// Creates an empty top-level message.
    pub fn root() -> Self {
        Self::new(Self::ROOT)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_root(&self) -> bool {
        self.number == Self::ROOT
    }

    /// Attaches a child, replacing any existing child with the same field
    /// number. Replacement keeps the original insertion position.
    pub fn set(&mut self, child: Component) {
        self.children.insert(child.number(), child);
    }

    /// Attaches a textual leaf field.
    pub fn set_field(&mut self, number: u32, value: impl Into<String>) {
        self.set(Component::Field {
            number,
            value: value.into(),
        });
    }

    /// Attaches a binary leaf field.
    pub fn set_binary(&mut self, number: u32, value: Vec<u8>) {
        self.set(Component::Binary { number, value });
    }

    /// Returns the child at `number`, or `None` if the field is absent.
    pub fn get(&self, number: u32) -> Option<&Component> {
        self.children.get(&number)
    }

    /// Removes and returns the child at `number`, preserving the relative
    /// order of the remaining children.
    pub fn unset(&mut self, number: u32) -> Option<Component> {
        self.children.shift_remove(&number)
    }

    /// Merges `source` into this message: every field present in `source`
    /// overwrites the field of the same number here; fields absent in
    /// `source` are left untouched. This is the contract used when
    /// reconstituting a parsed message into a caller-supplied destination.
    pub fn merge(&mut self, source: IsoMsg) {
        for (_, child) in source.children {
            self.set(child);
        }
    }

    /// Iterates over children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &Component> {
        self.children.values()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for IsoMsg {
    fn default() -> Self {
        Self::root()
    }
}

impl From<IsoMsg> for Component {
    fn from(msg: IsoMsg) -> Self {
        Component::Msg(msg)
    }
}
