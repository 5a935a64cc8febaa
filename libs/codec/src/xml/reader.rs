//! Streaming tag tokenizer for the tree-text format.
//!
//! Produces element-open/element-close events from a byte buffer, one at a
//! time, without building a document tree. Only the subset of XML the
//! `<isomsg>` grammar uses is understood: tags with double- or
//! single-quoted attributes, self-closing tags, comments, an optional
//! declaration, and the five named character entities. Character data
//! between tags is skipped, as the tree-text grammar carries no text
//! content.

use crate::error::ParseError;

/// One parse event. A self-closing tag yields an `Open` followed by a
/// matching `Close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Open {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Close {
        name: String,
    },
}

/// Returns the value of `name` among `attributes`, if present.
pub fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Pull-based event reader over a complete in-memory document.
pub struct XmlReader<'a> {
    input: &'a [u8],
    pos: usize,
    /// Close event owed for a self-closing tag already reported as `Open`.
    pending_close: Option<String>,
}

impl<'a> XmlReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            pending_close: None,
        }
    }

    /// Next event in document order, or `None` at end of input.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>, ParseError> {
        if let Some(name) = self.pending_close.take() {
            return Ok(Some(XmlEvent::Close { name }));
        }

        loop {
            self.skip_character_data();
            if self.pos >= self.input.len() {
                return Ok(None);
            }
            // Invariant: positioned at '<'.
            if self.consume_prolog()? {
                continue;
            }
            return self.read_tag().map(Some);
        }
    }

    fn skip_character_data(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos] != b'<' {
            self.pos += 1;
        }
    }

    /// Consumes `<?...?>` declarations and `<!--...-->` comments. Returns
    /// true when something was consumed.
    fn consume_prolog(&mut self) -> Result<bool, ParseError> {
        let rest = &self.input[self.pos..];
        if rest.starts_with(b"<?") {
            match find(rest, b"?>") {
                Some(end) => {
                    self.pos += end + 2;
                    Ok(true)
                }
                None => Err(ParseError::Malformed("unterminated declaration".into())),
            }
        } else if rest.starts_with(b"<!--") {
            match find(rest, b"-->") {
                Some(end) => {
                    self.pos += end + 3;
                    Ok(true)
                }
                None => Err(ParseError::Malformed("unterminated comment".into())),
            }
        } else {
            Ok(false)
        }
    }

    fn read_tag(&mut self) -> Result<XmlEvent, ParseError> {
        self.pos += 1; // '<'
        let closing = self.peek() == Some(b'/');
        if closing {
            self.pos += 1;
        }

        let name = self.read_name()?;
        self.skip_whitespace();

        if closing {
            if self.peek() != Some(b'>') {
                return Err(ParseError::Malformed(format!(
                    "malformed closing tag </{name}>"
                )));
            }
            self.pos += 1;
            return Ok(XmlEvent::Close { name });
        }

        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek() != Some(b'>') {
                        return Err(ParseError::Malformed(format!(
                            "malformed self-closing tag <{name}>"
                        )));
                    }
                    self.pos += 1;
                    self.pending_close = Some(name.clone());
                    break;
                }
                Some(_) => {
                    let attr = self.read_name()?;
                    self.skip_whitespace();
                    if self.peek() != Some(b'=') {
                        return Err(ParseError::Malformed(format!(
                            "attribute {attr} without value in <{name}>"
                        )));
                    }
                    self.pos += 1;
                    self.skip_whitespace();
                    let value = self.read_quoted()?;
                    attributes.push((attr, value));
                }
                None => {
                    return Err(ParseError::Malformed(format!("unterminated tag <{name}>")))
                }
            }
        }

        Ok(XmlEvent::Open { name, attributes })
    }

    fn read_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.' || b == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(ParseError::Malformed(format!(
                "expected a name at byte {start}"
            )));
        }
        // Name bytes are a checked ASCII subset.
        Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn read_quoted(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(ParseError::Malformed(
                    "attribute value must be quoted".into(),
                ))
            }
        };
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let raw = &self.input[start..self.pos];
                self.pos += 1;
                let text = std::str::from_utf8(raw).map_err(|_| {
                    ParseError::Malformed(format!("attribute value at byte {start} is not UTF-8"))
                })?;
                return unescape(text);
            }
            self.pos += 1;
        }
        Err(ParseError::Malformed(
            "unterminated attribute value".into(),
        ))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Escapes the markup-significant characters for attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> Result<String, ParseError> {
    if !text.contains('&') {
        return Ok(text.to_owned());
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let semi = rest
            .find(';')
            .ok_or_else(|| ParseError::Malformed(format!("unterminated entity in {text:?}")))?;
        match &rest[..=semi] {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" => out.push('\''),
            other => {
                return Err(ParseError::Malformed(format!("unknown entity {other}")));
            }
        }
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
