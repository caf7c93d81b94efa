//! Markup parser producing a [`Document`] tree

use indexmap::IndexMap;

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::model::{Document, Element, Node};

/// Configuration for the markup parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Maximum element nesting depth; the document element is at depth 1
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_size: 64 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a parser configuration
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// Markup parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
}

impl<'a> Parser<'a> {
    /// Create a parser with the default limits
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a parser with custom limits; a leading byte order mark is skipped
    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
        Self {
            cursor: Cursor::new(input),
            config,
        }
    }

    /// Parse a complete document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size != 0 && self.cursor.remaining().len() > self.config.max_size {
            return Err(Error::new(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                Span::empty(),
            ));
        }

        let prolog = self.parse_misc(true)?;
        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::MissingRootElement));
        }
        let root = self.parse_element(1)?;
        let epilog = self.parse_misc(false)?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::TrailingContent));
        }

        Ok(Document {
            prolog,
            root,
            epilog,
        })
    }

    /// Comments, PIs and (in the prolog) a doctype, with whitespace between them dropped
    fn parse_misc(&mut self, allow_doctype: bool) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                nodes.push(self.parse_processing_instruction()?);
            } else if self.cursor.starts_with(b"<!--") {
                nodes.push(self.parse_comment()?);
            } else if allow_doctype && self.cursor.starts_with(b"<!DOCTYPE") {
                nodes.push(self.parse_doctype()?);
            } else {
                return Ok(nodes);
            }
        }
    }

    fn parse_element(&mut self, depth: usize) -> Result<Element> {
        let max = self.config.max_depth;
        if depth > usize::from(max) {
            return Err(self.error_here(ErrorKind::MaxDepthExceeded { max }));
        }

        self.expect_byte(b'<')?;
        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.eat(b"/>") {
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }
        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnexpectedEof));
            }

            if self.cursor.eat(b"</") {
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(self.error_here(ErrorKind::MismatchedTag {
                        expected: name,
                        found: close_name,
                    }));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            let child = if self.cursor.starts_with(b"<!--") {
                self.parse_comment()?
            } else if self.cursor.starts_with(b"<![CDATA[") {
                self.parse_cdata()?
            } else if self.cursor.starts_with(b"<?") {
                self.parse_processing_instruction()?
            } else if self.cursor.starts_with(b"<!") {
                return Err(self.error_here(ErrorKind::InvalidToken));
            } else if self.cursor.current() == Some(b'<') {
                Node::Element(self.parse_element(depth + 1)?)
            } else {
                Node::Text(self.parse_text()?)
            };
            children.push(child);
        }

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here(ErrorKind::DuplicateAttribute { name }));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.error_here(ErrorKind::InvalidToken)),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.to_str(self.cursor.slice_from(start))?;
                self.cursor.advance();
                // literal whitespace in attribute values normalizes to spaces
                let normalized: String = normalize_newlines(raw)
                    .chars()
                    .map(|c| if matches!(c, '\t' | '\n') { ' ' } else { c })
                    .collect();
                return self.decode_entities(&normalized);
            }
            if b == b'<' {
                return Err(self.error_here(ErrorKind::InvalidToken));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start = self.cursor.pos();
        while !matches!(self.cursor.current(), Some(b'<') | None) {
            self.cursor.advance();
        }
        let raw = self.to_str(self.cursor.slice_from(start))?;
        self.decode_entities(&normalize_newlines(raw))
    }

    fn parse_comment(&mut self) -> Result<Node> {
        self.cursor.advance_by(4);
        let body = self.take_until(b"-->")?;
        Ok(Node::Comment(body))
    }

    fn parse_cdata(&mut self) -> Result<Node> {
        self.cursor.advance_by(9);
        let body = self.take_until(b"]]>")?;
        Ok(Node::CData(normalize_newlines(&body)))
    }

    fn parse_processing_instruction(&mut self) -> Result<Node> {
        self.cursor.advance_by(2);
        let target = self.parse_name()?;
        self.cursor.skip_whitespace();
        let data = self.take_until(b"?>")?;
        Ok(Node::ProcessingInstruction {
            target,
            data: data.trim_end().to_string(),
        })
    }

    fn parse_doctype(&mut self) -> Result<Node> {
        self.cursor.advance_by(9);
        let start = self.cursor.pos();
        let mut brackets = 0usize;
        let mut quote = None;

        while let Some(b) = self.cursor.current() {
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => brackets += 1,
                (None, b']') => brackets = brackets.saturating_sub(1),
                (None, b'>') if brackets == 0 => {
                    let body = self.to_str(self.cursor.slice_from(start))?.trim().to_string();
                    self.cursor.advance();
                    return Ok(Node::Doctype(body));
                }
                (None, _) => {}
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnterminatedMarkup))
    }

    fn take_until(&mut self, terminator: &[u8]) -> Result<String> {
        match self.cursor.take_until(terminator) {
            Some(raw) => {
                let text = self.to_str(raw)?.to_string();
                self.cursor.advance_by(terminator.len());
                Ok(text)
            }
            None => Err(self.error_here(ErrorKind::UnterminatedMarkup)),
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(b) if is_name_start(b) => self.cursor.advance(),
            Some(_) => return Err(self.error_here(ErrorKind::InvalidToken)),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
        }
        while self.cursor.current().is_some_and(is_name_char) {
            self.cursor.advance();
        }

        self.to_str(self.cursor.slice_from(start)).map(str::to_string)
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current() {
            Some(b) if b == expected => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here(ErrorKind::InvalidToken)),
            None => Err(self.error_here(ErrorKind::UnexpectedEof)),
        }
    }

    fn to_str<'b>(&self, bytes: &'b [u8]) -> Result<&'b str> {
        std::str::from_utf8(bytes).map_err(|_| self.error_here(ErrorKind::InvalidUtf8))
    }

    fn decode_entities(&self, input: &str) -> Result<String> {
        if !input.contains('&') {
            return Ok(input.to_string());
        }

        let mut result = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(amp) = rest.find('&') {
            let (before, after) = rest.split_at(amp);
            result.push_str(before);
            let after = after.get(1..).unwrap_or_default();

            let Some(semi) = after.find(';') else {
                return Err(self.error_here(ErrorKind::InvalidEntity {
                    entity: after.to_string(),
                }));
            };
            let (entity, tail) = after.split_at(semi);
            match decode_entity(entity) {
                Some(ch) => result.push(ch),
                None => {
                    return Err(self.error_here(ErrorKind::InvalidEntity {
                        entity: entity.to_string(),
                    }));
                }
            }
            rest = tail.get(1..).unwrap_or_default();
        }
        result.push_str(rest);

        Ok(result)
    }

    fn error_here(&self, kind: ErrorKind) -> Error {
        Error::new(kind, Span::at(self.cursor.position()))
    }
}

fn normalize_newlines(input: &str) -> String {
    if input.contains('\r') {
        input.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        input.to_string()
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    }
}
