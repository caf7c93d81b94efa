//! Error types for svgpure

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    /// Zero-width span at `pos`
    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }
}

/// Broad class of an error, used by callers to decide whether a failure is
/// scoped to one document or to the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// The input document could not be parsed; only that document is affected.
    MalformedInput,
    /// The allow-lists are unusable; nothing should be processed.
    Configuration,
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidToken,
    UnexpectedEof,
    InvalidUtf8,
    UnterminatedMarkup,
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    InvalidEntity { entity: String },
    MissingRootElement,
    TrailingContent,
    RootNotFound { name: String },
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    EmptyAllowlists,
    InvalidName { name: String },
}

impl ErrorKind {
    pub const fn category(&self) -> Category {
        match self {
            Self::EmptyAllowlists | Self::InvalidName { .. } => Category::Configuration,
            _ => Category::MalformedInput,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::UnterminatedMarkup => write!(f, "unterminated markup"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity { entity } => write!(f, "invalid entity: &{entity};"),
            Self::MissingRootElement => write!(f, "document has no root element"),
            Self::TrailingContent => write!(f, "content after the root element"),
            Self::RootNotFound { name } => write!(f, "no <{name}> element in document"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::EmptyAllowlists => {
                write!(f, "element and attribute allow-lists are both empty")
            }
            Self::InvalidName { name } => write!(f, "invalid allow-list name: {name:?}"),
        }
    }
}

/// Main error type for svgpure
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
}

impl Error {
    /// Create a new error
    pub const fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Error that has no meaningful source position
    pub fn config(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub const fn category(&self) -> Category {
        self.kind.category()
    }

    pub const fn is_configuration(&self) -> bool {
        matches!(self.kind.category(), Category::Configuration)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == Span::empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.kind)
        }
    }
}

/// Result type alias for svgpure
pub type Result<T> = std::result::Result<T, Error>;
