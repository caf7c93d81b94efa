//! svgpure - allow-list driven SVG sanitizer
//!
//! Every element, attribute and stray node that is not explicitly allowed is
//! removed; whitespace inside text is deleted.
//!
//! # Quick Start
//!
//! ```
//! use svgpure::{purify, Allowlist, Sanitizer};
//! # fn main() -> Result<(), svgpure::Error> {
//! let sanitizer = Sanitizer::new(Allowlist::minimal())?;
//! let out = purify(
//!     r#"<svg width="10" onload="x()"><title>t</title><path d="M0 0" id="p"/></svg>"#,
//!     &sanitizer,
//!     "svg",
//! )?;
//! assert_eq!(out, r#"<svg width="10"><path d="M0 0"/></svg>"#);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Category, Error, ErrorKind, Pos, Result, Span};

mod cursor;

pub mod xml;
pub use xml::{Document, Element, Node, Parser};

pub mod allowlist;
pub use allowlist::{Allowlist, Profile};

pub mod sanitize;
pub use sanitize::{sanitize, strip_whitespace, Options, Sanitizer, Stats};

pub mod purify;
pub use purify::{purify, Purified, Purifier, DEFAULT_ROOT};

/// Parse markup from a string
pub fn from_str(s: &str) -> Result<Document> {
    Parser::new(s.as_bytes()).parse()
}

/// Parse markup from bytes
pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
    Parser::new(bytes).parse()
}

/// Serialize an element subtree
pub fn to_string(element: &Element) -> String {
    xml::serialize_element(element)
}
