//! Markup tree: model, parser and serializer

pub mod model;
pub mod parser;
pub mod serializer;

pub use model::{Document, Element, Node};
pub use parser::{Config, Parser};
pub use serializer::{serialize_document, serialize_element};
