//! Lenient HTML tokenization layer
//!
//! Byte scanning, entity decoding, attribute parsing, and the pull tokenizer
//! that feeds the tree builder in [`crate::dom`].

pub mod attributes;
pub mod entities;
pub mod scanner;
pub mod tokenizer;

pub use attributes::Attribute;
pub use tokenizer::{is_void_element, HtmlToken, Tokenizer};
