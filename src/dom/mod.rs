//! Arena document model
//!
//! Nodes live in a flat arena indexed by [`NodeId`]; strings are interned
//! per document. Everything the navigation layer and the query engine need
//! is a plain integer-indexed read, which keeps per-branch visited sets and
//! cross-thread sharing cheap.

pub mod document;
pub mod node;
pub mod strings;

pub use document::{ChildIter, DescendantIter, Document, DocumentSet};
pub use node::{Attr, Node, NodeId, NodeKind};
pub use strings::StringPool;
