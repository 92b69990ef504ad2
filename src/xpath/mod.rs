//! XPath Engine
//!
//! The XPath 1.0 subset generated locators are written in:
//! - child, parent, self, descendant, sibling, and attribute axes
//! - positional, attribute, and function predicates
//! - core function library
//! - compiled expression caching shared across rule-application workers

pub mod axes;
pub mod cache;
pub mod compiler;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;

pub use cache::get_or_compile;
pub use compiler::{compile, CompiledExpr};
pub use eval::{evaluate, evaluate_compiled, evaluate_from_node, root_context, EvalContext};
pub use value::XPathValue;
