//! Template detection - the anchors rules are built around
//!
//! A pivot is a piece of page structure shared by every sample document:
//! an invariant text token or an id-bearing element whose (tag, id) pair
//! recurs everywhere. The scanner discovers pivots once per sample
//! collection; its per-document views answer the suitability questions
//! asked during exploration.

pub mod scanner;

pub use scanner::{Occurrence, TemplatePivot, TemplateScanner, TemplateView};
