//! Tree navigation - steps, paths, sessions, and the bounded explorer
//!
//! Rule induction moves through a document one step at a time: up to the
//! parent, sideways to a sibling, or down to a child picked by ordinal.
//! [`Step`] is the move alphabet, [`NavPath`] an immutable sequence of
//! moves, [`NavSession`] applies moves over one document and memoizes the
//! per-parent child classification, and [`explore`] runs the bounded
//! depth-first search that turns a pivot occurrence into candidate paths.

pub mod explorer;
pub mod path;
pub mod session;
pub mod step;

pub use explorer::{explore, PathExplorer, Suitability};
pub use path::NavPath;
pub use session::NavSession;
pub use step::Step;
