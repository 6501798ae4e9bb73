//! Read access to finalized scores: iteration in score order and
//! windowed views.

pub mod iter;
pub mod selection;

pub use selection::Selection;
