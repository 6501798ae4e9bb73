//! Construction and resolution of musical scores.
//!
//! Scores are assembled from mutable [builders], which may reference each
//! other (ties, slurs, tuplets, grace notes) before anything is finalized.
//! [builders::ScoreBuilder::build] resolves the references and produces
//! an immutable [dom::Score], addressed by [primitives::Position] and read
//! through [access].

pub mod access;
pub mod builders;
pub mod dom;
pub mod error;
pub mod notation;
pub mod primitives;

pub use error::{ScoreError, ScoreResult};
