//! Finalized score object model.
//!
//! Everything here is produced by [crate::builders::ScoreBuilder::build]
//! and never changes afterwards.

pub(crate) mod assembler;
pub mod event;
pub mod measure;
pub mod part;
pub(crate) mod resolver;
pub mod score;

pub use event::{
    Chord, Connected, Durational, ElementId, GraceNote, GraceNoteChord, Note,
    Rest,
};
pub use measure::{Measure, Voice};
pub use part::{MultiStaffPart, Part, PartAttribute, SingleStaffPart, Staff};
pub use score::{Score, ScoreAttribute};
