//! Value types, from which the score is constructed.
//!
//! Everything here is small, `Copy` where possible and knows nothing about
//! builders or finalized score.

pub mod attributes;
pub mod duration;
pub mod fraction_tools;
pub mod pitch;
pub mod position;
pub mod time_map;

pub use attributes::{
    Barline, Clef, ClefSymbol, KeySignature, MeasureAttributes, TimeSignature,
};
pub use duration::{Duration, Offset};
pub use fraction_tools::normalize_fraction;
pub use pitch::{Accidental, Pitch, PitchBase};
pub use position::{OffsetPosition, Position};
pub use time_map::{MeasureInfo, TimeMap};

/// Maximum amount of dots a duration may carry.
pub const MAX_DOTS: u8 = 5;
pub const MAX_OCTAVE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    #[error("Can not parse duration from `{0}`")]
    Parse(String),
}
pub type DurationResult<T> = Result<T, DurationError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    #[error("Can not parse value from `{0}`")]
    Parse(String),
}
pub type ValueResult<T> = Result<T, ValueError>;
