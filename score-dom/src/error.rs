use std::fmt::Display;

use crate::{
    builders::BuilderId,
    notation::NotationKind,
    primitives::{
        Duration, DurationError, Offset, Position, TimeSignature, ValueError,
    },
};

/// What kind of link failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Notation(NotationKind),
    GraceAttachment,
}
impl Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notation(kind) => write!(f, "{}", kind),
            Self::GraceAttachment => write!(f, "grace note attachment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    TimeSignature,
    KeySignature,
    Clef,
}
impl Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeSignature => write!(f, "time signature"),
            Self::KeySignature => write!(f, "key signature"),
            Self::Clef => write!(f, "clef"),
        }
    }
}

/// What differs between a staff and the first staff of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentIssue {
    MeasureCount { expected: usize, found: usize },
    TimeSignature {
        expected: TimeSignature,
        found: TimeSignature,
    },
    Partial { expected: bool, found: bool },
}
impl Display for AlignmentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeasureCount { expected, found } => {
                write!(f, "expected {} measures, found {}", expected, found)
            }
            Self::TimeSignature { expected, found } => write!(
                f,
                "expected time signature {}, found {}",
                expected, found
            ),
            Self::Partial { expected, found } => write!(
                f,
                "expected partial measure: {}, found: {}",
                expected, found
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("Invalid state of {builder}: {reason}")]
    InvalidState { builder: BuilderId, reason: String },
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("Unresolved reference: {origin} requests {link} to {target}, which is not in the score")]
    UnresolvedReference {
        origin: BuilderId,
        target: BuilderId,
        link: LinkKind,
    },
    #[error("Ambiguous reference: {builder} takes part in {link}, but is placed {occurrences} times")]
    AmbiguousReference {
        builder: BuilderId,
        link: LinkKind,
        occurrences: usize,
    },
    #[error("Cycle: {link} chain returns to {builder}")]
    Cycle { builder: BuilderId, link: LinkKind },
    #[error("Foreign voice: {link} from ({origin}) to ({target})")]
    ForeignVoice {
        link: LinkKind,
        origin: Position,
        target: Position,
    },
    #[error("Invalid connection: {link} from ({origin}) to ({target}): {reason}")]
    InvalidConnection {
        link: LinkKind,
        origin: Position,
        target: Position,
        reason: String,
    },
    #[error(
        "Measure overflow: part {part_index}, staff {staff_number}, \
        measure index {measure_index}, voice {voice_number}: \
        element {element_index} ends at {reached}, measure is {capacity}"
    )]
    MeasureOverflow {
        part_index: usize,
        staff_number: u32,
        measure_index: usize,
        voice_number: u32,
        element_index: usize,
        capacity: Duration,
        reached: Offset,
    },
    #[error(
        "Measure underfill: part {part_index}, staff {staff_number}, \
        measure index {measure_index}, voice {voice_number}: \
        voice ends at {reached}, measure is {capacity}"
    )]
    MeasureUnderfill {
        part_index: usize,
        staff_number: u32,
        measure_index: usize,
        voice_number: u32,
        capacity: Duration,
        reached: Offset,
    },
    #[error(
        "Missing {attribute}: part {part_index}, staff {staff_number}, \
        measure index {measure_index}"
    )]
    MissingAttribute {
        part_index: usize,
        staff_number: u32,
        measure_index: usize,
        attribute: AttributeKind,
    },
    #[error(
        "Invalid attribute: part {part_index}, staff {staff_number}, \
        measure index {measure_index}: {reason}"
    )]
    InvalidAttribute {
        part_index: usize,
        staff_number: u32,
        measure_index: usize,
        reason: String,
    },
    #[error(
        "Score alignment: part {part_index}, staff {staff_number}, \
        measure index {measure_index}: {issue}"
    )]
    ScoreAlignment {
        part_index: usize,
        staff_number: u32,
        measure_index: usize,
        issue: AlignmentIssue,
    },
    #[error("Score has no parts")]
    EmptyScore,
    #[error("Part {part_index} has no measures")]
    EmptyPart { part_index: usize },
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}
pub type ScoreResult<T> = Result<T, ScoreError>;
