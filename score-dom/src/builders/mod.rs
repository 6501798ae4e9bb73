//! Mutable builders, from which the score is finalized.
//!
//! Builders can reference each other by identity before anything is
//! finalized: a note may be tied to a note of a measure, that has not been
//! built yet. Requests are resolved by [ScoreBuilder::build].
//!
//! Cloning a builder keeps its identity, so placing a clone twice into a
//! score places *the same* builder twice. Use `duplicate()` to get an
//! independent copy.

use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

pub mod chord;
pub mod grace;
pub mod measure;
pub mod note;
pub mod part;
pub mod rest;
pub mod score;

pub use chord::ChordBuilder;
pub use grace::{GraceNoteBuilder, GraceNoteChordBuilder};
pub use measure::MeasureBuilder;
pub use note::NoteBuilder;
pub use part::PartBuilder;
pub use rest::RestBuilder;
pub use score::ScoreBuilder;

use crate::{
    dom::Durational,
    error::{LinkKind, ScoreError, ScoreResult},
    notation::Notation,
    primitives::Duration,
};

static BUILDER_IDS: AtomicU64 = AtomicU64::new(1);

/// Identity of a builder, minted at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuilderId(u64);
impl BuilderId {
    pub(crate) fn next() -> Self {
        Self(BUILDER_IDS.fetch_add(1, Ordering::Relaxed))
    }
    pub fn get(&self) -> u64 {
        self.0
    }
}
impl Display for BuilderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builder #{}", self.0)
    }
}

/// Anything, that can be a target of a connection request.
pub trait Connectable {
    fn builder_id(&self) -> BuilderId;
}
impl Connectable for BuilderId {
    fn builder_id(&self) -> BuilderId {
        *self
    }
}

/// Request to link the builder holding it to the `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionRequest {
    notation: Notation,
    target: BuilderId,
}
impl ConnectionRequest {
    pub fn notation(&self) -> Notation {
        self.notation
    }
    pub fn target(&self) -> BuilderId {
        self.target
    }
}

/// Connection requests of one builder. One request per notation handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Requests(Vec<ConnectionRequest>);
impl Requests {
    pub fn set(&mut self, notation: Notation, target: BuilderId) {
        let request = ConnectionRequest { notation, target };
        match self.0.iter_mut().find(|r| r.notation == notation) {
            Some(existing) => *existing = request,
            None => self.0.push(request),
        }
    }
    pub fn remove(&mut self, notation: &Notation) {
        self.0.retain(|r| r.notation != *notation);
    }
    pub fn get(&self) -> &[ConnectionRequest] {
        &self.0
    }
    pub fn target_of(&self, notation: &Notation) -> Option<BuilderId> {
        self.0
            .iter()
            .find(|r| r.notation == *notation)
            .map(|r| r.target)
    }
    pub fn clear(&mut self) {
        self.0.clear()
    }
    pub fn ensure_empty(&self, source: BuilderId) -> ScoreResult<()> {
        ensure_no_requests(source, &self.0)
    }
}

/// Standalone builds have no context, to resolve requests in.
pub(crate) fn ensure_no_requests(
    source: BuilderId,
    requests: &[ConnectionRequest],
) -> ScoreResult<()> {
    match requests.first() {
        None => Ok(()),
        Some(request) => Err(ScoreError::UnresolvedReference {
            origin: source,
            target: request.target,
            link: LinkKind::Notation(request.notation.kind()),
        }),
    }
}

pub(crate) fn require_duration(
    duration: Option<Duration>,
    builder: BuilderId,
) -> ScoreResult<Duration> {
    duration.ok_or_else(|| ScoreError::InvalidState {
        builder,
        reason: "duration is not set".to_string(),
    })
}

/// Any builder, that can be placed into a voice.
#[derive(Debug, Clone)]
pub enum DurationalBuilder {
    Note(NoteBuilder),
    Rest(RestBuilder),
    Chord(ChordBuilder),
    GraceNote(GraceNoteBuilder),
    GraceNoteChord(GraceNoteChordBuilder),
}
impl DurationalBuilder {
    pub fn id(&self) -> BuilderId {
        match self {
            Self::Note(b) => b.id(),
            Self::Rest(b) => b.id(),
            Self::Chord(b) => b.id(),
            Self::GraceNote(b) => b.id(),
            Self::GraceNoteChord(b) => b.id(),
        }
    }
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Note(b) => b.duration(),
            Self::Rest(b) => b.duration(),
            Self::Chord(b) => b.duration(),
            Self::GraceNote(b) => b.display_duration(),
            Self::GraceNoteChord(b) => b.display_duration(),
        }
    }
    /// Time the element will take in the voice. None for grace notes and
    /// builders without duration.
    pub fn time_value(&self) -> Option<Duration> {
        match self.is_grace() {
            true => None,
            false => self.duration(),
        }
    }
    pub fn is_grace(&self) -> bool {
        matches!(self, Self::GraceNote(_) | Self::GraceNoteChord(_))
    }
    /// Set duration of non-grace builder.
    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        match self {
            Self::Note(b) => {
                b.set_duration(duration);
            }
            Self::Rest(b) => {
                b.set_duration(duration);
            }
            Self::Chord(b) => {
                b.set_duration(duration);
            }
            Self::GraceNote(_) | Self::GraceNoteChord(_) => (),
        }
        self
    }
    pub fn connect_with(
        &mut self,
        notation: Notation,
        target: &impl Connectable,
    ) -> &mut Self {
        match self {
            Self::Note(b) => {
                b.connect_with(notation, target);
            }
            Self::Rest(b) => {
                b.connect_with(notation, target);
            }
            Self::Chord(b) => {
                b.connect_with(notation, target);
            }
            Self::GraceNote(b) => {
                b.connect_with(notation, target);
            }
            Self::GraceNoteChord(b) => {
                b.connect_with(notation, target);
            }
        }
        self
    }
    pub fn requests(&self) -> &[ConnectionRequest] {
        match self {
            Self::Note(b) => b.requests(),
            Self::Rest(b) => b.requests(),
            Self::Chord(b) => b.requests(),
            Self::GraceNote(b) => b.requests(),
            Self::GraceNoteChord(b) => b.requests(),
        }
    }
    /// Standalone build, see builders of every variant.
    pub fn build(&self) -> ScoreResult<Durational> {
        Ok(match self {
            Self::Note(b) => b.build()?.into(),
            Self::Rest(b) => b.build()?.into(),
            Self::Chord(b) => b.build()?.into(),
            Self::GraceNote(b) => b.build()?.into(),
            Self::GraceNoteChord(b) => b.build()?.into(),
        })
    }
}
impl Connectable for DurationalBuilder {
    fn builder_id(&self) -> BuilderId {
        self.id()
    }
}
impl From<NoteBuilder> for DurationalBuilder {
    fn from(value: NoteBuilder) -> Self {
        Self::Note(value)
    }
}
impl From<RestBuilder> for DurationalBuilder {
    fn from(value: RestBuilder) -> Self {
        Self::Rest(value)
    }
}
impl From<ChordBuilder> for DurationalBuilder {
    fn from(value: ChordBuilder) -> Self {
        Self::Chord(value)
    }
}
impl From<GraceNoteBuilder> for DurationalBuilder {
    fn from(value: GraceNoteBuilder) -> Self {
        Self::GraceNote(value)
    }
}
impl From<GraceNoteChordBuilder> for DurationalBuilder {
    fn from(value: GraceNoteChordBuilder) -> Self {
        Self::GraceNoteChord(value)
    }
}
impl From<&Durational> for DurationalBuilder {
    fn from(value: &Durational) -> Self {
        match value {
            Durational::Note(n) => Self::Note(n.into()),
            Durational::Rest(r) => Self::Rest(r.into()),
            Durational::Chord(c) => Self::Chord(c.into()),
            Durational::GraceNote(g) => Self::GraceNote(g.into()),
            Durational::GraceNoteChord(g) => Self::GraceNoteChord(g.into()),
        }
    }
}
