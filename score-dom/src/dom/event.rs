//! Finalized durational elements, that are held by voices.
//!
//! Elements are immutable for the outside world. Connections and grace
//! note attachments are written only while the score is finalized.

use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicU64, Ordering},
};

use derivative::Derivative;

use crate::{
    notation::{
        Articulation, Connection, GraceKind, NotationKind, Ornament,
        OrnamentKind,
    },
    primitives::{Duration, Pitch, Position},
};

static ELEMENT_IDS: AtomicU64 = AtomicU64::new(1);

/// Identity of a finalized element, unique in the process.
///
/// Not a part of element equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);
impl ElementId {
    pub(crate) fn next() -> Self {
        Self(ELEMENT_IDS.fetch_add(1, Ordering::Relaxed))
    }
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Read access to resolved connections.
pub trait Connected {
    fn connections(&self) -> &[Connection];

    fn connection(&self, kind: NotationKind) -> Option<&Connection> {
        self.connections().iter().find(|c| c.kind() == kind)
    }
    fn has_connection(&self, kind: NotationKind) -> bool {
        self.connection(kind).is_some()
    }
    fn is_tied_to_following(&self) -> bool {
        self.connection(NotationKind::Tie)
            .map(|c| c.following().is_some())
            .unwrap_or(false)
    }
    fn is_tied_from_previous(&self) -> bool {
        self.connection(NotationKind::Tie)
            .map(|c| c.preceding().is_some())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq)]
pub struct Note {
    #[derivative(PartialEq = "ignore")]
    id: ElementId,
    pitch: Pitch,
    duration: Duration,
    articulations: BTreeSet<Articulation>,
    ornaments: Vec<Ornament>,
    connections: Vec<Connection>,
}
impl Note {
    pub(crate) fn new(
        id: ElementId,
        pitch: Pitch,
        duration: Duration,
        articulations: BTreeSet<Articulation>,
        ornaments: Vec<Ornament>,
    ) -> Self {
        Self {
            id,
            pitch,
            duration,
            articulations,
            ornaments,
            connections: Vec::new(),
        }
    }
    pub fn id(&self) -> ElementId {
        self.id
    }
    pub fn pitch(&self) -> Pitch {
        self.pitch
    }
    pub fn duration(&self) -> Duration {
        self.duration
    }
    pub fn articulations(&self) -> &BTreeSet<Articulation> {
        &self.articulations
    }
    pub fn has_articulation(&self, articulation: Articulation) -> bool {
        self.articulations.contains(&articulation)
    }
    pub fn ornaments(&self) -> &[Ornament] {
        &self.ornaments
    }
    pub fn has_ornament(&self, kind: OrnamentKind) -> bool {
        has_ornament(&self.ornaments, kind)
    }
    /// Positions of grace elements played before this note.
    pub fn grace_notes(&self) -> &[Position] {
        grace_notes(&self.ornaments)
    }
    pub fn succeeding_grace_notes(&self) -> &[Position] {
        succeeding_grace_notes(&self.ornaments)
    }
    pub(crate) fn connections_mut(&mut self) -> &mut Vec<Connection> {
        &mut self.connections
    }
    pub(crate) fn ornaments_mut(&mut self) -> &mut Vec<Ornament> {
        &mut self.ornaments
    }
}
impl Connected for Note {
    fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq)]
pub struct Rest {
    #[derivative(PartialEq = "ignore")]
    id: ElementId,
    duration: Duration,
    connections: Vec<Connection>,
}
impl Rest {
    pub(crate) fn new(id: ElementId, duration: Duration) -> Self {
        Self {
            id,
            duration,
            connections: Vec::new(),
        }
    }
    pub fn id(&self) -> ElementId {
        self.id
    }
    pub fn duration(&self) -> Duration {
        self.duration
    }
}
impl Connected for Rest {
    fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

/// Notes sounding together, sorted from the lowest.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq)]
pub struct Chord {
    #[derivative(PartialEq = "ignore")]
    id: ElementId,
    notes: Vec<Note>,
    duration: Duration,
    articulations: BTreeSet<Articulation>,
    ornaments: Vec<Ornament>,
    connections: Vec<Connection>,
}
impl Chord {
    pub(crate) fn new(
        id: ElementId,
        notes: Vec<Note>,
        duration: Duration,
        articulations: BTreeSet<Articulation>,
        ornaments: Vec<Ornament>,
    ) -> Self {
        Self {
            id,
            notes,
            duration,
            articulations,
            ornaments,
            connections: Vec::new(),
        }
    }
    pub fn id(&self) -> ElementId {
        self.id
    }
    pub fn duration(&self) -> Duration {
        self.duration
    }
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
    /// Note by index, counted from the lowest.
    pub fn note(&self, from_lowest: usize) -> Option<&Note> {
        self.notes.get(from_lowest)
    }
    pub fn lowest(&self) -> Option<&Note> {
        self.notes.first()
    }
    pub fn highest(&self) -> Option<&Note> {
        self.notes.last()
    }
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }
    pub fn contains(&self, pitch: &Pitch) -> bool {
        self.notes.iter().any(|n| n.pitch() == *pitch)
    }
    pub fn pitches(&self) -> Vec<Pitch> {
        self.notes.iter().map(|n| n.pitch()).collect()
    }
    pub fn articulations(&self) -> &BTreeSet<Articulation> {
        &self.articulations
    }
    pub fn has_articulation(&self, articulation: Articulation) -> bool {
        self.articulations.contains(&articulation)
    }
    pub fn ornaments(&self) -> &[Ornament] {
        &self.ornaments
    }
    pub fn has_ornament(&self, kind: OrnamentKind) -> bool {
        has_ornament(&self.ornaments, kind)
    }
    pub fn grace_notes(&self) -> &[Position] {
        grace_notes(&self.ornaments)
    }
    pub fn succeeding_grace_notes(&self) -> &[Position] {
        succeeding_grace_notes(&self.ornaments)
    }
    pub(crate) fn connections_mut(&mut self) -> &mut Vec<Connection> {
        &mut self.connections
    }
    pub(crate) fn ornaments_mut(&mut self) -> &mut Vec<Ornament> {
        &mut self.ornaments
    }
    pub(crate) fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }
}
impl Connected for Chord {
    fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

/// Ornamental note, that takes no time in its voice.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq)]
pub struct GraceNote {
    #[derivative(PartialEq = "ignore")]
    id: ElementId,
    pitch: Pitch,
    display_duration: Duration,
    kind: GraceKind,
    articulations: BTreeSet<Articulation>,
    connections: Vec<Connection>,
    principal: Option<Position>,
}
impl GraceNote {
    pub(crate) fn new(
        id: ElementId,
        pitch: Pitch,
        display_duration: Duration,
        kind: GraceKind,
        articulations: BTreeSet<Articulation>,
    ) -> Self {
        Self {
            id,
            pitch,
            display_duration,
            kind,
            articulations,
            connections: Vec::new(),
            principal: None,
        }
    }
    pub fn id(&self) -> ElementId {
        self.id
    }
    pub fn pitch(&self) -> Pitch {
        self.pitch
    }
    /// Duration the grace note is written with.
    pub fn display_duration(&self) -> Duration {
        self.display_duration
    }
    pub fn kind(&self) -> GraceKind {
        self.kind
    }
    pub fn articulations(&self) -> &BTreeSet<Articulation> {
        &self.articulations
    }
    /// Position of the note this grace note ornaments.
    pub fn principal(&self) -> Option<Position> {
        self.principal
    }
    pub(crate) fn connections_mut(&mut self) -> &mut Vec<Connection> {
        &mut self.connections
    }
}
impl Connected for GraceNote {
    fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq)]
pub struct GraceNoteChord {
    #[derivative(PartialEq = "ignore")]
    id: ElementId,
    notes: Vec<GraceNote>,
    display_duration: Duration,
    kind: GraceKind,
    connections: Vec<Connection>,
    principal: Option<Position>,
}
impl GraceNoteChord {
    pub(crate) fn new(
        id: ElementId,
        notes: Vec<GraceNote>,
        display_duration: Duration,
        kind: GraceKind,
    ) -> Self {
        Self {
            id,
            notes,
            display_duration,
            kind,
            connections: Vec::new(),
            principal: None,
        }
    }
    pub fn id(&self) -> ElementId {
        self.id
    }
    pub fn notes(&self) -> &[GraceNote] {
        &self.notes
    }
    pub fn note(&self, from_lowest: usize) -> Option<&GraceNote> {
        self.notes.get(from_lowest)
    }
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }
    pub fn display_duration(&self) -> Duration {
        self.display_duration
    }
    pub fn kind(&self) -> GraceKind {
        self.kind
    }
    pub fn principal(&self) -> Option<Position> {
        self.principal
    }
    pub(crate) fn connections_mut(&mut self) -> &mut Vec<Connection> {
        &mut self.connections
    }
}
impl Connected for GraceNoteChord {
    fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

fn has_ornament(ornaments: &[Ornament], kind: OrnamentKind) -> bool {
    ornaments.iter().any(|o| o.kind() == Some(kind))
}
fn grace_notes(ornaments: &[Ornament]) -> &[Position] {
    ornaments
        .iter()
        .find(|o| matches!(o, Ornament::GraceNotes(_)))
        .map(|o| o.grace_positions())
        .unwrap_or(&[])
}
fn succeeding_grace_notes(ornaments: &[Ornament]) -> &[Position] {
    ornaments
        .iter()
        .find(|o| matches!(o, Ornament::SucceedingGraceNotes(_)))
        .map(|o| o.grace_positions())
        .unwrap_or(&[])
}

/// Anything, that can stand in a voice.
#[derive(Debug, Clone, PartialEq)]
pub enum Durational {
    Note(Note),
    Rest(Rest),
    Chord(Chord),
    GraceNote(GraceNote),
    GraceNoteChord(GraceNoteChord),
}
impl Durational {
    pub fn id(&self) -> ElementId {
        match self {
            Self::Note(n) => n.id(),
            Self::Rest(r) => r.id(),
            Self::Chord(c) => c.id(),
            Self::GraceNote(g) => g.id(),
            Self::GraceNoteChord(g) => g.id(),
        }
    }
    /// Written duration. For grace elements it is the display duration.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Note(n) => n.duration(),
            Self::Rest(r) => r.duration(),
            Self::Chord(c) => c.duration(),
            Self::GraceNote(g) => g.display_duration(),
            Self::GraceNoteChord(g) => g.display_duration(),
        }
    }
    /// Time the element occupies in its voice. None for grace elements.
    pub fn time_value(&self) -> Option<Duration> {
        match self {
            Self::GraceNote(_) | Self::GraceNoteChord(_) => None,
            other => Some(other.duration()),
        }
    }
    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Rest(_))
    }
    pub fn is_grace(&self) -> bool {
        matches!(self, Self::GraceNote(_) | Self::GraceNoteChord(_))
    }
    pub fn is_pitched(&self) -> bool {
        !self.is_rest()
    }
    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Self::Note(n) => Some(n),
            _ => None,
        }
    }
    pub fn as_rest(&self) -> Option<&Rest> {
        match self {
            Self::Rest(r) => Some(r),
            _ => None,
        }
    }
    pub fn as_chord(&self) -> Option<&Chord> {
        match self {
            Self::Chord(c) => Some(c),
            _ => None,
        }
    }
    pub fn as_grace_note(&self) -> Option<&GraceNote> {
        match self {
            Self::GraceNote(g) => Some(g),
            _ => None,
        }
    }
    pub fn as_grace_note_chord(&self) -> Option<&GraceNoteChord> {
        match self {
            Self::GraceNoteChord(g) => Some(g),
            _ => None,
        }
    }
    pub fn member_count(&self) -> usize {
        match self {
            Self::Chord(c) => c.note_count(),
            Self::GraceNoteChord(g) => g.note_count(),
            _ => 0,
        }
    }
    /// Ids of chord notes, lowest first.
    pub(crate) fn member_ids(&self) -> Vec<ElementId> {
        match self {
            Self::Chord(c) => c.notes().iter().map(|n| n.id()).collect(),
            Self::GraceNoteChord(g) => g.notes().iter().map(|n| n.id()).collect(),
            _ => Vec::new(),
        }
    }
    /// Connections of a chord note (or of the element itself with None).
    pub fn connections_of(&self, member: Option<usize>) -> Option<&[Connection]> {
        match (self, member) {
            (_, None) => Some(self.connections()),
            (Self::Chord(c), Some(i)) => c.note(i).map(|n| n.connections()),
            (Self::GraceNoteChord(g), Some(i)) => {
                g.note(i).map(|n| n.connections())
            }
            _ => None,
        }
    }
    pub(crate) fn connections_of_mut(
        &mut self,
        member: Option<usize>,
    ) -> Option<&mut Vec<Connection>> {
        match (self, member) {
            (Self::Note(n), None) => Some(n.connections_mut()),
            (Self::Rest(r), None) => Some(&mut r.connections),
            (Self::Chord(c), None) => Some(c.connections_mut()),
            (Self::GraceNote(g), None) => Some(g.connections_mut()),
            (Self::GraceNoteChord(g), None) => Some(g.connections_mut()),
            (Self::Chord(c), Some(i)) => {
                c.notes_mut().get_mut(i).map(|n| n.connections_mut())
            }
            (Self::GraceNoteChord(g), Some(i)) => {
                g.notes.get_mut(i).map(|n| n.connections_mut())
            }
            _ => None,
        }
    }
    pub(crate) fn ornaments_mut(&mut self) -> Option<&mut Vec<Ornament>> {
        match self {
            Self::Note(n) => Some(n.ornaments_mut()),
            Self::Chord(c) => Some(c.ornaments_mut()),
            _ => None,
        }
    }
    pub(crate) fn set_principal(&mut self, principal: Position) {
        match self {
            Self::GraceNote(g) => g.principal = Some(principal),
            Self::GraceNoteChord(g) => g.principal = Some(principal),
            _ => (),
        }
    }
    /// Bring connections and ornaments into canonical order.
    pub(crate) fn normalize(&mut self) {
        match self {
            Self::Note(n) => {
                n.connections.sort();
                n.ornaments.sort();
            }
            Self::Rest(r) => r.connections.sort(),
            Self::Chord(c) => {
                c.connections.sort();
                c.ornaments.sort();
                c.notes.iter_mut().for_each(|n| n.connections.sort());
            }
            Self::GraceNote(g) => g.connections.sort(),
            Self::GraceNoteChord(g) => {
                g.connections.sort();
                g.notes.iter_mut().for_each(|n| n.connections.sort());
            }
        }
    }
}
impl Connected for Durational {
    fn connections(&self) -> &[Connection] {
        match self {
            Self::Note(n) => n.connections(),
            Self::Rest(r) => r.connections(),
            Self::Chord(c) => c.connections(),
            Self::GraceNote(g) => g.connections(),
            Self::GraceNoteChord(g) => g.connections(),
        }
    }
}
impl From<Note> for Durational {
    fn from(value: Note) -> Self {
        Self::Note(value)
    }
}
impl From<Rest> for Durational {
    fn from(value: Rest) -> Self {
        Self::Rest(value)
    }
}
impl From<Chord> for Durational {
    fn from(value: Chord) -> Self {
        Self::Chord(value)
    }
}
impl From<GraceNote> for Durational {
    fn from(value: GraceNote) -> Self {
        Self::GraceNote(value)
    }
}
impl From<GraceNoteChord> for Durational {
    fn from(value: GraceNoteChord) -> Self {
        Self::GraceNoteChord(value)
    }
}
