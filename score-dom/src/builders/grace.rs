//! Builders of grace notes and grace note chords.
//!
//! Grace elements stand in a voice next to their principal note, but take
//! no time. The principal is set by [GraceNoteBuilder::attach_to]: grace
//! elements placed before the principal become its grace notes, placed
//! after it become succeeding grace notes.

use std::collections::BTreeSet;

use super::{
    ensure_no_requests, BuilderId, Connectable, ConnectionRequest, Requests,
};
use crate::{
    dom::{ElementId, GraceNote, GraceNoteChord},
    error::{LinkKind, ScoreError, ScoreResult},
    notation::{Articulation, GraceKind, Notation},
    primitives::{Duration, Pitch},
};

fn require_display_duration(
    duration: Option<Duration>,
    builder: BuilderId,
) -> ScoreResult<Duration> {
    duration.ok_or_else(|| ScoreError::InvalidState {
        builder,
        reason: "display duration is not set".to_string(),
    })
}

fn ensure_detached(
    source: BuilderId,
    principal: Option<BuilderId>,
) -> ScoreResult<()> {
    match principal {
        None => Ok(()),
        Some(target) => Err(ScoreError::UnresolvedReference {
            origin: source,
            target,
            link: LinkKind::GraceAttachment,
        }),
    }
}

#[derive(Debug, Clone)]
pub struct GraceNoteBuilder {
    id: BuilderId,
    pitch: Option<Pitch>,
    display_duration: Option<Duration>,
    kind: GraceKind,
    articulations: BTreeSet<Articulation>,
    requests: Requests,
    principal: Option<BuilderId>,
}
impl Default for GraceNoteBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl GraceNoteBuilder {
    pub fn new() -> Self {
        Self {
            id: BuilderId::next(),
            pitch: None,
            display_duration: None,
            kind: GraceKind::default(),
            articulations: BTreeSet::new(),
            requests: Requests::default(),
            principal: None,
        }
    }
    pub fn with(pitch: Pitch, display_duration: Duration) -> Self {
        let mut builder = Self::new();
        builder.pitch = Some(pitch);
        builder.display_duration = Some(display_duration);
        builder
    }
    pub fn id(&self) -> BuilderId {
        self.id
    }
    pub fn pitch(&self) -> Option<Pitch> {
        self.pitch
    }
    pub fn set_pitch(&mut self, pitch: Pitch) -> &mut Self {
        self.pitch = Some(pitch);
        self
    }
    pub fn display_duration(&self) -> Option<Duration> {
        self.display_duration
    }
    pub fn set_display_duration(&mut self, duration: Duration) -> &mut Self {
        self.display_duration = Some(duration);
        self
    }
    pub fn kind(&self) -> GraceKind {
        self.kind
    }
    pub fn set_kind(&mut self, kind: GraceKind) -> &mut Self {
        self.kind = kind;
        self
    }
    pub fn articulations(&self) -> &BTreeSet<Articulation> {
        &self.articulations
    }
    pub fn add_articulation(&mut self, articulation: Articulation) -> &mut Self {
        self.articulations.insert(articulation);
        self
    }
    /// Ornament the `principal` note or chord with this grace note.
    pub fn attach_to(&mut self, principal: &impl Connectable) -> &mut Self {
        self.principal = Some(principal.builder_id());
        self
    }
    pub fn detach(&mut self) -> &mut Self {
        self.principal = None;
        self
    }
    pub fn principal(&self) -> Option<BuilderId> {
        self.principal
    }
    pub fn connect_with(
        &mut self,
        notation: Notation,
        target: &impl Connectable,
    ) -> &mut Self {
        self.requests.set(notation, target.builder_id());
        self
    }
    pub fn tie_to(&mut self, target: &impl Connectable) -> &mut Self {
        self.connect_with(Notation::tie(), target)
    }
    pub fn requests(&self) -> &[ConnectionRequest] {
        self.requests.get()
    }
    pub fn clear_connections(&mut self) -> &mut Self {
        self.requests.clear();
        self
    }
    /// Copy with fresh identity, without requests and principal.
    pub fn duplicate(&self) -> Self {
        Self {
            id: BuilderId::next(),
            requests: Requests::default(),
            principal: None,
            ..self.clone()
        }
    }
    pub fn build(&self) -> ScoreResult<GraceNote> {
        self.requests.ensure_empty(self.id)?;
        ensure_detached(self.id, self.principal)?;
        self.build_local(None)
    }
    pub(crate) fn build_local(
        &self,
        chord_duration: Option<Duration>,
    ) -> ScoreResult<GraceNote> {
        let pitch = self.pitch.ok_or_else(|| ScoreError::InvalidState {
            builder: self.id,
            reason: "pitch is not set".to_string(),
        })?;
        let duration = match chord_duration {
            Some(duration) => duration,
            None => require_display_duration(self.display_duration, self.id)?,
        };
        Ok(GraceNote::new(
            ElementId::next(),
            pitch,
            duration,
            self.kind,
            self.articulations.clone(),
        ))
    }
}
impl Connectable for GraceNoteBuilder {
    fn builder_id(&self) -> BuilderId {
        self.id
    }
}
impl From<&GraceNote> for GraceNoteBuilder {
    fn from(grace: &GraceNote) -> Self {
        let mut builder = Self::with(grace.pitch(), grace.display_duration());
        builder.kind = grace.kind();
        builder.articulations = grace.articulations().clone();
        builder
    }
}

#[derive(Debug, Clone)]
pub struct GraceNoteChordBuilder {
    id: BuilderId,
    notes: Vec<GraceNoteBuilder>,
    display_duration: Option<Duration>,
    kind: GraceKind,
    requests: Requests,
    principal: Option<BuilderId>,
}
impl Default for GraceNoteChordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl GraceNoteChordBuilder {
    pub fn new() -> Self {
        Self {
            id: BuilderId::next(),
            notes: Vec::new(),
            display_duration: None,
            kind: GraceKind::default(),
            requests: Requests::default(),
            principal: None,
        }
    }
    pub fn from_pitches(
        pitches: impl IntoIterator<Item = Pitch>,
        display_duration: Duration,
    ) -> Self {
        let mut builder = Self::new();
        builder.display_duration = Some(display_duration);
        builder.notes = pitches
            .into_iter()
            .map(|p| GraceNoteBuilder::with(p, display_duration))
            .collect();
        builder
    }
    pub fn id(&self) -> BuilderId {
        self.id
    }
    pub fn add(&mut self, note: GraceNoteBuilder) -> &mut Self {
        self.notes.push(note);
        self
    }
    pub fn notes(&self) -> &[GraceNoteBuilder] {
        &self.notes
    }
    pub fn notes_mut(&mut self) -> &mut Vec<GraceNoteBuilder> {
        &mut self.notes
    }
    pub fn display_duration(&self) -> Option<Duration> {
        self.display_duration
    }
    pub fn set_display_duration(&mut self, duration: Duration) -> &mut Self {
        self.display_duration = Some(duration);
        for note in self.notes.iter_mut() {
            note.set_display_duration(duration);
        }
        self
    }
    pub fn kind(&self) -> GraceKind {
        self.kind
    }
    pub fn set_kind(&mut self, kind: GraceKind) -> &mut Self {
        self.kind = kind;
        self
    }
    pub fn attach_to(&mut self, principal: &impl Connectable) -> &mut Self {
        self.principal = Some(principal.builder_id());
        self
    }
    pub fn principal(&self) -> Option<BuilderId> {
        self.principal
    }
    pub fn connect_with(
        &mut self,
        notation: Notation,
        target: &impl Connectable,
    ) -> &mut Self {
        self.requests.set(notation, target.builder_id());
        self
    }
    pub fn requests(&self) -> &[ConnectionRequest] {
        self.requests.get()
    }
    pub fn duplicate(&self) -> Self {
        Self {
            id: BuilderId::next(),
            notes: self.notes.iter().map(|n| n.duplicate()).collect(),
            requests: Requests::default(),
            principal: None,
            ..self.clone()
        }
    }
    pub fn build(&self) -> ScoreResult<GraceNoteChord> {
        self.requests.ensure_empty(self.id)?;
        ensure_detached(self.id, self.principal)?;
        for note in self.notes.iter() {
            ensure_no_requests(note.id(), note.requests())?;
        }
        self.build_local().map(|(chord, _)| chord)
    }
    pub(crate) fn build_local(
        &self,
    ) -> ScoreResult<(GraceNoteChord, Vec<&GraceNoteBuilder>)> {
        if self.notes.is_empty() {
            return Err(ScoreError::InvalidState {
                builder: self.id,
                reason: "grace note chord has no notes".to_string(),
            });
        }
        let duration = require_display_duration(self.display_duration, self.id)?;
        let mut notes = self
            .notes
            .iter()
            .map(|b| Ok((b.build_local(Some(duration))?, b)))
            .collect::<ScoreResult<Vec<(GraceNote, &GraceNoteBuilder)>>>()?;
        notes.sort_by_key(|(note, _)| note.pitch());
        let (notes, builders) = notes.into_iter().unzip();
        Ok((
            GraceNoteChord::new(ElementId::next(), notes, duration, self.kind),
            builders,
        ))
    }
}
impl Connectable for GraceNoteChordBuilder {
    fn builder_id(&self) -> BuilderId {
        self.id
    }
}
impl From<&GraceNoteChord> for GraceNoteChordBuilder {
    fn from(chord: &GraceNoteChord) -> Self {
        let mut builder = Self::new();
        builder.notes = chord.notes().iter().map(GraceNoteBuilder::from).collect();
        builder.display_duration = Some(chord.display_duration());
        builder.kind = chord.kind();
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::{GraceNoteBuilder, GraceNoteChordBuilder};
    use crate::{
        builders::NoteBuilder,
        error::{LinkKind, ScoreError},
        notation::GraceKind,
        primitives::{Duration, Pitch},
    };

    fn pitch(name: &str) -> Pitch {
        name.parse().unwrap()
    }

    #[test]
    fn grace_note() {
        let mut builder =
            GraceNoteBuilder::with(pitch("D5"), Duration::eighth());
        builder.set_kind(GraceKind::Appoggiatura);
        let grace = builder.build().unwrap();
        assert_eq!(grace.display_duration(), Duration::eighth());
        assert_eq!(grace.kind(), GraceKind::Appoggiatura);
        assert_eq!(grace.principal(), None);

        let principal = NoteBuilder::with(pitch("C5"), Duration::quarter());
        builder.attach_to(&principal);
        assert!(matches!(
            builder.build(),
            Err(ScoreError::UnresolvedReference {
                link: LinkKind::GraceAttachment,
                ..
            })
        ));
        assert_eq!(builder.duplicate().principal(), None);
    }

    #[test]
    fn grace_chord() {
        let chord = GraceNoteChordBuilder::from_pitches(
            vec![pitch("E5"), pitch("C5")],
            Duration::sixteenth(),
        )
        .build()
        .unwrap();
        assert_eq!(chord.note_count(), 2);
        assert_eq!(chord.note(0).map(|n| n.pitch()), Some(pitch("C5")));
        assert!(GraceNoteChordBuilder::new().build().is_err());
    }
}
