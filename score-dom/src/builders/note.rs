use std::collections::BTreeSet;

use super::{
    require_duration, BuilderId, Connectable, ConnectionRequest, Requests,
};
use crate::{
    dom::{ElementId, Note},
    error::{ScoreError, ScoreResult},
    notation::{Articulation, Notation, Ornament, OrnamentKind},
    primitives::{Duration, Pitch},
};

#[derive(Debug, Clone)]
pub struct NoteBuilder {
    id: BuilderId,
    pitch: Option<Pitch>,
    duration: Option<Duration>,
    articulations: BTreeSet<Articulation>,
    ornaments: BTreeSet<OrnamentKind>,
    requests: Requests,
}
impl Default for NoteBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl NoteBuilder {
    pub fn new() -> Self {
        Self {
            id: BuilderId::next(),
            pitch: None,
            duration: None,
            articulations: BTreeSet::new(),
            ornaments: BTreeSet::new(),
            requests: Requests::default(),
        }
    }
    pub fn with(pitch: Pitch, duration: Duration) -> Self {
        let mut builder = Self::new();
        builder.set_pitch(pitch).set_duration(duration);
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
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.duration = Some(duration);
        self
    }
    pub fn articulations(&self) -> &BTreeSet<Articulation> {
        &self.articulations
    }
    pub fn add_articulation(&mut self, articulation: Articulation) -> &mut Self {
        self.articulations.insert(articulation);
        self
    }
    pub fn remove_articulation(
        &mut self,
        articulation: Articulation,
    ) -> &mut Self {
        self.articulations.remove(&articulation);
        self
    }
    pub fn ornaments(&self) -> &BTreeSet<OrnamentKind> {
        &self.ornaments
    }
    pub fn add_ornament(&mut self, ornament: OrnamentKind) -> &mut Self {
        self.ornaments.insert(ornament);
        self
    }

    /// Request a link of this note to the `target` under `notation`.
    ///
    /// The request earlier made with the same notation handle is replaced.
    pub fn connect_with(
        &mut self,
        notation: Notation,
        target: &impl Connectable,
    ) -> &mut Self {
        self.requests.set(notation, target.builder_id());
        self
    }
    pub fn disconnect(&mut self, notation: &Notation) -> &mut Self {
        self.requests.remove(notation);
        self
    }
    /// Tie this note to the following one.
    pub fn tie_to(&mut self, target: &impl Connectable) -> &mut Self {
        self.connect_with(Notation::tie(), target)
    }
    pub fn tied_to(&self) -> Option<BuilderId> {
        self.requests.target_of(&Notation::tie())
    }
    pub fn requests(&self) -> &[ConnectionRequest] {
        self.requests.get()
    }
    pub fn clear_connections(&mut self) -> &mut Self {
        self.requests.clear();
        self
    }
    /// Copy with fresh identity and without connection requests.
    pub fn duplicate(&self) -> Self {
        Self {
            id: BuilderId::next(),
            requests: Requests::default(),
            ..self.clone()
        }
    }

    /// Build the note without any score around.
    ///
    /// Fails with [ScoreError::UnresolvedReference] if the note has
    /// connection requests: they can be resolved only by
    /// [crate::builders::ScoreBuilder::build].
    pub fn build(&self) -> ScoreResult<Note> {
        self.requests.ensure_empty(self.id)?;
        self.build_local(None)
    }
    /// Chord members take duration of their chord.
    pub(crate) fn build_local(
        &self,
        chord_duration: Option<Duration>,
    ) -> ScoreResult<Note> {
        let pitch = self.pitch.ok_or_else(|| ScoreError::InvalidState {
            builder: self.id,
            reason: "pitch is not set".to_string(),
        })?;
        let duration = match chord_duration {
            Some(duration) => duration,
            None => require_duration(self.duration, self.id)?,
        };
        Ok(Note::new(
            ElementId::next(),
            pitch,
            duration,
            self.articulations.clone(),
            self.ornaments.iter().copied().map(Ornament::from).collect(),
        ))
    }
}
impl Connectable for NoteBuilder {
    fn builder_id(&self) -> BuilderId {
        self.id
    }
}
impl From<&Note> for NoteBuilder {
    fn from(note: &Note) -> Self {
        let mut builder = Self::with(note.pitch(), note.duration());
        builder.articulations = note.articulations().clone();
        builder.ornaments =
            note.ornaments().iter().filter_map(|o| o.kind()).collect();
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::NoteBuilder;
    use crate::{
        error::ScoreError,
        notation::{Articulation, Notation, OrnamentKind},
        primitives::{Duration, Pitch},
    };

    fn c4() -> Pitch {
        "C4".parse().unwrap()
    }

    #[test]
    fn build_is_repeatable() {
        let mut builder = NoteBuilder::with(c4(), Duration::quarter());
        builder
            .add_articulation(Articulation::Staccato)
            .add_ornament(OrnamentKind::Trill);
        let a = builder.build().unwrap();
        let b = builder.build().unwrap();
        assert_eq!(a, b);
        assert_ne!(a.id(), b.id());
        assert!(a.has_articulation(Articulation::Staccato));
        assert!(a.has_ornament(OrnamentKind::Trill));
        assert_eq!(NoteBuilder::from(&a).build().unwrap(), a);
    }

    #[test]
    fn missing_values() {
        let mut builder = NoteBuilder::new();
        assert!(matches!(
            builder.build(),
            Err(ScoreError::InvalidState { .. })
        ));
        builder.set_pitch(c4());
        assert!(matches!(
            builder.build(),
            Err(ScoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn requests() {
        let mut first = NoteBuilder::with(c4(), Duration::half());
        let second = NoteBuilder::with(c4(), Duration::half());
        let third = NoteBuilder::with(c4(), Duration::half());
        first.tie_to(&second).tie_to(&third);
        assert_eq!(first.tied_to(), Some(third.id()));
        assert_eq!(first.requests().len(), 1);
        first.connect_with(Notation::slur(), &second);
        assert_eq!(first.requests().len(), 2);
        match first.build() {
            Err(ScoreError::UnresolvedReference { origin, target, .. }) => {
                assert_eq!(origin, first.id());
                assert_eq!(target, third.id());
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let copy = first.duplicate();
        assert_ne!(copy.id(), first.id());
        assert!(copy.requests().is_empty());
        assert_eq!(first.clone().id(), first.id());
    }
}
