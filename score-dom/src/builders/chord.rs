use std::collections::BTreeSet;

use super::{
    ensure_no_requests, require_duration, BuilderId, Connectable,
    ConnectionRequest, NoteBuilder, Requests,
};
use crate::{
    dom::{Chord, ElementId, Note},
    error::{ScoreError, ScoreResult},
    notation::{Articulation, Notation, Ornament, OrnamentKind},
    primitives::{Duration, Pitch},
};

/// Owns builders of its notes. Notes take the chord duration.
#[derive(Debug, Clone)]
pub struct ChordBuilder {
    id: BuilderId,
    notes: Vec<NoteBuilder>,
    duration: Option<Duration>,
    articulations: BTreeSet<Articulation>,
    ornaments: BTreeSet<OrnamentKind>,
    requests: Requests,
}
impl Default for ChordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl ChordBuilder {
    pub fn new() -> Self {
        Self {
            id: BuilderId::next(),
            notes: Vec::new(),
            duration: None,
            articulations: BTreeSet::new(),
            ornaments: BTreeSet::new(),
            requests: Requests::default(),
        }
    }
    /// Chord duration is taken from the first note, that has it.
    pub fn from_notes(notes: impl IntoIterator<Item = NoteBuilder>) -> Self {
        let mut builder = Self::new();
        builder.notes = notes.into_iter().collect();
        builder.duration = builder.notes.iter().find_map(|n| n.duration());
        builder
    }
    pub fn from_pitches(
        pitches: impl IntoIterator<Item = Pitch>,
        duration: Duration,
    ) -> Self {
        let mut builder = Self::new();
        builder.set_duration(duration);
        for pitch in pitches {
            builder.add_pitch(pitch);
        }
        builder
    }
    pub fn id(&self) -> BuilderId {
        self.id
    }
    pub fn add(&mut self, note: NoteBuilder) -> &mut Self {
        self.notes.push(note);
        self
    }
    pub fn add_pitch(&mut self, pitch: Pitch) -> &mut Self {
        let mut note = NoteBuilder::new();
        note.set_pitch(pitch);
        if let Some(duration) = self.duration {
            note.set_duration(duration);
        }
        self.add(note)
    }
    pub fn remove_if(
        &mut self,
        predicate: impl Fn(&NoteBuilder) -> bool,
    ) -> &mut Self {
        self.notes.retain(|n| !predicate(n));
        self
    }
    pub fn notes(&self) -> &[NoteBuilder] {
        &self.notes
    }
    pub fn notes_mut(&mut self) -> &mut Vec<NoteBuilder> {
        &mut self.notes
    }
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
    /// Set duration of the chord and of all its notes.
    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.duration = Some(duration);
        for note in self.notes.iter_mut() {
            note.set_duration(duration);
        }
        self
    }
    pub fn articulations(&self) -> &BTreeSet<Articulation> {
        &self.articulations
    }
    pub fn add_articulation(&mut self, articulation: Articulation) -> &mut Self {
        self.articulations.insert(articulation);
        self
    }
    pub fn ornaments(&self) -> &BTreeSet<OrnamentKind> {
        &self.ornaments
    }
    pub fn add_ornament(&mut self, ornament: OrnamentKind) -> &mut Self {
        self.ornaments.insert(ornament);
        self
    }
    /// Link the whole chord. A tie on the chord is rejected at build time,
    /// tie the member builders from [`Self::notes_mut`] instead.
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
    pub fn clear_connections(&mut self) -> &mut Self {
        self.requests.clear();
        self
    }
    /// Notes are duplicated as well.
    pub fn duplicate(&self) -> Self {
        Self {
            id: BuilderId::next(),
            notes: self.notes.iter().map(|n| n.duplicate()).collect(),
            requests: Requests::default(),
            ..self.clone()
        }
    }
    pub fn build(&self) -> ScoreResult<Chord> {
        self.requests.ensure_empty(self.id)?;
        for note in self.notes.iter() {
            ensure_no_requests(note.id(), note.requests())?;
        }
        self.build_local().map(|(chord, _)| chord)
    }
    /// Chord with notes sorted from the lowest, and the builders of its
    /// notes in the same order.
    pub(crate) fn build_local(
        &self,
    ) -> ScoreResult<(Chord, Vec<&NoteBuilder>)> {
        if self.notes.is_empty() {
            return Err(ScoreError::InvalidState {
                builder: self.id,
                reason: "chord has no notes".to_string(),
            });
        }
        let duration = require_duration(self.duration, self.id)?;
        let mut notes = self
            .notes
            .iter()
            .map(|b| Ok((b.build_local(Some(duration))?, b)))
            .collect::<ScoreResult<Vec<(Note, &NoteBuilder)>>>()?;
        notes.sort_by_key(|(note, _)| note.pitch());
        let (notes, builders) = notes.into_iter().unzip();
        let chord = Chord::new(
            ElementId::next(),
            notes,
            duration,
            self.articulations.clone(),
            self.ornaments.iter().copied().map(Ornament::from).collect(),
        );
        Ok((chord, builders))
    }
}
impl Connectable for ChordBuilder {
    fn builder_id(&self) -> BuilderId {
        self.id
    }
}
impl From<&Chord> for ChordBuilder {
    fn from(chord: &Chord) -> Self {
        let mut builder =
            Self::from_notes(chord.notes().iter().map(NoteBuilder::from));
        builder.set_duration(chord.duration());
        builder.articulations = chord.articulations().clone();
        builder.ornaments =
            chord.ornaments().iter().filter_map(|o| o.kind()).collect();
        builder
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::ChordBuilder;
    use crate::{
        builders::NoteBuilder,
        error::ScoreError,
        primitives::{Duration, Pitch},
    };

    fn pitch(name: &str) -> Pitch {
        name.parse().unwrap()
    }

    #[test]
    fn notes_are_sorted() {
        let mut builder = ChordBuilder::from_pitches(
            vec![pitch("G4"), pitch("C4"), pitch("E4")],
            Duration::half(),
        );
        builder.add(NoteBuilder::with(pitch("C3"), Duration::whole()));
        let chord = builder.build().unwrap();
        assert_eq!(
            chord.pitches().iter().map(|p| p.to_string()).collect_vec(),
            vec!["C3", "C4", "E4", "G4"]
        );
        assert!(chord
            .notes()
            .iter()
            .all(|n| n.duration() == Duration::half()));
        assert_eq!(chord.lowest().map(|n| n.pitch()), Some(pitch("C3")));
        assert!(chord.contains(&pitch("E4")));

        builder.remove_if(|n| n.pitch() == Some(pitch("C3")));
        assert_eq!(builder.build().unwrap().note_count(), 3);
        assert_eq!(ChordBuilder::from(&chord).build().unwrap(), chord);
    }

    #[test]
    fn empty_chord() {
        assert!(matches!(
            ChordBuilder::new().build(),
            Err(ScoreError::InvalidState { .. })
        ));
        let mut tied = ChordBuilder::from_pitches(
            vec![pitch("C4")],
            Duration::quarter(),
        );
        let other = NoteBuilder::with(pitch("C4"), Duration::quarter());
        tied.notes_mut()[0].tie_to(&other);
        assert!(matches!(
            tied.build(),
            Err(ScoreError::UnresolvedReference { .. })
        ));
    }
}
