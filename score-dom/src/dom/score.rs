use std::collections::{BTreeMap, HashMap};

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use super::{Durational, ElementId, GraceNote, Measure, Note, Part};
use crate::{
    notation::{Connection, NotationKind},
    primitives::{Offset, Position, TimeMap},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ScoreAttribute {
    Title,
    MovementTitle,
    Subtitle,
    Composer,
    Arranger,
}

/// Finalized, immutable score.
///
/// Elements are reached by [Position], connections between them are
/// stored as positions too, so the score holds no self-references and
/// can be shared between threads freely.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq)]
pub struct Score {
    attributes: BTreeMap<ScoreAttribute, String>,
    parts: Vec<Part>,
    time_map: TimeMap,
    #[derivative(PartialEq = "ignore")]
    index: HashMap<ElementId, Position>,
}
impl Score {
    pub(crate) fn new(
        attributes: BTreeMap<ScoreAttribute, String>,
        parts: Vec<Part>,
        time_map: TimeMap,
    ) -> Self {
        Self {
            attributes,
            parts,
            time_map,
            index: HashMap::new(),
        }
    }
    pub fn attributes(&self) -> &BTreeMap<ScoreAttribute, String> {
        &self.attributes
    }
    pub fn attribute(&self, attribute: ScoreAttribute) -> Option<&str> {
        self.attributes.get(&attribute).map(|s| s.as_str())
    }
    pub fn title(&self) -> Option<&str> {
        self.attribute(ScoreAttribute::Title)
    }
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
    pub fn part(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }
    pub fn parts(&self) -> std::slice::Iter<'_, Part> {
        self.parts.iter()
    }
    pub fn time_map(&self) -> &TimeMap {
        &self.time_map
    }
    pub fn measure_count(&self) -> usize {
        self.time_map.get().len()
    }
    /// Measures, that are not partial.
    pub fn full_measure_count(&self) -> usize {
        self.parts
            .first()
            .and_then(|p| p.first_staff())
            .map(|s| s.measures().iter().filter(|m| !m.is_partial()).count())
            .unwrap_or(0)
    }
    pub fn has_pickup_measure(&self) -> bool {
        self.first_measure_number() == 0
    }
    pub fn first_measure_number(&self) -> u32 {
        self.time_map.begin_measure()
    }
    pub fn last_measure_number(&self) -> u32 {
        self.time_map.end_measure()
    }
    pub fn measure(&self, position: &Position) -> Option<&Measure> {
        self.part(position.part_index())?
            .measure(position.staff_number(), position.measure_number())
    }

    /// Element at the position. For a chord note position it is the chord.
    pub fn get(&self, position: &Position) -> Option<&Durational> {
        let element = self
            .measure(position)?
            .get(position.voice_number(), position.index_in_voice())?;
        match position.index_in_chord() {
            Some(index) if index >= element.member_count() => None,
            _ => Some(element),
        }
    }
    /// Note at the position, chord notes included.
    pub fn note_at(&self, position: &Position) -> Option<&Note> {
        let element = self.get(position)?;
        match position.index_in_chord() {
            None => element.as_note(),
            Some(index) => element.as_chord()?.note(index),
        }
    }
    pub fn grace_note_at(&self, position: &Position) -> Option<&GraceNote> {
        let element = self.get(position)?;
        match position.index_in_chord() {
            None => element.as_grace_note(),
            Some(index) => element.as_grace_note_chord()?.note(index),
        }
    }
    /// Connections stored on the element or on the chord note.
    pub fn connections_at(&self, position: &Position) -> Option<&[Connection]> {
        self.get(position)?
            .connections_of(position.index_in_chord())
    }
    pub fn position_of(&self, id: ElementId) -> Option<Position> {
        self.index.get(&id).copied()
    }
    /// Offset from the score start.
    pub fn score_offset_of(&self, position: &Position) -> Option<Offset> {
        let offset = self
            .measure(position)?
            .voice(position.voice_number())?
            .offset_of(position.index_in_voice())?;
        self.time_map
            .score_offset(position.measure_number(), &offset)
    }
    /// Positions of the chain of `kind`, from the given one to its end.
    ///
    /// Returns only the starting position if it is not connected.
    pub fn follow_chain(
        &self,
        position: &Position,
        kind: NotationKind,
    ) -> Vec<Position> {
        let mut chain = vec![*position];
        let mut current = *position;
        while let Some(next) = self
            .connections_at(&current)
            .and_then(|c| c.iter().find(|c| c.kind() == kind))
            .and_then(|c| c.following())
        {
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    pub(crate) fn element_mut(
        &mut self,
        position: &Position,
    ) -> Option<&mut Durational> {
        self.parts
            .get_mut(position.part_index())?
            .staff_mut(position.staff_number())?
            .measure_mut(position.measure_number())?
            .voice_mut(position.voice_number())?
            .get_mut(position.index_in_voice())
    }
    pub(crate) fn connections_mut(
        &mut self,
        position: &Position,
    ) -> Option<&mut Vec<Connection>> {
        self.element_mut(position)?
            .connections_of_mut(position.index_in_chord())
    }
    /// Sort notations of every element and index the element ids.
    pub(crate) fn finish(&mut self) {
        for part in self.parts.iter_mut() {
            for staff in part.staves_mut() {
                for measure in staff.measures_mut() {
                    for voice in measure.voices_mut() {
                        voice
                            .elements_mut()
                            .iter_mut()
                            .for_each(|e| e.normalize());
                    }
                }
            }
        }
        let index = self
            .positions()
            .flat_map(|(position, element)| {
                let members = element
                    .member_ids()
                    .into_iter()
                    .enumerate()
                    .map(move |(i, id)| (id, position.in_chord(i)));
                std::iter::once((element.id(), position)).chain(members)
            })
            .collect();
        self.index = index;
    }
}
