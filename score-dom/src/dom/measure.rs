use std::collections::BTreeMap;

use super::Durational;
use crate::primitives::{
    Barline, Clef, KeySignature, MeasureAttributes, Offset, TimeSignature,
};

/// Elements of one voice, with offsets from the measure start.
///
/// Grace elements take no time: they share the offset of the element,
/// that follows them.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    elements: Vec<Durational>,
    offsets: Vec<Offset>,
    end: Offset,
}
impl Voice {
    pub(crate) fn new(
        elements: Vec<Durational>,
        offsets: Vec<Offset>,
        end: Offset,
    ) -> Self {
        Self {
            elements,
            offsets,
            end,
        }
    }
    pub fn len(&self) -> usize {
        self.elements.len()
    }
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
    pub fn get(&self, index: usize) -> Option<&Durational> {
        self.elements.get(index)
    }
    pub fn elements(&self) -> &[Durational] {
        &self.elements
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Durational> {
        self.elements.iter()
    }
    pub fn offset_of(&self, index: usize) -> Option<Offset> {
        self.offsets.get(index).copied()
    }
    pub fn iter_with_offsets(
        &self,
    ) -> impl Iterator<Item = (Offset, &Durational)> + Clone + '_ {
        self.offsets.iter().copied().zip(self.elements.iter())
    }
    /// Sum of element durations.
    pub fn total_duration(&self) -> Offset {
        self.end
    }
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Durational> {
        self.elements.get_mut(index)
    }
    pub(crate) fn elements_mut(&mut self) -> &mut [Durational] {
        &mut self.elements
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    number: u32,
    attributes: MeasureAttributes,
    partial: bool,
    voices: BTreeMap<u32, Voice>,
}
impl Measure {
    pub(crate) fn new(
        number: u32,
        attributes: MeasureAttributes,
        partial: bool,
        voices: BTreeMap<u32, Voice>,
    ) -> Self {
        Self {
            number,
            attributes,
            partial,
            voices,
        }
    }
    pub fn number(&self) -> u32 {
        self.number
    }
    pub fn attributes(&self) -> &MeasureAttributes {
        &self.attributes
    }
    pub fn time_signature(&self) -> TimeSignature {
        self.attributes.time_signature()
    }
    pub fn key_signature(&self) -> KeySignature {
        self.attributes.key_signature()
    }
    pub fn clef(&self) -> Clef {
        self.attributes.clef()
    }
    pub fn clef_changes(&self) -> &[(Offset, Clef)] {
        self.attributes.clef_changes()
    }
    pub fn left_barline(&self) -> Barline {
        self.attributes.left_barline()
    }
    pub fn right_barline(&self) -> Barline {
        self.attributes.right_barline()
    }
    pub fn is_partial(&self) -> bool {
        self.partial
    }
    /// Partial first measure of the staff.
    pub fn is_pickup(&self) -> bool {
        self.partial && self.number == 0
    }
    pub fn voices(&self) -> impl Iterator<Item = (u32, &Voice)> + Clone + '_ {
        self.voices.iter().map(|(number, voice)| (*number, voice))
    }
    pub fn voice(&self, number: u32) -> Option<&Voice> {
        self.voices.get(&number)
    }
    pub fn voice_numbers(&self) -> Vec<u32> {
        self.voices.keys().copied().collect()
    }
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }
    pub fn get(&self, voice: u32, index: usize) -> Option<&Durational> {
        self.voices.get(&voice)?.get(index)
    }
    /// Every element of the measure, voice by voice.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize, &Durational)> + '_ {
        self.voices().flat_map(|(number, voice)| {
            voice
                .iter()
                .enumerate()
                .map(move |(index, element)| (number, index, element))
        })
    }
    /// Measure with the only voice, holding the only rest.
    pub fn is_full_measure_rest(&self) -> bool {
        match self.voices.values().collect::<Vec<_>>().as_slice() {
            [voice] => {
                voice.len() == 1
                    && voice.get(0).map(|e| e.is_rest()).unwrap_or(false)
            }
            _ => false,
        }
    }
    /// Duration of the longest voice.
    pub fn longest_voice(&self) -> Offset {
        self.voices
            .values()
            .map(|v| v.total_duration())
            .max()
            .unwrap_or_default()
    }
    pub(crate) fn voice_mut(&mut self, number: u32) -> Option<&mut Voice> {
        self.voices.get_mut(&number)
    }
    pub(crate) fn voices_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.values_mut()
    }
}
