//! Windowed read-only views over a finalized score.

use super::iter::walk;
use crate::{
    dom::{Durational, Part, Score},
    error::{ScoreError, ScoreResult},
    primitives::{OffsetPosition, Position},
};

/// Some parts of the score, between two measures (both inclusive).
///
/// # Example
///
/// ```
/// use score_dom::builders::{MeasureBuilder, NoteBuilder, PartBuilder, ScoreBuilder};
/// use score_dom::primitives::{Clef, Duration, KeySignature, TimeSignature};
///
/// let mut part = PartBuilder::new("Voice");
/// for pitch in ["C4", "D4", "E4"] {
///     let mut measure = MeasureBuilder::with_attributes(
///         TimeSignature::four_four(),
///         KeySignature::c_major(),
///         Clef::treble(),
///     );
///     measure.add(NoteBuilder::with(pitch.parse().unwrap(), Duration::whole()));
///     part.add(measure);
/// }
/// let mut builder = ScoreBuilder::new();
/// builder.add_part(part);
/// let score = builder.build().unwrap();
///
/// let selection = score.select_measures(2, 3).unwrap();
/// assert_eq!(selection.measure_count(), 2);
/// assert_eq!(selection.iter().count(), 2);
/// assert!(score.select_measures(3, 4).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    score: &'a Score,
    parts: Vec<usize>,
    first: u32,
    last: u32,
}
impl<'a> Selection<'a> {
    fn new(
        score: &'a Score,
        parts: impl IntoIterator<Item = usize>,
        first: u32,
        last: u32,
    ) -> ScoreResult<Self> {
        if first > last {
            return Err(ScoreError::InvalidSelection(format!(
                "first measure {} is after the last one {}",
                first, last
            )));
        }
        if first < score.first_measure_number()
            || last > score.last_measure_number()
        {
            let reason = match first == 0 && !score.has_pickup_measure() {
                true => "score has no pickup measure".to_string(),
                false => format!(
                    "measures {}..={} are outside of the score ({}..={})",
                    first,
                    last,
                    score.first_measure_number(),
                    score.last_measure_number()
                ),
            };
            return Err(ScoreError::InvalidSelection(reason));
        }
        let mut parts = parts.into_iter().collect::<Vec<_>>();
        parts.sort_unstable();
        parts.dedup();
        if parts.is_empty() {
            return Err(ScoreError::InvalidSelection(
                "no parts selected".to_string(),
            ));
        }
        if let Some(unknown) = parts.iter().find(|i| **i >= score.part_count()) {
            return Err(ScoreError::InvalidSelection(format!(
                "score has no part {}",
                unknown
            )));
        }
        Ok(Self {
            score,
            parts,
            first,
            last,
        })
    }
    pub fn score(&self) -> &'a Score {
        self.score
    }
    pub fn part_indices(&self) -> &[usize] {
        &self.parts
    }
    pub fn parts(&self) -> impl Iterator<Item = (usize, &'a Part)> + Clone + 'a {
        let score = self.score;
        self.parts
            .clone()
            .into_iter()
            .filter_map(move |index| score.part(index).map(|p| (index, p)))
    }
    pub fn first_measure(&self) -> u32 {
        self.first
    }
    pub fn last_measure(&self) -> u32 {
        self.last
    }
    pub fn measure_count(&self) -> usize {
        (self.last - self.first) as usize + 1
    }
    pub fn contains(&self, position: &Position) -> bool {
        self.parts.contains(&position.part_index())
            && (self.first..=self.last).contains(&position.measure_number())
    }
    /// Narrow to the measures, which have to lie inside the selection.
    pub fn sub_selection(&self, first: u32, last: u32) -> ScoreResult<Self> {
        if first < self.first || last > self.last {
            return Err(ScoreError::InvalidSelection(format!(
                "measures {}..={} are outside of the selection ({}..={})",
                first, last, self.first, self.last
            )));
        }
        Self::new(self.score, self.parts.iter().copied(), first, last)
    }
    /// Narrow to the parts, which have to be selected already.
    pub fn with_parts(
        &self,
        parts: impl IntoIterator<Item = usize>,
    ) -> ScoreResult<Self> {
        let parts = parts.into_iter().collect::<Vec<_>>();
        if let Some(missing) = parts.iter().find(|i| !self.parts.contains(*i)) {
            return Err(ScoreError::InvalidSelection(format!(
                "part {} is not selected",
                missing
            )));
        }
        Self::new(self.score, parts, self.first, self.last)
    }
    /// Elements of the selection, in score order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (Position, &'a Durational)> + Clone + 'a {
        self.offset_positions()
            .map(|(position, element)| (position.position(), element))
    }
    pub fn offset_positions(
        &self,
    ) -> impl Iterator<Item = (OffsetPosition, &'a Durational)> + Clone + 'a {
        walk(self.parts(), self.first..=self.last)
    }
}

impl Score {
    /// The whole score.
    pub fn to_selection(&self) -> Selection<'_> {
        Selection {
            score: self,
            parts: (0..self.part_count()).collect(),
            first: self.first_measure_number(),
            last: self.last_measure_number(),
        }
    }
    /// All parts between measures `first` and `last`, both inclusive.
    pub fn select_measures(
        &self,
        first: u32,
        last: u32,
    ) -> ScoreResult<Selection<'_>> {
        Selection::new(self, 0..self.part_count(), first, last)
    }
    /// The parts through all measures.
    pub fn select_parts(
        &self,
        parts: impl IntoIterator<Item = usize>,
    ) -> ScoreResult<Selection<'_>> {
        Selection::new(
            self,
            parts,
            self.first_measure_number(),
            self.last_measure_number(),
        )
    }
}
