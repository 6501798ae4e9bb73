use std::collections::BTreeMap;

use super::PartBuilder;
use crate::{
    dom::{resolver, Score, ScoreAttribute},
    error::ScoreResult,
};

#[derive(Debug, Clone, Default)]
pub struct ScoreBuilder {
    attributes: BTreeMap<ScoreAttribute, String>,
    parts: Vec<PartBuilder>,
}
impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add_part(&mut self, part: PartBuilder) -> &mut Self {
        self.parts.push(part);
        self
    }
    pub fn parts(&self) -> &[PartBuilder] {
        &self.parts
    }
    pub fn part(&self, index: usize) -> Option<&PartBuilder> {
        self.parts.get(index)
    }
    pub fn part_mut(&mut self, index: usize) -> Option<&mut PartBuilder> {
        self.parts.get_mut(index)
    }
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
    pub fn attribute(&self, attribute: ScoreAttribute) -> Option<&str> {
        self.attributes.get(&attribute).map(|s| s.as_str())
    }
    pub fn attributes(&self) -> &BTreeMap<ScoreAttribute, String> {
        &self.attributes
    }
    pub fn set_attribute(
        &mut self,
        attribute: ScoreAttribute,
        value: impl Into<String>,
    ) -> &mut Self {
        self.attributes.insert(attribute, value.into());
        self
    }
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.set_attribute(ScoreAttribute::Title, title)
    }

    /// Finalize the whole builder graph into an immutable score.
    ///
    /// Builders are not changed, so the same graph may be built again,
    /// giving an equal score with fresh element ids. Any structural fault
    /// aborts the whole build.
    ///
    /// # Example
    ///
    /// ```
    /// use score_dom::builders::{
    ///     MeasureBuilder, NoteBuilder, PartBuilder, ScoreBuilder,
    /// };
    /// use score_dom::primitives::{Clef, Duration, KeySignature, TimeSignature};
    ///
    /// let mut first =
    ///     NoteBuilder::with("C4".parse().unwrap(), Duration::whole());
    /// let second = NoteBuilder::with("C4".parse().unwrap(), Duration::whole());
    /// first.tie_to(&second);
    ///
    /// let mut m1 = MeasureBuilder::with_attributes(
    ///     TimeSignature::four_four(),
    ///     KeySignature::c_major(),
    ///     Clef::treble(),
    /// );
    /// m1.add(first);
    /// let mut m2 = MeasureBuilder::new();
    /// m2.add(second);
    /// let mut part = PartBuilder::new("Piano");
    /// part.add(m1).add(m2);
    /// let mut builder = ScoreBuilder::new();
    /// builder.add_part(part);
    ///
    /// let score = builder.build().unwrap();
    /// assert_eq!(score.measure_count(), 2);
    /// ```
    pub fn build(&self) -> ScoreResult<Score> {
        resolver::finalize(self)
    }
}
impl From<&Score> for ScoreBuilder {
    /// Builder view of the score, without connections.
    fn from(score: &Score) -> Self {
        Self {
            attributes: score.attributes().clone(),
            parts: score.parts().map(PartBuilder::from).collect(),
        }
    }
}
