use std::collections::BTreeMap;

use log::debug;

use super::{MeasureBuilder, ScoreBuilder};
use crate::{
    dom::{Part, PartAttribute},
    error::{ScoreError, ScoreResult},
    primitives::TimeSignature,
};

/// Staves of measures, numbered from 1.
#[derive(Debug, Clone, Default)]
pub struct PartBuilder {
    staves: BTreeMap<u32, Vec<MeasureBuilder>>,
    attributes: BTreeMap<PartAttribute, String>,
}
impl PartBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut builder = Self::default();
        let name = name.into();
        if !name.is_empty() {
            builder.set_attribute(PartAttribute::Name, name);
        }
        builder
    }
    /// Append measure to the staff 1.
    pub fn add(&mut self, measure: MeasureBuilder) -> &mut Self {
        self.add_to_staff(1, measure)
    }
    pub fn add_to_staff(
        &mut self,
        staff: u32,
        measure: MeasureBuilder,
    ) -> &mut Self {
        self.staves.entry(staff).or_default().push(measure);
        self
    }
    pub fn staff(&self, staff: u32) -> Option<&[MeasureBuilder]> {
        self.staves.get(&staff).map(|s| s.as_slice())
    }
    pub fn staff_mut(&mut self, staff: u32) -> Option<&mut Vec<MeasureBuilder>> {
        self.staves.get_mut(&staff)
    }
    pub fn staves(&self) -> &BTreeMap<u32, Vec<MeasureBuilder>> {
        &self.staves
    }
    pub fn staff_count(&self) -> usize {
        self.staves.len()
    }
    /// Measure count of the longest staff.
    pub fn measure_count(&self) -> usize {
        self.staves.values().map(|s| s.len()).max().unwrap_or(0)
    }
    pub fn name(&self) -> Option<&str> {
        self.attribute(PartAttribute::Name)
    }
    pub fn attribute(&self, attribute: PartAttribute) -> Option<&str> {
        self.attributes.get(&attribute).map(|s| s.as_str())
    }
    pub fn attributes(&self) -> &BTreeMap<PartAttribute, String> {
        &self.attributes
    }
    pub fn set_attribute(
        &mut self,
        attribute: PartAttribute,
        value: impl Into<String>,
    ) -> &mut Self {
        self.attributes.insert(attribute, value.into());
        self
    }

    /// Trim overflowing voices of every measure to its time signature.
    ///
    /// Time signatures are inherited along each staff; measures before the
    /// first time signature are left as they are.
    pub fn trim(&mut self) -> &mut Self {
        self.for_each_measure(|measure, time_signature| {
            measure.trim(time_signature);
        })
    }
    /// Fill short voices of every full measure with rests.
    pub fn pad_with_rests(&mut self) -> &mut Self {
        self.for_each_measure(|measure, time_signature| {
            measure.pad_with_rests(time_signature);
        })
    }
    fn for_each_measure(
        &mut self,
        mut action: impl FnMut(&mut MeasureBuilder, &TimeSignature),
    ) -> &mut Self {
        for (number, staff) in self.staves.iter_mut() {
            let mut time_signature = None;
            for (index, measure) in staff.iter_mut().enumerate() {
                time_signature = measure.time_signature().or(time_signature);
                match &time_signature {
                    Some(ts) => action(measure, ts),
                    None => debug!(
                        "staff {}, measure index {}: no time signature",
                        number, index
                    ),
                }
            }
        }
        self
    }

    /// Build the part alone, as the only part of a score.
    pub fn build(&self) -> ScoreResult<Part> {
        let mut score = ScoreBuilder::new();
        score.add_part(self.clone());
        score
            .build()?
            .part(0)
            .cloned()
            .ok_or(ScoreError::EmptyPart { part_index: 0 })
    }
}
impl From<&Part> for PartBuilder {
    /// Builder with attributes and measures of the part, without
    /// connections.
    fn from(part: &Part) -> Self {
        let mut builder = Self {
            staves: BTreeMap::new(),
            attributes: part.attributes().clone(),
        };
        for (number, staff) in part.staves() {
            for measure in staff.measures() {
                builder.add_to_staff(number, MeasureBuilder::from(measure));
            }
        }
        builder
    }
}
