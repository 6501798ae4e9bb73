use std::collections::BTreeMap;

use itertools::Either;
use serde::{Deserialize, Serialize};

use super::Measure;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PartAttribute {
    Name,
    AbbreviatedName,
}

/// Staff number of a single-staff part.
pub const SINGLE_STAFF: u32 = 1;

/// Measures of one staff, numbered consecutively.
#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    measures: Vec<Measure>,
}
impl Staff {
    pub(crate) fn new(measures: Vec<Measure>) -> Self {
        Self { measures }
    }
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }
    pub fn measure(&self, number: u32) -> Option<&Measure> {
        let index = number.checked_sub(self.first_number()?)?;
        self.measures.get(index as usize)
    }
    pub fn measure_count(&self) -> usize {
        self.measures.len()
    }
    /// 0 if the staff begins with a pickup.
    pub fn first_number(&self) -> Option<u32> {
        self.measures.first().map(|m| m.number())
    }
    pub fn last_number(&self) -> Option<u32> {
        self.measures.last().map(|m| m.number())
    }
    pub(crate) fn measure_mut(&mut self, number: u32) -> Option<&mut Measure> {
        let index = number.checked_sub(self.first_number()?)?;
        self.measures.get_mut(index as usize)
    }
    pub(crate) fn measures_mut(&mut self) -> std::slice::IterMut<'_, Measure> {
        self.measures.iter_mut()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleStaffPart {
    attributes: BTreeMap<PartAttribute, String>,
    staff: Staff,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiStaffPart {
    attributes: BTreeMap<PartAttribute, String>,
    staves: BTreeMap<u32, Staff>,
}

/// Instrument of the score: one staff, or several (piano, harp, organ).
///
/// All staves of a part share measure count and time signatures.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    SingleStaff(SingleStaffPart),
    MultiStaff(MultiStaffPart),
}
impl Part {
    /// The only staff numbered 1 gives a single-staff part.
    pub(crate) fn new(
        attributes: BTreeMap<PartAttribute, String>,
        mut staves: BTreeMap<u32, Staff>,
    ) -> Self {
        if staves.len() == 1 {
            if let Some(staff) = staves.remove(&SINGLE_STAFF) {
                return Self::SingleStaff(SingleStaffPart { attributes, staff });
            }
        }
        Self::MultiStaff(MultiStaffPart { attributes, staves })
    }
    pub fn attributes(&self) -> &BTreeMap<PartAttribute, String> {
        match self {
            Self::SingleStaff(p) => &p.attributes,
            Self::MultiStaff(p) => &p.attributes,
        }
    }
    pub fn attribute(&self, attribute: PartAttribute) -> Option<&str> {
        self.attributes().get(&attribute).map(|s| s.as_str())
    }
    pub fn name(&self) -> Option<&str> {
        self.attribute(PartAttribute::Name)
    }
    pub fn is_multi_staff(&self) -> bool {
        matches!(self, Self::MultiStaff(_))
    }
    pub fn staff_count(&self) -> usize {
        match self {
            Self::SingleStaff(_) => 1,
            Self::MultiStaff(p) => p.staves.len(),
        }
    }
    pub fn staff_numbers(&self) -> Vec<u32> {
        self.staves().map(|(number, _)| number).collect()
    }
    pub fn staff(&self, number: u32) -> Option<&Staff> {
        match self {
            Self::SingleStaff(p) if number == SINGLE_STAFF => Some(&p.staff),
            Self::SingleStaff(_) => None,
            Self::MultiStaff(p) => p.staves.get(&number),
        }
    }
    /// Staves in order of their numbers.
    pub fn staves(&self) -> impl Iterator<Item = (u32, &Staff)> + Clone + '_ {
        match self {
            Self::SingleStaff(p) => {
                Either::Left(std::iter::once((SINGLE_STAFF, &p.staff)))
            }
            Self::MultiStaff(p) => Either::Right(
                p.staves.iter().map(|(number, staff)| (*number, staff)),
            ),
        }
    }
    pub fn measure(&self, staff: u32, number: u32) -> Option<&Measure> {
        self.staff(staff)?.measure(number)
    }
    pub fn measure_count(&self) -> usize {
        self.first_staff().map(|s| s.measure_count()).unwrap_or(0)
    }
    pub fn first_staff(&self) -> Option<&Staff> {
        self.staves().next().map(|(_, staff)| staff)
    }
    pub(crate) fn staff_mut(&mut self, number: u32) -> Option<&mut Staff> {
        match self {
            Self::SingleStaff(p) if number == SINGLE_STAFF => Some(&mut p.staff),
            Self::SingleStaff(_) => None,
            Self::MultiStaff(p) => p.staves.get_mut(&number),
        }
    }
    pub(crate) fn staves_mut(&mut self) -> Box<dyn Iterator<Item = &mut Staff> + '_> {
        match self {
            Self::SingleStaff(p) => Box::new(std::iter::once(&mut p.staff)),
            Self::MultiStaff(p) => Box::new(p.staves.values_mut()),
        }
    }
}
