//! Main "ruler" for moving through the score in time.
use super::{Offset, TimeSignature};

/// Score-wide layout of measures in time.
///
/// Built once at finalization, from the measures of the first staff and
/// the actual lengths of partial measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMap {
    measures: Vec<MeasureInfo>,
    /// number of the first measure (0 for scores with pickup)
    begin: u32,
}
impl TimeMap {
    /// Measures are expected to be numbered consecutively.
    pub fn new(measures: Vec<MeasureInfo>) -> Self {
        let begin = measures.first().map(|m| m.number).unwrap_or(1);
        Self { measures, begin }
    }
    /// Lay measures one after another, starting from zero.
    pub fn from_lengths(
        begin: u32,
        measures: impl IntoIterator<Item = (TimeSignature, Offset)>,
    ) -> Self {
        let mut start = Offset::zero();
        let measures = measures
            .into_iter()
            .zip(begin..)
            .map(|((time_signature, length), number)| {
                let info = MeasureInfo {
                    number,
                    time_signature,
                    start,
                    length,
                };
                start = start + length;
                info
            })
            .collect();
        Self { measures, begin }
    }
    pub fn measure_info(&self, measure_number: u32) -> Option<&MeasureInfo> {
        let index = measure_number.checked_sub(self.begin)?;
        self.measures.get(index as usize)
    }
    /// Offset of measure start from the score start.
    pub fn measure_start(&self, measure_number: u32) -> Option<Offset> {
        self.measure_info(measure_number).map(|m| m.start)
    }
    /// Get measure under given score offset.
    ///
    /// # Returns
    /// MeasureInfo block and offset from its start.
    pub fn measure_at(
        &self,
        score_offset: &Offset,
    ) -> Option<(&MeasureInfo, Offset)> {
        self.measures
            .iter()
            .find(|m| *score_offset < m.start + m.length)
            .and_then(|m| {
                Offset::from_fraction(
                    score_offset.as_fraction() - m.start.as_fraction(),
                )
                .ok()
                .map(|relative| (m, relative))
            })
    }
    pub fn score_offset(
        &self,
        measure_number: u32,
        offset_in_measure: &Offset,
    ) -> Option<Offset> {
        self.measure_start(measure_number)
            .map(|start| start + *offset_in_measure)
    }
    pub fn get(&self) -> &[MeasureInfo] {
        &self.measures
    }
    pub fn total_length(&self) -> Offset {
        self.measures
            .last()
            .map(|m| m.start + m.length)
            .unwrap_or_default()
    }
    pub fn begin_measure(&self) -> u32 {
        self.begin
    }
    /// Number of the last measure.
    pub fn end_measure(&self) -> u32 {
        (self.begin + self.measures.len() as u32).saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureInfo {
    pub number: u32,
    pub time_signature: TimeSignature,
    /// offset from score start
    pub start: Offset,
    /// full capacity, or the longest voice of a partial measure
    pub length: Offset,
}

#[cfg(test)]
mod tests {
    use super::TimeMap;
    use crate::primitives::{Offset, TimeSignature};

    #[test]
    fn test_time_map() {
        let seven_eight = TimeSignature::new(7, 8).unwrap();
        let five_eight = TimeSignature::new(5, 8).unwrap();
        let time_map = TimeMap::from_lengths(
            0,
            vec![
                (seven_eight, Offset::new(1, 4).unwrap()),
                (seven_eight, Offset::new(7, 8).unwrap()),
                (five_eight, Offset::new(5, 8).unwrap()),
            ],
        );
        assert_eq!(time_map.begin_measure(), 0);
        assert_eq!(time_map.end_measure(), 2);
        assert_eq!(time_map.measure_start(2), Some(Offset::new(9, 8).unwrap()));
        assert_eq!(time_map.measure_start(3), None);
        let (info, relative) =
            time_map.measure_at(&Offset::new(10, 8).unwrap()).unwrap();
        assert_eq!(info.number, 2);
        assert_eq!(info.time_signature, five_eight);
        assert_eq!(relative, Offset::new(1, 8).unwrap());
        assert_eq!(
            time_map.score_offset(1, &Offset::new(1, 2).unwrap()),
            Some(Offset::new(3, 4).unwrap())
        );
        assert_eq!(time_map.total_length(), Offset::new(7, 4).unwrap());
        assert!(time_map.measure_at(&Offset::new(7, 4).unwrap()).is_none());
    }
}
