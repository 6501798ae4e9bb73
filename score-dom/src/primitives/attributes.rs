//! Measure-level attributes: meter, key, clef and barlines.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{Duration, Offset, PitchBase, ValueError, ValueResult};

const SHARPS_ORDER: [PitchBase; 7] = [
    PitchBase::F,
    PitchBase::C,
    PitchBase::G,
    PitchBase::D,
    PitchBase::A,
    PitchBase::E,
    PitchBase::B,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    beats: u32,
    beat_unit: u32,
}
impl TimeSignature {
    pub fn new(beats: u32, beat_unit: u32) -> ValueResult<Self> {
        if beats == 0 || beat_unit == 0 {
            return Err(ValueError::OutOfRange(format!(
                "time signature {}/{} is not valid",
                beats, beat_unit
            )));
        }
        Ok(Self { beats, beat_unit })
    }
    pub fn four_four() -> Self {
        Self {
            beats: 4,
            beat_unit: 4,
        }
    }
    pub fn three_four() -> Self {
        Self {
            beats: 3,
            beat_unit: 4,
        }
    }
    pub fn two_four() -> Self {
        Self {
            beats: 2,
            beat_unit: 4,
        }
    }
    pub fn six_eight() -> Self {
        Self {
            beats: 6,
            beat_unit: 8,
        }
    }
    pub fn beats(&self) -> u32 {
        self.beats
    }
    pub fn beat_unit(&self) -> u32 {
        self.beat_unit
    }
    pub fn beat_duration(&self) -> Duration {
        Duration::new(1, self.beat_unit as u64).unwrap_or_else(|_| {
            Duration::quarter()
        })
    }
    /// Capacity of a full measure.
    pub fn total_duration(&self) -> Duration {
        Duration::new(self.beats as u64, self.beat_unit as u64)
            .unwrap_or_else(|_| Duration::whole())
    }
}
impl Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_unit)
    }
}

/// Key signature as position on the circle of fifths.
///
/// Positive values count sharps, negative count flats.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct KeySignature {
    fifths: i8,
}
impl KeySignature {
    pub fn new(fifths: i8) -> ValueResult<Self> {
        if !(-7..=7).contains(&fifths) {
            return Err(ValueError::OutOfRange(format!(
                "key signature can have up to 7 accidentals, got {}",
                fifths
            )));
        }
        Ok(Self { fifths })
    }
    pub fn c_major() -> Self {
        Self { fifths: 0 }
    }
    pub fn fifths(&self) -> i8 {
        self.fifths
    }
    pub fn sharps(&self) -> Vec<PitchBase> {
        SHARPS_ORDER
            .iter()
            .take(self.fifths.max(0) as usize)
            .copied()
            .collect()
    }
    pub fn flats(&self) -> Vec<PitchBase> {
        SHARPS_ORDER
            .iter()
            .rev()
            .take((-self.fifths).max(0) as usize)
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClefSymbol {
    G,
    F,
    C,
    Percussion,
}

/// Clef symbol placed on a staff line (counted from the bottom, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clef {
    symbol: ClefSymbol,
    line: u8,
}
impl Clef {
    pub fn new(symbol: ClefSymbol, line: u8) -> ValueResult<Self> {
        if line == 0 {
            return Err(ValueError::OutOfRange(
                "clef line is counted from 1".to_string(),
            ));
        }
        Ok(Self { symbol, line })
    }
    pub fn treble() -> Self {
        Self {
            symbol: ClefSymbol::G,
            line: 2,
        }
    }
    pub fn bass() -> Self {
        Self {
            symbol: ClefSymbol::F,
            line: 4,
        }
    }
    pub fn alto() -> Self {
        Self {
            symbol: ClefSymbol::C,
            line: 3,
        }
    }
    pub fn percussion() -> Self {
        Self {
            symbol: ClefSymbol::Percussion,
            line: 3,
        }
    }
    pub fn symbol(&self) -> ClefSymbol {
        self.symbol
    }
    pub fn line(&self) -> u8 {
        self.line
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Barline {
    #[default]
    None,
    Single,
    Double,
    RepeatLeft,
    RepeatRight,
    Final,
    Dashed,
    Thick,
    Invisible,
}

/// Effective attributes of a finalized measure.
///
/// Inherited values are already resolved here, so a measure never needs
/// its predecessors to answer what its clef or key is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureAttributes {
    time_signature: TimeSignature,
    key_signature: KeySignature,
    clef: Clef,
    left_barline: Barline,
    right_barline: Barline,
    clef_changes: Vec<(Offset, Clef)>,
}
impl MeasureAttributes {
    pub fn new(
        time_signature: TimeSignature,
        key_signature: KeySignature,
        clef: Clef,
    ) -> Self {
        Self {
            time_signature,
            key_signature,
            clef,
            left_barline: Barline::None,
            right_barline: Barline::Single,
            clef_changes: Vec::new(),
        }
    }
    pub fn with_barlines(mut self, left: Barline, right: Barline) -> Self {
        self.left_barline = left;
        self.right_barline = right;
        self
    }
    /// Changes are kept sorted by offset.
    pub fn with_clef_changes(
        mut self,
        changes: impl IntoIterator<Item = (Offset, Clef)>,
    ) -> Self {
        self.clef_changes = changes.into_iter().collect();
        self.clef_changes.sort_by_key(|(offset, _)| *offset);
        self
    }
    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }
    pub fn key_signature(&self) -> KeySignature {
        self.key_signature
    }
    /// Clef at the measure start.
    pub fn clef(&self) -> Clef {
        self.clef
    }
    pub fn left_barline(&self) -> Barline {
        self.left_barline
    }
    pub fn right_barline(&self) -> Barline {
        self.right_barline
    }
    pub fn clef_changes(&self) -> &[(Offset, Clef)] {
        &self.clef_changes
    }
    /// Clef in effect at the measure end.
    pub fn last_clef(&self) -> Clef {
        self.clef_changes
            .last()
            .map(|(_, clef)| *clef)
            .unwrap_or(self.clef)
    }
    /// Clef in effect at the given offset.
    pub fn clef_at(&self, offset: &Offset) -> Clef {
        self.clef_changes
            .iter()
            .take_while(|(at, _)| at <= offset)
            .last()
            .map(|(_, clef)| *clef)
            .unwrap_or(self.clef)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clef, ClefSymbol, KeySignature, MeasureAttributes, TimeSignature};
    use crate::primitives::{Duration, Offset, PitchBase};

    #[test]
    fn signatures() {
        assert_eq!(
            TimeSignature::six_eight().total_duration(),
            Duration::new(3, 4).unwrap()
        );
        assert!(TimeSignature::new(0, 4).is_err());
        let d_major = KeySignature::new(2).unwrap();
        assert_eq!(d_major.sharps(), vec![PitchBase::F, PitchBase::C]);
        assert!(d_major.flats().is_empty());
        assert_eq!(
            KeySignature::new(-3).unwrap().flats(),
            vec![PitchBase::B, PitchBase::E, PitchBase::A]
        );
        assert!(KeySignature::new(8).is_err());
        assert!(Clef::new(ClefSymbol::C, 0).is_err());
    }

    #[test]
    fn clef_changes() {
        let attributes = MeasureAttributes::new(
            TimeSignature::four_four(),
            KeySignature::c_major(),
            Clef::treble(),
        )
        .with_clef_changes(vec![
            (Offset::new(3, 4).unwrap(), Clef::treble()),
            (Offset::new(1, 2).unwrap(), Clef::bass()),
        ]);
        assert_eq!(attributes.clef_at(&Offset::zero()), Clef::treble());
        assert_eq!(
            attributes.clef_at(&Offset::new(1, 2).unwrap()),
            Clef::bass()
        );
        assert_eq!(attributes.last_clef(), Clef::treble());
    }
}
