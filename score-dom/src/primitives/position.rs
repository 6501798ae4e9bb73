//! Coordinates of elements inside a finalized score.
//!
//! A [Position] never points to an object in memory: it is a plain
//! address, valid for the score it was taken from and for every score
//! built from the same builders.
//!
//! # Examples
//!
//! ```
//! use score_dom::primitives::Position;
//!
//! let a = Position::new(0, 1, 2, 1, 0);
//! let b = Position::new(0, 2, 1, 1, 3);
//! // measures go before staves in iteration order.
//! assert!(b < a);
//! let member = a.in_chord(1);
//! assert!(a < member);
//! assert_eq!(member.without_chord_index(), a);
//! ```

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::Offset;

/// Address of a durational element, or of a note inside a chord.
///
/// Ordering follows iteration order: part, measure, staff, voice, index
/// in voice and index in chord. A chord comes right before its notes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct Position {
    part_index: usize,
    measure_number: u32,
    staff_number: u32,
    voice_number: u32,
    index_in_voice: usize,
    index_in_chord: Option<usize>,
}
impl Position {
    pub fn new(
        part_index: usize,
        staff_number: u32,
        measure_number: u32,
        voice_number: u32,
        index_in_voice: usize,
    ) -> Self {
        Self {
            part_index,
            measure_number,
            staff_number,
            voice_number,
            index_in_voice,
            index_in_chord: None,
        }
    }
    /// Position in a part with the only staff.
    pub fn single_staff(
        part_index: usize,
        measure_number: u32,
        voice_number: u32,
        index_in_voice: usize,
    ) -> Self {
        Self::new(part_index, 1, measure_number, voice_number, index_in_voice)
    }
    pub fn in_chord(&self, index_in_chord: usize) -> Self {
        Self {
            index_in_chord: Some(index_in_chord),
            ..*self
        }
    }
    pub fn without_chord_index(&self) -> Self {
        Self {
            index_in_chord: None,
            ..*self
        }
    }

    pub fn part_index(&self) -> usize {
        self.part_index
    }
    pub fn staff_number(&self) -> u32 {
        self.staff_number
    }
    pub fn measure_number(&self) -> u32 {
        self.measure_number
    }
    pub fn voice_number(&self) -> u32 {
        self.voice_number
    }
    pub fn index_in_voice(&self) -> usize {
        self.index_in_voice
    }
    pub fn index_in_chord(&self) -> Option<usize> {
        self.index_in_chord
    }
    pub fn is_in_chord(&self) -> bool {
        self.index_in_chord.is_some()
    }

    /// Same part, staff and voice number, in any measure.
    pub fn is_same_voice(&self, other: &Position) -> bool {
        self.part_index == other.part_index
            && self.staff_number == other.staff_number
            && self.voice_number == other.voice_number
    }
    /// Same voice of the same measure.
    pub fn is_same_measure_voice(&self, other: &Position) -> bool {
        self.is_same_voice(other)
            && self.measure_number == other.measure_number
    }
}
impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "part {}, staff {}, measure {}, voice {}, index {}",
            self.part_index,
            self.staff_number,
            self.measure_number,
            self.voice_number,
            self.index_in_voice
        )?;
        if let Some(index) = self.index_in_chord {
            write!(f, ", chord note {}", index)?;
        }
        Ok(())
    }
}

/// Position with offset of the element from its measure start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetPosition {
    position: Position,
    offset: Offset,
}
impl OffsetPosition {
    pub fn new(position: Position, offset: Offset) -> Self {
        Self { position, offset }
    }
    pub fn position(&self) -> Position {
        self.position
    }
    pub fn offset(&self) -> Offset {
        self.offset
    }
}
impl From<OffsetPosition> for Position {
    fn from(value: OffsetPosition) -> Self {
        value.position
    }
}
