use std::{cmp::Ordering, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{ValueError, ValueResult, MAX_OCTAVE};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub enum PitchBase {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}
impl PitchBase {
    /// Semitones above C.
    pub fn semitone(&self) -> i32 {
        match self {
            Self::C => 0,
            Self::D => 2,
            Self::E => 4,
            Self::F => 5,
            Self::G => 7,
            Self::A => 9,
            Self::B => 11,
        }
    }
}
impl TryFrom<char> for PitchBase {
    type Error = ValueError;
    fn try_from(value: char) -> ValueResult<Self> {
        match value.to_ascii_uppercase() {
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'E' => Ok(Self::E),
            'F' => Ok(Self::F),
            'G' => Ok(Self::G),
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            _ => Err(ValueError::Parse(value.to_string())),
        }
    }
}
impl Display for PitchBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}
impl Accidental {
    pub fn alter(&self) -> i32 {
        match self {
            Self::DoubleFlat => -2,
            Self::Flat => -1,
            Self::Natural => 0,
            Self::Sharp => 1,
            Self::DoubleSharp => 2,
        }
    }
    fn symbol(&self) -> &'static str {
        match self {
            Self::DoubleFlat => "bb",
            Self::Flat => "b",
            Self::Natural => "",
            Self::Sharp => "#",
            Self::DoubleSharp => "##",
        }
    }
}
impl Default for Accidental {
    fn default() -> Self {
        Self::Natural
    }
}
impl FromStr for Accidental {
    type Err = ValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bb" => Ok(Self::DoubleFlat),
            "b" => Ok(Self::Flat),
            "" => Ok(Self::Natural),
            "#" => Ok(Self::Sharp),
            "##" | "x" => Ok(Self::DoubleSharp),
            _ => Err(ValueError::Parse(s.to_string())),
        }
    }
}

/// Spelled pitch: base letter, accidental and octave.
///
/// Pitches are ordered by sounding height first, so `B#3` and `C4` are
/// neighbours, but not equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    base: PitchBase,
    accidental: Accidental,
    octave: u8,
}
impl Pitch {
    pub fn new(
        base: PitchBase,
        accidental: Accidental,
        octave: u8,
    ) -> ValueResult<Self> {
        if octave > MAX_OCTAVE {
            return Err(ValueError::OutOfRange(format!(
                "octave {} is higher than {}",
                octave, MAX_OCTAVE
            )));
        }
        Ok(Self {
            base,
            accidental,
            octave,
        })
    }
    pub fn base(&self) -> PitchBase {
        self.base
    }
    pub fn accidental(&self) -> Accidental {
        self.accidental
    }
    pub fn octave(&self) -> u8 {
        self.octave
    }
    /// MIDI-like number, where `C4` is 60.
    pub fn to_int(&self) -> i32 {
        self.base.semitone()
            + self.accidental.alter()
            + (self.octave as i32 + 1) * 12
    }
    pub fn is_enharmonic(&self, other: &Pitch) -> bool {
        self.to_int() == other.to_int()
    }
}
impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_int()
            .cmp(&other.to_int())
            .then(self.base.cmp(&other.base))
            .then(self.accidental.cmp(&other.accidental))
            .then(self.octave.cmp(&other.octave))
    }
}
impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.base, self.accidental.symbol(), self.octave)
    }
}
impl FromStr for Pitch {
    type Err = ValueError;

    /// # Example
    ///
    /// ```
    /// # use score_dom::primitives::{Accidental, Pitch, PitchBase};
    /// let pitch: Pitch = "Eb4".parse().unwrap();
    /// assert_eq!(pitch.base(), PitchBase::E);
    /// assert_eq!(pitch.accidental(), Accidental::Flat);
    /// assert_eq!(pitch.to_int(), 63);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ValueError::Parse(s.to_string());
        let mut chars = s.chars();
        let base = PitchBase::try_from(chars.next().ok_or_else(err)?)?;
        let tail = chars.as_str();
        let split = tail
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(err)?;
        let accidental = tail[..split].parse().map_err(|_| err())?;
        let octave = tail[split..].parse::<u8>().map_err(|_| err())?;
        Self::new(base, accidental, octave)
    }
}

#[cfg(test)]
mod tests {
    use super::{Accidental, Pitch, PitchBase};

    #[test]
    fn pitch() {
        let c4: Pitch = "C4".parse().unwrap();
        assert_eq!(c4.to_int(), 60);
        let b_sharp: Pitch = "B#3".parse().unwrap();
        assert!(b_sharp.is_enharmonic(&c4));
        assert_ne!(b_sharp, c4);
        assert!("B3".parse::<Pitch>().unwrap() < b_sharp);
        assert_eq!(
            "Fx5".parse::<Pitch>().unwrap().accidental(),
            Accidental::DoubleSharp
        );
        assert_eq!("Abb2".parse::<Pitch>().unwrap().to_int(), 43);
        assert!("H4".parse::<Pitch>().is_err());
        assert!("C".parse::<Pitch>().is_err());
        assert!(Pitch::new(PitchBase::C, Accidental::Natural, 11).is_err());
        assert_eq!(
            Pitch::new(PitchBase::G, Accidental::Sharp, 3)
                .unwrap()
                .to_string(),
            "G#3"
        );
    }
}
