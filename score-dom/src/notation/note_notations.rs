use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::NotationError;
use crate::primitives::Position;

#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize,
    Deserialize,
)]
pub enum Articulation {
    Accent,
    BreathMark,
    Caesura,
    Fermata,
    SlideInDown,
    SlideInUp,
    SlideOutDown,
    SlideOutUp,
    Spiccato,
    Staccatissimo,
    Staccato,
    Stress,
    StrongAccent,
    Tenuto,
    TenutoStaccato,
    Unstress,
}
impl Articulation {
    fn token(&self) -> &'static str {
        match *self {
            Self::Accent => "accent",
            Self::BreathMark => "breath-mark",
            Self::Caesura => "caesura",
            Self::Fermata => "fermata",
            Self::SlideInDown => "slide-in-down",
            Self::SlideInUp => "slide-in-up",
            Self::SlideOutDown => "slide-out-down",
            Self::SlideOutUp => "slide-out-up",
            Self::Spiccato => "spiccato",
            Self::Staccatissimo => "staccatissimo",
            Self::Staccato => "staccato",
            Self::Stress => "stress",
            Self::StrongAccent => "strong-accent",
            Self::Tenuto => "tenuto",
            Self::TenutoStaccato => "tenuto-staccato",
            Self::Unstress => "unstress",
        }
    }
}
impl Display for Articulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
impl FromStr for Articulation {
    type Err = NotationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accent" => Ok(Self::Accent),
            "breath-mark" => Ok(Self::BreathMark),
            "caesura" => Ok(Self::Caesura),
            "fermata" => Ok(Self::Fermata),
            "slide-in-down" => Ok(Self::SlideInDown),
            "slide-in-up" => Ok(Self::SlideInUp),
            "slide-out-down" => Ok(Self::SlideOutDown),
            "slide-out-up" => Ok(Self::SlideOutUp),
            "spiccato" => Ok(Self::Spiccato),
            "staccatissimo" => Ok(Self::Staccatissimo),
            "staccato" => Ok(Self::Staccato),
            "stress" => Ok(Self::Stress),
            "strong-accent" => Ok(Self::StrongAccent),
            "tenuto" => Ok(Self::Tenuto),
            "tenuto-staccato" => Ok(Self::TenutoStaccato),
            "unstress" => Ok(Self::Unstress),
            x => Err(NotationError::UnexpectedToken(x.to_string())),
        }
    }
}

/// Ornaments, that can be set on a note or chord builder directly.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize,
    Deserialize,
)]
pub enum OrnamentKind {
    DelayedInvertedTurn,
    DelayedTurn,
    InvertedMordent,
    InvertedTurn,
    Mordent,
    SingleTremolo,
    DoubleTremolo,
    TripleTremolo,
    Trill,
    Turn,
}
impl Display for OrnamentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match *self {
            Self::DelayedInvertedTurn => "delayed-inverted-turn",
            Self::DelayedTurn => "delayed-turn",
            Self::InvertedMordent => "inverted-mordent",
            Self::InvertedTurn => "inverted-turn",
            Self::Mordent => "mordent",
            Self::SingleTremolo => "single-tremolo",
            Self::DoubleTremolo => "double-tremolo",
            Self::TripleTremolo => "triple-tremolo",
            Self::Trill => "trill",
            Self::Turn => "turn",
        };
        f.write_str(token)
    }
}
impl FromStr for OrnamentKind {
    type Err = NotationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delayed-inverted-turn" => Ok(Self::DelayedInvertedTurn),
            "delayed-turn" => Ok(Self::DelayedTurn),
            "inverted-mordent" => Ok(Self::InvertedMordent),
            "inverted-turn" => Ok(Self::InvertedTurn),
            "mordent" => Ok(Self::Mordent),
            "single-tremolo" => Ok(Self::SingleTremolo),
            "double-tremolo" => Ok(Self::DoubleTremolo),
            "triple-tremolo" => Ok(Self::TripleTremolo),
            "trill" => Ok(Self::Trill),
            "turn" => Ok(Self::Turn),
            x => Err(NotationError::UnexpectedToken(x.to_string())),
        }
    }
}

/// Ornament of a finalized note or chord.
///
/// Grace note groups are produced by resolution only: they list the
/// positions of the grace elements attached to the principal note.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Ornament {
    Plain(OrnamentKind),
    GraceNotes(Vec<Position>),
    SucceedingGraceNotes(Vec<Position>),
}
impl Ornament {
    pub fn kind(&self) -> Option<OrnamentKind> {
        match self {
            Self::Plain(kind) => Some(*kind),
            _ => None,
        }
    }
    pub fn grace_positions(&self) -> &[Position] {
        match self {
            Self::Plain(_) => &[],
            Self::GraceNotes(members) | Self::SucceedingGraceNotes(members) => {
                members
            }
        }
    }
}
impl From<OrnamentKind> for Ornament {
    fn from(value: OrnamentKind) -> Self {
        Self::Plain(value)
    }
}

#[derive(
    Debug, PartialEq, Eq, Hash, Clone, Copy, Default, Serialize, Deserialize,
)]
pub enum GraceKind {
    /// Short, "crushed" grace note with a slash.
    #[default]
    Acciaccatura,
    Appoggiatura,
}

#[cfg(test)]
mod tests {
    use super::{Articulation, OrnamentKind};

    #[test]
    fn tokens() {
        for articulation in [
            Articulation::Staccato,
            Articulation::StrongAccent,
            Articulation::SlideOutUp,
        ] {
            assert_eq!(
                articulation.to_string().parse::<Articulation>().unwrap(),
                articulation
            );
        }
        assert_eq!(
            "inverted-mordent".parse::<OrnamentKind>().unwrap(),
            OrnamentKind::InvertedMordent
        );
        assert!("pizz".parse::<Articulation>().is_err());
    }
}
