//! Notations linking durational elements together.
//!
//! Builders request links by [Notation] handle; finalized elements carry
//! resolved [Connection]s pointing to positions of their neighbours.

use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

pub mod connection;
pub mod note_notations;

pub use connection::Connection;
pub use note_notations::{Articulation, GraceKind, Ornament, OrnamentKind};

#[derive(Debug, thiserror::Error)]
pub enum NotationError {
    #[error("Unexpected Token: {0}")]
    UnexpectedToken(String),
}
pub type NotationResult<T> = Result<T, NotationError>;

/// 0 is reserved for ties.
static NOTATION_IDS: AtomicU64 = AtomicU64::new(1);
const TIE_ID: u64 = 0;

/// Identity of one notation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotationId(u64);
impl NotationId {
    fn next() -> Self {
        Self(NOTATION_IDS.fetch_add(1, Ordering::Relaxed))
    }
    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub enum NotationKind {
    Tie,
    Slur,
    Glissando,
    Arpeggiate,
    ArpeggiateUp,
    ArpeggiateDown,
    NonArpeggiate,
    /// `actual` elements in time of `normal`.
    Tuplet {
        actual: u32,
        normal: u32,
    },
}
impl NotationKind {
    pub fn is_arpeggio(&self) -> bool {
        matches!(
            self,
            Self::Arpeggiate
                | Self::ArpeggiateUp
                | Self::ArpeggiateDown
                | Self::NonArpeggiate
        )
    }
    pub fn is_tuplet(&self) -> bool {
        matches!(self, Self::Tuplet { .. })
    }
}
impl Display for NotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tie => write!(f, "tie"),
            Self::Slur => write!(f, "slur"),
            Self::Glissando => write!(f, "glissando"),
            Self::Arpeggiate => write!(f, "arpeggiate"),
            Self::ArpeggiateUp => write!(f, "arpeggiate up"),
            Self::ArpeggiateDown => write!(f, "arpeggiate down"),
            Self::NonArpeggiate => write!(f, "non-arpeggiate"),
            Self::Tuplet { actual, normal } => {
                write!(f, "tuplet {}:{}", actual, normal)
            }
        }
    }
}

/// Handle of a notation chain.
///
/// Every call to [Notation::new] starts a distinct chain, so two slurs
/// made separately never merge. All ties share one handle: a tie chain is
/// just a sequence of tied notes.
///
/// # Example
///
/// ```
/// # use score_dom::notation::{Notation, NotationKind};
/// assert_ne!(Notation::new(NotationKind::Slur), Notation::slur());
/// assert_eq!(Notation::new(NotationKind::Tie), Notation::tie());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Notation {
    id: NotationId,
    kind: NotationKind,
}
impl Notation {
    pub fn new(kind: NotationKind) -> Self {
        match kind {
            NotationKind::Tie => Self::tie(),
            kind => Self {
                id: NotationId::next(),
                kind,
            },
        }
    }
    pub fn tie() -> Self {
        Self {
            id: NotationId(TIE_ID),
            kind: NotationKind::Tie,
        }
    }
    pub fn slur() -> Self {
        Self::new(NotationKind::Slur)
    }
    pub fn glissando() -> Self {
        Self::new(NotationKind::Glissando)
    }
    pub fn tuplet(actual: u32, normal: u32) -> Self {
        Self::new(NotationKind::Tuplet { actual, normal })
    }
    pub fn id(&self) -> NotationId {
        self.id
    }
    pub fn kind(&self) -> NotationKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::{Notation, NotationKind};

    #[test]
    fn test_notation_identity() {
        let a = Notation::slur();
        let b = Notation::slur();
        assert_eq!(a, a);
        assert_ne!(a, b);
        assert_eq!(a.kind(), b.kind());
        assert_eq!(Notation::tie().id(), Notation::tie().id());
        let tuplet = Notation::tuplet(3, 2);
        assert!(tuplet.kind().is_tuplet());
        assert_eq!(tuplet.kind().to_string(), "tuplet 3:2");
        assert!(NotationKind::ArpeggiateUp.is_arpeggio());
    }
}
