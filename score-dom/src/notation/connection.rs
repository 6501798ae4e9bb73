use super::NotationKind;
use crate::primitives::Position;

/// Resolved link of one element to its neighbours in a notation chain.
///
/// Stored on every participant. The first element of a chain has no
/// preceding position, the last one has no following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Connection {
    kind: NotationKind,
    preceding: Option<Position>,
    following: Option<Position>,
}
impl Connection {
    pub(crate) fn new(
        kind: NotationKind,
        preceding: Option<Position>,
        following: Option<Position>,
    ) -> Self {
        Self {
            kind,
            preceding,
            following,
        }
    }
    pub fn kind(&self) -> NotationKind {
        self.kind
    }
    pub fn preceding(&self) -> Option<Position> {
        self.preceding
    }
    pub fn following(&self) -> Option<Position> {
        self.following
    }
    pub fn is_beginning(&self) -> bool {
        self.preceding.is_none()
    }
    pub fn is_end(&self) -> bool {
        self.following.is_none()
    }
}
