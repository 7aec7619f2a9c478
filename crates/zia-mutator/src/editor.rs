//! Marker chains: the detached clause list the user edits.
//!
//! Opening the editor on a block yields one [`Marker`] per existing clause.
//! Each marker remembers the clause it stands for, so committing a
//! reordered chain can carry that clause's condition and body to the
//! marker's new position. Markers inserted by the user carry nothing.

use zia_types::{BlockId, ClauseKind};

/// A clause of a specific block at the time the editor was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseRef {
    pub kind: ClauseKind,
    pub index: u32,
}

/// One entry in a marker chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub kind: ClauseKind,
    /// The clause this marker was opened for; `None` for new clauses.
    pub origin: Option<ClauseRef>,
}

impl Marker {
    /// A marker for a brand new, empty clause.
    pub fn new(kind: ClauseKind) -> Self {
        Self { kind, origin: None }
    }
}

/// Ordered marker list for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerChain {
    owner: BlockId,
    markers: Vec<Marker>,
}

impl MarkerChain {
    pub fn new(owner: BlockId) -> Self {
        Self {
            owner,
            markers: Vec::new(),
        }
    }

    pub(crate) fn from_markers(owner: BlockId, markers: Vec<Marker>) -> Self {
        Self { owner, markers }
    }

    /// The block this chain was opened on.
    pub fn owner(&self) -> BlockId {
        self.owner
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn kinds(&self) -> Vec<ClauseKind> {
        self.markers.iter().map(|m| m.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Append a new clause.
    pub fn push(&mut self, kind: ClauseKind) {
        self.markers.push(Marker::new(kind));
    }

    /// Insert a new clause at `index` (clamped to the chain length).
    pub fn insert(&mut self, index: usize, kind: ClauseKind) {
        let index = index.min(self.markers.len());
        self.markers.insert(index, Marker::new(kind));
    }

    /// Remove the marker at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Marker> {
        (index < self.markers.len()).then(|| self.markers.remove(index))
    }

    /// Move the marker at `from` so it ends up at `to`.
    /// Returns `false` when either position is out of range.
    pub fn move_marker(&mut self, from: usize, to: usize) -> bool {
        if from >= self.markers.len() || to >= self.markers.len() {
            return false;
        }
        let marker = self.markers.remove(from);
        self.markers.insert(to, marker);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> MarkerChain {
        let mut c = MarkerChain::new(BlockId(0));
        c.push(ClauseKind::ElseIf);
        c.push(ClauseKind::ElseIf);
        c.push(ClauseKind::Else);
        c
    }

    #[test]
    fn test_move_marker() {
        let mut c = chain();
        assert!(c.move_marker(2, 0));
        assert_eq!(
            c.kinds(),
            [ClauseKind::Else, ClauseKind::ElseIf, ClauseKind::ElseIf]
        );
        assert!(!c.move_marker(0, 3));
    }

    #[test]
    fn test_insert_clamps_position() {
        let mut c = chain();
        c.insert(99, ClauseKind::ElseIf);
        assert_eq!(c.len(), 4);
        assert_eq!(c.markers()[3].kind, ClauseKind::ElseIf);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut c = chain();
        assert!(c.remove(7).is_none());
        assert_eq!(c.remove(0).map(|m| m.kind), Some(ClauseKind::ElseIf));
        assert_eq!(c.len(), 2);
    }
}
