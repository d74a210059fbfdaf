//! Undo/redo stack of primitive-list snapshots.

use crate::draw::Primitive;
use log::debug;

/// Append-only list of snapshots with a cursor.
///
/// Always holds at least one snapshot and `index < snapshots.len()`.
/// Committing after an undo drops the redo tail.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    snapshots: Vec<Vec<Primitive>>,
    index: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// History of a fresh document: a single empty snapshot.
    pub fn new() -> Self {
        Self::starting_at(Vec::new())
    }

    /// Single-entry history whose baseline is `primitives`.
    pub fn starting_at(primitives: Vec<Primitive>) -> Self {
        Self {
            snapshots: vec![primitives],
            index: 0,
        }
    }

    /// Truncates any redo tail and appends `primitives` as the newest state.
    pub fn commit(&mut self, primitives: Vec<Primitive>) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(primitives);
        self.index = self.snapshots.len() - 1;
        debug!(
            "History commit: {} entries, cursor {}",
            self.snapshots.len(),
            self.index
        );
    }

    /// Steps back. `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<&[Primitive]> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    /// Steps forward. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<&[Primitive]> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    pub fn current(&self) -> &[Primitive] {
        &self.snapshots[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{PrimitiveKind, RED};
    use crate::util::Rect;

    fn prim(x: f64) -> Primitive {
        Primitive::new(
            PrimitiveKind::Rect {
                bounds: Rect::new(x, 0.0, 10.0, 10.0),
            },
            RED,
            2.0,
        )
    }

    #[test]
    fn starts_with_one_empty_snapshot() {
        let history = History::new();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(history.current().is_empty());
        assert!(!history.can_undo() && !history.can_redo());
    }

    #[test]
    fn undo_and_redo_are_inverse() {
        let a = prim(1.0);
        let b = prim(2.0);
        let mut history = History::new();
        history.commit(vec![a.clone()]);
        history.commit(vec![a.clone(), b.clone()]);

        assert_eq!(history.undo().unwrap(), &[a.clone()][..]);
        assert!(history.undo().unwrap().is_empty());
        assert!(history.undo().is_none());
        assert_eq!(history.redo().unwrap(), &[a.clone()][..]);
        assert_eq!(history.redo().unwrap(), &[a, b][..]);
        assert!(history.redo().is_none());
    }

    #[test]
    fn commit_after_undo_truncates_redo_tail() {
        let mut history = History::new();
        history.commit(vec![prim(1.0)]);
        history.commit(vec![prim(2.0)]);
        history.undo();
        history.commit(vec![prim(3.0)]);

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert!(!history.can_redo());
    }
}
