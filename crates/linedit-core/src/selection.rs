//! Anchor/active selection ranges.

use crate::buffer::Position;

/// Selection range, kept as the fixed anchor plus the moving (active) end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started; stays put while the selection is extended.
    pub anchor: Position,
    /// The end that follows the cursor.
    pub active: Position,
}

/// Selection direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    /// Forward selection (anchor before active)
    Forward,
    /// Backward selection (active before anchor)
    Backward,
}

impl Selection {
    /// Create a selection from an anchor and an active end.
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// Whether anchor and active coincide.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// Drag direction.
    pub fn direction(&self) -> SelectionDirection {
        if self.anchor <= self.active {
            SelectionDirection::Forward
        } else {
            SelectionDirection::Backward
        }
    }

    /// `(start, end)` with `start <= end`, independent of drag direction.
    pub fn normalized(&self) -> (Position, Position) {
        if self.anchor <= self.active {
            (self.anchor, self.active)
        } else {
            (self.active, self.anchor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_selection_normalizes_like_forward() {
        let a = Position::new(1, 4);
        let b = Position::new(3, 0);
        let forward = Selection::new(a, b);
        let backward = Selection::new(b, a);
        assert_eq!(forward.normalized(), backward.normalized());
        assert_eq!(forward.direction(), SelectionDirection::Forward);
        assert_eq!(backward.direction(), SelectionDirection::Backward);
    }

    #[test]
    fn test_same_line_ordering_uses_column() {
        let sel = Selection::new(Position::new(2, 9), Position::new(2, 3));
        assert_eq!(sel.normalized(), (Position::new(2, 3), Position::new(2, 9)));
    }
}
