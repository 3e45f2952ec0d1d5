//! Exactly-K-of-N photo selection.
//!
//! The gate owns the set of chosen photo indices and enforces the cap at the
//! moment a toggle is attempted, so the stored selection never exceeds
//! [`config::SELECTION_SIZE`] between events.

use std::collections::BTreeSet;

use crate::config;

/// Result of a single toggle attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Index was added to the selection
    Added,
    /// Index was already selected and has been removed
    Removed,
    /// Selection is full; the toggle was rejected and must be reverted
    RejectedFull,
}

/// Choose-exactly-K-of-N gate over 1-based photo indices
#[derive(Debug, Clone, Default)]
pub struct SelectionGate {
    chosen: BTreeSet<usize>,
}

impl SelectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a photo index, rejecting growth past the cap
    pub fn toggle(&mut self, index: usize) -> ToggleOutcome {
        if self.chosen.remove(&index) {
            ToggleOutcome::Removed
        } else if self.chosen.len() >= config::SELECTION_SIZE {
            ToggleOutcome::RejectedFull
        } else {
            self.chosen.insert(index);
            ToggleOutcome::Added
        }
    }

    pub fn count(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.chosen.contains(&index)
    }

    /// True when exactly K photos are selected and submission is allowed
    pub fn is_complete(&self) -> bool {
        self.chosen.len() == config::SELECTION_SIZE
    }

    /// The selected indices in ascending capture order, regardless of the
    /// order they were toggled in. `None` unless the selection is complete.
    pub fn submit(&self) -> Option<Vec<usize>> {
        if self.is_complete() {
            Some(self.chosen.iter().copied().collect())
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_on_off() {
        let mut gate = SelectionGate::new();
        assert_eq!(gate.toggle(3), ToggleOutcome::Added);
        assert!(gate.is_selected(3));
        assert_eq!(gate.toggle(3), ToggleOutcome::Removed);
        assert!(!gate.is_selected(3));
        assert_eq!(gate.count(), 0);
    }

    #[test]
    fn test_count_never_exceeds_cap() {
        let mut gate = SelectionGate::new();
        for i in 1..=4 {
            assert_eq!(gate.toggle(i), ToggleOutcome::Added);
        }
        // Every further ON attempt is rejected at the attempt itself
        for i in 5..=8 {
            assert_eq!(gate.toggle(i), ToggleOutcome::RejectedFull);
            assert_eq!(gate.count(), 4);
            assert!(!gate.is_selected(i));
        }
    }

    #[test]
    fn test_reject_then_swap() {
        let mut gate = SelectionGate::new();
        for i in 1..=4 {
            gate.toggle(i);
        }
        assert_eq!(gate.toggle(7), ToggleOutcome::RejectedFull);
        // Removing one frees a slot
        assert_eq!(gate.toggle(2), ToggleOutcome::Removed);
        assert_eq!(gate.toggle(7), ToggleOutcome::Added);
        assert_eq!(gate.submit(), Some(vec![1, 3, 4, 7]));
    }

    #[test]
    fn test_submit_requires_exact_count() {
        let mut gate = SelectionGate::new();
        assert_eq!(gate.submit(), None);
        gate.toggle(1);
        gate.toggle(2);
        gate.toggle(3);
        assert_eq!(gate.submit(), None);
        gate.toggle(4);
        assert_eq!(gate.submit(), Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_submit_orders_by_index_not_toggle_order() {
        let mut gate = SelectionGate::new();
        for i in [6, 2, 8, 5] {
            assert_eq!(gate.toggle(i), ToggleOutcome::Added);
        }
        assert_eq!(gate.submit(), Some(vec![2, 5, 6, 8]));
    }

    #[test]
    fn test_clear() {
        let mut gate = SelectionGate::new();
        gate.toggle(1);
        gate.toggle(2);
        gate.clear();
        assert_eq!(gate.count(), 0);
        assert_eq!(gate.toggle(1), ToggleOutcome::Added);
    }
}
