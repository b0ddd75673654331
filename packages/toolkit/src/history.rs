//! Command history with undo/redo and checkpoint-friendly positions.
//!
//! ## Design
//!
//! - Each command records its inverse before being applied
//! - Undo moves the entry to the redo stack and hands back the inverse
//! - Redo hands back the original command
//! - New commands clear the redo stack
//! - Every executed command carries a monotonically increasing serial;
//!   [`History::position`] is the serial on top of the undo stack. Serials
//!   are never reused, so a position compared against a saved checkpoint
//!   stays meaningful even after undo → new-command sequences.

#[derive(Debug, Clone)]
struct AppliedCommand<C> {
    forward: C,
    inverse: C,
    serial: u64,
}

/// Undo/redo log for engine commands.
#[derive(Debug)]
pub struct History<C> {
    undo_stack: Vec<AppliedCommand<C>>,
    redo_stack: Vec<AppliedCommand<C>>,
    next_serial: u64,
}

impl<C: Clone> History<C> {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_serial: 0,
        }
    }

    /// Record an already-applied command. Clears the redo stack.
    pub fn push(&mut self, forward: C, inverse: C) {
        self.next_serial += 1;
        self.undo_stack.push(AppliedCommand {
            forward,
            inverse,
            serial: self.next_serial,
        });
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Serial of the newest applied command, 0 when pristine.
    pub fn position(&self) -> u64 {
        self.undo_stack.last().map(|c| c.serial).unwrap_or(0)
    }

    /// Step back one entry, returning the inverse command to apply.
    pub fn undo(&mut self) -> Option<C> {
        let entry = self.undo_stack.pop()?;
        let inverse = entry.inverse.clone();
        self.redo_stack.push(entry);
        Some(inverse)
    }

    /// Step forward one entry, returning the original command to reapply.
    pub fn redo(&mut self) -> Option<C> {
        let entry = self.redo_stack.pop()?;
        let forward = entry.forward.clone();
        self.undo_stack.push(entry);
        Some(forward)
    }

    /// Drop all history. Serials keep counting up.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }
}

impl<C: Clone> Default for History<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_is_pristine() {
        let history: History<&str> = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.position(), 0);
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::new();
        history.push("set b", "set a");

        assert_eq!(history.undo(), Some("set a"));
        assert!(history.can_redo());
        assert_eq!(history.position(), 0);

        assert_eq!(history.redo(), Some("set b"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut history = History::new();
        history.push("b", "a");
        history.undo();
        history.push("c", "a");

        assert!(!history.can_redo());
    }

    #[test]
    fn test_position_never_aliases_after_undo_and_new_command() {
        let mut history = History::new();
        history.push("b", "a");
        let checkpoint = history.position();

        history.undo();
        history.push("c", "a");

        // Same depth as the checkpoint, different content.
        assert_eq!(history.len(), 1);
        assert_ne!(history.position(), checkpoint);
    }

    #[test]
    fn test_clear_keeps_serials_monotonic() {
        let mut history = History::new();
        history.push("b", "a");
        let before = history.position();
        history.clear();
        history.push("c", "a");

        assert!(history.position() > before);
    }
}
