use crate::Dot;
use tracing::trace;

/// One primitive mutation and the exact payload needed to invert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    /// Records sharing an id are undone and redone as one unit.
    pub sequence_id: u64,
    pub dot_before: Dot,
    /// Dot as left by the command that produced this record; restored on redo.
    pub dot_after: Dot,
    /// Offset of the change; always its beginning.
    pub offset: usize,
    pub text: Vec<u8>,
    pub is_insert: bool,
}

/// Undo and redo stacks of [`UndoRecord`]s, grouped by sequence id.
///
/// Consecutive records share an id until a block boundary is requested with
/// [`UndoLog::end_block`] (or [`UndoLog::begin_block`]); the next recorded
/// edit then opens a fresh id. Undo and redo always close the current block.
#[derive(Debug, Clone)]
pub struct UndoLog {
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    sequence: u64,
    boundary_pending: bool,
    enabled: bool,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoLog {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            sequence: 0,
            boundary_pending: true,
            enabled: true,
        }
    }

    /// A log that never records (scratch and prompt buffers).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn undo_records(&self) -> &[UndoRecord] {
        &self.undo_stack
    }

    /// Mirror a mutation that has already been applied. Empty payloads are
    /// dropped; any recorded edit invalidates the redo history.
    pub fn record(&mut self, dot_before: Dot, dot_after: Dot, offset: usize, text: &[u8], is_insert: bool) {
        if !self.enabled || text.is_empty() {
            return;
        }
        if self.boundary_pending {
            self.sequence += 1;
            self.boundary_pending = false;
        }
        self.undo_stack.push(UndoRecord {
            sequence_id: self.sequence,
            dot_before,
            dot_after,
            offset,
            text: text.to_vec(),
            is_insert,
        });
        trace!(target: "state.undo", sequence_id = self.sequence, offset, len = text.len(), is_insert, undo_depth = self.undo_stack.len(), "record");
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    /// The next recorded edit starts a new group.
    pub fn begin_block(&mut self) {
        self.boundary_pending = true;
    }

    /// Close the current group.
    pub fn end_block(&mut self) {
        self.boundary_pending = true;
    }

    /// Stamp the final dot of a command onto the newest record, provided its
    /// group is still open.
    pub fn seal_dot(&mut self, dot: Dot) {
        if self.boundary_pending {
            return;
        }
        if let Some(last) = self.undo_stack.last_mut() {
            last.dot_after = dot;
        }
    }

    /// Pop every record of the newest group, newest first. The caller inverts
    /// them in the returned order and hands them back via [`Self::stash_redo`].
    pub fn take_undo_group(&mut self) -> Vec<UndoRecord> {
        self.boundary_pending = true;
        let group = take_group(&mut self.undo_stack);
        trace!(target: "state.undo", popped = group.len(), undo_depth = self.undo_stack.len(), "undo_pop");
        group
    }

    /// Pop every record of the most recently undone group, oldest first.
    pub fn take_redo_group(&mut self) -> Vec<UndoRecord> {
        self.boundary_pending = true;
        let group = take_group(&mut self.redo_stack);
        trace!(target: "state.undo", popped = group.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        group
    }

    /// Push an undone group (newest first) onto the redo stack so that its
    /// oldest record ends up on top.
    pub fn stash_redo(&mut self, group: Vec<UndoRecord>) {
        self.redo_stack.extend(group);
    }

    /// Push a redone group (oldest first) back onto the undo stack.
    pub fn stash_undo(&mut self, group: Vec<UndoRecord>) {
        self.undo_stack.extend(group);
    }
}

fn take_group(stack: &mut Vec<UndoRecord>) -> Vec<UndoRecord> {
    let Some(id) = stack.last().map(|r| r.sequence_id) else {
        return Vec::new();
    };
    let mut group = Vec::new();
    while stack.last().is_some_and(|r| r.sequence_id == id) {
        if let Some(r) = stack.pop() {
            group.push(r);
        }
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(log: &mut UndoLog, off: usize, text: &str) {
        log.record(Dot::point(off), Dot::point(off), off, text.as_bytes(), true);
    }

    #[test]
    fn consecutive_records_share_a_group_until_boundary() {
        let mut log = UndoLog::new();
        rec(&mut log, 0, "a");
        rec(&mut log, 1, "b");
        log.end_block();
        rec(&mut log, 2, "c");
        let ids: Vec<u64> = log.undo_records().iter().map(|r| r.sequence_id).collect();
        assert_eq!(ids, vec![1, 1, 2]);
    }

    #[test]
    fn empty_payload_is_not_recorded() {
        let mut log = UndoLog::new();
        rec(&mut log, 0, "");
        assert_eq!(log.undo_depth(), 0);
    }

    #[test]
    fn groups_move_between_stacks_in_order() {
        let mut log = UndoLog::new();
        rec(&mut log, 0, "a");
        rec(&mut log, 1, "b");
        let group = log.take_undo_group();
        assert_eq!(group.iter().map(|r| r.offset).collect::<Vec<_>>(), vec![1, 0]);
        log.stash_redo(group);
        assert_eq!(log.undo_depth(), 0);
        let group = log.take_redo_group();
        assert_eq!(group.iter().map(|r| r.offset).collect::<Vec<_>>(), vec![0, 1]);
        log.stash_undo(group);
        assert_eq!(log.undo_depth(), 2);
        assert_eq!(log.redo_depth(), 0);
    }

    #[test]
    fn new_record_clears_redo() {
        let mut log = UndoLog::new();
        rec(&mut log, 0, "a");
        let g = log.take_undo_group();
        log.stash_redo(g);
        assert_eq!(log.redo_depth(), 1);
        rec(&mut log, 0, "z");
        assert_eq!(log.redo_depth(), 0);
    }

    #[test]
    fn disabled_log_ignores_everything() {
        let mut log = UndoLog::disabled();
        rec(&mut log, 0, "a");
        assert_eq!(log.undo_depth(), 0);
        assert!(log.take_undo_group().is_empty());
    }

    #[test]
    fn seal_only_touches_open_group() {
        let mut log = UndoLog::new();
        rec(&mut log, 0, "abc");
        log.seal_dot(Dot::new(0, 3));
        assert_eq!(log.undo_records()[0].dot_after, Dot::new(0, 3));
        log.end_block();
        log.seal_dot(Dot::new(1, 2));
        assert_eq!(log.undo_records()[0].dot_after, Dot::new(0, 3));
    }
}
