//! Undo/redo command history with grouping
//!
//! Commands are pushed after they have been applied. While a group is open
//! (between [`CommandHistory::begin_group`] and [`CommandHistory::end_group`])
//! pushed commands are buffered and committed as one composite, so a whole
//! paint stroke undoes in a single step.

use crate::{EditCommand, Level};

/// Default maximum number of undo entries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Snapshot of the history passed to listeners
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_label: Option<String>,
    pub redo_label: Option<String>,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

/// Handle returned by [`CommandHistory::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryListenerId(u64);

type HistoryListener = Box<dyn FnMut(&HistoryStatus)>;

#[derive(Debug)]
struct OpenGroup {
    label: String,
    depth: usize,
    commands: Vec<EditCommand>,
}

/// Stack-based command log
pub struct CommandHistory {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
    group: Option<OpenGroup>,
    limit: usize,
    listeners: Vec<(HistoryListenerId, HistoryListener)>,
    next_listener: u64,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a history keeping at most `limit` undo entries (0 = unbounded)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            group: None,
            limit,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Record an already-applied command and clear the redo stack
    ///
    /// Inside an open group the command is buffered instead and listeners
    /// are not notified until the group ends.
    pub fn push(&mut self, command: EditCommand) {
        if let Some(group) = self.group.as_mut() {
            group.commands.push(command);
            return;
        }
        self.commit(command);
    }

    /// Open a group. Nested calls are counted; only the outermost
    /// [`CommandHistory::end_group`] commits.
    pub fn begin_group(&mut self, label: impl Into<String>) {
        match self.group.as_mut() {
            Some(group) => group.depth += 1,
            None => {
                self.group = Some(OpenGroup {
                    label: label.into(),
                    depth: 1,
                    commands: Vec::new(),
                });
            }
        }
    }

    /// Close a group, committing its commands as one composite
    ///
    /// Returns `true` when a composite was pushed. Empty groups and calls
    /// without an open group push nothing.
    pub fn end_group(&mut self) -> bool {
        let Some(group) = self.group.as_mut() else {
            return false;
        };
        group.depth -= 1;
        if group.depth > 0 {
            return false;
        }
        let Some(group) = self.group.take() else {
            return false;
        };
        if group.commands.is_empty() {
            return false;
        }
        self.commit(EditCommand::composite(group.label, group.commands));
        true
    }

    pub fn is_grouping(&self) -> bool {
        self.group.is_some()
    }

    /// Undo the most recent command. Returns `false` on an empty stack.
    ///
    /// An open group is committed first so its edits are undone together,
    /// then reopened empty under the same label: whoever opened it still
    /// owns the matching [`CommandHistory::end_group`].
    pub fn undo(&mut self, level: &mut Level) -> bool {
        let reopen = self.close_open_group();
        let undone = match self.undo_stack.pop() {
            Some(command) => {
                tracing::debug!("undo: {}", command.label());
                command.revert(level);
                level.grid.flush_dirty();
                self.redo_stack.push(command);
                self.notify();
                true
            }
            None => false,
        };
        self.group = reopen;
        undone
    }

    /// Redo the most recently undone command. Returns `false` on an empty stack.
    ///
    /// An open group is handled as in [`CommandHistory::undo`].
    pub fn redo(&mut self, level: &mut Level) -> bool {
        let reopen = self.close_open_group();
        let redone = match self.redo_stack.pop() {
            Some(command) => {
                tracing::debug!("redo: {}", command.label());
                command.apply(level);
                level.grid.flush_dirty();
                self.undo_stack.push(command);
                self.notify();
                true
            }
            None => false,
        };
        self.group = reopen;
        redone
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn peek_undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(EditCommand::label)
    }

    pub fn peek_redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(EditCommand::label)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// The undo stack, oldest first
    pub fn undo_entries(&self) -> &[EditCommand] {
        &self.undo_stack
    }

    /// Drop all entries and any open group
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group = None;
        self.notify();
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_label: self.peek_undo_label().map(str::to_string),
            redo_label: self.peek_redo_label().map(str::to_string),
            undo_depth: self.undo_stack.len(),
            redo_depth: self.redo_stack.len(),
        }
    }

    /// Subscribe to stack changes (one call per push, undo or redo)
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&HistoryStatus) + 'static,
    ) -> HistoryListenerId {
        let id = HistoryListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: HistoryListenerId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    /// Commit an open group, returning an empty copy to reopen afterwards
    fn close_open_group(&mut self) -> Option<OpenGroup> {
        let group = self.group.as_mut()?;
        tracing::debug!("committing open group '{}'", group.label);
        let reopen = OpenGroup {
            label: group.label.clone(),
            depth: group.depth,
            commands: Vec::new(),
        };
        group.depth = 1;
        self.end_group();
        Some(reopen)
    }

    fn commit(&mut self, command: EditCommand) {
        tracing::debug!("push: {}", command.label());
        self.redo_stack.clear();
        self.undo_stack.push(command);
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            let drain = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(0..drain);
        }
        self.notify();
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let status = self.status();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&status);
        }
    }
}

impl std::fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("group", &self.group)
            .field("limit", &self.limit)
            .finish()
    }
}
