//! Reversible commands and a linear undo/redo history.
//!
//! A [`Command`] captures whatever state it needs to invert itself when it
//! is constructed. [`CommandHistory`] runs commands against a target and
//! keeps two stacks: executed commands and undone commands. Executing a new
//! command discards the redo stack.

mod diet;

pub use diet::{AddToLog, DietState, RemoveFromLog, UpdateProfile};

use std::collections::VecDeque;

/// A reversible mutation of `T`.
///
/// `undo` must restore every observable part of `T` that `execute` changed.
/// Neither step can fail; validation happens before a command is built.
pub trait Command<T> {
    fn execute(&self, target: &mut T);
    fn undo(&self, target: &mut T);
    fn description(&self) -> String;
}

/// Executed and undone commands, most recent at the back.
pub struct CommandHistory<T> {
    history: VecDeque<Box<dyn Command<T>>>,
    redo: VecDeque<Box<dyn Command<T>>>,
    limit: Option<usize>,
}

impl<T> CommandHistory<T> {
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
            redo: VecDeque::new(),
            limit: None,
        }
    }

    /// Keeps at most `limit` executed commands; the oldest are dropped.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Runs `command`, records it, and clears the redo stack.
    pub fn execute(&mut self, command: Box<dyn Command<T>>, target: &mut T) {
        tracing::debug!("Execute: {}", command.description());
        command.execute(target);
        self.push_history(command);
        self.redo.clear();
    }

    /// Reverts the most recent command. Returns its description, or `None`
    /// if there is nothing to undo.
    pub fn undo(&mut self, target: &mut T) -> Option<String> {
        let Some(command) = self.history.pop_back() else {
            tracing::info!("Nothing to undo");
            return None;
        };
        tracing::debug!("Undo: {}", command.description());
        command.undo(target);
        let description = command.description();
        self.redo.push_back(command);
        Some(description)
    }

    /// Re-applies the most recently undone command. Returns its
    /// description, or `None` if there is nothing to redo.
    pub fn redo(&mut self, target: &mut T) -> Option<String> {
        let Some(command) = self.redo.pop_back() else {
            tracing::info!("Nothing to redo");
            return None;
        };
        tracing::debug!("Redo: {}", command.description());
        command.execute(target);
        let description = command.description();
        self.push_history(command);
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Descriptions of executed commands, oldest first.
    pub fn history_descriptions(&self) -> Vec<String> {
        self.history.iter().map(|c| c.description()).collect()
    }

    /// Descriptions of undone commands, next-to-redo last.
    pub fn redo_descriptions(&self) -> Vec<String> {
        self.redo.iter().map(|c| c.description()).collect()
    }

    /// Forgets both stacks without touching the target.
    pub fn clear(&mut self) {
        self.history.clear();
        self.redo.clear();
    }

    fn push_history(&mut self, command: Box<dyn Command<T>>) {
        self.history.push_back(command);
        if let Some(limit) = self.limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }
}

impl<T> Default for CommandHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}
