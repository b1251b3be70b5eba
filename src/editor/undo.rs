// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Undo/redo transaction stack (§4.I "Undo / redo"). Entries capture the
//! removed and inserted codepoint slices plus selection before/after;
//! `begin_transaction`/`end_transaction` coalesce entries recorded while
//! a transaction is open. Bounded by `max_undo_levels`, with oldest
//! transactions dropped on overflow.

use alloc::vec::Vec;
use core::ops::Range;

use super::selection::Selection;

/// One low-level mutation record within a transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct UndoEntry {
    pub range: Range<u32>,
    pub removed: Vec<char>,
    pub inserted: Vec<char>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

/// A group of entries that undo/redo as a single unit.
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    pub entries: Vec<UndoEntry>,
}

/// Bounded stack of undo transactions with depth-coalescing while a
/// transaction is open (§4.I "Undo / redo").
pub struct UndoStack {
    undo: Vec<Transaction>,
    redo: Vec<Transaction>,
    current: Option<Transaction>,
    depth: u32,
    max_levels: usize,
}

impl UndoStack {
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            current: None,
            depth: 0,
            max_levels: max_levels.max(1),
        }
    }

    /// Opens (or extends) a transaction; entries recorded while `depth >
    /// 0` coalesce into the outermost transaction.
    pub fn begin_transaction(&mut self) {
        self.depth += 1;
        self.current.get_or_insert_with(Transaction::default);
    }

    /// Closes one level of transaction nesting; the outermost call
    /// pushes the accumulated transaction onto the undo stack and clears
    /// the redo stack.
    pub fn end_transaction(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.flush_current();
        }
    }

    /// Records a single mutation. Outside any transaction, this closes
    /// immediately as a one-entry transaction.
    pub fn record(&mut self, entry: UndoEntry) {
        self.current.get_or_insert_with(Transaction::default).entries.push(entry);
        if self.depth == 0 {
            self.flush_current();
        }
    }

    fn flush_current(&mut self) {
        if let Some(txn) = self.current.take() {
            if !txn.entries.is_empty() {
                self.undo.push(txn);
                if self.undo.len() > self.max_levels {
                    self.undo.remove(0);
                }
                self.redo.clear();
            }
        }
    }

    /// Pops the most recent transaction for the caller to replay in
    /// reverse (inverse of each entry), pushing it onto the redo stack.
    pub fn undo(&mut self) -> Option<Transaction> {
        let txn = self.undo.pop()?;
        self.redo.push(txn.clone());
        Some(txn)
    }

    /// Pops the most recently undone transaction for the caller to
    /// replay in forward order (original entries), pushing it back onto
    /// the undo stack.
    pub fn redo(&mut self) -> Option<Transaction> {
        let txn = self.redo.pop()?;
        self.undo.push(txn.clone());
        Some(txn)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
