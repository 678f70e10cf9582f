// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use tracing::debug;

use crate::ConversationTurn;

/// Handle to an optimistic placeholder turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderId(u64);

#[derive(Debug, Clone)]
struct Entry {
    turn: ConversationTurn,
    placeholder: Option<PlaceholderId>,
}

/// Ordered, append-only conversation log.
///
/// Placeholder turns live in the log like any other turn (so they render)
/// but are tagged; [`Conversation::resolve`] removes exactly the tagged turn
/// no matter how many other turns were appended after it.
#[derive(Debug, Clone)]
pub struct Conversation {
    entries: Vec<Entry>,
    next_placeholder: u64,
}

impl Conversation {
    /// A fresh log holding one assistant greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            entries: vec![Entry {
                turn: ConversationTurn::assistant(greeting),
                placeholder: None,
            }],
            next_placeholder: 0,
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.entries.push(Entry { turn, placeholder: None });
    }

    /// Appends an assistant placeholder and returns its handle.
    pub fn push_placeholder(&mut self, text: impl Into<String>) -> PlaceholderId {
        self.next_placeholder += 1;
        let id = PlaceholderId(self.next_placeholder);
        self.entries.push(Entry {
            turn: ConversationTurn::assistant(text),
            placeholder: Some(id),
        });
        id
    }

    /// Removes the placeholder `id` and appends `turn`.
    ///
    /// Returns `false` (and appends nothing) when the placeholder is gone,
    /// e.g. because the conversation was reset while the request was pending.
    pub fn resolve(&mut self, id: PlaceholderId, turn: ConversationTurn) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.placeholder == Some(id)) else {
            debug!(?id, "placeholder already gone; dropping response");
            return false;
        };
        self.entries.remove(pos);
        self.push(turn);
        true
    }

    /// Drops every turn and starts over with `greeting`.
    pub fn reset(&mut self, greeting: impl Into<String>) {
        *self = Self {
            next_placeholder: self.next_placeholder,
            ..Self::new(greeting)
        };
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> + '_ {
        self.entries.iter().map(|e| &e.turn)
    }

    /// Owned copy of the log, placeholders included.
    pub fn to_vec(&self) -> Vec<ConversationTurn> {
        self.turns().cloned().collect()
    }

    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| e.placeholder.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.entries.last().map(|e| &e.turn)
    }
}
