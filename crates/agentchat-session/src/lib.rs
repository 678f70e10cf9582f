// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Conversation log, placeholder turns and the durable session state that
//! survives restarts (the active conversation id).

mod turn;
mod log;
pub mod store;
mod state;

pub use turn::{ConversationTurn, Role};
pub use log::{Conversation, PlaceholderId};
pub use store::{FileStore, KvStore, MemoryStore, StoreError};
pub use state::{SessionState, CONVERSATION_ID_KEY, LAST_DATA_CONVERSATION_ID_KEY};
