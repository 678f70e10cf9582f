// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use agentchat_config::SessionConfig;
use tracing::{debug, info};

use crate::{Conversation, KvStore, StoreError};

/// Store key of the active conversation id.
pub const CONVERSATION_ID_KEY: &str = "conversationId";
/// Store key of the conversation id returned by the last data upload.
pub const LAST_DATA_CONVERSATION_ID_KEY: &str = "lastDataConvId";

/// Everything a chat page keeps between events: the conversation log and the
/// backend conversation id, backed by a durable store.
pub struct SessionState {
    pub conversation: Conversation,
    conversation_id: Option<String>,
    store: Box<dyn KvStore>,
    config: SessionConfig,
}

impl SessionState {
    /// Fresh log with the greeting; the conversation id is restored from
    /// `store` when present.
    pub fn restore(config: SessionConfig, store: Box<dyn KvStore>) -> Self {
        let conversation_id = store.get(CONVERSATION_ID_KEY);
        if let Some(id) = &conversation_id {
            debug!(conversation_id = %id, "restored conversation id");
        }
        Self {
            conversation: Conversation::new(config.greeting.clone()),
            conversation_id,
            store,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn set_conversation_id(&mut self, id: &str) -> Result<(), StoreError> {
        self.conversation_id = Some(id.to_string());
        self.store.set(CONVERSATION_ID_KEY, id)
    }

    pub fn last_data_conversation_id(&self) -> Option<String> {
        self.store.get(LAST_DATA_CONVERSATION_ID_KEY)
    }

    pub fn remember_data_conversation(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.set(LAST_DATA_CONVERSATION_ID_KEY, id)
    }

    /// The id an ask should carry: the active conversation, else (when
    /// enabled) the conversation created by the last data upload.
    pub fn ask_conversation_id(&self) -> Option<String> {
        if let Some(id) = &self.conversation_id {
            return Some(id.clone());
        }
        if self.config.use_data_conversation {
            let id = self.last_data_conversation_id();
            if let Some(id) = &id {
                debug!(conversation_id = %id, "using last data conversation id");
            }
            return id;
        }
        None
    }

    /// "New conversation": forget the persisted id and reset the log.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        info!("starting a new conversation");
        self.conversation_id = None;
        self.conversation.reset(self.config.reset_greeting.clone());
        self.store.remove(CONVERSATION_ID_KEY)
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("conversation", &self.conversation)
            .field("conversation_id", &self.conversation_id)
            .finish_non_exhaustive()
    }
}
