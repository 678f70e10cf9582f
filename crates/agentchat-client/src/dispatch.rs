// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Action dispatcher: maps every user action to one [`ChatClient`] handler.

use std::path::PathBuf;

use crate::client::ChatClient;
use crate::status::{Panel, StatusLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ask a question.
    Send(String),
    /// Upload local files to the index.
    UploadFiles(Vec<PathBuf>),
    /// Replace the URL list with newline-separated text.
    SetUrls(String),
    /// Send the current URL list to the backend.
    UploadUrls,
    ClearIndex,
    /// Set domain instructions (`None`: profile default).
    Configure(Option<String>),
    /// Start a new conversation.
    Reset,
}

impl Action {
    /// Panel whose status line reports this action, if any.
    pub fn panel(&self) -> Option<Panel> {
        match self {
            Action::Send(_) => None,
            Action::UploadFiles(_) => Some(Panel::Files),
            Action::SetUrls(_) | Action::UploadUrls => Some(Panel::Urls),
            Action::ClearIndex => Some(Panel::Clear),
            Action::Configure(_) | Action::Reset => Some(Panel::Config),
        }
    }
}

impl ChatClient {
    /// Run `action` and return the status line it ended with.
    pub async fn dispatch(&mut self, action: Action) -> Option<StatusLine> {
        let panel = action.panel();
        match action {
            Action::Send(text) => self.send(&text).await,
            Action::UploadFiles(paths) => self.upload_files(&paths).await,
            Action::SetUrls(text) => self.set_urls(&text),
            Action::UploadUrls => self.upload_urls().await,
            Action::ClearIndex => self.clear_index().await,
            Action::Configure(text) => self.configure(text.as_deref()).await,
            Action::Reset => self.reset(),
        }
        panel.and_then(|p| self.status(p).cloned())
    }
}
