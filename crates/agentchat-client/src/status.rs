// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;

/// The side panels that report progress independently of the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Panel {
    Files,
    Urls,
    Clear,
    Config,
}

impl Panel {
    pub fn label(self) -> &'static str {
        match self {
            Panel::Files => "files",
            Panel::Urls => "urls",
            Panel::Clear => "clear",
            Panel::Config => "config",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// A request is in flight; the panel shows its working indicator.
    Working,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    pub fn working(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Working, text: text.into() }
    }

    pub fn ok(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Ok, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl std::fmt::Display for StatusLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Latest status line per panel.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    lines: BTreeMap<Panel, StatusLine>,
}

impl StatusBoard {
    pub fn set(&mut self, panel: Panel, line: StatusLine) {
        tracing::debug!(panel = panel.label(), kind = ?line.kind, text = %line.text, "status");
        self.lines.insert(panel, line);
    }

    pub fn get(&self, panel: Panel) -> Option<&StatusLine> {
        self.lines.get(&panel)
    }
}
