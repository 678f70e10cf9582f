// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The chat page without a browser: session state, backend calls, status
//! lines, and a pluggable view the transcript is rendered into.

pub mod chart;
mod client;
mod dispatch;
pub mod status;
pub mod validate;
pub mod view;

pub use chart::{ChartSink, LogChartSink, ScriptChartSink};
pub use client::ChatClient;
pub use dispatch::Action;
pub use status::{Panel, StatusBoard, StatusKind, StatusLine};
pub use validate::ValidationError;
pub use view::{Fanout, HtmlFileView, NullView, Recorder, TerminalView, TranscriptView, ViewEvent};
