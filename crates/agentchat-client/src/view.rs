// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Places a rendered transcript can be shown in.
//!
//! The client calls [`TranscriptView::show`] with the whole transcript after
//! every state change, hands chart jobs to its [`ChartSink`], and then calls
//! [`TranscriptView::scroll_to_latest`].

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use agentchat_render::{ChartJob, RenderedTranscript};
use agentchat_session::Role;

use crate::chart::{ChartSink, ScriptChartSink};

pub trait TranscriptView: Send {
    /// Replace the view contents with `transcript`.
    fn show(&mut self, transcript: &RenderedTranscript) -> std::io::Result<()>;

    /// Bring the most recent turn into view.
    fn scroll_to_latest(&mut self) -> std::io::Result<()>;
}

/// Shows nothing.
#[derive(Debug, Default)]
pub struct NullView;

impl TranscriptView for NullView {
    fn show(&mut self, _: &RenderedTranscript) -> std::io::Result<()> {
        Ok(())
    }

    fn scroll_to_latest(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Shows the same transcript in several views, e.g. terminal plus HTML page.
#[derive(Default)]
pub struct Fanout(pub Vec<Box<dyn TranscriptView>>);

impl TranscriptView for Fanout {
    fn show(&mut self, transcript: &RenderedTranscript) -> std::io::Result<()> {
        self.0.iter_mut().try_for_each(|v| v.show(transcript))
    }

    fn scroll_to_latest(&mut self) -> std::io::Result<()> {
        self.0.iter_mut().try_for_each(|v| v.scroll_to_latest())
    }
}

// ── HTML document ────────────────────────────────────────────────────────────

const HIGHCHARTS_URL: &str = "https://code.highcharts.com/highcharts.js";

/// Writes the transcript as a standalone HTML page that a browser can keep
/// open (and reload).  Chart scripts drawn through [`HtmlFileView::chart_sink`]
/// are appended after the chat box; the document is flushed on scroll.
#[derive(Debug)]
pub struct HtmlFileView {
    path: PathBuf,
    body: String,
    scripts: Arc<Mutex<Vec<String>>>,
}

impl HtmlFileView {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            body: String::new(),
            scripts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sink whose scripts end up in this document.
    pub fn chart_sink(&self) -> ScriptChartSink {
        ScriptChartSink::shared(Arc::clone(&self.scripts))
    }

    /// The full page for the current contents.
    pub fn document(&self) -> String {
        let scripts = self.scripts.lock().map(|s| s.join("\n")).unwrap_or_default();
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>agentchat</title>\n<script src=\"{HIGHCHARTS_URL}\"></script>\n\
             </head>\n<body>\n<div id=\"chat-box\">\n{body}\n</div>\n<script>\n{scripts}\n\
             var chatBox = document.getElementById(\"chat-box\");\n\
             chatBox.scrollTop = chatBox.scrollHeight;\n\
             window.scrollTo(0, document.body.scrollHeight);\n</script>\n</body>\n</html>\n",
            body = self.body,
        )
    }
}

impl TranscriptView for HtmlFileView {
    fn show(&mut self, transcript: &RenderedTranscript) -> std::io::Result<()> {
        self.body = transcript.html();
        if let Ok(mut s) = self.scripts.lock() {
            s.clear();
        }
        Ok(())
    }

    fn scroll_to_latest(&mut self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("html.tmp");
        std::fs::write(&tmp, self.document())?;
        std::fs::rename(&tmp, &self.path)
    }
}

// ── Terminal ─────────────────────────────────────────────────────────────────

/// Column width for terminal text.
const TEXT_WIDTH: usize = 100;

/// Plain-text rendering of one turn's HTML for terminals.
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), TEXT_WIDTH).trim().to_string()
}

/// Prints turns as they appear.  A turn is printed when its text differs
/// from what was last printed at the same position, so a resolved
/// placeholder or a reset log shows up as new output.  Text is compared
/// rather than HTML because chart placeholders get fresh ids on every render.
pub struct TerminalView {
    out: Box<dyn Write + Send>,
    printed: Vec<(Role, String)>,
}

impl TerminalView {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out, printed: Vec::new() }
    }
}

impl TranscriptView for TerminalView {
    fn show(&mut self, transcript: &RenderedTranscript) -> std::io::Result<()> {
        let texts: Vec<(Role, String)> = transcript
            .turns
            .iter()
            .map(|turn| (turn.role, html_to_text(&turn.html)))
            .collect();
        let first_new = texts
            .iter()
            .zip(&self.printed)
            .position(|(a, b)| a != b)
            .unwrap_or(self.printed.len());
        for (role, text) in texts.iter().skip(first_new) {
            let who = match role {
                Role::User => "you",
                Role::Assistant => "agent",
            };
            writeln!(self.out, "{who}> {text}")?;
        }
        self.printed = texts;
        Ok(())
    }

    fn scroll_to_latest(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }
}

// ── Recording (tests, embedding) ─────────────────────────────────────────────

/// What a [`Recorder`] saw, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Shown(RenderedTranscript),
    Chart(ChartJob),
    Scrolled,
}

/// A view and chart sink pair that logs every call into one shared list.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Every transcript shown so far.
    pub fn frames(&self) -> Vec<RenderedTranscript> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Shown(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ViewEvent) {
        if let Ok(mut e) = self.events.lock() {
            e.push(event);
        }
    }
}

impl TranscriptView for Recorder {
    fn show(&mut self, transcript: &RenderedTranscript) -> std::io::Result<()> {
        self.push(ViewEvent::Shown(transcript.clone()));
        Ok(())
    }

    fn scroll_to_latest(&mut self) -> std::io::Result<()> {
        self.push(ViewEvent::Scrolled);
        Ok(())
    }
}

impl ChartSink for Recorder {
    fn draw(&mut self, job: &ChartJob) {
        self.push(ViewEvent::Chart(job.clone()));
    }
}
