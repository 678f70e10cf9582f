// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Post-processing of rendered assistant HTML.
//!
//! Assistant answers may carry fenced annotations:
//!
//! ````markdown
//! ```summary
//! Revenue grew 12% quarter over quarter.
//! ```
//!
//! ```chart
//! {"title": {"text": "Revenue"}, "series": [{"data": [1, 2, 3]}]}
//! ```
//! ````
//!
//! By the time this stage runs the fence lines have already been through the
//! block renderer, so `<p>`, `</p>` and `<br>` may sit between a fence and its
//! body.  The patterns skip over those, and chart bodies are turned back into
//! plain JSON before parsing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Process-wide allocator of chart placeholder ids (`chart-1`, `chart-2`, …).
#[derive(Debug, Default)]
pub struct ChartIds {
    last: AtomicU64,
}

impl ChartIds {
    pub const fn new() -> Self {
        Self { last: AtomicU64::new(0) }
    }

    pub fn allocate(&self) -> String {
        let n = self.last.fetch_add(1, Ordering::Relaxed) + 1;
        format!("chart-{n}")
    }

    /// The allocator shared by every renderer in this process.
    pub fn global() -> Arc<ChartIds> {
        static GLOBAL: OnceLock<Arc<ChartIds>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ChartIds::new())))
    }
}

/// A chart to draw once the placeholder `id` is part of the visible view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartJob {
    pub id: String,
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Summary(String),
    Chart(ChartJob),
}

#[derive(Debug, thiserror::Error)]
pub enum ChartJsonParseError {
    #[error("chart body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("chart body must be a JSON object")]
    NotAnObject,
}

/// Result of post-processing one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostProcessed {
    pub html: String,
    pub annotations: Vec<Annotation>,
}

impl PostProcessed {
    pub fn chart_jobs(&self) -> impl Iterator<Item = &ChartJob> + '_ {
        self.annotations.iter().filter_map(|a| match a {
            Annotation::Chart(job) => Some(job),
            Annotation::Summary(_) => None,
        })
    }

    pub fn into_chart_jobs(self) -> Vec<ChartJob> {
        self.annotations
            .into_iter()
            .filter_map(|a| match a {
                Annotation::Chart(job) => Some(job),
                Annotation::Summary(_) => None,
            })
            .collect()
    }
}

/// Markup the block renderer may leave between a fence and its body.
const GAP: &str = r"(?:\s|<br>|</?p>)*";

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?is)```summary{GAP}(.*?){GAP}```")).expect("summary pattern")
    })
}

fn chart_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // The body runs to the closing fence so that an unterminated object
        // still reaches the parser and yields the diagnostic.
        Regex::new(&format!(r"(?is)```chart{GAP}(\{{.*?){GAP}```")).expect("chart pattern")
    })
}

fn paragraph_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</p>\s*<p>").expect("paragraph break pattern"))
}

#[derive(Debug, Clone)]
pub struct PostProcessor {
    ids: Arc<ChartIds>,
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(ChartIds::global())
    }
}

impl PostProcessor {
    pub fn new(ids: Arc<ChartIds>) -> Self {
        Self { ids }
    }

    /// Rewrites the first summary fence and every chart fence in `html`.
    pub fn process(&self, html: &str) -> PostProcessed {
        let mut annotations = Vec::new();

        let html = summary_re().replace(html, |caps: &Captures| {
            let text = paragraph_break_re()
                .replace_all(caps[1].trim(), "<br>")
                .into_owned();
            let callout = format!("<div class=\"summary-box\"><strong>Summary:</strong> {text}</div>");
            annotations.push(Annotation::Summary(text));
            callout
        });

        let html = chart_re().replace_all(&html, |caps: &Captures| {
            match parse_chart_config(&caps[1]) {
                Ok(config) => {
                    let id = self.ids.allocate();
                    let placeholder = format!("<div id=\"{id}\" class=\"chart-container\"></div>");
                    debug!(%id, "chart placeholder");
                    annotations.push(Annotation::Chart(ChartJob { id, config }));
                    placeholder
                }
                Err(e) => {
                    warn!(error = %e, "invalid chart annotation");
                    "<pre>Invalid chart JSON</pre>".to_string()
                }
            }
        });

        PostProcessed {
            html: html.into_owned(),
            annotations,
        }
    }
}

/// Turns a rendered chart body back into JSON text and parses it.
pub fn parse_chart_config(rendered: &str) -> Result<Value, ChartJsonParseError> {
    let json = rendered
        .replace("<p>", "")
        .replace("</p>", "")
        .replace("<br>", "")
        .replace("<strong>", "**")
        .replace("</strong>", "**")
        .replace("<em>", "*")
        .replace("</em>", "*")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    let value: Value = serde_json::from_str(&json)?;
    if !value.is_object() {
        return Err(ChartJsonParseError::NotAnObject);
    }
    Ok(value)
}
