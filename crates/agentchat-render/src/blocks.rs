// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Block accumulator: groups consecutive list items and table rows.
//!
//! ```text
//!            list item                     table row
//!   Idle ───────────────▶ InList(kind)    Idle ─────────▶ InTable(header)
//!    ▲   anything else /     │ same kind    ▲               │ row → body
//!    └── end of input ───────┘ appends      └── other ──────┘ separator ignored
//! ```

use std::fmt::Write as _;

use agentchat_config::RenderFeatures;
use tracing::trace;

use crate::classify::{LineKind, TablePosition};

/// A run of lines rendered as one HTML unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    List { ordered: bool, items: Vec<String> },
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Leaf(String),
}

impl Block {
    pub fn to_html(&self) -> String {
        match self {
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let mut html = format!("<{tag}>\n");
                for item in items {
                    let _ = writeln!(html, "<li>{item}</li>");
                }
                let _ = write!(html, "</{tag}>");
                html
            }
            Block::Table { header, rows } => {
                let mut html = String::from("<div class=\"table-wrapper\"><table><thead><tr>");
                for cell in header {
                    let _ = write!(html, "<th>{cell}</th>");
                }
                html.push_str("</tr></thead><tbody>");
                for row in rows {
                    html.push_str("<tr>");
                    for cell in row {
                        let _ = write!(html, "<td>{cell}</td>");
                    }
                    html.push_str("</tr>");
                }
                html.push_str("</tbody></table></div>");
                html
            }
            Block::Leaf(html) => html.clone(),
        }
    }
}

/// Stateful pass over classified lines.  At most one list or table block is
/// open at a time; leaves (headings, paragraphs) are emitted immediately.
#[derive(Debug)]
pub struct BlockAccumulator {
    features: RenderFeatures,
    open: Option<Block>,
    out: String,
    emitted: usize,
}

impl BlockAccumulator {
    pub fn new(features: RenderFeatures) -> Self {
        Self {
            features,
            open: None,
            out: String::new(),
            emitted: 0,
        }
    }

    /// Table context the classifier needs for the next line.
    pub fn table_position(&self) -> TablePosition {
        match &self.open {
            Some(Block::Table { rows, .. }) if rows.is_empty() => TablePosition::AfterHeader,
            Some(Block::Table { .. }) => TablePosition::InBody,
            _ => TablePosition::Outside,
        }
    }

    pub fn push(&mut self, line: LineKind) {
        match line {
            LineKind::Blank => {
                self.close();
                if self.features.line_breaks {
                    self.out.push_str("<br>");
                }
            }
            LineKind::Heading { level, text } => {
                self.close();
                self.emit(Block::Leaf(format!("<h{level}>{text}</h{level}>")));
            }
            LineKind::OrderedListItem(item) => {
                let ordered = self.features.ordered_lists;
                self.push_item(ordered, item);
            }
            LineKind::UnorderedListItem(item) => self.push_item(false, item),
            LineKind::TableRow(cells) => match &mut self.open {
                Some(Block::Table { rows, .. }) => rows.push(cells),
                _ => {
                    self.close();
                    self.open = Some(Block::Table { header: cells, rows: Vec::new() });
                }
            },
            LineKind::TableSeparator => {}
            LineKind::Paragraph(text) => {
                self.close();
                self.emit(Block::Leaf(format!("<p>{text}</p>")));
            }
        }
    }

    /// Flushes any open block and returns the message HTML.
    pub fn finish(mut self) -> String {
        self.close();
        trace!(blocks = self.emitted, "message rendered");
        self.out.trim().to_string()
    }

    fn push_item(&mut self, ordered: bool, item: String) {
        match &mut self.open {
            Some(Block::List { ordered: o, items }) if *o == ordered => items.push(item),
            _ => {
                self.close();
                self.open = Some(Block::List { ordered, items: vec![item] });
            }
        }
    }

    fn close(&mut self) {
        if let Some(block) = self.open.take() {
            self.emit(block);
        }
    }

    fn emit(&mut self, block: Block) {
        self.out.push_str(&block.to_html());
        self.out.push('\n');
        self.emitted += 1;
    }
}
