// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::OnceLock;

use agentchat_config::RenderFeatures;
use regex::Regex;

/// Structural kind of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Heading { level: u8, text: String },
    OrderedListItem(String),
    UnorderedListItem(String),
    TableRow(Vec<String>),
    TableSeparator,
    Paragraph(String),
}

/// Where the block being accumulated stands with respect to tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TablePosition {
    /// No table is open.
    #[default]
    Outside,
    /// A header row was recorded and no body row yet.
    AfterHeader,
    /// At least one body row was recorded.
    InBody,
}

fn ordered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").expect("ordered list pattern"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[:\-]+$").expect("separator pattern"))
}

/// Classifies one escaped, inline-formatted, right-trimmed line.
///
/// Heading and list checks run before the pipe check, so a list item that
/// contains `|` stays a list item.  A separator-shaped row is only a
/// separator directly below a table header; anywhere else it is a row.
pub fn classify(line: &str, table: TablePosition, features: &RenderFeatures) -> LineKind {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return LineKind::Heading { level: 1, text: rest.trim().to_string() };
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return LineKind::Heading { level: 2, text: rest.trim().to_string() };
    }
    if let Some(m) = ordered_re().find(line) {
        return LineKind::OrderedListItem(line[m.end()..].to_string());
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return LineKind::UnorderedListItem(rest.to_string());
    }
    if features.tables && line.contains('|') {
        let cells = split_cells(line);
        if cells.len() > 1 {
            let separator = cells.iter().all(|c| separator_re().is_match(c));
            if separator && table == TablePosition::AfterHeader {
                return LineKind::TableSeparator;
            }
            return LineKind::TableRow(cells);
        }
    }
    LineKind::Paragraph(line.to_string())
}

/// `| a | b |` → `["a", "b"]`.  Empty segments are dropped.
fn split_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENHANCED: RenderFeatures = RenderFeatures::enhanced();
    const BASIC: RenderFeatures = RenderFeatures::basic();

    fn kind(line: &str) -> LineKind {
        classify(line, TablePosition::Outside, &ENHANCED)
    }

    #[test]
    fn empty_is_blank() {
        assert_eq!(kind(""), LineKind::Blank);
    }

    #[test]
    fn headings_are_trimmed() {
        assert_eq!(kind("#  Title "), LineKind::Heading { level: 1, text: "Title".into() });
        assert_eq!(kind("## Sub"), LineKind::Heading { level: 2, text: "Sub".into() });
        assert_eq!(kind("### Deep"), LineKind::Paragraph("### Deep".into()));
        assert_eq!(kind("#NoSpace"), LineKind::Paragraph("#NoSpace".into()));
    }

    #[test]
    fn ordered_items_strip_number() {
        assert_eq!(kind("12. twelve"), LineKind::OrderedListItem("twelve".into()));
        assert_eq!(kind("1.no space"), LineKind::Paragraph("1.no space".into()));
    }

    #[test]
    fn unordered_items_strip_marker() {
        assert_eq!(kind("- dash"), LineKind::UnorderedListItem("dash".into()));
        assert_eq!(kind("* star"), LineKind::UnorderedListItem("star".into()));
    }

    #[test]
    fn list_item_with_pipe_is_not_a_table_row() {
        assert_eq!(kind("- a | b"), LineKind::UnorderedListItem("a | b".into()));
    }

    #[test]
    fn pipe_rows_need_two_cells() {
        assert_eq!(
            kind("| A | B |"),
            LineKind::TableRow(vec!["A".into(), "B".into()])
        );
        assert_eq!(kind("| lonely |"), LineKind::Paragraph("| lonely |".into()));
        assert_eq!(kind("a || b"), LineKind::TableRow(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn separator_only_directly_after_header() {
        let line = "| :--- | ---: |";
        assert_eq!(
            classify(line, TablePosition::AfterHeader, &ENHANCED),
            LineKind::TableSeparator
        );
        assert_eq!(
            classify(line, TablePosition::InBody, &ENHANCED),
            LineKind::TableRow(vec![":---".into(), "---:".into()])
        );
        assert_eq!(
            classify(line, TablePosition::Outside, &ENHANCED),
            LineKind::TableRow(vec![":---".into(), "---:".into()])
        );
    }

    #[test]
    fn tables_disabled_yield_paragraphs() {
        assert_eq!(
            classify("| A | B |", TablePosition::Outside, &BASIC),
            LineKind::Paragraph("| A | B |".into())
        );
    }

    #[test]
    fn everything_else_is_a_paragraph() {
        assert_eq!(kind("  indented"), LineKind::Paragraph("  indented".into()));
    }
}
