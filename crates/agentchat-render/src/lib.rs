// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Markdown → HTML for chat transcripts.
//!
//! Pipeline per message: [`inline::format_inline`] (escape, then emphasis) →
//! line split → [`classify::classify`] → [`blocks::BlockAccumulator`] →
//! for assistant turns [`annotate::PostProcessor`].  The supported Markdown
//! is deliberately small: `#`/`##` headings, `-`/`*` and numbered lists,
//! pipe tables, `**bold**`, `*italic*`.

pub mod annotate;
pub mod blocks;
pub mod classify;
pub mod inline;
mod transcript;

pub use agentchat_config::RenderFeatures;
pub use annotate::{Annotation, ChartIds, ChartJob, ChartJsonParseError, PostProcessed, PostProcessor};
pub use blocks::{Block, BlockAccumulator};
pub use classify::{classify, LineKind, TablePosition};
pub use transcript::{RenderedTranscript, RenderedTurn, TranscriptRenderer};

/// Renders one message to HTML (no annotation pass).
pub fn render_markdown(text: &str, features: &RenderFeatures) -> String {
    if text.is_empty() {
        return String::new();
    }
    let formatted = inline::format_inline(text);
    let mut acc = BlockAccumulator::new(*features);
    let mut in_chart = false;
    for raw in formatted.split('\n') {
        let line = raw.trim_end();
        let kind = if in_chart {
            // Chart bodies stay verbatim so the JSON survives to the annotation pass.
            in_chart = !line.ends_with("```");
            if line.is_empty() {
                LineKind::Blank
            } else {
                LineKind::Paragraph(line.to_string())
            }
        } else {
            in_chart = features.annotations && opens_chart_fence(line);
            classify(line, acc.table_position(), features)
        };
        acc.push(kind);
    }
    acc.finish()
}

/// A ```` ```chart ```` line whose closing fence is not on the same line.
fn opens_chart_fence(line: &str) -> bool {
    const FENCE: &str = "```chart";
    let line = line.trim_start();
    match line.get(..FENCE.len()) {
        Some(head) if head.eq_ignore_ascii_case(FENCE) => !line[FENCE.len()..].contains("```"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enhanced(text: &str) -> String {
        render_markdown(text, &RenderFeatures::enhanced())
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(enhanced(""), "");
    }

    #[test]
    fn list_grouping_across_blank_line() {
        let html = enhanced("- a\n- b\n\n- c");
        assert_eq!(
            html,
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n<br><ul>\n<li>c</li>\n</ul>"
        );
        let lists: Vec<&str> = html.split("</ul>").filter(|s| s.contains("<ul>")).collect();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].matches("<li>").count(), 2);
        assert_eq!(lists[1].matches("<li>").count(), 1);
    }

    #[test]
    fn table_round_trip_drops_separator() {
        let html = enhanced("| A | B |\n| - | - |\n| 1 | 2 |");
        assert_eq!(
            html,
            "<div class=\"table-wrapper\"><table><thead><tr><th>A</th><th>B</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr></tbody></table></div>"
        );
    }

    #[test]
    fn paragraph_after_list_item_closes_list_first() {
        let html = enhanced("- item\nafter");
        assert_eq!(html, "<ul>\n<li>item</li>\n</ul>\n<p>after</p>");
    }

    #[test]
    fn escaping_never_leaks_markup() {
        let html = enhanced("<script>alert(1)</script>\n- <b>&</b>\n| <i> | x |");
        assert!(!html.contains("<script"));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("<i>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }

    #[test]
    fn headings_and_emphasis() {
        assert_eq!(
            enhanced("# Report\n## *Q1*\nTotal: **42**"),
            "<h1>Report</h1>\n<h2><em>Q1</em></h2>\n<p>Total: <strong>42</strong></p>"
        );
    }

    #[test]
    fn crlf_line_endings_are_trimmed() {
        assert_eq!(enhanced("a\r\n- b\r\n"), "<p>a</p>\n<ul>\n<li>b</li>\n</ul>\n<br>");
    }

    #[test]
    fn basic_variant_renders_numbers_as_bullets_without_breaks() {
        let html = render_markdown("1. one\n2. two\n\nend", &RenderFeatures::basic());
        assert_eq!(html, "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<p>end</p>");
    }

    #[test]
    fn chart_body_lines_are_not_classified() {
        let html = enhanced(
            "| A | B |\n```chart\n{\n\"tooltip\": {\"pointFormat\": \"{series.name} | {point.y}\"},\n\
             - \"x\"\n}\n```\n| 1 | 2 |",
        );
        assert!(!html.contains("<td>{series.name}</td>"));
        assert!(!html.contains("<li>"));
        assert!(html.contains("<p>\"tooltip\": {\"pointFormat\": \"{series.name} | {point.y}\"},</p>"));
        assert!(html.ends_with("<p>```</p>\n<div class=\"table-wrapper\"><table><thead><tr><th>1</th><th>2</th></tr></thead><tbody></tbody></table></div>"));
    }

    #[test]
    fn chart_fence_without_annotations_is_plain_markdown() {
        let html = render_markdown("```chart\n- a\n```", &RenderFeatures::basic());
        assert_eq!(html, "<p>```chart</p>\n<ul>\n<li>a</li>\n</ul>\n<p>```</p>");
    }

    #[test]
    fn basic_variant_keeps_pipes_as_text() {
        let html = render_markdown("| A | B |", &RenderFeatures::basic());
        assert_eq!(html, "<p>| A | B |</p>");
    }
}
