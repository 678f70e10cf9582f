// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::OnceLock;

use regex::Regex;

fn strong_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("strong pattern"))
}

fn em_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("emphasis pattern"))
}

/// Replaces `&`, `<` and `>` with entity codes.  `&` goes first so the
/// entities produced for `<` / `>` are not escaped again.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `**X**` → `<strong>X</strong>`, then `*X*` → `<em>X</em>`.
///
/// Matches are non-greedy and never span a line break, so applying this to a
/// whole message is the same as applying it line by line.
pub fn format_emphasis(text: &str) -> String {
    let strong = strong_re().replace_all(text, "<strong>${1}</strong>");
    em_re().replace_all(&strong, "<em>${1}</em>").into_owned()
}

/// Escape, then emphasis.  Nothing is escaped after the substitution, so the
/// only markup in the result is the markup introduced here.
pub fn format_inline(raw: &str) -> String {
    format_emphasis(&escape_html(raw))
}
