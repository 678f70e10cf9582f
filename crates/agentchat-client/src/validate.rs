// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("Please select files first.")]
    NoFiles,
    #[error("Invalid file(s): {}. Use {allowed}.", .invalid.join(", "))]
    InvalidFiles { invalid: Vec<String>, allowed: String },
    #[error("Add URLs first.")]
    NoUrls,
}

/// Trimmed question, or [`ValidationError::EmptyQuestion`].
pub fn validate_question(text: &str) -> Result<&str, ValidationError> {
    match text.trim() {
        "" => Err(ValidationError::EmptyQuestion),
        q => Ok(q),
    }
}

/// Lower-case extension with its dot, `None` when the name has none.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `"PDF, TXT, CSV, XLSX"` for the default extension list.  An extension that
/// is a prefix of another listed one (`.xls` / `.xlsx`) is folded into it.
pub fn allowed_label(allowed: &[String]) -> String {
    allowed
        .iter()
        .filter(|ext| !allowed.iter().any(|o| o != *ext && o.starts_with(ext.as_str())))
        .map(|ext| ext.trim_start_matches('.').to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every file must carry one of `allowed` (case-insensitive).
pub fn validate_files(files: &[PathBuf], allowed: &[String]) -> Result<(), ValidationError> {
    if files.is_empty() {
        return Err(ValidationError::NoFiles);
    }
    let invalid: Vec<String> = files
        .iter()
        .filter(|f| {
            extension_of(f)
                .map(|ext| !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
                .unwrap_or(true)
        })
        .map(|f| display_name(f))
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidFiles { invalid, allowed: allowed_label(allowed) })
    }
}

/// Editor text → URL list: one per line, trimmed, blanks dropped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        [".pdf", ".txt", ".csv", ".xlsx", ".xls"].into_iter().map(String::from).collect()
    }

    #[test]
    fn blank_question_is_rejected() {
        assert_eq!(validate_question("  \n"), Err(ValidationError::EmptyQuestion));
        assert_eq!(validate_question("  hi "), Ok("hi"));
    }

    #[test]
    fn no_files_is_an_error() {
        assert_eq!(validate_files(&[], &defaults()), Err(ValidationError::NoFiles));
        assert_eq!(ValidationError::NoFiles.to_string(), "Please select files first.");
    }

    #[test]
    fn extensions_are_case_insensitive() {
        let files = vec![PathBuf::from("/tmp/Report.PDF"), PathBuf::from("data.xls")];
        assert!(validate_files(&files, &defaults()).is_ok());
    }

    #[test]
    fn invalid_files_are_listed_by_name() {
        let files = vec![
            PathBuf::from("/tmp/a.doc"),
            PathBuf::from("ok.csv"),
            PathBuf::from("README"),
        ];
        let err = validate_files(&files, &defaults()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid file(s): a.doc, README. Use PDF, TXT, CSV, XLSX.");
    }

    #[test]
    fn pdf_only_label() {
        assert_eq!(allowed_label(&[".pdf".to_string()]), "PDF");
    }

    #[test]
    fn url_list_drops_blank_lines() {
        let urls = parse_url_list("  https://a.example \n\n\thttps://b.example\n   \n");
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
        assert!(parse_url_list("\n \n").is_empty());
    }
}
