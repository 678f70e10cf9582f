// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Raw `/ask` reply body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskReply {
    pub answer: Option<String>,
    pub conversation_id: Option<String>,
    pub error: Option<String>,
}

/// Successful `/ask` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub conversation_id: Option<String>,
}

/// Raw reply body of the upload / clear / config routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReply {
    pub message: Option<String>,
    pub error: Option<String>,
    pub conversation_id: Option<String>,
}

/// Successful upload result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub message: String,
    /// Conversation created for the uploaded data, if the backend made one.
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigRequest {
    pub domain_instructions: String,
}

/// One file part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    /// Reads `path`; the part is named after the file name.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_without_conversation_omits_the_field() {
        let req = AskRequest { question: "hi".into(), conversation_id: None };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"question":"hi"}"#);
    }

    #[test]
    fn ask_with_conversation_includes_it() {
        let req = AskRequest { question: "hi".into(), conversation_id: Some("c1".into()) };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"question":"hi","conversation_id":"c1"}"#
        );
    }

    #[test]
    fn status_reply_tolerates_missing_fields() {
        let r: StatusReply = serde_json::from_str(r#"{"error":"bad file"}"#).unwrap();
        assert!(r.message.is_none());
        assert_eq!(r.error.as_deref(), Some("bad file"));
    }

    #[tokio::test]
    async fn upload_file_is_named_after_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();
        let f = UploadFile::read(&path).await.unwrap();
        assert_eq!(f.name, "report.csv");
        assert_eq!(f.bytes, b"a,b\n1,2\n");
    }
}
