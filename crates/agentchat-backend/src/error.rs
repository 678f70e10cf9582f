// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never got an HTTP response.
    #[error("error connecting to server: {0}")]
    Network(String),
    /// Non-2xx status.  `message` is the backend's `error` field, or
    /// `Server error: <code>` when the body carried none.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 2xx status with an `{error}` payload.
    #[error("{0}")]
    Rejected(String),
    /// `/upload_url` answered 403: the site does not allow scraping.
    #[error("Website owner does not allow access to the content.")]
    Disallowed,
    /// 2xx status without the expected field.
    #[error("No response from server.")]
    Empty,
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl BackendError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Network(_) => "Error connecting to server.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_use_generic_text() {
        let e = BackendError::Network("tcp connect refused".into());
        assert_eq!(e.user_message(), "Error connecting to server.");
    }

    #[test]
    fn backend_messages_are_shown_verbatim() {
        let e = BackendError::Status { status: 500, message: "Index not ready".into() };
        assert_eq!(e.user_message(), "Index not ready");
        assert_eq!(BackendError::Rejected("No documents".into()).user_message(), "No documents");
    }
}
