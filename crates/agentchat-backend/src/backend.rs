// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;

use crate::{Answer, AskRequest, BackendError, UploadFile, UploadOutcome};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Short description for logs, e.g. the base URL.
    fn describe(&self) -> String;

    /// `POST /ask`.
    async fn ask(&self, req: AskRequest) -> Result<Answer, BackendError>;

    /// `POST /upload_pdf` or `/upload_files`, depending on the backend.
    async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        clear_index: bool,
    ) -> Result<UploadOutcome, BackendError>;

    /// `POST /upload_url` with the URLs comma-joined.
    async fn upload_urls(&self, urls: &[String], clear_index: bool) -> Result<String, BackendError>;

    /// `POST /clear_index`.
    async fn clear_index(&self) -> Result<String, BackendError>;

    /// `POST /set_config`.
    async fn set_config(&self, domain_instructions: &str) -> Result<String, BackendError>;
}
