// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! reqwest implementation of [`Backend`].

use std::time::Duration;

use agentchat_config::{BackendConfig, UploadEndpoint};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    Answer, AskReply, AskRequest, Backend, BackendError, ConfigRequest, StatusReply, UploadFile,
    UploadOutcome,
};

pub struct HttpBackend {
    base_url: String,
    upload: UploadEndpoint,
    client: reqwest::Client,
}

impl HttpBackend {
    /// `timeout` of `None` means no per-request limit.
    pub fn new(
        base_url: &str,
        upload: UploadEndpoint,
        timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            upload,
            client: builder.build()?,
        })
    }

    pub fn from_config(cfg: &BackendConfig) -> Result<Self, BackendError> {
        let timeout = (cfg.timeout_secs > 0).then(|| Duration::from_secs(cfg.timeout_secs));
        Self::new(&cfg.base_url, cfg.upload_endpoint, timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<R: DeserializeOwned + Default>(
        &self,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<(u16, R), BackendError> {
        let resp = req.send().await?;
        let status = resp.status();
        debug!(path, status = status.as_u16(), "backend replied");
        let text = resp.text().await?;
        let body = match serde_json::from_str::<R>(&text) {
            Ok(b) => b,
            // Error pages are often HTML; the status code still tells the story.
            Err(_) if !status.is_success() => R::default(),
            Err(e) => return Err(BackendError::Decode(e.to_string())),
        };
        Ok((status.as_u16(), body))
    }

    async fn send_status(
        &self,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<StatusReply, BackendError> {
        let (status, reply) = self.send::<StatusReply>(path, req).await?;
        check_status(status, reply.error.clone())?;
        if let Some(error) = reply.error {
            return Err(BackendError::Rejected(error));
        }
        Ok(reply)
    }
}

/// Maps a non-2xx status to [`BackendError::Status`].
fn check_status(status: u16, error: Option<String>) -> Result<(), BackendError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    Err(BackendError::Status {
        status,
        message: error.unwrap_or_else(|| format!("Server error: {status}")),
    })
}

fn clear_flag(clear_index: bool) -> &'static str {
    if clear_index {
        "true"
    } else {
        "false"
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn ask(&self, req: AskRequest) -> Result<Answer, BackendError> {
        debug!(conversation_id = ?req.conversation_id, "POST /ask");
        let builder = self.client.post(self.url("/ask")).json(&req);
        let (status, reply) = self.send::<AskReply>("/ask", builder).await?;
        check_status(status, reply.error.clone())?;
        match (reply.answer, reply.error) {
            (Some(text), _) if !text.is_empty() => Ok(Answer {
                text,
                conversation_id: reply.conversation_id,
            }),
            (_, Some(error)) => Err(BackendError::Rejected(error)),
            _ => Err(BackendError::Empty),
        }
    }

    async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        clear_index: bool,
    ) -> Result<UploadOutcome, BackendError> {
        let path = self.upload.path();
        debug!(path, files = files.len(), "uploading files");
        let mut form = Form::new();
        for f in files {
            form = form.part(self.upload.field(), Part::bytes(f.bytes).file_name(f.name));
        }
        form = form.text("clear_index", clear_flag(clear_index));
        let reply = self
            .send_status(path, self.client.post(self.url(path)).multipart(form))
            .await?;
        Ok(UploadOutcome {
            message: reply.message.unwrap_or_else(|| "Done.".to_string()),
            conversation_id: reply.conversation_id,
        })
    }

    async fn upload_urls(&self, urls: &[String], clear_index: bool) -> Result<String, BackendError> {
        debug!(urls = urls.len(), "POST /upload_url");
        let form = Form::new()
            .text("urls", urls.join(","))
            .text("clear_index", clear_flag(clear_index));
        let builder = self.client.post(self.url("/upload_url")).multipart(form);
        let (status, reply) = self.send::<StatusReply>("/upload_url", builder).await?;
        if status == 403 {
            return Err(BackendError::Disallowed);
        }
        check_status(status, reply.error.clone())?;
        match (reply.message, reply.error) {
            (_, Some(error)) => Err(BackendError::Rejected(error)),
            (Some(message), None) => Ok(message),
            (None, None) => Ok("Done.".to_string()),
        }
    }

    async fn clear_index(&self) -> Result<String, BackendError> {
        let reply = self
            .send_status("/clear_index", self.client.post(self.url("/clear_index")))
            .await?;
        Ok(reply.message.unwrap_or_else(|| "Index cleared.".to_string()))
    }

    async fn set_config(&self, domain_instructions: &str) -> Result<String, BackendError> {
        let body = ConfigRequest { domain_instructions: domain_instructions.to_string() };
        let builder = self.client.post(self.url("/set_config")).json(&body);
        let reply = self.send_status("/set_config", builder).await?;
        Ok(reply.message.unwrap_or_else(|| "Configuration applied.".to_string()))
    }
}
