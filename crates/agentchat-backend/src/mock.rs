// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{Answer, AskRequest, Backend, BackendError, UploadFile, UploadOutcome};

/// One request as seen by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Ask(AskRequest),
    UploadFiles { names: Vec<String>, clear_index: bool },
    UploadUrls { urls: Vec<String>, clear_index: bool },
    ClearIndex,
    SetConfig(String),
}

/// A pre-scripted backend for tests.  `ask` pops the next scripted answer,
/// every other route pops the next status script.  With an empty script
/// `ask` echoes `MOCK: <question>` and status routes answer `OK`.
/// Only file uploads report the scripted data conversation id.
///
/// Clones share scripts and the call log, so a test can keep one handle
/// while the client owns another.
#[derive(Clone, Default)]
pub struct MockBackend {
    answers: Arc<Mutex<VecDeque<Result<Answer, BackendError>>>>,
    statuses: Arc<Mutex<VecDeque<Result<UploadOutcome, BackendError>>>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an `/ask` answer carrying `conversation_id`.
    pub fn answer(self, text: &str, conversation_id: Option<&str>) -> Self {
        self.push_answer(Ok(Answer {
            text: text.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        }));
        self
    }

    /// Queue an `/ask` failure.
    pub fn ask_error(self, err: BackendError) -> Self {
        self.push_answer(Err(err));
        self
    }

    /// Queue the result of the next upload / clear / config call.
    pub fn status(self, result: Result<&str, BackendError>) -> Self {
        self.push_status(result.map(|message| UploadOutcome {
            message: message.to_string(),
            conversation_id: None,
        }));
        self
    }

    /// Queue a successful file upload that created `conversation_id`.
    pub fn upload(self, message: &str, conversation_id: &str) -> Self {
        self.push_status(Ok(UploadOutcome {
            message: message.to_string(),
            conversation_id: Some(conversation_id.to_string()),
        }));
        self
    }

    fn push_status(&self, s: Result<UploadOutcome, BackendError>) {
        if let Ok(mut q) = self.statuses.lock() {
            q.push_back(s);
        }
    }

    fn push_answer(&self, a: Result<Answer, BackendError>) {
        if let Ok(mut q) = self.answers.lock() {
            q.push_back(a);
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The most recent `/ask` request.
    pub fn last_ask(&self) -> Option<AskRequest> {
        self.calls().into_iter().rev().find_map(|c| match c {
            BackendCall::Ask(r) => Some(r),
            _ => None,
        })
    }

    fn record(&self, call: BackendCall) {
        if let Ok(mut c) = self.calls.lock() {
            c.push(call);
        }
    }

    fn next_outcome(&self) -> Result<UploadOutcome, BackendError> {
        self.statuses
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Ok(UploadOutcome { message: "OK".to_string(), conversation_id: None }))
    }

    fn next_status(&self) -> Result<String, BackendError> {
        self.next_outcome().map(|outcome| outcome.message)
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn describe(&self) -> String {
        "mock".into()
    }

    async fn ask(&self, req: AskRequest) -> Result<Answer, BackendError> {
        let echo = format!("MOCK: {}", req.question);
        self.record(BackendCall::Ask(req));
        self.answers
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(Ok(Answer { text: echo, conversation_id: None }))
    }

    async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        clear_index: bool,
    ) -> Result<UploadOutcome, BackendError> {
        let names = files.into_iter().map(|f| f.name).collect();
        self.record(BackendCall::UploadFiles { names, clear_index });
        self.next_outcome()
    }

    async fn upload_urls(&self, urls: &[String], clear_index: bool) -> Result<String, BackendError> {
        self.record(BackendCall::UploadUrls { urls: urls.to_vec(), clear_index });
        self.next_status()
    }

    async fn clear_index(&self) -> Result<String, BackendError> {
        self.record(BackendCall::ClearIndex);
        self.next_status()
    }

    async fn set_config(&self, domain_instructions: &str) -> Result<String, BackendError> {
        self.record(BackendCall::SetConfig(domain_instructions.to_string()));
        self.next_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(q: &str) -> AskRequest {
        AskRequest { question: q.into(), conversation_id: None }
    }

    #[tokio::test]
    async fn empty_script_echoes_question() {
        let m = MockBackend::new();
        let a = m.ask(ask("ping")).await.unwrap();
        assert_eq!(a.text, "MOCK: ping");
        assert_eq!(m.clear_index().await.unwrap(), "OK");
    }

    #[tokio::test]
    async fn scripts_are_consumed_in_order() {
        let m = MockBackend::new()
            .answer("first", Some("c1"))
            .ask_error(BackendError::Empty);
        let a = m.ask(ask("1")).await.unwrap();
        assert_eq!(a.conversation_id.as_deref(), Some("c1"));
        assert!(matches!(m.ask(ask("2")).await, Err(BackendError::Empty)));
        assert_eq!(m.ask(ask("3")).await.unwrap().text, "MOCK: 3");
    }

    #[tokio::test]
    async fn scripted_upload_reports_its_conversation() {
        let m = MockBackend::new().upload("Processed 1 file.", "data-7").status(Ok("Cleared."));
        let outcome = m.upload_files(vec![UploadFile::new("a.csv", vec![1])], false).await.unwrap();
        assert_eq!(outcome.message, "Processed 1 file.");
        assert_eq!(outcome.conversation_id.as_deref(), Some("data-7"));
        assert_eq!(m.clear_index().await.unwrap(), "Cleared.");
    }

    #[tokio::test]
    async fn clones_share_the_call_log() {
        let m = MockBackend::new();
        let handle = m.clone();
        m.upload_files(vec![UploadFile::new("a.pdf", vec![1])], false).await.unwrap();
        m.set_config("be brief").await.unwrap();
        assert_eq!(
            handle.calls(),
            vec![
                BackendCall::UploadFiles { names: vec!["a.pdf".into()], clear_index: false },
                BackendCall::SetConfig("be brief".into()),
            ]
        );
    }
}
