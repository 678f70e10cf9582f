// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;
use std::sync::Arc;

use agentchat_backend::{AskRequest, Backend, UploadFile};
use agentchat_config::{AgentConfig, Config, UploadConfig};
use agentchat_render::{RenderedTranscript, TranscriptRenderer};
use agentchat_session::{ConversationTurn, KvStore, SessionState};
use tracing::{debug, info, warn};

use crate::chart::ChartSink;
use crate::status::{Panel, StatusBoard, StatusLine};
use crate::validate::{parse_url_list, validate_files, validate_question, ValidationError};
use crate::view::TranscriptView;

/// One chat page: conversation state, the backend it talks to, and the
/// view it renders into.
///
/// Handlers take `&mut self`, so asks are serialized: a second question can
/// only be sent once the first one has been answered.
pub struct ChatClient {
    backend: Arc<dyn Backend>,
    session: SessionState,
    renderer: TranscriptRenderer,
    view: Box<dyn TranscriptView>,
    charts: Box<dyn ChartSink>,
    status: StatusBoard,
    urls: Vec<String>,
    upload: UploadConfig,
    agent: AgentConfig,
}

impl ChatClient {
    pub fn new(
        config: &Config,
        backend: Arc<dyn Backend>,
        store: Box<dyn KvStore>,
        view: Box<dyn TranscriptView>,
        charts: Box<dyn ChartSink>,
    ) -> Self {
        Self::with_renderer(
            config,
            backend,
            store,
            TranscriptRenderer::new(config.render),
            view,
            charts,
        )
    }

    pub fn with_renderer(
        config: &Config,
        backend: Arc<dyn Backend>,
        store: Box<dyn KvStore>,
        renderer: TranscriptRenderer,
        view: Box<dyn TranscriptView>,
        charts: Box<dyn ChartSink>,
    ) -> Self {
        info!(profile = %config.profile, backend = %backend.describe(), "chat client ready");
        Self {
            backend,
            session: SessionState::restore(config.session.clone(), store),
            renderer,
            view,
            charts,
            status: StatusBoard::default(),
            urls: Vec::new(),
            upload: config.upload.clone(),
            agent: config.agent.clone(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn status(&self, panel: Panel) -> Option<&StatusLine> {
        self.status.get(panel)
    }

    /// URLs queued for the next `/upload_url`.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn transcript(&self) -> RenderedTranscript {
        self.renderer.render(self.session.conversation.turns())
    }

    /// Re-render the whole log into the view, draw its charts, scroll down.
    pub fn refresh(&mut self) {
        let transcript = self.transcript();
        if let Err(e) = self.view.show(&transcript) {
            warn!(error = %e, "could not update transcript view");
        }
        for job in &transcript.charts {
            self.charts.draw(job);
        }
        if let Err(e) = self.view.scroll_to_latest() {
            warn!(error = %e, "could not scroll transcript view");
        }
    }

    // ── Chat ──────────────────────────────────────────────────────────────────

    /// Ask a question.  Blank input is ignored without a request.
    pub async fn send(&mut self, text: &str) {
        let question = match validate_question(text) {
            Ok(q) => q.to_string(),
            Err(_) => {
                debug!("ignoring empty question");
                return;
            }
        };

        self.session.conversation.push(ConversationTurn::user(question.as_str()));
        self.refresh();
        let placeholder = self.session.config().placeholder.clone();
        let pending = self.session.conversation.push_placeholder(placeholder);
        self.refresh();

        let req = AskRequest {
            question,
            conversation_id: self.session.ask_conversation_id(),
        };
        let reply = match self.backend.ask(req).await {
            Ok(answer) => {
                if let Some(id) = &answer.conversation_id {
                    if let Err(e) = self.session.set_conversation_id(id) {
                        warn!(error = %e, "could not persist conversation id");
                    }
                }
                ConversationTurn::assistant(answer.text)
            }
            Err(e) => {
                warn!(error = %e, "ask failed");
                ConversationTurn::assistant(e.user_message())
            }
        };

        self.session.conversation.resolve(pending, reply);
        self.refresh();
    }

    /// Forget the conversation id and start over with the reset greeting.
    pub fn reset(&mut self) {
        if let Err(e) = self.session.reset() {
            warn!(error = %e, "could not clear persisted conversation id");
        }
        self.refresh();
        self.status.set(Panel::Config, StatusLine::ok("New conversation started."));
    }

    // ── Knowledge management ──────────────────────────────────────────────────

    pub async fn upload_files(&mut self, paths: &[PathBuf]) {
        if let Err(e) = validate_files(paths, &self.upload.allowed_extensions) {
            self.status.set(Panel::Files, StatusLine::error(e.to_string()));
            return;
        }
        self.status.set(Panel::Files, StatusLine::working("Uploading and processing..."));

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match UploadFile::read(path).await {
                Ok(f) => files.push(f),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read upload");
                    self.status.set(
                        Panel::Files,
                        StatusLine::error(format!("Could not read {}: {e}", path.display())),
                    );
                    return;
                }
            }
        }

        let line = match self.backend.upload_files(files, false).await {
            Ok(outcome) => {
                if let Some(id) = &outcome.conversation_id {
                    info!(conversation_id = %id, "data conversation created");
                    if let Err(e) = self.session.remember_data_conversation(id) {
                        warn!(error = %e, "could not persist data conversation id");
                    }
                }
                StatusLine::ok(outcome.message)
            }
            Err(e) => {
                warn!(error = %e, "upload failed");
                StatusLine::error(e.user_message())
            }
        };
        self.status.set(Panel::Files, line);
    }

    /// Replace the URL list from newline-separated editor text.
    pub fn set_urls(&mut self, text: &str) {
        self.urls = parse_url_list(text);
        self.status
            .set(Panel::Urls, StatusLine::ok(format!("{} URLs added.", self.urls.len())));
    }

    pub async fn upload_urls(&mut self) {
        if self.urls.is_empty() {
            self.status.set(Panel::Urls, StatusLine::error(ValidationError::NoUrls.to_string()));
            return;
        }
        self.status.set(Panel::Urls, StatusLine::working("Processing URLs..."));
        let line = match self.backend.upload_urls(&self.urls, false).await {
            Ok(message) => StatusLine::ok(message),
            Err(e) => {
                warn!(error = %e, "url upload failed");
                StatusLine::error(e.user_message())
            }
        };
        self.status.set(Panel::Urls, line);
    }

    pub async fn clear_index(&mut self) {
        self.status.set(Panel::Clear, StatusLine::working("Clearing..."));
        let line = match self.backend.clear_index().await {
            Ok(message) => StatusLine::ok(message),
            Err(e) => {
                warn!(error = %e, "clear index failed");
                StatusLine::error(e.user_message())
            }
        };
        self.status.set(Panel::Clear, line);
    }

    /// Send domain instructions; `None` or blank text sends the profile's
    /// default instructions.
    pub async fn configure(&mut self, instructions: Option<&str>) {
        let text = instructions
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.agent.domain_instructions.trim())
            .to_string();
        self.status.set(Panel::Config, StatusLine::working("Applying..."));
        let line = match self.backend.set_config(&text).await {
            Ok(message) => StatusLine::ok(message),
            Err(e) => {
                warn!(error = %e, "set config failed");
                StatusLine::error(e.user_message())
            }
        };
        self.status.set(Panel::Config, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentchat_backend::{BackendCall, BackendError, MockBackend};
    use agentchat_render::ChartIds;
    use agentchat_session::{MemoryStore, CONVERSATION_ID_KEY, LAST_DATA_CONVERSATION_ID_KEY};

    use crate::status::StatusKind;
    use crate::view::{Recorder, ViewEvent};

    struct Fixture {
        client: ChatClient,
        backend: MockBackend,
        store: MemoryStore,
        rec: Recorder,
    }

    fn fixture_with(config: Config, backend: MockBackend, store: MemoryStore) -> Fixture {
        let rec = Recorder::new();
        let renderer =
            TranscriptRenderer::with_chart_ids(config.render, Arc::new(ChartIds::new()));
        let client = ChatClient::with_renderer(
            &config,
            Arc::new(backend.clone()),
            Box::new(store.clone()),
            renderer,
            Box::new(rec.clone()),
            Box::new(rec.clone()),
        );
        Fixture { client, backend, store, rec }
    }

    fn fixture(backend: MockBackend) -> Fixture {
        fixture_with(Config::default(), backend, MemoryStore::new())
    }

    fn last_text(f: &Fixture) -> String {
        f.client.session().conversation.last().unwrap().content.clone()
    }

    #[tokio::test]
    async fn send_shows_placeholder_then_answer() {
        let mut f = fixture(MockBackend::new().answer("**42**", Some("conv-1")));
        f.client.send("what is the answer?").await;

        let frames = f.rec.frames();
        assert_eq!(frames.len(), 3);
        assert!(frames[1].html().contains("<p>Thinking...</p>"));
        let last = frames[2].html();
        assert!(!last.contains("Thinking..."));
        assert!(last.ends_with("<div class=\"chat-message assistant\"><p><strong>42</strong></p></div>"));
        assert_eq!(f.client.session().conversation.len(), 3);
        assert_eq!(f.store.get(CONVERSATION_ID_KEY).as_deref(), Some("conv-1"));
    }

    #[tokio::test]
    async fn blank_question_sends_nothing() {
        let mut f = fixture(MockBackend::new());
        f.client.send("   ").await;
        assert!(f.backend.calls().is_empty());
        assert!(f.rec.events().is_empty());
        assert_eq!(f.client.session().conversation.len(), 1);
    }

    #[tokio::test]
    async fn network_failure_replaces_placeholder_with_error_turn() {
        let mut f = fixture(MockBackend::new().ask_error(BackendError::Network("refused".into())));
        f.client.send("hello").await;
        assert_eq!(last_text(&f), "Error connecting to server.");
        assert_eq!(f.client.session().conversation.pending(), 0);
        assert!(f.store.get(CONVERSATION_ID_KEY).is_none());
    }

    #[tokio::test]
    async fn backend_error_text_is_shown_verbatim() {
        let mut f = fixture(MockBackend::new().ask_error(BackendError::Status {
            status: 500,
            message: "Index not ready".into(),
        }));
        f.client.send("hello").await;
        assert_eq!(last_text(&f), "Index not ready");
    }

    #[tokio::test]
    async fn follow_up_carries_conversation_id() {
        let mut f = fixture(MockBackend::new().answer("one", Some("conv-1")).answer("two", None));
        f.client.send("first").await;
        f.client.send("second").await;
        assert_eq!(f.backend.last_ask().unwrap().conversation_id.as_deref(), Some("conv-1"));
    }

    #[tokio::test]
    async fn first_ask_uses_last_data_conversation() {
        let store = MemoryStore::with(&[(LAST_DATA_CONVERSATION_ID_KEY, "data-1")]);
        let mut f = fixture_with(Config::default(), MockBackend::new(), store);
        f.client.send("summarise the upload").await;
        assert_eq!(f.backend.last_ask().unwrap().conversation_id.as_deref(), Some("data-1"));
    }

    #[tokio::test]
    async fn chart_jobs_are_drawn_between_show_and_scroll() {
        let answer = "```chart\n{\"chart\": {\"type\": \"bar\"}, \"series\": []}\n```";
        let mut f = fixture(MockBackend::new().answer(answer, None));
        f.client.send("plot it").await;

        let events = f.rec.events();
        let tail = &events[events.len() - 3..];
        assert!(matches!(&tail[0], ViewEvent::Shown(t) if t.html().contains("chart-container")));
        assert!(matches!(&tail[1], ViewEvent::Chart(job) if job.id == "chart-1"));
        assert_eq!(tail[2], ViewEvent::Scrolled);
    }

    #[tokio::test]
    async fn reset_forgets_conversation() {
        let store = MemoryStore::with(&[(CONVERSATION_ID_KEY, "conv-1")]);
        let mut f = fixture_with(Config::default(), MockBackend::new(), store);
        f.client.send("hello").await;
        f.client.reset();

        assert!(f.store.get(CONVERSATION_ID_KEY).is_none());
        assert_eq!(f.client.session().conversation.len(), 1);
        assert_eq!(last_text(&f), "New conversation started. How can I help?");
        assert_eq!(
            f.client.status(Panel::Config).unwrap().text,
            "New conversation started."
        );
    }

    #[tokio::test]
    async fn upload_remembers_data_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "q,total\n1,10\n").unwrap();

        let mut f = fixture(MockBackend::new().upload("Processed 1 file.", "data-9"));
        f.client.upload_files(&[path]).await;

        assert_eq!(
            f.backend.calls(),
            vec![BackendCall::UploadFiles { names: vec!["sales.csv".into()], clear_index: false }]
        );
        let line = f.client.status(Panel::Files).unwrap();
        assert_eq!(line.kind, StatusKind::Ok);
        assert_eq!(line.text, "Processed 1 file.");
        assert_eq!(f.store.get(LAST_DATA_CONVERSATION_ID_KEY).as_deref(), Some("data-9"));

        f.client.send("what was the total?").await;
        assert_eq!(f.backend.last_ask().unwrap().conversation_id.as_deref(), Some("data-9"));
    }

    #[tokio::test]
    async fn upload_without_conversation_leaves_store_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut f = fixture(MockBackend::new().status(Ok("Processed 1 file.")));
        f.client.upload_files(&[path]).await;

        assert!(f.store.get(LAST_DATA_CONVERSATION_ID_KEY).is_none());
        f.client.send("hi").await;
        assert!(f.backend.last_ask().unwrap().conversation_id.is_none());
    }

    #[tokio::test]
    async fn invalid_files_are_rejected_before_upload() {
        let mut f = fixture(MockBackend::new());
        f.client.upload_files(&[PathBuf::from("notes.doc")]).await;
        assert!(f.backend.calls().is_empty());
        let line = f.client.status(Panel::Files).unwrap();
        assert!(line.is_error());
        assert_eq!(line.text, "Invalid file(s): notes.doc. Use PDF, TXT, CSV, XLSX.");
    }

    #[tokio::test]
    async fn unreadable_file_ends_in_error_status() {
        let mut f = fixture(MockBackend::new());
        f.client.upload_files(&[PathBuf::from("/nonexistent/dir/a.pdf")]).await;
        assert!(f.backend.calls().is_empty());
        assert!(f.client.status(Panel::Files).unwrap().is_error());
    }

    #[tokio::test]
    async fn url_flow() {
        let mut f = fixture(
            MockBackend::new()
                .status(Err(BackendError::Disallowed))
                .status(Ok("Fetched 2 pages.")),
        );
        f.client.upload_urls().await;
        assert_eq!(f.client.status(Panel::Urls).unwrap().text, "Add URLs first.");

        f.client.set_urls("https://a.example\n\n https://b.example ");
        assert_eq!(f.client.status(Panel::Urls).unwrap().text, "2 URLs added.");

        f.client.upload_urls().await;
        let line = f.client.status(Panel::Urls).unwrap();
        assert!(line.is_error());
        assert_eq!(line.text, "Website owner does not allow access to the content.");

        f.client.upload_urls().await;
        assert_eq!(f.client.status(Panel::Urls).unwrap().text, "Fetched 2 pages.");
        assert_eq!(
            f.backend.calls()[1],
            BackendCall::UploadUrls {
                urls: vec!["https://a.example".into(), "https://b.example".into()],
                clear_index: false,
            }
        );
    }

    #[tokio::test]
    async fn configure_falls_back_to_profile_instructions() {
        let mut f = fixture(MockBackend::new());
        f.client.configure(Some("  ")).await;
        f.client.configure(Some("Be brief.")).await;
        let calls = f.backend.calls();
        assert!(matches!(&calls[0], BackendCall::SetConfig(t) if t.starts_with("You are assisting")));
        assert_eq!(calls[1], BackendCall::SetConfig("Be brief.".into()));
        assert_eq!(f.client.status(Panel::Config).unwrap().kind, StatusKind::Ok);
    }

    #[tokio::test]
    async fn working_indicator_is_cleared_on_failure() {
        let mut f = fixture(MockBackend::new().status(Err(BackendError::Network("down".into()))));
        f.client.clear_index().await;
        let line = f.client.status(Panel::Clear).unwrap();
        assert_eq!(line.kind, StatusKind::Error);
        assert_eq!(line.text, "Error connecting to server.");
    }
}
