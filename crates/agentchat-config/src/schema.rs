// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which agent page the client talks to.
///
/// A profile only selects defaults; every key it sets can still be
/// overridden by a config file layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Internal knowledge base with data analysis (tables, charts, summaries).
    #[default]
    KnowledgeBase,
    /// Customer support desk (plain Markdown, PDF uploads only).
    CustomerSupport,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::KnowledgeBase => write!(f, "knowledge-base"),
            Profile::CustomerSupport => write!(f, "customer-support"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub render: RenderFeatures,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

impl Config {
    /// Full set of defaults for `profile`.
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::KnowledgeBase => Self {
                profile,
                backend: BackendConfig::default(),
                render: RenderFeatures::enhanced(),
                session: SessionConfig::default(),
                upload: UploadConfig::default(),
                agent: AgentConfig::default(),
            },
            Profile::CustomerSupport => Self {
                profile,
                backend: BackendConfig {
                    base_url: "http://127.0.0.1:8000/customer-support".into(),
                    upload_endpoint: UploadEndpoint::Pdf,
                    ..BackendConfig::default()
                },
                render: RenderFeatures::basic(),
                session: SessionConfig {
                    greeting: "Hi there! How can I assist you with customer support today?".into(),
                    reset_greeting: "Hi there! How can I assist you with customer support today?"
                        .into(),
                    placeholder: "Fetching answer...".into(),
                    use_data_conversation: false,
                    store_path: None,
                },
                upload: UploadConfig {
                    allowed_extensions: vec![".pdf".into()],
                },
                agent: AgentConfig {
                    domain_instructions: CUSTOMER_SUPPORT_INSTRUCTIONS.into(),
                },
            },
        }
    }
}

// ── Backend ──────────────────────────────────────────────────────────────────

/// Which multipart upload route the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadEndpoint {
    /// `POST /upload_pdf` with `pdf_files` parts.
    Pdf,
    /// `POST /upload_files` with `files` parts.
    #[default]
    Files,
}

impl UploadEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            UploadEndpoint::Pdf => "/upload_pdf",
            UploadEndpoint::Files => "/upload_files",
        }
    }

    /// Multipart field name each file part is sent under.
    pub fn field(self) -> &'static str {
        match self {
            UploadEndpoint::Pdf => "pdf_files",
            UploadEndpoint::Files => "files",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL every route is appended to, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds (0 = no limit).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub upload_endpoint: UploadEndpoint,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/new-knowledge-base".into(),
            timeout_secs: default_timeout_secs(),
            upload_endpoint: UploadEndpoint::Files,
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Capability flags of the Markdown renderer.
///
/// `enhanced()` is the knowledge-base variant, `basic()` the customer-support
/// one.  All flags default to the enhanced values when omitted from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderFeatures {
    /// Pipe tables become `<table>` blocks.
    pub tables: bool,
    /// Assistant output is scanned for `summary` / `chart` fences.
    pub annotations: bool,
    /// Numbered items render as `<ol>`; otherwise they join `<ul>` lists.
    pub ordered_lists: bool,
    /// Blank lines emit `<br>`.
    pub line_breaks: bool,
}

impl RenderFeatures {
    pub const fn enhanced() -> Self {
        Self {
            tables: true,
            annotations: true,
            ordered_lists: true,
            line_breaks: true,
        }
    }

    pub const fn basic() -> Self {
        Self {
            tables: false,
            annotations: false,
            ordered_lists: false,
            line_breaks: false,
        }
    }
}

impl Default for RenderFeatures {
    fn default() -> Self {
        Self::enhanced()
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// First assistant turn of a fresh page.
    pub greeting: String,
    /// Assistant turn a "new conversation" resets the log to.
    pub reset_greeting: String,
    /// Text of the optimistic assistant turn while an ask is pending.
    pub placeholder: String,
    /// Send the last data-upload conversation id when no conversation is
    /// active yet.
    #[serde(default)]
    pub use_data_conversation: bool,
    /// Location of the durable key-value store.  `~` is expanded.
    /// Defaults to `$XDG_DATA_HOME/agentchat/state.json`.
    pub store_path: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello! I'm here to help you with internal knowledge and data analysis. \
                       What would you like to know?"
                .into(),
            reset_greeting: "New conversation started. How can I help?".into(),
            placeholder: "Thinking...".into(),
            use_data_conversation: true,
            store_path: None,
        }
    }
}

impl SessionConfig {
    /// Resolved store location.
    pub fn store_file(&self) -> PathBuf {
        match &self.store_path {
            Some(p) => PathBuf::from(shellexpand::tilde(p).as_ref()),
            None => dirs::data_dir()
                .unwrap_or_else(|| {
                    dirs::home_dir()
                        .unwrap_or_else(|| PathBuf::from("."))
                        .join(".local")
                        .join("share")
                })
                .join("agentchat")
                .join("state.json"),
        }
    }
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Lower-case extensions including the dot, e.g. `".pdf"`.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: [".pdf", ".txt", ".csv", ".xlsx", ".xls"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// ── Agent ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Instructions sent with `set-config` when none are given explicitly.
    pub domain_instructions: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            domain_instructions: KNOWLEDGE_BASE_INSTRUCTIONS.into(),
        }
    }
}

const KNOWLEDGE_BASE_INSTRUCTIONS: &str = "\
You are assisting with an internal knowledge base for a technology company.
Assist employees with:
- Finding technical documentation (e.g., API guides, system architecture)
- Explaining company policies (e.g., HR, IT, security)
- Providing project-related information (e.g., timelines, resources)
- Answering FAQs about internal tools and processes
Tone: Professional, technical, and concise.";

const CUSTOMER_SUPPORT_INSTRUCTIONS: &str = "\
You are supporting a medical clinic.
Assist patients with:
- Booking appointments
- Providing clinic hours and contact details
- Explaining services (consultations, treatments, specialties)
- Answering FAQs about medical staff, insurance, pricing
- Redirecting emergencies to call emergency services immediately

Tone: Empathetic, reassuring, and professional.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_knowledge_base_with_enhanced_rendering() {
        let cfg = Config::default();
        assert_eq!(cfg.profile, Profile::KnowledgeBase);
        assert_eq!(cfg.render, RenderFeatures::enhanced());
        assert_eq!(cfg.backend.upload_endpoint, UploadEndpoint::Files);
        assert!(cfg.session.use_data_conversation);
    }

    #[test]
    fn customer_support_profile_uses_basic_rendering_and_pdf_uploads() {
        let cfg = Config::for_profile(Profile::CustomerSupport);
        assert_eq!(cfg.render, RenderFeatures::basic());
        assert_eq!(cfg.backend.upload_endpoint.path(), "/upload_pdf");
        assert_eq!(cfg.backend.upload_endpoint.field(), "pdf_files");
        assert_eq!(cfg.upload.allowed_extensions, vec![".pdf".to_string()]);
        assert_eq!(cfg.session.placeholder, "Fetching answer...");
    }

    #[test]
    fn partial_render_table_keeps_other_flags_enhanced() {
        let r: RenderFeatures = toml::from_str("tables = false").unwrap();
        assert!(!r.tables);
        assert!(r.annotations);
        assert!(r.ordered_lists);
    }

    #[test]
    fn explicit_store_path_expands_tilde() {
        let s = SessionConfig {
            store_path: Some("~/state.json".into()),
            ..SessionConfig::default()
        };
        let p = s.store_file();
        assert!(p.ends_with("state.json"));
        assert!(!p.to_string_lossy().starts_with('~'));
    }
}
