// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Client side of the agent backend HTTP API.
//!
//! | Route            | Body                                   | Reply                          |
//! |------------------|----------------------------------------|--------------------------------|
//! | `/ask`           | JSON `{question, conversation_id?}`    | `{answer, conversation_id}`    |
//! | `/upload_pdf`    | multipart `pdf_files`…, `clear_index`  | `{message}`                    |
//! | `/upload_files`  | multipart `files`…, `clear_index`      | `{message, conversation_id?}`  |
//! | `/upload_url`    | multipart `urls`, `clear_index`        | `{message}` (403: disallowed)  |
//! | `/clear_index`   | (empty)                                | `{message}`                    |
//! | `/set_config`    | JSON `{domain_instructions}`           | `{message}`                    |
//!
//! Every route may answer `{error}` instead.

mod error;
mod types;
mod backend;
mod http;
mod mock;

pub use error::BackendError;
pub use types::*;
pub use backend::Backend;
pub use http::HttpBackend;
pub use mock::{BackendCall, MockBackend};
