// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use agentchat_config::Profile;
use agentchat_session::Role;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

/// Author of a message passed to `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RoleArg {
    User,
    /// Assistant messages also get the summary / chart pass.
    #[default]
    Assistant,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::User => Role::User,
            RoleArg::Assistant => Role::Assistant,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "agentchat",
    about = "Chat client for knowledge-base and customer-support agents",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file (layered on top of the discovered ones)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Agent profile (selects defaults for URL, rendering and uploads)
    #[arg(long, short = 'p', value_enum, global = true, env = "AGENTCHAT_PROFILE")]
    pub profile: Option<Profile>,

    /// Backend base URL, e.g. "http://127.0.0.1:8000/new-knowledge-base"
    #[arg(long, global = true, env = "AGENTCHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Also write the transcript as an HTML page to PATH after every change
    #[arg(long, value_name = "PATH", global = true)]
    pub transcript: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat (the default).  Lines starting with `/` are commands.
    Chat,
    /// Ask one question and print the answer
    Ask {
        #[arg(value_name = "QUESTION", required = true)]
        question: Vec<String>,
    },
    /// Render Markdown from a file or stdin to HTML
    Render {
        /// Read from PATH instead of stdin
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "assistant")]
        role: RoleArg,
    },
    /// Upload documents to the agent's index
    Upload {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Have the agent fetch and index web pages
    UploadUrls {
        #[arg(value_name = "URLS", required = true)]
        urls: Vec<String>,
    },
    /// Drop everything from the agent's index
    ClearIndex,
    /// Send domain instructions to the agent
    SetConfig {
        /// Instructions text (default: the profile's instructions)
        #[arg(long, conflicts_with = "file")]
        instructions: Option<String>,
        /// Read the instructions from PATH
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
    /// Forget the stored conversation id
    New,
    /// Print the effective configuration and exit
    ShowConfig,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "agentchat", &mut std::io::stdout());
}
