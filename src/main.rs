mod cli;

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use agentchat_backend::HttpBackend;
use agentchat_client::chart::chart_script;
use agentchat_client::view::html_to_text;
use agentchat_client::{
    Action, ChartSink, ChatClient, Fanout, HtmlFileView, LogChartSink, NullView, StatusLine,
    TerminalView, TranscriptView,
};
use agentchat_config::Config;
use agentchat_render::TranscriptRenderer;
use agentchat_session::{ConversationTurn, FileStore};
use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Subcommands that need no backend
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            cli::print_completions(*shell);
            return Ok(());
        }
        Some(Commands::ShowConfig) => {
            let config = load_config(&cli)?;
            print!("{}", toml::to_string_pretty(&config).context("serialising config")?);
            return Ok(());
        }
        Some(Commands::Render { file, role }) => {
            let config = load_config(&cli)?;
            return render_cmd(&config, file.as_deref(), (*role).into());
        }
        _ => {}
    }

    let config = load_config(&cli)?;

    match &cli.command {
        None | Some(Commands::Chat) => {
            let mut views: Vec<Box<dyn TranscriptView>> = vec![Box::new(TerminalView::stdout())];
            let charts: Box<dyn ChartSink> = match &cli.transcript {
                Some(path) => {
                    let html = HtmlFileView::new(path);
                    let sink = html.chart_sink();
                    views.push(Box::new(html));
                    Box::new(sink)
                }
                None => Box::new(LogChartSink),
            };
            let client = build_client(&config, Box::new(Fanout(views)), charts)?;
            run_chat(client).await
        }
        Some(Commands::Ask { question }) => {
            let mut client = one_shot_client(&cli, &config)?;
            client.send(&question.join(" ")).await;
            if let Some(turn) = client.transcript().latest() {
                println!("{}", html_to_text(&turn.html));
            }
            Ok(())
        }
        Some(Commands::Upload { files }) => {
            let mut client = one_shot_client(&cli, &config)?;
            report(client.dispatch(Action::UploadFiles(files.clone())).await)
        }
        Some(Commands::UploadUrls { urls }) => {
            let mut client = one_shot_client(&cli, &config)?;
            client.dispatch(Action::SetUrls(urls.join("\n"))).await;
            report(client.dispatch(Action::UploadUrls).await)
        }
        Some(Commands::ClearIndex) => {
            let mut client = one_shot_client(&cli, &config)?;
            report(client.dispatch(Action::ClearIndex).await)
        }
        Some(Commands::SetConfig { instructions, file }) => {
            let text = match file {
                Some(path) => Some(
                    std::fs::read_to_string(path)
                        .with_context(|| format!("reading instructions file {}", path.display()))?,
                ),
                None => instructions.clone(),
            };
            let mut client = one_shot_client(&cli, &config)?;
            report(client.dispatch(Action::Configure(text)).await)
        }
        Some(Commands::New) => {
            let mut client = one_shot_client(&cli, &config)?;
            report(client.dispatch(Action::Reset).await)
        }
        Some(Commands::Completions { .. } | Commands::ShowConfig | Commands::Render { .. }) => {
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = agentchat_config::load(cli.config.as_deref(), cli.profile)?;
    if let Some(url) = &cli.base_url {
        config.backend.base_url = url.clone();
    }
    Ok(config)
}

fn build_client(
    config: &Config,
    view: Box<dyn TranscriptView>,
    charts: Box<dyn ChartSink>,
) -> anyhow::Result<ChatClient> {
    let backend = HttpBackend::from_config(&config.backend).context("building HTTP client")?;
    let store_path = config.session.store_file();
    let store = FileStore::open(&store_path)
        .with_context(|| format!("opening session store {}", store_path.display()))?;
    debug!(store = %store_path.display(), "session store opened");
    Ok(ChatClient::new(config, Arc::new(backend), Box::new(store), view, charts))
}

/// Client for the non-interactive subcommands: no terminal output except
/// the optional HTML page.
fn one_shot_client(cli: &Cli, config: &Config) -> anyhow::Result<ChatClient> {
    match &cli.transcript {
        Some(path) => {
            let html = HtmlFileView::new(path);
            let sink = html.chart_sink();
            build_client(config, Box::new(html), Box::new(sink))
        }
        None => build_client(config, Box::new(NullView), Box::new(LogChartSink)),
    }
}

/// Print a panel status line; an error status fails the command.
fn report(status: Option<StatusLine>) -> anyhow::Result<()> {
    match status {
        Some(line) if line.is_error() => anyhow::bail!("{line}"),
        Some(line) => {
            println!("{line}");
            Ok(())
        }
        None => Ok(()),
    }
}

fn render_cmd(
    config: &Config,
    file: Option<&Path>,
    role: agentchat_session::Role,
) -> anyhow::Result<()> {
    let content = if let Some(path) = file {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading input file {}", path.display()))?
    } else if !is_stdin_tty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        buf
    } else {
        String::new()
    };

    let renderer = TranscriptRenderer::new(config.render);
    let (turn, charts) = renderer.render_turn(&ConversationTurn { role, content });
    println!("{}", turn.html);
    for job in &charts {
        println!("<script>{}</script>", chart_script(job));
    }
    Ok(())
}

// ── Interactive loop ─────────────────────────────────────────────────────────

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Action(Action),
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Action(Action::Send(line.to_string()));
    };
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));
    match name {
        "upload" => Input::Action(Action::UploadFiles(
            rest.split_whitespace().map(Into::into).collect(),
        )),
        "urls" => Input::Action(Action::SetUrls(rest.split_whitespace().collect::<Vec<_>>().join("\n"))),
        "process-urls" => Input::Action(Action::UploadUrls),
        "clear" => Input::Action(Action::ClearIndex),
        "config" => Input::Action(Action::Configure((!rest.is_empty()).then(|| rest.to_string()))),
        "new" => Input::Action(Action::Reset),
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

const HELP: &str = "\
/upload FILE...     upload documents
/urls URL...        replace the URL list
/process-urls       have the agent fetch the URL list
/clear              clear the agent's index
/config [TEXT]      send domain instructions (default: profile's)
/new                start a new conversation
/quit               leave";

async fn run_chat(mut client: ChatClient) -> anyhow::Result<()> {
    client.refresh();
    let interactive = is_stdin_tty();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("> ");
            io::stdout().flush().ok();
        }
        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Unknown(name) => eprintln!("unknown command /{name} (try /help)"),
            Input::Action(action) => {
                let panel = action.panel();
                if let (Some(panel), Some(status)) = (panel, client.dispatch(action).await) {
                    let marker = if status.is_error() { "!" } else { "" };
                    println!("[{}{marker}] {status}", panel.label());
                }
            }
        }
    }
    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn is_stdin_tty() -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        unsafe { libc::isatty(io::stdin().as_raw_fd()) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
