// ABOUTME: provides the nlsh cli for translating, checking and running plain-language requests.
// ABOUTME: offers one-shot subcommands and an interactive session backed by the engine.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use nlsh::{
    export_session, init_config, parse_repl_line, render_entry, render_settings, render_translation,
    ReplCommand, HELP,
};
use nlterm_common::{HistoryEntry, HistoryStatus, SafetyLevel};
use nlterm_engine::config::{self, Config};
use nlterm_engine::{policy, suggest, translate, EngineError, Phase, Session};

#[derive(Debug, Parser)]
#[command(name = "nlsh", about = "plain-language shell with a safety gate")]
struct Args {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the command a request resolves to, as json.
    Translate {
        #[arg(required = true)]
        text: Vec<String>,

        #[arg(long)]
        safety_level: Option<SafetyLevel>,
    },
    /// Print the safety verdict for a literal shell command, as json.
    Validate {
        command: String,

        #[arg(long)]
        safety_level: Option<SafetyLevel>,
    },
    /// Print phrases matching a partial request.
    Suggest { partial: String },
    /// Translate, check and run a single request.
    Run {
        #[arg(required = true)]
        text: Vec<String>,

        #[arg(long)]
        mock: bool,
    },
    /// Start an interactive session.
    Repl {
        #[arg(long)]
        mock: bool,
    },
    /// Show the effective configuration.
    Config {
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)
        .with_context(|| format!("load config from {}", config_path.display()))?;

    match args.command {
        Command::Translate { text, safety_level } => {
            let level = safety_level.unwrap_or(config.settings.safety_level);
            let translation = translate::resolve(&text.join(" "), level);
            println!("{}", serde_json::to_string_pretty(&translation)?);
        }
        Command::Validate {
            command,
            safety_level,
        } => {
            let level = safety_level.unwrap_or(config.settings.safety_level);
            let verdict = policy::validate(&command, level);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            if !verdict.is_safe {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Suggest { partial } => {
            for key in suggest::suggest(&partial) {
                println!("{key}");
            }
        }
        Command::Run { text, mock } => {
            let config = Config {
                engine: config.engine.clone().without_delays(),
                ..config.clone()
            };
            let session = Session::from_config(&config, mock);
            let entry = session.submit(&text.join(" ")).await?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
            if entry.status != HistoryStatus::Success {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Repl { mock } => {
            let session = Session::from_config(&config, mock);
            repl(&session).await?;
        }
        Command::Config { init } => {
            if init {
                let fresh = init_config(&config_path)?;
                eprintln!("wrote {}", config_path.display());
                print!("{}", toml::to_string_pretty(&fresh)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn repl(session: &Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("nlsh: type :help for commands");
    loop {
        stdout.write_all(b"nlsh> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_repl_line(&line) {
            Ok(command) => command,
            Err(err) => {
                debug!(error = %err, "unparsed repl line");
                println!("{err}");
                continue;
            }
        };

        match command {
            ReplCommand::Nothing => {}
            ReplCommand::Submit(text) => submit(session, &text).await,
            ReplCommand::RunBuffer => {
                let buffer = session.input();
                if buffer.is_empty() {
                    println!("nothing recalled; use :up first");
                } else {
                    submit(session, &buffer).await;
                }
            }
            ReplCommand::Up | ReplCommand::Down => {
                let recalled = if command == ReplCommand::Up {
                    session.history_up()
                } else {
                    session.history_down()
                };
                match recalled {
                    Some(text) if !text.is_empty() => println!("recalled: {text}"),
                    Some(_) => println!("buffer cleared"),
                    None => println!("history is empty"),
                }
            }
            ReplCommand::History => print_entries(session, &session.history()),
            ReplCommand::Search(query) => print_entries(session, &session.search(&query)),
            ReplCommand::Suggest(partial) => {
                for suggestion in session.suggestions(&partial) {
                    println!("  {}", suggestion.command);
                }
            }
            ReplCommand::Clear => {
                session.clear();
                println!("history cleared");
            }
            ReplCommand::Export(dir) => {
                let dir = dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
                match export_session(session, &dir).await {
                    Ok(path) => println!("exported to {}", path.display()),
                    Err(err) => {
                        warn!(error = %format!("{err:#}"), "history export failed");
                        println!("export failed: {err:#}");
                    }
                }
            }
            ReplCommand::Set(patch) => {
                let settings = session.update_settings(patch);
                println!("{}", render_settings(&settings));
            }
            ReplCommand::Settings => println!("{}", render_settings(&session.settings())),
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
        }
    }

    Ok(())
}

async fn submit(session: &Session, text: &str) {
    let show_panel = session.settings().show_ai_panel;
    let mut phases = session.subscribe_phase();
    let submission = session.submit(text);
    tokio::pin!(submission);

    // Show the translation as soon as the command starts running.
    let mut shown = !show_panel;
    let result = loop {
        tokio::select! {
            result = &mut submission => break result,
            changed = phases.changed(), if !shown => {
                if changed.is_err() {
                    shown = true;
                    continue;
                }
                let phase = *phases.borrow_and_update();
                if phase == Phase::Executing {
                    if let Some(translation) = session.current_translation() {
                        println!("{}", render_translation(&translation));
                    }
                    shown = true;
                }
            }
        }
    };

    match result {
        Ok(entry) => println!("{}", render_entry(&entry, show_panel)),
        Err(EngineError::Busy) => println!("still working on the previous request"),
        Err(err) => {
            warn!(error = %err, "submission rejected");
            println!("{err}");
        }
    }
}

fn print_entries(session: &Session, entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("no history");
        return;
    }
    let show_explanation = session.settings().show_ai_panel;
    for entry in entries {
        println!("{}", render_entry(entry, show_explanation));
    }
}
