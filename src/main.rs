//! idle-prompt - terminal demo of idle detection with a session prompt.
//!
//! Every line typed on stdin counts as user activity. After the configured
//! quiet period the user is asked to stay or log out.

use anyhow::{Context, Result};
use clap::Parser;
use idle_prompt::activity::ChannelSource;
use idle_prompt::activity::terminal::{TerminalInput, parse_line};
use idle_prompt::config::Config;
use idle_prompt::prompt::{Frame, LogLogout, SessionPrompt};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Idle detection with a stay-or-logout prompt.
///
/// Type anything (or `click`, `scroll`, `move`) to signal activity; answer
/// the prompt with `stay` or `logout`; `quit` exits.
#[derive(Parser, Debug)]
#[command(name = "idle-prompt")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds without activity before the prompt appears.
    #[arg(long)]
    idle_time: Option<f64>,

    /// Activity debounce window in milliseconds.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print activity events to stdout.
    #[arg(long)]
    print_events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("idle-prompt v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(secs) = args.idle_time {
        config.idle_time_seconds = secs;
    }
    if let Some(ms) = args.debounce_ms {
        config.debounce_ms = ms;
    }

    info!(
        "Configuration loaded (idle_time={}s, debounce={}ms)",
        config.idle_time_seconds, config.debounce_ms
    );

    run(&config, args.print_events).await
}

/// Initialize logging with the specified level.
///
/// Logs go to stderr so they stay out of the rendered view.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(format!("idle_prompt={level}"))
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    Ok(())
}

/// Run the view until stdin closes, `quit` is typed, or Ctrl-C.
async fn run(config: &Config, print_events: bool) -> Result<()> {
    let (activity, source) = ChannelSource::new(64);
    let view = SessionPrompt::mount(config, source, LogLogout)
        .context("Invalid idle configuration")?;

    let mut prompt_rx = view.watch_prompt();
    let mut idle_rx = view.timer().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut shown = view.render();
    println!("{shown}");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    info!("stdin closed");
                    break;
                };
                let input = parse_line(&line);

                if let Some(kind) = input.activity() {
                    if print_events {
                        println!("[ACTIVITY] | kind={}", kind.as_str());
                    }
                    if let Err(e) = activity.signal(kind).await {
                        warn!("Activity dropped: {}", e);
                    }
                }

                match input {
                    TerminalInput::Quit => break,
                    TerminalInput::Answer(action) => {
                        if !view.respond(action) {
                            debug!("No prompt to answer");
                        }
                    }
                    TerminalInput::Activity(_) => {}
                }
            }

            changed = prompt_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }

            changed = idle_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }

            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }

        redraw(&view.render(), &mut shown);
    }

    view.unmount();
    info!("idle-prompt stopped");
    Ok(())
}

/// Print the frame if it differs from what is on screen.
fn redraw(frame: &Frame, shown: &mut Frame) {
    if frame != shown {
        println!("{frame}");
        *shown = frame.clone();
    }
}
