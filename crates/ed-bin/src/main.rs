//! Entry point: wires the terminal, the decoder, the renderer and the
//! editor state together and runs the main loop until a clean quit.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use core_actions::{ActionError, RenderOptions};
use core_input::KeyDecoder;
use core_state::Editor;
use core_terminal::RawModeGuard;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `editor [filename]` (SPEC_FULL.md §10.O).
#[derive(Parser, Debug)]
#[command(name = "editor", version, about = "A small terminal text editor")]
struct Args {
    /// File to open at startup. With none, starts with an empty buffer.
    path: Option<PathBuf>,
    /// Override config discovery instead of searching `editor.toml`.
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        error!(target: "runtime", error = %err, "fatal error");
        core_terminal::clear_screen_and_home();
        eprintln!("editor: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let _log_guard = configure_logging()?;
    install_panic_hook();

    let args = Args::parse();
    let config = core_config::load_from(args.config.clone()).context("loading config")?;

    let raw_mode = RawModeGuard::enable().context("entering raw mode")?;
    let (term_rows, term_cols) = core_terminal::window_size().context("reading window size")?;
    let term_rows = (term_rows as usize).saturating_sub(2);

    let mut editor = Editor::new(term_rows, term_cols as usize, config.tab_stop);
    if let Some(path) = &args.path {
        editor
            .open(path)
            .with_context(|| format!("opening {}", path.display()))?;
    }

    info!(
        target: "runtime",
        path = ?args.path,
        term_rows,
        term_cols,
        "startup"
    );

    let stdin = io::stdin();
    let mut decoder = KeyDecoder::new(stdin.lock());
    let mut stdout = io::stdout();
    let opts = RenderOptions {
        version: VERSION,
        status_timeout: Duration::from_secs(config.status_timeout_secs),
    };

    let result = core_actions::run(&mut editor, &mut decoder, &mut stdout, opts);
    drop(raw_mode);
    core_terminal::clear_screen_and_home();
    let _ = stdout.flush();

    match result {
        Ok(()) => Ok(()),
        Err(ActionError::Decode(e)) => Err(anyhow::Error::new(e).context("reading a key")),
        Err(ActionError::Io(e)) => Err(anyhow::Error::new(e).context("writing a frame")),
    }
}

fn configure_logging() -> Result<Option<WorkerGuard>> {
    let log_dir = Path::new(".");
    let appender = tracing_appender::rolling::never(log_dir, "editor.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", %info, "panic");
            default_hook(info);
        }));
    });
}
