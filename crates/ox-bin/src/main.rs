//! dotedit entrypoint: load a file, run structural command scripts over it,
//! write the result.
use anyhow::{Context, Result};
use clap::Parser;
use core_command::run;
use core_config::{Config, load_from};
use core_render::{Viewport, render_session};
use core_state::{Dot, Session};
use core_text::Buffer;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "dotedit", version, about = "Structural regex batch editor")]
struct Args {
    /// File to edit. A missing file starts as an empty document.
    pub file: PathBuf,
    /// Command script, run in order against the whole document. Repeatable.
    #[arg(short = 'e', long = "expr", value_name = "SCRIPT")]
    pub scripts: Vec<String>,
    /// Write the result back to FILE instead of stdout.
    #[arg(long = "in-place")]
    pub in_place: bool,
    /// Print the window around the final dot to stderr.
    #[arg(long = "show")]
    pub show: bool,
    /// Optional configuration file path (overrides discovery of `dotedit.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Log file path.
    #[arg(long = "log-file", default_value = "dotedit.log")]
    pub log_file: PathBuf,
}

fn configure_logging(log_path: &Path) -> Option<WorkerGuard> {
    let dir = match log_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = log_path.file_name()?;
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }
    let file_appender = tracing_appender::rolling::never(dir, name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    // Fails when a global subscriber is already installed; the guard is dropped then.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Read `path` into a session. A missing file yields an empty document.
fn load_session(path: &Path, config: Config) -> Result<Session> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => {
            debug!(target: "io", file = %path.display(), size_bytes = bytes.len(), "file_read_ok");
            bytes
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "io", file = %path.display(), "file_missing_starting_empty");
            Vec::new()
        }
        Err(e) => {
            error!(target: "io", file = %path.display(), ?e, "file_open_error");
            return Err(e).with_context(|| format!("reading {}", path.display()));
        }
    };
    Ok(Session::new(Buffer::from_bytes(name, bytes), config))
}

/// Run each script with the dot reset to the whole document and the cursor
/// at its start, so pattern addresses search the entire text. Stops at the
/// first failing script.
fn run_scripts(session: &mut Session, scripts: &[String]) -> Result<()> {
    for (i, src) in scripts.iter().enumerate() {
        session.set_dot(Dot::new(0, session.len()));
        session.goto(0);
        let dot = run(session, src).with_context(|| format!("script {} `{}`", i + 1, src))?;
        debug!(
            target: "runtime",
            script = i + 1,
            start = dot.start,
            end = dot.end,
            doc_len = session.len(),
            "script_done"
        );
    }
    Ok(())
}

fn save(session: &Session, path: &Path, in_place: bool) -> Result<()> {
    if in_place {
        std::fs::write(path, session.bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(target: "io", file = %path.display(), size_bytes = session.len(), "file_write_ok");
    } else {
        let mut out = io::stdout().lock();
        out.write_all(session.bytes()).context("writing to stdout")?;
        out.flush().context("flushing stdout")?;
    }
    Ok(())
}

fn show(session: &mut Session) -> Result<()> {
    let mut viewport = Viewport::from_config(session.config());
    let dot = session.dot();
    session.goto(dot.start);
    let frame = render_session(session, &mut viewport);
    let mut err = io::stderr().lock();
    for y in 0..frame.height {
        writeln!(err, "{}", frame.row_text(y)).context("writing to stderr")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(&args.log_file);
    install_panic_hook();
    info!(target: "runtime", scripts = args.scripts.len(), in_place = args.in_place, "startup");

    let config = load_from(args.config.clone())?;
    let mut session = load_session(&args.file, config)?;
    if let Err(e) = run_scripts(&mut session, &args.scripts) {
        error!(target: "runtime", error = %e, "script_failed");
        return Err(e);
    }
    save(&session, &args.file, args.in_place)?;
    if args.show {
        show(&mut session)?;
    }
    info!(target: "runtime", modified = session.modified(), "shutdown");
    Ok(())
}
