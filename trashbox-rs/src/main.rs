//! trashbox - list, browse and restore trashed files.

mod cli;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trashbox_core::browser::{self, BrowserStyle};
use trashbox_core::prelude::*;
use trashbox_core::{print_size, sanitize_user_path};

use crate::cli::{Cli, Commands, MoveArgs, RestoreArgs};

const LOG_ENV: &str = "TRASHBOX_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli) {
        eprintln!("trashbox: cannot set up logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            debug!("exiting with error: {err:?}");
            eprintln!("trashbox: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_env(cli.overrides())?;
    debug!(
        "backend {} (trash {}, recycle bin {})",
        config.backend,
        sanitize_user_path(&config.trash_root),
        sanitize_user_path(&config.recycle_root)
    );

    match cli.command {
        Some(Commands::List) => list(&config),
        Some(Commands::Restore(args)) => restore(&config, &args),
        Some(Commands::Move(args)) => move_paths(&config, &args),
        Some(Commands::Browse) | None => {
            let engine = TrashEngine::from_config(&config)?;
            browser::run(engine, BrowserStyle::default()).context("terminal error")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn list(config: &Config) -> Result<ExitCode> {
    let engine = TrashEngine::from_config(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for entry in engine.catalog().entries() {
        let fields = [
            ("FileName", entry.display_name.clone()),
            ("Location", entry.original_path.display().to_string()),
            ("InTrashBox", entry.storage_path.display().to_string()),
            ("DateDeleted", entry.deleted_at_rfc3339()),
            ("Size", format!("{} ({})", entry.size_bytes, print_size(entry.size_bytes))),
        ];
        for (label, value) in fields {
            writeln!(out, "{label:<12}: {value}")?;
        }
        writeln!(out)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn restore(config: &Config, args: &RestoreArgs) -> Result<ExitCode> {
    let mut engine = TrashEngine::from_config(config)?;
    let restored = engine.restore_by_name(&args.pattern, args.to.as_deref(), prompt_for_candidate)?;

    println!(
        "restored {} to {}",
        restored.entry.display_name,
        restored.destination.display()
    );
    for warning in &restored.report.warnings {
        eprintln!("trashbox: warning: {warning}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the candidates and reads a zero-based index from stdin.
fn prompt_for_candidate(candidates: &[Candidate]) -> trashbox_core::Result<usize> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    choose_from(candidates, &mut stdin.lock(), &mut stdout.lock())
}

fn choose_from<R: BufRead, W: Write>(
    candidates: &[Candidate],
    input: &mut R,
    output: &mut W,
) -> trashbox_core::Result<usize> {
    let io_err = |err| BackendError::io(PathBuf::from("<stdin>"), err);

    writeln!(output, "{} entries match:", candidates.len()).map_err(io_err)?;
    for candidate in candidates {
        writeln!(
            output,
            "  [{}] {:<24} {:>10}  {}  {}",
            candidate.index,
            candidate.display_name,
            print_size(candidate.size_bytes),
            candidate.deleted_at,
            candidate.original_path.display()
        )
        .map_err(io_err)?;
    }
    write!(output, "restore which? ").map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(io_err)?;
    let answer = line.trim();
    answer
        .parse::<usize>()
        .map_err(|_| BackendError::invalid_input(format!("{answer:?} is not an entry number")))
}

fn move_paths(config: &Config, args: &MoveArgs) -> Result<ExitCode> {
    let engine = TrashEngine::from_config(config)?;
    let mut failed = 0;

    for outcome in engine.move_all(args.paths.as_slice()) {
        match outcome.result {
            Ok(()) => debug!("trashed {}", sanitize_user_path(&outcome.path)),
            Err(err) => {
                failed += 1;
                eprintln!("trashbox: {}: {err}", outcome.path.display());
            }
        }
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!(
            "trashbox={default_level},trashbox_core={default_level}"
        )),
    };

    let browsing = matches!(cli.command, None | Some(Commands::Browse));
    if browsing {
        // the alternate screen owns stdout and stderr while browsing
        let dir = log_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
        let logfile = tracing_appender::rolling::daily(dir, "log");
        tracing_subscriber::registry()
            .with(fmt::layer().compact().with_ansi(false).with_writer(logfile))
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).compact().with_writer(io::stderr))
            .with(filter)
            .try_init()?;
    }
    Ok(())
}

fn log_dir() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir().context("no cache directory for the log file")?;
    Ok(cache_dir.join("trashbox").join("logs"))
}
