use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use ctxscope::{
    diagnostics::report_failure,
    project::{
        config::{find_config, load_options},
        discover, process_paths,
    },
    rewrite::Options,
};
use std::{path::PathBuf, process::ExitCode};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ctxscope")]
#[command(about = "Replace context.TODO() with the context in scope and instrument go statements")]
#[command(version)]
struct Cli {
    /// Treat context.Background() as a placeholder too
    #[arg(long)]
    background: bool,
    /// Leave go statements untouched
    #[arg(long)]
    no_detached: bool,
    /// Report changes without writing files
    #[arg(long)]
    dry_run: bool,
    /// Config file; defaults to the nearest ctxscope.toml above the first path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Go files or directories to rewrite
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("ctxscope=debug"),
        _ => EnvFilter::new("ctxscope=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Whether every file was processed.
fn run(cli: &Cli) -> Result<bool> {
    let options = options(cli)?;
    let files = match discover(&cli.paths) {
        Ok(files) => files,
        Err(err) => {
            report_failure(&err);
            return Ok(false);
        }
    };

    let mut ok = true;
    for result in process_paths(&files, &options, cli.dry_run) {
        match result {
            Ok(report) => {
                for notice in &report.notices {
                    println!("{}", notice.display(&report.path));
                }
            }
            Err(err) => {
                warn!(path = %err.path().display(), "file failed");
                report_failure(&err);
                ok = false;
            }
        }
    }
    Ok(ok)
}

fn options(cli: &Cli) -> Result<Options> {
    let config = match &cli.config {
        Some(path) => Some(path.clone()),
        None => cli.paths.first().and_then(|path| find_config(path)),
    };
    let mut options = match config {
        Some(path) => load_options(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Options::default(),
    };
    if cli.background {
        options = options.with_background();
    }
    if cli.no_detached {
        options = options.without_detached();
    }
    Ok(options)
}
