#![warn(missing_docs)]
//! forkfft CLI Library
//!
//! Entry point shared by the root process and every child it spawns. Each
//! invocation is one node of the tree: it reads samples from stdin, and
//! either prints the single sample back or hands the even- and odd-indexed
//! halves to two fresh copies of the same binary and recombines their
//! results.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = forkfft_cli::run() {
//!         forkfft_cli::exit_fatal(&forkfft_cli::program_name(), &e);
//!     }
//! }
//! ```

mod config;
mod error;
mod orchestrator;
mod reporter;
mod supervisor;

pub use config::*;
pub use error::{Half, NodeError};
pub use orchestrator::{NodeOutcome, Orchestrator};
pub use reporter::{EXIT_FAILURE, diagnostic, exit_fatal, program_name, report_fatal, write_fatal};
pub use supervisor::{ChildLink, ChildNode, transform_in_children};

use clap::{ArgAction, Parser};
use forkfft_core::Precision;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// forkfft CLI arguments
///
/// Children are spawned without arguments; everything they need beyond
/// their stdin comes from the environment set by their parent.
#[derive(Parser, Debug)]
#[command(name = "forkfft")]
#[command(
    version,
    about = "Fast Fourier transform of complex samples on stdin, one process per recursive call"
)]
pub struct Cli {
    /// Print results with 3 decimals instead of 6
    #[arg(short = 'p', long = "short", action = ArgAction::Count)]
    pub short: u8,

    /// Execution mode: process (default) or in-process
    #[arg(long, value_enum)]
    pub mode: Option<ExecutionMode>,

    /// Fail instead of blocking forever on a child (e.g. "30s", "500ms")
    #[arg(long)]
    pub wait_timeout: Option<String>,

    /// Configuration file (default: forkfft.toml found by walking up from the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run a node with the process's own arguments, stdin and stdout.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run a node with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = build_node_config(&cli, program_name())?;
    init_logging(&config.log_filter);

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    Orchestrator::new(config).run(stdin, stdout)?;
    Ok(())
}

/// Install the stderr tracing subscriber. stdout carries data and stays untouched.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("forkfft=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build this node's configuration by layering: defaults → forkfft.toml → CLI → environment.
///
/// Nodes below the root ignore the configuration file and `-p`; their
/// settings come only from the environment the parent passed down.
pub fn build_node_config(cli: &Cli, program: String) -> Result<NodeConfig, NodeError> {
    if cli.short > 1 {
        return Err(NodeError::InvalidConfig(
            "option -p given more than once".to_string(),
        ));
    }

    let env_filter = std::env::var(LOG_ENV).ok().filter(|f| !f.is_empty());
    let env_timeout = std::env::var(WAIT_TIMEOUT_ENV).ok();

    let mut config = NodeConfig::root(program);
    config.depth = NodeConfig::depth_from_env();

    if !config.is_root() {
        if let Some(filter) = env_filter {
            config.log_filter = filter;
        }
        config.wait_timeout = env_timeout.as_deref().map(parse_timeout).transpose()?;
        return Ok(config);
    }

    let file = match &cli.config {
        Some(path) => ForkfftConfig::load(path)
            .map_err(|e| NodeError::InvalidConfig(format!("{}: {e}", path.display())))?,
        None => ForkfftConfig::discover().unwrap_or_default(),
    };

    config.precision = if cli.short > 0 {
        Precision::Short
    } else {
        file.precision()
            .map_err(|e| NodeError::InvalidConfig(e.to_string()))?
    };
    config.mode = cli.mode.unwrap_or(file.runner.mode);
    config.wait_timeout = cli
        .wait_timeout
        .as_deref()
        .or(file.runner.wait_timeout.as_deref())
        .map(parse_timeout)
        .transpose()?;
    config.log_filter = match env_filter {
        Some(filter) => filter,
        None if cli.verbose => "forkfft=debug".to_string(),
        None => file.log.filter,
    };

    Ok(config)
}

fn parse_timeout(value: &str) -> Result<std::time::Duration, NodeError> {
    ForkfftConfig::parse_duration(value)
        .map_err(|e| NodeError::InvalidConfig(format!("wait timeout: {e}")))
}
