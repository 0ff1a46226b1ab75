// src/main.rs
//! Drives the competitive logger from an event script.
//!
//! Each script line is either a game event or a host log call; see
//! [`competitive_logger::script`] for the syntax. Input is read line by line,
//! so stdin can be used interactively.

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use competitive_logger::script;
use competitive_logger::{CompetitiveLogger, Config, Switchboard};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

/// Hold back game logs during competitive rounds and replay them afterwards
#[derive(Parser, Debug)]
#[command(name = "competitive_logger", version, about)]
struct Cli {
    /// Event script to run (reads stdin when omitted)
    script: Option<PathBuf>,

    /// Config file (defaults to <config dir>/competitive_logger/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter for the real output, overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Print shell completions and exit
    #[arg(long, value_enum)]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "competitive_logger", &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // RUST_LOG, when set, layers on top of the configured filter
    let real = config
        .logger_builder()
        .parse_env(env_logger::Env::default())
        .build();
    let max_level = real.filter();
    let switchboard = Switchboard::install(Arc::new(real), max_level)?;

    let mut service = CompetitiveLogger::install(switchboard, config.redactor());

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    script::run(&service, input)?;

    service.teardown()?;
    log::logger().flush();
    Ok(())
}
