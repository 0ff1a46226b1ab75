// src/script.rs
//! Line-oriented event scripts used by the command line driver.
//!
//! ```text
//! # comment
//! state gameplay
//! log info [Wires] Cut wire 3
//! exception Keypad handler crashed
//! solved
//! ```

use crate::error::{Error, Result};
use crate::service::{CompetitiveLogger, GameEvent, GameState};
use log::{Log, Record};
use std::io::BufRead;
use std::sync::Arc;

/// Target of log lines issued by scripts.
pub const HOST_TARGET: &str = "host";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Event(GameEvent),
    Log { level: log::Level, message: String },
    Exception(String),
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Step>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let fail = |message: String| Error::Script {
        line: line_no,
        message,
    };

    let step = match command {
        "state" => {
            let state = rest.parse::<GameState>().map_err(fail)?;
            Step::Event(GameEvent::StateChanged(state))
        }
        "exploded" => Step::Event(GameEvent::BombExploded),
        "solved" => Step::Event(GameEvent::BombSolved),
        "log" => {
            let (level, message) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let level = level
                .parse::<log::Level>()
                .map_err(|_| fail(format!("unknown log level '{}'", level)))?;
            Step::Log {
                level,
                message: message.trim().to_string(),
            }
        }
        "exception" => Step::Exception(rest.to_string()),
        other => return Err(fail(format!("unknown command '{}'", other))),
    };

    Ok(Some(step))
}

/// Parse a whole script, numbering lines from 1.
pub fn parse(source: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        if let Some(step) = parse_line(idx + 1, line)? {
            steps.push(step);
        }
    }
    Ok(steps)
}

/// Execute one step against a running service.
pub fn apply(service: &CompetitiveLogger, step: Step) -> Result<()> {
    match step {
        Step::Event(event) => service.handle(event)?,
        Step::Log { level, message } => service.switchboard().log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target(HOST_TARGET)
                .build(),
        ),
        Step::Exception(message) => {
            service.log_exception(Arc::new(std::io::Error::other(message)), None)?
        }
    }
    Ok(())
}

/// Read and execute a script line by line, returning the number of steps run.
///
/// Lines are executed as they are read, so an interactive stdin works.
pub fn run<R: BufRead>(service: &CompetitiveLogger, input: R) -> Result<usize> {
    let mut steps = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line.map_err(Error::ScriptRead)?;
        if let Some(step) = parse_line(idx + 1, &line)? {
            apply(service, step)?;
            steps += 1;
        }
    }
    Ok(steps)
}
