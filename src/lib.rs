// src/lib.rs
//! Log interception for competitive play.
//!
//! Every `log` facade call is routed through a [`Switchboard`]. While a
//! [`CompetitiveLogger`] is installed, those calls land in a
//! [`BufferingSink`] that forwards them to the original logger, or holds
//! them back during gameplay and replays them in order afterwards.

pub mod config;
pub mod error;
pub mod record;
pub mod script;
pub mod service;
pub mod sink;
pub mod switchboard;

pub use config::Config;
pub use error::{Error, Result};
pub use record::{Arg, CapturedError, Context, LogRecord, Severity};
pub use service::{CompetitiveLogger, GameEvent, GameState};
pub use sink::{BufferingSink, FacadeSink, LogSink, Mode, Redactor, SinkError};
pub use switchboard::Switchboard;
