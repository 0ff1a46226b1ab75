// src/sink/mod.rs
//! Log sinks: the forwarding capability and the buffering wrapper around it.

pub mod buffer;
pub mod facade;
pub mod redact;

pub use buffer::{BufferingSink, Mode};
pub use facade::FacadeSink;
pub use redact::Redactor;

use crate::record::{Arg, CapturedError, Context, Severity};
use std::sync::Arc;

/// Error raised by a sink while forwarding a record.
#[derive(Debug, thiserror::Error)]
#[error("log forwarding failed: {source}")]
pub struct SinkError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl SinkError {
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            source: source.into(),
        }
    }
}

/// A destination for log calls.
///
/// Forwarding is synchronous. Errors are returned to the caller untouched.
pub trait LogSink: Send + Sync {
    fn forward_formatted(
        &self,
        severity: Severity,
        context: Option<&Context>,
        template: &str,
        args: &[Arg],
    ) -> Result<(), SinkError>;

    fn forward_exception(
        &self,
        error: &CapturedError,
        context: Option<&Context>,
    ) -> Result<(), SinkError>;

    /// Push out anything the sink holds in its own output buffers.
    fn flush_output(&self) {}
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn forward_formatted(
        &self,
        severity: Severity,
        context: Option<&Context>,
        template: &str,
        args: &[Arg],
    ) -> Result<(), SinkError> {
        (**self).forward_formatted(severity, context, template, args)
    }

    fn forward_exception(
        &self,
        error: &CapturedError,
        context: Option<&Context>,
    ) -> Result<(), SinkError> {
        (**self).forward_exception(error, context)
    }

    fn flush_output(&self) {
        (**self).flush_output()
    }
}
