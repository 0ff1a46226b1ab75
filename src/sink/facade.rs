// src/sink/facade.rs
//! Bridges between the `log` facade and [`LogSink`].
//!
//! [`FacadeSink`] is the real output: it renders records and hands them to a
//! `log::Log` implementation such as `env_logger::Logger`. In the other
//! direction, [`BufferingSink`] implements `log::Log` so it can sit behind the
//! global facade and see every `log::info!` and friends made by the host.

use super::{BufferingSink, LogSink, SinkError};
use crate::record::{self, Arg, CapturedError, Context, Severity};
use log::{Log, Metadata, Record};
use std::sync::Arc;

/// Target used when a record carries no context.
pub const DEFAULT_TARGET: &str = "host";

/// A [`LogSink`] that writes to a `log::Log` implementation.
///
/// Records that came in through the facade keep their original target. Any
/// other context is appended to the message as ` (context: <Debug>)` and the
/// record goes out under [`DEFAULT_TARGET`].
#[derive(Clone)]
pub struct FacadeSink {
    logger: Arc<dyn Log>,
}

impl FacadeSink {
    pub fn new(logger: Arc<dyn Log>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<dyn Log> {
        &self.logger
    }

    fn emit(&self, level: log::Level, context: Option<&Context>, text: &str) {
        let (target, suffix) = match context {
            Some(context) => match context.target_name() {
                Some(target) => (target, String::new()),
                None => (DEFAULT_TARGET, format!(" (context: {:?})", context)),
            },
            None => (DEFAULT_TARGET, String::new()),
        };

        self.logger.log(
            &Record::builder()
                .args(format_args!("{}{}", text, suffix))
                .level(level)
                .target(target)
                .build(),
        );
    }
}

impl LogSink for FacadeSink {
    fn forward_formatted(
        &self,
        severity: Severity,
        context: Option<&Context>,
        template: &str,
        args: &[Arg],
    ) -> Result<(), SinkError> {
        let text = record::render(template, args);
        match severity {
            Severity::Assert | Severity::Exception => {
                self.emit(severity.to_level(), context, &format!("[{}] {}", severity, text))
            }
            _ => self.emit(severity.to_level(), context, &text),
        }
        Ok(())
    }

    fn forward_exception(
        &self,
        error: &CapturedError,
        context: Option<&Context>,
    ) -> Result<(), SinkError> {
        let mut text = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            text.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        self.emit(log::Level::Error, context, &text);
        Ok(())
    }

    fn flush_output(&self) {
        self.logger.flush();
    }
}

impl<S: LogSink> Log for BufferingSink<S> {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let result = self.log_formatted(
            Severity::from(record.level()),
            Some(Context::target(record.target())),
            "{}",
            vec![Arg::Str(record.args().to_string())],
        );

        // `log::Log` has no error channel
        if let Err(err) = result {
            eprintln!("competitive_logger: {}", err);
        }
    }

    fn flush(&self) {
        self.inner().flush_output();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<(log::Level, String, String)>>,
    }

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.lines.lock().unwrap().push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
        }

        fn flush(&self) {}
    }

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("module crashed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[derive(Debug)]
    struct Module {
        name: &'static str,
    }

    #[test]
    fn renders_template_with_facade_target() {
        let capture = Arc::new(Capture::default());
        let sink = FacadeSink::new(capture.clone());

        sink.forward_formatted(
            Severity::Warning,
            Some(&Context::target("Wires")),
            "cut {} of {}",
            &[Arg::value(3), Arg::value(6)],
        )
        .unwrap();
        sink.forward_formatted(Severity::Assert, None, "{}", &[Arg::from("bad")])
            .unwrap();

        let lines = capture.lines.lock().unwrap();
        assert_eq!(
            lines[0],
            (log::Level::Warn, "Wires".to_string(), "cut 3 of 6".to_string())
        );
        assert_eq!(
            lines[1],
            (log::Level::Error, DEFAULT_TARGET.to_string(), "[assert] bad".to_string())
        );
    }

    #[test]
    fn object_context_is_appended_not_used_as_target() {
        let capture = Arc::new(Capture::default());
        let sink = FacadeSink::new(capture.clone());

        sink.forward_formatted(
            Severity::Info,
            Some(&Context::new(Module { name: "Keypad" })),
            "{}",
            &[Arg::from("strike")],
        )
        .unwrap();

        let lines = capture.lines.lock().unwrap();
        assert_eq!(
            lines[0],
            (
                log::Level::Info,
                DEFAULT_TARGET.to_string(),
                "strike (context: Module { name: \"Keypad\" })".to_string()
            )
        );
    }

    #[test]
    fn exception_includes_source_chain() {
        let capture = Arc::new(Capture::default());
        let sink = FacadeSink::new(capture.clone());
        let err: CapturedError = Arc::new(Outer(std::io::Error::other("disk gone")));

        sink.forward_exception(&err, None).unwrap();

        let lines = capture.lines.lock().unwrap();
        assert_eq!(lines[0].0, log::Level::Error);
        assert_eq!(lines[0].2, "module crashed\n  caused by: disk gone");
    }

    #[test]
    fn facade_records_are_buffered_with_their_target() {
        let capture = Arc::new(Capture::default());
        let sink = BufferingSink::new(FacadeSink::new(capture.clone()));
        sink.disable();

        Log::log(
            &sink,
            &Record::builder()
                .args(format_args!("solved {}", "Keypad"))
                .level(log::Level::Debug)
                .target("modules::keypad")
                .build(),
        );
        assert!(capture.lines.lock().unwrap().is_empty());

        sink.enable().unwrap();
        let lines = capture.lines.lock().unwrap();
        assert_eq!(
            lines[0],
            (
                log::Level::Info,
                "modules::keypad".to_string(),
                "solved Keypad".to_string()
            )
        );
    }
}
