// src/sink/buffer.rs
//! Sink that either forwards log calls or holds them back for later replay.

use super::{LogSink, Redactor, SinkError};
use crate::record::{Arg, CapturedError, Context, LogRecord, Severity};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Whether log calls currently reach the underlying sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    PassThrough,
    Buffering,
}

struct State {
    enabled: bool,
    queue: VecDeque<LogRecord>,
}

/// Wraps a real sink and queues everything logged while output is disabled.
///
/// Output starts enabled. [`disable`](Self::disable) begins buffering and
/// [`enable`](Self::enable) switches back to pass-through, then replays the
/// queue oldest first through the same path a live call takes, redaction
/// included.
///
/// The state lock is released before calling into the underlying sink, so a
/// sink that logs back into this one does not deadlock. Replays are
/// serialized by a separate lock held for the whole drain; the underlying
/// sink must not call [`flush`](Self::flush) or [`enable`](Self::enable) on
/// the sink that is replaying into it.
pub struct BufferingSink<S> {
    underlying: S,
    redactor: Redactor,
    state: Mutex<State>,
    replay: Mutex<()>,
}

impl<S: LogSink> BufferingSink<S> {
    pub fn new(underlying: S) -> Self {
        Self::with_redactor(underlying, Redactor::default())
    }

    pub fn with_redactor(underlying: S, redactor: Redactor) -> Self {
        Self {
            underlying,
            redactor,
            state: Mutex::new(State {
                enabled: true,
                queue: VecDeque::new(),
            }),
            replay: Mutex::new(()),
        }
    }

    /// The sink records are forwarded to.
    pub fn inner(&self) -> &S {
        &self.underlying
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn mode(&self) -> Mode {
        if self.is_enabled() {
            Mode::PassThrough
        } else {
            Mode::Buffering
        }
    }

    /// Number of records waiting for replay.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Forward a formatted call now, or queue it while output is disabled.
    pub fn log_formatted(
        &self,
        severity: Severity,
        context: Option<Context>,
        template: &str,
        args: Vec<Arg>,
    ) -> Result<(), SinkError> {
        {
            let mut state = self.lock();
            if !state.enabled {
                state
                    .queue
                    .push_back(LogRecord::regular(severity, context, template, args));
                return Ok(());
            }
        }

        let args = self.redactor.apply(&args);
        self.underlying
            .forward_formatted(severity, context.as_ref(), template, &args)
    }

    /// Forward an exception now, or queue it while output is disabled.
    pub fn log_exception(
        &self,
        error: CapturedError,
        context: Option<Context>,
    ) -> Result<(), SinkError> {
        {
            let mut state = self.lock();
            if !state.enabled {
                state
                    .queue
                    .push_back(LogRecord::exceptional(error, context));
                return Ok(());
            }
        }

        self.underlying.forward_exception(&error, context.as_ref())
    }

    /// Submit a captured record through the matching entry point.
    pub fn log_record(&self, record: LogRecord) -> Result<(), SinkError> {
        match record {
            LogRecord::Regular {
                severity,
                context,
                template,
                args,
            } => self.log_formatted(severity, context, &template, args),
            LogRecord::Exceptional { error, context } => self.log_exception(error, context),
        }
    }

    /// Start buffering. Returns `false` when output was already disabled.
    pub fn disable(&self) -> bool {
        let mut state = self.lock();
        let changed = state.enabled;
        state.enabled = false;
        changed
    }

    /// Switch to pass-through without replaying anything.
    ///
    /// Returns `false` when output was already enabled.
    pub fn resume(&self) -> bool {
        let mut state = self.lock();
        let changed = !state.enabled;
        state.enabled = true;
        changed
    }

    /// Switch to pass-through and replay the queue.
    ///
    /// Returns the number of records forwarded during replay.
    pub fn enable(&self) -> Result<usize, SinkError> {
        self.resume();
        self.flush()
    }

    /// Replay queued records oldest first.
    ///
    /// Each record re-enters [`log_record`](Self::log_record), so it is
    /// forwarded if output is enabled and queued again otherwise. When a
    /// forward fails the record goes back to the head of the queue and the
    /// error is returned; everything behind it stays queued in order.
    pub fn flush(&self) -> Result<usize, SinkError> {
        // one drain at a time, or concurrent enables would interleave records
        let _replay = self.replay.lock().unwrap_or_else(PoisonError::into_inner);
        let mut forwarded = 0;

        loop {
            let record = {
                let mut state = self.lock();
                if !state.enabled {
                    // disabled mid-replay: the rest waits for the next enable
                    break;
                }
                match state.queue.pop_front() {
                    Some(record) => record,
                    None => break,
                }
            };

            let retry = record.clone();
            if let Err(err) = self.log_record(record) {
                self.lock().queue.push_front(retry);
                log::debug!(
                    "replay stopped after {} record(s), {} still queued",
                    forwarded,
                    self.pending()
                );
                return Err(err);
            }
            forwarded += 1;
        }

        Ok(forwarded)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: LogSink> LogSink for BufferingSink<S> {
    fn forward_formatted(
        &self,
        severity: Severity,
        context: Option<&Context>,
        template: &str,
        args: &[Arg],
    ) -> Result<(), SinkError> {
        self.log_formatted(severity, context.cloned(), template, args.to_vec())
    }

    fn forward_exception(
        &self,
        error: &CapturedError,
        context: Option<&Context>,
    ) -> Result<(), SinkError> {
        self.log_exception(error.clone(), context.cloned())
    }

    fn flush_output(&self) {
        self.underlying.flush_output();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Formatted(Severity, String, Vec<String>),
        Exception(String),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Call>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LogSink for Recorder {
        fn forward_formatted(
            &self,
            severity: Severity,
            _context: Option<&Context>,
            template: &str,
            args: &[Arg],
        ) -> Result<(), SinkError> {
            self.calls.lock().unwrap().push(Call::Formatted(
                severity,
                template.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
            Ok(())
        }

        fn forward_exception(
            &self,
            error: &CapturedError,
            _context: Option<&Context>,
        ) -> Result<(), SinkError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Exception(error.to_string()));
            Ok(())
        }
    }

    fn info(sink: &BufferingSink<Recorder>, msg: &str) {
        sink.log_formatted(Severity::Info, None, "{}", vec![Arg::from(msg)])
            .unwrap();
    }

    #[test]
    fn starts_in_pass_through() {
        let sink = BufferingSink::new(Recorder::default());
        assert_eq!(sink.mode(), Mode::PassThrough);

        info(&sink, "x");
        assert_eq!(
            sink.inner().calls(),
            vec![Call::Formatted(Severity::Info, "{}".into(), vec!["x".into()])]
        );
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn disable_reports_transition_once() {
        let sink = BufferingSink::new(Recorder::default());
        assert!(sink.disable());
        assert!(!sink.disable());
        assert_eq!(sink.mode(), Mode::Buffering);

        assert!(sink.resume());
        assert!(!sink.resume());
    }

    #[test]
    fn replays_both_variants_in_order() {
        let sink = BufferingSink::new(Recorder::default());
        sink.disable();

        info(&sink, "first");
        let err: CapturedError = Arc::new(std::io::Error::other("boom"));
        sink.log_exception(err, None).unwrap();
        sink.log_formatted(Severity::Warning, None, "{} {}", vec![Arg::from("w"), Arg::value(3)])
            .unwrap();

        assert!(sink.inner().calls().is_empty());
        assert_eq!(sink.pending(), 3);

        assert_eq!(sink.enable().unwrap(), 3);
        assert_eq!(
            sink.inner().calls(),
            vec![
                Call::Formatted(Severity::Info, "{}".into(), vec!["first".into()]),
                Call::Exception("boom".into()),
                Call::Formatted(Severity::Warning, "{} {}".into(), vec!["w".into(), "3".into()]),
            ]
        );
        assert_eq!(sink.pending(), 0);
        assert!(sink.is_enabled());
    }

    #[test]
    fn resume_without_flush_keeps_queue() {
        let sink = BufferingSink::new(Recorder::default());
        sink.disable();
        info(&sink, "held");

        sink.resume();
        assert_eq!(sink.pending(), 1);
        info(&sink, "live");

        assert_eq!(sink.flush().unwrap(), 1);
        let calls = sink.inner().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            Call::Formatted(Severity::Info, "{}".into(), vec!["held".into()])
        );
    }

    #[test]
    fn flush_while_disabled_does_nothing() {
        let sink = BufferingSink::new(Recorder::default());
        sink.disable();
        info(&sink, "held");

        assert_eq!(sink.flush().unwrap(), 0);
        assert_eq!(sink.pending(), 1);
        assert!(sink.inner().calls().is_empty());
    }

    #[test]
    fn nested_buffering_sinks_compose() {
        let outer = BufferingSink::new(BufferingSink::new(Recorder::default()));
        outer.inner().disable();

        info_outer(&outer, "a");
        assert_eq!(outer.inner().pending(), 1);
        outer.inner().enable().unwrap();
        assert_eq!(outer.inner().inner().calls().len(), 1);
    }

    fn info_outer(sink: &BufferingSink<BufferingSink<Recorder>>, msg: &str) {
        sink.log_formatted(Severity::Info, None, "{}", vec![Arg::from(msg)])
            .unwrap();
    }
}
