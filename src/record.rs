// src/record.rs
//! Captured payloads of single logging calls.
//!
//! A [`LogRecord`] holds exactly what a caller handed to the logger so that it
//! can be replayed later through the same forwarding path. Records are never
//! validated or coerced: whatever was passed in is what gets replayed.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Severity of a formatted log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Assert,
    Exception,
}

impl Severity {
    /// The `log` level this severity is emitted at by a real sink.
    pub fn to_level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Assert | Severity::Exception => log::Level::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Assert => "assert",
            Severity::Exception => "exception",
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warning,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque object a log call refers to.
///
/// Clones share the referent. A record replayed after the referent changed
/// sees the changed state. Contexts built with [`Context::target`] also name
/// the `log` target the record came from.
#[derive(Clone)]
pub struct Context {
    value: Arc<dyn fmt::Debug + Send + Sync>,
    target: Option<Arc<str>>,
}

struct TargetName(Arc<str>);

impl fmt::Debug for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Context {
    pub fn new<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Self::shared(Arc::new(value))
    }

    /// Wrap an already shared value without copying it.
    pub fn shared(value: Arc<dyn fmt::Debug + Send + Sync>) -> Self {
        Self {
            value,
            target: None,
        }
    }

    /// Context of a record that arrived through the `log` facade.
    pub fn target(name: &str) -> Self {
        let name: Arc<str> = Arc::from(name);
        Self {
            value: Arc::new(TargetName(name.clone())),
            target: Some(name),
        }
    }

    /// The `log` target, for contexts built with [`Context::target`].
    pub fn target_name(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Whether both contexts point at the same object.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// One positional argument of a formatted log call.
#[derive(Clone)]
pub enum Arg {
    Str(String),
    Value(Arc<dyn fmt::Debug + Send + Sync>),
}

impl Arg {
    pub fn value<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Arg::Value(Arc::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            Arg::Value(_) => None,
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_owned())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(s),
            Arg::Value(v) => write!(f, "{:?}", v),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => write!(f, "{:?}", s),
            Arg::Value(v) => v.fmt(f),
        }
    }
}

impl PartialEq for Arg {
    /// Strings compare by content, opaque values by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Str(a), Arg::Str(b)) => a == b,
            (Arg::Value(a), Arg::Value(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An error value handed to the exception entry point.
pub type CapturedError = Arc<dyn StdError + Send + Sync>;

/// Payload of one logging call.
#[derive(Clone, Debug)]
pub enum LogRecord {
    Regular {
        severity: Severity,
        context: Option<Context>,
        template: String,
        args: Vec<Arg>,
    },
    Exceptional {
        error: CapturedError,
        context: Option<Context>,
    },
}

impl LogRecord {
    pub fn regular(
        severity: Severity,
        context: Option<Context>,
        template: impl Into<String>,
        args: Vec<Arg>,
    ) -> Self {
        LogRecord::Regular {
            severity,
            context,
            template: template.into(),
            args,
        }
    }

    pub fn exceptional(error: CapturedError, context: Option<Context>) -> Self {
        LogRecord::Exceptional { error, context }
    }

    pub fn context(&self) -> Option<&Context> {
        match self {
            LogRecord::Regular { context, .. } | LogRecord::Exceptional { context, .. } => {
                context.as_ref()
            }
        }
    }
}

/// Render a `{}` / `{N}` template against positional arguments.
///
/// `{{` and `}}` produce literal braces. Placeholders without a matching
/// argument are kept as written; surplus arguments are dropped.
pub fn render(template: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let Some(close) = template[i..].find('}') else {
                    out.push_str(&template[i..]);
                    break;
                };
                let inner = &template[i + 1..i + close];
                let index = if inner.is_empty() {
                    let idx = next;
                    next += 1;
                    Some(idx)
                } else {
                    inner.parse::<usize>().ok()
                };

                match index.and_then(|idx| args.get(idx)) {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => out.push_str(&template[i..=i + close]),
                }

                // skip past the closing brace
                while let Some((j, _)) = chars.peek() {
                    if *j > i + close {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    out
}
