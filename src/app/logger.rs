//! Timestamped line logger
//!
//! Every line starts with the local wall-clock time as `[HH:MM:SS]`,
//! followed by an optional tag and the rendered values separated by spaces.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Tag placed between the timestamp and the values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Debug,
    Fatal,
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "[DEBUG]"),
            Self::Fatal => write!(f, "[FATAL ERROR]"),
        }
    }
}

/// Shared line writer, stdout unless redirected
#[derive(Clone)]
pub struct Logger {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Logger {
    pub fn stdout() -> Self {
        Self::to_writer(io::stdout())
    }

    pub fn to_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write one timestamped line
    pub fn line(&self, tag: Option<LogTag>, values: &[Value]) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let line = format_line(&timestamp, tag, values);
        if let Ok(mut out) = self.out.lock() {
            // Write errors are dropped.
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Build a log line from its parts
pub fn format_line(timestamp: &str, tag: Option<LogTag>, values: &[Value]) -> String {
    let mut line = format!("[{}]", timestamp);
    if let Some(tag) = tag {
        line.push(' ');
        line.push_str(&tag.to_string());
    }
    for value in values {
        line.push(' ');
        line.push_str(&render(value));
    }
    line
}

/// Render a value for a log line.
///
/// Strings print raw. Objects and arrays print as indented JSON at full
/// depth so nested structures stay readable.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

/// Convert any serializable value into a loggable one
pub fn to_log_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)))
}

/// Log values through an [`AppContext`](crate::AppContext).
///
/// ```ignore
/// launchpad::log!(ctx, "listening on", port);
/// ```
#[macro_export]
macro_rules! log {
    ($ctx:expr $(, $value:expr)* $(,)?) => {
        $ctx.log(&[$($crate::app::to_log_value(&$value)),*])
    };
}

/// Log values tagged `[DEBUG]` when debugging is enabled.
#[macro_export]
macro_rules! debug {
    ($ctx:expr $(, $value:expr)* $(,)?) => {
        $ctx.debug(&[$($crate::app::to_log_value(&$value)),*])
    };
}

/// Log values tagged `[FATAL ERROR]`, then terminate (unless overridden).
#[macro_export]
macro_rules! die {
    ($ctx:expr $(, $value:expr)* $(,)?) => {
        $ctx.die(&[$($crate::app::to_log_value(&$value)),*])
    };
}
