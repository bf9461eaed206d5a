//! Error reporting.
//!
//! Failures that escape a request or a background job go to an
//! [`ErrorSink`]. The sink is built once at startup and handed to the server
//! state and the seed routine.

use std::fmt;
use std::sync::Arc;

/// Substring of warnings that are dropped by default.
pub const DEFAULT_SUPPRESSED: &str = "Suspense";

/// Destination for uncaught errors and warnings.
pub trait ErrorSink: Send + Sync {
    /// An error raised by `component`, with a short description of where
    /// it happened.
    fn error(&self, error: &dyn fmt::Display, component: Option<&str>, info: &str);

    /// A non-fatal warning with an optional component and trace.
    fn warning(&self, message: &str, component: Option<&str>, trace: &str);

    /// A failure nobody handled, such as a panicking request.
    fn unhandled(&self, reason: &str);
}

pub type SharedSink = Arc<dyn ErrorSink>;

/// Forwards everything to `tracing`.
#[derive(Debug, Clone)]
pub struct TracingSink {
    suppressed: Vec<String>,
}

impl Default for TracingSink {
    fn default() -> Self {
        Self {
            suppressed: vec![DEFAULT_SUPPRESSED.to_string()],
        }
    }
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that suppresses warnings containing any of `patterns`.
    /// An empty list keeps every warning.
    pub fn with_suppressed<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suppressed: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn suppresses(&self, message: &str) -> bool {
        self.suppressed
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }

    pub fn shared(self) -> SharedSink {
        Arc::new(self)
    }
}

impl ErrorSink for TracingSink {
    fn error(&self, error: &dyn fmt::Display, component: Option<&str>, info: &str) {
        tracing::error!(
            component = component.unwrap_or("-"),
            info,
            error = %error,
            "Global error handler"
        );
    }

    fn warning(&self, message: &str, component: Option<&str>, trace: &str) {
        if self.suppresses(message) {
            return;
        }
        tracing::warn!(component = component.unwrap_or("-"), trace, "{message}");
    }

    fn unhandled(&self, reason: &str) {
        tracing::error!(reason, "Unhandled promise rejection");
    }
}
