//! Logging setup.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Logging options.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub default_level: String,
    pub directives: Vec<String>,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            directives: Vec::new(),
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    /// Adds a directive such as `sqlx=warn`.
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("ignoring log directive '{directive}': {e}"),
            }
        }
        filter
    }
}

/// Installs the global subscriber. Later calls do nothing.
pub fn init(config: &LogConfig) {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .with_target(config.with_target)
            .with_writer(std::io::stderr);
        let _ = tracing_subscriber::registry()
            .with(config.filter())
            .with(layer)
            .try_init();
    });
}
