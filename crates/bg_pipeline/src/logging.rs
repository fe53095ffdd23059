use std::fmt;
use tracing::Level;

/// Log handle carrying the run context (subject, stage) as bracketed
/// prefixes, outermost first.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    context: Vec<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child logger with one more level of context.
    pub fn scoped(&self, label: impl fmt::Display) -> Self {
        let mut context = self.context.clone();
        context.push(format!("[{}]", label));
        Self { context }
    }

    pub(crate) fn line(&self, message: &str) -> String {
        if self.context.is_empty() {
            message.to_string()
        } else {
            format!("{} {}", self.context.join(" "), message)
        }
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.line(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.line(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.line(message));
    }
}

/// Install the fmt subscriber and hand back a root logger. A subscriber
/// that is already installed is left in place.
pub fn init_logging(level: Level) -> Logger {
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_nest_in_order() {
        let root = Logger::new();
        let stage = root.scoped("Poodle").scoped("publish");
        assert_eq!(stage.line("sent"), "[Poodle] [publish] sent");
        assert_eq!(root.line("sent"), "sent");
    }
}
