use larousse_model::{LogEvent, Severity};
use tokio::sync::mpsc::UnboundedSender;

/// Destination for the human-readable progress lines of a run.
///
/// With a channel, every line is handed to the caller as a [`LogEvent`] and the
/// caller decides how to show it. Without one, lines go straight to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    sink: Option<UnboundedSender<LogEvent>>,
}

impl Reporter {
    pub fn new(sink: UnboundedSender<LogEvent>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A reporter that only logs through `tracing`.
    pub fn tracing() -> Self {
        Self::default()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Severity::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message.into());
    }

    fn emit(&self, severity: Severity, message: String) {
        let event = LogEvent { severity, message };
        match &self.sink {
            // A dropped receiver just means nobody is watching anymore.
            Some(sink) => {
                let _ = sink.send(event);
            }
            None => log_event(&event),
        }
    }
}

/// Forward a progress event to `tracing` at the matching level.
pub fn log_event(event: &LogEvent) {
    match event.severity {
        Severity::Info => tracing::info!("{}", event.message),
        Severity::Warn => tracing::warn!("{}", event.message),
        Severity::Error => tracing::error!("{}", event.message),
    }
}
