//! Progress reporting

/// Human-readable progress sink.
///
/// Best effort only; nothing in reconciliation depends on it.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Logger that forwards to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}
