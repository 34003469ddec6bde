//! Console SMS sender for development. Logs messages to tracing output.

use async_trait::async_trait;
use tourism_application::SmsSender;
use tourism_core::AppResult;
use tracing::info;

/// Development SMS sender that logs messages instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSmsSender;

impl ConsoleSmsSender {
    /// Creates a new console SMS sender.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SmsSender for ConsoleSmsSender {
    async fn send_text(&self, to: &str, body: &str) -> AppResult<()> {
        info!(
            to = to,
            "--- SMS (console) ---\nTo: {}\n\n{}\n--- END SMS ---",
            to,
            body
        );

        Ok(())
    }
}
