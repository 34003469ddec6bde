//! Console email sender for development. Logs emails to tracing output.

use async_trait::async_trait;
use tourism_application::EmailSender;
use tourism_core::AppResult;
use tracing::info;

/// Development email sender that logs messages instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    /// Creates a new console email sender.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleEmailSender {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        info!(
            to = to,
            subject = subject,
            "--- EMAIL (console) ---\nTo: {}\nSubject: {}\n\n{}\n--- END EMAIL ---",
            to,
            subject,
            body
        );

        Ok(())
    }
}
