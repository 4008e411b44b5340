use crate::{error::CapabilityError, types::EmailMessage};
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), CapabilityError>;
}

/// Mailer that only records the notification in the log
///
/// SMTP delivery lives outside this service; deployments that need it plug
/// in their own `Mailer`.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), CapabilityError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            bytes = message.body.len(),
            "notification dispatched"
        );
        Ok(())
    }
}
