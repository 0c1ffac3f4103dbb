use std::sync::Arc;
use std::time::Duration;

use slipway_core::booking::Booking;
use slipway_core::notify::{EmailMessage, MailError, Mailer, NotificationKind, Notifier};

use crate::emails;

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub from_name: String,
    pub admin_address: Option<String>,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            from_name: "Jet Ski & More".to_string(),
            admin_address: None,
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Sends booking e-mails off the request path.
///
/// Delivery is fire-and-forget with bounded retry; a send failure is logged
/// and never propagates back to the caller.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    config: DispatchConfig,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, config: DispatchConfig) -> Self {
        Self { mailer, config }
    }

    fn deliver(&self, message: EmailMessage) {
        let mailer = self.mailer.clone();
        let max_attempts = self.config.max_attempts.max(1);
        let retry_delay = self.config.retry_delay;
        tokio::spawn(async move {
            send_with_retry(mailer.as_ref(), &message, max_attempts, retry_delay).await;
        });
    }

    /// Relay a contact-form message to the configured admin address.
    pub async fn send_contact(
        &self,
        full_name: &str,
        email: &str,
        phone: &str,
        message: &str,
    ) -> Result<(), MailError> {
        let admin = self
            .config
            .admin_address
            .as_deref()
            .ok_or(MailError::NotConfigured)?;
        let rendered = emails::contact_message(admin, full_name, email, phone, message);
        self.mailer.send(&rendered).await
    }

    /// Best-effort status-update mail after an admin change.
    pub fn send_status_update(&self, booking: &Booking, message: &str) {
        self.deliver(emails::status_update(&self.config.from_name, booking, message));
    }
}

impl Notifier for NotificationDispatcher {
    fn notify(&self, booking: &Booking, kind: NotificationKind) {
        match kind {
            NotificationKind::Confirmation => {
                self.deliver(emails::payment_confirmation(&self.config.from_name, booking));
                if let Some(admin) = &self.config.admin_address {
                    self.deliver(emails::admin_paid_notice(admin, booking));
                }
            }
            NotificationKind::Failure => {
                self.deliver(emails::payment_failure(&self.config.from_name, booking));
            }
        }
    }
}

async fn send_with_retry(
    mailer: &dyn Mailer,
    message: &EmailMessage,
    max_attempts: u32,
    retry_delay: Duration,
) -> bool {
    for attempt in 1..=max_attempts {
        match mailer.send(message).await {
            Ok(()) => {
                tracing::debug!(to = %message.to, subject = %message.subject, "mail sent");
                return true;
            }
            Err(err) => {
                tracing::warn!(
                    to = %message.to,
                    subject = %message.subject,
                    attempt,
                    max_attempts,
                    error = %err,
                    "mail send failed"
                );
                if attempt < max_attempts {
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }
    tracing::error!(
        to = %message.to,
        subject = %message.subject,
        "giving up after {} attempts",
        max_attempts
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` sends, then succeeds.
    struct FlakyMailer {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Mailer for FlakyMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(MailError::Network("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "rider@example.com".to_string(),
            reply_to: None,
            subject: "test".to_string(),
            body: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let mailer = FlakyMailer {
            failures: 2,
            calls: AtomicU32::new(0),
        };

        let delivered = send_with_retry(&mailer, &message(), 3, Duration::ZERO).await;

        assert!(delivered);
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_is_bounded() {
        let mailer = FlakyMailer {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };

        let delivered = send_with_retry(&mailer, &message(), 3, Duration::ZERO).await;

        assert!(!delivered);
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_contact_requires_admin_address() {
        let dispatcher = NotificationDispatcher::new(
            Arc::new(FlakyMailer {
                failures: 0,
                calls: AtomicU32::new(0),
            }),
            DispatchConfig::default(),
        );

        let result = dispatcher
            .send_contact("Thandi", "thandi@example.com", "+27", "hello")
            .await;
        assert!(matches!(result, Err(MailError::NotConfigured)));
    }
}
