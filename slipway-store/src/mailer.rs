use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use slipway_core::notify::{EmailMessage, MailError, Mailer};

use crate::app_config::EmailConfig;

/// Client for the transactional mail provider's HTTP API.
pub struct HttpMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpMailer {
    pub fn new(config: EmailConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = json!({
            "from": format!("{} <{}>", self.config.from_name, self.config.from_address),
            "to": message.to,
            "replyTo": message.reply_to,
            "subject": message.subject,
            "text": message.body,
        });

        let response = self
            .client
            .post(self.config.api_url.as_str())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| MailError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
