use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use slipway_core::booking::Booking;
use slipway_core::payment::{CheckoutSession, GatewayError, PaymentGateway};

use crate::app_config::GatewayConfig;

/// Hosted-checkout client for the payment provider.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    id: String,
    #[serde(rename = "redirectUrl")]
    redirect_url: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }
}

fn request_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Network(err.to_string())
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_checkout_session(
        &self,
        booking: &Booking,
    ) -> Result<CheckoutSession, GatewayError> {
        let payload = json!({
            "amount": booking.amount_cents,
            "currency": self.config.currency,
            "successUrl": self.config.success_url,
            "cancelUrl": self.config.cancel_url,
            "failureUrl": self.config.failure_url,
            "metadata": {
                "bookingId": booking.id,
                "unitId": booking.unit_id,
                "startsAt": booking.starts_at,
                "email": booking.email,
            },
        });

        let response = self
            .client
            .post(format!("{}/api/checkouts", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&payload)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "checkout session rejected");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let checkout: CheckoutResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;

        tracing::info!(booking_id = %booking.id, reference = %checkout.id, "checkout session created");
        Ok(CheckoutSession {
            reference: checkout.id,
            redirect_url: checkout.redirect_url,
        })
    }
}
