use crate::config::Payment;
use crate::infrastructure::payment::gateway::{
    DeclineCode, DeclineDetail, IntentStatus, PaymentGateway, PaymentGatewayError, PaymentIntent,
    ProviderTransfer,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Payment processor client over its REST API. Authentication is a bearer
/// secret key; create and transfer calls carry an `Idempotency-Key` header
/// so a retried request never double-charges.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl HttpPaymentGateway {
    pub fn new(settings: &Payment) -> Result<Self, PaymentGatewayError> {
        let timeout = std::time::Duration::from_millis(settings.request_timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentGatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            secret_key: settings.secret_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_intent(
        &self,
        response: reqwest::Response,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let status = response.status();
        if status.is_success() {
            let body: IntentBody = response
                .json()
                .await
                .map_err(|e| PaymentGatewayError::Provider(e.to_string()))?;
            return Ok(body.into_intent());
        }
        Err(Self::error_from(status, response).await)
    }

    async fn error_from(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> PaymentGatewayError {
        let body: Option<ErrorEnvelope> = response.json().await.ok();
        let detail = body.map(|envelope| envelope.error);
        if let Some(detail) = &detail {
            if let Some(decline_code) = &detail.decline_code {
                return PaymentGatewayError::Declined {
                    code: DeclineCode::parse(decline_code),
                    message: detail
                        .message
                        .clone()
                        .unwrap_or_else(|| "payment declined".to_string()),
                };
            }
        }
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| format!("unexpected provider response: {status}"));
        PaymentGatewayError::Provider(message)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        reference: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let body = CreateIntentBody {
            amount: amount_minor,
            currency,
            reference,
        };
        let response = self
            .client
            .post(self.url("/v1/payment_intents"))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", reference)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::Transport(e.to_string()))?;
        self.read_intent(response).await
    }

    async fn retrieve_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/payment_intents/{intent_id}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::Transport(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentGatewayError::IntentNotFound(intent_id.to_string()));
        }
        self.read_intent(response).await
    }

    async fn transfer(
        &self,
        amount_minor: i64,
        currency: &str,
        destination: &str,
        idempotency_key: &str,
    ) -> Result<ProviderTransfer, PaymentGatewayError> {
        let body = CreateTransferBody {
            amount: amount_minor,
            currency,
            destination,
        };
        let response = self
            .client
            .post(self.url("/v1/transfers"))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            let body: TransferBody = response
                .json()
                .await
                .map_err(|e| PaymentGatewayError::Provider(e.to_string()))?;
            return Ok(ProviderTransfer { id: body.id });
        }
        Err(Self::error_from(status, response).await)
    }
}

#[derive(Debug, Serialize)]
struct CreateIntentBody<'a> {
    amount: i64,
    currency: &'a str,
    reference: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTransferBody<'a> {
    amount: i64,
    currency: &'a str,
    destination: &'a str,
}

#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    status: String,
    amount: i64,
    currency: String,
    client_secret: Option<String>,
    last_payment_error: Option<ProviderErrorBody>,
}

impl IntentBody {
    fn into_intent(self) -> PaymentIntent {
        PaymentIntent {
            id: self.id,
            status: IntentStatus::parse(&self.status),
            amount_minor: self.amount,
            currency: self.currency,
            client_secret: self.client_secret,
            last_decline: self.last_payment_error.map(|error| DeclineDetail {
                code: DeclineCode::parse(error.decline_code.as_deref().unwrap_or("")),
                message: error
                    .message
                    .unwrap_or_else(|| "payment declined".to_string()),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransferBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
    decline_code: Option<String>,
}
