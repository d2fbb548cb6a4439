use async_trait::async_trait;
use thiserror::Error;

/// Provider-reported reason a charge was not captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineCode {
    CardDeclined,
    InsufficientFunds,
    AuthenticationRequired,
    ExpiredCard,
    ProcessingError,
    Unknown,
}

impl DeclineCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclineCode::CardDeclined => "card_declined",
            DeclineCode::InsufficientFunds => "insufficient_funds",
            DeclineCode::AuthenticationRequired => "authentication_required",
            DeclineCode::ExpiredCard => "expired_card",
            DeclineCode::ProcessingError => "processing_error",
            DeclineCode::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> DeclineCode {
        match value {
            "card_declined" => DeclineCode::CardDeclined,
            "insufficient_funds" => DeclineCode::InsufficientFunds,
            "authentication_required" => DeclineCode::AuthenticationRequired,
            "expired_card" => DeclineCode::ExpiredCard,
            "processing_error" => DeclineCode::ProcessingError,
            _ => DeclineCode::Unknown,
        }
    }

    /// Remediation text shown verbatim to the payer.
    pub fn user_message(&self) -> &'static str {
        match self {
            DeclineCode::CardDeclined => {
                "Your card was declined. Try a different payment method."
            }
            DeclineCode::InsufficientFunds => {
                "Your card has insufficient funds. Try a different payment method."
            }
            DeclineCode::AuthenticationRequired => {
                "This payment requires additional authentication. Confirm the payment and try again."
            }
            DeclineCode::ExpiredCard => {
                "Your card has expired. Update your card details and try again."
            }
            DeclineCode::ProcessingError => {
                "The payment could not be processed. Wait a moment and try again."
            }
            DeclineCode::Unknown => {
                "The payment was declined. Try again or use a different payment method."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentStatus {
    RequiresConfirmation,
    Processing,
    Succeeded,
    Canceled,
}

impl IntentStatus {
    /// Anything the provider has not explicitly settled or canceled still
    /// waits on payer confirmation.
    pub fn parse(value: &str) -> IntentStatus {
        match value {
            "succeeded" => IntentStatus::Succeeded,
            "processing" => IntentStatus::Processing,
            "canceled" => IntentStatus::Canceled,
            _ => IntentStatus::RequiresConfirmation,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, IntentStatus::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclineDetail {
    pub code: DeclineCode,
    pub message: String,
}

/// A capture intent as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub status: IntentStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub client_secret: Option<String>,
    pub last_decline: Option<DeclineDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTransfer {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("payment declined ({}): {message}", code.as_str())]
    Declined { code: DeclineCode, message: String },
    #[error("payment intent not found: {0}")]
    IntentNotFound(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Port to the external payment processor. Capture runs against the payer,
/// transfer pays a contractor account out of captured funds.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a capture intent for exactly the given amount and currency.
    /// `reference` keys provider-side idempotency, so retrying a create for
    /// the same reference returns the same intent.
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        reference: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    async fn retrieve_intent(&self, intent_id: &str)
        -> Result<PaymentIntent, PaymentGatewayError>;

    /// Pay a captured amount out to the contractor account.
    async fn transfer(
        &self,
        amount_minor: i64,
        currency: &str,
        destination: &str,
        idempotency_key: &str,
    ) -> Result<ProviderTransfer, PaymentGatewayError>;
}
