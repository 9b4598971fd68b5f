use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::payment_intents::PaymentIntentEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct InitiatePaymentModel {
    pub phone_number: String,
    pub amount: i32,
    pub plan: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitiatePaymentResponse {
    pub intent_id: Uuid,
    pub checkout_request_id: String,
    pub customer_message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentDto {
    pub intent_id: Uuid,
    pub amount: i32,
    pub currency: String,
    pub plan: String,
    pub phone_number: String,
    pub status: String,
    pub receipt_number: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentIntentEntity> for PaymentIntentDto {
    fn from(entity: PaymentIntentEntity) -> Self {
        Self {
            intent_id: entity.id,
            amount: entity.amount,
            currency: entity.currency,
            plan: entity.plan,
            phone_number: entity.phone_number,
            status: entity.status,
            receipt_number: entity.receipt_number,
            failure_reason: entity.failure_reason,
            paid_at: entity.paid_at,
            created_at: entity.created_at,
        }
    }
}

/// Result of the guarded completion transaction. Only one caller ever
/// observes `Activated` for a given intent; every other delivery sees the
/// already-finalized row.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    Activated {
        subscription_id: Uuid,
        intent: PaymentIntentEntity,
    },
    AlreadyFinalized(PaymentIntentEntity),
}

/// M-Pesa subscriber numbers in the format Daraja expects: 254 country code
/// followed by a 9-digit mobile number (07xx or 01xx ranges).
pub fn is_valid_msisdn(phone_number: &str) -> bool {
    phone_number.len() == 12
        && phone_number.bytes().all(|b| b.is_ascii_digit())
        && (phone_number.starts_with("2547") || phone_number.starts_with("2541"))
}
