use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payment_intents::{InsertPaymentIntentEntity, PaymentIntentEntity},
    value_objects::payments::CompletionOutcome,
};

#[automock]
#[async_trait]
pub trait PaymentIntentRepository {
    async fn create(&self, insert_entity: InsertPaymentIntentEntity)
    -> Result<PaymentIntentEntity>;

    /// One-time write of the provider tracking reference. Returns `false`
    /// when the reference was already assigned, leaving the row untouched.
    async fn assign_checkout_request_id(
        &self,
        intent_id: Uuid,
        checkout_request_id: &str,
    ) -> Result<bool>;

    async fn find_by_id(&self, intent_id: Uuid) -> Result<Option<PaymentIntentEntity>>;

    /// Indexed lookup; the only way an asynchronous provider notification can
    /// be matched back to local state.
    async fn find_by_checkout_request_id(
        &self,
        checkout_request_id: &str,
    ) -> Result<Option<PaymentIntentEntity>>;

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PaymentIntentEntity>>;

    /// Transition from `pending` only. Calling on an already-finalized intent
    /// is a no-op that returns the existing row unchanged.
    async fn mark_failed(&self, intent_id: Uuid, reason: String) -> Result<PaymentIntentEntity>;

    /// Unit of work for a successful payment: in one transaction, flip the
    /// intent `pending -> completed` (guarded on current state), insert the
    /// funded subscription and set the owner's entitlement flag active. Any
    /// error rolls the whole transaction back, leaving the intent `pending`.
    async fn complete_and_activate(
        &self,
        intent_id: Uuid,
        receipt_number: String,
        paid_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome>;
}
