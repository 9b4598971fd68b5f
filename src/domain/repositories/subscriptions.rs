use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    /// Most recently created `active` subscription for the user, if any.
    /// Subscriptions are append-only; the latest active row is authoritative.
    async fn find_latest_active_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Atomically cancels the user's latest active subscription and sets the
    /// entitlement flag inactive. Returns the cancelled subscription id, or
    /// `None` when the user has no active subscription.
    async fn cancel_latest_active(&self, user_id: Uuid) -> Result<Option<Uuid>>;
}
