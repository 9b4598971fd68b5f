use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    repositories::subscriptions::SubscriptionRepository,
    value_objects::subscriptions::CurrentSubscriptionDto,
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("no active subscription to cancel")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type SubscriptionResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    /// Cancels the user's latest active subscription and drops the
    /// entitlement flag. Payment intents are never touched.
    pub async fn cancel(&self, user_id: Uuid) -> SubscriptionResult<()> {
        let cancelled = self
            .subscription_repo
            .cancel_latest_active(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: cancel failed");
                SubscriptionError::Internal(err)
            })?;

        match cancelled {
            Some(subscription_id) => {
                info!(%user_id, %subscription_id, "subscriptions: subscription cancelled");
                Ok(())
            }
            None => {
                let err = SubscriptionError::NotFound;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: no active subscription to cancel"
                );
                Err(err)
            }
        }
    }

    pub async fn current(
        &self,
        user_id: Uuid,
    ) -> SubscriptionResult<Option<CurrentSubscriptionDto>> {
        let subscription = self
            .subscription_repo
            .find_latest_active_by_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load current subscription");
                SubscriptionError::Internal(err)
            })?;

        Ok(subscription.map(CurrentSubscriptionDto::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mockall::predicate::eq;

    use crate::domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::subscriptions::MockSubscriptionRepository,
        value_objects::enums::subscription_statuses::SubscriptionStatus,
    };

    fn active_subscription(user_id: Uuid) -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan: "premium".to_string(),
            status: SubscriptionStatus::Active.to_string(),
            starts_at: now - Duration::days(5),
            ends_at: now + Duration::days(25),
            canceled_at: None,
            payment_intent_id: Some(Uuid::new_v4()),
            created_at: now - Duration::days(5),
        }
    }

    #[tokio::test]
    async fn cancel_without_active_subscription_is_not_found() {
        let user_id = Uuid::new_v4();

        let mut repo = MockSubscriptionRepository::new();
        repo.expect_cancel_latest_active()
            .with(eq(user_id))
            .returning(|_| Ok(None));

        let usecase = SubscriptionUseCase::new(Arc::new(repo));
        let err = usecase.cancel(user_id).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::NotFound));
    }

    #[tokio::test]
    async fn cancel_succeeds_for_latest_active_subscription() {
        let user_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();

        let mut repo = MockSubscriptionRepository::new();
        repo.expect_cancel_latest_active()
            .with(eq(user_id))
            .times(1)
            .returning(move |_| Ok(Some(subscription_id)));

        let usecase = SubscriptionUseCase::new(Arc::new(repo));
        usecase.cancel(user_id).await.unwrap();
    }

    #[tokio::test]
    async fn current_maps_latest_active_subscription() {
        let user_id = Uuid::new_v4();
        let subscription = active_subscription(user_id);
        let subscription_id = subscription.id;

        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_latest_active_by_user()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(subscription.clone())));

        let usecase = SubscriptionUseCase::new(Arc::new(repo));
        let current = usecase.current(user_id).await.unwrap().unwrap();
        assert_eq!(current.subscription_id, subscription_id);
        assert_eq!(current.plan, "premium");
    }
}
