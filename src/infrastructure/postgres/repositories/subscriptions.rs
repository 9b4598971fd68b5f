use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, RunQueryDsl, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::subscriptions::SubscriptionRepository,
        value_objects::enums::{
            entitlement_statuses::EntitlementStatus,
            subscription_statuses::SubscriptionStatus,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{app_users, subscriptions},
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_latest_active_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let subscription = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .order(subscriptions::created_at.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(subscription)
    }

    async fn cancel_latest_active(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<Option<Uuid>, anyhow::Error, _>(|conn| {
            let latest = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
                .order(subscriptions::created_at.desc())
                .select(subscriptions::id)
                .first::<Uuid>(conn)
                .optional()?;

            let Some(subscription_id) = latest else {
                return Ok(None);
            };

            update(subscriptions::table)
                .filter(subscriptions::id.eq(subscription_id))
                .set((
                    subscriptions::status.eq(SubscriptionStatus::Cancelled.to_string()),
                    subscriptions::canceled_at.eq(Some(Utc::now())),
                ))
                .execute(conn)?;

            let flagged = update(app_users::table)
                .filter(app_users::id.eq(user_id))
                .set((
                    app_users::subscription_status.eq(EntitlementStatus::Inactive.to_string()),
                    app_users::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            super::exactly_one_row(flagged, "app_users")?;

            Ok(Some(subscription_id))
        })
    }
}
