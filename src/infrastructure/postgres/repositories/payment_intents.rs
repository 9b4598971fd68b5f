use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            payment_intents::{InsertPaymentIntentEntity, PaymentIntentEntity},
            subscriptions::InsertSubscriptionEntity,
        },
        repositories::payment_intents::PaymentIntentRepository,
        value_objects::{
            enums::{
                entitlement_statuses::EntitlementStatus,
                payment_intent_statuses::PaymentIntentStatus,
                subscription_statuses::SubscriptionStatus,
            },
            payments::CompletionOutcome,
            subscriptions::subscription_ends_at,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{app_users, payment_intents, subscriptions},
    },
};

pub struct PaymentIntentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentIntentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentIntentRepository for PaymentIntentPostgres {
    async fn create(
        &self,
        insert_entity: InsertPaymentIntentEntity,
    ) -> Result<PaymentIntentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let intent = insert_into(payment_intents::table)
            .values(&insert_entity)
            .returning(PaymentIntentEntity::as_returning())
            .get_result::<PaymentIntentEntity>(&mut conn)?;

        Ok(intent)
    }

    async fn assign_checkout_request_id(
        &self,
        intent_id: Uuid,
        checkout_request_id: &str,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Conditional on the column still being unset; 0 rows affected means
        // the reference was already assigned.
        let affected = update(payment_intents::table)
            .filter(payment_intents::id.eq(intent_id))
            .filter(payment_intents::checkout_request_id.is_null())
            .set((
                payment_intents::checkout_request_id.eq(Some(checkout_request_id.to_string())),
                payment_intents::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn find_by_id(&self, intent_id: Uuid) -> Result<Option<PaymentIntentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let intent = payment_intents::table
            .find(intent_id)
            .select(PaymentIntentEntity::as_select())
            .first::<PaymentIntentEntity>(&mut conn)
            .optional()?;

        Ok(intent)
    }

    async fn find_by_checkout_request_id(
        &self,
        checkout_request_id: &str,
    ) -> Result<Option<PaymentIntentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let intent = payment_intents::table
            .filter(payment_intents::checkout_request_id.eq(checkout_request_id))
            .select(PaymentIntentEntity::as_select())
            .first::<PaymentIntentEntity>(&mut conn)
            .optional()?;

        Ok(intent)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PaymentIntentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let intents = payment_intents::table
            .filter(payment_intents::user_id.eq(user_id))
            .order(payment_intents::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(PaymentIntentEntity::as_select())
            .load::<PaymentIntentEntity>(&mut conn)?;

        Ok(intents)
    }

    async fn mark_failed(&self, intent_id: Uuid, reason: String) -> Result<PaymentIntentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(payment_intents::table)
            .filter(payment_intents::id.eq(intent_id))
            .filter(payment_intents::status.eq(PaymentIntentStatus::Pending.to_string()))
            .set((
                payment_intents::status.eq(PaymentIntentStatus::Failed.to_string()),
                payment_intents::failure_reason.eq(Some(reason)),
                payment_intents::updated_at.eq(Utc::now()),
            ))
            .returning(PaymentIntentEntity::as_returning())
            .get_result::<PaymentIntentEntity>(&mut conn)
            .optional()?;

        match updated {
            Some(intent) => Ok(intent),
            // Already finalized; return the row as-is so callback retries
            // stay idempotent.
            None => {
                let existing = payment_intents::table
                    .find(intent_id)
                    .select(PaymentIntentEntity::as_select())
                    .first::<PaymentIntentEntity>(&mut conn)?;
                Ok(existing)
            }
        }
    }

    async fn complete_and_activate(
        &self,
        intent_id: Uuid,
        receipt_number: String,
        paid_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<CompletionOutcome, anyhow::Error, _>(|conn| {
            // Guarded transition: only the caller that flips pending ->
            // completed creates the subscription; everyone else observes the
            // finalized row.
            let completed = update(payment_intents::table)
                .filter(payment_intents::id.eq(intent_id))
                .filter(payment_intents::status.eq(PaymentIntentStatus::Pending.to_string()))
                .set((
                    payment_intents::status.eq(PaymentIntentStatus::Completed.to_string()),
                    payment_intents::receipt_number.eq(Some(receipt_number.clone())),
                    payment_intents::paid_at.eq(Some(paid_at)),
                    payment_intents::updated_at.eq(Utc::now()),
                ))
                .returning(PaymentIntentEntity::as_returning())
                .get_result::<PaymentIntentEntity>(conn)
                .optional()?;

            let intent = match completed {
                Some(intent) => intent,
                None => {
                    let existing = payment_intents::table
                        .find(intent_id)
                        .select(PaymentIntentEntity::as_select())
                        .first::<PaymentIntentEntity>(conn)?;
                    return Ok(CompletionOutcome::AlreadyFinalized(existing));
                }
            };

            let ends_at = subscription_ends_at(paid_at)
                .ok_or_else(|| anyhow!("failed to compute subscription end date"))?;

            let subscription_id = insert_into(subscriptions::table)
                .values(&InsertSubscriptionEntity {
                    user_id: intent.user_id,
                    plan: intent.plan.clone(),
                    status: SubscriptionStatus::Active.to_string(),
                    starts_at: paid_at,
                    ends_at,
                    payment_intent_id: Some(intent.id),
                })
                .returning(subscriptions::id)
                .get_result::<Uuid>(conn)?;

            // A missing owner row must abort the whole unit of work, not
            // leave the intent completed with the flag un-flipped.
            let flagged = update(app_users::table)
                .filter(app_users::id.eq(intent.user_id))
                .set((
                    app_users::subscription_status.eq(EntitlementStatus::Active.to_string()),
                    app_users::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            super::exactly_one_row(flagged, "app_users")?;

            Ok(CompletionOutcome::Activated {
                subscription_id,
                intent,
            })
        })
    }
}
