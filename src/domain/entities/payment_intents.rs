use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payment_intents;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payment_intents)]
pub struct PaymentIntentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    pub currency: String,
    pub plan: String,
    pub phone_number: String,
    pub checkout_request_id: Option<String>,
    pub status: String,
    pub receipt_number: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_intents)]
pub struct InsertPaymentIntentEntity {
    pub user_id: Uuid,
    pub amount: i32,
    pub currency: String,
    pub plan: String,
    pub phone_number: String,
    pub status: String,
}
