pub mod entitlement_statuses;
pub mod payment_intent_statuses;
pub mod plan_tiers;
pub mod subscription_statuses;
