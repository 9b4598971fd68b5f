use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

/// A paid term runs one calendar month from the payment timestamp, clamped
/// to the last day when the target month is shorter (Jan 31 -> Feb 28).
pub fn subscription_ends_at(starts_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    starts_at.checked_add_months(Months::new(1))
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentSubscriptionDto {
    pub subscription_id: Uuid,
    pub plan: String,
    pub status: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for CurrentSubscriptionDto {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            subscription_id: entity.id,
            plan: entity.plan,
            status: entity.status,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn term_is_one_calendar_month_not_thirty_days() {
        let paid_at = Utc.with_ymd_and_hms(2025, 1, 16, 10, 30, 0).unwrap();
        let ends_at = subscription_ends_at(paid_at).unwrap();
        assert_eq!(ends_at, Utc.with_ymd_and_hms(2025, 2, 16, 10, 30, 0).unwrap());

        let paid_at = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let ends_at = subscription_ends_at(paid_at).unwrap();
        // February is 28 days; a 30-day term would land on Mar 3.
        assert_eq!(ends_at, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_end_start_clamps_to_shorter_month() {
        let paid_at = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let ends_at = subscription_ends_at(paid_at).unwrap();
        assert_eq!(ends_at, Utc.with_ymd_and_hms(2025, 2, 28, 23, 59, 59).unwrap());
    }
}
