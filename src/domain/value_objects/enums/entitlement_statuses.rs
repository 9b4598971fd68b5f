use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Denormalized paid-access flag on the user row. Written only by payment
/// completion and subscription cancellation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntitlementStatus {
    Active,
    Inactive,
}

impl EntitlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementStatus::Active => "active",
            EntitlementStatus::Inactive => "inactive",
        }
    }
}

impl Display for EntitlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
