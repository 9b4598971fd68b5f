use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentIntentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentIntentStatus::Pending => "pending",
            PaymentIntentStatus::Completed => "completed",
            PaymentIntentStatus::Failed => "failed",
            PaymentIntentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentIntentStatus::Pending),
            "completed" => Some(PaymentIntentStatus::Completed),
            "failed" => Some(PaymentIntentStatus::Failed),
            "cancelled" => Some(PaymentIntentStatus::Cancelled),
            _ => None,
        }
    }
}

impl Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
