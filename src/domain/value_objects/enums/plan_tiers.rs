use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanTier {
    Basic,
    Premium,
    Institution,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Basic => "basic",
            PlanTier::Premium => "premium",
            PlanTier::Institution => "institution",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(PlanTier::Basic),
            "premium" => Some(PlanTier::Premium),
            "institution" => Some(PlanTier::Institution),
            _ => None,
        }
    }
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tiers() {
        assert_eq!(PlanTier::from_str("basic"), Some(PlanTier::Basic));
        assert_eq!(PlanTier::from_str("premium"), Some(PlanTier::Premium));
        assert_eq!(PlanTier::from_str("institution"), Some(PlanTier::Institution));
    }

    #[test]
    fn rejects_unknown_tier() {
        assert_eq!(PlanTier::from_str("gold"), None);
    }
}
