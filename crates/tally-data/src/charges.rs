use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Idempotency key of a recurring charge period.
pub fn period_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeKind {
    /// Generated from the club's fee settings.
    Recurring,
    /// Created directly against a member subset.
    #[default]
    Custom,
}

impl ChargeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChargeKind::Recurring => "recurring",
            ChargeKind::Custom => "custom",
        }
    }
}

impl std::str::FromStr for ChargeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recurring" => Ok(ChargeKind::Recurring),
            "custom" => Ok(ChargeKind::Custom),
            other => Err(anyhow!("unknown charge kind: {}", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ChargeFilter {
    pub id: Option<u32>,
    pub club_id: Option<u32>,
    /// Only charges whose target set contains this member.
    pub user_id: Option<u32>,
    pub kind: Option<ChargeKind>,
    pub period: Option<String>,
    pub due_before: Option<NaiveDate>,
}

/// A charge against one or more members. Immutable once
/// created; payment state is never written back onto it.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: u32,
    pub club_id: u32,
    pub kind: ChargeKind,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub due_date: NaiveDate,
    /// Snapshot of the members this charge applies to,
    /// expanded before creation and never re-resolved.
    pub target_user_ids: Vec<u32>,
    /// Period key, `Some` only for recurring charges.
    pub period: Option<String>,
    pub created_by: u32,
    pub created_at: NaiveDateTime,
}

impl Charge {
    pub fn applies_to(&self, user_id: u32) -> bool {
        self.target_user_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_key() {
        assert_eq!(period_key(2025, 3), "2025-03");
        assert_eq!(period_key(2025, 11), "2025-11");
    }

    #[test]
    fn test_charge_kind_roundtrip() {
        assert_eq!("recurring".parse::<ChargeKind>().unwrap(), ChargeKind::Recurring);
        assert_eq!("custom".parse::<ChargeKind>().unwrap(), ChargeKind::Custom);
        assert!("weekly".parse::<ChargeKind>().is_err());
    }

    #[test]
    fn test_charge_applies_to() {
        let charge = Charge {
            target_user_ids: vec![1, 2, 3],
            ..Default::default()
        };
        assert!(charge.applies_to(2));
        assert!(!charge.applies_to(4));
    }
}
