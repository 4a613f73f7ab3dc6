use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("monthly amount must be at least 0.01")]
    AmountTooSmall,
    #[error("month {0} is not within 1..=12")]
    MonthOutOfRange(u32),
    #[error("month {0} appears more than once")]
    DuplicateMonth(u32),
    #[error("active settings need at least one active month")]
    NoActiveMonths,
}

/// Recurring fee configuration, one per club. Replaced as a
/// whole on every write, never merged.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ClubFeeSettings {
    pub club_id: u32,
    pub monthly_amount: f64,
    pub currency: String,
    /// Months (1-12) in which a fee is charged.
    pub active_months: Vec<u32>,
    pub is_active: bool,
}

impl ClubFeeSettings {
    /// Check the settings invariants. Both stores run this
    /// before persisting.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.monthly_amount < 0.01 {
            return Err(SettingsError::AmountTooSmall);
        }
        let mut seen = [false; 13];
        for &month in &self.active_months {
            if !(1..=12).contains(&month) {
                return Err(SettingsError::MonthOutOfRange(month));
            }
            if seen[month as usize] {
                return Err(SettingsError::DuplicateMonth(month));
            }
            seen[month as usize] = true;
        }
        if self.is_active && self.active_months.is_empty() {
            return Err(SettingsError::NoActiveMonths);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ClubFeeSettings {
        ClubFeeSettings {
            club_id: 1,
            monthly_amount: 23.0,
            currency: "EUR".to_string(),
            active_months: vec![1, 2, 3],
            is_active: true,
        }
    }

    #[test]
    fn test_validate_ok() {
        settings().validate().unwrap();
    }

    #[test]
    fn test_validate_amount() {
        let mut s = settings();
        s.monthly_amount = 0.0;
        assert_eq!(s.validate(), Err(SettingsError::AmountTooSmall));

        s.monthly_amount = 0.01;
        s.validate().unwrap();
    }

    #[test]
    fn test_validate_months() {
        let mut s = settings();
        s.active_months = vec![1, 13];
        assert_eq!(s.validate(), Err(SettingsError::MonthOutOfRange(13)));

        s.active_months = vec![0];
        assert_eq!(s.validate(), Err(SettingsError::MonthOutOfRange(0)));

        s.active_months = vec![4, 5, 4];
        assert_eq!(s.validate(), Err(SettingsError::DuplicateMonth(4)));
    }

    #[test]
    fn test_validate_active_needs_months() {
        let mut s = settings();
        s.active_months = vec![];
        assert_eq!(s.validate(), Err(SettingsError::NoActiveMonths));

        // Inactive settings may have an empty month set.
        s.is_active = false;
        s.validate().unwrap();
    }
}
