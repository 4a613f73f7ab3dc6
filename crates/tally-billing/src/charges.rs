use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error as ThisError;
use tracing::info;

use tally_data::{Charge, ChargeKind, Club, Insert};

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("amount must be greater than zero")]
    InvalidAmount,
    #[error("description must not be blank")]
    MissingDescription,
    #[error("a due date is required")]
    MissingDueDate,
    #[error("due date {0:?} is not a valid calendar date")]
    InvalidDateFormat(String),
    #[error("no members selected")]
    NoMembersSelected,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Create a one-off charge against an explicit member
/// snapshot. "Apply to all members" has to be expanded by the
/// caller before this call; the stored target set is never
/// re-resolved, so later roster changes leave the charge
/// untouched.
pub async fn create_custom_charge<DB>(
    db: &DB,
    club: &Club,
    description: &str,
    amount: f64,
    due_date: Option<&str>,
    target_user_ids: &[u32],
    created_by: u32,
    now: NaiveDateTime,
) -> Result<Charge, Error>
where
    DB: Insert<Charge> + Send + Sync,
{
    if amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }
    if description.trim().is_empty() {
        return Err(Error::MissingDescription);
    }
    let due_date = due_date.ok_or(Error::MissingDueDate)?;
    let due_date = NaiveDate::parse_from_str(due_date, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDateFormat(due_date.to_string()))?;

    let mut target_user_ids = target_user_ids.to_vec();
    target_user_ids.sort_unstable();
    target_user_ids.dedup();
    if target_user_ids.is_empty() {
        return Err(Error::NoMembersSelected);
    }

    let charge = Charge {
        club_id: club.id,
        kind: ChargeKind::Custom,
        description: description.trim().to_string(),
        amount,
        currency: club.currency.clone(),
        due_date,
        target_user_ids,
        period: None,
        created_by,
        created_at: now,
        ..Default::default()
    };
    let charge = db.insert(charge).await?;

    info!(
        club_id = club.id,
        charge_id = charge.id,
        targets = charge.target_user_ids.len(),
        "created custom charge"
    );
    Ok(charge)
}

#[cfg(test)]
mod tests {
    use tally_memdb::MemDb;

    use super::*;

    fn club() -> Club {
        Club {
            id: 1,
            name: "Test Club".to_string(),
            currency: "EUR".to_string(),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_custom_charge() {
        let db = MemDb::new();
        // "All members" already expanded to the roster ids.
        let roster = [1, 2, 3, 4, 5];
        let charge = create_custom_charge(
            &db,
            &club(),
            "Camp fee",
            50.0,
            Some("2025-12-31"),
            &roster,
            9,
            now(),
        )
        .await
        .unwrap();

        assert!(charge.id > 0);
        assert_eq!(charge.kind, ChargeKind::Custom);
        assert_eq!(charge.amount, 50.0);
        assert_eq!(charge.currency, "EUR");
        assert_eq!(
            charge.due_date,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert_eq!(charge.target_user_ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(charge.period, None);
        for user_id in roster {
            assert!(charge.applies_to(user_id));
        }
    }

    #[tokio::test]
    async fn test_validation_order() {
        let db = MemDb::new();

        // Amount is checked first, even with everything else
        // missing as well.
        let err = create_custom_charge(&db, &club(), "", 0.0, None, &[], 0, now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount));

        let err = create_custom_charge(&db, &club(), "  ", 10.0, None, &[], 0, now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingDescription));

        let err = create_custom_charge(&db, &club(), "Camp fee", 10.0, None, &[], 0, now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingDueDate));

        let err = create_custom_charge(
            &db,
            &club(),
            "Camp fee",
            10.0,
            Some("31.12.2025"),
            &[],
            0,
            now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDateFormat(_)));

        let err = create_custom_charge(
            &db,
            &club(),
            "Camp fee",
            10.0,
            Some("2025-12-31"),
            &[],
            0,
            now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NoMembersSelected));
    }

    #[tokio::test]
    async fn test_negative_amount() {
        let db = MemDb::new();
        let err = create_custom_charge(
            &db,
            &club(),
            "Refund?",
            -5.0,
            Some("2025-12-31"),
            &[1],
            0,
            now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount));
    }

    #[tokio::test]
    async fn test_duplicate_targets_collapse() {
        let db = MemDb::new();
        let charge = create_custom_charge(
            &db,
            &club(),
            "Jersey",
            30.0,
            Some("2025-10-01"),
            &[3, 1, 3, 2],
            0,
            now(),
        )
        .await
        .unwrap();
        assert_eq!(charge.target_user_ids, vec![1, 2, 3]);
    }
}
