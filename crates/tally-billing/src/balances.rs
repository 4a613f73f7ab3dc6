use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;

use tally_data::{
    Charge, ChargeFilter, ClubLedger, FetchClubLedger, MemberBalance, Payment,
    PaymentFilter, Query,
};

use crate::currency::round_cents;

/// Reduce one member's charges and payments to a balance
/// snapshot.
///
/// Attribution order: a payment linked to a charge settles
/// that charge first; whatever credit is left over (unlinked
/// payments plus linked overpayment) settles the remaining
/// charges oldest-due-first, ties broken by charge id.
/// `overdue` is the still unpaid portion of charges due
/// before `today` under that order. The same order backs
/// every figure, so `balance` and `overdue` always agree on
/// which payments exist.
pub fn member_balance(
    user_id: u32,
    charges: &[Charge],
    payments: &[Payment],
    today: NaiveDate,
) -> MemberBalance {
    let mut owed: Vec<(&Charge, f64)> = charges
        .iter()
        .filter(|charge| charge.applies_to(user_id))
        .map(|charge| (charge, charge.amount))
        .collect();
    owed.sort_by_key(|(charge, _)| (charge.due_date, charge.id));

    let payments: Vec<&Payment> = payments
        .iter()
        .filter(|payment| payment.user_id == user_id)
        .collect();

    let total_owed: f64 = owed.iter().map(|(charge, _)| charge.amount).sum();
    let total_paid: f64 = payments.iter().map(|payment| payment.amount).sum();

    // Linked payments first.
    let mut credit = 0.0;
    for payment in &payments {
        match payment.charge_id {
            Some(charge_id) => {
                let mut remainder = payment.amount;
                if let Some((_, remaining)) =
                    owed.iter_mut().find(|(charge, _)| charge.id == charge_id)
                {
                    let applied = remainder.min(*remaining);
                    *remaining -= applied;
                    remainder -= applied;
                }
                // Overpayment, or a link to somebody else's
                // charge, becomes general credit.
                credit += remainder;
            }
            None => credit += payment.amount,
        }
    }

    // Remaining credit settles charges oldest-due-first.
    for (_, remaining) in owed.iter_mut() {
        if credit <= 0.0 {
            break;
        }
        let applied = credit.min(*remaining);
        *remaining -= applied;
        credit -= applied;
    }

    let overdue: f64 = owed
        .iter()
        .filter(|(charge, _)| charge.due_date < today)
        .map(|(_, remaining)| *remaining)
        .sum();

    MemberBalance {
        user_id,
        total_owed: round_cents(total_owed),
        total_paid: round_cents(total_paid),
        overdue: round_cents(overdue),
        balance: round_cents(total_paid - total_owed),
    }
}

/// Balance of a single member, read through the store.
pub async fn member_balance_for<DB>(
    db: &DB,
    user_id: u32,
    today: NaiveDate,
) -> Result<MemberBalance>
where
    DB: Query<Charge, Filter = ChargeFilter>
        + Query<Payment, Filter = PaymentFilter>
        + Send
        + Sync,
{
    let charges: Vec<Charge> = db
        .query(&ChargeFilter {
            user_id: Some(user_id),
            ..Default::default()
        })
        .await?;
    let payments: Vec<Payment> = db
        .query(&PaymentFilter {
            user_id: Some(user_id),
            ..Default::default()
        })
        .await?;
    Ok(member_balance(user_id, &charges, &payments, today))
}

/// Balances for many members at once. One ledger snapshot is
/// fetched and partitioned per member, so the result is
/// consistent across members and identical to per-member
/// computation over the same snapshot.
pub async fn club_balances<DB>(
    db: &DB,
    club_id: u32,
    user_ids: &[u32],
    today: NaiveDate,
) -> Result<HashMap<u32, MemberBalance>>
where
    DB: FetchClubLedger + Send + Sync,
{
    let ClubLedger { charges, payments } =
        db.fetch_club_ledger(club_id, user_ids).await?;

    let mut balances = HashMap::with_capacity(user_ids.len());
    for &user_id in user_ids {
        balances.insert(
            user_id,
            member_balance(user_id, &charges, &payments, today),
        );
    }
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use tally_data::{ChargeKind, Insert};
    use tally_memdb::MemDb;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn charge(id: u32, amount: f64, due: NaiveDate) -> Charge {
        Charge {
            id,
            club_id: 1,
            kind: ChargeKind::Custom,
            description: format!("Charge {}", id),
            amount,
            currency: "EUR".to_string(),
            due_date: due,
            target_user_ids: vec![7],
            ..Default::default()
        }
    }

    fn payment(amount: f64, charge_id: Option<u32>, paid_at: NaiveDate) -> Payment {
        Payment {
            user_id: 7,
            charge_id,
            amount,
            paid_at,
            ..Default::default()
        }
    }

    #[test]
    fn test_balance_identity() {
        let today = date(2025, 6, 15);
        let charges = vec![
            charge(1, 30.0, date(2025, 5, 1)),
            charge(2, 20.0, date(2025, 7, 1)),
        ];
        let payments = vec![payment(15.0, None, date(2025, 5, 10))];

        let balance = member_balance(7, &charges, &payments, today);
        assert_eq!(balance.total_owed, 50.0);
        assert_eq!(balance.total_paid, 15.0);
        assert_eq!(balance.balance, balance.total_paid - balance.total_owed);
        assert_eq!(balance.balance, -35.0);
    }

    #[test]
    fn test_overdue_by_due_date() {
        let today = date(2025, 6, 15);
        // Due yesterday, unpaid: full amount is overdue.
        let charges = vec![charge(1, 30.0, date(2025, 6, 14))];
        let balance = member_balance(7, &charges, &[], today);
        assert_eq!(balance.overdue, 30.0);

        // Due tomorrow: nothing is overdue, paid or not.
        let charges = vec![charge(1, 30.0, date(2025, 6, 16))];
        let balance = member_balance(7, &charges, &[], today);
        assert_eq!(balance.overdue, 0.0);
        assert_eq!(balance.balance, -30.0);
    }

    #[test]
    fn test_linked_payment_settles_its_charge() {
        let today = date(2025, 6, 15);
        let charges = vec![
            charge(1, 30.0, date(2025, 5, 1)),
            charge(2, 20.0, date(2025, 6, 1)),
        ];
        // Pays the newer charge explicitly; the older one
        // stays fully overdue.
        let payments = vec![payment(20.0, Some(2), date(2025, 6, 2))];
        let balance = member_balance(7, &charges, &payments, today);
        assert_eq!(balance.overdue, 30.0);
        assert_eq!(balance.balance, -30.0);
    }

    #[test]
    fn test_unlinked_payment_applies_oldest_first() {
        let today = date(2025, 6, 15);
        let charges = vec![
            charge(1, 30.0, date(2025, 5, 1)),
            charge(2, 20.0, date(2025, 6, 1)),
        ];
        let payments = vec![payment(35.0, None, date(2025, 6, 2))];
        // 30.00 settles the May charge, 5.00 goes into June:
        // 15.00 of June is still overdue.
        let balance = member_balance(7, &charges, &payments, today);
        assert_eq!(balance.overdue, 15.0);
        assert_eq!(balance.balance, -15.0);
    }

    #[test]
    fn test_linked_overpayment_spills_over() {
        let today = date(2025, 6, 15);
        let charges = vec![
            charge(1, 30.0, date(2025, 5, 1)),
            charge(2, 20.0, date(2025, 6, 1)),
        ];
        let payments = vec![payment(45.0, Some(2), date(2025, 6, 2))];
        // 20.00 settles charge 2, the 25.00 rest reduces
        // charge 1 to 5.00 overdue.
        let balance = member_balance(7, &charges, &payments, today);
        assert_eq!(balance.overdue, 5.0);
        assert_eq!(balance.balance, -5.0);
    }

    #[test]
    fn test_settled_member() {
        let today = date(2025, 6, 15);
        let charges = vec![charge(1, 30.0, date(2025, 5, 1))];
        let payments = vec![payment(30.0, Some(1), date(2025, 5, 3))];
        let balance = member_balance(7, &charges, &payments, today);
        assert_eq!(balance.overdue, 0.0);
        assert_eq!(balance.balance, 0.0);

        // Credit beyond the owed total shows up as positive.
        let payments = vec![payment(40.0, None, date(2025, 5, 3))];
        let balance = member_balance(7, &charges, &payments, today);
        assert_eq!(balance.balance, 10.0);
    }

    #[test]
    fn test_charges_for_other_members_ignored() {
        let today = date(2025, 6, 15);
        let mut other = charge(1, 99.0, date(2025, 5, 1));
        other.target_user_ids = vec![8];
        let charges = vec![other, charge(2, 10.0, date(2025, 5, 1))];
        let balance = member_balance(7, &charges, &[], today);
        assert_eq!(balance.total_owed, 10.0);
    }

    #[tokio::test]
    async fn test_batch_matches_sequential() {
        let db = MemDb::new();
        let today = date(2025, 6, 15);
        let user_ids = [1, 2, 3];

        db.insert(Charge {
            club_id: 1,
            description: "Camp fee".to_string(),
            amount: 50.0,
            currency: "EUR".to_string(),
            due_date: date(2025, 5, 1),
            target_user_ids: vec![1, 2, 3],
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(Charge {
            club_id: 1,
            description: "Jersey".to_string(),
            amount: 30.0,
            currency: "EUR".to_string(),
            due_date: date(2025, 7, 1),
            target_user_ids: vec![2],
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(Payment {
            user_id: 1,
            amount: 50.0,
            paid_at: date(2025, 5, 2),
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(Payment {
            user_id: 2,
            amount: 20.0,
            paid_at: date(2025, 5, 2),
            ..Default::default()
        })
        .await
        .unwrap();

        let batch = club_balances(&db, 1, &user_ids, today).await.unwrap();
        assert_eq!(batch.len(), 3);

        for user_id in user_ids {
            let single = member_balance_for(&db, user_id, today).await.unwrap();
            assert_eq!(batch[&user_id], single);
        }

        assert_eq!(batch[&1].balance, 0.0);
        assert_eq!(batch[&2].balance, -60.0);
        assert_eq!(batch[&2].overdue, 30.0);
        assert_eq!(batch[&3].balance, -50.0);
        assert_eq!(batch[&3].overdue, 50.0);
    }
}
