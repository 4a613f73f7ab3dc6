use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, QueryBuilder};

use tally_data::{Insert, Payment, PaymentFilter, Query, Retrieve, StoreError};

use crate::{results::Id, Connection};

/// Query payments on an already locked connection.
pub(crate) async fn query_payments(
    conn: &mut SqliteConnection,
    filter: &PaymentFilter,
) -> Result<Vec<Payment>> {
    let mut qry = QueryBuilder::new(
        r#"
        SELECT
            id,
            user_id,
            charge_id,
            ROUND(amount, 10) AS amount,
            paid_at
        FROM payments
        WHERE 1
        "#,
    );

    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(user_id) = filter.user_id {
        qry.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(charge_id) = filter.charge_id {
        qry.push(" AND charge_id = ").push_bind(charge_id);
    }
    qry.push(" ORDER BY paid_at, id");

    let payments: Vec<Payment> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(payments)
}

/// Payments of a member set, on an already locked connection.
pub(crate) async fn query_payments_for_users(
    conn: &mut SqliteConnection,
    user_ids: &[u32],
) -> Result<Vec<Payment>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qry = QueryBuilder::new(
        r#"
        SELECT
            id,
            user_id,
            charge_id,
            ROUND(amount, 10) AS amount,
            paid_at
        FROM payments
        WHERE user_id IN (
        "#,
    );
    let mut ids = qry.separated(", ");
    for id in user_ids {
        ids.push_bind(*id);
    }
    qry.push(") ORDER BY paid_at, id");

    let payments: Vec<Payment> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(payments)
}

#[async_trait]
impl Query<Payment> for Connection {
    type Filter = PaymentFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Payment>> {
        let mut conn = self.lock().await;
        query_payments(&mut conn, filter).await
    }
}

#[async_trait]
impl Retrieve<Payment> for Connection {
    type Key = u32;

    async fn retrieve(&self, payment_id: Self::Key) -> Result<Payment> {
        let filter = PaymentFilter {
            id: Some(payment_id),
            ..Default::default()
        };
        let payment = self.query(&filter).await?.pop().ok_or(StoreError::NotFound)?;
        Ok(payment)
    }
}

#[async_trait]
impl Insert<Payment> for Connection {
    /// Record a payment. Payments are append-only; there is
    /// no update or delete.
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            sqlx::query_as(
                r#"
                INSERT INTO payments (user_id, charge_id, amount, paid_at)
                VALUES (?, ?, ?, ?)
                RETURNING id
                "#,
            )
            .bind(payment.user_id)
            .bind(payment.charge_id)
            .bind(payment.amount)
            .bind(payment.paid_at)
            .fetch_one(&mut *conn)
            .await?
        };
        self.retrieve(insert.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use tally_data::Charge;

    use crate::connection;

    #[tokio::test]
    async fn test_payment_insert() {
        let (_handle, db) = connection::open_test().await;
        let payment = Payment {
            user_id: 7,
            charge_id: None,
            amount: 23.0,
            paid_at: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            ..Default::default()
        };
        let payment = db.insert(payment).await.unwrap();
        assert!(payment.id > 0);
        assert_eq!(payment.user_id, 7);
        assert_eq!(payment.charge_id, None);
        assert_eq!(payment.amount, 23.0);
    }

    #[tokio::test]
    async fn test_payment_query_filter() {
        let (_handle, db) = connection::open_test().await;
        let charge = db
            .insert(Charge {
                club_id: 1,
                description: "Camp fee".to_string(),
                amount: 20.0,
                currency: "EUR".to_string(),
                due_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
                target_user_ids: vec![2],
                ..Default::default()
            })
            .await
            .unwrap();

        db.insert(Payment {
            user_id: 1,
            amount: 10.0,
            paid_at: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(Payment {
            user_id: 2,
            charge_id: Some(charge.id),
            amount: 20.0,
            paid_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();

        let payments: Vec<Payment> = db
            .query(&PaymentFilter {
                user_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, 10.0);

        let payments: Vec<Payment> = db
            .query(&PaymentFilter {
                charge_id: Some(charge.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].user_id, 2);

        let payments: Vec<Payment> = db
            .query(&PaymentFilter::default())
            .await
            .unwrap();
        // Ordered by payment date.
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].user_id, 2);
    }
}
