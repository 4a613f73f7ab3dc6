use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{sqlite::SqliteConnection, Connection as SqlConnection, FromRow, QueryBuilder};

use tally_data::{Charge, ChargeFilter, Insert, Query, Retrieve, StoreError};

use crate::{
    results::{is_unique_violation, Id},
    Connection,
};

#[derive(Debug, FromRow)]
struct ChargeRow {
    id: u32,
    club_id: u32,
    kind: String,
    description: String,
    amount: f64,
    currency: String,
    due_date: NaiveDate,
    period: Option<String>,
    created_by: u32,
    created_at: NaiveDateTime,
}

impl ChargeRow {
    fn into_charge(self, target_user_ids: Vec<u32>) -> Result<Charge> {
        Ok(Charge {
            id: self.id,
            club_id: self.club_id,
            kind: self.kind.parse()?,
            description: self.description,
            amount: self.amount,
            currency: self.currency,
            due_date: self.due_date,
            target_user_ids,
            period: self.period,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TargetRow {
    charge_id: u32,
    user_id: u32,
}

/// Fetch the target sets of the given charges, keyed by
/// charge id.
async fn fetch_targets(
    conn: &mut SqliteConnection,
    charge_ids: &[u32],
) -> Result<HashMap<u32, Vec<u32>>> {
    if charge_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut qry = QueryBuilder::new(
        "SELECT charge_id, user_id FROM charge_targets WHERE charge_id IN (",
    );
    let mut ids = qry.separated(", ");
    for id in charge_ids {
        ids.push_bind(*id);
    }
    qry.push(") ORDER BY charge_id, user_id");

    let rows: Vec<TargetRow> = qry.build_query_as().fetch_all(&mut *conn).await?;
    let mut targets: HashMap<u32, Vec<u32>> = HashMap::new();
    for row in rows {
        targets.entry(row.charge_id).or_default().push(row.user_id);
    }
    Ok(targets)
}

/// Query charges on an already locked connection. The ledger
/// fetch reuses this to read charges and payments under one
/// lock.
pub(crate) async fn query_charges(
    conn: &mut SqliteConnection,
    filter: &ChargeFilter,
) -> Result<Vec<Charge>> {
    let mut qry = QueryBuilder::new(
        r#"
        SELECT
            id,
            club_id,
            kind,
            description,
            ROUND(amount, 10) AS amount,
            currency,
            due_date,
            period,
            created_by,
            created_at
        FROM charges
        WHERE 1
        "#,
    );

    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(club_id) = filter.club_id {
        qry.push(" AND club_id = ").push_bind(club_id);
    }
    if let Some(kind) = filter.kind {
        qry.push(" AND kind = ").push_bind(kind.as_str());
    }
    if let Some(period) = filter.period.clone() {
        qry.push(" AND period = ").push_bind(period);
    }
    if let Some(due_before) = filter.due_before {
        qry.push(" AND due_date < ").push_bind(due_before);
    }
    if let Some(user_id) = filter.user_id {
        qry.push(" AND id IN (SELECT charge_id FROM charge_targets WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }
    qry.push(" ORDER BY due_date, id");

    let rows: Vec<ChargeRow> = qry.build_query_as().fetch_all(&mut *conn).await?;

    let charge_ids: Vec<u32> = rows.iter().map(|row| row.id).collect();
    let mut targets = fetch_targets(conn, &charge_ids).await?;

    let mut charges = Vec::with_capacity(rows.len());
    for row in rows {
        let target_user_ids = targets.remove(&row.id).unwrap_or_default();
        charges.push(row.into_charge(target_user_ids)?);
    }
    Ok(charges)
}

#[async_trait]
impl Query<Charge> for Connection {
    type Filter = ChargeFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Charge>> {
        let mut conn = self.lock().await;
        query_charges(&mut conn, filter).await
    }
}

#[async_trait]
impl Retrieve<Charge> for Connection {
    type Key = u32;

    async fn retrieve(&self, charge_id: Self::Key) -> Result<Charge> {
        let filter = ChargeFilter {
            id: Some(charge_id),
            ..Default::default()
        };
        let charge = self.query(&filter).await?.pop().ok_or(StoreError::NotFound)?;
        Ok(charge)
    }
}

#[async_trait]
impl Insert<Charge> for Connection {
    /// Insert a charge together with its target snapshot as
    /// one unit. A violation of the recurring-period unique
    /// index maps to `StoreError::DuplicateCharge`; nothing
    /// of the charge remains in that case.
    async fn insert(&self, charge: Charge) -> Result<Charge> {
        let mut target_user_ids = charge.target_user_ids.clone();
        target_user_ids.sort_unstable();
        target_user_ids.dedup();

        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut tx = conn.begin().await?;

            let id: Id<u32> = sqlx::query_as(
                r#"
                INSERT INTO charges (
                    club_id,
                    kind,
                    description,
                    amount,
                    currency,
                    due_date,
                    period,
                    created_by,
                    created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING id
                "#,
            )
            .bind(charge.club_id)
            .bind(charge.kind.as_str())
            .bind(&charge.description)
            .bind(charge.amount)
            .bind(&charge.currency)
            .bind(charge.due_date)
            .bind(charge.period.clone())
            .bind(charge.created_by)
            .bind(charge.created_at)
            .fetch_one(&mut *tx)
            .await?;

            for user_id in &target_user_ids {
                let result = sqlx::query(
                    r#"
                    INSERT INTO charge_targets (charge_id, club_id, user_id, period)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(id.id)
                .bind(charge.club_id)
                .bind(*user_id)
                .bind(charge.period.clone())
                .execute(&mut *tx)
                .await;

                if let Err(err) = result {
                    // Dropping the transaction rolls the
                    // charge row back as well.
                    if is_unique_violation(&err) {
                        return Err(StoreError::DuplicateCharge.into());
                    }
                    return Err(err.into());
                }
            }

            tx.commit().await?;
            id
        };
        self.retrieve(insert.id).await
    }
}
