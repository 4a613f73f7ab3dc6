use anyhow::Result;
use async_trait::async_trait;
use sqlx::FromRow;

use tally_data::{ClubFeeSettings, Insert, Retrieve, StoreError};

use crate::Connection;

#[derive(Debug, FromRow)]
struct SettingsRow {
    club_id: u32,
    monthly_amount: f64,
    currency: String,
    active_months: String,
    is_active: bool,
}

impl SettingsRow {
    fn into_settings(self) -> Result<ClubFeeSettings> {
        Ok(ClubFeeSettings {
            club_id: self.club_id,
            monthly_amount: self.monthly_amount,
            currency: self.currency,
            active_months: serde_json::from_str(&self.active_months)?,
            is_active: self.is_active,
        })
    }
}

#[async_trait]
impl Retrieve<ClubFeeSettings> for Connection {
    type Key = u32;

    /// Fetch the fee settings of a club.
    async fn retrieve(&self, club_id: Self::Key) -> Result<ClubFeeSettings> {
        let mut conn = self.lock().await;
        let row: Option<SettingsRow> = sqlx::query_as(
            r#"
            SELECT
                club_id,
                ROUND(monthly_amount, 10) AS monthly_amount,
                currency,
                active_months,
                is_active
            FROM fee_settings
            WHERE club_id = ?
            "#,
        )
        .bind(club_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.ok_or(StoreError::NotFound)?.into_settings()
    }
}

#[async_trait]
impl Insert<ClubFeeSettings> for Connection {
    /// Persist the full settings object for a club, creating
    /// it on first write and replacing it afterwards.
    async fn insert(&self, settings: ClubFeeSettings) -> Result<ClubFeeSettings> {
        settings.validate()?;
        let months = serde_json::to_string(&settings.active_months)?;
        {
            let mut conn = self.lock().await;
            sqlx::query(
                r#"
                INSERT INTO fee_settings (
                    club_id,
                    monthly_amount,
                    currency,
                    active_months,
                    is_active
                ) VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (club_id) DO UPDATE SET
                    monthly_amount = excluded.monthly_amount,
                    currency = excluded.currency,
                    active_months = excluded.active_months,
                    is_active = excluded.is_active
                "#,
            )
            .bind(settings.club_id)
            .bind(settings.monthly_amount)
            .bind(&settings.currency)
            .bind(&months)
            .bind(settings.is_active)
            .execute(&mut *conn)
            .await?;
        }
        self.retrieve(settings.club_id).await
    }
}
