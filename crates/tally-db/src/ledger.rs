use anyhow::Result;
use async_trait::async_trait;

use tally_data::{ChargeFilter, ClubLedger, FetchClubLedger};

use crate::{charges, payments, Connection};

#[async_trait]
impl FetchClubLedger for Connection {
    /// Read the club's charges and the members' payments
    /// while holding the connection for the whole read, so
    /// the two result sets form one snapshot.
    async fn fetch_club_ledger(
        &self,
        club_id: u32,
        user_ids: &[u32],
    ) -> Result<ClubLedger> {
        let mut conn = self.lock().await;

        let filter = ChargeFilter {
            club_id: Some(club_id),
            ..Default::default()
        };
        let charges = charges::query_charges(&mut conn, &filter).await?;
        let payments = payments::query_payments_for_users(&mut conn, user_ids).await?;

        Ok(ClubLedger { charges, payments })
    }
}
