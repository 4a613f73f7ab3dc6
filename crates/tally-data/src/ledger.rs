use anyhow::Result;
use async_trait::async_trait;

use crate::{Charge, Payment};

/// One consistent snapshot of a club's financial records.
#[derive(Debug, Default, Clone)]
pub struct ClubLedger {
    pub charges: Vec<Charge>,
    pub payments: Vec<Payment>,
}

/// Batched read used by balance aggregation: all charges of a
/// club plus all payments of the given members, fetched in a
/// single pass over the store.
#[async_trait]
pub trait FetchClubLedger {
    async fn fetch_club_ledger(
        &self,
        club_id: u32,
        user_ids: &[u32],
    ) -> Result<ClubLedger>;
}
