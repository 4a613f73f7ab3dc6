//! In-memory store, the mock counterpart of `tally-db`.
//!
//! Implements the same operation traits over a mutex guarded
//! state struct, so engine code and tests can run without a
//! database file. Which store a process uses is decided once
//! at startup by whoever constructs it.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use tally_data::{
    Charge, ChargeFilter, ClubFeeSettings, ClubLedger, FetchClubLedger, Insert,
    Payment, PaymentFilter, Query, Retrieve, StoreError,
};

#[derive(Debug, Default)]
struct MemState {
    settings: HashMap<u32, ClubFeeSettings>,
    charges: Vec<Charge>,
    payments: Vec<Payment>,
    next_charge_id: u32,
    next_payment_id: u32,
}

#[derive(Debug, Default, Clone)]
pub struct MemDb {
    state: Arc<Mutex<MemState>>,
}

impl MemDb {
    pub fn new() -> Self {
        Self::default()
    }
}

fn charge_matches(filter: &ChargeFilter, charge: &Charge) -> bool {
    if let Some(id) = filter.id {
        if charge.id != id {
            return false;
        }
    }
    if let Some(club_id) = filter.club_id {
        if charge.club_id != club_id {
            return false;
        }
    }
    if let Some(kind) = filter.kind {
        if charge.kind != kind {
            return false;
        }
    }
    if let Some(period) = &filter.period {
        if charge.period.as_deref() != Some(period.as_str()) {
            return false;
        }
    }
    if let Some(due_before) = filter.due_before {
        if charge.due_date >= due_before {
            return false;
        }
    }
    if let Some(user_id) = filter.user_id {
        if !charge.applies_to(user_id) {
            return false;
        }
    }
    true
}

fn payment_matches(filter: &PaymentFilter, payment: &Payment) -> bool {
    if let Some(id) = filter.id {
        if payment.id != id {
            return false;
        }
    }
    if let Some(user_id) = filter.user_id {
        if payment.user_id != user_id {
            return false;
        }
    }
    if let Some(charge_id) = filter.charge_id {
        if payment.charge_id != Some(charge_id) {
            return false;
        }
    }
    true
}

#[async_trait]
impl Retrieve<ClubFeeSettings> for MemDb {
    type Key = u32;

    async fn retrieve(&self, club_id: Self::Key) -> Result<ClubFeeSettings> {
        let state = self.state.lock().await;
        let settings = state.settings.get(&club_id).ok_or(StoreError::NotFound)?;
        Ok(settings.clone())
    }
}

#[async_trait]
impl Insert<ClubFeeSettings> for MemDb {
    /// Validated upsert, replacing any previous settings.
    async fn insert(&self, settings: ClubFeeSettings) -> Result<ClubFeeSettings> {
        settings.validate()?;
        let mut state = self.state.lock().await;
        state.settings.insert(settings.club_id, settings.clone());
        Ok(settings)
    }
}

#[async_trait]
impl Query<Charge> for MemDb {
    type Filter = ChargeFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Charge>> {
        let state = self.state.lock().await;
        let mut charges: Vec<Charge> = state
            .charges
            .iter()
            .filter(|charge| charge_matches(filter, charge))
            .cloned()
            .collect();
        charges.sort_by_key(|charge| (charge.due_date, charge.id));
        Ok(charges)
    }
}

#[async_trait]
impl Retrieve<Charge> for MemDb {
    type Key = u32;

    async fn retrieve(&self, charge_id: Self::Key) -> Result<Charge> {
        let state = self.state.lock().await;
        let charge = state
            .charges
            .iter()
            .find(|charge| charge.id == charge_id)
            .ok_or(StoreError::NotFound)?;
        Ok(charge.clone())
    }
}

#[async_trait]
impl Insert<Charge> for MemDb {
    /// Insert a charge, enforcing the same uniqueness rule as
    /// the SQLite store: at most one recurring charge per
    /// member and period.
    async fn insert(&self, charge: Charge) -> Result<Charge> {
        let mut state = self.state.lock().await;

        let mut charge = charge;
        charge.target_user_ids.sort_unstable();
        charge.target_user_ids.dedup();

        if let Some(period) = &charge.period {
            for existing in &state.charges {
                if existing.club_id != charge.club_id {
                    continue;
                }
                if existing.period.as_deref() != Some(period.as_str()) {
                    continue;
                }
                if existing
                    .target_user_ids
                    .iter()
                    .any(|id| charge.target_user_ids.contains(id))
                {
                    return Err(StoreError::DuplicateCharge.into());
                }
            }
        }

        state.next_charge_id += 1;
        charge.id = state.next_charge_id;
        state.charges.push(charge.clone());
        Ok(charge)
    }
}

#[async_trait]
impl Query<Payment> for MemDb {
    type Filter = PaymentFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Payment>> {
        let state = self.state.lock().await;
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|payment| payment_matches(filter, payment))
            .cloned()
            .collect();
        payments.sort_by_key(|payment| (payment.paid_at, payment.id));
        Ok(payments)
    }
}

#[async_trait]
impl Retrieve<Payment> for MemDb {
    type Key = u32;

    async fn retrieve(&self, payment_id: Self::Key) -> Result<Payment> {
        let state = self.state.lock().await;
        let payment = state
            .payments
            .iter()
            .find(|payment| payment.id == payment_id)
            .ok_or(StoreError::NotFound)?;
        Ok(payment.clone())
    }
}

#[async_trait]
impl Insert<Payment> for MemDb {
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        let mut state = self.state.lock().await;
        let mut payment = payment;
        state.next_payment_id += 1;
        payment.id = state.next_payment_id;
        state.payments.push(payment.clone());
        Ok(payment)
    }
}

#[async_trait]
impl FetchClubLedger for MemDb {
    /// Both result sets come out of one held lock, matching
    /// the snapshot behavior of the SQLite store.
    async fn fetch_club_ledger(
        &self,
        club_id: u32,
        user_ids: &[u32],
    ) -> Result<ClubLedger> {
        let state = self.state.lock().await;
        let charges: Vec<Charge> = state
            .charges
            .iter()
            .filter(|charge| charge.club_id == club_id)
            .cloned()
            .collect();
        let payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|payment| user_ids.contains(&payment.user_id))
            .cloned()
            .collect();
        Ok(ClubLedger { charges, payments })
    }
}
