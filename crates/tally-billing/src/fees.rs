use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error as ThisError;
use tracing::info;

use tally_data::{
    period_key, Charge, ChargeFilter, ChargeKind, ClubFeeSettings, Insert, Member,
    Query, SettingsError, StoreError,
};

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("no members to generate fees for")]
    EmptyMemberList,
    #[error("fee settings are inactive or have no active months")]
    NoActiveMonths,
    #[error("invalid fee settings: {0}")]
    InvalidSettings(#[source] SettingsError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Outcome summary of one generation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeeGeneration {
    pub created: usize,
    pub skipped: usize,
}

/// The description on a generated charge.
fn describe(due: NaiveDate) -> String {
    format!("Monthly membership fee for {}", due.format("%B %Y"))
}

/// Generate the recurring monthly charges of one club for a
/// given year: one charge per active month and billable
/// member, due on the first of the month.
///
/// Safe to re-run with the same arguments: a member/month
/// combination that already has a recurring charge is
/// skipped, whether it shows up in the pre-check or loses a
/// race against a concurrent generator at insert time. The
/// store's unique constraint on (club, member, period) is the
/// authority; a violation means "already generated", never an
/// error.
pub async fn generate_monthly_fees<DB>(
    db: &DB,
    settings: &ClubFeeSettings,
    members: &[Member],
    year: i32,
    created_by: u32,
    now: NaiveDateTime,
) -> Result<FeeGeneration, Error>
where
    DB: Insert<Charge> + Query<Charge, Filter = ChargeFilter> + Send + Sync,
{
    if members.is_empty() {
        return Err(Error::EmptyMemberList);
    }
    if !settings.is_active || settings.active_months.is_empty() {
        return Err(Error::NoActiveMonths);
    }
    settings.validate().map_err(Error::InvalidSettings)?;

    // One read for everything the club already has. Existing
    // member/period pairs are skipped without an insert; the
    // unique constraint catches whatever is created after
    // this snapshot.
    let existing: Vec<Charge> = db
        .query(&ChargeFilter {
            club_id: Some(settings.club_id),
            kind: Some(ChargeKind::Recurring),
            ..Default::default()
        })
        .await?;
    let mut generated: HashSet<(u32, String)> = HashSet::new();
    for charge in &existing {
        if let Some(period) = &charge.period {
            for user_id in &charge.target_user_ids {
                generated.insert((*user_id, period.clone()));
            }
        }
    }

    let mut summary = FeeGeneration::default();
    for &month in &settings.active_months {
        // Validated months always form a real date.
        let due = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(Error::InvalidSettings(SettingsError::MonthOutOfRange(month)))?;
        let period = period_key(year, month);

        for member in members {
            if !member.is_billable() {
                continue;
            }
            if generated.contains(&(member.id, period.clone())) {
                summary.skipped += 1;
                continue;
            }

            let charge = Charge {
                club_id: settings.club_id,
                kind: ChargeKind::Recurring,
                description: describe(due),
                amount: settings.monthly_amount,
                currency: settings.currency.clone(),
                due_date: due,
                target_user_ids: vec![member.id],
                period: Some(period.clone()),
                created_by,
                created_at: now,
                ..Default::default()
            };
            match db.insert(charge).await {
                Ok(_) => summary.created += 1,
                Err(err) => {
                    // A concurrent generator got there first.
                    if matches!(
                        err.downcast_ref::<StoreError>(),
                        Some(StoreError::DuplicateCharge)
                    ) {
                        summary.skipped += 1;
                    } else {
                        return Err(Error::Storage(err));
                    }
                }
            }
        }
    }

    info!(
        club_id = settings.club_id,
        year,
        created = summary.created,
        skipped = summary.skipped,
        "generated monthly fees"
    );
    Ok(summary)
}
