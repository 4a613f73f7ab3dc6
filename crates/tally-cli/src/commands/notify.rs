use anyhow::Result;
use chrono::Local;
use clap::Args;

use tally_billing::balances::club_balances;
use tally_billing::notifications::notification_message;
use tally_data::{ClubFeeSettings, Retrieve, StoreError};
use tally_db::Connection;

use crate::roster::load_roster;

#[derive(Args, Debug)]
pub struct Notify {
    #[clap(short, long)]
    pub club_id: u32,
    /// Roster snapshot file (JSON list of members)
    #[clap(short, long)]
    pub roster: String,
    /// Currency used when the club has no fee settings yet
    #[clap(long, default_value = "EUR")]
    pub currency: String,
    /// Only this member
    #[clap(short, long)]
    pub member_id: Option<u32>,
}

impl Notify {
    /// Compose and print the notification text for each
    /// member. Actually delivering it is up to the operator
    /// and whatever channel the club uses.
    pub async fn run(self, db: &Connection) -> Result<()> {
        let today = Local::now().date_naive();
        let members: Vec<_> = load_roster(&self.roster)?
            .into_iter()
            .filter(|member| {
                self.member_id.map_or(true, |id| member.id == id)
            })
            .collect();
        let user_ids: Vec<u32> = members.iter().map(|member| member.id).collect();

        let settings: Result<ClubFeeSettings> = db.retrieve(self.club_id).await;
        let currency = match settings {
            Ok(settings) => settings.currency,
            Err(err)
                if matches!(
                    err.downcast_ref::<StoreError>(),
                    Some(StoreError::NotFound)
                ) =>
            {
                self.currency.clone()
            }
            Err(err) => return Err(err),
        };

        let balances = club_balances(db, self.club_id, &user_ids, today).await?;
        for member in &members {
            if let Some(balance) = balances.get(&member.id) {
                println!("{}", notification_message(&member.name, balance, &currency));
            }
        }
        Ok(())
    }
}
