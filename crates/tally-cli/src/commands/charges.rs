use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use tally_billing::charges::create_custom_charge;
use tally_billing::currency::format_amount;
use tally_data::{Charge, ChargeFilter, Club, Query};
use tally_db::Connection;

use crate::formatting::PrintFormatted;
use crate::roster::load_roster;

#[derive(Subcommand, Debug)]
pub enum Charges {
    /// Create a one-off charge
    #[clap(name = "add")]
    Add(AddCharge),
    /// List charges
    #[clap(name = "list")]
    List(ListCharges),
}

impl Charges {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Charges::Add(cmd) => cmd.run(db).await,
            Charges::List(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddCharge {
    #[clap(short, long)]
    pub club_id: u32,
    #[clap(long, default_value = "EUR")]
    pub currency: String,
    #[clap(short, long)]
    pub description: String,
    #[clap(short, long)]
    pub amount: f64,
    /// Due date, YYYY-MM-DD
    #[clap(long)]
    pub due: Option<String>,
    /// Target member ids, e.g. 3,5,9
    #[clap(short, long, value_delimiter = ',', conflicts_with = "all")]
    pub members: Vec<u32>,
    /// Charge every billable member in the roster file
    #[clap(long, requires = "roster")]
    pub all: bool,
    /// Roster snapshot file, used with --all
    #[clap(short, long)]
    pub roster: Option<String>,
    /// Acting user id, recorded on the charge
    #[clap(long, default_value_t = 0)]
    pub created_by: u32,
}

impl AddCharge {
    pub async fn run(self, db: &Connection) -> Result<()> {
        // "All members" becomes an explicit id snapshot here,
        // before the engine ever sees the charge.
        let targets: Vec<u32> = match (self.all, &self.roster) {
            (true, Some(path)) => load_roster(path)?
                .iter()
                .map(|member| member.id)
                .collect(),
            _ => self.members.clone(),
        };

        let club = Club {
            id: self.club_id,
            currency: self.currency.clone(),
            ..Default::default()
        };
        let charge = create_custom_charge(
            db,
            &club,
            &self.description,
            self.amount,
            self.due.as_deref(),
            &targets,
            self.created_by,
            Local::now().naive_local(),
        )
        .await?;

        println!();
        charge.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListCharges {
    #[clap(short, long)]
    pub club_id: Option<u32>,
    #[clap(short, long)]
    pub member_id: Option<u32>,
    /// Recurring period, e.g. 2025-03
    #[clap(long)]
    pub period: Option<String>,
    #[clap(long)]
    pub due_before: Option<NaiveDate>,
}

impl ListCharges {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = ChargeFilter {
            club_id: self.club_id,
            user_id: self.member_id,
            period: self.period.clone(),
            due_before: self.due_before,
            ..Default::default()
        };

        let charges: Vec<Charge> = db.query(&filter).await?;
        for charge in &charges {
            println!(
                "#{}\t{}\t{}\t{}\t{}",
                charge.id,
                charge.due_date,
                charge.kind.as_str(),
                format_amount(charge.amount, &charge.currency),
                charge.description
            );
        }
        Ok(())
    }
}
