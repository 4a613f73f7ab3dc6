use anyhow::Result;
use chrono::{Datelike, Local};
use clap::{Args, Subcommand};
use inquire::Confirm;

use tally_billing::fees::generate_monthly_fees;
use tally_data::{ClubFeeSettings, Insert, Retrieve};
use tally_db::Connection;

use crate::formatting::PrintFormatted;
use crate::roster::load_roster;

#[derive(Subcommand, Debug)]
pub enum Fees {
    /// Show the fee settings of a club
    #[clap(name = "show")]
    Show(ShowFees),
    /// Create or replace the fee settings of a club
    #[clap(name = "set")]
    Set(SetFees),
    /// Generate the recurring charges for a year
    #[clap(name = "generate")]
    Generate(GenerateFees),
}

impl Fees {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Fees::Show(cmd) => cmd.run(db).await,
            Fees::Set(cmd) => cmd.run(db).await,
            Fees::Generate(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowFees {
    #[clap(short, long)]
    pub club_id: u32,
}

impl ShowFees {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let settings: ClubFeeSettings = db.retrieve(self.club_id).await?;
        println!();
        settings.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SetFees {
    #[clap(short, long)]
    pub club_id: u32,
    /// Monthly fee amount
    #[clap(short, long)]
    pub amount: f64,
    #[clap(long, default_value = "EUR")]
    pub currency: String,
    /// Billed months, e.g. 1,2,3,9,10
    #[clap(short, long, value_delimiter = ',')]
    pub months: Vec<u32>,
    /// Keep the settings but pause billing
    #[clap(long)]
    pub inactive: bool,
}

impl SetFees {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let settings = ClubFeeSettings {
            club_id: self.club_id,
            monthly_amount: self.amount,
            currency: self.currency,
            active_months: self.months,
            is_active: !self.inactive,
        };
        let settings = db.insert(settings).await?;
        println!();
        settings.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct GenerateFees {
    #[clap(short, long)]
    pub club_id: u32,
    /// Roster snapshot file (JSON list of members)
    #[clap(short, long)]
    pub roster: String,
    #[clap(short, long, default_value_t = Local::now().year())]
    pub year: i32,
    /// Acting user id, recorded on the created charges
    #[clap(long, default_value_t = 0)]
    pub created_by: u32,
}

impl GenerateFees {
    /// Run the fee generation for one club and year.
    pub async fn run(self, db: &Connection) -> Result<()> {
        let settings: ClubFeeSettings = db.retrieve(self.club_id).await?;
        let members = load_roster(&self.roster)?;

        let ok = Confirm::new(&format!(
            "Generate fees for {} months and {} members in {}?",
            settings.active_months.len(),
            members.len(),
            self.year
        ))
        .prompt()?;
        if !ok {
            return Ok(());
        }

        let summary = generate_monthly_fees(
            db,
            &settings,
            &members,
            self.year,
            self.created_by,
            Local::now().naive_local(),
        )
        .await?;
        println!(
            "created {} charges, skipped {} already generated",
            summary.created, summary.skipped
        );
        Ok(())
    }
}
