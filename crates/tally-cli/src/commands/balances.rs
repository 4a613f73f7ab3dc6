use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};

use tally_billing::balances::{club_balances, member_balance_for};
use tally_db::Connection;

use crate::formatting::PrintFormatted;
use crate::roster::load_roster;

#[derive(Subcommand, Debug)]
pub enum Balances {
    /// Balance of a single member
    #[clap(name = "show")]
    Show(ShowBalance),
    /// Balances for every member in a roster
    #[clap(name = "list")]
    List(ListBalances),
}

impl Balances {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Balances::Show(cmd) => cmd.run(db).await,
            Balances::List(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowBalance {
    #[clap(short, long)]
    pub member_id: u32,
}

impl ShowBalance {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let today = Local::now().date_naive();
        let balance = member_balance_for(db, self.member_id, today).await?;
        println!();
        balance.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListBalances {
    #[clap(short, long)]
    pub club_id: u32,
    /// Roster snapshot file (JSON list of members)
    #[clap(short, long)]
    pub roster: String,
}

impl ListBalances {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let today = Local::now().date_naive();
        let members = load_roster(&self.roster)?;
        let user_ids: Vec<u32> = members.iter().map(|member| member.id).collect();

        let balances = club_balances(db, self.club_id, &user_ids, today).await?;
        for member in &members {
            if let Some(balance) = balances.get(&member.id) {
                println!(
                    "{}\t{}\towed {:.2}\tpaid {:.2}\toverdue {:.2}\tbalance {:.2}",
                    member.id,
                    member.name,
                    balance.total_owed,
                    balance.total_paid,
                    balance.overdue,
                    balance.balance
                );
            }
        }
        Ok(())
    }
}
