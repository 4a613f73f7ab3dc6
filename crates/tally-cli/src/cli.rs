use clap::{Parser, Subcommand};

use crate::commands::{Balances, Charges, Fees, Notify, Payments};

#[derive(Parser, Debug)]
#[clap(name = "tally", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// SQLite database with the billing records
    #[clap(long, env = "TALLY_DB", default_value = "tally.sqlite3")]
    pub db: String,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recurring fee settings and generation
    #[clap(subcommand)]
    Fees(Fees),
    /// One-off charges
    #[clap(subcommand)]
    Charges(Charges),
    /// Received payments
    #[clap(subcommand)]
    Payments(Payments),
    /// Member balances
    #[clap(subcommand)]
    Balances(Balances),
    /// Preview notification messages
    #[clap(name = "notify")]
    Notify(Notify),
}
