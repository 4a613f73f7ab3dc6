use anyhow::{ensure, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use tally_data::{Insert, Payment, PaymentFilter, Query};
use tally_db::Connection;

#[derive(Subcommand, Debug)]
pub enum Payments {
    /// Record a received payment
    #[clap(name = "add")]
    Add(AddPayment),
    /// List payments
    #[clap(name = "list")]
    List(ListPayments),
}

impl Payments {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Payments::Add(cmd) => cmd.run(db).await,
            Payments::List(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddPayment {
    #[clap(short, long)]
    pub member_id: u32,
    /// Charge this payment settles, if known
    #[clap(long)]
    pub charge_id: Option<u32>,
    #[clap(short, long)]
    pub amount: f64,
    #[clap(long, default_value_t = Local::now().date_naive())]
    pub paid_at: NaiveDate,
}

impl AddPayment {
    pub async fn run(self, db: &Connection) -> Result<()> {
        ensure!(self.amount > 0.0, "payment amount must be positive");

        let payment = Payment {
            user_id: self.member_id,
            charge_id: self.charge_id,
            amount: self.amount,
            paid_at: self.paid_at,
            ..Default::default()
        };
        let payment = db.insert(payment).await?;
        println!(
            "recorded payment #{} of {:.2} for member {}",
            payment.id, payment.amount, payment.user_id
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListPayments {
    #[clap(short, long)]
    pub member_id: Option<u32>,
    #[clap(long)]
    pub charge_id: Option<u32>,
}

impl ListPayments {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = PaymentFilter {
            user_id: self.member_id,
            charge_id: self.charge_id,
            ..Default::default()
        };
        let payments: Vec<Payment> = db.query(&filter).await?;
        for payment in &payments {
            let linked = match payment.charge_id {
                Some(charge_id) => format!("charge #{}", charge_id),
                None => "general credit".to_string(),
            };
            println!(
                "#{}\t{}\tmember {}\t{:.2}\t{}",
                payment.id, payment.paid_at, payment.user_id, payment.amount, linked
            );
        }
        Ok(())
    }
}
