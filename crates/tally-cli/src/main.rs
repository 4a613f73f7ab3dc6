use anyhow::Result;

use tally_cli::cli::{Cli, Command};
use tally_db::connection;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::init();

    let db = connection::open(&cli.db).await?;
    match cli.command {
        Command::Fees(cmd) => cmd.run(&db).await,
        Command::Charges(cmd) => cmd.run(&db).await,
        Command::Payments(cmd) => cmd.run(&db).await,
        Command::Balances(cmd) => cmd.run(&db).await,
        Command::Notify(cmd) => cmd.run(&db).await,
    }?;

    Ok(())
}
