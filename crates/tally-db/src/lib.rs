pub mod connection;
pub use connection::Connection;

pub mod results;
pub mod schema;

pub mod fee_settings;
pub mod charges;
pub mod payments;
pub mod ledger;
