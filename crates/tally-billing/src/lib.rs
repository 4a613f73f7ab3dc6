pub mod balances;
pub mod charges;
pub mod currency;
pub mod fees;
pub mod notifications;
