// Operations
mod operations;
pub use operations::*;

// Models
mod members;
pub use members::*;

mod fee_settings;
pub use fee_settings::*;

mod charges;
pub use charges::*;

mod payments;
pub use payments::*;

mod balances;
pub use balances::*;

mod ledger;
pub use ledger::*;
