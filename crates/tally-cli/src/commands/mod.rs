mod fees;
pub use fees::*;

mod charges;
pub use charges::*;

mod payments;
pub use payments::*;

mod balances;
pub use balances::*;

mod notify;
pub use notify::*;
