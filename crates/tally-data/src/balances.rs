use serde::{Deserialize, Serialize};

/// A member's financial position, derived from the current
/// charge and payment sets on every read. Never persisted,
/// so it cannot go stale.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub user_id: u32,
    /// Sum of all charge amounts applicable to the member.
    pub total_owed: f64,
    /// Sum of all payments attributed to the member.
    pub total_paid: f64,
    /// Unpaid portion of charges whose due date has passed.
    pub overdue: f64,
    /// `total_paid - total_owed`; negative means the member
    /// owes money.
    pub balance: f64,
}
