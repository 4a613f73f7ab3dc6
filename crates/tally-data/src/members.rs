use serde::{Deserialize, Serialize};

/// A club, as handed over by the surrounding application.
/// Only the parts the billing engine needs are modelled here.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: u32,
    pub name: String,
    /// Default currency for charges created in this club.
    pub currency: String,
}

/// One member of a roster snapshot. Member records are owned
/// by the surrounding application; the engine only reads them.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub is_active: bool,
    pub is_approved: bool,
}

impl Member {
    /// Only active members with confirmed approval get billed.
    pub fn is_billable(&self) -> bool {
        self.is_active && self.is_approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_is_billable() {
        let member = Member {
            is_active: true,
            is_approved: true,
            ..Default::default()
        };
        assert!(member.is_billable());

        let member = Member {
            is_active: true,
            is_approved: false,
            ..Default::default()
        };
        assert!(!member.is_billable());

        let member = Member {
            is_active: false,
            is_approved: true,
            ..Default::default()
        };
        assert!(!member.is_billable());
    }
}
