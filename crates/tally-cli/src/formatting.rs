use tally_billing::currency::format_amount;
use tally_data::{Charge, ClubFeeSettings, MemberBalance};

pub trait PrintFormatted {
    fn print_formatted(&self);
}

impl PrintFormatted for ClubFeeSettings {
    fn print_formatted(&self) {
        let months = self
            .active_months
            .iter()
            .map(|month| month.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("Club:\t\t{}", self.club_id);
        println!(
            "Monthly fee:\t{}",
            format_amount(self.monthly_amount, &self.currency)
        );
        println!("Active months:\t{}", months);
        println!("Active:\t\t{}", self.is_active);
    }
}

impl PrintFormatted for Charge {
    fn print_formatted(&self) {
        let targets = self
            .target_user_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("Charge:\t\t#{}", self.id);
        println!("Kind:\t\t{}", self.kind.as_str());
        println!("Description:\t{}", self.description);
        println!("Amount:\t\t{}", format_amount(self.amount, &self.currency));
        println!("Due:\t\t{}", self.due_date);
        if let Some(period) = &self.period {
            println!("Period:\t\t{}", period);
        }
        println!("Members:\t{}", targets);
    }
}

impl PrintFormatted for MemberBalance {
    fn print_formatted(&self) {
        println!("Member:\t\t{}", self.user_id);
        println!("Total owed:\t{:.2}", self.total_owed);
        println!("Total paid:\t{:.2}", self.total_paid);
        println!("Overdue:\t{:.2}", self.overdue);
        println!("Balance:\t{:.2}", self.balance);
    }
}
