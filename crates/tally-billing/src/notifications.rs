use tally_data::MemberBalance;

use crate::currency::format_amount;

/// Compose the payment status message for a member. Pure text
/// composition; pushing it through any channel is the job of
/// the surrounding application.
pub fn notification_message(
    member_name: &str,
    balance: &MemberBalance,
    currency: &str,
) -> String {
    if balance.balance >= 0.0 {
        format!(
            "Hi {}, your membership account is settled with a credit of {}. Thank you!",
            member_name,
            format_amount(balance.balance, currency),
        )
    } else if balance.overdue > 0.0 {
        format!(
            "Hi {}, {} of your outstanding {} is overdue. Please settle the overdue amount as soon as possible.",
            member_name,
            format_amount(balance.overdue, currency),
            format_amount(-balance.balance, currency),
        )
    } else {
        format!(
            "Hi {}, you have upcoming charges of {}. Nothing is overdue yet.",
            member_name,
            format_amount(-balance.balance, currency),
        )
    }
}
