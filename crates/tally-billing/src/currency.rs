/// Round a money amount to whole cents. Normalizes -0.0 to
/// 0.0 so rounded results compare and print cleanly.
pub fn round_cents(amount: f64) -> f64 {
    ((amount * 100.0).round() / 100.0) + 0.0
}

/// Format a money amount with two fraction digits and its
/// currency code.
pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(23.424), 23.42);
        assert_eq!(round_cents(23.425000001), 23.43);
        assert_eq!(round_cents(-0.001), 0.0);
        assert!(round_cents(-0.001).is_sign_positive());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(30.0, "EUR"), "30.00 EUR");
        assert_eq!(format_amount(12.5, "CHF"), "12.50 CHF");
    }
}
