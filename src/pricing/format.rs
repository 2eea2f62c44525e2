//! nl-NL number formatting
//!
//! Thousands are grouped with `.`, the decimal separator is `,` and amounts
//! always carry two decimals.

/// Format an amount as euros, e.g. `€ 1.234,56`
pub fn format_currency(amount: f64) -> String {
    let formatted = format_number(amount.abs());
    if amount < 0.0 && formatted != "0,00" {
        format!("€ -{}", formatted)
    } else {
        format!("€ {}", formatted)
    }
}

/// Format a number with two decimals, e.g. `12.000,00`
pub fn format_number(number: f64) -> String {
    if !number.is_finite() {
        return "0,00".to_string();
    }

    let fixed = format!("{:.2}", number.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if number < 0.0 && fixed != "0.00" {
        format!("-{},{}", grouped, frac_part)
    } else {
        format!("{},{}", grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(0.0), "0,00");
        assert_eq!(format_number(999.5), "999,50");
        assert_eq!(format_number(1000.0), "1.000,00");
        assert_eq!(format_number(12_000.0), "12.000,00");
        assert_eq!(format_number(1_234_567.891), "1.234.567,89");
        assert_eq!(format_number(-2500.0), "-2.500,00");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::NAN), "0,00");
        assert_eq!(format_number(f64::INFINITY), "0,00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(75.0), "€ 75,00");
        assert_eq!(format_currency(2.49), "€ 2,49");
        assert_eq!(format_currency(540_000.0), "€ 540.000,00");
        assert_eq!(format_currency(-50.0), "€ -50,00");
        assert_eq!(format_currency(-0.001), "€ 0,00");
    }
}
