use rust_decimal::Decimal;

/// Format a decimal as a dollar amount with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!("{:.2}", val.abs().round_dp(2));
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(d("1234.56")), "$1,234.56");
        assert_eq!(money(d("-500.00")), "-$500.00");
        assert_eq!(money(Decimal::ZERO), "$0.00");
        assert_eq!(money(d("1000000.99")), "$1,000,000.99");
        assert_eq!(money(d("42.1")), "$42.10");
        assert_eq!(money(d("115")), "$115.00");
    }

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(money(d("9.999")), "$10.00");
        assert_eq!(money(d("0.004")), "$0.00");
    }
}
