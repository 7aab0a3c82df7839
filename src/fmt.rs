use crate::models::Denomination;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn dollars(val: f64) -> String {
    let negative = val < 0.0 && (val * 100.0).round() != 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
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

/// Format a stored session value, converting minor units to dollars first.
pub fn money(val: f64, denomination: Denomination) -> String {
    dollars(val / denomination.scale())
}

/// Render an integer count of hundredths as a plain decimal string: 2000 -> "20.00"
pub fn hundredths(val: i64) -> String {
    let sign = if val < 0 { "-" } else { "" };
    let abs = val.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollars_formatting() {
        assert_eq!(dollars(1234.56), "$1,234.56");
        assert_eq!(dollars(-500.00), "-$500.00");
        assert_eq!(dollars(0.0), "$0.00");
        assert_eq!(dollars(-0.001), "$0.00");
        assert_eq!(dollars(1000000.99), "$1,000,000.99");
    }

    #[test]
    fn test_money_scales_cents() {
        assert_eq!(money(123456.0, Denomination::Cents), "$1,234.56");
        assert_eq!(money(20.0, Denomination::Dollars), "$20.00");
    }

    #[test]
    fn test_hundredths() {
        assert_eq!(hundredths(2000), "20.00");
        assert_eq!(hundredths(5), "0.05");
        assert_eq!(hundredths(-1234), "-12.34");
        assert_eq!(hundredths(0), "0.00");
    }
}
