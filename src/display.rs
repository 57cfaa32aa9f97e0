//! Display formatting for amounts and dates, Thai locale.

use chrono::{Datelike, NaiveDate};

/// Years between the Gregorian and Buddhist calendars.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Two fraction digits with comma thousands grouping: `1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.001 rounds to 0.00 and carries no sign
    let negative = amount < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Short Thai date: day/month/Buddhist-era year, no zero padding.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{}/{}/{}",
        date.day(),
        date.month(),
        date.year() + BUDDHIST_ERA_OFFSET
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(999.999), "1,000.00");
        assert_eq!(format_currency(1234.5), "1,234.50");
        assert_eq!(format_currency(1234567.891), "1,234,567.89");
        assert_eq!(format_currency(-5400.0), "-5,400.00");
        assert_eq!(format_currency(-0.001), "0.00");
    }

    #[test]
    fn test_format_date_buddhist_era() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "7/3/2567");
    }
}
