//! Format checks for the free-text answers collected during chat booking.

use chrono::{Local, NaiveDate};

/// Strict `DD/MM/YYYY`, a real calendar day, not before today (local time).
pub fn validate_date(input: &str) -> bool {
    validate_date_on(input, Local::now().date_naive())
}

pub fn validate_date_on(input: &str, today: NaiveDate) -> bool {
    parse_day_month_year(input).is_some_and(|date| date >= today)
}

fn parse_day_month_year(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != 2 && *index != 5)
        .all(|(_, byte)| byte.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    let day = input.get(0..2)?.parse::<u32>().ok()?;
    let month = input.get(3..5)?.parse::<u32>().ok()?;
    let year = input.get(6..10)?.parse::<i32>().ok()?;

    // from_ymd_opt refuses days that do not exist (31/02, 29/02 off leap years).
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `H:MM` or `HH:MM`, hour 0-23, minute 00-59.
pub fn validate_time(input: &str) -> bool {
    let Some((hour, minute)) = input.split_once(':') else {
        return false;
    };
    let numeric = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());
    if !numeric(hour) || !numeric(minute) || hour.len() > 2 || minute.len() != 2 {
        return false;
    }

    matches!((hour.parse::<u32>(), minute.parse::<u32>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
}

/// `local@domain.tld` shape only: no whitespace, exactly one `@`, and a dot
/// with text on both sides after it. Deliberately not RFC 5322.
pub fn validate_email(input: &str) -> bool {
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@');
    if !clean(local) || !clean(domain) {
        return false;
    }

    domain.char_indices().any(|(index, c)| c == '.' && index > 0 && index + 1 < domain.len())
}
