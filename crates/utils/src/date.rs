use chrono::{DateTime, Days, NaiveDate, Utc};

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `days_ago` may be negative for dates in the future.
pub fn days_from_today(days_ago: i64) -> NaiveDate {
    shift(today(), days_ago)
}

pub fn shift(date: NaiveDate, days_ago: i64) -> NaiveDate {
    let days = Days::new(days_ago.unsigned_abs());
    let shifted = if days_ago >= 0 {
        date.checked_sub_days(days)
    } else {
        date.checked_add_days(days)
    };
    shifted.unwrap_or(date)
}

pub fn hours_ago(days_ago: i64, hours: i64) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::days(days_ago) - chrono::Duration::hours(hours)
}
