use crate::error::AppError;
use time::macros::format_description;
use time::{Date, Duration, Month};

/// Parse a calendar date written as `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("date is required"));
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input(format!("date must be YYYY-MM-DD: {trimmed}")))
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Monday on or before `date`.
pub fn week_start(date: Date) -> Option<Date> {
    let back = i64::from(date.weekday().number_days_from_monday());
    date.checked_sub(Duration::days(back))
}

pub fn add_days(date: Date, days: i64) -> Option<Date> {
    date.checked_add(Duration::days(days))
}

pub fn days_between(start: Date, end: Date) -> i64 {
    (end - start).whole_days()
}

/// First day of the month following the one `date` falls in.
pub fn first_of_next_month(date: Date) -> Option<Date> {
    let (year, month) = match date.month() {
        Month::December => (date.year().checked_add(1)?, Month::January),
        other => (date.year(), other.next()),
    };
    Date::from_calendar_date(year, month, 1).ok()
}
