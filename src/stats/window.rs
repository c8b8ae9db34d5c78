use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::stats::{DateWindow, StatsPeriod};

const UUID_TEXT_LEN: usize = 36;

pub fn parse_driver_id(raw: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    if raw.len() != UUID_TEXT_LEN {
        return Err(AppError::InvalidInput(format!(
            "invalid driver id format: {raw}"
        )));
    }

    Uuid::parse_str(raw)
        .map_err(|_| AppError::InvalidInput(format!("invalid driver id format: {raw}")))
}

pub fn resolve_window(
    period: StatsPeriod,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<DateWindow, AppError> {
    let end = end_date.unwrap_or(now);
    let start = match start_date {
        Some(start) => start,
        None => period_start(period, end),
    };

    if start > end {
        return Err(AppError::InvalidInput(format!(
            "start date {start} is after end date {end}"
        )));
    }

    Ok(DateWindow { start, end })
}

fn period_start(period: StatsPeriod, end: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        StatsPeriod::Today => end
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .unwrap_or(end),
        StatsPeriod::Week => end - Duration::days(7),
        StatsPeriod::Month => end - Duration::days(30),
        StatsPeriod::All => DateTime::<Utc>::from_timestamp(0, 0).unwrap_or(end),
    }
}

pub fn days_in_window(window: &DateWindow) -> i64 {
    let seconds = (window.end - window.start).num_seconds().max(0);
    let day = Duration::days(1).num_seconds();
    ((seconds + day - 1) / day).max(1)
}

pub fn previous_window(window: &DateWindow) -> DateWindow {
    let length = window.end - window.start;
    DateWindow {
        start: window.start - length,
        end: window.start,
    }
}
