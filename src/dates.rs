// expiry-labels: manufacture and best-before date calculation

use chrono::{Datelike, Days, Local, NaiveDate};

use crate::error::AppError;

/// Days added after the one-month step.
const EXPIRY_EXTRA_DAYS: u64 = 15;

/// Date pair printed on every label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDates {
    pub mfg: String,
    pub exp: String,
}

/// Source of "today" for the session.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date (`--date` override and tests).
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Formats as DD/MM/YYYY.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Best-before date: one calendar month, then fifteen days.
///
/// The month step keeps the day of month and lets it overflow into the next
/// month, so 31 January becomes 2 March (3 March outside leap years) before
/// the extra days are added. This is not the same as adding 45 days.
pub fn expiration_date(mfg: &NaiveDate) -> Result<NaiveDate, AppError> {
    add_month_rolling(mfg)
        .and_then(|d| d.checked_add_days(Days::new(EXPIRY_EXTRA_DAYS)))
        .ok_or_else(|| AppError::Date(format!("{} is out of range", mfg)))
}

fn add_month_rolling(date: &NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(date.day0())))
}

pub fn compute_dates(today: &NaiveDate) -> Result<LabelDates, AppError> {
    Ok(LabelDates {
        mfg: format_date(today),
        exp: format_date(&expiration_date(today)?),
    })
}

pub fn parse_date(date_str: &Option<String>) -> Result<Option<NaiveDate>, AppError> {
    match date_str {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::Date(s.clone())),
        None => Ok(None),
    }
}
