use chrono::{Datelike, Local, NaiveDate};

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Label for the calendar quarter `quarters_ahead` steps after the one
/// containing `today`, e.g. `Q1 2027`.
pub fn quarter_label(today: NaiveDate, quarters_ahead: u32) -> String {
    let current_quarter = (today.month0() / 3) as i64;
    let absolute = today.year() as i64 * 4 + current_quarter + quarters_ahead as i64;
    let year = absolute.div_euclid(4);
    let quarter = absolute.rem_euclid(4) + 1;
    format!("Q{quarter} {year}")
}
