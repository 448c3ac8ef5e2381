use chrono::{Days, Local, NaiveDate};
use parking_lot::Mutex;

/// Source of the current calendar day used to key daily counters.
pub trait Clock: Send + Sync {
    /// Today's date in the server's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation backed by `chrono::Local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A settable clock for tests that need to cross a day boundary.
#[derive(Debug)]
pub struct FixedClock {
    day: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Mutex::new(day),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        *self.day.lock() = day;
    }

    /// Move the clock forward by `days` calendar days.
    pub fn advance_days(&self, days: u64) {
        let mut guard = self.day.lock();
        if let Some(next) = guard.checked_add_days(Days::new(days)) {
            *guard = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.day.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        clock.advance_days(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        clock.set(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn system_clock_matches_local_date() {
        let before = Local::now().date_naive();
        let today = SystemClock.today();
        let after = Local::now().date_naive();
        assert!(today >= before && today <= after);
    }
}
