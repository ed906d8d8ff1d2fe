//! Weekday enumeration and ISO week identity.

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A workday, Monday through Friday. The scheduling horizon is always
/// exactly five days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WeekDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl WeekDay {
    /// All five workdays in canonical Mon..Fri order.
    pub const ALL: [WeekDay; 5] = [
        WeekDay::Mon,
        WeekDay::Tue,
        WeekDay::Wed,
        WeekDay::Thu,
        WeekDay::Fri,
    ];

    /// Zero-based index into the dense `(day, operator)` arrays used by the
    /// greedy engine and propagator.
    pub fn index(self) -> usize {
        match self {
            WeekDay::Mon => 0,
            WeekDay::Tue => 1,
            WeekDay::Wed => 2,
            WeekDay::Thu => 3,
            WeekDay::Fri => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The calendar date of this workday given the Monday of its week.
    pub fn date_from_monday(self, monday: NaiveDate) -> NaiveDate {
        monday + Duration::days(self.index() as i64)
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeekDay::Mon => "Mon",
            WeekDay::Tue => "Tue",
            WeekDay::Wed => "Wed",
            WeekDay::Thu => "Thu",
            WeekDay::Fri => "Fri",
        };
        write!(f, "{name}")
    }
}

/// The ISO-8601 week identity of a schedule: the Monday of the week, the ISO
/// year, and the ISO week number.
///
/// Edge cases at year boundaries follow the standard ISO rule — week 1 is the
/// week containing the year's first Thursday — which is exactly what
/// `chrono::Datelike::iso_week` implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IsoWeek {
    pub monday: NaiveDate,
    pub iso_year: i32,
    pub iso_week: u32,
}

impl IsoWeek {
    /// Computes the ISO week identity containing `any_date`, normalizing to
    /// that week's Monday regardless of which weekday `any_date` falls on.
    pub fn containing(any_date: NaiveDate) -> Self {
        let iso = any_date.iso_week();
        let monday = any_date - Duration::days(any_date.weekday().num_days_from_monday() as i64);
        Self {
            monday,
            iso_year: iso.year(),
            iso_week: iso.week(),
        }
    }

    pub fn date_of(&self, day: WeekDay) -> NaiveDate {
        day.date_from_monday(self.monday)
    }
}

/// Supplies "now" to derive the current ISO week when the caller does not
/// provide one explicitly.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The conventional default `Clock`, backed by the system's local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
