use crate::datekey::{format_date_key, week_start};
use crate::models::CalendarDayEntry;
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const WEEKDAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub type CalendarEntries = BTreeMap<String, CalendarDayEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalendarMode {
    /// Compact view: the Monday-Sunday week.
    #[default]
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub label: String,
    pub date_key: String,
    pub is_today: bool,
    pub is_future: bool,
    pub entry: Option<CalendarDayEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DayCell {
    /// Padding before the 1st so it lands in its weekday column.
    Blank,
    Day(CalendarDay),
}

impl DayCell {
    pub fn day(&self) -> Option<&CalendarDay> {
        match self {
            Self::Blank => None,
            Self::Day(day) => Some(day),
        }
    }
}

pub fn build_calendar_view(
    mode: CalendarMode,
    reference: NaiveDate,
    entries: &CalendarEntries,
) -> Vec<DayCell> {
    build_calendar_view_at(Local::now().date_naive(), mode, reference, entries)
}

pub fn build_calendar_view_at(
    today: NaiveDate,
    mode: CalendarMode,
    reference: NaiveDate,
    entries: &CalendarEntries,
) -> Vec<DayCell> {
    match mode {
        CalendarMode::Week => week_cells(today, reference, entries),
        CalendarMode::Month => month_cells(today, reference, entries),
    }
}

fn week_cells(today: NaiveDate, reference: NaiveDate, entries: &CalendarEntries) -> Vec<DayCell> {
    let monday = week_start(reference);
    WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(offset, label)| {
            let date = monday + Duration::days(offset as i64);
            let date_key = format_date_key(date);
            DayCell::Day(CalendarDay {
                label: (*label).to_string(),
                is_today: date == today,
                is_future: date > today,
                entry: entries.get(&date_key).cloned(),
                date_key,
            })
        })
        .collect()
}

fn month_cells(today: NaiveDate, reference: NaiveDate, entries: &CalendarEntries) -> Vec<DayCell> {
    let first = reference.with_day(1).unwrap_or(reference);
    let leading = first.weekday().num_days_from_monday() as usize;
    let total = days_in_month(first.year(), first.month());

    let mut cells = Vec::with_capacity(leading + total as usize);
    cells.extend(std::iter::repeat_n(DayCell::Blank, leading));

    for day in 0..total {
        let date = first + Duration::days(i64::from(day));
        let date_key = format_date_key(date);
        cells.push(DayCell::Day(CalendarDay {
            label: (day + 1).to_string(),
            is_today: date == today,
            is_future: false,
            entry: entries.get(&date_key).cloned(),
            date_key,
        }));
    }
    cells
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|date| date.pred_opt())
        .map_or(30, |date| date.day())
}

pub fn calendar_title(mode: CalendarMode, year: i32, month: u32) -> String {
    match mode {
        CalendarMode::Week => "This week".to_string(),
        CalendarMode::Month => {
            let name = MONTH_NAMES
                .get(month.saturating_sub(1) as usize)
                .copied()
                .unwrap_or("?");
            format!("{name} {year}")
        }
    }
}

/// The (year, month) being viewed in month mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarNav {
    pub year: i32,
    pub month: u32,
}

impl CalendarNav {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn can_go_next(self, today: NaiveDate) -> bool {
        self.index() < Self::for_date(today).index()
    }

    pub fn can_go_prev(self, today: NaiveDate) -> bool {
        self.index() > Self::for_date(today).index() - 12
    }

    /// Moves one month forward if allowed; returns whether the view changed.
    pub fn next(&mut self, today: NaiveDate) -> bool {
        if !self.can_go_next(today) {
            return false;
        }
        *self = Self::from_index(self.index() + 1);
        true
    }

    /// Moves one month back if allowed; returns whether the view changed.
    pub fn prev(&mut self, today: NaiveDate) -> bool {
        if !self.can_go_prev(today) {
            return false;
        }
        *self = Self::from_index(self.index() - 1);
        true
    }
}

/// Viewed month, display mode, and the entries last fetched for it.
#[derive(Debug, Clone)]
pub struct CalendarState {
    pub nav: CalendarNav,
    pub mode: CalendarMode,
    pub entries: CalendarEntries,
    pub loaded_for: Option<CalendarNav>,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            nav: CalendarNav::for_date(today),
            mode: CalendarMode::default(),
            entries: BTreeMap::new(),
            loaded_for: None,
        }
    }

    pub fn toggle_mode(&mut self) -> CalendarMode {
        self.mode = match self.mode {
            CalendarMode::Week => CalendarMode::Month,
            CalendarMode::Month => CalendarMode::Week,
        };
        self.mode
    }

    /// Moves the viewed month forward. Only month mode navigates.
    pub fn next(&mut self, today: NaiveDate) -> bool {
        self.mode == CalendarMode::Month && self.nav.next(today)
    }

    /// Moves the viewed month back. Only month mode navigates.
    pub fn prev(&mut self, today: NaiveDate) -> bool {
        self.mode == CalendarMode::Month && self.nav.prev(today)
    }

    /// Stores entries fetched for `target`. Responses for a month that is no
    /// longer being viewed are discarded.
    pub fn apply_entries(&mut self, target: CalendarNav, entries: CalendarEntries) -> bool {
        if target != self.nav {
            debug!(
                "dropping stale calendar response for {}-{:02}, viewing {}-{:02}",
                target.year, target.month, self.nav.year, self.nav.month
            );
            return false;
        }
        info!(
            "calendar {}-{:02} loaded with {} entries",
            target.year,
            target.month,
            entries.len()
        );
        self.entries = entries;
        self.loaded_for = Some(target);
        true
    }

    pub fn view_at(&self, today: NaiveDate) -> CalendarView {
        let reference = match self.mode {
            CalendarMode::Week => today,
            CalendarMode::Month => self.nav.first_day(),
        };
        let month_mode = self.mode == CalendarMode::Month;
        CalendarView {
            mode: self.mode,
            title: calendar_title(self.mode, self.nav.year, self.nav.month),
            year: self.nav.year,
            month: self.nav.month,
            can_go_next: month_mode && self.nav.can_go_next(today),
            can_go_prev: month_mode && self.nav.can_go_prev(today),
            cells: build_calendar_view_at(today, self.mode, reference, &self.entries),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub mode: CalendarMode,
    pub title: String,
    pub year: i32,
    pub month: u32,
    pub can_go_next: bool,
    pub can_go_prev: bool,
    pub cells: Vec<DayCell>,
}
