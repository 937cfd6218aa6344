//! Month navigation and per-day notes

use std::collections::BTreeMap;

use chrono::{Datelike, Local, Months, NaiveDate};

const KEY_FORMAT: &str = "%Y-%m-%d";

/// The month currently shown by the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn current() -> Self {
        Self::containing(today())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn prev(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub fn days_in_month(&self) -> usize {
        self.first
            .iter_days()
            .take_while(|d| d.month() == self.month())
            .count()
    }

    /// Empty cells before the 1st in a Sunday-first week grid
    pub fn leading_blanks(&self) -> usize {
        self.first.weekday().num_days_from_sunday() as usize
    }

    /// Grid cells: leading blanks, then every date of the month
    pub fn cells(&self) -> Vec<Option<NaiveDate>> {
        std::iter::repeat(None)
            .take(self.leading_blanks())
            .chain(
                self.first
                    .iter_days()
                    .take(self.days_in_month())
                    .map(Some),
            )
            .collect()
    }

    /// e.g. "October 2026"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Notes keyed by `yyyy-MM-dd`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    entries: BTreeMap<String, String>,
}

impl Notes {
    pub fn from_map(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }

    pub fn key(date: NaiveDate) -> String {
        date.format(KEY_FORMAT).to_string()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&str> {
        self.entries.get(&Self::key(date)).map(String::as_str)
    }

    pub fn has(&self, date: NaiveDate) -> bool {
        self.entries.contains_key(&Self::key(date))
    }

    /// Store a note; blank text deletes it
    pub fn set(&mut self, date: NaiveDate, text: &str) {
        if text.trim().is_empty() {
            self.remove(date);
        } else {
            self.entries.insert(Self::key(date), text.to_string());
        }
    }

    pub fn remove(&mut self, date: NaiveDate) -> bool {
        self.entries.remove(&Self::key(date)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop notes dated outside `month`. Unparseable keys are kept.
    pub fn prune_outside(&mut self, month: MonthCursor) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| {
            NaiveDate::parse_from_str(key, KEY_FORMAT)
                .map(|date| month.contains(date))
                .unwrap_or(true)
        });
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_grid() {
        // 1 October 2026 is a Thursday
        let month = MonthCursor::containing(date(2026, 10, 19));
        assert_eq!(month.leading_blanks(), 4);
        assert_eq!(month.days_in_month(), 31);

        let cells = month.cells();
        assert_eq!(cells.len(), 35);
        assert_eq!(cells[3], None);
        assert_eq!(cells[4], Some(date(2026, 10, 1)));
        assert_eq!(cells[34], Some(date(2026, 10, 31)));
    }

    #[test]
    fn test_leap_february() {
        assert_eq!(MonthCursor::containing(date(2028, 2, 10)).days_in_month(), 29);
        assert_eq!(MonthCursor::containing(date(2026, 2, 10)).days_in_month(), 28);
    }

    #[test]
    fn test_navigation_wraps_years() {
        let jan = MonthCursor::containing(date(2027, 1, 5));
        assert_eq!(jan.prev(), MonthCursor::containing(date(2026, 12, 1)));
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(jan.label(), "January 2027");
    }

    #[test]
    fn test_blank_note_deletes() {
        let mut notes = Notes::default();
        let day = date(2026, 10, 19);
        assert!(!notes.has(day));
        notes.set(day, "dentist");
        assert!(notes.has(day));
        assert_eq!(notes.get(day), Some("dentist"));
        assert_eq!(notes.to_map().keys().next().map(String::as_str), Some("2026-10-19"));

        notes.set(day, "   \n");
        assert_eq!(notes.get(day), None);
        assert!(!notes.has(day));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_prune_outside_month() {
        let mut map = BTreeMap::new();
        map.insert("2026-09-30".to_string(), "old".to_string());
        map.insert("2026-10-01".to_string(), "keep".to_string());
        map.insert("2025-10-15".to_string(), "last year".to_string());
        map.insert("someday".to_string(), "unparsed".to_string());
        let mut notes = Notes::from_map(map);

        let removed = notes.prune_outside(MonthCursor::containing(date(2026, 10, 19)));

        assert_eq!(removed, 2);
        assert_eq!(notes.to_map().len(), 2);
        assert_eq!(notes.get(date(2026, 10, 1)), Some("keep"));
    }
}
