use chrono::{Datelike, Duration, Month, NaiveDate, Weekday};
use itertools::Itertools;
use num_traits::FromPrimitive;
use phf::phf_set;
use std::cmp::Ordering;
use std::env;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::Error;

pub const DAYS_PER_WEEK: usize = 7;
pub const MAX_WEEKS_PER_MONTH: usize = 6;

// Regions whose calendars start the week on Sunday or Saturday (CLDR).
static SUNDAY_FIRST_REGIONS: phf::Set<&'static str> = phf_set! {
    "AG", "AS", "BD", "BR", "BS", "BT", "BW", "BZ", "CA", "CN", "CO", "DM", "DO",
    "ET", "GT", "GU", "HK", "HN", "ID", "IL", "IN", "JM", "JP", "KE", "KH", "KR",
    "LA", "MH", "MM", "MO", "MT", "MX", "MZ", "NI", "NP", "PA", "PE", "PH", "PK",
    "PR", "PT", "PY", "SA", "SG", "SV", "TH", "TT", "TW", "UM", "US", "VE", "VI",
    "WS", "YE", "ZA", "ZW",
};

static SATURDAY_FIRST_REGIONS: phf::Set<&'static str> = phf_set! {
    "AE", "AF", "BH", "DJ", "DZ", "EG", "IQ", "IR", "JO", "KW", "LY", "OM", "QA",
    "SD", "SY",
};

const LOCALE_ENV_VARS: &[&str] = &["LC_ALL", "LC_TIME", "LANG"];

/// Classification of a cell in a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPosition {
    /// Filler from the previous month completing the first row.
    InDate,
    MonthDate,
    /// Filler from the next month completing the last row(s).
    OutDate,
}

/// How many trailing out-dates a month grid receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutDateStyle {
    /// Stop at the end of the row holding the last day of the month.
    EndOfRow,
    /// Fill up to `MAX_WEEKS_PER_MONTH` rows so every month has the same height.
    EndOfGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub position: DayPosition,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, position: DayPosition) -> Self {
        CalendarDay { date, position }
    }

    pub fn is_month_date(&self) -> bool {
        self.position == DayPosition::MonthDate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    pub fn new(year: i32, month: Month) -> Self {
        YearMonth { year, month }
    }

    pub fn next(&self) -> Self {
        *self + 1
    }

    pub fn previous(&self) -> Self {
        *self - 1
    }

    pub fn plus_months(&self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }

    pub fn minus_months(&self, months: i64) -> Self {
        Self::from_index(self.index() - months)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: &YearMonth) -> i64 {
        other.index() - self.index()
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month.number_from_month(), 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn length_of_month(&self) -> u32 {
        self.next()
            .first_day()
            .signed_duration_since(self.first_day())
            .num_days() as u32
    }

    /// Earliest month whose grid, filler days included, chrono can represent.
    pub fn min_supported() -> Self {
        YearMonth::from(NaiveDate::MIN).next()
    }

    /// Latest month whose grid, filler days included, chrono can represent.
    pub fn max_supported() -> Self {
        YearMonth::from(NaiveDate::MAX).previous()
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        YearMonth::from(*date) == *self
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + self.month.number_from_month() as i64 - 1
    }

    fn from_index(index: i64) -> Self {
        let year = index.div_euclid(12) as i32;
        let month = Month::from_i64(index.rem_euclid(12) + 1).unwrap_or(Month::January);

        YearMonth { year, month }
    }
}

impl<T: Datelike> From<T> for YearMonth {
    fn from(d: T) -> Self {
        YearMonth::new(
            d.year(),
            Month::from_u32(d.month()).unwrap_or(Month::January),
        )
    }
}

impl Add<i64> for YearMonth {
    type Output = YearMonth;
    fn add(self, rhs: i64) -> Self::Output {
        self.plus_months(rhs)
    }
}

impl Sub<i64> for YearMonth {
    type Output = YearMonth;
    fn sub(self, rhs: i64) -> Self::Output {
        self.minus_months(rhs)
    }
}

impl PartialOrd for YearMonth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for YearMonth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{} {}", self.month.name(), self.year))
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")?;
        Ok(YearMonth::from(date))
    }
}

/// All months from `start` to `end`, both inclusive.
pub fn month_range(start: YearMonth, end: YearMonth) -> impl Iterator<Item = YearMonth> {
    let count = start.months_until(&end).max(-1) + 1;
    (0..count).map(move |offset| start + offset)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonth {
    pub year_month: YearMonth,
    pub week_days: Vec<Vec<CalendarDay>>,
}

impl CalendarMonth {
    pub fn generate(
        year_month: YearMonth,
        first_day_of_week: Weekday,
        out_date_style: OutDateStyle,
    ) -> Self {
        let first = year_month.first_day();
        let in_days = days_between(first_day_of_week, first.weekday());
        let month_days = year_month.length_of_month() as usize;

        let rows_needed = (in_days + month_days + DAYS_PER_WEEK - 1) / DAYS_PER_WEEK;
        let rows = match out_date_style {
            OutDateStyle::EndOfRow => rows_needed,
            OutDateStyle::EndOfGrid => MAX_WEEKS_PER_MONTH,
        };

        let grid_start = first - Duration::days(in_days as i64);
        let week_days = (0..rows * DAYS_PER_WEEK)
            .map(|offset| {
                let date = grid_start + Duration::days(offset as i64);
                let position = if offset < in_days {
                    DayPosition::InDate
                } else if offset < in_days + month_days {
                    DayPosition::MonthDate
                } else {
                    DayPosition::OutDate
                };
                CalendarDay::new(date, position)
            })
            .chunks(DAYS_PER_WEEK)
            .into_iter()
            .map(|week| week.collect_vec())
            .collect_vec();

        CalendarMonth {
            year_month,
            week_days,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.week_days.iter().flatten()
    }

    pub fn rows(&self) -> usize {
        self.week_days.len()
    }

    pub fn day_at(&self, index: usize) -> Option<&CalendarDay> {
        self.week_days
            .get(index / DAYS_PER_WEEK)
            .and_then(|week| week.get(index % DAYS_PER_WEEK))
    }

    /// Grid index of the in-month cell for `date`.
    pub fn index_of(&self, date: &NaiveDate) -> Option<usize> {
        self.days()
            .position(|day| day.is_month_date() && &day.date == date)
    }
}

fn days_between(from: Weekday, to: Weekday) -> usize {
    ((to.num_days_from_monday() + 7 - from.num_days_from_monday()) % 7) as usize
}

pub fn days_of_week(first_day_of_week: Weekday) -> [Weekday; DAYS_PER_WEEK] {
    let mut days = [first_day_of_week; DAYS_PER_WEEK];
    for i in 1..DAYS_PER_WEEK {
        days[i] = days[i - 1].succ();
    }
    days
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// First day of week for a POSIX locale string such as `en_US.UTF-8`.
pub fn first_day_of_week_from_locale(locale: &str) -> Weekday {
    let name = locale.split(|c: char| c == '.' || c == '@').next().unwrap_or("");
    let region = name
        .split(|c: char| c == '_' || c == '-')
        .nth(1)
        .unwrap_or("")
        .to_ascii_uppercase();

    if SUNDAY_FIRST_REGIONS.contains(region.as_str()) {
        Weekday::Sun
    } else if SATURDAY_FIRST_REGIONS.contains(region.as_str()) {
        Weekday::Sat
    } else {
        Weekday::Mon
    }
}

pub fn locale_first_day_of_week() -> Weekday {
    let locale = LOCALE_ENV_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.is_empty());

    match locale {
        Some(locale) => {
            log::debug!("Using locale '{}' for first day of week", locale);
            first_day_of_week_from_locale(&locale)
        }
        None => Weekday::Mon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn year_month_arithmetic_wraps_years() {
        let dec = YearMonth::new(2023, Month::December);
        assert_eq!(dec.next(), YearMonth::new(2024, Month::January));
        assert_eq!(dec.next().previous(), dec);
        assert_eq!(dec - 12, YearMonth::new(2022, Month::December));
        assert_eq!(dec + 25, YearMonth::new(2026, Month::January));
        assert_eq!(
            YearMonth::new(2024, Month::March).minus_months(500),
            YearMonth::new(1982, Month::July)
        );
        assert_eq!(dec.months_until(&YearMonth::new(2024, Month::March)), 3);
    }

    #[test]
    fn length_of_month_handles_leap_years() {
        assert_eq!(YearMonth::new(2024, Month::February).length_of_month(), 29);
        assert_eq!(YearMonth::new(2023, Month::February).length_of_month(), 28);
        assert_eq!(YearMonth::new(2024, Month::December).length_of_month(), 31);
    }

    #[test]
    fn parse_and_display() {
        let ym: YearMonth = "2024-03".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2024, Month::March));
        assert_eq!(ym.to_string(), "March 2024");
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
        assert!("2024".parse::<YearMonth>().is_err());
    }

    #[test]
    fn month_range_is_inclusive() {
        let start = YearMonth::new(2023, Month::November);
        let end = YearMonth::new(2024, Month::February);
        let months = month_range(start, end).collect_vec();
        assert_eq!(months.len(), 4);
        assert_eq!(months[0], start);
        assert_eq!(months[3], end);
        assert_eq!(month_range(end, start).count(), 0);
    }

    #[test]
    fn end_of_grid_month_has_six_full_rows() {
        // March 2024 starts on a Friday.
        let month = CalendarMonth::generate(
            YearMonth::new(2024, Month::March),
            Weekday::Mon,
            OutDateStyle::EndOfGrid,
        );

        assert_eq!(month.rows(), MAX_WEEKS_PER_MONTH);
        assert!(month.week_days.iter().all(|w| w.len() == DAYS_PER_WEEK));

        let first = month.day_at(0).unwrap();
        assert_eq!(first.date, date(2024, 2, 26));
        assert_eq!(first.position, DayPosition::InDate);
        assert_eq!(first.date.weekday(), Weekday::Mon);

        let in_month = month.days().filter(|d| d.is_month_date()).count();
        assert_eq!(in_month, 31);

        let last = month.days().last().unwrap();
        assert_eq!(last.position, DayPosition::OutDate);
        assert_eq!(last.date, date(2024, 4, 7));
    }

    #[test]
    fn end_of_row_month_stops_after_last_week() {
        // 5 in-dates plus 31 days still need six rows.
        let march = CalendarMonth::generate(
            YearMonth::new(2024, Month::March),
            Weekday::Sun,
            OutDateStyle::EndOfRow,
        );
        assert_eq!(march.rows(), 6);
        assert_eq!(march.day_at(0).unwrap().date.weekday(), Weekday::Sun);
        assert_eq!(march.days().last().unwrap().date, date(2024, 4, 6));

        // February 2026 starts on a Sunday and fills exactly four rows.
        let february = CalendarMonth::generate(
            YearMonth::new(2026, Month::February),
            Weekday::Sun,
            OutDateStyle::EndOfRow,
        );
        assert_eq!(february.rows(), 4);
        assert_eq!(
            february.day_at(0).unwrap(),
            &CalendarDay::new(date(2026, 2, 1), DayPosition::MonthDate)
        );
        assert_eq!(
            february.days().last().unwrap(),
            &CalendarDay::new(date(2026, 2, 28), DayPosition::MonthDate)
        );
    }

    #[test]
    fn supported_months_generate_full_grids() {
        let earliest = CalendarMonth::generate(
            YearMonth::min_supported(),
            Weekday::Sun,
            OutDateStyle::EndOfGrid,
        );
        let latest = CalendarMonth::generate(
            YearMonth::max_supported(),
            Weekday::Mon,
            OutDateStyle::EndOfGrid,
        );

        assert_eq!(earliest.rows(), MAX_WEEKS_PER_MONTH);
        assert_eq!(latest.rows(), MAX_WEEKS_PER_MONTH);
        assert!(YearMonth::min_supported() < YearMonth::max_supported());
    }

    #[test]
    fn month_starting_on_first_weekday_has_no_in_dates() {
        // April 2024 starts on a Monday.
        let month = CalendarMonth::generate(
            YearMonth::new(2024, Month::April),
            Weekday::Mon,
            OutDateStyle::EndOfGrid,
        );
        assert_eq!(month.day_at(0).unwrap(), &CalendarDay::new(date(2024, 4, 1), DayPosition::MonthDate));
        assert_eq!(month.index_of(&date(2024, 4, 10)), Some(9));
        assert_eq!(month.index_of(&date(2024, 5, 1)), None);
    }

    #[test]
    fn weekday_order_starts_at_first_day() {
        let days = days_of_week(Weekday::Sun);
        assert_eq!(days[0], Weekday::Sun);
        assert_eq!(days[6], Weekday::Sat);
        assert_eq!(
            days.iter().map(|d| weekday_label(*d)).collect_vec(),
            vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
    }

    #[test]
    fn first_day_of_week_by_region() {
        assert_eq!(first_day_of_week_from_locale("en_US.UTF-8"), Weekday::Sun);
        assert_eq!(first_day_of_week_from_locale("de_DE.UTF-8"), Weekday::Mon);
        assert_eq!(first_day_of_week_from_locale("ar_EG"), Weekday::Sat);
        assert_eq!(first_day_of_week_from_locale("pt-br"), Weekday::Sun);
        assert_eq!(first_day_of_week_from_locale("C"), Weekday::Mon);
    }
}
