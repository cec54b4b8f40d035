use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::planner::error::{PlannerError, PlannerResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Month,
    Week,
    Day,
}

impl Granularity {
    /// The level a drill-in lands on. Month skips straight to Day.
    pub fn finer(self) -> Self {
        match self {
            Granularity::Month | Granularity::Week | Granularity::Day => Granularity::Day,
        }
    }
}

impl FromStr for Granularity {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            "day" => Ok(Granularity::Day),
            _ => Err(PlannerError::UnknownGranularity(s.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Month => "month",
            Granularity::Week => "week",
            Granularity::Day => "day",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Date(NaiveDate),
    Hour(u32),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Date(date) => write!(f, "{}", date.format("%a %d/%m/%y")),
            BucketKey::Hour(hour) => write!(f, "{hour:02}:00"),
        }
    }
}

/// One display slot. `start..end` is half-open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub key: BucketKey,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Grid column, Sunday = 0. Always 0 for hour buckets.
    pub column: u32,
}

impl Bucket {
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.start <= time && time < self.end
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && self.end > start
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub range_start: NaiveDateTime,
    pub range_end: NaiveDateTime,
    /// Blank cells before the first bucket in a 7-column grid.
    pub leading_blanks: u32,
    pub buckets: Vec<Bucket>,
}

impl Layout {
    pub fn bucket_for_date(&self, date: NaiveDate) -> Option<&Bucket> {
        self.buckets
            .iter()
            .find(|bucket| bucket.key == BucketKey::Date(date))
    }
}

/// The `{granularity, anchor}` pair that fully determines a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub granularity: Granularity,
    pub anchor: NaiveDate,
}

impl ViewWindow {
    pub fn new(granularity: Granularity, anchor: NaiveDate) -> Self {
        Self {
            granularity,
            anchor,
        }
    }

    pub fn today(granularity: Granularity) -> Self {
        Self::new(granularity, Local::now().date_naive())
    }

    pub fn range(&self) -> PlannerResult<(NaiveDateTime, NaiveDateTime)> {
        let (start, end) = match self.granularity {
            Granularity::Month => {
                let first = self.anchor.with_day(1).ok_or_else(|| self.out_of_range())?;
                let next = first
                    .checked_add_months(Months::new(1))
                    .ok_or_else(|| self.out_of_range())?;
                (first, next)
            }
            Granularity::Week => {
                let back = self.anchor.weekday().num_days_from_sunday();
                let sunday = self
                    .anchor
                    .checked_sub_days(Days::new(back.into()))
                    .ok_or_else(|| self.out_of_range())?;
                let next = sunday
                    .checked_add_days(Days::new(7))
                    .ok_or_else(|| self.out_of_range())?;
                (sunday, next)
            }
            Granularity::Day => {
                let next = self.anchor.succ_opt().ok_or_else(|| self.out_of_range())?;
                (self.anchor, next)
            }
        };
        Ok((start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN)))
    }

    pub fn layout(&self) -> PlannerResult<Layout> {
        let (range_start, range_end) = self.range()?;
        let buckets: Vec<_> = match self.granularity {
            Granularity::Month | Granularity::Week => range_start
                .date()
                .iter_days()
                .take_while(|date| date.and_time(NaiveTime::MIN) < range_end)
                .map(day_bucket)
                .collect(),
            Granularity::Day => (0..24)
                .map(|hour| {
                    let start = range_start + Duration::hours(hour.into());
                    Bucket {
                        key: BucketKey::Hour(hour),
                        date: self.anchor,
                        start,
                        end: start + Duration::hours(1),
                        column: 0,
                    }
                })
                .collect(),
        };
        let leading_blanks = match self.granularity {
            Granularity::Month => buckets.first().map_or(0, |bucket| bucket.column),
            Granularity::Week | Granularity::Day => 0,
        };
        Ok(Layout {
            range_start,
            range_end,
            leading_blanks,
            buckets,
        })
    }

    pub fn next(&self) -> PlannerResult<Self> {
        self.step(true)
    }

    pub fn previous(&self) -> PlannerResult<Self> {
        self.step(false)
    }

    pub fn go_to_today(&self) -> Self {
        self.go_to(Local::now().date_naive())
    }

    pub fn go_to(&self, date: NaiveDate) -> Self {
        Self::new(self.granularity, date)
    }

    pub fn set_granularity(&self, granularity: Granularity) -> Self {
        Self::new(granularity, self.anchor)
    }

    pub fn drill_into(&self, bucket: &Bucket) -> Self {
        Self::new(self.granularity.finer(), bucket.date)
    }

    /// Month steps clamp to the last valid day, so Jan 31 + 1 month is the
    /// end of February and does not come back to Jan 31.
    fn step(&self, forward: bool) -> PlannerResult<Self> {
        let anchor = match (self.granularity, forward) {
            (Granularity::Month, true) => self.anchor.checked_add_months(Months::new(1)),
            (Granularity::Month, false) => self.anchor.checked_sub_months(Months::new(1)),
            (Granularity::Week, true) => self.anchor.checked_add_days(Days::new(7)),
            (Granularity::Week, false) => self.anchor.checked_sub_days(Days::new(7)),
            (Granularity::Day, true) => self.anchor.succ_opt(),
            (Granularity::Day, false) => self.anchor.pred_opt(),
        }
        .ok_or_else(|| self.out_of_range())?;
        Ok(Self::new(self.granularity, anchor))
    }

    fn out_of_range(&self) -> PlannerError {
        PlannerError::OutOfRange(self.anchor)
    }
}

impl fmt::Display for ViewWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Month => write!(f, "month of {}", self.anchor.format("%B %Y")),
            Granularity::Week => {
                let back = self.anchor.weekday().num_days_from_sunday();
                let sunday = self
                    .anchor
                    .checked_sub_days(Days::new(back.into()))
                    .unwrap_or(self.anchor);
                write!(f, "week of {}", sunday.format("%d/%m/%y"))
            }
            Granularity::Day => write!(f, "day {}", self.anchor.format("%a %d/%m/%y")),
        }
    }
}

fn day_bucket(date: NaiveDate) -> Bucket {
    let start = date.and_time(NaiveTime::MIN);
    Bucket {
        key: BucketKey::Date(date),
        date,
        start,
        end: start + Duration::days(1),
        column: date.weekday().num_days_from_sunday(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_has_one_bucket_per_day() {
        for (m, days) in [(1, 31), (2, 29), (4, 30), (12, 31)] {
            let layout = ViewWindow::new(Granularity::Month, date(2024, m, 15))
                .layout()
                .unwrap();
            assert_eq!(layout.buckets.len(), days);
        }
        let layout = ViewWindow::new(Granularity::Month, date(2023, 2, 1))
            .layout()
            .unwrap();
        assert_eq!(layout.buckets.len(), 28);
    }

    #[test]
    fn month_range_and_leading_blanks() {
        // June 1st 2024 is a Saturday.
        let layout = ViewWindow::new(Granularity::Month, date(2024, 6, 20))
            .layout()
            .unwrap();
        assert_eq!(layout.range_start, date(2024, 6, 1).and_time(NaiveTime::MIN));
        assert_eq!(layout.range_end, date(2024, 7, 1).and_time(NaiveTime::MIN));
        assert_eq!(layout.leading_blanks, 6);
        assert_eq!(layout.buckets[1].column, 0);
        assert_eq!(layout.buckets[1].key, BucketKey::Date(date(2024, 6, 2)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = ViewWindow::new(Granularity::Month, date(2024, 12, 31))
            .range()
            .unwrap();
        assert_eq!(start.date(), date(2024, 12, 1));
        assert_eq!(end.date(), date(2025, 1, 1));
    }

    #[test]
    fn week_starts_on_sunday() {
        // Wednesday
        let layout = ViewWindow::new(Granularity::Week, date(2024, 6, 12))
            .layout()
            .unwrap();
        assert_eq!(layout.buckets.len(), 7);
        assert_eq!(layout.range_start.date(), date(2024, 6, 9));
        assert_eq!(layout.range_end.date(), date(2024, 6, 16));
        let columns: Vec<_> = layout.buckets.iter().map(|b| b.column).collect();
        assert_eq!(columns, vec![0, 1, 2, 3, 4, 5, 6]);

        // A Sunday anchor is its own week start.
        let (start, _) = ViewWindow::new(Granularity::Week, date(2024, 6, 9))
            .range()
            .unwrap();
        assert_eq!(start.date(), date(2024, 6, 9));
    }

    #[test]
    fn day_has_24_hour_buckets() {
        let layout = ViewWindow::new(Granularity::Day, date(2024, 3, 15))
            .layout()
            .unwrap();
        assert_eq!(layout.buckets.len(), 24);
        assert_eq!(layout.buckets[0].key, BucketKey::Hour(0));
        assert_eq!(layout.buckets[23].key, BucketKey::Hour(23));
        assert_eq!(layout.buckets[23].end, layout.range_end);
        assert!(layout.buckets.iter().all(|b| b.date == date(2024, 3, 15)));
    }

    #[test]
    fn unknown_granularity_is_an_error() {
        assert_eq!("Week".parse::<Granularity>(), Ok(Granularity::Week));
        assert_eq!(
            "fortnight".parse::<Granularity>(),
            Err(PlannerError::UnknownGranularity("fortnight".to_string()))
        );
    }

    #[test]
    fn range_overflow_is_an_error() {
        let window = ViewWindow::new(Granularity::Day, NaiveDate::MAX);
        assert_eq!(window.range(), Err(PlannerError::OutOfRange(NaiveDate::MAX)));
        assert!(window.next().is_err());
    }

    #[test]
    fn next_then_previous_round_trips() {
        for granularity in [Granularity::Month, Granularity::Week, Granularity::Day] {
            let window = ViewWindow::new(granularity, date(2024, 6, 28));
            assert_eq!(window.next().unwrap().previous().unwrap(), window);
            assert_eq!(window.previous().unwrap().next().unwrap(), window);
        }
    }

    #[test]
    fn month_steps_clamp_to_last_valid_day() {
        let window = ViewWindow::new(Granularity::Month, date(2024, 1, 31));
        let next = window.next().unwrap();
        assert_eq!(next.anchor, date(2024, 2, 29));
        assert_eq!(next.previous().unwrap().anchor, date(2024, 1, 29));
    }

    #[test]
    fn steps_move_by_one_unit() {
        let anchor = date(2024, 6, 12);
        assert_eq!(
            ViewWindow::new(Granularity::Week, anchor).next().unwrap().anchor,
            date(2024, 6, 19)
        );
        assert_eq!(
            ViewWindow::new(Granularity::Day, anchor).previous().unwrap().anchor,
            date(2024, 6, 11)
        );
        assert_eq!(
            ViewWindow::new(Granularity::Month, anchor).previous().unwrap().anchor,
            date(2024, 5, 12)
        );
    }

    #[test]
    fn granularity_change_keeps_anchor() {
        let window = ViewWindow::new(Granularity::Month, date(2024, 6, 12));
        let week = window.set_granularity(Granularity::Week);
        assert_eq!(week, ViewWindow::new(Granularity::Week, date(2024, 6, 12)));
    }

    #[test]
    fn go_to_keeps_granularity() {
        let window = ViewWindow::new(Granularity::Week, date(2024, 6, 12));
        let moved = window.go_to(date(2025, 1, 1));
        assert_eq!(moved, ViewWindow::new(Granularity::Week, date(2025, 1, 1)));
        assert_eq!(window.go_to_today().granularity, Granularity::Week);
    }

    #[test]
    fn drilling_from_month_lands_on_day() {
        let window = ViewWindow::new(Granularity::Month, date(2024, 6, 1));
        let layout = window.layout().unwrap();
        let bucket = layout.bucket_for_date(date(2024, 6, 18)).unwrap();
        assert_eq!(
            window.drill_into(bucket),
            ViewWindow::new(Granularity::Day, date(2024, 6, 18))
        );

        let week = ViewWindow::new(Granularity::Week, date(2024, 6, 12));
        let layout = week.layout().unwrap();
        assert_eq!(
            week.drill_into(&layout.buckets[0]),
            ViewWindow::new(Granularity::Day, date(2024, 6, 9))
        );

        let day = ViewWindow::new(Granularity::Day, date(2024, 6, 12));
        let layout = day.layout().unwrap();
        assert_eq!(day.drill_into(&layout.buckets[9]), day);
    }
}
