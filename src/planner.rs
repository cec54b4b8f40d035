pub mod assign;
pub mod commands;
pub mod data;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod window;

use std::fmt;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::planner::{
    assign::BucketMap,
    error::PlannerResult,
    window::{Layout, ViewWindow},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Assignment,
    Event,
    Booking,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Assignment => "assignment",
            RecordKind::Event => "event",
            RecordKind::Booking => "booking",
        };
        write!(f, "{name}")
    }
}

/// A source document reduced to what the calendar needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarRecord {
    pub id: String,
    pub kind: RecordKind,
    pub title: String,
    pub anchor_time: Option<NaiveDateTime>,
    pub interval_start: Option<NaiveDateTime>,
    pub interval_end: Option<NaiveDateTime>,
    /// Lower-cased.
    pub searchable_fields: Vec<String>,
    pub status: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Point(NaiveDateTime),
    Span(NaiveDateTime, NaiveDateTime),
}

impl CalendarRecord {
    /// How the record is placed on the calendar. An anchor time wins over an
    /// interval; `None` means the record cannot be scheduled.
    pub fn placement(&self) -> Option<Placement> {
        match (self.anchor_time, self.interval_start, self.interval_end) {
            (Some(time), _, _) => Some(Placement::Point(time)),
            (None, Some(start), Some(end)) => Some(Placement::Span(start, end)),
            _ => None,
        }
    }

    fn sort_key(&self) -> (Option<NaiveDateTime>, &str) {
        (self.anchor_time.or(self.interval_start), &self.id)
    }
}

pub struct Agenda<'a> {
    pub window: ViewWindow,
    pub layout: Layout,
    pub buckets: BucketMap<'a>,
    pub matched: usize,
}

/// Filters `records` by `query` and assigns the survivors to the buckets of
/// `window`. Pure: the same inputs always give the same agenda.
pub fn agenda<'a>(
    records: &'a [CalendarRecord],
    query: &str,
    window: &ViewWindow,
) -> PlannerResult<Agenda<'a>> {
    let layout = window.layout()?;
    let matched = filter::filter(records, query);
    debug!(
        total = records.len(),
        matched = matched.len(),
        %window,
        "building agenda"
    );
    let buckets = assign::assign(&matched, &layout);
    Ok(Agenda {
        window: *window,
        layout,
        buckets,
        matched: matched.len(),
    })
}
