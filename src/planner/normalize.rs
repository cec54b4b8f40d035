use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::planner::{CalendarRecord, RecordKind};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A timestamp as it arrives from the document source.
///
/// Variants are tried in declaration order when deserializing, which is also
/// the order [`RawTime::resolve`] trusts them in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Native(NaiveDateTime),
    Epoch(i64),
    EpochFloat(f64),
    Stamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Text(String),
    Other(serde_json::Value),
}

impl RawTime {
    /// Resolves to a wall-clock time in `zone`, or `None` if nothing parses.
    pub fn resolve<Tz: TimeZone>(&self, zone: &Tz) -> Option<NaiveDateTime> {
        match self {
            RawTime::Native(naive) => Some(*naive),
            RawTime::Epoch(secs) => from_epoch(*secs, 0, zone),
            RawTime::EpochFloat(secs) => from_epoch_float(*secs, zone),
            RawTime::Stamp {
                seconds,
                nanoseconds,
            } => from_epoch(*seconds, *nanoseconds, zone),
            RawTime::Text(text) => parse_text(text.trim(), zone),
            RawTime::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentDoc {
    pub id: String,
    pub sa_number: String,
    pub project_name: String,
    pub service_type: String,
    pub location: String,
    pub assigned_to: String,
    pub remarks: String,
    pub status: String,
    pub alarm_date: Option<RawTime>,
    pub coverage_start: Option<RawTime>,
    pub coverage_end: Option<RawTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDoc {
    pub id: String,
    pub title: String,
    pub event_type: String,
    pub location: String,
    pub description: String,
    pub status: String,
    pub start: Option<RawTime>,
    pub end: Option<RawTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingDoc {
    pub id: String,
    pub site: String,
    pub client: String,
    pub notes: String,
    pub status: String,
    pub start: Option<RawTime>,
    pub end: Option<RawTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawDocument {
    Assignment(AssignmentDoc),
    Event(EventDoc),
    Booking(BookingDoc),
}

pub fn normalize<Tz: TimeZone>(doc: &RawDocument, zone: &Tz) -> CalendarRecord {
    let record = match doc {
        RawDocument::Assignment(doc) => assignment(doc, zone),
        RawDocument::Event(doc) => event(doc, zone),
        RawDocument::Booking(doc) => booking(doc, zone),
    };
    if record.placement().is_none() {
        debug!(id = %record.id, kind = ?record.kind, "record has no usable time, kept for search only");
    }
    record
}

pub fn normalize_all<Tz: TimeZone>(docs: &[RawDocument], zone: &Tz) -> Vec<CalendarRecord> {
    docs.iter().map(|doc| normalize(doc, zone)).collect()
}

fn assignment<Tz: TimeZone>(doc: &AssignmentDoc, zone: &Tz) -> CalendarRecord {
    let title = first_non_empty(&[&doc.project_name, &doc.service_type])
        .map(str::to_string)
        .or_else(|| (!doc.sa_number.is_empty()).then(|| format!("SA#{}", doc.sa_number)))
        .unwrap_or_else(|| doc.id.clone());
    let anchor_time = resolve(&doc.alarm_date, zone);
    let (interval_start, interval_end) = if anchor_time.is_some() {
        (None, None)
    } else {
        match (
            resolve(&doc.coverage_start, zone),
            resolve(&doc.coverage_end, zone),
        ) {
            (Some(start), Some(end)) => (Some(start), Some(end)),
            _ => (None, None),
        }
    };
    CalendarRecord {
        id: doc.id.clone(),
        kind: RecordKind::Assignment,
        searchable_fields: searchable(&[
            &title,
            &doc.sa_number,
            &doc.location,
            &doc.assigned_to,
            &doc.remarks,
        ]),
        title,
        anchor_time,
        interval_start,
        interval_end,
        status: doc.status.clone(),
    }
}

fn event<Tz: TimeZone>(doc: &EventDoc, zone: &Tz) -> CalendarRecord {
    let title = if doc.title.is_empty() {
        doc.id.clone()
    } else {
        doc.title.clone()
    };
    CalendarRecord {
        id: doc.id.clone(),
        kind: RecordKind::Event,
        searchable_fields: searchable(&[&title, &doc.event_type, &doc.location, &doc.description]),
        title,
        anchor_time: resolve(&doc.start, zone),
        interval_start: None,
        interval_end: resolve(&doc.end, zone),
        status: doc.status.clone(),
    }
}

fn booking<Tz: TimeZone>(doc: &BookingDoc, zone: &Tz) -> CalendarRecord {
    let title = match (doc.site.is_empty(), doc.client.is_empty()) {
        (false, false) => format!("{} - {}", doc.site, doc.client),
        (false, true) => doc.site.clone(),
        (true, false) => doc.client.clone(),
        (true, true) => doc.id.clone(),
    };
    let (interval_start, interval_end) = match (resolve(&doc.start, zone), resolve(&doc.end, zone))
    {
        (Some(start), Some(end)) => (Some(start), Some(end)),
        _ => (None, None),
    };
    CalendarRecord {
        id: doc.id.clone(),
        kind: RecordKind::Booking,
        searchable_fields: searchable(&[&doc.site, &doc.client, &doc.notes]),
        title,
        anchor_time: None,
        interval_start,
        interval_end,
        status: doc.status.clone(),
    }
}

fn resolve<Tz: TimeZone>(raw: &Option<RawTime>, zone: &Tz) -> Option<NaiveDateTime> {
    let resolved = raw.as_ref()?.resolve(zone);
    if resolved.is_none() {
        trace!(raw = ?raw, "unparseable timestamp treated as absent");
    }
    resolved
}

fn from_epoch<Tz: TimeZone>(secs: i64, nanos: u32, zone: &Tz) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, nanos).and_then(|utc| in_zone(utc.naive_utc(), zone))
}

/// Wall-clock time of a UTC instant in `zone`, or `None` past chrono's range.
fn in_zone<Tz: TimeZone>(utc: NaiveDateTime, zone: &Tz) -> Option<NaiveDateTime> {
    utc.checked_add_offset(zone.offset_from_utc_datetime(&utc).fix())
}

fn from_epoch_float<Tz: TimeZone>(secs: f64, zone: &Tz) -> Option<NaiveDateTime> {
    if !secs.is_finite() || secs.abs() > i64::MAX as f64 {
        return None;
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    from_epoch(whole as i64, nanos, zone)
}

fn parse_text<Tz: TimeZone>(text: &str, zone: &Tz) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(secs) = text.parse::<i64>() {
        return from_epoch(secs, 0, zone);
    }
    if let Ok(secs) = text.parse::<f64>() {
        if secs.is_finite() {
            return from_epoch_float(secs, zone);
        }
    }
    if let Ok(fixed) = DateTime::parse_from_rfc3339(text) {
        return in_zone(fixed.naive_utc(), zone);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

fn first_non_empty<'a>(values: &[&'a String]) -> Option<&'a str> {
    values
        .iter()
        .copied()
        .find(|value| !value.trim().is_empty())
        .map(String::as_str)
}

fn searchable(values: &[&String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
        .collect()
}
