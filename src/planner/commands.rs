use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::planner::{
    agenda,
    data::{load_documents, State, Store},
    normalize::normalize_all,
    window::{Granularity, ViewWindow},
    Agenda, CalendarRecord, Placement,
};

pub fn source(store: &Store, path: PathBuf) -> Result<()> {
    let path = fs::canonicalize(&path)
        .with_context(|| format!("error: No documents file at {}", path.display()))?;
    let mut state = store.read()?;
    state.source = Some(path.clone());
    store.write(&state)?;
    println!("Reading documents from {}", path.display());
    Ok(())
}

pub fn show(store: &Store, limit: Option<usize>) -> Result<()> {
    let state = store.read()?;
    let Some(path) = &state.source else {
        bail!("error: No documents file set, use `planner source <PATH>` first");
    };
    let records = normalize_all(&load_documents(path)?, &Local);
    let agenda = agenda(&records, &state.query, &state.window)?;
    print!("{}", render(&agenda, &state.query, records.len(), limit));
    Ok(())
}

pub fn next(store: &Store) -> Result<()> {
    update(store, |state| Ok(state.window.next()?))
}

pub fn previous(store: &Store) -> Result<()> {
    update(store, |state| Ok(state.window.previous()?))
}

pub fn today(store: &Store) -> Result<()> {
    update(store, |state| Ok(state.window.go_to_today()))
}

pub fn zoom(store: &Store, granularity: Granularity) -> Result<()> {
    update(store, |state| Ok(state.window.set_granularity(granularity)))
}

pub fn goto(store: &Store, date: NaiveDate) -> Result<()> {
    update(store, |state| Ok(state.window.go_to(date)))
}

pub fn drill(store: &Store, date: NaiveDate) -> Result<()> {
    update(store, |state| {
        let layout = state.window.layout()?;
        let window = state.window;
        match layout.bucket_for_date(date) {
            Some(bucket) => Ok(window.drill_into(bucket)),
            None => bail!(
                "error: {} is not in the current view ({window})",
                date.format("%d/%m/%y")
            ),
        }
    })
}

pub fn search(store: &Store, query: Option<String>) -> Result<()> {
    let mut state = store.read()?;
    state.query = query.unwrap_or_default();
    store.write(&state)?;
    if state.query.is_empty() {
        println!("Cleared search");
    } else {
        println!("Searching for \"{}\"", state.query);
    }
    Ok(())
}

fn update(store: &Store, f: impl FnOnce(&State) -> Result<ViewWindow>) -> Result<()> {
    let mut state = store.read()?;
    state.window = f(&state)?;
    store.write(&state)?;
    println!("Viewing {}", state.window);
    Ok(())
}

fn render(agenda: &Agenda<'_>, query: &str, total: usize, limit: Option<usize>) -> String {
    let mut lines = vec![if query.is_empty() {
        format!("Viewing {}", agenda.window)
    } else {
        format!(
            "Viewing {}, matching \"{query}\" ({} of {total})",
            agenda.window, agenda.matched
        )
    }];

    for bucket in &agenda.layout.buckets {
        let Some(records) = agenda.buckets.get(&bucket.key).filter(|r| !r.is_empty()) else {
            continue;
        };
        lines.push(bucket.key.to_string());
        let shown = limit.unwrap_or(records.len()).min(records.len());
        lines.extend(
            records[..shown]
                .iter()
                .map(|record| format!("  {}", describe(record))),
        );
        if shown < records.len() {
            lines.push(format!("  +{} more", records.len() - shown));
        }
    }
    if lines.len() == 1 {
        lines.push("There are no scheduled records in this view".to_string());
    }
    lines.push(String::new());
    lines.join("\n")
}

fn describe(record: &CalendarRecord) -> String {
    let when = match record.placement() {
        Some(Placement::Point(time)) => time.format("%R").to_string(),
        Some(Placement::Span(start, end)) => range_to_string(start, end),
        None => String::new(),
    };
    if record.status.is_empty() {
        format!("{when} [{}] {}", record.kind, record.title)
    } else {
        format!("{when} [{}] {} ({})", record.kind, record.title, record.status)
    }
}

fn range_to_string(from: NaiveDateTime, to: NaiveDateTime) -> String {
    let to_format = if from.date() == to.date() {
        "%R"
    } else {
        "%d/%m/%y %R"
    };
    format!("{} to {}", from.format("%d/%m/%y %R"), to.format(to_format))
}
