mod planner;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::planner::{commands, data::Store, window::Granularity};

#[derive(Parser)]
#[clap(about)]
/// A CLI for browsing service assignments, events and bookings on a calendar
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Set the JSON file that documents are read from
    Source {
        /// Path to a JSON array of documents
        path: PathBuf,
    },
    /// Display the records in the current view
    Show {
        /// Maximum number of records to show per bucket
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Move the view forward by one month, week or day
    Next,
    /// Move the view back by one month, week or day
    Prev,
    /// Move the view to today
    Today,
    /// Change the view granularity, keeping the current date
    Zoom {
        /// One of [month], [week] or [day]
        #[arg(value_parser = parse_granularity)]
        granularity: Granularity,
    },
    /// Move the view to a specific date
    Goto {
        /// The date [dd/mm/yy]
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Open the day view for a date in the current view
    Drill {
        /// The date [dd/mm/yy]
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Only show records matching a free-text query
    ///
    /// Omit <QUERY> to clear the search
    Search {
        #[arg(value_parser = parse_query)]
        query: Option<String>,
    },
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        println!("{e}");
    }
}

fn run() -> Result<()> {
    let cli = Cli::try_parse()?;
    let store = Store::open()?;

    match cli.command {
        Command::Source { path } => commands::source(&store, path),
        Command::Show { limit } => commands::show(&store, limit),
        Command::Next => commands::next(&store),
        Command::Prev => commands::previous(&store),
        Command::Today => commands::today(&store),
        Command::Zoom { granularity } => commands::zoom(&store, granularity),
        Command::Goto { date } => commands::goto(&store, date),
        Command::Drill { date } => commands::drill(&store, date),
        Command::Search { query } => commands::search(&store, query),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PLANNER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_granularity(s: &str) -> Result<Granularity, String> {
    s.parse().map_err(|e: planner::error::PlannerError| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%d/%m/%y")
        .map_err(|_| "date must be in the form [dd/mm/yy]".to_string())
}

fn parse_query(s: &str) -> Result<String, String> {
    Ok(s.trim().to_string())
}
