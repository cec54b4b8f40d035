use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("error: Unknown granularity \"{0}\" (expected month, week or day)")]
    UnknownGranularity(String),
    #[error("error: Calendar arithmetic around {0} is out of range")]
    OutOfRange(NaiveDate),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
