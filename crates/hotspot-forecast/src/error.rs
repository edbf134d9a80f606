//! Forecast pipeline error types.

use thiserror::Error;

/// Errors that abort a single forecast cycle.
///
/// None of these are fatal to the fetch loop; the cycle is skipped and
/// the next timer tick tries again.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("invalid forecast: {0}")]
    InvalidForecast(String),

    #[error("no table exceeded the load threshold")]
    NoHotSignal,

    #[error("forecast fetch failed: {0}")]
    FetchFailed(String),
}

pub type ForecastResult<T> = Result<T, ForecastError>;
