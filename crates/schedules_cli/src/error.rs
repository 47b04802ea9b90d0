//! CLI-local error type. Wraps the engine's [`schedules_core::ScheduleError`]
//! alongside argument- and I/O-level failures the CLI itself can hit.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Schedule(#[from] schedules_core::ScheduleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
