//! Fatal-error taxonomy for checkpoint-schedule construction and emission.
//!
//! All variants are terminal: emission stops and the condition is
//! surfaced to the consumer. There is no retry and no partial recovery.
//! Actions already emitted remain valid observations.

use thiserror::Error;

/// Errors raised while configuring, building, or driving a checkpoint
/// schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Raised at construction time for parameters that can never produce
    /// a valid schedule (non-positive period, both slot counts zero,
    /// mismatched level-vector lengths, unsupported storage kind, ...).
    #[error("invalid schedule configuration: {0}")]
    Configuration(String),

    /// The cost-table recurrence reached a subproblem of positive length
    /// with zero memory at every level. Raised by the sequence builder.
    #[error("no memory available to schedule {length} remaining step(s)")]
    NoMemory {
        /// The length of the unschedulable subproblem.
        length: usize,
    },

    /// The raw operation stream violates an ordering rule (unmatched
    /// `Discard`, a `Forwards` pair with `n1 <= n0`, an unknown kind).
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// The engine's tracked state (`n`, `r`, live snapshots) diverged
    /// from what the next operation presumes.
    #[error("invalid checkpointing state: {0}")]
    InvalidCheckpointingState(String),
}

/// Convenience alias for fallible checkpoint-schedule operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_memory_display_includes_length() {
        let err = ScheduleError::NoMemory { length: 3 };
        assert!(format!("{err}").contains('3'));
    }

    #[test]
    fn configuration_display_includes_message() {
        let err = ScheduleError::Configuration("period must be positive".to_string());
        assert!(format!("{err}").contains("period must be positive"));
    }
}
