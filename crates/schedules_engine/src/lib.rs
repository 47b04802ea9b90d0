//! Checkpoint scheduling algorithms: the optimal multi-level H-Revolve
//! dynamic program and the simpler, restartable two-level
//! periodic/binomial scheme.
//!
//! Everything here produces a stream of [`schedules_core::Action`]s;
//! the vocabulary and error taxonomy themselves live in
//! [`schedules_core`], not here.

mod adapter;
mod binomial;
mod config;
mod operation;
mod schedule;
mod sequence_builder;
mod table;
mod two_level;

pub use adapter::HRevolveActions;
pub use binomial::{n_advance, Trajectory};
pub use config::{ScheduleParams, StorageLevels};
pub use schedule::{HRevolveSchedule, TwoLevelSchedule};
pub use two_level::TwoLevelActions;

pub use schedules_core::{Action, ScheduleError, ScheduleResult, StorageType};
