//! Schedule façade (Component F): the two public entry points,
//! [`HRevolveSchedule`] and [`TwoLevelSchedule`], each exposing the same
//! small surface — build once, call `iter()` once to get the action
//! stream, and query storage usage before or after.

use schedules_core::{ScheduleError, ScheduleResult, StorageType};

use crate::adapter::HRevolveActions;
use crate::binomial::Trajectory;
use crate::config::{ScheduleParams, StorageLevels};
use crate::sequence_builder::recurse;
use crate::table;
use crate::two_level::TwoLevelActions;

/// An optimal multi-level H-Revolve schedule for a computation of
/// exactly `max_n` steps, built eagerly at construction time (§4.F,
/// §6). [`Self::iter`] consumes it into a single-use action stream;
/// Rust's ownership rules make a second call a compile error rather
/// than the runtime "programmer error" the reference documents.
pub struct HRevolveSchedule {
    max_n: usize,
    snapshots_in_ram: usize,
    snapshots_on_disk: usize,
    schedule: Vec<crate::operation::Operation>,
}

impl HRevolveSchedule {
    /// Builds the cost tables and the full operation sequence for
    /// `max_n` steps over `levels`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Configuration`] if `max_n == 0`, and
    /// propagates any [`ScheduleError`] raised while building the cost
    /// tables or the sequence (most commonly
    /// [`ScheduleError::NoMemory`] when no level has a single slot).
    pub fn new(max_n: usize, levels: StorageLevels, params: ScheduleParams) -> ScheduleResult<Self> {
        if max_n == 0 {
            return Err(ScheduleError::Configuration(
                "max_n must be at least 1".to_string(),
            ));
        }
        if levels.cvect.iter().all(|&c| c == 0) {
            return Err(ScheduleError::Configuration(
                "snapshots_in_ram and snapshots_on_disk must not both be zero".to_string(),
            ));
        }
        let tables = table::build(max_n, &levels, params)?;
        let top_level = levels.levels() - 1;
        let top_slots = levels.cvect[top_level];
        let sequence = recurse(&tables, &levels, params, max_n, top_level, top_slots)?;

        let snapshots_in_ram = levels.cvect[0];
        let snapshots_on_disk = if levels.levels() > 1 {
            levels.cvect[1]
        } else {
            0
        };

        Ok(Self {
            max_n,
            snapshots_in_ram,
            snapshots_on_disk,
            schedule: sequence.0,
        })
    }

    /// Consumes the schedule into its single-use action stream.
    pub fn iter(self) -> HRevolveActions {
        HRevolveActions::new(
            self.max_n,
            self.snapshots_in_ram,
            self.snapshots_on_disk,
            self.schedule,
        )
    }
}

/// A restartable two-level (periodic disk / binomial RAM) schedule
/// (§4.D, §6). Unlike [`HRevolveSchedule`] this builds nothing at
/// construction time — the action stream is generated lazily, step by
/// step, as the consumer pulls from it.
pub struct TwoLevelSchedule {
    period: usize,
    binomial_snapshots: usize,
    binomial_storage: StorageType,
    trajectory: Trajectory,
}

impl TwoLevelSchedule {
    /// # Errors
    ///
    /// Returns [`ScheduleError::Configuration`] if `period == 0`, or
    /// `binomial_storage` is not `Ram` or `Disk` (the
    /// `FwdRestart`/`AdjDeps` kinds are internal-only).
    /// `binomial_snapshots == 0` is accepted (§6: `binomial_snapshots:
    /// int ≥ 0`) — the two-level driver's `+1` bias when deriving
    /// `n_advance`'s snapshot budget (see `two_level.rs`) means zero
    /// spare snapshots still yields a valid, minimal binomial schedule.
    pub fn new(
        period: usize,
        binomial_snapshots: usize,
        binomial_storage: StorageType,
        trajectory: Trajectory,
    ) -> ScheduleResult<Self> {
        if period == 0 {
            return Err(ScheduleError::Configuration(
                "period must be at least 1".to_string(),
            ));
        }
        if !matches!(binomial_storage, StorageType::Ram | StorageType::Disk) {
            return Err(ScheduleError::Configuration(
                "binomial_storage must be Ram or Disk".to_string(),
            ));
        }
        Ok(Self {
            period,
            binomial_snapshots,
            binomial_storage,
            trajectory,
        })
    }

    /// Consumes the schedule into its (restartable) action stream.
    pub fn iter(self) -> TwoLevelActions {
        TwoLevelActions::new(
            self.period,
            self.binomial_snapshots,
            self.binomial_storage,
            self.trajectory,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrevolve_rejects_zero_length() {
        let levels = StorageLevels::two_level(2, 0, (0.0, 0.1), (0.0, 0.1));
        let err = HRevolveSchedule::new(0, levels, ScheduleParams::default()).unwrap_err();
        assert!(matches!(err, ScheduleError::Configuration(_)));
    }

    #[test]
    fn hrevolve_max_n_one_ram_one_builds_and_terminates() {
        let levels = StorageLevels::two_level(1, 0, (0.0, 0.1), (0.0, 0.1));
        let schedule = HRevolveSchedule::new(1, levels, ScheduleParams::default()).unwrap();
        let mut actions = schedule.iter();
        for result in actions.by_ref() {
            result.unwrap();
        }
        assert!(actions.is_exhausted());
    }

    #[test]
    fn hrevolve_reports_storage_usage_from_slot_counts() {
        let levels = StorageLevels::two_level(2, 3, (0.0, 0.1), (0.0, 0.2));
        let schedule = HRevolveSchedule::new(4, levels, ScheduleParams::default()).unwrap();
        let actions = schedule.iter();
        assert!(actions.uses_storage_type(StorageType::Ram));
        assert!(actions.uses_storage_type(StorageType::Disk));
        assert!(actions.uses_disk_storage());
    }

    #[test]
    fn hrevolve_without_any_slots_is_a_configuration_error() {
        let levels = StorageLevels::two_level(0, 0, (0.0, 0.1), (0.0, 0.1));
        let err = HRevolveSchedule::new(3, levels, ScheduleParams::default()).unwrap_err();
        assert!(matches!(err, ScheduleError::Configuration(_)));
    }

    #[test]
    fn two_level_rejects_zero_period() {
        assert!(matches!(
            TwoLevelSchedule::new(0, 2, StorageType::Ram, Trajectory::Maximum),
            Err(ScheduleError::Configuration(_))
        ));
    }

    #[test]
    fn two_level_accepts_zero_binomial_snapshots() {
        assert!(TwoLevelSchedule::new(4, 0, StorageType::Ram, Trajectory::Maximum).is_ok());
    }

    #[test]
    fn two_level_rejects_ephemeral_storage_kinds() {
        let err =
            TwoLevelSchedule::new(4, 2, StorageType::FwdRestart, Trajectory::Maximum).unwrap_err();
        assert!(matches!(err, ScheduleError::Configuration(_)));
    }

    #[test]
    fn two_level_builds_and_can_be_finalized() {
        let schedule = TwoLevelSchedule::new(4, 2, StorageType::Ram, Trajectory::Maximum).unwrap();
        let mut actions = schedule.iter();
        actions.next();
        actions.finalize(12).unwrap();
        assert!(!actions.is_exhausted());
    }
}
