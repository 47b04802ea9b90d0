//! Public storage and action types surfaced to a checkpoint-schedule consumer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A tier of the memory hierarchy a schedule can name.
///
/// `Ram` and `Disk` are the two durable levels a schedule writes
/// checkpoints into; `FwdRestart` and `AdjDeps` are ephemeral slots
/// used internally by the two-level driver to hold, respectively, the
/// live forward state used to restart a sub-trajectory and the state
/// captured at a step for that step's own adjoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StorageType {
    /// Fast, volatile storage (level 0 in the conventional ordering).
    Ram,
    /// Slow, durable storage (the highest-indexed level).
    Disk,
    /// Ephemeral slot holding the live forward state usable to restart.
    FwdRestart,
    /// State captured at a step for that step's adjoint.
    AdjDeps,
}

impl StorageType {
    /// Maps a 0-indexed DP level number to a durable [`StorageType`].
    ///
    /// Level `0` is always `Ram`; any other level is `Disk`. H-Revolve's
    /// cost table supports more than two levels in principle, but the
    /// public action stream only distinguishes RAM from disk (§3).
    pub fn from_level(level: usize) -> Self {
        match level {
            0 => StorageType::Ram,
            _ => StorageType::Disk,
        }
    }
}

/// A public, high-level instruction emitted to the consumer driving a
/// checkpoint schedule.
///
/// The consumer pulls these one at a time from [`crate::ScheduleError`]-
/// fallible iterators (see the concrete schedule types in
/// `schedules_engine`) and executes each before pulling the next.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    /// Drop cached initial conditions / adjoint data.
    Clear {
        /// Clear cached initial conditions.
        clear_ics: bool,
        /// Clear cached adjoint-dependency data.
        clear_data: bool,
    },
    /// The next forward interval must (or must not) store initial
    /// conditions / data needed by the adjoint.
    Configure {
        /// Store initial conditions for the next forward interval.
        store_ics: bool,
        /// Store adjoint-dependency data for the next forward interval.
        store_data: bool,
    },
    /// Advance the forward solver from step `n0` to `n1` (`n1 > n0`).
    Forward {
        /// Starting step (inclusive).
        n0: usize,
        /// Ending step (exclusive of further forward work).
        n1: usize,
        /// Whether initial conditions should be stored for this interval.
        store_ics: bool,
        /// Whether adjoint-dependency data should be stored for this interval.
        store_data: bool,
        /// Storage the interval's checkpoint (if any) should land in.
        storage: Option<StorageType>,
    },
    /// Advance the adjoint solver from step `n1` down to `n0` (`n1 > n0`).
    Reverse {
        /// Starting step (inclusive, the higher index).
        n1: usize,
        /// Ending step (inclusive, the lower index).
        n0: usize,
        /// Whether the adjoint-dependency data for this step may be cleared
        /// once this action completes.
        clear_adj_deps: bool,
    },
    /// Restore the checkpoint for step `n` from `storage`.
    Read {
        /// Step whose checkpoint is being restored.
        n: usize,
        /// Storage tier the checkpoint is read from.
        storage: StorageType,
        /// Whether the slot should be freed once the read completes.
        delete: bool,
    },
    /// Persist a checkpoint for step `n` into `storage`.
    Write {
        /// Step being checkpointed.
        n: usize,
        /// Storage tier the checkpoint is written into.
        storage: StorageType,
    },
    /// Relocate a checkpoint between storage kinds, retaining the source.
    Copy {
        /// Step whose checkpoint is being relocated.
        n: usize,
        /// Source storage tier.
        from: StorageType,
        /// Destination storage tier.
        to: StorageType,
    },
    /// Relocate a checkpoint between storage kinds, freeing the source.
    Move {
        /// Step whose checkpoint is being relocated.
        n: usize,
        /// Source storage tier.
        from: StorageType,
        /// Destination storage tier.
        to: StorageType,
    },
    /// Terminal marker for the forward pass.
    EndForward,
    /// Terminal marker for a reverse pass.
    EndReverse {
        /// `true` when the schedule cannot be restarted.
        exhausted: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_is_ram() {
        assert_eq!(StorageType::from_level(0), StorageType::Ram);
    }

    #[test]
    fn any_other_level_is_disk() {
        assert_eq!(StorageType::from_level(1), StorageType::Disk);
        assert_eq!(StorageType::from_level(7), StorageType::Disk);
    }

    #[test]
    fn action_equality_ignores_nothing() {
        let a = Action::Reverse {
            n1: 5,
            n0: 4,
            clear_adj_deps: true,
        };
        let b = Action::Reverse {
            n1: 5,
            n0: 4,
            clear_adj_deps: false,
        };
        assert_ne!(a, b);
    }
}
