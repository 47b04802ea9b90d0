//! Two-level driver (Component D): periodic disk checkpoints on the
//! forward pass, binomial in-memory checkpoints on each reverse pass.
//!
//! Unlike H-Revolve this schedule is built directly against the public
//! [`Action`] vocabulary — there is no cost table and no intermediate
//! operation stream (§4.D). It is also restartable: a full reverse pass
//! ends with `EndReverse { exhausted: false }` and the driver loops back
//! to the top, ready to walk the adjoint again.
//!
//! This is a line-by-line translation of
//! `TwoLevelCheckpointSchedule._iterator` (`twolevel_binomial.py`),
//! desugared from a Python generator into an explicit state machine:
//! each `Phase` variant is one suspension point the generator would
//! have blocked at between `yield`s.

use std::collections::VecDeque;

use tracing::trace;

use schedules_core::{Action, ScheduleError, ScheduleResult, StorageType};

use crate::binomial::{n_advance, Trajectory};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    ForwardAdvancing,
    ForwardDone,
    ReverseOuterCheck,
    ReverseBlockSetup,
    ReverseInnerCheck,
    BinomialFirstAdvance,
    BinomialSubLoop,
    ReverseStep,
    ReverseBlockDone,
    ResetReverse,
}

/// Iterator over the public [`Action`] stream for a two-level schedule.
/// Produced by [`crate::schedule::TwoLevelSchedule::iter`]. `max_n` is
/// not known up front — call [`TwoLevelActions::finalize`] once the
/// forward pass has actually reached the end of the computation; until
/// then each pull advances the forward solver by another `period`.
pub struct TwoLevelActions {
    period: usize,
    binomial_snapshots: usize,
    binomial_storage: StorageType,
    trajectory: Trajectory,
    max_n: Option<usize>,
    n: usize,
    r: usize,
    phase: Phase,
    n0s: usize,
    snapshots: Vec<usize>,
    queue: VecDeque<Action>,
    errored: bool,
}

impl TwoLevelActions {
    pub(crate) fn new(
        period: usize,
        binomial_snapshots: usize,
        binomial_storage: StorageType,
        trajectory: Trajectory,
    ) -> Self {
        Self {
            period,
            binomial_snapshots,
            binomial_storage,
            trajectory,
            max_n: None,
            n: 0,
            r: 0,
            phase: Phase::ForwardAdvancing,
            n0s: 0,
            snapshots: Vec::new(),
            queue: VecDeque::new(),
            errored: false,
        }
    }

    /// A two-level schedule never reports exhaustion: each reverse pass
    /// ends with a restartable `EndReverse { exhausted: false }`.
    pub fn is_exhausted(&self) -> bool {
        false
    }

    /// Whether this schedule can ever write to `t`. Mirrors the
    /// reference exactly: only the binomial slot is reported, even
    /// though the periodic forward pass always also writes to disk
    /// (queried separately via [`Self::uses_disk_storage`]).
    pub fn uses_storage_type(&self, t: StorageType) -> bool {
        t == self.binomial_storage
    }

    /// The periodic forward pass always checkpoints to disk.
    pub fn uses_disk_storage(&self) -> bool {
        true
    }

    /// Fixes the total step count once the forward solver has reached
    /// the end of the computation. Must be called exactly once, and
    /// only while the driver is still in its forward phase.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Configuration`] if called twice, or
    /// with `max_n == 0`.
    pub fn finalize(&mut self, max_n: usize) -> ScheduleResult<()> {
        if self.max_n.is_some() {
            return Err(ScheduleError::Configuration(
                "finalize called more than once".to_string(),
            ));
        }
        if max_n == 0 {
            return Err(ScheduleError::Configuration(
                "max_n must be at least 1".to_string(),
            ));
        }
        self.max_n = Some(max_n);
        Ok(())
    }

    fn max_n(&self) -> usize {
        self.max_n.expect("max_n is set before reverse phases run")
    }

    fn pump(&mut self) -> ScheduleResult<()> {
        while self.queue.is_empty() {
            self.step()?;
        }
        Ok(())
    }

    fn step(&mut self) -> ScheduleResult<()> {
        match self.phase {
            Phase::ForwardAdvancing => {
                if self.max_n.is_some() {
                    self.phase = Phase::ForwardDone;
                    return Ok(());
                }
                let n0 = self.n;
                let n1 = n0 + self.period;
                self.n = n1;
                self.queue.push_back(Action::Forward {
                    n0,
                    n1,
                    store_ics: true,
                    store_data: false,
                    storage: Some(StorageType::Disk),
                });
            }
            Phase::ForwardDone => {
                self.queue.push_back(Action::EndForward);
                self.phase = Phase::ReverseOuterCheck;
            }
            Phase::ReverseOuterCheck => {
                let max_n = self.max_n();
                if self.r >= max_n {
                    if self.r != max_n {
                        return Err(ScheduleError::InvalidCheckpointingState(
                            "reverse pass overshot max_n".to_string(),
                        ));
                    }
                    self.phase = Phase::ResetReverse;
                } else {
                    self.phase = Phase::ReverseBlockSetup;
                }
            }
            Phase::ReverseBlockSetup => {
                let max_n = self.max_n();
                let n = max_n - self.r - 1;
                let n0s = (n / self.period) * self.period;
                let n1s = (n0s + self.period).min(max_n);
                if self.r != max_n - n1s {
                    return Err(ScheduleError::InvalidCheckpointingState(
                        "reverse block boundaries are inconsistent with r".to_string(),
                    ));
                }
                self.n0s = n0s;
                self.snapshots = vec![n0s];
                self.phase = Phase::ReverseInnerCheck;
            }
            Phase::ReverseInnerCheck => {
                let max_n = self.max_n();
                if self.r >= max_n - self.n0s {
                    self.phase = Phase::ReverseBlockDone;
                    return Ok(());
                }
                let cp_n = *self.snapshots.last().ok_or_else(|| {
                    ScheduleError::InvalidCheckpointingState(
                        "binomial snapshot stack is empty".to_string(),
                    )
                })?;
                let target = max_n - self.r - 1;
                if cp_n == target {
                    self.snapshots.pop();
                    self.n = cp_n;
                    let action = if cp_n == self.n0s {
                        Action::Copy {
                            n: cp_n,
                            from: StorageType::Disk,
                            to: StorageType::FwdRestart,
                        }
                    } else {
                        Action::Move {
                            n: cp_n,
                            from: self.binomial_storage,
                            to: StorageType::FwdRestart,
                        }
                    };
                    self.queue.push_back(action);
                    self.phase = Phase::ReverseStep;
                } else {
                    self.n = cp_n;
                    let action = if cp_n == self.n0s {
                        Action::Copy {
                            n: cp_n,
                            from: StorageType::Disk,
                            to: StorageType::FwdRestart,
                        }
                    } else {
                        Action::Copy {
                            n: cp_n,
                            from: self.binomial_storage,
                            to: StorageType::FwdRestart,
                        }
                    };
                    self.queue.push_back(action);
                    self.phase = Phase::BinomialFirstAdvance;
                }
            }
            Phase::BinomialFirstAdvance => {
                let max_n = self.max_n();
                let n_snapshots = self.binomial_snapshots + 1 - self.snapshots.len() + 1;
                let n0 = self.n;
                let steps_remaining = max_n - self.r - n0;
                let advance = n_advance(steps_remaining, n_snapshots, self.trajectory)?;
                let n1 = n0 + advance;
                self.n = n1;
                self.queue.push_back(Action::Forward {
                    n0,
                    n1,
                    store_ics: false,
                    store_data: false,
                    storage: Some(StorageType::FwdRestart),
                });
                self.phase = Phase::BinomialSubLoop;
            }
            Phase::BinomialSubLoop => {
                let max_n = self.max_n();
                let target = max_n - self.r - 1;
                if self.n < target {
                    let n_snapshots = self.binomial_snapshots + 1 - self.snapshots.len();
                    let n0 = self.n;
                    let advance = n_advance(max_n - self.r - n0, n_snapshots, self.trajectory)?;
                    let n1 = n0 + advance;
                    self.n = n1;
                    self.queue.push_back(Action::Forward {
                        n0,
                        n1,
                        store_ics: true,
                        store_data: false,
                        storage: Some(self.binomial_storage),
                    });
                    if self.snapshots.len() >= self.binomial_snapshots + 1 {
                        return Err(ScheduleError::InvalidCheckpointingState(
                            "binomial snapshot budget exceeded".to_string(),
                        ));
                    }
                    self.snapshots.push(n0);
                } else {
                    if self.n != target {
                        return Err(ScheduleError::InvalidCheckpointingState(
                            "binomial sub-advance overshot the reverse target".to_string(),
                        ));
                    }
                    self.phase = Phase::ReverseStep;
                }
            }
            Phase::ReverseStep => {
                self.n += 1;
                self.queue.push_back(Action::Forward {
                    n0: self.n - 1,
                    n1: self.n,
                    store_ics: false,
                    store_data: true,
                    storage: Some(StorageType::AdjDeps),
                });
                self.r += 1;
                self.queue.push_back(Action::Reverse {
                    n1: self.n,
                    n0: self.n - 1,
                    clear_adj_deps: true,
                });
                self.phase = Phase::ReverseInnerCheck;
            }
            Phase::ReverseBlockDone => {
                let max_n = self.max_n();
                if self.r != max_n - self.n0s {
                    return Err(ScheduleError::InvalidCheckpointingState(
                        "reverse block did not consume the expected number of steps".to_string(),
                    ));
                }
                if !self.snapshots.is_empty() {
                    return Err(ScheduleError::InvalidCheckpointingState(
                        "binomial snapshot stack was not drained by the end of the block"
                            .to_string(),
                    ));
                }
                self.phase = Phase::ReverseOuterCheck;
            }
            Phase::ResetReverse => {
                self.r = 0;
                self.queue
                    .push_back(Action::EndReverse { exhausted: false });
                self.phase = Phase::ReverseOuterCheck;
            }
        }
        Ok(())
    }
}

impl Iterator for TwoLevelActions {
    type Item = ScheduleResult<Action>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.errored {
            return None;
        }
        if let Some(action) = self.queue.pop_front() {
            trace!(?action, "emitting action");
            return Some(Ok(action));
        }
        match self.pump() {
            Ok(()) => self.queue.pop_front().map(|action| {
                trace!(?action, "emitting action");
                Ok(action)
            }),
            Err(e) => {
                self.errored = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_phase_emits_period_sized_disk_chunks() {
        let mut actions = TwoLevelActions::new(4, 2, StorageType::Ram, Trajectory::Maximum);
        let first = actions.next().unwrap().unwrap();
        assert_eq!(
            first,
            Action::Forward {
                n0: 0,
                n1: 4,
                store_ics: true,
                store_data: false,
                storage: Some(StorageType::Disk),
            }
        );
        let second = actions.next().unwrap().unwrap();
        assert_eq!(
            second,
            Action::Forward {
                n0: 4,
                n1: 8,
                store_ics: true,
                store_data: false,
                storage: Some(StorageType::Disk),
            }
        );
    }

    #[test]
    fn finalize_ends_the_forward_phase() {
        let mut actions = TwoLevelActions::new(4, 2, StorageType::Ram, Trajectory::Maximum);
        actions.next();
        actions.next();
        actions.next();
        actions.finalize(12).unwrap();
        let next = actions.next().unwrap().unwrap();
        assert_eq!(next, Action::EndForward);
    }

    #[test]
    fn finalize_twice_is_rejected() {
        let mut actions = TwoLevelActions::new(4, 2, StorageType::Ram, Trajectory::Maximum);
        actions.finalize(8).unwrap();
        let err = actions.finalize(8).unwrap_err();
        assert!(matches!(err, ScheduleError::Configuration(_)));
    }

    #[test]
    fn reverse_pass_ends_with_a_restartable_end_reverse() {
        let mut actions = TwoLevelActions::new(4, 2, StorageType::Ram, Trajectory::Maximum);
        actions.finalize(4).unwrap();
        let mut saw_end_reverse = false;
        for result in actions.by_ref().take(200) {
            let action = result.unwrap();
            if let Action::EndReverse { exhausted } = action {
                assert!(!exhausted);
                saw_end_reverse = true;
                break;
            }
        }
        assert!(saw_end_reverse, "expected a restartable EndReverse");
    }

    #[test]
    fn is_exhausted_is_always_false() {
        let actions = TwoLevelActions::new(4, 2, StorageType::Ram, Trajectory::Maximum);
        assert!(!actions.is_exhausted());
    }

    #[test]
    fn uses_storage_type_checks_the_binomial_slot_only() {
        let actions = TwoLevelActions::new(4, 2, StorageType::Ram, Trajectory::Maximum);
        assert!(actions.uses_storage_type(StorageType::Ram));
        assert!(!actions.uses_storage_type(StorageType::AdjDeps));
        assert!(actions.uses_disk_storage());
    }
}
