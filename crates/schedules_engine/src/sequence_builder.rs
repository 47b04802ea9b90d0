//! Sequence builder (Component B): turns the cost tables into the
//! concrete `recurse`/`aux` operation streams H-Revolve schedules a
//! subproblem with.
//!
//! `recurse(l, k, m)` schedules `l` steps with `m` free slots at level
//! `k` from a cold start (no checkpoint yet at step 0). `aux(l, k, m)`
//! schedules the same subproblem given a checkpoint for step 0 already
//! exists at level `k`. The two are mutually recursive, mirroring the
//! cost recurrence in [`crate::table`].

use crate::config::{ScheduleParams, StorageLevels};
use crate::operation::{Operation, Sequence};
use crate::table::{argmin_forward_split, CostTables};
use schedules_core::{ScheduleError, ScheduleResult};

/// Schedules `l` steps with `m` free slots at level `k`, with no
/// checkpoint yet held for step 0 (§4.B `recurse`).
pub fn recurse(
    tables: &CostTables,
    levels: &StorageLevels,
    params: ScheduleParams,
    l: usize,
    k: usize,
    m: usize,
) -> ScheduleResult<Sequence> {
    let mut seq = Sequence::new();

    if l == 0 {
        seq.push(Operation::Backward { step: 0 });
        return Ok(seq);
    }

    if l == 1 {
        seq.push(Operation::Write { level: 0, step: 0 });
        seq.push(Operation::Forward { from: 0, to: 1 });
        seq.push(Operation::WriteForward { from: 0, to: 1 });
        seq.push(Operation::Backward { step: 1 });
        seq.push(Operation::DiscardForward { from: 0, to: 1 });
        seq.push(Operation::Read { level: 0, step: 0 });
        seq.push(Operation::Backward { step: 0 });
        seq.push(Operation::Discard { level: 0, step: 0 });
        return Ok(seq);
    }

    if k == 0 && m == 0 {
        return Err(ScheduleError::NoMemory { length: l });
    }

    if k == 0 {
        seq.push(Operation::Write { level: 0, step: 0 });
        seq.extend(aux(tables, levels, params, l, 0, m)?);
        return Ok(seq);
    }

    let write_here = levels.wvect[k] + tables.optp[k][l][m];
    let fallback = tables.opt[k - 1][l][levels.cvect[k - 1]];
    if write_here < fallback {
        seq.push(Operation::Write { level: k, step: 0 });
        seq.extend(aux(tables, levels, params, l, k, m)?);
    } else {
        seq.extend(recurse(tables, levels, params, l, k - 1, levels.cvect[k - 1])?);
    }
    Ok(seq)
}

/// Schedules `l` steps with `m` free slots at level `k`, given a
/// checkpoint for step 0 already held at level `k` (§4.B `aux`).
pub fn aux(
    tables: &CostTables,
    levels: &StorageLevels,
    params: ScheduleParams,
    l: usize,
    k: usize,
    m: usize,
) -> ScheduleResult<Sequence> {
    let mut seq = Sequence::new();

    if l == 0 {
        seq.push(Operation::Backward { step: 0 });
        return Ok(seq);
    }

    if l == 1 {
        let read_ram_first = levels.wvect[0] + levels.rvect[0] < levels.rvect[k];
        if read_ram_first {
            seq.push(Operation::Write { level: 0, step: 0 });
        }
        seq.push(Operation::Forward { from: 0, to: 1 });
        seq.push(Operation::WriteForward { from: 0, to: 1 });
        seq.push(Operation::Backward { step: 1 });
        seq.push(Operation::DiscardForward { from: 0, to: 1 });
        if read_ram_first {
            seq.push(Operation::Read { level: 0, step: 0 });
        } else {
            seq.push(Operation::Read { level: k, step: 0 });
        }
        seq.push(Operation::Backward { step: 0 });
        if read_ram_first {
            seq.push(Operation::Discard { level: 0, step: 0 });
        } else {
            seq.push(Operation::Discard { level: k, step: 0 });
        }
        return Ok(seq);
    }

    if k == 0 && m == 1 {
        for index in (0..l).rev() {
            if index != l - 1 {
                seq.push(Operation::Read { level: 0, step: 0 });
            }
            seq.push(Operation::Forward {
                from: 0,
                to: index + 1,
            });
            seq.push(Operation::WriteForward {
                from: 0,
                to: index + 1,
            });
            seq.push(Operation::Backward { step: index + 1 });
            seq.push(Operation::DiscardForward {
                from: 0,
                to: index + 1,
            });
        }
        seq.push(Operation::Read { level: 0, step: 0 });
        seq.push(Operation::Backward { step: 0 });
        seq.push(Operation::Discard { level: 0, step: 0 });
        return Ok(seq);
    }

    if k == 0 {
        let (jmin, split) = argmin_forward_split(tables, 0, l, m, levels.rvect[0], params.cfwd);
        if split < tables.optp[0][l][1] {
            seq.push(Operation::Forward { from: 0, to: jmin });
            seq.extend(recurse(tables, levels, params, l - jmin, 0, m - 1)?.shift(jmin));
            seq.push(Operation::Read { level: 0, step: 0 });
            seq.extend(aux(tables, levels, params, jmin - 1, 0, m)?);
        } else {
            seq.extend(aux(tables, levels, params, l, 0, 1)?);
        }
        return Ok(seq);
    }

    // k >= 1.
    let (jmin, split) = argmin_forward_split(tables, k, l, m, levels.rvect[k], params.cfwd);
    let fallback = tables.opt[k - 1][l][levels.cvect[k - 1]];
    if split < fallback {
        // The Forward here stops one step short of `jmin`; the
        // recursive sub-sequence is still shifted by the full `jmin`.
        // This asymmetry matches the reference recurrence and is
        // preserved verbatim rather than "corrected" (see DESIGN.md).
        seq.push(Operation::Forward {
            from: 0,
            to: jmin - 1,
        });
        seq.extend(recurse(tables, levels, params, l - jmin, k, m - 1)?.shift(jmin));
        seq.push(Operation::Read { level: k, step: 0 });
        seq.extend(aux(tables, levels, params, jmin - 1, k, m)?);
    } else {
        seq.extend(recurse(tables, levels, params, l, k - 1, levels.cvect[k - 1])?);
    }
    Ok(seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::build;

    fn setup(cram: usize, cdisk: usize, lmax: usize) -> (CostTables, StorageLevels, ScheduleParams) {
        let levels = StorageLevels::two_level(cram, cdisk, (0.0, 0.1), (0.0, 0.1));
        let params = ScheduleParams::default();
        let tables = build(lmax, &levels, params).unwrap();
        (tables, levels, params)
    }

    #[test]
    fn recurse_single_step_is_the_fixed_eight_op_schedule() {
        let (tables, levels, params) = setup(2, 0, 4);
        let seq = recurse(&tables, &levels, params, 1, 0, 1).unwrap();
        assert_eq!(seq.len(), 8);
        assert_eq!(seq.0[0], Operation::Write { level: 0, step: 0 });
        assert_eq!(seq.0[7], Operation::Discard { level: 0, step: 0 });
    }

    #[test]
    fn recurse_zero_length_is_a_single_backward() {
        let (tables, levels, params) = setup(2, 0, 4);
        let seq = recurse(&tables, &levels, params, 0, 0, 1).unwrap();
        assert_eq!(seq.0, vec![Operation::Backward { step: 0 }]);
    }

    #[test]
    fn recurse_without_memory_is_an_error() {
        let (tables, levels, params) = setup(0, 0, 4);
        let err = recurse(&tables, &levels, params, 3, 0, 0).unwrap_err();
        assert!(matches!(err, ScheduleError::NoMemory { length: 3 }));
    }

    #[test]
    fn aux_does_not_rewrite_the_checkpoint_it_was_handed() {
        let (tables, levels, params) = setup(3, 0, 6);
        let seq = aux(&tables, &levels, params, 4, 0, 3).unwrap();
        assert_ne!(
            seq.0[0],
            Operation::Write { level: 0, step: 0 },
            "aux starts from an existing level-0 checkpoint at step 0, so it must not reissue the write that recurse performs"
        );
    }

    #[test]
    fn longer_subproblems_produce_more_operations() {
        let (tables, levels, params) = setup(3, 2, 10);
        let short = recurse(&tables, &levels, params, 2, 1, 2).unwrap();
        let long = recurse(&tables, &levels, params, 8, 1, 2).unwrap();
        assert!(long.len() > short.len());
    }
}
