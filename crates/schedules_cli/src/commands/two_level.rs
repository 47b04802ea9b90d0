//! `schedule-plan two-level`: drives the periodic/binomial schedule
//! through its forward phase and a single reverse pass for a toy
//! simulation of `steps` steps, printing the action trace.

use tracing::info;

use schedules_core::{Action, StorageType};
use schedules_engine::{Trajectory, TwoLevelSchedule};

use crate::{CliError, Result};

/// Safety bound on the number of actions printed, in case a malformed
/// configuration would otherwise never reach `EndReverse`.
const MAX_ACTIONS: usize = 100_000;

pub fn run(
    steps: usize,
    period: usize,
    binomial_snapshots: usize,
    binomial_storage: &str,
    trajectory: &str,
) -> Result<()> {
    if steps == 0 {
        return Err(CliError::InvalidArgument(
            "steps must be at least 1".to_string(),
        ));
    }

    let storage = match binomial_storage {
        "ram" => StorageType::Ram,
        "disk" => StorageType::Disk,
        other => {
            return Err(CliError::InvalidArgument(format!(
                "unrecognized binomial storage: {other} (expected \"ram\" or \"disk\")"
            )))
        }
    };
    let trajectory = Trajectory::parse(trajectory)?;

    info!(steps, period, binomial_snapshots, "building two-level schedule");

    let schedule = TwoLevelSchedule::new(period, binomial_snapshots, storage, trajectory)?;
    let mut actions = schedule.iter();

    println!("Two-level schedule: steps={steps} period={period} binomial_snapshots={binomial_snapshots}");

    let mut finalized = false;
    for i in 0..MAX_ACTIONS {
        let Some(result) = actions.next() else {
            break;
        };
        let action = result?;
        println!("{i:>4}  {action:?}");

        if !finalized {
            if let Action::Forward {
                n1,
                storage: Some(StorageType::Disk),
                ..
            } = action
            {
                if n1 >= steps {
                    actions.finalize(steps)?;
                    finalized = true;
                }
            }
        }

        if matches!(action, Action::EndReverse { .. }) {
            info!("reached the end of one reverse pass");
            return Ok(());
        }
    }

    Err(CliError::InvalidArgument(
        "action trace did not reach EndReverse within the bounded number of steps".to_string(),
    ))
}
