//! `schedule-plan hrevolve`: builds an optimal H-Revolve schedule for a
//! toy simulation and prints its action trace.

use tracing::info;

use schedules_engine::{HRevolveSchedule, ScheduleParams, StorageLevels};

use crate::{CliError, Result};

#[allow(clippy::too_many_arguments)]
pub fn run(
    max_n: usize,
    ram: usize,
    disk: usize,
    cfwd: f64,
    cbwd: f64,
    write_ram: f64,
    write_disk: f64,
    read_ram: f64,
    read_disk: f64,
) -> Result<()> {
    if max_n == 0 {
        return Err(CliError::InvalidArgument(
            "max-n must be at least 1".to_string(),
        ));
    }

    info!(max_n, ram, disk, "building H-Revolve schedule");

    let levels = StorageLevels::two_level(ram, disk, (write_ram, write_disk), (read_ram, read_disk));
    let params = ScheduleParams::default().with_cfwd(cfwd).with_cbwd(cbwd);
    let schedule = HRevolveSchedule::new(max_n, levels, params)?;
    let actions = schedule.iter();

    println!("H-Revolve schedule: max_n={max_n} ram={ram} disk={disk}");
    for (i, action) in actions.enumerate() {
        let action = action?;
        println!("{i:>4}  {action:?}");
    }

    info!("H-Revolve schedule exhausted");
    Ok(())
}
