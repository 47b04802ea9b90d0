//! Configuration surface recognized by the cost-table and sequence builders.
//!
//! The reference implementation threads a `**kwargs` bag through every
//! recursive call. Rust prefers an explicit struct: [`ScheduleParams`]
//! captures exactly the keys §6 recognizes (`cfwd`, `cbwd`, `concat`,
//! `wd`, `rd`) with the same defaults.

/// Forward/backward step costs and presentation knobs shared by the
/// cost-table builder (Component A) and the sequence builder
/// (Component B).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleParams {
    /// Cost of a single forward step.
    pub cfwd: f64,
    /// Cost of a single backward (adjoint) step.
    pub cbwd: f64,
    /// Flattening level for nested sub-sequences; a presentation knob
    /// only (§4.B `insert_sequence`) — it never changes which actions
    /// are emitted, only how a diagnostic tree view groups them.
    pub concat: u32,
}

impl Default for ScheduleParams {
    /// `cfwd = 1.0`, `cbwd = 2.0`, `concat = 0` (fully flattened).
    fn default() -> Self {
        Self {
            cfwd: 1.0,
            cbwd: 2.0,
            concat: 0,
        }
    }
}

impl ScheduleParams {
    /// Starts from [`Default::default`] and overrides `cfwd`.
    pub fn with_cfwd(mut self, cfwd: f64) -> Self {
        self.cfwd = cfwd;
        self
    }

    /// Starts from [`Default::default`] and overrides `cbwd`.
    pub fn with_cbwd(mut self, cbwd: f64) -> Self {
        self.cbwd = cbwd;
        self
    }

    /// Starts from [`Default::default`] and overrides `concat`.
    pub fn with_concat(mut self, concat: u32) -> Self {
        self.concat = concat;
        self
    }
}

/// Per-level storage description: slot counts, write costs, read costs.
///
/// Echoed back as `wd`/`rd` in the original's parameter bag (§6); here
/// they are simply the vectors the cost table and sequence builder are
/// constructed from.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageLevels {
    /// Capacity (slot count) at each level, fastest-first.
    pub cvect: Vec<usize>,
    /// Write cost at each level.
    pub wvect: Vec<f64>,
    /// Read cost at each level.
    pub rvect: Vec<f64>,
}

impl StorageLevels {
    /// Builds a two-level (RAM, disk) configuration, the common case.
    pub fn two_level(
        snapshots_in_ram: usize,
        snapshots_on_disk: usize,
        wvect: (f64, f64),
        rvect: (f64, f64),
    ) -> Self {
        Self {
            cvect: vec![snapshots_in_ram, snapshots_on_disk],
            wvect: vec![wvect.0, wvect.1],
            rvect: vec![rvect.0, rvect.1],
        }
    }

    /// Number of memory levels, `K`.
    pub fn levels(&self) -> usize {
        self.cvect.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_reference_defaults() {
        let params = ScheduleParams::default();
        assert_eq!(params.cfwd, 1.0);
        assert_eq!(params.cbwd, 2.0);
        assert_eq!(params.concat, 0);
    }

    #[test]
    fn builder_overrides_apply() {
        let params = ScheduleParams::default().with_cfwd(3.0).with_cbwd(5.0);
        assert_eq!(params.cfwd, 3.0);
        assert_eq!(params.cbwd, 5.0);
    }

    #[test]
    fn two_level_storage_has_two_levels() {
        let levels = StorageLevels::two_level(4, 10, (0.0, 0.1), (0.0, 0.1));
        assert_eq!(levels.levels(), 2);
        assert_eq!(levels.cvect, vec![4, 10]);
    }
}
