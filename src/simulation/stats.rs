//! Running counters for a simulation

/// Totals accumulated since the world was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub ticks: u64,
    pub cars_spawned: u64,
    /// Cars moved from a finished road onto a successor
    pub hand_offs: u64,
    /// Cars removed at a dead end
    pub cars_discarded: u64,
    pub signal_toggles: u64,
}

impl SimStats {
    /// Cars still driving somewhere in the network
    pub fn active_cars(&self) -> u64 {
        self.cars_spawned - self.cars_discarded
    }
}
