//! Storage collaborators polled by the main loop.
//!
//! Mass-storage processing and the persistent model are external subsystems;
//! the loop only needs these entry points.

/// Mass-storage housekeeping, polled every loop iteration.
pub trait MassStorage {
    /// Service pending storage work. Must return promptly.
    fn process(&mut self);
}

/// Persistent settings model.
pub trait ModelStore {
    /// Flush dirty state to non-volatile memory. Called at idle cadence.
    fn save(&mut self);

    /// Bump the persistent boot counter. Called once at startup.
    fn inc_boot_count(&mut self);
}

/// Board without removable storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStorage;

impl MassStorage for NoStorage {
    fn process(&mut self) {}
}

/// Model held in RAM only; state is lost on power loss.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RamModel {
    boot_count: u32,
    dirty: bool,
}

impl RamModel {
    /// Boots counted since power-up.
    pub fn boot_count(&self) -> u32 {
        self.boot_count
    }

    /// `true` if changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl ModelStore for RamModel {
    fn save(&mut self) {
        self.dirty = false;
    }

    fn inc_boot_count(&mut self) {
        self.boot_count = self.boot_count.saturating_add(1);
        self.dirty = true;
    }
}
