//! Power management abstraction
//!
//! Low-power wait between loop iterations, and the battery/charger view the
//! rest of the firmware consumes.

/// Block until any interrupt wakes the processor.
///
/// The hardware implementation executes `WFI`. Closures implement this so
/// tests can inject timer events while the loop is "asleep".
pub trait LowPowerWait {
    /// Sleep until the next interrupt.
    fn wait_for_interrupt(&mut self);
}

impl<F: FnMut()> LowPowerWait for F {
    fn wait_for_interrupt(&mut self) {
        self();
    }
}

/// Power state monitor
pub trait PowerMonitor {
    /// Get battery voltage (mV)
    fn battery_voltage(&self) -> Option<u16>;

    /// Get battery percentage (0-100)
    fn battery_percentage(&self) -> Option<u8>;

    /// Check if charging
    fn is_charging(&self) -> bool;

    /// Check if USB power connected
    fn is_usb_connected(&self) -> bool;
}

/// Rough single-cell LiPo state of charge from resting voltage.
///
/// Linear between 3300 mV (0 %) and 4200 mV (100 %).
#[must_use]
pub fn lipo_percentage(millivolts: u16) -> u8 {
    const EMPTY_MV: u16 = 3300;
    const FULL_MV: u16 = 4200;
    let above = u32::from(millivolts.clamp(EMPTY_MV, FULL_MV).saturating_sub(EMPTY_MV));
    let span = u32::from(FULL_MV.saturating_sub(EMPTY_MV));
    let pct = above.saturating_mul(100).checked_div(span).unwrap_or(0);
    u8::try_from(pct).unwrap_or(100)
}
