//! Board configuration.
//!
//! Compile-time constants only. Chip register layouts live in `platform`;
//! this is what the board chooses to program into them.

use platform::{AddressMode, CadencePeriods, I2cConfig};

use crate::drivers::ChargerConfig;

/// Shared bus: standard mode, 7-bit addressing.
pub const BUS_CONFIG: I2cConfig = I2cConfig {
    frequency: 100_000,
    address_mode: AddressMode::SevenBit,
};

/// Cadence periods in milliseconds.
///
/// Effect runs near 60 Hz and display near 30 Hz; idle work (critical
/// reprobe, model save) once per second.
pub const CADENCE_PERIODS: CadencePeriods = CadencePeriods {
    idle_ms: 1000,
    background_ms: 50,
    effect_ms: 16,
    display_ms: 33,
};

/// SysTick interrupt rate driving the cadence timer.
pub const SYSTICK_HZ: u32 = 1000;

/// Milliseconds added to the cadence timer per SysTick.
#[allow(clippy::arithmetic_side_effects)]
pub const TICK_MS: u32 = 1000 / SYSTICK_HZ;

/// Charger limits applied at init and after every reappearance.
pub const CHARGER_CONFIG: ChargerConfig = ChargerConfig {
    boost_mv: 4550,
    min_system_mv: 3500,
    input_current_ma: 500,
};

/// Independent watchdog timeout. The loop pets it every iteration and the
/// idle cadence guarantees an iteration at least once per second.
pub const WATCHDOG_TIMEOUT_MS: u32 = 4000;

/// Display panel height in pixels (COM lines).
pub const DISPLAY_ROWS: u8 = 32;

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn every_class_is_enabled() {
        for class in platform::CadenceClass::ALL {
            assert!(CADENCE_PERIODS.period(class) > 0);
        }
    }

    #[test]
    fn watchdog_outlasts_the_slowest_cadence() {
        assert!(WATCHDOG_TIMEOUT_MS > CADENCE_PERIODS.idle_ms * 2);
    }

    #[test]
    fn charger_defaults_match_driver_defaults() {
        assert_eq!(CHARGER_CONFIG, ChargerConfig::default());
    }

    #[test]
    fn tick_is_one_millisecond() {
        assert_eq!(TICK_MS, 1);
    }
}
