//! Boot sequence for the Pendant.
//!
//! Initialization order (MUST be respected — order matters for correctness):
//!   1. Clocks: HSI → PLL1, 400 MHz core (`embassy_stm32::init`)
//!   2. Independent watchdog armed
//!   3. Cadence timer installed, then SysTick started
//!   4. I2C bus brought up and every device probed
//!   5. Drivers initialized in dependency order (charger first)
//!   6. Boot count bumped, main loop entered
//!
//! The cadence timer must exist before SysTick fires, and no interrupt
//! handler touches the bus, so steps 4–5 are safe with SysTick running.

use platform::RegisterBus;

use crate::config::{CHARGER_CONFIG, DISPLAY_ROWS, WATCHDOG_TIMEOUT_MS};
use crate::system::System;

/// Ordered list of boot sequence steps for documentation and testing.
///
/// # Correctness Invariants
///
/// - SysTick raises cadence flags from the moment it starts; the timer it
///   drives must already be installed.
/// - The bus is probed before any driver init, so absent chips get no
///   configuration traffic.
/// - Charger init disables OTG before touching any voltage or current limit.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. Clocks: PLL1 at 400 MHz from HSI",
    "2. IWDG: arm independent watchdog",
    "3. Cadence: install timer, then start SysTick",
    "4. I2C: configure bus clock, probe all devices",
    "5. Drivers: charger, display, radio init",
    "6. Loop: bump boot count, enter main loop",
];

/// Core clock after [`build_embassy_config`].
pub const CORE_CLOCK_HZ: u32 = 400_000_000;

/// SysTick reload value for a `tick_hz` interrupt rate at `core_hz`.
///
/// SysTick counts reload..=0, so the reload is one less than the period.
/// The counter is 24 bits wide; out-of-range periods are clamped.
#[must_use]
pub fn systick_reload(core_hz: u32, tick_hz: u32) -> u32 {
    const MAX_RELOAD: u32 = 0x00FF_FFFF;
    core_hz
        .checked_div(tick_hz)
        .unwrap_or(0)
        .saturating_sub(1)
        .min(MAX_RELOAD)
}

/// IWDG timeout in microseconds, as taken by `IndependentWatchdog::new`.
#[must_use]
pub fn watchdog_timeout_us() -> u32 {
    WATCHDOG_TIMEOUT_MS.saturating_mul(1000)
}

/// Construct the system context and bring the bus and drivers up.
///
/// Works on any [`RegisterBus`]; the hardware entry point passes a
/// `BusManager` over the Embassy I2C driver, host tests a mock.
pub fn bring_up<B: RegisterBus>(bus: B) -> System<B> {
    #[cfg(feature = "defmt")]
    defmt::info!(
        "{=str} v{=str}",
        platform::config::boot_banner(),
        platform::config::APP_VERSION
    );
    let mut system = System::new(bus, CHARGER_CONFIG, DISPLAY_ROWS);
    system.init();
    system
}

/// Build the Embassy RCC configuration.
///
/// # Clock Tree (HSI → 400 MHz core)
///
/// HSI (64 MHz) → PLL1 (prediv=4, mul=50) → PLL1_P = 400 MHz (sys)
/// AHB prescaler: DIV2 → 200 MHz
/// APB1/2/3/4:    DIV2 → 100 MHz (I2C1 kernel clock from APB1)
///
/// SysTick runs from the core clock, so [`CORE_CLOCK_HZ`] must follow any
/// change here.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;

    // HSI (64 MHz) / prediv(4) = 16 MHz → × mul(50) = 800 MHz VCO
    // PLL1_P = VCO / divp(2) = 400 MHz → system clock
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });

    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}

#[cfg(feature = "hardware")]
pub mod hardware {
    //! Register-level start-up only possible on the target.

    /// Start SysTick at [`SYSTICK_HZ`](crate::config::SYSTICK_HZ) with its
    /// interrupt enabled.
    ///
    /// Call only after the cadence timer is installed: the first interrupt
    /// can fire immediately.
    pub fn start_systick(syst: &mut cortex_m::peripheral::SYST) {
        use cortex_m::peripheral::syst::SystClkSource;

        use crate::config::SYSTICK_HZ;

        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(super::systick_reload(super::CORE_CLOCK_HZ, SYSTICK_HZ));
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
