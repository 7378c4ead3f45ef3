//! Pendant firmware - main entry point
//!
//! Hardware-only entry point for STM32H743ZI. See
//! [`pendant::boot::BOOT_SEQUENCE_STEPS`] for the ordering this follows.

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m_rt::{entry, exception};
use critical_section::Mutex;
use embassy_stm32::dma::NoDma;
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::time::Hertz;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::{bind_interrupts, peripherals};
use platform::{BusManager, CadenceFlags, CadenceTimer, NoStorage, RamModel};

use pendant::config::{BUS_CONFIG, CADENCE_PERIODS, TICK_MS, WATCHDOG_TIMEOUT_MS};
use pendant::hal::HardwareI2c;
use pendant::{boot, NoContent, Pendant, Timeline};

// Logger and panic handler
use defmt_rtt as _;
use panic_probe as _;

/// Raised by SysTick, cleared by the main loop.
static FLAGS: CadenceFlags = CadenceFlags::new();

/// Installed before SysTick starts; `None` only during early boot.
static TIMER: Mutex<RefCell<Option<CadenceTimer>>> = Mutex::new(RefCell::new(None));

bind_interrupts!(struct Irqs {
    I2C1_EV => i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

#[exception]
fn SysTick() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER.borrow_ref_mut(cs).as_mut() {
            timer.tick(TICK_MS, &FLAGS);
        }
    });
}

#[entry]
fn main() -> ! {
    // Step 1: clocks
    let p = embassy_stm32::init(boot::build_embassy_config());

    // Step 2: watchdog. Cannot be stopped once unleashed; the loop waiter
    // pets it on every wake-up.
    let mut watchdog = IndependentWatchdog::new(p.IWDG1, boot::watchdog_timeout_us());
    watchdog.unleash();
    defmt::info!("IWDG armed: timeout={=u32}ms", WATCHDOG_TIMEOUT_MS);

    // Step 3: cadence timer, then SysTick
    critical_section::with(|cs| {
        TIMER
            .borrow_ref_mut(cs)
            .replace(CadenceTimer::new(CADENCE_PERIODS));
    });
    let Some(mut core) = cortex_m::Peripherals::take() else {
        defmt::panic!("core peripherals already taken");
    };
    boot::hardware::start_systick(&mut core.SYST);

    // Steps 4-5: bus and drivers. I2C1 on PB8 (SCL) / PB9 (SDA).
    let i2c = I2c::new(
        p.I2C1,
        p.PB8,
        p.PB9,
        Irqs,
        NoDma,
        NoDma,
        Hertz(BUS_CONFIG.frequency),
        i2c::Config::default(),
    );
    let bus = BusManager::new(HardwareI2c::new(i2c, BUS_CONFIG.frequency), BUS_CONFIG);
    let system = boot::bring_up(bus);

    // Step 6: main loop
    let timeline = Timeline::new(&FLAGS, NoContent);
    let waiter = move || {
        watchdog.pet();
        cortex_m::asm::wfi();
    };
    Pendant::new(system, timeline, NoStorage, RamModel::default(), waiter).run()
}
