//! Integration test: main-loop dispatch over the in-memory bus.
//!
//! Drives [`Pendant::step`] directly with hand-raised cadence flags and a
//! scripted content source that records every call into a shared log.
//!
//! Run with: cargo test -p pendant --test scheduling

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::cell::RefCell;
use std::rc::Rc;

use pendant::config::CADENCE_PERIODS;
use pendant::drivers::ChargerConfig;
use pendant::{ContentSource, Dispatch, Pendant, System, Timeline, WorkItem};
use platform::bq25895::{BQ25895_I2C_ADDR, REG00_INPUT_SOURCE, REG0B_STATUS};
use platform::mocks::{MockBus, MockStorage};
use platform::ssd1306::SSD1306_I2C_ADDR;
use platform::stm32wl::STM32WL_I2C_ADDR;
use platform::{Access, CadenceClass, CadenceFlags, CadenceTimer, ModelStore, RegisterBus};
use proptest::prelude::*;

type Log = Rc<RefCell<Vec<&'static str>>>;
type Board = System<MockBus>;

/// Address the work items write their commit marker to. Nothing lives there.
const MARKER_ADDR: u8 = 0x50;

struct Scripted {
    log: Log,
    valid: bool,
    calc: &'static str,
    commit: &'static str,
    marker: u8,
}

impl WorkItem<Board> for Scripted {
    fn valid(&self) -> bool {
        self.valid
    }

    fn calc(&mut self) {
        self.log.borrow_mut().push(self.calc);
    }

    fn commit(&mut self, hw: &mut Board) {
        self.log.borrow_mut().push(self.commit);
        hw.bus.set_reg8(MARKER_ADDR, 0x00, self.marker);
    }
}

struct Content {
    log: Log,
    effect: Scripted,
    display: Scripted,
}

impl Content {
    fn new(log: &Log, valid: bool) -> Self {
        Self {
            log: log.clone(),
            effect: Scripted {
                log: log.clone(),
                valid,
                calc: "effect calc",
                commit: "effect commit",
                marker: 0xE0,
            },
            display: Scripted {
                log: log.clone(),
                valid,
                calc: "display calc",
                commit: "display commit",
                marker: 0xD0,
            },
        }
    }
}

impl ContentSource<Board> for Content {
    type Effect = Scripted;
    type Display = Scripted;

    fn process_interval(&mut self) {
        self.log.borrow_mut().push("interval");
    }

    fn process_effect(&mut self) {
        self.log.borrow_mut().push("process effect");
    }

    fn process_display(&mut self) {
        self.log.borrow_mut().push("process display");
    }

    fn top_effect(&mut self) -> &mut Scripted {
        &mut self.effect
    }

    fn top_display(&mut self) -> &mut Scripted {
        &mut self.display
    }
}

#[derive(Default)]
struct Model {
    log: Log,
    boots: u32,
}

impl ModelStore for Model {
    fn save(&mut self) {
        self.log.borrow_mut().push("save");
    }

    fn inc_boot_count(&mut self) {
        self.boots += 1;
    }
}

fn no_wait() {}

type TestDevice<'a> = Pendant<'a, MockBus, MockStorage, Model, Content, fn()>;

fn device<'a>(flags: &'a CadenceFlags, bus: MockBus, log: &Log, valid: bool) -> TestDevice<'a> {
    let mut system = System::new(bus, ChargerConfig::default(), 32);
    system.init();
    system.bus.clear_log();
    let model = Model {
        log: log.clone(),
        boots: 0,
    };
    Pendant::new(
        system,
        Timeline::new(flags, Content::new(log, valid)),
        MockStorage::default(),
        model,
        no_wait as fn(),
    )
}

fn board() -> MockBus {
    MockBus::new()
        .with_device(BQ25895_I2C_ADDR)
        .with_device(SSD1306_I2C_ADDR)
        .with_device(STM32WL_I2C_ADDR)
}

// -- Ordering -------------------------------------------------------------

#[test]
fn idle_work_runs_before_effect_work() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, MockBus::new().with_device(BQ25895_I2C_ADDR), &log, true);

    flags.raise(CadenceClass::Effect);
    flags.raise(CadenceClass::Idle);
    let ran = dev.step();

    assert!(ran.idle && ran.effect);
    assert_eq!(
        *log.borrow(),
        ["save", "interval", "process effect", "effect calc", "effect commit"]
    );

    let txns = dev.system().bus.transactions();
    let probe = txns
        .iter()
        .position(|t| t.kind == Access::Probe && t.address == BQ25895_I2C_ADDR)
        .unwrap();
    let marker = txns.iter().position(|t| t.address == MARKER_ADDR).unwrap();
    assert!(probe < marker, "critical reprobe must precede the effect commit");
}

#[test]
fn full_iteration_order() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, true);

    for class in CadenceClass::ALL {
        flags.raise(class);
    }
    let ran = dev.step();

    assert_eq!(
        ran,
        Dispatch {
            idle: true,
            background: true,
            effect: true,
            display: true,
        }
    );
    assert_eq!(
        *log.borrow(),
        [
            "save",
            "interval",
            "process effect",
            "effect calc",
            "effect commit",
            "interval",
            "process display",
            "display calc",
            "display commit",
        ]
    );
    assert_eq!(dev.system().bus.writes_to(MARKER_ADDR, 0x00), [0xE0, 0xD0]);
    assert_eq!(dev.system().radio.update_count(), 1);
}

#[test]
fn storage_runs_every_iteration() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, true);

    assert_eq!(dev.step(), Dispatch::default());
    assert_eq!(dev.step(), Dispatch::default());
    assert_eq!(dev.storage().processed, 2);
    assert!(log.borrow().is_empty());
    assert!(dev.system().bus.transactions().is_empty());
}

// -- Flag semantics -------------------------------------------------------

#[test]
fn missed_periods_collapse_into_one_tick() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, true);
    let mut timer = CadenceTimer::new(CADENCE_PERIODS);

    // Loop slept through three effect periods.
    for _ in 0..3 {
        timer.tick(CADENCE_PERIODS.effect_ms, &flags);
    }

    assert!(dev.step().effect);
    assert!(!dev.step().effect);
    let calcs = log.borrow().iter().filter(|e| **e == "effect calc").count();
    assert_eq!(calcs, 1);
}

#[test]
fn display_flag_waits_while_panel_is_off() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, true);
    {
        let sys = dev.system_mut();
        sys.display.display_off(&mut sys.bus).unwrap();
    }

    flags.raise(CadenceClass::Display);
    assert!(!dev.step().display);
    assert!(flags.is_raised(CadenceClass::Display), "flag must stay pending");
    assert!(log.borrow().is_empty());

    {
        let sys = dev.system_mut();
        sys.display.display_on(&mut sys.bus).unwrap();
    }
    assert!(dev.step().display);
    assert!(!flags.is_raised(CadenceClass::Display));
}

#[test]
fn invalid_item_is_neither_computed_nor_committed() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, false);

    flags.raise(CadenceClass::Effect);
    flags.raise(CadenceClass::Display);
    let ran = dev.step();

    assert!(ran.effect && ran.display);
    assert_eq!(
        *log.borrow(),
        ["interval", "process effect", "interval", "process display"]
    );
    assert!(dev.system().bus.writes_to(MARKER_ADDR, 0x00).is_empty());
}

// -- Lifecycle ------------------------------------------------------------

#[test]
fn start_bumps_boot_count_once() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, true);

    dev.start();
    dev.start();
    assert_eq!(dev.model().boots, 1);
}

#[test]
fn charger_dropout_and_return() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, true);

    dev.system_mut().bus.detach(BQ25895_I2C_ADDR);
    flags.raise(CadenceClass::Idle);
    dev.step();
    assert!(!dev.system().charger.is_initialized());

    dev.system_mut().bus.clear_log();
    dev.system_mut().bus.attach(BQ25895_I2C_ADDR);
    flags.raise(CadenceClass::Idle);
    dev.step();
    assert!(dev.system().charger.is_initialized());
    assert_eq!(
        dev.system().bus.writes_to(BQ25895_I2C_ADDR, REG00_INPUT_SOURCE),
        [0x09],
        "limits are reapplied after reappearance"
    );
    assert_eq!(status_reads(&dev), 1, "one charger sample per idle tick");
}

fn status_reads(dev: &TestDevice<'_>) -> usize {
    dev.system()
        .bus
        .transactions()
        .iter()
        .filter(|t| {
            t.kind == Access::Read && t.address == BQ25895_I2C_ADDR && t.register == REG0B_STATUS
        })
        .count()
}

#[test]
fn stable_charger_is_sampled_once_per_idle_tick() {
    let flags = CadenceFlags::new();
    let log = Log::default();
    let mut dev = device(&flags, board(), &log, true);

    flags.raise(CadenceClass::Idle);
    dev.step();
    assert_eq!(status_reads(&dev), 1);
    assert_eq!(dev.system().bus.count(Access::Probe), 1);
}

proptest! {
    #[test]
    fn prop_dispatch_mirrors_raised_flags(
        idle in any::<bool>(),
        background in any::<bool>(),
        effect in any::<bool>(),
        display in any::<bool>(),
    ) {
        let flags = CadenceFlags::new();
        let log = Log::default();
        let mut dev = device(&flags, board(), &log, true);

        for (class, raised) in CadenceClass::ALL.into_iter().zip([idle, background, effect, display]) {
            if raised {
                flags.raise(class);
            }
        }
        let ran = dev.step();

        prop_assert_eq!(ran, Dispatch { idle, background, effect, display });
        for class in CadenceClass::ALL {
            prop_assert!(!flags.is_raised(class));
        }
    }
}
