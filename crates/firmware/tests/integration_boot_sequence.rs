//! Integration test: a complete bring-up over the in-memory bus.
//!
//! Tests that:
//!   1. The bus is initialized once and every device probed before any write
//!   2. Charger registers are written in a safe order (OTG off first)
//!   3. Charger limits land in the right register fields
//!   4. The display receives its power-up sequence, then panel-on
//!   5. Absent devices get no configuration traffic
//!
//! Does NOT require physical hardware.
//!
//! Run with: cargo test -p pendant --test integration_boot_sequence

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use pendant::boot::bring_up;
use platform::bq25895::{
    BQ25895_I2C_ADDR, CONV_RATE, CONV_START, FORCE_DPDM, OTG_CONFIG, REG00_INPUT_SOURCE,
    REG02_ADC_CONTROL, REG03_POWER_ON_CONFIG, REG07_TIMER_CONTROL, REG0A_BOOST, WATCHDOG_MASK,
};
use platform::mocks::MockBus;
use platform::ssd1306::{
    init_sequence, CHARGE_PUMP, CHARGE_PUMP_ON, CONTROL_COMMAND, DISPLAY_ON, SSD1306_I2C_ADDR,
};
use platform::stm32wl::{CONTROL_ENABLE, REG_CONTROL, STM32WL_I2C_ADDR};
use platform::Access;

/// All three devices attached, charger registers at their power-on values.
fn full_board() -> MockBus {
    let mut bus = MockBus::new()
        .with_device(BQ25895_I2C_ADDR)
        .with_device(SSD1306_I2C_ADDR)
        .with_device(STM32WL_I2C_ADDR);
    bus.set_register(BQ25895_I2C_ADDR, REG02_ADC_CONTROL, CONV_RATE);
    bus.set_register(BQ25895_I2C_ADDR, REG03_POWER_ON_CONFIG, 0x3A);
    bus.set_register(BQ25895_I2C_ADDR, REG07_TIMER_CONTROL, 0x9D);
    bus.set_register(BQ25895_I2C_ADDR, REG0A_BOOST, 0x73);
    bus
}

// -- Ordering -------------------------------------------------------------

#[test]
fn test_bus_init_and_probes_precede_all_writes() {
    let system = bring_up(full_board());
    let log = system.bus.transactions();

    assert_eq!(system.bus.init_count(), 1);
    let probed: Vec<u8> = log
        .iter()
        .take(3)
        .filter(|t| t.kind == Access::Probe)
        .map(|t| t.address)
        .collect();
    assert_eq!(probed, [BQ25895_I2C_ADDR, SSD1306_I2C_ADDR, STM32WL_I2C_ADDR]);
    assert_eq!(system.bus.count(Access::Probe), 3);
}

#[test]
fn test_charger_write_order() {
    let system = bring_up(full_board());
    assert_eq!(
        system.bus.written_registers(BQ25895_I2C_ADDR),
        [
            REG03_POWER_ON_CONFIG, // OTG off
            REG07_TIMER_CONTROL,   // watchdog off
            REG02_ADC_CONTROL,     // one-shot mode
            REG02_ADC_CONTROL,     // conversion start
            REG0A_BOOST,
            REG03_POWER_ON_CONFIG, // minimum system voltage
            REG00_INPUT_SOURCE,
            REG02_ADC_CONTROL, // DP/DM detection
            REG02_ADC_CONTROL, // next sample: one-shot mode
            REG02_ADC_CONTROL, // next sample: conversion start
        ]
    );
}

#[test]
fn test_charger_configured_before_display() {
    let system = bring_up(full_board());
    let log = system.bus.transactions();
    let last_charger_write = log
        .iter()
        .rposition(|t| t.kind == Access::Write && t.address == BQ25895_I2C_ADDR)
        .unwrap();
    let first_display_write = log
        .iter()
        .position(|t| t.kind == Access::Write && t.address == SSD1306_I2C_ADDR)
        .unwrap();
    assert!(last_charger_write < first_display_write);
}

// -- Register contents ----------------------------------------------------

#[test]
fn test_charger_registers_after_boot() {
    let system = bring_up(full_board());
    let reg = |r| system.bus.register(BQ25895_I2C_ADDR, r);

    assert_eq!(reg(REG03_POWER_ON_CONFIG) & OTG_CONFIG, 0, "OTG must be off");
    // 3500 mV -> code 5 in bits 3:1; CHG_CONFIG untouched
    assert_eq!(reg(REG03_POWER_ON_CONFIG), 0x1A);
    assert_eq!(reg(REG07_TIMER_CONTROL) & WATCHDOG_MASK, 0);
    assert_eq!(reg(REG07_TIMER_CONTROL), 0x8D);
    // 4550 mV -> code 0 in bits 7:4; low nibble untouched
    assert_eq!(reg(REG0A_BOOST), 0x03);
    // 500 mA -> IINLIM 9
    assert_eq!(reg(REG00_INPUT_SOURCE), 0x09);
    assert_eq!(reg(REG02_ADC_CONTROL), CONV_START | FORCE_DPDM);
}

#[test]
fn test_display_power_up_sequence() {
    let system = bring_up(full_board());
    let mut expected = init_sequence(32).to_vec();
    expected.extend_from_slice(&[CHARGE_PUMP, CHARGE_PUMP_ON, DISPLAY_ON]);

    assert_eq!(system.bus.writes_to(SSD1306_I2C_ADDR, CONTROL_COMMAND), expected);
    assert!(system.display.is_display_on());
}

#[test]
fn test_radio_enabled() {
    let system = bring_up(full_board());
    assert_ne!(system.bus.register(STM32WL_I2C_ADDR, REG_CONTROL) & CONTROL_ENABLE, 0);
    assert!(system.radio.is_initialized());
}

// -- Absent devices -------------------------------------------------------

#[test]
fn test_absent_devices_get_no_traffic() {
    let system = bring_up(MockBus::new().with_device(BQ25895_I2C_ADDR));

    for addr in [SSD1306_I2C_ADDR, STM32WL_I2C_ADDR] {
        assert!(
            system
                .bus
                .transactions()
                .iter()
                .filter(|t| t.address == addr)
                .all(|t| t.kind == Access::Probe),
            "only a probe may reach {addr:#x}"
        );
    }
    assert!(system.charger.is_initialized());
    assert!(!system.display.is_display_on());
    assert!(!system.radio.is_initialized());
}

#[test]
fn test_empty_bus_boots() {
    let system = bring_up(MockBus::new());
    assert_eq!(system.bus.count(Access::Write), 0);
    assert_eq!(system.bus.count(Access::Read), 0);
    assert!(!system.charger.is_initialized());
}
