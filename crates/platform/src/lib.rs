//! Hardware Abstraction Layer (HAL) for the Pendant
//!
//! Everything the firmware needs to talk to the shared I2C bus and to pace
//! its main loop, without depending on a particular MCU HAL.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: drivers, System, Timeline, loop)
//!         ↓
//! Platform HAL (this crate: bus primitives, register maps, cadence)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC, or `mocks` on the host)
//! ```
//!
//! # Modules
//!
//! - [`bus`] - shared-bus register primitives and critical reprobe
//! - [`peripheral`] - presence contract, driver errors, field/unit helpers
//! - [`bq25895`], [`ssd1306`], [`stm32wl`] - chip register maps
//! - [`cadence`] - per-class readiness flags and the tick-driven timer
//! - [`power`], [`storage`] - collaborator traits consumed by the loop
//!
//! # Features
//!
//! - `std`: link std and expose [`mocks`] (host tests of dependent crates)
//! - `defmt`: enable defmt logging
//!
//! # Example
//!
//! ```
//! use platform::bus::RegisterBus;
//!
//! fn enable_conversion<B: RegisterBus + ?Sized>(bus: &mut B) {
//!     bus.set_reg8_bits(0x6A, 0x02, 0x80);
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod bq25895;
pub mod bus;
pub mod cadence;
pub mod config;
pub mod peripheral;
pub mod power;
pub mod ssd1306;
pub mod stm32wl;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use bus::{Access, BusManager, BusTransaction, PresenceChange, PresenceChanges, RegisterBus};
pub use cadence::{CadenceClass, CadenceFlags, CadencePeriods, CadenceTimer};
pub use power::{LowPowerWait, PowerMonitor};
pub use storage::{MassStorage, ModelStore, NoStorage, RamModel};

// Re-export peripheral types
pub use peripheral::{
    AddressMode, Device, DriverError, I2cConfig, I2cPeripheral, LinearCode, RegisterField,
};
