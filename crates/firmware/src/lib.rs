//! Pendant firmware
//!
//! Cooperative single-thread firmware for a wearable built on STM32H7: an
//! LED effect engine, a BQ25895 charger, an SSD1306 display and an STM32WL
//! radio companion, all sharing one I2C bus.
//!
//! # Architecture
//!
//! ```text
//! Main loop (pendant)        WFI → storage → idle → background → effect → display
//!         ↓
//! Timeline (timeline)        cadence flags + top effect/display work items
//!         ↓
//! System context (system)    owns the bus and one instance of each driver
//!         ↓
//! Drivers (drivers)          presence-gated register access per chip
//!         ↓
//! Platform HAL (platform)    RegisterBus, register maps, cadence flags
//! ```
//!
//! Interrupt handlers only raise cadence flags; every bus transaction
//! happens on the main loop.
//!
//! # Features
//!
//! - `hardware` - Build for STM32H7 target (embassy-stm32, cortex-m-rt, defmt-rtt)
//! - `defmt` - defmt log statements without the rest of the hardware stack
//!
//! # Examples
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```

#![cfg_attr(not(test), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // DriverError variants are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::new_without_default)]

pub mod boot;
pub mod config;
pub mod drivers;
pub mod exception_handlers;
pub mod pendant;
pub mod system;
pub mod timeline;

#[cfg(feature = "hardware")]
pub mod hal;

// Re-export key types
pub use drivers::{Bq25895, ChargerConfig, ChargerSnapshot, Ssd1306, Stm32wl};
pub use pendant::{Dispatch, Pendant};
pub use system::System;
pub use timeline::{ContentSource, NoContent, NoItem, Timeline, WorkItem};
