//! Peripheral drivers for the chips on the shared bus.
//!
//! Each driver is constructed once and owned by [`System`](crate::system::System).
//! None of them owns the bus: every operation borrows a
//! [`RegisterBus`](platform::RegisterBus), so all traffic stays serialized on
//! the main loop.
//!
//! Shared rules:
//!
//! - presence comes from the bus manager's probe, never from the driver
//! - an absent device gets no I/O; accessors return 0 / 0.0 / false and
//!   mutators return [`DriverError::DeviceAbsent`](platform::DriverError)
//! - `init` runs once per appearance; a dropout clears the guard

pub mod bq25895;
pub mod ssd1306;
pub mod stm32wl;

pub use bq25895::{Bq25895, ChargerConfig, ChargerSnapshot};
pub use ssd1306::Ssd1306;
pub use stm32wl::Stm32wl;
