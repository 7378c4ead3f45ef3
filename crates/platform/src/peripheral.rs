//! Shared peripheral-driver contract
//!
//! Every chip on the shared bus follows the same rules:
//!
//! - presence is decided by a probe ([`Device::set_present`]) and never
//!   guessed by the driver itself
//! - no I/O is attempted against a device that is not present
//! - setters validate before touching the bus and reject out-of-range input
//!   instead of saturating
//!
//! The helpers here ([`RegisterField`], [`LinearCode`], [`adc_decode`]) carry
//! the unit conversions shared by the chip register maps.

use thiserror_no_std::Error;

/// A chip sitting at a fixed 7-bit address on the shared bus.
///
/// Object-safe so the bus manager can probe a heterogeneous set of drivers
/// in one pass (`&mut [&mut dyn Device]`).
pub trait Device {
    /// 7-bit bus address.
    fn address(&self) -> u8;

    /// Critical devices are re-polled at idle cadence (see
    /// [`RegisterBus::reprobe_critical`](crate::bus::RegisterBus::reprobe_critical)).
    fn is_critical(&self) -> bool {
        false
    }

    /// Result of the most recent probe.
    fn is_present(&self) -> bool;

    /// Record a probe result. Only the bus manager calls this.
    fn set_present(&mut self, present: bool);
}

/// Driver operation outcome when no bus I/O was performed.
///
/// Both variants mean "nothing was written": the hardware state from before
/// the call is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The device did not answer its last presence probe.
    #[error("device absent from the bus")]
    DeviceAbsent,
    /// The requested physical value has no register encoding.
    #[error("value {value} outside {min}..={max}")]
    OutOfRange {
        /// Requested value.
        value: u32,
        /// Inclusive minimum.
        min: u32,
        /// Inclusive maximum.
        max: u32,
    },
}

/// I2C peripheral that can be (re)clocked by the bus manager.
pub trait I2cPeripheral: embedded_hal::i2c::I2c {
    /// Configure the bus clock and addressing mode.
    fn configure(&mut self, config: I2cConfig) -> Result<(), Self::Error>;
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Addressing mode
    pub address_mode: AddressMode,
}

/// I2C addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// 7-bit addressing
    SevenBit,
    /// 10-bit addressing
    TenBit,
}

/// Bit field inside an 8-bit register.
///
/// `mask` is unshifted: a 4-bit field at bits 7..4 is `{ shift: 4, mask: 0x0F }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterField {
    /// Position of the least significant bit.
    pub shift: u8,
    /// Field mask before shifting.
    pub mask: u8,
}

#[allow(clippy::cast_lossless)]
impl RegisterField {
    /// Field value contained in `reg`.
    #[inline]
    #[must_use]
    pub const fn extract(self, reg: u8) -> u8 {
        reg.wrapping_shr(self.shift as u32) & self.mask
    }

    /// `reg` with the field replaced by `code`. Bits outside the field are kept.
    #[inline]
    #[must_use]
    pub const fn insert(self, reg: u8, code: u8) -> u8 {
        let shift = self.shift as u32;
        (reg & !self.mask.wrapping_shl(shift)) | (code & self.mask).wrapping_shl(shift)
    }
}

/// Linear register encoding: `value = base + code * step`, `code` in `0..=max_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearCode {
    /// Physical value of code 0.
    pub base: u32,
    /// Physical increment per code.
    pub step: u32,
    /// Largest representable code.
    pub max_code: u8,
}

impl LinearCode {
    /// Smallest representable value.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.base
    }

    /// Largest representable value.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // const table values, checked by tests
    pub const fn max(&self) -> u32 {
        self.base + self.step * self.max_code as u32
    }

    /// Physical value of `code`. Codes above `max_code` saturate.
    #[must_use]
    pub fn decode(&self, code: u8) -> u32 {
        let code = u32::from(code.min(self.max_code));
        self.base.saturating_add(code.saturating_mul(self.step))
    }

    /// Largest code whose value does not exceed `value`.
    ///
    /// # Errors
    ///
    /// [`DriverError::OutOfRange`] outside `min()..=max()`.
    pub fn encode_floor(&self, value: u32) -> Result<u8, DriverError> {
        let offset = self.offset(value)?;
        Ok(self.clamp_code(offset.checked_div(self.step).unwrap_or(0)))
    }

    /// Smallest code whose value is at least `value`.
    ///
    /// Used for regulation targets where falling short of the request is
    /// the unsafe direction.
    ///
    /// # Errors
    ///
    /// [`DriverError::OutOfRange`] outside `min()..=max()`.
    pub fn encode_ceil(&self, value: u32) -> Result<u8, DriverError> {
        let offset = self.offset(value)?;
        let code = offset.div_ceil(self.step.max(1));
        Ok(self.clamp_code(code))
    }

    fn offset(&self, value: u32) -> Result<u32, DriverError> {
        if value < self.min() || value > self.max() {
            return Err(DriverError::OutOfRange {
                value,
                min: self.min(),
                max: self.max(),
            });
        }
        Ok(value.saturating_sub(self.base))
    }

    fn clamp_code(&self, code: u32) -> u8 {
        u8::try_from(code).unwrap_or(u8::MAX).min(self.max_code)
    }
}

/// Decode a 7-bit ADC result byte: `offset + (raw & 0x7F) * span / 127`.
///
/// Bit 7 carries an unrelated status flag on every chip that uses this
/// format and is masked out.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn adc_decode(raw: u8, offset: f32, span: f32) -> f32 {
    offset + (f32::from(raw & 0x7F) * span) * (1.0 / 127.0)
}
