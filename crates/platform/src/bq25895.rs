//! BQ25895 charge controller register map.
//!
//! Reference: Texas Instruments BQ25895 datasheet (SLUSCD3B)
//!
//! Constants and pure encode/decode helpers only. Bus access lives in the
//! firmware driver.

use crate::peripheral::{adc_decode, DriverError, LinearCode, RegisterField};

/// 7-bit I2C device address (fixed in silicon, SLUSCD3B §7.5.1).
pub const BQ25895_I2C_ADDR: u8 = 0x6A;

/// REG00: Input source control (EN_HIZ, EN_ILIM, IINLIM).
pub const REG00_INPUT_SOURCE: u8 = 0x00;
/// REG02: ADC and detection control (CONV_START, CONV_RATE, FORCE_DPDM, ...).
pub const REG02_ADC_CONTROL: u8 = 0x02;
/// REG03: Power-on configuration (OTG_CONFIG, CHG_CONFIG, SYS_MIN).
pub const REG03_POWER_ON_CONFIG: u8 = 0x03;
/// REG07: Termination / timer control (EN_TERM, WATCHDOG, EN_TIMER).
pub const REG07_TIMER_CONTROL: u8 = 0x07;
/// REG0A: Boost mode voltage (BOOSTV) and current limit.
pub const REG0A_BOOST: u8 = 0x0A;
/// REG0B: Status register (VBUS_STAT, CHRG_STAT, PG_STAT, SDP_STAT, VSYS_STAT).
pub const REG0B_STATUS: u8 = 0x0B;
/// REG0C: Fault register (WATCHDOG_FAULT, BOOST_FAULT, CHRG_FAULT, BAT_FAULT, NTC_FAULT).
pub const REG0C_FAULT: u8 = 0x0C;
/// REG0E: ADC conversion result, battery voltage (THERM_STAT, BATV).
pub const REG0E_BATTERY_VOLTAGE: u8 = 0x0E;
/// REG0F: ADC conversion result, system voltage (SYSV).
pub const REG0F_SYSTEM_VOLTAGE: u8 = 0x0F;
/// REG11: ADC conversion result, VBUS voltage (VBUS_GD, VBUSV).
pub const REG11_VBUS_VOLTAGE: u8 = 0x11;
/// REG12: ADC conversion result, charge current (ICHGR).
pub const REG12_CHARGE_CURRENT_ADC: u8 = 0x12;

/// REG00 IINLIM[5:0].
pub const IINLIM_MASK: u8 = 0x3F;
/// REG02 CONV_START: start an ADC conversion.
pub const CONV_START: u8 = 1 << 7;
/// REG02 CONV_RATE: 1 = continuous, 0 = one-shot.
pub const CONV_RATE: u8 = 1 << 6;
/// REG02 FORCE_DPDM: force input source type detection.
pub const FORCE_DPDM: u8 = 1 << 1;
/// REG03 OTG_CONFIG: boost (OTG) output enable.
pub const OTG_CONFIG: u8 = 1 << 5;
/// REG07 WATCHDOG[5:4]; both clear disables the I2C watchdog timer.
pub const WATCHDOG_MASK: u8 = 0b11 << 4;

/// REG03 SYS_MIN[3:1].
pub const SYS_MIN_FIELD: RegisterField = RegisterField { shift: 1, mask: 0x07 };
/// REG0A BOOSTV[7:4].
pub const BOOSTV_FIELD: RegisterField = RegisterField { shift: 4, mask: 0x0F };

/// Minimum system voltage: 3000 mV + SYS_MIN × 100 mV.
pub const SYS_MIN_MV: LinearCode = LinearCode {
    base: 3000,
    step: 100,
    max_code: 7,
};
/// Boost voltage: 4550 mV + BOOSTV × 64 mV.
pub const BOOST_MV: LinearCode = LinearCode {
    base: 4550,
    step: 64,
    max_code: 15,
};
/// Non-zero input current limits: 50 mA per code, offset by one code.
pub const INPUT_CURRENT_MA: LinearCode = LinearCode {
    base: 50,
    step: 50,
    max_code: 63,
};
/// Largest accepted input current request. Everything from the top code's
/// value up to one step below the next code floors to IINLIM = 63.
pub const INPUT_CURRENT_LIMIT_MA: u32 = 3249;

/// REG0B mask for Power Good status bit.
pub const STATUS_PG_MASK: u8 = 1 << 2;
/// REG0B charge status field (CHRG_STAT[1:0]).
pub const STATUS_CHRG_FIELD: RegisterField = RegisterField { shift: 3, mask: 0b11 };
/// REG0B VBUS status field (VBUS_STAT[2:0]).
pub const STATUS_VBUS_FIELD: RegisterField = RegisterField { shift: 5, mask: 0b111 };

/// Input source type reported in VBUS_STAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VbusStatus {
    /// No input detected.
    NoInput,
    /// USB SDP (Standard Downstream Port, 500 mA).
    UsbSdp,
    /// USB CDP (Charging Downstream Port, 1.5 A).
    UsbCdp,
    /// USB DCP (Dedicated Charging Port, 3.25 A).
    UsbDcp,
    /// Adjustable high-voltage DCP (MaxCharge).
    MaxCharge,
    /// Unknown adapter.
    Unknown,
    /// Non-standard adapter.
    NonStandard,
    /// OTG (boost) mode.
    Otg,
}

impl VbusStatus {
    /// Decode a REG0B status byte.
    #[must_use]
    pub const fn from_status(status: u8) -> Self {
        match STATUS_VBUS_FIELD.extract(status) {
            0 => Self::NoInput,
            1 => Self::UsbSdp,
            2 => Self::UsbCdp,
            3 => Self::UsbDcp,
            4 => Self::MaxCharge,
            5 => Self::Unknown,
            6 => Self::NonStandard,
            _ => Self::Otg,
        }
    }
}

/// Charging phase reported in CHRG_STAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeStatus {
    /// Not charging.
    NotCharging,
    /// Pre-charge (battery below BATLOWV).
    PreCharge,
    /// Fast charging (constant current or constant voltage).
    FastCharging,
    /// Charge termination done.
    Done,
}

impl ChargeStatus {
    /// Decode a REG0B status byte.
    #[must_use]
    pub const fn from_status(status: u8) -> Self {
        match STATUS_CHRG_FIELD.extract(status) {
            0 => Self::NotCharging,
            1 => Self::PreCharge,
            2 => Self::FastCharging,
            _ => Self::Done,
        }
    }
}

/// Encode an input current limit into the full REG00 byte.
///
/// 0 mA is accepted and encodes as 0x00; otherwise `(mA / 50) - 1` for
/// 50..=3249 mA.
///
/// # Errors
///
/// [`DriverError::OutOfRange`] for 1..=49 mA and from 3250 mA up (code 64
/// would spill into EN_ILIM).
pub fn encode_input_current(ma: u32) -> Result<u8, DriverError> {
    if ma == 0 {
        return Ok(0);
    }
    if !(INPUT_CURRENT_MA.min()..=INPUT_CURRENT_LIMIT_MA).contains(&ma) {
        return Err(DriverError::OutOfRange {
            value: ma,
            min: INPUT_CURRENT_MA.min(),
            max: INPUT_CURRENT_LIMIT_MA,
        });
    }
    INPUT_CURRENT_MA.encode_floor(ma.min(INPUT_CURRENT_MA.max()))
}

/// Decode REG00 into milliamps as `IINLIM × 50`.
#[inline]
#[must_use]
pub fn decode_input_current(reg: u8) -> u32 {
    u32::from(reg & IINLIM_MASK).saturating_mul(50)
}

/// REG0E raw byte to battery voltage in volts (2.304 V + BATV × 20 mV).
#[inline]
#[must_use]
pub fn decode_battery_voltage(raw: u8) -> f32 {
    adc_decode(raw, 2.304, 2.540)
}

/// REG0F raw byte to system voltage in volts (2.304 V + SYSV × 20 mV).
#[inline]
#[must_use]
pub fn decode_system_voltage(raw: u8) -> f32 {
    adc_decode(raw, 2.304, 2.540)
}

/// REG11 raw byte to VBUS voltage in volts (2.6 V + VBUSV × 100 mV).
/// Bit 7 (VBUS_GD) is masked out.
#[inline]
#[must_use]
pub fn decode_vbus_voltage(raw: u8) -> f32 {
    adc_decode(raw, 2.6, 12.7)
}

/// REG12 raw byte to charge current in milliamps (ICHGR × 50 mA).
#[inline]
#[must_use]
pub fn decode_charge_current(raw: u8) -> f32 {
    adc_decode(raw, 0.0, 6350.0)
}
