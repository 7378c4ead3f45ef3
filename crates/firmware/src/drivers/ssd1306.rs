//! SSD1306 display controller driver.
//!
//! Command and data bytes go out one bus transaction each, as a
//! control-byte/value pair. Rendering is not done here: [`Ssd1306::write_data`]
//! only moves bytes a display work item has already computed.

use platform::ssd1306::{
    encode_vertical_shift, init_sequence, CHARGE_PUMP, CHARGE_PUMP_OFF, CHARGE_PUMP_ON,
    CONTROL_COMMAND, CONTROL_DATA, DISPLAY_OFF, DISPLAY_ON, INVERT_DISPLAY, NORMAL_DISPLAY,
    SET_CONTRAST, SET_DISPLAY_OFFSET, SSD1306_I2C_ADDR,
};
use platform::{Device, DriverError, RegisterBus};

/// SSD1306 driver.
#[derive(Debug)]
pub struct Ssd1306 {
    rows: u8,
    present: bool,
    initialized: bool,
    on: bool,
    inverted: bool,
    vertical_shift: i8,
}

impl Ssd1306 {
    /// Driver for a panel with `rows` COM lines (32 or 64).
    pub fn new(rows: u8) -> Self {
        Self {
            rows,
            present: false,
            initialized: false,
            on: false,
            inverted: false,
            vertical_shift: 0,
        }
    }

    /// Panel height in pixels.
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// `true` once [`init`](Self::init) has run against the present device.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_present(&self) -> Result<(), DriverError> {
        if self.present {
            Ok(())
        } else {
            Err(DriverError::DeviceAbsent)
        }
    }

    fn command<B: RegisterBus + ?Sized>(bus: &mut B, cmd: u8) {
        bus.set_reg8(SSD1306_I2C_ADDR, CONTROL_COMMAND, cmd);
    }

    /// Send the power-up sequence and turn the panel on. Once per appearance.
    pub fn init<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        for cmd in init_sequence(self.rows) {
            Self::command(bus, cmd);
        }
        self.inverted = false;
        self.vertical_shift = 0;
        self.display_on(bus)
    }

    /// Charge pump on, then panel on.
    pub fn display_on<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        Self::command(bus, CHARGE_PUMP);
        Self::command(bus, CHARGE_PUMP_ON);
        Self::command(bus, DISPLAY_ON);
        self.on = true;
        Ok(())
    }

    /// Panel off, then charge pump off.
    pub fn display_off<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        Self::command(bus, DISPLAY_OFF);
        Self::command(bus, CHARGE_PUMP);
        Self::command(bus, CHARGE_PUMP_OFF);
        self.on = false;
        Ok(())
    }

    /// Whether display frames should be produced. False when absent.
    pub fn is_display_on(&self) -> bool {
        self.present && self.on
    }

    /// Set panel contrast (0 dimmest, 255 brightest).
    pub fn set_contrast<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
        contrast: u8,
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        Self::command(bus, SET_CONTRAST);
        Self::command(bus, contrast);
        Ok(())
    }

    /// Toggle between normal and inverted pixels.
    pub fn invert<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        self.inverted = !self.inverted;
        Self::command(bus, if self.inverted { INVERT_DISPLAY } else { NORMAL_DISPLAY });
        Ok(())
    }

    /// `true` while pixels are inverted.
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Scroll the picture vertically by `shift` rows, wrapping.
    ///
    /// `|shift|` must be below the panel height.
    pub fn set_vertical_shift<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
        shift: i8,
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        let limit = self.rows.saturating_sub(1);
        if shift.unsigned_abs() > limit {
            return Err(DriverError::OutOfRange {
                value: u32::from(shift.unsigned_abs()),
                min: 0,
                max: u32::from(limit),
            });
        }
        Self::command(bus, SET_DISPLAY_OFFSET);
        Self::command(bus, encode_vertical_shift(shift, self.rows));
        self.vertical_shift = shift;
        Ok(())
    }

    /// Current vertical shift.
    pub fn vertical_shift(&self) -> i8 {
        self.vertical_shift
    }

    /// Push raw GDDRAM bytes at the current write pointer.
    pub fn write_data<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
        data: &[u8],
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        for &byte in data {
            bus.set_reg8(SSD1306_I2C_ADDR, CONTROL_DATA, byte);
        }
        Ok(())
    }
}

impl Device for Ssd1306 {
    fn address(&self) -> u8 {
        SSD1306_I2C_ADDR
    }

    fn is_present(&self) -> bool {
        self.present
    }

    fn set_present(&mut self, present: bool) {
        if !present {
            self.initialized = false;
            self.on = false;
        }
        self.present = present;
    }
}
