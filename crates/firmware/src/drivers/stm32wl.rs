//! STM32WL radio companion driver.
//!
//! The radio stack runs on the companion; this side only enables it and
//! samples its status at background cadence.

use platform::stm32wl::{
    RadioStatus, CONTROL_ENABLE, REG_CONTROL, REG_STATUS, STM32WL_I2C_ADDR,
};
use platform::{Device, DriverError, RegisterBus};

/// STM32WL companion driver.
#[derive(Debug, Default)]
pub struct Stm32wl {
    present: bool,
    initialized: bool,
    status: RadioStatus,
    updates: u32,
}

impl Stm32wl {
    /// Driver in the "not yet probed" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once [`init`](Self::init) has run against the present device.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Enable the radio. Once per appearance.
    pub fn init<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        if !self.present {
            return Err(DriverError::DeviceAbsent);
        }
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        self.set_enabled(bus, true)
    }

    /// Turn the radio on or off.
    pub fn set_enabled<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
        enabled: bool,
    ) -> Result<(), DriverError> {
        if !self.present {
            return Err(DriverError::DeviceAbsent);
        }
        if enabled {
            bus.set_reg8_bits(STM32WL_I2C_ADDR, REG_CONTROL, CONTROL_ENABLE);
        } else {
            bus.clear_reg8_bits(STM32WL_I2C_ADDR, REG_CONTROL, CONTROL_ENABLE);
        }
        Ok(())
    }

    /// Background housekeeping: sample STATUS. Does nothing when absent.
    pub fn update<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) {
        if !self.present {
            return;
        }
        self.status = RadioStatus::from_register(bus.get_reg8(STM32WL_I2C_ADDR, REG_STATUS));
        self.updates = self.updates.wrapping_add(1);
    }

    /// Status as of the last [`update`](Self::update). Default when absent.
    pub fn status(&self) -> RadioStatus {
        if self.present {
            self.status
        } else {
            RadioStatus::default()
        }
    }

    /// Number of [`update`](Self::update) calls that reached the device.
    pub fn update_count(&self) -> u32 {
        self.updates
    }
}

impl Device for Stm32wl {
    fn address(&self) -> u8 {
        STM32WL_I2C_ADDR
    }

    fn is_present(&self) -> bool {
        self.present
    }

    fn set_present(&mut self, present: bool) {
        if !present {
            self.initialized = false;
        }
        self.present = present;
    }
}
