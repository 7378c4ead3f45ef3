//! Hardware glue between Embassy peripherals and the platform traits.
//!
//! Only compiled for the target (`--features hardware`). Host builds use
//! `platform::mocks` in place of everything here.

use embassy_stm32::i2c::{I2c, Instance};
use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation, SevenBitAddress};
use platform::{AddressMode, I2cConfig, I2cPeripheral};

/// Blocking Embassy I2C master exposed as an [`I2cPeripheral`].
///
/// The STM32 timing registers are programmed when the Embassy driver is
/// constructed, so the frequency passed there must match the
/// [`I2cConfig`] later handed to `configure`.
pub struct HardwareI2c<'d, T: Instance> {
    i2c: I2c<'d, T>,
    frequency: u32,
}

impl<'d, T: Instance> HardwareI2c<'d, T> {
    /// Wrap a driver constructed at `frequency` Hz.
    pub fn new(i2c: I2c<'d, T>, frequency: u32) -> Self {
        Self { i2c, frequency }
    }
}

fn map_error(err: embassy_stm32::i2c::Error) -> ErrorKind {
    use embassy_stm32::i2c::Error;
    match err {
        Error::Bus => ErrorKind::Bus,
        Error::Arbitration => ErrorKind::ArbitrationLoss,
        Error::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
        Error::Overrun => ErrorKind::Overrun,
        _ => ErrorKind::Other,
    }
}

impl<T: Instance> ErrorType for HardwareI2c<'_, T> {
    type Error = ErrorKind;
}

impl<T: Instance> embedded_hal::i2c::I2c<SevenBitAddress> for HardwareI2c<'_, T> {
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.blocking_read(address, read).map_err(map_error)
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.i2c.blocking_write(address, write).map_err(map_error)
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c
            .blocking_write_read(address, write, read)
            .map_err(map_error)
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // Register traffic never needs more than write_read; run the
        // operations back to back.
        for op in operations {
            match op {
                Operation::Read(buf) => self.read(address, buf)?,
                Operation::Write(buf) => self.write(address, buf)?,
            }
        }
        Ok(())
    }
}

impl<T: Instance> I2cPeripheral for HardwareI2c<'_, T> {
    fn configure(&mut self, config: I2cConfig) -> Result<(), Self::Error> {
        if config.address_mode != AddressMode::SevenBit {
            defmt::warn!("I2C: only 7-bit addressing is wired");
            return Err(ErrorKind::Other);
        }
        if config.frequency != self.frequency {
            defmt::warn!(
                "I2C: requested {=u32} Hz, peripheral clocked at {=u32} Hz",
                config.frequency,
                self.frequency
            );
        }
        Ok(())
    }
}
