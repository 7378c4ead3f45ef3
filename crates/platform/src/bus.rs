//! Shared-bus manager
//!
//! One I2C bus carries every register-mapped peripheral. All access is
//! serialized on the main loop through [`RegisterBus`], whose primitives
//! each touch exactly one 7-bit address and one 8-bit register.
//!
//! Bus faults are never surfaced to drivers: a failed read yields `0x00`
//! (callers mask and clamp whatever they get) and the manager keeps a fault
//! counter for diagnostics. Periodic resampling at idle cadence is what
//! corrects a bad value, not retries.

use embedded_hal::i2c::I2c;

use crate::peripheral::{Device, I2cConfig, I2cPeripheral};

/// Upper bound on devices reported by one reprobe pass.
pub const MAX_DEVICES: usize = 8;

/// Kind of a single bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Register read (write register pointer, read one byte).
    Read,
    /// Register write (register pointer followed by one byte).
    Write,
    /// Address-acknowledge check.
    Probe,
}

/// One single-register access on the shared bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTransaction {
    /// What was attempted.
    pub kind: Access,
    /// 7-bit device address.
    pub address: u8,
    /// Register offset (0 for probes).
    pub register: u8,
    /// Byte written, or byte read back (0 for probes and failed reads).
    pub value: u8,
}

/// Presence flip observed during a probe pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresenceChange {
    /// Device address.
    pub address: u8,
    /// New presence state.
    pub present: bool,
}

/// Presence flips from one reprobe pass.
pub type PresenceChanges = heapless::Vec<PresenceChange, MAX_DEVICES>;

/// Register-level access to the shared bus.
///
/// Implementors provide [`read_reg8`](Self::read_reg8),
/// [`set_reg8`](Self::set_reg8) and [`probe`](Self::probe); everything else
/// is built on those three.
pub trait RegisterBus {
    /// Bring the bus up. Called once at startup.
    fn init(&mut self) {}

    /// Read one register. `None` means the transaction failed on the bus.
    fn read_reg8(&mut self, address: u8, register: u8) -> Option<u8>;

    /// Write one register. Failures are absorbed by the implementation.
    fn set_reg8(&mut self, address: u8, register: u8, value: u8);

    /// `true` if `address` acknowledges.
    fn probe(&mut self, address: u8) -> bool;

    /// Read one register; a bus fault reads as `0x00`.
    fn get_reg8(&mut self, address: u8, register: u8) -> u8 {
        self.read_reg8(address, register).unwrap_or(0)
    }

    /// Read-modify-write OR. Two transactions; the write is skipped when the
    /// read fails so a garbage value is never written back.
    fn set_reg8_bits(&mut self, address: u8, register: u8, mask: u8) {
        if let Some(current) = self.read_reg8(address, register) {
            self.set_reg8(address, register, current | mask);
        }
    }

    /// Read-modify-write AND-NOT. Same failure rule as
    /// [`set_reg8_bits`](Self::set_reg8_bits).
    fn clear_reg8_bits(&mut self, address: u8, register: u8, mask: u8) {
        if let Some(current) = self.read_reg8(address, register) {
            self.set_reg8(address, register, current & !mask);
        }
    }

    /// Probe every device and record the result.
    fn probe_devices(&mut self, devices: &mut [&mut dyn Device]) {
        for device in devices.iter_mut() {
            let present = self.probe(device.address());
            device.set_present(present);
        }
    }

    /// Re-poll only the critical devices, returning the presence flips.
    ///
    /// Meant for idle cadence: a probe per device is too costly for every
    /// loop iteration.
    fn reprobe_critical(&mut self, devices: &mut [&mut dyn Device]) -> PresenceChanges {
        let mut changes = PresenceChanges::new();
        for device in devices.iter_mut().filter(|d| d.is_critical()) {
            let present = self.probe(device.address());
            if present != device.is_present() {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "device {=u8:#x} {=str}",
                    device.address(),
                    if present { "appeared" } else { "disappeared" }
                );
                // MAX_DEVICES bounds the number of drivers the system owns
                let _ = changes.push(PresenceChange {
                    address: device.address(),
                    present,
                });
            }
            device.set_present(present);
        }
        changes
    }
}

/// Owner of the single I2C bus.
pub struct BusManager<I> {
    i2c: I,
    config: I2cConfig,
    initialized: bool,
    fault_count: u32,
    last_fault: Option<BusTransaction>,
}

impl<I: I2cPeripheral> BusManager<I> {
    /// Take ownership of the bus. Nothing is configured until [`init`](RegisterBus::init).
    pub fn new(i2c: I, config: I2cConfig) -> Self {
        Self {
            i2c,
            config,
            initialized: false,
            fault_count: 0,
            last_fault: None,
        }
    }

    /// `true` once the bus clock has been configured.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bus configuration applied at init.
    pub fn config(&self) -> I2cConfig {
        self.config
    }

    /// Number of failed transactions since construction.
    pub fn fault_count(&self) -> u32 {
        self.fault_count
    }

    /// Most recent failed transaction.
    pub fn last_fault(&self) -> Option<BusTransaction> {
        self.last_fault
    }

    /// Give the bus back (test teardown).
    pub fn release(self) -> I {
        self.i2c
    }

    fn record_fault(&mut self, transaction: BusTransaction) {
        self.fault_count = self.fault_count.saturating_add(1);
        self.last_fault = Some(transaction);
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "bus fault: {} addr={=u8:#x} reg={=u8:#x}",
            transaction.kind,
            transaction.address,
            transaction.register
        );
    }
}

impl<I: I2cPeripheral> RegisterBus for BusManager<I> {
    fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        if self.i2c.configure(self.config).is_err() {
            self.record_fault(BusTransaction {
                kind: Access::Write,
                address: 0,
                register: 0,
                value: 0,
            });
        }
        #[cfg(feature = "defmt")]
        defmt::info!("I2C bus up at {=u32} Hz", self.config.frequency);
    }

    fn read_reg8(&mut self, address: u8, register: u8) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.i2c.write_read(address, &[register], &mut buf) {
            Ok(()) => {
                let [value] = buf;
                Some(value)
            }
            Err(_) => {
                self.record_fault(BusTransaction {
                    kind: Access::Read,
                    address,
                    register,
                    value: 0,
                });
                None
            }
        }
    }

    fn set_reg8(&mut self, address: u8, register: u8, value: u8) {
        if self.i2c.write(address, &[register, value]).is_err() {
            self.record_fault(BusTransaction {
                kind: Access::Write,
                address,
                register,
                value,
            });
        }
    }

    fn probe(&mut self, address: u8) -> bool {
        let mut buf = [0u8; 1];
        // An absent device NAKs its address; that is a probe result, not a fault.
        self.i2c.read(address, &mut buf).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockBus;

    struct Chip {
        address: u8,
        critical: bool,
        present: bool,
    }

    impl Device for Chip {
        fn address(&self) -> u8 {
            self.address
        }
        fn is_critical(&self) -> bool {
            self.critical
        }
        fn is_present(&self) -> bool {
            self.present
        }
        fn set_present(&mut self, present: bool) {
            self.present = present;
        }
    }

    #[test]
    fn set_bits_is_read_then_write() {
        let mut bus = MockBus::new().with_device(0x6A);
        bus.set_register(0x6A, 0x03, 0b0000_0001);
        bus.set_reg8_bits(0x6A, 0x03, 0b0010_0000);
        assert_eq!(bus.register(0x6A, 0x03), 0b0010_0001);
        let kinds: std::vec::Vec<Access> = bus.transactions().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, [Access::Read, Access::Write]);
    }

    #[test]
    fn clear_bits_keeps_other_bits() {
        let mut bus = MockBus::new().with_device(0x6A);
        bus.set_register(0x6A, 0x07, 0xFF);
        bus.clear_reg8_bits(0x6A, 0x07, 0b0011_0000);
        assert_eq!(bus.register(0x6A, 0x07), 0b1100_1111);
    }

    #[test]
    fn failed_read_skips_the_write_back() {
        let mut bus = MockBus::new().with_device(0x6A);
        bus.set_register(0x6A, 0x02, 0x40);
        bus.fail_reads(0x6A, 0x02);
        bus.set_reg8_bits(0x6A, 0x02, 0x80);
        assert_eq!(bus.register(0x6A, 0x02), 0x40);
        assert_eq!(bus.count(Access::Write), 0);
    }

    #[test]
    fn get_reg8_reads_zero_on_fault() {
        let mut bus = MockBus::new().with_device(0x6A);
        bus.set_register(0x6A, 0x0E, 0x55);
        bus.fail_reads(0x6A, 0x0E);
        assert_eq!(bus.get_reg8(0x6A, 0x0E), 0);
    }

    #[test]
    fn reprobe_touches_only_critical_devices() {
        let mut bus = MockBus::new().with_device(0x6A).with_device(0x3C);
        let mut charger = Chip { address: 0x6A, critical: true, present: true };
        let mut display = Chip { address: 0x3C, critical: false, present: false };
        bus.detach(0x6A);

        let changes = {
            let mut devices: [&mut dyn Device; 2] = [&mut charger, &mut display];
            bus.reprobe_critical(&mut devices)
        };

        assert!(!charger.present);
        assert!(!display.present, "non-critical device must not be re-polled");
        assert_eq!(bus.count(Access::Probe), 1);
        assert_eq!(
            changes.as_slice(),
            [PresenceChange { address: 0x6A, present: false }]
        );
    }

    #[test]
    fn reprobe_reports_nothing_when_stable() {
        let mut bus = MockBus::new().with_device(0x6A);
        let mut charger = Chip { address: 0x6A, critical: true, present: true };
        let mut devices: [&mut dyn Device; 1] = [&mut charger];
        assert!(bus.reprobe_critical(&mut devices).is_empty());
    }

    #[test]
    fn probe_devices_sets_every_flag() {
        let mut bus = MockBus::new().with_device(0x3C);
        let mut charger = Chip { address: 0x6A, critical: true, present: true };
        let mut display = Chip { address: 0x3C, critical: false, present: false };
        {
            let mut devices: [&mut dyn Device; 2] = [&mut charger, &mut display];
            bus.probe_devices(&mut devices);
        }
        assert!(!charger.present);
        assert!(display.present);
    }
}
