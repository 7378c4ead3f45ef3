//! Mock implementations for testing
//!
//! [`MockBus`] is a register file behind the [`RegisterBus`] trait: it
//! records every transaction, lets tests attach and detach devices, and can
//! inject read faults on chosen registers.

use std::collections::{BTreeMap, BTreeSet};

use crate::bus::{Access, BusTransaction, RegisterBus};
use crate::storage::{MassStorage, ModelStore};

/// In-memory shared bus.
#[derive(Debug, Default)]
pub struct MockBus {
    registers: BTreeMap<(u8, u8), u8>,
    present: BTreeSet<u8>,
    failing_reads: BTreeSet<(u8, u8)>,
    log: Vec<BusTransaction>,
    init_count: usize,
}

impl MockBus {
    /// Empty bus, no devices attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`attach`](Self::attach).
    #[must_use]
    pub fn with_device(mut self, address: u8) -> Self {
        self.attach(address);
        self
    }

    /// Make `address` acknowledge probes and accept transactions.
    pub fn attach(&mut self, address: u8) {
        self.present.insert(address);
    }

    /// Make `address` NAK. Register contents are kept.
    pub fn detach(&mut self, address: u8) {
        self.present.remove(&address);
    }

    /// Preload a register without logging a transaction.
    pub fn set_register(&mut self, address: u8, register: u8, value: u8) {
        self.registers.insert((address, register), value);
    }

    /// Current register contents (0 if never written).
    pub fn register(&self, address: u8, register: u8) -> u8 {
        self.registers.get(&(address, register)).copied().unwrap_or(0)
    }

    /// Reads of this register fail from now on.
    pub fn fail_reads(&mut self, address: u8, register: u8) {
        self.failing_reads.insert((address, register));
    }

    /// Every transaction attempted so far, in order.
    pub fn transactions(&self) -> &[BusTransaction] {
        &self.log
    }

    /// Number of transactions of one kind.
    pub fn count(&self, kind: Access) -> usize {
        self.log.iter().filter(|t| t.kind == kind).count()
    }

    /// Values written to one register, in order.
    pub fn writes_to(&self, address: u8, register: u8) -> Vec<u8> {
        self.log
            .iter()
            .filter(|t| t.kind == Access::Write && t.address == address && t.register == register)
            .map(|t| t.value)
            .collect()
    }

    /// Registers written on one device, in order (repeats included).
    pub fn written_registers(&self, address: u8) -> Vec<u8> {
        self.log
            .iter()
            .filter(|t| t.kind == Access::Write && t.address == address)
            .map(|t| t.register)
            .collect()
    }

    /// Forget the transaction log (register contents stay).
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Number of times [`RegisterBus::init`] ran.
    pub fn init_count(&self) -> usize {
        self.init_count
    }
}

impl RegisterBus for MockBus {
    fn init(&mut self) {
        self.init_count = self.init_count.saturating_add(1);
    }

    fn read_reg8(&mut self, address: u8, register: u8) -> Option<u8> {
        let ok = self.present.contains(&address)
            && !self.failing_reads.contains(&(address, register));
        let value = if ok { self.register(address, register) } else { 0 };
        self.log.push(BusTransaction {
            kind: Access::Read,
            address,
            register,
            value,
        });
        ok.then_some(value)
    }

    fn set_reg8(&mut self, address: u8, register: u8, value: u8) {
        self.log.push(BusTransaction {
            kind: Access::Write,
            address,
            register,
            value,
        });
        if self.present.contains(&address) {
            self.registers.insert((address, register), value);
        }
    }

    fn probe(&mut self, address: u8) -> bool {
        self.log.push(BusTransaction {
            kind: Access::Probe,
            address,
            register: 0,
            value: 0,
        });
        self.present.contains(&address)
    }
}

/// Storage stand-in that counts `process()` calls.
#[derive(Debug, Default)]
pub struct MockStorage {
    /// Number of `process()` calls.
    pub processed: usize,
}

impl MassStorage for MockStorage {
    fn process(&mut self) {
        self.processed = self.processed.saturating_add(1);
    }
}

/// Model stand-in that counts saves and boots.
#[derive(Debug, Default)]
pub struct MockModel {
    /// Number of `save()` calls.
    pub saves: usize,
    /// Boot counter.
    pub boot_count: u32,
}

impl ModelStore for MockModel {
    fn save(&mut self) {
        self.saves = self.saves.saturating_add(1);
    }

    fn inc_boot_count(&mut self) {
        self.boot_count = self.boot_count.saturating_add(1);
    }
}
