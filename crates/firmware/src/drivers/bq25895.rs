//! BQ25895 charge controller driver.
//!
//! The charger is the one critical device on the bus: it is re-polled at
//! idle cadence and reconfigured from [`ChargerConfig`] whenever it drops off
//! and comes back.
//!
//! # Register access
//!
//! | Operation | Register | Access |
//! |-----------|----------|--------|
//! | OTG enable/disable | REG03 bit 5 | read-modify-write |
//! | Watchdog disable | REG07 bits 5:4 | read-modify-write |
//! | One-shot ADC | REG02 bits 7:6 | two read-modify-writes |
//! | DP/DM detection | REG02 bit 1 | read-modify-write |
//! | Minimum system voltage | REG03 bits 3:1 | read-modify-write, floor |
//! | Boost voltage | REG0A bits 7:4 | read-modify-write, ceiling |
//! | Input current | REG00 | whole byte |

use platform::bq25895::{
    decode_battery_voltage, decode_charge_current, decode_input_current, decode_system_voltage,
    decode_vbus_voltage, encode_input_current, ChargeStatus, VbusStatus, BOOSTV_FIELD, BOOST_MV,
    BQ25895_I2C_ADDR, CONV_RATE, CONV_START, FORCE_DPDM, OTG_CONFIG, REG00_INPUT_SOURCE,
    REG02_ADC_CONTROL, REG03_POWER_ON_CONFIG, REG07_TIMER_CONTROL, REG0A_BOOST, REG0B_STATUS,
    REG0C_FAULT, REG0E_BATTERY_VOLTAGE, REG0F_SYSTEM_VOLTAGE, REG11_VBUS_VOLTAGE,
    REG12_CHARGE_CURRENT_ADC, STATUS_CHRG_FIELD, STATUS_PG_MASK, STATUS_VBUS_FIELD,
    SYS_MIN_FIELD, SYS_MIN_MV, WATCHDOG_MASK,
};
use platform::power::lipo_percentage;
use platform::{Device, DriverError, PowerMonitor, RegisterBus};

/// Limits applied by [`Bq25895::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerConfig {
    /// Boost (OTG) output voltage, 4550..=5510 mV.
    pub boost_mv: u32,
    /// Minimum system voltage, 3000..=3700 mV.
    pub min_system_mv: u32,
    /// Input current limit, 0 or 50..=3249 mA.
    pub input_current_ma: u32,
}

impl Default for ChargerConfig {
    fn default() -> Self {
        Self {
            boost_mv: 4550,
            min_system_mv: 3500,
            input_current_ma: 500,
        }
    }
}

/// Charger state as of the last [`Bq25895::update_state`].
///
/// Values are valid only at the instant they were sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerSnapshot {
    /// REG0B raw status byte.
    pub status: u8,
    /// REG0C raw fault byte.
    pub fault: u8,
    /// Battery voltage (V).
    pub battery_voltage: f32,
    /// System voltage (V).
    pub system_voltage: f32,
    /// VBUS voltage (V).
    pub vbus_voltage: f32,
    /// Charge current (mA).
    pub charge_current: f32,
}

impl ChargerSnapshot {
    /// VBUS_STAT field as a raw 3-bit value.
    pub fn vbus_status(&self) -> u8 {
        STATUS_VBUS_FIELD.extract(self.status)
    }

    /// CHRG_STAT field as a raw 2-bit value.
    pub fn charge_status(&self) -> u8 {
        STATUS_CHRG_FIELD.extract(self.status)
    }

    /// Decoded input source type.
    pub fn input_source(&self) -> VbusStatus {
        VbusStatus::from_status(self.status)
    }

    /// Decoded charging phase.
    pub fn charge_phase(&self) -> ChargeStatus {
        ChargeStatus::from_status(self.status)
    }
}

/// BQ25895 driver. Owns no bus; every operation borrows one.
#[derive(Debug)]
pub struct Bq25895 {
    present: bool,
    initialized: bool,
    config: ChargerConfig,
    snapshot: ChargerSnapshot,
}

impl Bq25895 {
    /// Driver in the "not yet probed" state.
    pub fn new(config: ChargerConfig) -> Self {
        Self {
            present: false,
            initialized: false,
            config,
            snapshot: ChargerSnapshot::default(),
        }
    }

    /// `true` once [`init`](Self::init) has run against the present device.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Limits applied at init.
    pub fn config(&self) -> ChargerConfig {
        self.config
    }

    fn ensure_present(&self) -> Result<(), DriverError> {
        if self.present {
            Ok(())
        } else {
            Err(DriverError::DeviceAbsent)
        }
    }

    /// Configure the charger. Runs once per appearance on the bus; later
    /// calls perform no bus I/O.
    ///
    /// Outputs are disabled before any limit is touched, and the first
    /// sample is taken only after configuration.
    pub fn init<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        self.disable_otg(bus)?;
        self.disable_watchdog(bus)?;
        self.one_shot_adc(bus)?;
        let ChargerConfig {
            boost_mv,
            min_system_mv,
            input_current_ma,
        } = self.config;
        log_step("boost voltage", self.set_boost_voltage(bus, boost_mv));
        log_step("min system voltage", self.set_min_system_voltage(bus, min_system_mv));
        log_step("input current", self.set_input_current(bus, input_current_ma));
        self.force_dpdm_detection(bus)?;
        self.update_state(bus);
        self.log_stats();
        Ok(())
    }

    /// Disable the I2C watchdog so the charger keeps host-programmed limits.
    pub fn disable_watchdog<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        bus.clear_reg8_bits(BQ25895_I2C_ADDR, REG07_TIMER_CONTROL, WATCHDOG_MASK);
        Ok(())
    }

    /// Turn the boost (OTG) output off.
    pub fn disable_otg<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        bus.clear_reg8_bits(BQ25895_I2C_ADDR, REG03_POWER_ON_CONFIG, OTG_CONFIG);
        Ok(())
    }

    /// Turn the boost (OTG) output on.
    pub fn enable_otg<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        bus.set_reg8_bits(BQ25895_I2C_ADDR, REG03_POWER_ON_CONFIG, OTG_CONFIG);
        Ok(())
    }

    /// Battery voltage in volts, 0.0 when absent.
    pub fn read_battery_voltage<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> f32 {
        self.read_adc(bus, REG0E_BATTERY_VOLTAGE, decode_battery_voltage)
    }

    /// System voltage in volts, 0.0 when absent.
    pub fn read_system_voltage<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> f32 {
        self.read_adc(bus, REG0F_SYSTEM_VOLTAGE, decode_system_voltage)
    }

    /// VBUS voltage in volts, 0.0 when absent.
    pub fn read_vbus_voltage<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> f32 {
        self.read_adc(bus, REG11_VBUS_VOLTAGE, decode_vbus_voltage)
    }

    /// Charge current in milliamps, 0.0 when absent.
    pub fn read_charge_current<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> f32 {
        self.read_adc(bus, REG12_CHARGE_CURRENT_ADC, decode_charge_current)
    }

    fn read_adc<B: RegisterBus + ?Sized>(
        &self,
        bus: &mut B,
        register: u8,
        decode: fn(u8) -> f32,
    ) -> f32 {
        if !self.present {
            return 0.0;
        }
        decode(bus.get_reg8(BQ25895_I2C_ADDR, register))
    }

    /// Sample status, fault and all ADC channels, then start the next
    /// one-shot conversion. Does nothing when absent.
    pub fn update_state<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) {
        if !self.present {
            return;
        }
        self.snapshot = ChargerSnapshot {
            status: bus.get_reg8(BQ25895_I2C_ADDR, REG0B_STATUS),
            fault: bus.get_reg8(BQ25895_I2C_ADDR, REG0C_FAULT),
            battery_voltage: self.read_battery_voltage(bus),
            system_voltage: self.read_system_voltage(bus),
            vbus_voltage: self.read_vbus_voltage(bus),
            charge_current: self.read_charge_current(bus),
        };
        // present was checked above
        let _ = self.one_shot_adc(bus);
    }

    /// Set the minimum system voltage, rounding down to a 100 mV step.
    ///
    /// Validation happens before any bus access: an out-of-range request
    /// leaves REG03 untouched.
    pub fn set_min_system_voltage<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
        millivolts: u32,
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        let code = SYS_MIN_MV.encode_floor(millivolts)?;
        let reg = bus.read_reg8(BQ25895_I2C_ADDR, REG03_POWER_ON_CONFIG);
        if let Some(reg) = reg {
            bus.set_reg8(
                BQ25895_I2C_ADDR,
                REG03_POWER_ON_CONFIG,
                SYS_MIN_FIELD.insert(reg, code),
            );
        }
        Ok(())
    }

    /// Set the boost output voltage, rounding **up** to a 64 mV step so the
    /// output never falls short of the request.
    pub fn set_boost_voltage<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
        millivolts: u32,
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        let code = BOOST_MV.encode_ceil(millivolts)?;
        if let Some(reg) = bus.read_reg8(BQ25895_I2C_ADDR, REG0A_BOOST) {
            bus.set_reg8(BQ25895_I2C_ADDR, REG0A_BOOST, BOOSTV_FIELD.insert(reg, code));
        }
        Ok(())
    }

    /// Programmed boost voltage in millivolts, 0 when absent.
    pub fn boost_voltage<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> u32 {
        if !self.present {
            return 0;
        }
        BOOST_MV.decode(BOOSTV_FIELD.extract(bus.get_reg8(BQ25895_I2C_ADDR, REG0A_BOOST)))
    }

    /// Set the input current limit. Writes the whole REG00 byte, which also
    /// clears EN_HIZ and EN_ILIM.
    pub fn set_input_current<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
        milliamps: u32,
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        let code = encode_input_current(milliamps)?;
        bus.set_reg8(BQ25895_I2C_ADDR, REG00_INPUT_SOURCE, code);
        Ok(())
    }

    /// Programmed input current limit as `IINLIM × 50` mA, 0 when absent.
    pub fn input_current<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> u32 {
        if !self.present {
            return 0;
        }
        decode_input_current(bus.get_reg8(BQ25895_I2C_ADDR, REG00_INPUT_SOURCE))
    }

    /// `true` while an ADC conversion is in progress. False when absent.
    pub fn adc_active<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> bool {
        self.present && bus.get_reg8(BQ25895_I2C_ADDR, REG02_ADC_CONTROL) & CONV_START != 0
    }

    /// Select one-shot mode and start a conversion.
    pub fn one_shot_adc<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), DriverError> {
        self.ensure_present()?;
        bus.clear_reg8_bits(BQ25895_I2C_ADDR, REG02_ADC_CONTROL, CONV_RATE);
        bus.set_reg8_bits(BQ25895_I2C_ADDR, REG02_ADC_CONTROL, CONV_START);
        Ok(())
    }

    /// Restart input source type detection.
    pub fn force_dpdm_detection<B: RegisterBus + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<(), DriverError> {
        self.ensure_present()?;
        bus.set_reg8_bits(BQ25895_I2C_ADDR, REG02_ADC_CONTROL, FORCE_DPDM);
        Ok(())
    }

    /// Last sampled state. No bus I/O.
    pub fn stats(&self) -> ChargerSnapshot {
        self.snapshot
    }

    /// Dump the last snapshot to the log. No bus I/O.
    pub fn log_stats(&self) {
        #[cfg(feature = "defmt")]
        {
            let s = &self.snapshot;
            defmt::info!("Battery Voltage: {=f32} V", s.battery_voltage);
            defmt::info!("System Voltage: {=f32} V", s.system_voltage);
            defmt::info!("VBUS Voltage: {=f32} V", s.vbus_voltage);
            defmt::info!("Charge Current: {=f32} mA", s.charge_current);
            defmt::info!(
                "Status: VBUS({=u8:#x}) Charge({=u8:#x}) Fault({=u8:#x})",
                s.vbus_status(),
                s.charge_status(),
                s.fault
            );
        }
    }
}

#[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
fn log_step(step: &str, result: Result<(), DriverError>) {
    if let Err(e) = result {
        #[cfg(feature = "defmt")]
        defmt::warn!("charger init: {=str} skipped: {}", step, e);
    }
}

impl Device for Bq25895 {
    fn address(&self) -> u8 {
        BQ25895_I2C_ADDR
    }

    fn is_critical(&self) -> bool {
        true
    }

    fn is_present(&self) -> bool {
        self.present
    }

    fn set_present(&mut self, present: bool) {
        if !present {
            // Reconfigure from scratch if the charger comes back.
            self.initialized = false;
        }
        self.present = present;
    }
}

impl PowerMonitor for Bq25895 {
    fn battery_voltage(&self) -> Option<u16> {
        if !self.present {
            return None;
        }
        Some((self.snapshot.battery_voltage * 1000.0) as u16)
    }

    fn battery_percentage(&self) -> Option<u8> {
        self.battery_voltage().map(lipo_percentage)
    }

    fn is_charging(&self) -> bool {
        self.present
            && matches!(
                self.snapshot.charge_phase(),
                ChargeStatus::PreCharge | ChargeStatus::FastCharging
            )
    }

    fn is_usb_connected(&self) -> bool {
        self.present && self.snapshot.status & STATUS_PG_MASK != 0
    }
}
