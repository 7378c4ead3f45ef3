//! System context: the bus plus one instance of every driver.
//!
//! Constructed once at startup and passed by reference to whatever needs
//! bus access. Construction performs no I/O; [`System::init`] brings
//! everything up in dependency order.

use platform::{Device, PresenceChanges, RegisterBus};

use crate::drivers::{Bq25895, ChargerConfig, Ssd1306, Stm32wl};

/// Owner of the shared bus and the peripheral drivers.
pub struct System<B> {
    /// Shared bus.
    pub bus: B,
    /// Charge controller (critical).
    pub charger: Bq25895,
    /// Display controller.
    pub display: Ssd1306,
    /// Radio companion.
    pub radio: Stm32wl,
}

impl<B: RegisterBus> System<B> {
    /// Build the context. No bus traffic until [`init`](Self::init).
    pub fn new(bus: B, charger: ChargerConfig, display_rows: u8) -> Self {
        Self {
            bus,
            charger: Bq25895::new(charger),
            display: Ssd1306::new(display_rows),
            radio: Stm32wl::new(),
        }
    }

    /// Bus first, then presence, then each driver. Absent devices are
    /// skipped and stay inactive until a reprobe finds them.
    pub fn init(&mut self) {
        self.bus.init();
        {
            let mut devices: [&mut dyn Device; 3] =
                [&mut self.charger, &mut self.display, &mut self.radio];
            self.bus.probe_devices(&mut devices);
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "bus devices: charger={=bool} display={=bool} radio={=bool}",
            self.charger.is_present(),
            self.display.is_present(),
            self.radio.is_present()
        );

        // Absent devices report DeviceAbsent here, which is expected.
        let _ = self.charger.init(&mut self.bus);
        let _ = self.display.init(&mut self.bus);
        let _ = self.radio.init(&mut self.bus);
    }

    /// Re-poll the critical devices and configure any that came back.
    pub fn reprobe_critical(&mut self) -> PresenceChanges {
        let changes = {
            let mut devices: [&mut dyn Device; 1] = [&mut self.charger];
            self.bus.reprobe_critical(&mut devices)
        };
        // No-op unless the charger reappeared and lost its init guard
        let _ = self.charger.init(&mut self.bus);
        changes
    }
}
