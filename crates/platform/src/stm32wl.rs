//! STM32WL radio companion register map.
//!
//! The companion MCU runs the radio stack and exposes a two-register
//! slave interface on the shared bus.

/// 7-bit I2C address of the companion's slave interface.
pub const STM32WL_I2C_ADDR: u8 = 0x33;

/// STATUS: link and queue state (read-only).
pub const REG_STATUS: u8 = 0x00;
/// CONTROL: radio enable (read/write).
pub const REG_CONTROL: u8 = 0x01;

/// STATUS bit 0: a peer link is established.
pub const STATUS_LINK_UP: u8 = 1 << 0;
/// STATUS bit 1: a received frame is waiting.
pub const STATUS_RX_PENDING: u8 = 1 << 1;
/// STATUS bit 2: a transmission is in flight.
pub const STATUS_TX_BUSY: u8 = 1 << 2;

/// CONTROL bit 0: radio enabled.
pub const CONTROL_ENABLE: u8 = 1 << 0;

/// Decoded STATUS register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioStatus {
    /// Peer link established.
    pub link_up: bool,
    /// Received frame waiting.
    pub rx_pending: bool,
    /// Transmission in flight.
    pub tx_busy: bool,
}

impl RadioStatus {
    /// Decode a STATUS byte. Reserved bits are ignored.
    #[must_use]
    pub const fn from_register(status: u8) -> Self {
        Self {
            link_up: status & STATUS_LINK_UP != 0,
            rx_pending: status & STATUS_RX_PENDING != 0,
            tx_busy: status & STATUS_TX_BUSY != 0,
        }
    }
}
