//! SSD1306 monochrome OLED controller command set.
//!
//! Reference: Solomon Systech SSD1306 datasheet rev 1.1
//!
//! Every bus write starts with a control byte: [`CONTROL_COMMAND`] followed by
//! one command byte, or [`CONTROL_DATA`] followed by GDDRAM bytes.

/// 7-bit I2C device address (SA0 tied low).
pub const SSD1306_I2C_ADDR: u8 = 0x3C;

/// Control byte: next byte is a command.
pub const CONTROL_COMMAND: u8 = 0x00;
/// Control byte: following bytes are display data.
pub const CONTROL_DATA: u8 = 0x40;

/// Set contrast control (one argument byte).
pub const SET_CONTRAST: u8 = 0x81;
/// Resume to GDDRAM content.
pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
/// Normal (non-inverted) display.
pub const NORMAL_DISPLAY: u8 = 0xA6;
/// Inverted display.
pub const INVERT_DISPLAY: u8 = 0xA7;
/// Panel off (sleep).
pub const DISPLAY_OFF: u8 = 0xAE;
/// Panel on.
pub const DISPLAY_ON: u8 = 0xAF;
/// Set display offset (vertical shift, one argument byte).
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
/// Set COM pin hardware configuration (one argument byte).
pub const SET_COM_PINS: u8 = 0xDA;
/// Set VCOMH deselect level (one argument byte).
pub const SET_VCOM_DETECT: u8 = 0xDB;
/// Set display clock divide ratio (one argument byte).
pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
/// Set pre-charge period (one argument byte).
pub const SET_PRECHARGE: u8 = 0xD9;
/// Set multiplex ratio (one argument byte).
pub const SET_MULTIPLEX: u8 = 0xA8;
/// Set display start line 0.
pub const SET_START_LINE: u8 = 0x40;
/// Memory addressing mode (one argument byte).
pub const MEMORY_MODE: u8 = 0x20;
/// Column 127 mapped to SEG0.
pub const SEG_REMAP: u8 = 0xA1;
/// Scan from COM[N-1] to COM0.
pub const COM_SCAN_DEC: u8 = 0xC8;
/// Charge pump setting (one argument byte).
pub const CHARGE_PUMP: u8 = 0x8D;
/// Charge pump argument: enable.
pub const CHARGE_PUMP_ON: u8 = 0x14;
/// Charge pump argument: disable.
pub const CHARGE_PUMP_OFF: u8 = 0x10;

/// Encode a signed vertical shift into the display offset argument.
///
/// The controller rotates COM lines modulo the multiplex ratio, so a shift of
/// `-1` is an offset of `rows - 1`. Caller validates `|shift| < rows`.
#[must_use]
pub fn encode_vertical_shift(shift: i8, rows: u8) -> u8 {
    let rows = i16::from(rows.max(1));
    let offset = i16::from(shift).rem_euclid(rows);
    u8::try_from(offset).unwrap_or(0)
}

/// Power-up command sequence for a panel with `rows` COM lines.
///
/// Ends with the panel still off; the driver turns it on last.
#[must_use]
pub fn init_sequence(rows: u8) -> [u8; 22] {
    let com_pins = if rows > 32 { 0x12 } else { 0x02 };
    [
        DISPLAY_OFF,
        SET_DISPLAY_CLOCK_DIV,
        0x80,
        SET_MULTIPLEX,
        rows.saturating_sub(1),
        SET_DISPLAY_OFFSET,
        0x00,
        SET_START_LINE,
        MEMORY_MODE,
        0x00,
        SEG_REMAP,
        COM_SCAN_DEC,
        SET_COM_PINS,
        com_pins,
        SET_CONTRAST,
        0x8F,
        SET_PRECHARGE,
        0xF1,
        SET_VCOM_DETECT,
        0x40,
        DISPLAY_ALL_ON_RESUME,
        NORMAL_DISPLAY,
    ]
}
