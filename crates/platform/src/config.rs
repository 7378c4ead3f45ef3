//! Application configuration and constants
//!
//! Branding and version strings. Board tuning lives in the firmware crate's
//! `config` module.

/// The application name
pub const APP_NAME: &str = "Pendant";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boot banner
pub const fn boot_banner() -> &'static str {
    "Pendant firmware"
}
