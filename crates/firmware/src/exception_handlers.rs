//! Cortex-M exception handlers for the Pendant firmware.
//!
//! - **HardFault**: memory access violations, illegal instructions, or a
//!   stack overflow caught by flip-link. Logged via defmt, then halted so
//!   the independent watchdog resets the device.
//!
//! SysTick is not here: it owns the cadence timer and lives next to it in
//! `main.rs`.
//!
//! # Hardware-only handler
//!
//! The `#[cortex_m_rt::exception]` attribute requires ARM target intrinsics and
//! is therefore gated behind `#[cfg(feature = "hardware")]`. The module itself
//! (and `HARDFAULT_DEFINED`) compiles unconditionally so host tests can verify
//! the module exists without needing an ARM toolchain.

#![allow(clippy::doc_markdown)] // Exception handler docs use hardware terminology (HardFault, SVC) as plain text

/// Marker constant: the HardFault handler below is linked into hardware builds.
pub const HARDFAULT_DEFINED: bool = true;

/// HardFault exception handler (hardware target only).
///
/// Outputs the exception frame address via defmt/RTT, then halts. The
/// watchdog stops being petted, so the device resets within
/// [`WATCHDOG_TIMEOUT_MS`](crate::config::WATCHDOG_TIMEOUT_MS).
///
/// # Safety
///
/// This function must never return — returning from a HardFault handler is
/// undefined behavior on Cortex-M. The `-> !` return type enforces this.
#[cfg(feature = "hardware")]
#[cortex_m_rt::exception]
#[allow(unsafe_code)]
unsafe fn HardFault(ef: &cortex_m_rt::ExceptionFrame) -> ! {
    defmt::panic!(
        "HardFault at pc={=u32:#x} lr={=u32:#x}",
        ef.pc(),
        ef.lr()
    );
}
