//! Cadence classes and their readiness flags.
//!
//! Interrupt context raises flags; the main loop test-and-clears them.
//! One flag per class keeps concurrent sources from swallowing each other,
//! and a raised flag is a boolean, not a counter: however many periods
//! elapse while the loop sleeps, the class runs once.

use core::sync::atomic::{AtomicBool, Ordering};

/// Independently timed category of periodic work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CadenceClass {
    /// Slow housekeeping: critical reprobe, charger sampling, model save.
    Idle,
    /// Radio housekeeping.
    Background,
    /// LED effect frame.
    Effect,
    /// Display frame.
    Display,
}

impl CadenceClass {
    /// All classes in dispatch priority order.
    pub const ALL: [Self; 4] = [Self::Idle, Self::Background, Self::Effect, Self::Display];
}

/// Readiness flags shared between interrupt handlers and the loop.
///
/// `const`-constructible so it can live in a `static`.
#[derive(Debug)]
pub struct CadenceFlags {
    idle: AtomicBool,
    background: AtomicBool,
    effect: AtomicBool,
    display: AtomicBool,
}

impl CadenceFlags {
    /// All flags clear.
    pub const fn new() -> Self {
        Self {
            idle: AtomicBool::new(false),
            background: AtomicBool::new(false),
            effect: AtomicBool::new(false),
            display: AtomicBool::new(false),
        }
    }

    fn flag(&self, class: CadenceClass) -> &AtomicBool {
        match class {
            CadenceClass::Idle => &self.idle,
            CadenceClass::Background => &self.background,
            CadenceClass::Effect => &self.effect,
            CadenceClass::Display => &self.display,
        }
    }

    /// Mark `class` ready. Safe to call from interrupt context.
    #[inline]
    pub fn raise(&self, class: CadenceClass) {
        self.flag(class).store(true, Ordering::Release);
    }

    /// Test-and-clear: `true` exactly once per raise, however many raises
    /// happened since the last take.
    #[inline]
    pub fn take(&self, class: CadenceClass) -> bool {
        self.flag(class).swap(false, Ordering::AcqRel)
    }

    /// Peek without consuming.
    #[inline]
    pub fn is_raised(&self, class: CadenceClass) -> bool {
        self.flag(class).load(Ordering::Acquire)
    }
}

impl Default for CadenceFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Period of each class in milliseconds. 0 disables a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CadencePeriods {
    /// Idle period.
    pub idle_ms: u32,
    /// Background period.
    pub background_ms: u32,
    /// Effect frame period.
    pub effect_ms: u32,
    /// Display frame period.
    pub display_ms: u32,
}

impl CadencePeriods {
    /// Period for one class.
    pub const fn period(&self, class: CadenceClass) -> u32 {
        match class {
            CadenceClass::Idle => self.idle_ms,
            CadenceClass::Background => self.background_ms,
            CadenceClass::Effect => self.effect_ms,
            CadenceClass::Display => self.display_ms,
        }
    }
}

/// Turns elapsed time into flag raises. Driven from the tick interrupt.
#[derive(Debug, Clone)]
pub struct CadenceTimer {
    periods: CadencePeriods,
    elapsed: [u32; 4],
}

impl CadenceTimer {
    /// Timer with all accumulators at zero.
    pub const fn new(periods: CadencePeriods) -> Self {
        Self {
            periods,
            elapsed: [0; 4],
        }
    }

    /// Advance every class by `elapsed_ms` and raise the ones whose period
    /// elapsed. A class whose period elapsed several times is raised once
    /// and the remainder carried; missed periods are dropped.
    pub fn tick(&mut self, elapsed_ms: u32, flags: &CadenceFlags) {
        for (class, acc) in CadenceClass::ALL.iter().zip(self.elapsed.iter_mut()) {
            let period = self.periods.period(*class);
            if period == 0 {
                continue;
            }
            *acc = acc.saturating_add(elapsed_ms);
            if *acc >= period {
                *acc = acc.checked_rem(period).unwrap_or(0);
                flags.raise(*class);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIODS: CadencePeriods = CadencePeriods {
        idle_ms: 1000,
        background_ms: 50,
        effect_ms: 16,
        display_ms: 0,
    };

    #[test]
    fn take_clears_once() {
        let flags = CadenceFlags::new();
        flags.raise(CadenceClass::Effect);
        flags.raise(CadenceClass::Effect);
        assert!(flags.is_raised(CadenceClass::Effect));
        assert!(flags.take(CadenceClass::Effect));
        assert!(!flags.take(CadenceClass::Effect));
    }

    #[test]
    fn classes_are_independent() {
        let flags = CadenceFlags::new();
        flags.raise(CadenceClass::Idle);
        assert!(!flags.take(CadenceClass::Background));
        assert!(flags.take(CadenceClass::Idle));
    }

    #[test]
    fn timer_raises_when_period_elapses() {
        let flags = CadenceFlags::new();
        let mut timer = CadenceTimer::new(PERIODS);
        for _ in 0..15 {
            timer.tick(1, &flags);
        }
        assert!(!flags.is_raised(CadenceClass::Effect));
        timer.tick(1, &flags);
        assert!(flags.take(CadenceClass::Effect));
        assert!(!flags.is_raised(CadenceClass::Background));
    }

    #[test]
    fn long_gap_raises_once_and_keeps_phase() {
        let flags = CadenceFlags::new();
        let mut timer = CadenceTimer::new(PERIODS);
        timer.tick(50, &flags);
        assert!(flags.take(CadenceClass::Effect));
        assert!(!flags.take(CadenceClass::Effect));
        // 50 % 16 = 2 carried, so 14 more ms completes the next period
        timer.tick(14, &flags);
        assert!(flags.take(CadenceClass::Effect));
    }

    #[test]
    fn zero_period_disables_class() {
        let flags = CadenceFlags::new();
        let mut timer = CadenceTimer::new(PERIODS);
        timer.tick(10_000, &flags);
        assert!(!flags.is_raised(CadenceClass::Display));
        assert!(flags.is_raised(CadenceClass::Idle));
    }
}
