//! Main loop.
//!
//! One thread, one bus. Interrupts only raise cadence flags; everything else
//! happens here, in a fixed priority order per iteration:
//!
//! 1. storage housekeeping (every iteration)
//! 2. idle: critical reprobe, charger sample (unless init just took one),
//!    model save
//! 3. background: radio housekeeping
//! 4. effect: interval, effect bookkeeping, calc + commit of the top effect
//! 5. display: same shape, only while the panel is on
//!
//! Safety work always precedes cosmetic work within an iteration, so a slow
//! animation never delays fault detection. Flags are test-and-cleared, so
//! each class runs at most once per iteration however many periods elapsed
//! while the loop slept.

use platform::{Device, LowPowerWait, MassStorage, ModelStore, RegisterBus};

use crate::system::System;
use crate::timeline::{ContentSource, Timeline};

/// Which cadence classes ran during one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatch {
    /// Idle work ran.
    pub idle: bool,
    /// Background work ran.
    pub background: bool,
    /// An effect tick ran.
    pub effect: bool,
    /// A display tick ran.
    pub display: bool,
}

/// The device: system context, timeline and the external collaborators.
pub struct Pendant<'a, B, S, M, C, W> {
    system: System<B>,
    timeline: Timeline<'a, C>,
    storage: S,
    model: M,
    waiter: W,
    started: bool,
}

impl<'a, B, S, M, C, W> Pendant<'a, B, S, M, C, W>
where
    B: RegisterBus,
    S: MassStorage,
    M: ModelStore,
    C: ContentSource<System<B>>,
    W: LowPowerWait,
{
    /// Assemble the device. `system` should already be initialized.
    pub fn new(system: System<B>, timeline: Timeline<'a, C>, storage: S, model: M, waiter: W) -> Self {
        Self {
            system,
            timeline,
            storage,
            model,
            waiter,
            started: false,
        }
    }

    /// System context.
    pub fn system(&self) -> &System<B> {
        &self.system
    }

    /// System context, mutably.
    pub fn system_mut(&mut self) -> &mut System<B> {
        &mut self.system
    }

    /// Timeline.
    pub fn timeline(&self) -> &Timeline<'a, C> {
        &self.timeline
    }

    /// Storage collaborator.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Model collaborator.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// One-time work before the first iteration. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.model.inc_boot_count();
        #[cfg(feature = "defmt")]
        defmt::info!("entering main loop");
    }

    /// Run forever: sleep until an interrupt, then dispatch.
    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.wait();
            self.step();
        }
    }

    /// Block in the low-power wait until the next interrupt.
    pub fn wait(&mut self) {
        self.waiter.wait_for_interrupt();
    }

    /// One loop iteration after wake-up.
    pub fn step(&mut self) -> Dispatch {
        let mut ran = Dispatch::default();

        self.storage.process();

        if self.timeline.check_idle_ready_and_clear() {
            let changes = self.system.reprobe_critical();
            let charger = self.system.charger.address();
            // A charger that just came back was sampled by its init.
            if !changes.iter().any(|c| c.present && c.address == charger) {
                self.system.charger.update_state(&mut self.system.bus);
            }
            self.model.save();
            ran.idle = true;
        }

        if self.timeline.check_background_ready_and_clear() {
            self.system.radio.update(&mut self.system.bus);
            ran.background = true;
        }

        if self.timeline.check_effect_ready_and_clear() {
            self.timeline.run_effect_tick(&mut self.system);
            ran.effect = true;
        }

        // Power check first: a display flag raised while the panel is off
        // stays pending instead of being consumed.
        if self.system.display.is_display_on() && self.timeline.check_display_ready_and_clear() {
            self.timeline.run_display_tick(&mut self.system);
            ran.display = true;
        }

        ran
    }
}
