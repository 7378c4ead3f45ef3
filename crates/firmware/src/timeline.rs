//! Timeline: cadence readiness plus the top effect and display work items.
//!
//! Work items split compute from commit. [`WorkItem::calc`] gets no hardware
//! handle, so it cannot touch the bus; only [`WorkItem::commit`] applies
//! hardware-visible state. An item that is not [`valid`](WorkItem::valid)
//! is skipped for the tick: no calc, no commit.

use platform::{CadenceClass, CadenceFlags};

/// Unit of effect or display work.
pub trait WorkItem<H: ?Sized> {
    /// Whether the item should run this tick.
    fn valid(&self) -> bool;

    /// Compute the next state. Must not touch hardware.
    fn calc(&mut self);

    /// Apply the computed state.
    fn commit(&mut self, hw: &mut H);
}

/// Provider of effect and display work (the content engine).
pub trait ContentSource<H: ?Sized> {
    /// Effect work item type.
    type Effect: WorkItem<H>;
    /// Display work item type.
    type Display: WorkItem<H>;

    /// Interval bookkeeping, run at the start of every effect and display tick.
    fn process_interval(&mut self);

    /// Effect queue bookkeeping, run before querying the top effect.
    fn process_effect(&mut self);

    /// Display queue bookkeeping, run before querying the top display item.
    fn process_display(&mut self);

    /// Currently active effect.
    fn top_effect(&mut self) -> &mut Self::Effect;

    /// Currently active display item.
    fn top_display(&mut self) -> &mut Self::Display;
}

/// Readiness flags paired with the content they gate.
pub struct Timeline<'a, C> {
    flags: &'a CadenceFlags,
    content: C,
}

impl<'a, C> Timeline<'a, C> {
    /// Pair `flags` (raised from interrupt context) with `content`.
    pub fn new(flags: &'a CadenceFlags, content: C) -> Self {
        Self { flags, content }
    }

    /// Content source.
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Content source, mutably.
    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Test-and-clear the idle flag.
    pub fn check_idle_ready_and_clear(&self) -> bool {
        self.flags.take(CadenceClass::Idle)
    }

    /// Test-and-clear the background flag.
    pub fn check_background_ready_and_clear(&self) -> bool {
        self.flags.take(CadenceClass::Background)
    }

    /// Test-and-clear the effect flag.
    pub fn check_effect_ready_and_clear(&self) -> bool {
        self.flags.take(CadenceClass::Effect)
    }

    /// Test-and-clear the display flag.
    pub fn check_display_ready_and_clear(&self) -> bool {
        self.flags.take(CadenceClass::Display)
    }

    /// One effect tick. Returns `true` if the top effect was committed.
    pub fn run_effect_tick<H: ?Sized>(&mut self, hw: &mut H) -> bool
    where
        C: ContentSource<H>,
    {
        self.content.process_interval();
        self.content.process_effect();
        run_item(self.content.top_effect(), hw)
    }

    /// One display tick. Returns `true` if the top display item was committed.
    pub fn run_display_tick<H: ?Sized>(&mut self, hw: &mut H) -> bool
    where
        C: ContentSource<H>,
    {
        self.content.process_interval();
        self.content.process_display();
        run_item(self.content.top_display(), hw)
    }
}

fn run_item<H: ?Sized, W: WorkItem<H>>(item: &mut W, hw: &mut H) -> bool {
    if !item.valid() {
        return false;
    }
    item.calc();
    item.commit(hw);
    true
}

/// Work item that never runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoItem;

impl<H: ?Sized> WorkItem<H> for NoItem {
    fn valid(&self) -> bool {
        false
    }

    fn calc(&mut self) {}

    fn commit(&mut self, _hw: &mut H) {}
}

/// Content source with nothing scheduled. Stands in until a content engine
/// is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContent {
    effect: NoItem,
    display: NoItem,
}

impl<H: ?Sized> ContentSource<H> for NoContent {
    type Effect = NoItem;
    type Display = NoItem;

    fn process_interval(&mut self) {}

    fn process_effect(&mut self) {}

    fn process_display(&mut self) {}

    fn top_effect(&mut self) -> &mut NoItem {
        &mut self.effect
    }

    fn top_display(&mut self) -> &mut NoItem {
        &mut self.display
    }
}
