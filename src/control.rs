/// Shared control record between the sound-effect task and its requesters.
///
/// Three single-word fields, each an atomic:
/// - `busy`: written only by the player (crate-private setter), read by anyone
///   through [`BusyFlag`].
/// - `work`: written by any task to enable or suppress buzzer output.
/// - `effect`: the requested [`Effect`] code, written by any task, consumed
///   by the player.
///
/// Concurrent writers to `effect` race, last writer wins. Checking
/// [`ControlHandle::is_busy`] before requesting is advisory, not enforced.
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::effect::Effect;

/// What the selector currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Effect(Effect),
    /// A code that names no effect
    Unknown(u8),
}

pub struct ControlHandle {
    busy: AtomicBool,
    work: AtomicBool,
    effect: AtomicU8,
}

/// Read-only view of the busy flag.
#[derive(Clone, Copy)]
pub struct BusyFlag<'a> {
    flag: &'a AtomicBool,
}

impl BusyFlag<'_> {
    /// True while a pattern is committing the tone generator.
    pub fn get(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl ControlHandle {
    /// Initial state: work enabled, `Stop` requested, not busy.
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            work: AtomicBool::new(true),
            effect: AtomicU8::new(Effect::Stop.code()),
        }
    }

    /// Request an effect, replacing whatever was requested before.
    pub fn request(&self, effect: Effect) {
        self.effect.store(effect.code(), Ordering::Relaxed);
    }

    /// Request an effect by raw code. Unknown codes are silenced on the next tick.
    pub fn request_code(&self, code: u8) {
        self.effect.store(code, Ordering::Relaxed);
    }

    /// Request an effect only if nothing is playing. Returns whether the
    /// request was stored.
    pub fn request_if_idle(&self, effect: Effect) -> bool {
        if self.is_busy() {
            return false;
        }
        self.request(effect);
        true
    }

    /// Request an effect unless a finite pattern is in progress. Continuous
    /// effects never finish on their own, so they are always overridden.
    /// Returns whether the request was stored.
    pub fn try_request(&self, effect: Effect) -> bool {
        let continuous = matches!(self.requested(), Request::Effect(e) if e.is_continuous());
        if continuous {
            self.request(effect);
            return true;
        }
        self.request_if_idle(effect)
    }

    /// Currently requested effect.
    pub fn requested(&self) -> Request {
        let code = self.effect.load(Ordering::Relaxed);
        match Effect::try_from(code) {
            Ok(effect) => Request::Effect(effect),
            Err(code) => Request::Unknown(code),
        }
    }

    /// Raw code of the current request.
    pub fn requested_code(&self) -> u8 {
        self.effect.load(Ordering::Relaxed)
    }

    pub fn set_work(&self, enabled: bool) {
        self.work.store(enabled, Ordering::Relaxed);
    }

    pub fn is_work_enabled(&self) -> bool {
        self.work.load(Ordering::Relaxed)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    /// Read-only view of the busy flag, for tasks that only need to poll it.
    pub fn busy_flag(&self) -> BusyFlag<'_> {
        BusyFlag { flag: &self.busy }
    }

    pub(crate) fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Relaxed);
    }

    /// Reset the selector to `Stop` if it still holds `finished`. A request
    /// that arrived while `finished` was playing is left in place.
    pub(crate) fn complete(&self, finished: Effect) -> bool {
        self.effect
            .compare_exchange(
                finished.code(),
                Effect::Stop.code(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// Reset the selector to `Stop` if it still holds `code`.
    pub(crate) fn clear_code(&self, code: u8) {
        let _ = self.effect.compare_exchange(
            code,
            Effect::Stop.code(),
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
    }

    /// Force the selector to `Stop`.
    pub(crate) fn force_stop(&self) {
        self.effect.store(Effect::Stop.code(), Ordering::Relaxed);
    }

    /// Back to the initial state.
    pub(crate) fn reset(&self) {
        self.busy.store(false, Ordering::Relaxed);
        self.work.store(true, Ordering::Relaxed);
        self.effect.store(Effect::Stop.code(), Ordering::Relaxed);
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new()
    }
}
