/// Sound-effect task configuration.
///
/// Compile-time defaults, adjustable through builder methods before the task
/// is created. Nothing here is persisted.
use crate::effect::Effect;
use crate::tone::DEFAULT_LEVEL;

/// Default scheduler period between patterns
pub const DEFAULT_TICK_MS: u32 = 10;

/// Longest tick before pattern timing drift becomes audible
pub const MAX_TICK_MS: u32 = 30;

/// Grace period before the timer is touched, so the rest of the board can
/// finish initializing first
pub const DEFAULT_STARTUP_DELAY_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskConfig {
    /// Wait between patterns, in milliseconds (1..=MAX_TICK_MS)
    pub tick_ms: u32,
    /// Wait before hardware init, in milliseconds
    pub startup_delay_ms: u32,
    /// PWM compare level used for every tone
    pub level: u16,
    /// Effect requested once boot succeeds, if any
    pub boot_effect: Option<Effect>,
}

impl TaskConfig {
    pub const fn new() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            level: DEFAULT_LEVEL,
            boot_effect: Some(Effect::StartupChime),
        }
    }

    /// Set the tick period, clamped to `1..=MAX_TICK_MS`.
    pub fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        let clamped = tick_ms.clamp(1, MAX_TICK_MS);
        if clamped != tick_ms {
            log::warn!("Tick period {} ms out of range, using {} ms", tick_ms, clamped);
        }
        self.tick_ms = clamped;
        self
    }

    pub fn with_startup_delay_ms(mut self, delay_ms: u32) -> Self {
        self.startup_delay_ms = delay_ms;
        self
    }

    pub fn with_level(mut self, level: u16) -> Self {
        self.level = level;
        self
    }

    /// `None` boots silently.
    pub fn with_boot_effect(mut self, effect: Option<Effect>) -> Self {
        self.boot_effect = effect;
        self
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TaskConfig::default();
        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.startup_delay_ms, 500);
        assert_eq!(config.level, 10_000);
        assert_eq!(config.boot_effect, Some(Effect::StartupChime));
    }

    #[test]
    fn tick_is_clamped() {
        assert_eq!(TaskConfig::new().with_tick_ms(0).tick_ms, 1);
        assert_eq!(TaskConfig::new().with_tick_ms(25).tick_ms, 25);
        assert_eq!(TaskConfig::new().with_tick_ms(100).tick_ms, MAX_TICK_MS);
    }

    #[test]
    fn builders_compose() {
        let config = TaskConfig::new()
            .with_startup_delay_ms(0)
            .with_level(20_000)
            .with_boot_effect(None);
        assert_eq!(config.startup_delay_ms, 0);
        assert_eq!(config.level, 20_000);
        assert_eq!(config.boot_effect, None);
    }
}
