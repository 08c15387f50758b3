/// Tone generator contract and tone constants.
///
/// The buzzer is driven by a PWM channel whose period is stretched by a
/// divisor: the timer counts a full 16-bit period from a base clock split by
/// `divisor + 1`, so a larger divisor gives a lower pitch. The level is a
/// compare value against that 16-bit period, i.e. the duty cycle.

/// Highest pitch, used by the short and long high beeps
pub const DIVISOR_HIGH: u16 = 1;
pub const DIVISOR_HIGH_MID: u16 = 2;
pub const DIVISOR_LOW_MID: u16 = 3;
/// Lowest pitch, used by the low beeps
pub const DIVISOR_LOW: u16 = 4;

/// Every divisor the pattern table uses, ascending.
pub const DIVISORS: [u16; 4] = [DIVISOR_HIGH, DIVISOR_HIGH_MID, DIVISOR_LOW_MID, DIVISOR_LOW];

/// Compare value of a full PWM period
pub const LEVEL_FULL_SCALE: u32 = 1 << 16;

/// Fixed output level used by every effect (~15% duty)
pub const DEFAULT_LEVEL: u16 = 10_000;

/// Tone frequency at divisor 0: an 84 MHz timer clock over a 16-bit period.
pub const TONE_BASE_HZ: u32 = 84_000_000 / LEVEL_FULL_SCALE;

/// Hardware tone generator.
///
/// `tone_on` and `tone_off` take effect immediately and never fail from the
/// caller's point of view; a driver that hits a hardware error logs it and
/// carries on. Only `init` reports failure.
pub trait ToneDriver {
    type Error: core::fmt::Debug;

    /// Configure the timer and output. Called once before any tone.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Start (or retune) the tone at `divisor` with output `level`.
    fn tone_on(&mut self, divisor: u16, level: u16);

    /// Silence the tone. Idempotent.
    fn tone_off(&mut self);
}

/// Audible frequency produced by `divisor`.
pub const fn tone_frequency_hz(divisor: u16) -> u32 {
    TONE_BASE_HZ / (divisor as u32 + 1)
}

/// Duty cycle in percent for a compare `level`, rounded down, at least 1
/// for any non-zero level.
pub const fn duty_pct(level: u16) -> u8 {
    if level == 0 {
        return 0;
    }
    let pct = (level as u32 * 100) / LEVEL_FULL_SCALE;
    if pct == 0 {
        1
    } else {
        pct as u8
    }
}
