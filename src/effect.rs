/// Sound effect selector and the fixed pattern table.
///
/// Every effect is a static list of [`Segment`]s: switch the tone on at a
/// divisor (or off), then hold for a number of milliseconds. A hold of zero
/// means the next segment follows immediately. The player walks these lists;
/// nothing here touches hardware.
use crate::tone::{DIVISOR_HIGH, DIVISOR_HIGH_MID, DIVISOR_LOW, DIVISOR_LOW_MID};

/// Short beep length and the gap between repeated beeps
const SHORT_MS: u32 = 70;
/// Sustained tone length
const LONG_MS: u32 = 500;
/// Startup chime step length
const CHIME_MS: u32 = 333;
/// Continuous effects: tone, then silence, per cycle
const CONTINUOUS_ON_MS: u32 = 100;
const CONTINUOUS_OFF_MS: u32 = 50;

/// What the tone generator does at the start of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Sound at the given divisor (fixed level)
    On(u16),
    /// Silence
    Off,
}

/// One step of a pattern: a tone change followed by a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub tone: Tone,
    pub hold_ms: u32,
}

const fn on(divisor: u16, hold_ms: u32) -> Segment {
    Segment {
        tone: Tone::On(divisor),
        hold_ms,
    }
}

const fn off(hold_ms: u32) -> Segment {
    Segment {
        tone: Tone::Off,
        hold_ms,
    }
}

const STARTUP_CHIME: &[Segment] = &[
    on(DIVISOR_LOW_MID, CHIME_MS),
    on(DIVISOR_HIGH_MID, CHIME_MS),
    on(DIVISOR_HIGH, CHIME_MS),
    off(0),
];

const BEEP_1: &[Segment] = &[on(DIVISOR_HIGH, SHORT_MS), off(0)];

const BEEP_2: &[Segment] = &[
    on(DIVISOR_HIGH, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_HIGH, SHORT_MS),
    off(0),
];

const BEEP_3: &[Segment] = &[
    on(DIVISOR_HIGH, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_HIGH, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_HIGH, SHORT_MS),
    off(0),
];

// No trailing off: the tone keeps sounding until the next tick handles Stop.
const LONG_BEEP: &[Segment] = &[on(DIVISOR_HIGH, LONG_MS)];

const BEEP_CONTINUOUS: &[Segment] = &[
    on(DIVISOR_HIGH, CONTINUOUS_ON_MS),
    off(CONTINUOUS_OFF_MS),
];

const LOW_BEEP_1: &[Segment] = &[on(DIVISOR_LOW, SHORT_MS), off(0)];

const LOW_BEEP_2: &[Segment] = &[
    on(DIVISOR_LOW, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_LOW, SHORT_MS),
    off(0),
];

const LOW_BEEP_3: &[Segment] = &[
    on(DIVISOR_LOW, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_LOW, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_LOW, SHORT_MS),
    off(0),
];

const LONG_LOW_BEEP: &[Segment] = &[on(DIVISOR_LOW, LONG_MS)];

const LOW_BEEP_CONTINUOUS: &[Segment] = &[
    on(DIVISOR_LOW, CONTINUOUS_ON_MS),
    off(CONTINUOUS_OFF_MS),
];

const LOW_THEN_DOUBLE_BEEP: &[Segment] = &[
    on(DIVISOR_LOW, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_HIGH, SHORT_MS),
    off(SHORT_MS),
    on(DIVISOR_HIGH, SHORT_MS),
    off(0),
];

/// Requested sound effect.
///
/// The discriminant is the one-byte code stored in the shared control
/// record. Codes outside this set are possible through
/// [`ControlHandle::request_code`](crate::control::ControlHandle::request_code)
/// and are resolved to `Stop` by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Effect {
    /// Silence
    Stop = 0,
    /// Three rising tones, played once at boot
    StartupChime = 1,
    /// One short high beep (e.g. a parameter stepped up)
    Beep1 = 2,
    /// Two short high beeps (e.g. a mode toggled)
    Beep2 = 3,
    /// Three short high beeps (e.g. an important function enabled)
    Beep3 = 4,
    /// One sustained high tone (e.g. target acquired)
    LongBeep = 5,
    /// Repeating high beeps until overridden (e.g. tracking in progress)
    BeepContinuous = 6,
    /// One short low beep (e.g. a parameter stepped down)
    LowBeep1 = 7,
    /// Two short low beeps (e.g. tag detected)
    LowBeep2 = 8,
    /// Three short low beeps (e.g. an operation failed)
    LowBeep3 = 9,
    /// One sustained low tone (e.g. an important function disabled)
    LongLowBeep = 10,
    /// Repeating low beeps until overridden (e.g. a fault condition)
    LowBeepContinuous = 11,
    /// One low beep followed by two high beeps
    LowThenDoubleBeep = 12,
}

impl Effect {
    /// Every playable effect, in code order (excludes `Stop`).
    pub const ALL: [Effect; 12] = [
        Effect::StartupChime,
        Effect::Beep1,
        Effect::Beep2,
        Effect::Beep3,
        Effect::LongBeep,
        Effect::BeepContinuous,
        Effect::LowBeep1,
        Effect::LowBeep2,
        Effect::LowBeep3,
        Effect::LongLowBeep,
        Effect::LowBeepContinuous,
        Effect::LowThenDoubleBeep,
    ];

    /// One-byte code stored in the control record.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Segments played for this effect. `Stop` has none.
    pub const fn pattern(self) -> &'static [Segment] {
        match self {
            Effect::Stop => &[],
            Effect::StartupChime => STARTUP_CHIME,
            Effect::Beep1 => BEEP_1,
            Effect::Beep2 => BEEP_2,
            Effect::Beep3 => BEEP_3,
            Effect::LongBeep => LONG_BEEP,
            Effect::BeepContinuous => BEEP_CONTINUOUS,
            Effect::LowBeep1 => LOW_BEEP_1,
            Effect::LowBeep2 => LOW_BEEP_2,
            Effect::LowBeep3 => LOW_BEEP_3,
            Effect::LongLowBeep => LONG_LOW_BEEP,
            Effect::LowBeepContinuous => LOW_BEEP_CONTINUOUS,
            Effect::LowThenDoubleBeep => LOW_THEN_DOUBLE_BEEP,
        }
    }

    /// Continuous effects re-arm every tick and never reset the selector.
    pub const fn is_continuous(self) -> bool {
        matches!(self, Effect::BeepContinuous | Effect::LowBeepContinuous)
    }

    /// Total hold time of one pass through the pattern, in milliseconds.
    pub fn duration_ms(self) -> u32 {
        self.pattern().iter().map(|s| s.hold_ms).sum()
    }

    /// The effect that follows this one in [`Effect::ALL`], wrapping around.
    pub fn next(self) -> Effect {
        let idx = Self::ALL.iter().position(|&e| e == self);
        match idx {
            Some(i) => Self::ALL[(i + 1) % Self::ALL.len()],
            None => Self::ALL[0],
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Effect::Stop => "stop",
            Effect::StartupChime => "startup_chime",
            Effect::Beep1 => "beep_1",
            Effect::Beep2 => "beep_2",
            Effect::Beep3 => "beep_3",
            Effect::LongBeep => "long_beep",
            Effect::BeepContinuous => "beep_continuous",
            Effect::LowBeep1 => "low_beep_1",
            Effect::LowBeep2 => "low_beep_2",
            Effect::LowBeep3 => "low_beep_3",
            Effect::LongLowBeep => "long_low_beep",
            Effect::LowBeepContinuous => "low_beep_continuous",
            Effect::LowThenDoubleBeep => "low_then_double_beep",
        }
    }
}

impl TryFrom<u8> for Effect {
    /// The unrecognized code
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Effect::Stop),
            1 => Ok(Effect::StartupChime),
            2 => Ok(Effect::Beep1),
            3 => Ok(Effect::Beep2),
            4 => Ok(Effect::Beep3),
            5 => Ok(Effect::LongBeep),
            6 => Ok(Effect::BeepContinuous),
            7 => Ok(Effect::LowBeep1),
            8 => Ok(Effect::LowBeep2),
            9 => Ok(Effect::LowBeep3),
            10 => Ok(Effect::LongLowBeep),
            11 => Ok(Effect::LowBeepContinuous),
            12 => Ok(Effect::LowThenDoubleBeep),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Effect::Stop.code(), 0);
        assert_eq!(Effect::StartupChime.code(), 1);
        assert_eq!(Effect::LowThenDoubleBeep.code(), 12);
        for effect in Effect::ALL {
            assert_eq!(Effect::try_from(effect.code()), Ok(effect));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(Effect::try_from(13), Err(13));
        assert_eq!(Effect::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn stop_has_no_pattern() {
        assert!(Effect::Stop.pattern().is_empty());
        assert_eq!(Effect::Stop.duration_ms(), 0);
    }

    #[test]
    fn startup_chime_rises() {
        assert_eq!(
            Effect::StartupChime.pattern(),
            &[on(3, 333), on(2, 333), on(1, 333), off(0)]
        );
        assert_eq!(Effect::StartupChime.duration_ms(), 999);
    }

    #[test]
    fn low_then_double_beep_switches_pitch() {
        assert_eq!(
            Effect::LowThenDoubleBeep.pattern(),
            &[on(4, 70), off(70), on(1, 70), off(70), on(1, 70), off(0)]
        );
    }

    #[test]
    fn long_tones_have_no_trailing_off() {
        assert_eq!(Effect::LongBeep.pattern(), &[on(1, 500)]);
        assert_eq!(Effect::LongLowBeep.pattern(), &[on(4, 500)]);
    }

    #[test]
    fn only_repeating_effects_are_continuous() {
        let continuous: Vec<Effect> = Effect::ALL
            .iter()
            .copied()
            .filter(|e| e.is_continuous())
            .collect();
        assert_eq!(
            continuous,
            vec![Effect::BeepContinuous, Effect::LowBeepContinuous]
        );
        assert_eq!(Effect::BeepContinuous.duration_ms(), 150);
    }

    #[test]
    fn finite_patterns_end_with_zero_hold_off_or_long_tone() {
        for effect in Effect::ALL.iter().filter(|e| !e.is_continuous()) {
            let last = effect.pattern().last().unwrap();
            match effect {
                Effect::LongBeep | Effect::LongLowBeep => assert_eq!(last.hold_ms, 500),
                _ => assert_eq!(*last, off(0), "{}", effect.as_str()),
            }
        }
    }

    #[test]
    fn next_cycles_through_all() {
        assert_eq!(Effect::StartupChime.next(), Effect::Beep1);
        assert_eq!(Effect::LowThenDoubleBeep.next(), Effect::StartupChime);
        assert_eq!(Effect::Stop.next(), Effect::StartupChime);
    }
}
