/// Effect player: walks the pattern of the requested effect, one hold at a time.
///
/// The player is a state machine. `Idle` reads the selector; `Playing`
/// carries the effect and a cursor into its pattern. Each [`EffectPlayer::step`]
/// applies tone changes up to the next non-zero hold and returns how long
/// the caller must wait before stepping again, so a pattern is spread over
/// several calls and the caller can check the work flag between them.
use crate::control::{ControlHandle, Request};
use crate::effect::{Effect, Tone};
use crate::tone::ToneDriver;

/// How long to wait before the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Mid-pattern: wait exactly this many milliseconds
    Hold(u32),
    /// Between patterns: wait one scheduler tick
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing { effect: Effect, cursor: usize },
}

pub struct EffectPlayer<D: ToneDriver> {
    driver: D,
    level: u16,
    state: PlayerState,
    /// Whether the last driver call left the tone on
    sounding: bool,
    /// Last effect started, to keep continuous re-arms out of the log
    last_started: Effect,
}

impl<D: ToneDriver> EffectPlayer<D> {
    pub fn new(driver: D, level: u16) -> Self {
        Self {
            driver,
            level,
            state: PlayerState::Idle,
            sounding: false,
            last_started: Effect::Stop,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// True if the tone generator was last switched on and not yet off.
    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub(crate) fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Advance the requested effect by one hold.
    pub fn step(&mut self, control: &ControlHandle) -> Pace {
        loop {
            match self.state {
                PlayerState::Idle => match control.requested() {
                    Request::Effect(Effect::Stop) => {
                        self.off();
                        control.set_busy(false);
                        return Pace::Settled;
                    }
                    Request::Effect(effect) => self.start(effect, control),
                    Request::Unknown(code) => {
                        log::warn!("Unknown sound effect code {}, stopping", code);
                        control.clear_code(code);
                        self.off();
                        control.set_busy(false);
                        return Pace::Settled;
                    }
                },
                PlayerState::Playing { effect, cursor } => {
                    let Some(segment) = effect.pattern().get(cursor) else {
                        self.finish(effect, control);
                        return Pace::Settled;
                    };

                    match segment.tone {
                        Tone::On(divisor) => self.on(divisor),
                        Tone::Off => self.off(),
                    }
                    self.state = PlayerState::Playing {
                        effect,
                        cursor: cursor + 1,
                    };

                    if segment.hold_ms > 0 {
                        return Pace::Hold(segment.hold_ms);
                    }
                }
            }
        }
    }

    /// Drop whatever is playing, reset the selector to `Stop`, silence the
    /// tone and clear busy. Does nothing (and returns false) when already
    /// silent and not busy, so repeated calls while work is disabled are
    /// one-shot.
    pub fn silence(&mut self, control: &ControlHandle) -> bool {
        let active = self.state != PlayerState::Idle
            || self.sounding
            || control.is_busy()
            || control.requested_code() != Effect::Stop.code();
        if !active {
            return false;
        }

        self.state = PlayerState::Idle;
        control.force_stop();
        self.off();
        control.set_busy(false);
        log::info!("Buzzer work disabled, silenced");
        true
    }

    fn start(&mut self, effect: Effect, control: &ControlHandle) {
        if effect != self.last_started || !effect.is_continuous() {
            log::debug!("Playing {} ({} ms)", effect.as_str(), effect.duration_ms());
        }
        self.last_started = effect;
        control.set_busy(true);
        self.state = PlayerState::Playing { effect, cursor: 0 };
    }

    fn finish(&mut self, effect: Effect, control: &ControlHandle) {
        self.state = PlayerState::Idle;
        // Continuous effects stay busy and re-arm from the selector next tick.
        if effect.is_continuous() {
            return;
        }
        control.complete(effect);
        control.set_busy(false);
        self.last_started = Effect::Stop;
        log::debug!("Finished {}", effect.as_str());
    }

    fn on(&mut self, divisor: u16) {
        self.driver.tone_on(divisor, self.level);
        self.sounding = true;
    }

    fn off(&mut self) {
        self.driver.tone_off();
        self.sounding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::mock::{MockTone, ToneEvent};
    use crate::tone::DEFAULT_LEVEL;

    const fn on(divisor: u16) -> ToneEvent {
        ToneEvent::On {
            divisor,
            level: DEFAULT_LEVEL,
        }
    }

    const OFF: ToneEvent = ToneEvent::Off;

    fn player() -> EffectPlayer<MockTone> {
        EffectPlayer::new(MockTone::new(), DEFAULT_LEVEL)
    }

    /// Step until the player settles; returns the holds seen on the way.
    fn play(player: &mut EffectPlayer<MockTone>, control: &ControlHandle) -> Vec<u32> {
        let mut holds = Vec::new();
        for _ in 0..64 {
            match player.step(control) {
                Pace::Hold(ms) => holds.push(ms),
                Pace::Settled => return holds,
            }
        }
        panic!("player never settled");
    }

    #[test]
    fn finite_effects_follow_table() {
        let table: &[(Effect, &[ToneEvent], &[u32])] = &[
            (Effect::StartupChime, &[on(3), on(2), on(1), OFF], &[333, 333, 333]),
            (Effect::Beep1, &[on(1), OFF], &[70]),
            (Effect::Beep2, &[on(1), OFF, on(1), OFF], &[70, 70, 70]),
            (
                Effect::Beep3,
                &[on(1), OFF, on(1), OFF, on(1), OFF],
                &[70, 70, 70, 70, 70],
            ),
            (Effect::LongBeep, &[on(1)], &[500]),
            (Effect::LowBeep1, &[on(4), OFF], &[70]),
            (Effect::LowBeep2, &[on(4), OFF, on(4), OFF], &[70, 70, 70]),
            (
                Effect::LowBeep3,
                &[on(4), OFF, on(4), OFF, on(4), OFF],
                &[70, 70, 70, 70, 70],
            ),
            (Effect::LongLowBeep, &[on(4)], &[500]),
            (
                Effect::LowThenDoubleBeep,
                &[on(4), OFF, on(1), OFF, on(1), OFF],
                &[70, 70, 70, 70, 70],
            ),
        ];

        for &(effect, events, holds) in table {
            let control = ControlHandle::new();
            let mut player = player();
            control.request(effect);

            assert_eq!(play(&mut player, &control), holds, "{}", effect.as_str());
            assert_eq!(player.driver().events, events, "{}", effect.as_str());
            assert!(!control.is_busy(), "{}", effect.as_str());
            assert_eq!(control.requested(), Request::Effect(Effect::Stop));
            assert_eq!(player.state(), PlayerState::Idle);
        }
    }

    #[test]
    fn busy_while_pattern_in_progress() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::Beep2);

        assert_eq!(player.step(&control), Pace::Hold(70));
        assert!(control.is_busy());
        assert_eq!(control.requested(), Request::Effect(Effect::Beep2));
        assert_eq!(
            player.state(),
            PlayerState::Playing {
                effect: Effect::Beep2,
                cursor: 1
            }
        );

        play(&mut player, &control);
        assert!(!control.is_busy());
    }

    #[test]
    fn continuous_effect_rearms_every_tick() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::BeepContinuous);

        for _ in 0..25 {
            assert_eq!(play(&mut player, &control), vec![100, 50]);
            assert!(control.is_busy());
            assert_eq!(control.requested(), Request::Effect(Effect::BeepContinuous));
        }
        assert_eq!(player.driver().on_count(), 25);
        assert_eq!(player.driver().divisors(), vec![1; 25]);
    }

    #[test]
    fn continuous_effect_stops_when_overridden() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::LowBeepContinuous);
        assert_eq!(play(&mut player, &control), vec![100, 50]);
        assert_eq!(player.driver().events, vec![on(4), OFF]);

        control.request(Effect::Stop);
        assert_eq!(player.step(&control), Pace::Settled);
        assert!(!control.is_busy());
        assert_eq!(player.driver().events, vec![on(4), OFF, OFF]);
    }

    #[test]
    fn continuous_effect_hands_over_to_new_request() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::BeepContinuous);
        play(&mut player, &control);

        control.request(Effect::LowBeep1);
        assert_eq!(play(&mut player, &control), vec![70]);
        assert_eq!(player.driver().events, vec![on(1), OFF, on(4), OFF]);
        assert!(!control.is_busy());
        assert_eq!(control.requested(), Request::Effect(Effect::Stop));
    }

    #[test]
    fn stop_is_idempotent() {
        let control = ControlHandle::new();
        let mut player = player();
        for _ in 0..5 {
            assert_eq!(player.step(&control), Pace::Settled);
        }
        assert_eq!(player.driver().events, vec![OFF; 5]);
        assert!(!control.is_busy());
        assert_eq!(control.requested(), Request::Effect(Effect::Stop));
    }

    #[test]
    fn unknown_code_resolves_to_stop() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request_code(200);

        assert_eq!(player.step(&control), Pace::Settled);
        assert_eq!(player.driver().events, vec![OFF]);
        assert_eq!(control.requested(), Request::Effect(Effect::Stop));
        assert!(!control.is_busy());

        // Loop keeps running normally afterwards
        control.request(Effect::Beep1);
        assert_eq!(play(&mut player, &control), vec![70]);
    }

    #[test]
    fn long_beep_is_silenced_by_next_tick() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::LongBeep);

        assert_eq!(play(&mut player, &control), vec![500]);
        assert!(player.is_sounding());
        assert!(!control.is_busy());

        assert_eq!(player.step(&control), Pace::Settled);
        assert!(!player.is_sounding());
        assert_eq!(player.driver().events, vec![on(1), OFF]);
    }

    #[test]
    fn request_during_pattern_plays_next() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::Beep3);
        player.step(&control);
        player.step(&control);

        control.request(Effect::LowBeep1);
        assert_eq!(play(&mut player, &control), vec![70, 70, 70]);
        assert_eq!(player.driver().on_count(), 3);
        assert_eq!(control.requested(), Request::Effect(Effect::LowBeep1));

        play(&mut player, &control);
        assert_eq!(player.driver().divisors(), vec![1, 1, 1, 4]);
        assert_eq!(control.requested(), Request::Effect(Effect::Stop));
    }

    #[test]
    fn silence_interrupts_pattern() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::StartupChime);
        assert_eq!(player.step(&control), Pace::Hold(333));

        assert!(player.silence(&control));
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.driver().events, vec![on(3), OFF]);
        assert_eq!(control.requested(), Request::Effect(Effect::Stop));
        assert!(!control.is_busy());
    }

    #[test]
    fn silence_is_one_shot() {
        let control = ControlHandle::new();
        let mut player = player();
        assert!(!player.silence(&control));

        control.request(Effect::Beep1);
        assert!(player.silence(&control));
        assert!(!player.silence(&control));
        assert_eq!(player.driver().events, vec![OFF]);
    }

    #[test]
    fn silence_stops_lingering_long_tone() {
        let control = ControlHandle::new();
        let mut player = player();
        control.request(Effect::LongLowBeep);
        play(&mut player, &control);
        assert_eq!(control.requested(), Request::Effect(Effect::Stop));

        assert!(player.silence(&control));
        assert!(!player.is_sounding());
        assert_eq!(player.driver().events, vec![on(4), OFF]);
    }
}
