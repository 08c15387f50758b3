/// Sound-effect task: startup sequence and the per-tick scheduling rule.
///
/// The task itself does not sleep. [`SoundEffectTask::tick`] returns how many
/// milliseconds the caller must suspend before the next tick; the firmware
/// turns that into `Timer::after` (Embassy) or `thread::sleep` (ESP-IDF).
use crate::config::TaskConfig;
use crate::control::{BusyFlag, ControlHandle};
use crate::player::{EffectPlayer, Pace};
use crate::tone::ToneDriver;

pub struct SoundEffectTask<'a, D: ToneDriver> {
    control: &'a ControlHandle,
    player: EffectPlayer<D>,
    config: TaskConfig,
    booted: bool,
}

impl<'a, D: ToneDriver> SoundEffectTask<'a, D> {
    /// Take ownership of the tone driver and put `control` in its initial
    /// state (work enabled, `Stop`, not busy).
    pub fn new(control: &'a ControlHandle, driver: D, config: TaskConfig) -> Self {
        control.reset();
        Self {
            control,
            player: EffectPlayer::new(driver, config.level),
            config,
            booted: false,
        }
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Shared control record, for requesters.
    pub fn control(&self) -> &'a ControlHandle {
        self.control
    }

    pub fn busy_flag(&self) -> BusyFlag<'a> {
        self.control.busy_flag()
    }

    pub fn player(&self) -> &EffectPlayer<D> {
        &self.player
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Initialize the tone hardware, force it silent and request the boot
    /// effect. Call once, after [`TaskConfig::startup_delay_ms`].
    ///
    /// On error nothing is requested and the task stays silent.
    pub fn boot(&mut self) -> Result<(), D::Error> {
        self.player.driver_mut().init()?;
        self.player.driver_mut().tone_off();
        self.booted = true;

        match self.config.boot_effect {
            Some(effect) => {
                self.control.request(effect);
                log::info!("Buzzer ready, playing {}", effect.as_str());
            }
            None => log::info!("Buzzer ready"),
        }
        Ok(())
    }

    /// Run one scheduler iteration. Returns the milliseconds to wait.
    ///
    /// With work enabled the player advances; otherwise the buzzer is
    /// silenced once and the selector held at `Stop`.
    pub fn tick(&mut self) -> u32 {
        if !self.booted {
            return self.config.tick_ms;
        }

        if self.control.is_work_enabled() {
            match self.player.step(self.control) {
                Pace::Hold(ms) => ms,
                Pace::Settled => self.config.tick_ms,
            }
        } else {
            self.player.silence(self.control);
            self.config.tick_ms
        }
    }

    /// Tick forever, handing each wait to `sleep_ms`.
    pub fn run(mut self, mut sleep_ms: impl FnMut(u32)) -> ! {
        loop {
            let wait = self.tick();
            sleep_ms(wait);
        }
    }
}
