//! buzzfx — ESP-IDF std firmware
//!
//! Thread-based variant of the Embassy firmware. The sound-effect task runs
//! on its own FreeRTOS thread and sleeps between ticks; the main thread
//! polls the buttons and requests effects through the shared control record.

mod buzzer;

use std::thread;
use std::time::Duration;

use anyhow::Context;
use buzzfx::{board, config, control, effect, task};

use buzzer::LedcTone;
use config::TaskConfig;
use control::ControlHandle;
use effect::Effect;
use esp_idf_svc::hal::gpio::{AnyInputPin, Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_svc::hal::peripherals::Peripherals;
use task::SoundEffectTask;

/// Shared with the sound-effect thread and every requester.
static CONTROL: ControlHandle = ControlHandle::new();

const BUTTON_POLL_MS: u64 = 20;

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!(
        "buzzfx v{} starting on {} (std)",
        env!("CARGO_PKG_VERSION"),
        board::BOARD_NAME
    );

    let peripherals = Peripherals::take()?;

    // Hold power on (M5StickC Plus2)
    #[cfg(feature = "m5stickc")]
    let _power_hold = {
        let mut p = PinDriver::output(peripherals.pins.gpio4)?;
        p.set_high()?;
        p
    };

    #[cfg(feature = "m5stickc")]
    let (buzzer_pin, button_pin) = (
        peripherals.pins.gpio2.downgrade_output(),
        peripherals.pins.gpio37.downgrade_input(),
    );
    #[cfg(feature = "xiao")]
    let (buzzer_pin, button_pin) = (
        peripherals.pins.gpio3.downgrade_output(),
        peripherals.pins.gpio0.downgrade_input(),
    );

    // ── Sound effects ────────────────────────────────────────────────

    let tone = LedcTone::new(
        peripherals.ledc.timer0,
        peripherals.ledc.channel0,
        buzzer_pin,
    );
    let mut sound_task = SoundEffectTask::new(&CONTROL, tone, TaskConfig::new());

    thread::sleep(Duration::from_millis(
        sound_task.config().startup_delay_ms as u64,
    ));
    sound_task.boot().context("buzzer init failed")?;

    thread::Builder::new()
        .name("sound-fx".into())
        .stack_size(3072)
        .spawn(move || {
            log::info!(
                "Sound effect thread started ({} ms tick)",
                sound_task.config().tick_ms
            );
            sound_task.run(|ms| thread::sleep(Duration::from_millis(ms as u64)))
        })?;
    log::info!("Sound effect thread spawned");

    // ── Buttons (polled on the main thread) ──────────────────────────

    let mut effect_button = Button::new(button_pin)?;
    log::info!("Effect button on GPIO{}", board::BUTTON_PIN);

    #[cfg(feature = "m5stickc")]
    let mut work_button = {
        log::info!("Work button on GPIO{}", board::WORK_BUTTON_PIN);
        Button::new(peripherals.pins.gpio39.downgrade_input())?
    };

    let mut next = Effect::Beep1;
    loop {
        if effect_button.pressed() {
            if CONTROL.try_request(next) {
                log::info!("Requested {}", next.as_str());
                next = next.next();
            } else {
                log::info!("Buzzer busy, press ignored");
            }
        }

        #[cfg(feature = "m5stickc")]
        if work_button.pressed() {
            let enabled = !CONTROL.is_work_enabled();
            CONTROL.set_work(enabled);
            log::info!(
                "Buzzer work {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }

        thread::sleep(Duration::from_millis(BUTTON_POLL_MS));
    }
}

/// Active-low push button with press-edge detection.
struct Button {
    pin: PinDriver<'static, AnyInputPin, Input>,
    was_down: bool,
}

impl Button {
    fn new(pin: AnyInputPin) -> anyhow::Result<Self> {
        let mut pin = PinDriver::input(pin)?;
        // GPIO37/39 are input-only with external pull-ups on the M5StickC
        if cfg!(feature = "xiao") {
            pin.set_pull(Pull::Up)?;
        }
        Ok(Self {
            pin,
            was_down: false,
        })
    }

    /// True once per press, on the falling edge.
    fn pressed(&mut self) -> bool {
        let down = self.pin.is_low();
        let edge = down && !self.was_down;
        self.was_down = down;
        edge
    }
}
