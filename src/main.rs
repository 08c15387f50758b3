//! buzzfx — onboard buzzer sound effects
//!
//! Runs the sound-effect task on the LEDC buzzer and a button task that
//! requests effects through the shared control record, the same way any
//! other firmware module signals startup, mode changes or faults.

#![no_std]
#![no_main]

use esp_backtrace as _;

esp_bootloader_esp_idf::esp_app_desc!();

// Hardware-specific modules (binary crate only)
mod buzzer;

// Re-export library modules so binary submodules can use crate::*
pub(crate) use buzzfx::{board, config, control, effect, task};

use embassy_time::{Duration, Timer};
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

use buzzer::{BuzzerError, LedcTone};
use config::TaskConfig;
use control::ControlHandle;
use effect::Effect;
use task::SoundEffectTask;

#[cfg(feature = "m5stickc")]
type ButtonPin = esp_hal::peripherals::GPIO37<'static>;
#[cfg(feature = "xiao")]
type ButtonPin = esp_hal::peripherals::GPIO0<'static>;

#[cfg(feature = "m5stickc")]
type WorkButtonPin = esp_hal::peripherals::GPIO39<'static>;

// GPIO37/39 are input-only with external pull-ups on the M5StickC
#[cfg(feature = "m5stickc")]
const BUTTON_PULL: Pull = Pull::None;
#[cfg(feature = "xiao")]
const BUTTON_PULL: Pull = Pull::Up;

type BuzzerTask = SoundEffectTask<'static, LedcTone>;

/// Buzzer control record, created once at startup, shared with every
/// task that requests effects.
static CONTROL: StaticCell<ControlHandle> = StaticCell::new();

// ── Entry point ──────────────────────────────────────────────────────

#[esp_rtos::main]
async fn main(spawner: embassy_executor::Spawner) {
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // esp-rtos allocates from the heap
    esp_alloc::heap_allocator!(size: 32 * 1024);

    // Start the RTOS (requires timer + software interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    log::info!(
        "buzzfx v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        board::BOARD_NAME
    );

    // Hold power on (M5StickC Plus2 needs GPIO4 HIGH to stay powered)
    #[cfg(feature = "m5stickc")]
    let _power_hold = esp_hal::gpio::Output::new(
        peripherals.GPIO4,
        esp_hal::gpio::Level::High,
        esp_hal::gpio::OutputConfig::default(),
    );

    let control: &'static ControlHandle = CONTROL.init(ControlHandle::new());

    #[cfg(feature = "m5stickc")]
    let (buzzer_pin, button_pin) = (peripherals.GPIO2, peripherals.GPIO37);
    #[cfg(feature = "xiao")]
    let (buzzer_pin, button_pin) = (peripherals.GPIO3, peripherals.GPIO0);

    let tone = LedcTone::new(peripherals.LEDC, buzzer_pin);
    let sound_task = SoundEffectTask::new(control, tone, TaskConfig::new());

    // Requesters run during the startup grace period too
    spawner.spawn(button_task(control, button_pin)).unwrap();
    #[cfg(feature = "m5stickc")]
    {
        spawner
            .spawn(work_button_task(control, peripherals.GPIO39))
            .unwrap();
        log::info!("Work button task spawned on GPIO{}", board::WORK_BUTTON_PIN);
    }
    log::info!("Button task spawned on GPIO{}", board::BUTTON_PIN);

    match start_sound_effects(sound_task).await {
        Ok(task) => {
            spawner.spawn(sound_effects_task(task)).unwrap();
            log::info!("Sound effect task spawned");
        }
        Err(e) => {
            log::error!("Buzzer init failed, sound effects disabled: {:?}", e);
        }
    }
}

/// Startup sequence: wait out the grace period, then bring up the LEDC
/// timers and request the boot effect. The init result goes back to the
/// caller instead of being dropped.
async fn start_sound_effects(mut task: BuzzerTask) -> Result<BuzzerTask, BuzzerError> {
    Timer::after(Duration::from_millis(task.config().startup_delay_ms as u64)).await;
    task.boot()?;
    Ok(task)
}

/// Sound-effect task: one scheduler tick per wake-up, sleeping for
/// whatever hold the current pattern segment asks for.
#[embassy_executor::task]
async fn sound_effects_task(mut task: BuzzerTask) {
    log::info!(
        "Sound effect task started ({} ms tick)",
        task.config().tick_ms
    );

    loop {
        let wait_ms = task.tick();
        Timer::after(Duration::from_millis(wait_ms as u64)).await;
    }
}

/// Button A / BOOT: each press requests the next effect in the table.
///
/// Presses during a finite pattern are ignored; continuous effects are
/// overridden.
#[embassy_executor::task]
async fn button_task(control: &'static ControlHandle, pin: ButtonPin) {
    let mut button = Input::new(pin, InputConfig::default().with_pull(BUTTON_PULL));
    let mut next = Effect::Beep1;

    loop {
        button.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(board::BUTTON_DEBOUNCE_MS)).await;
        if button.is_high() {
            continue;
        }

        if !control.try_request(next) {
            log::info!("Buzzer busy, press ignored");
            button.wait_for_high().await;
            continue;
        }

        log::info!("Requested {}", next.as_str());
        next = next.next();
        button.wait_for_high().await;
    }
}

/// Button B: toggles the buzzer work flag.
#[cfg(feature = "m5stickc")]
#[embassy_executor::task]
async fn work_button_task(control: &'static ControlHandle, pin: WorkButtonPin) {
    let mut button = Input::new(pin, InputConfig::default().with_pull(BUTTON_PULL));

    loop {
        button.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(board::BUTTON_DEBOUNCE_MS)).await;
        if button.is_high() {
            continue;
        }

        let enabled = !control.is_work_enabled();
        control.set_work(enabled);
        log::info!(
            "Buzzer work {}",
            if enabled { "enabled" } else { "disabled" }
        );
        button.wait_for_high().await;
    }
}
