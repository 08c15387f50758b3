/// Buzzer tone driver using LEDC PWM.
///
/// Every tone divisor gets its own low-speed LEDC timer, configured once in
/// `init()`. Changing pitch rebinds the buzzer channel to another timer;
/// switching the tone off drops the channel duty to zero.
use esp_hal::gpio::DriveMode;
use esp_hal::ledc::channel::{self, ChannelIFace};
use esp_hal::ledc::timer::{self, config::Duty, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::time::Rate;
use static_cell::StaticCell;

use crate::board;
use buzzfx::tone::{self, ToneDriver, DIVISORS};

#[cfg(feature = "m5stickc")]
pub type BuzzerPin = esp_hal::peripherals::GPIO2<'static>;
#[cfg(feature = "xiao")]
pub type BuzzerPin = esp_hal::peripherals::GPIO3<'static>;

type ToneTimers = [timer::Timer<'static, LowSpeed>; DIVISORS.len()];

const TIMER_NUMBERS: [timer::Number; DIVISORS.len()] = [
    timer::Number::Timer0,
    timer::Number::Timer1,
    timer::Number::Timer2,
    timer::Number::Timer3,
];

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static TONE_TIMERS: StaticCell<ToneTimers> = StaticCell::new();

#[derive(Debug)]
pub enum BuzzerError {
    Timer(timer::Error),
    Channel(channel::Error),
    AlreadyInitialized,
}

impl From<timer::Error> for BuzzerError {
    fn from(e: timer::Error) -> Self {
        BuzzerError::Timer(e)
    }
}

impl From<channel::Error> for BuzzerError {
    fn from(e: channel::Error) -> Self {
        BuzzerError::Channel(e)
    }
}

pub struct LedcTone {
    /// Peripherals held until `init()`
    pending: Option<(esp_hal::peripherals::LEDC<'static>, BuzzerPin)>,
    timers: Option<&'static ToneTimers>,
    channel: Option<channel::Channel<'static, LowSpeed>>,
    /// Divisor of the timer the channel is bound to
    divisor: Option<u16>,
}

impl LedcTone {
    pub fn new(ledc: esp_hal::peripherals::LEDC<'static>, pin: BuzzerPin) -> Self {
        Self {
            pending: Some((ledc, pin)),
            timers: None,
            channel: None,
            divisor: None,
        }
    }
}

fn timer_index(divisor: u16) -> usize {
    match DIVISORS.iter().position(|&d| d == divisor) {
        Some(idx) => idx,
        None => {
            log::warn!("No LEDC timer for divisor {}, using nearest", divisor);
            if divisor > DIVISORS[DIVISORS.len() - 1] {
                DIVISORS.len() - 1
            } else {
                0
            }
        }
    }
}

impl ToneDriver for LedcTone {
    type Error = BuzzerError;

    fn init(&mut self) -> Result<(), BuzzerError> {
        let (peripheral, pin) = self.pending.take().ok_or(BuzzerError::AlreadyInitialized)?;

        let mut ledc = Ledc::new(peripheral);
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
        let ledc: &'static Ledc<'static> = LEDC.init(ledc);

        let mut timers: ToneTimers = TIMER_NUMBERS.map(|n| ledc.timer::<LowSpeed>(n));
        for (lstimer, divisor) in timers.iter_mut().zip(DIVISORS) {
            lstimer.configure(timer::config::Config {
                duty: Duty::Duty10Bit,
                clock_source: timer::LSClockSource::APBClk,
                frequency: Rate::from_hz(tone::tone_frequency_hz(divisor)),
            })?;
        }
        let timers: &'static ToneTimers = TONE_TIMERS.init(timers);

        let mut channel0 = ledc.channel(channel::Number::Channel0, pin);
        channel0.configure(channel::config::Config {
            timer: &timers[0],
            duty_pct: 0,
            drive_mode: DriveMode::PushPull,
        })?;

        self.timers = Some(timers);
        self.channel = Some(channel0);
        self.divisor = Some(DIVISORS[0]);

        log::info!(
            "Buzzer ready on GPIO{} ({} bit PWM, {}..{} Hz)",
            board::BUZZER_PIN,
            board::PWM_RESOLUTION_BITS,
            tone::tone_frequency_hz(DIVISORS[DIVISORS.len() - 1]),
            tone::tone_frequency_hz(DIVISORS[0]),
        );
        Ok(())
    }

    fn tone_on(&mut self, divisor: u16, level: u16) {
        let (Some(timers), Some(channel0)) = (self.timers, self.channel.as_mut()) else {
            return;
        };
        let duty_pct = tone::duty_pct(level);

        if self.divisor == Some(divisor) {
            if let Err(e) = channel0.set_duty(duty_pct) {
                log::warn!("Buzzer duty update failed: {:?}", e);
            }
            return;
        }

        match channel0.configure(channel::config::Config {
            timer: &timers[timer_index(divisor)],
            duty_pct,
            drive_mode: DriveMode::PushPull,
        }) {
            Ok(()) => self.divisor = Some(divisor),
            Err(e) => log::warn!("Buzzer retune to divisor {} failed: {:?}", divisor, e),
        }
    }

    fn tone_off(&mut self) {
        if let Some(channel0) = self.channel.as_mut() {
            if let Err(e) = channel0.set_duty(0) {
                log::warn!("Buzzer mute failed: {:?}", e);
            }
        }
    }
}
