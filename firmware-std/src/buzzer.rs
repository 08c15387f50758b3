//! Buzzer tone driver using ESP-IDF LEDC PWM.
//!
//! A single LEDC timer drives the buzzer channel; pitch changes retune that
//! timer in place through `ledc_set_freq`.

use esp_idf_svc::hal::gpio::AnyOutputPin;
use esp_idf_svc::hal::ledc::{
    config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution, CHANNEL0, TIMER0,
};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::{
    esp, ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_set_freq, ledc_timer_t_LEDC_TIMER_0, EspError,
    ESP_ERR_INVALID_STATE,
};

use buzzfx::board;
use buzzfx::tone::{self, ToneDriver, DIVISOR_HIGH};

pub struct LedcTone {
    /// Peripherals held until `init()`
    pending: Option<(TIMER0, CHANNEL0, AnyOutputPin)>,
    channel: Option<LedcDriver<'static>>,
    max_duty: u32,
    /// Divisor the timer is currently tuned to
    divisor: Option<u16>,
}

impl LedcTone {
    pub fn new(timer: TIMER0, channel: CHANNEL0, pin: AnyOutputPin) -> Self {
        Self {
            pending: Some((timer, channel, pin)),
            channel: None,
            max_duty: 0,
            divisor: None,
        }
    }
}

impl ToneDriver for LedcTone {
    type Error = EspError;

    fn init(&mut self) -> Result<(), EspError> {
        let (timer, channel, pin) = self
            .pending
            .take()
            .ok_or_else(EspError::from_infallible::<ESP_ERR_INVALID_STATE>)?;

        let timer_config = TimerConfig::new()
            .frequency(Hertz(tone::tone_frequency_hz(DIVISOR_HIGH)))
            .resolution(Resolution::Bits10);

        // The channel driver only borrows the timer driver, which must outlive it.
        let timer_driver = Box::leak(Box::new(LedcTimerDriver::new(timer, &timer_config)?));
        let mut channel_driver = LedcDriver::new(channel, &*timer_driver, pin)?;
        channel_driver.set_duty(0)?;

        self.max_duty = channel_driver.get_max_duty();
        self.channel = Some(channel_driver);
        self.divisor = Some(DIVISOR_HIGH);

        log::info!(
            "Buzzer ready on GPIO{} ({} bit PWM)",
            board::BUZZER_PIN,
            board::PWM_RESOLUTION_BITS
        );
        Ok(())
    }

    fn tone_on(&mut self, divisor: u16, level: u16) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };

        if self.divisor != Some(divisor) {
            let hz = tone::tone_frequency_hz(divisor);
            // SAFETY: the timer was configured in init() and is owned by this driver
            if let Err(e) = esp!(unsafe {
                ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_timer_t_LEDC_TIMER_0, hz)
            }) {
                log::warn!("Buzzer retune to {} Hz failed: {:?}", hz, e);
                return;
            }
            self.divisor = Some(divisor);
        }

        let duty = self.max_duty * tone::duty_pct(level) as u32 / 100;
        if let Err(e) = channel.set_duty(duty) {
            log::warn!("Buzzer duty update failed: {:?}", e);
        }
    }

    fn tone_off(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            if let Err(e) = channel.set_duty(0) {
                log::warn!("Buzzer mute failed: {:?}", e);
            }
        }
    }
}
