/// Hardware abstraction for supported boards.
///
/// Each board module defines pin assignments and capabilities
/// selected at compile time via feature flags.

#[cfg(feature = "board-xiao")]
mod hw {
    pub const BUZZER_PIN: u8 = 3; // Passive buzzer on D2
    pub const BUTTON_PIN: u8 = 0; // BOOT button, active low
    pub const BOARD_NAME: &str = "xiao_esp32s3";
}

#[cfg(feature = "board-m5stickc")]
mod hw {
    pub const BUZZER_PIN: u8 = 2;
    pub const BUTTON_PIN: u8 = 37; // Button A, active low
    pub const WORK_BUTTON_PIN: u8 = 39; // Button B, active low
    pub const BOARD_NAME: &str = "m5stickc_plus2";
}

#[cfg(not(any(feature = "board-xiao", feature = "board-m5stickc")))]
mod hw {
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;

/// LEDC PWM timer resolution used for tones. 10 bits keeps the clock divider
/// in range down to the lowest tone.
pub const PWM_RESOLUTION_BITS: u32 = 10;

/// Button debounce delay
pub const BUTTON_DEBOUNCE_MS: u64 = 30;
