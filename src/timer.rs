use embedded_hal::delay::DelayNs;

use crate::preferences::clamp_setting;

pub const SECONDS_PER_MINUTE: u16 = 60;

/// Blocks for the given number of seconds, realized as repeated one-second
/// waits. No drift compensation and no way to interrupt it.
pub fn delay_seconds(delay: &mut impl DelayNs, seconds: u16) {
    for _ in 0..seconds {
        delay.delay_ms(1000);
    }
}

/// Blocks for the given number of minutes, clamped to the 1..=9 range every
/// configuration value is held in.
pub fn delay_minutes(delay: &mut impl DelayNs, minutes: u8) {
    let minutes = clamp_setting(minutes);
    for _ in 0..minutes {
        delay_seconds(delay, SECONDS_PER_MINUTE);
    }
}
