pub const SETTING_MIN: u8 = 1;
pub const SETTING_MAX: u8 = 9;

/// Saturates a configuration value into the single-digit range the keypad
/// can enter.
pub fn clamp_setting(value: u8) -> u8 {
    value.clamp(SETTING_MIN, SETTING_MAX)
}

/// Preferences holds the operator-selected sampling parameters.
/// interval_minutes: minutes between measurements, 1..=9
/// measurement_count: measurements per logging run, 1..=9
///
/// Both values live in RAM only. They survive across runs but are lost on
/// power cycle.
pub struct Preferences {
    interval_minutes: u8,
    measurement_count: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            interval_minutes: 1,
            measurement_count: 1,
        }
    }
}

impl Preferences {
    pub fn interval_minutes(&self) -> u8 {
        self.interval_minutes
    }

    pub fn measurement_count(&self) -> u8 {
        self.measurement_count
    }

    /// Stores the interval, clamped to 1..=9.
    pub fn set_interval_minutes(&mut self, minutes: u8) {
        self.interval_minutes = clamp_setting(minutes);
    }

    /// Stores the measurement count, clamped to 1..=9.
    pub fn set_measurement_count(&mut self, count: u8) {
        self.measurement_count = clamp_setting(count);
    }
}
