/// ADC channel wired to the analog temperature sensor.
pub const TEMPERATURE_CHANNEL: u8 = 0;
/// ADC channel wired to the analog humidity sensor.
pub const HUMIDITY_CHANNEL: u8 = 1;

/// Largest raw sample the converters accept (10-bit ADC).
pub const RAW_FULL_SCALE: u16 = 1023;

/// Source of raw analog samples. The board backend owns the ADC peripheral
/// and its pins; the control logic only ever sees channel numbers.
pub trait AnalogSource {
    /// Reads one raw sample, 0..=1023, from the given channel.
    fn read_raw(&mut self, channel: u8) -> u16;
}

/// One converted measurement pair. Ephemeral; persisted immediately and not
/// retained afterwards.
#[derive(Clone, Copy, defmt::Format)]
pub struct Reading {
    pub temperature_c: u16,
    pub humidity_percent: u16,
}

/// Converts a raw sample into degrees Celsius for a 10 mV/degree sensor on
/// a 5V/1023-step reference. Truncating integer scale, 0..=500.
pub fn raw_to_temperature_c(raw: u16) -> u16 {
    (u32::from(raw) * 500 / 1023) as u16
}

/// Converts a raw sample into percent relative humidity. Truncating integer
/// scale, 0..=100.
pub fn raw_to_humidity_percent(raw: u16) -> u16 {
    (u32::from(raw) * 100 / 1023) as u16
}

/// Samples both channels, temperature first, and converts to engineering
/// units.
pub fn sample(adc: &mut impl AnalogSource) -> Reading {
    let raw_temperature = adc.read_raw(TEMPERATURE_CHANNEL);
    let raw_humidity = adc.read_raw(HUMIDITY_CHANNEL);

    Reading {
        temperature_c: raw_to_temperature_c(raw_temperature),
        humidity_percent: raw_to_humidity_percent(raw_humidity),
    }
}
