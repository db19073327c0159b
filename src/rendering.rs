use heapless::String;
use ufmt::uwrite;

use crate::sensors::Reading;

/// 16x2 character display. Rows and columns are 0-based; the board backend
/// translates them into DDRAM addresses.
pub trait Display {
    fn clear(&mut self);
    fn write_at(&mut self, row: u8, col: u8, text: &str);
}

/// Top-level menu.
pub fn render_menu(lcd: &mut impl Display) {
    lcd.clear();
    lcd.write_at(0, 0, "1-Start");
    lcd.write_at(1, 0, "2-Int 3-Num");
}

/// Prompt for the sampling interval.
pub fn render_interval_prompt(lcd: &mut impl Display) {
    lcd.clear();
    lcd.write_at(0, 0, "Interval (min)");
    lcd.write_at(1, 0, "Enter 1..9:");
}

/// Prompt for the number of measurements.
pub fn render_count_prompt(lcd: &mut impl Display) {
    lcd.clear();
    lcd.write_at(0, 0, "Measurements");
    lcd.write_at(1, 0, "Enter 1..9:");
}

pub fn render_interval_saved(minutes: u8, lcd: &mut impl Display) {
    let mut line: String<16> = String::new();
    uwrite!(&mut line, "Interval = {}", minutes).unwrap(); // Max str size 12
    lcd.clear();
    lcd.write_at(0, 0, &line);
    lcd.write_at(1, 0, "OK");
}

pub fn render_count_saved(count: u8, lcd: &mut impl Display) {
    let mut line: String<16> = String::new();
    uwrite!(&mut line, "Count = {}", count).unwrap(); // Max str size 9
    lcd.clear();
    lcd.write_at(0, 0, &line);
    lcd.write_at(1, 0, "OK");
}

/// Shows one measurement pair. The displayed values are the full converted
/// units, not the byte-clamped values that go to storage.
pub fn render_measurement(reading: &Reading, lcd: &mut impl Display) {
    lcd.clear();

    let mut line: String<16> = String::new();
    uwrite!(&mut line, "T:{}C", reading.temperature_c).unwrap(); // Max str size 6
    lcd.write_at(0, 0, &line);

    line.clear();
    uwrite!(&mut line, "H:{}%", reading.humidity_percent).unwrap(); // Max str size 6
    lcd.write_at(1, 0, &line);
}

/// Waiting indicator in the right half of the bottom line, next to the last
/// measurement.
pub fn render_waiting(lcd: &mut impl Display) {
    lcd.write_at(1, 10, "Wait..");
}

/// Final screen, shown once the run is over and the device parks.
pub fn render_done(lcd: &mut impl Display) {
    lcd.clear();
    lcd.write_at(0, 0, "Finished");
    lcd.write_at(1, 0, "Logger idle");
}

/// Storage failure screen. The run is abandoned once this is up.
pub fn render_storage_error(lcd: &mut impl Display) {
    lcd.clear();
    lcd.write_at(0, 0, "Storage error");
    lcd.write_at(1, 0, "Run aborted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String as StdString;

    #[derive(Default)]
    struct CapturedScreen {
        clears: usize,
        writes: Vec<(u8, u8, StdString)>,
    }

    impl Display for CapturedScreen {
        fn clear(&mut self) {
            self.clears += 1;
        }

        fn write_at(&mut self, row: u8, col: u8, text: &str) {
            self.writes.push((row, col, text.to_string()));
        }
    }

    #[test]
    fn test_menu_layout() {
        let mut screen = CapturedScreen::default();
        render_menu(&mut screen);
        assert_eq!(screen.clears, 1);
        assert_eq!(
            screen.writes,
            vec![
                (0, 0, "1-Start".to_string()),
                (1, 0, "2-Int 3-Num".to_string()),
            ]
        );
    }

    #[test]
    fn test_measurement_formatting() {
        let mut screen = CapturedScreen::default();
        render_measurement(
            &Reading {
                temperature_c: 250,
                humidity_percent: 78,
            },
            &mut screen,
        );
        assert_eq!(
            screen.writes,
            vec![(0, 0, "T:250C".to_string()), (1, 0, "H:78%".to_string())]
        );
    }

    #[test]
    fn test_confirmations_show_value() {
        let mut screen = CapturedScreen::default();
        render_interval_saved(5, &mut screen);
        render_count_saved(9, &mut screen);
        assert_eq!(screen.writes[0], (0, 0, "Interval = 5".to_string()));
        assert_eq!(screen.writes[2], (0, 0, "Count = 9".to_string()));
    }

    #[test]
    fn test_waiting_indicator_fits_bottom_line() {
        let mut screen = CapturedScreen::default();
        render_waiting(&mut screen);
        let (row, col, text) = &screen.writes[0];
        assert_eq!((*row, *col), (1, 10));
        assert!(usize::from(*col) + text.len() <= 16);
    }
}
