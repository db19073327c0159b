use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Poll period while waiting for a press or a release.
pub const POLL_PERIOD_MS: u32 = 10;
/// Settle time between driving a row and sampling the columns.
const SCAN_SETTLE_US: u32 = 5;

/// Logical layout of the 4x4 pad, row-major from physical code 1.
const KEY_MAP: [char; 16] = [
    '1', '2', '3', 'A', //
    '4', '5', '6', 'B', //
    '7', '8', '9', 'C', //
    '*', '0', '#', 'D',
];

/// Raw keypad scanner. `poll` returns the physical key code 1..=16 of the
/// key currently held down, or `None` when the pad is idle.
pub trait KeypadScan {
    fn poll(&mut self) -> Option<u8>;
}

/// Maps a physical key code to its logical character. Codes outside 1..=16
/// should not occur with correct hardware; they map to `None` and callers
/// treat them as "no key".
pub fn map_key(code: u8) -> Option<char> {
    match code {
        1..=16 => Some(KEY_MAP[usize::from(code) - 1]),
        _ => None,
    }
}

/// Blocking reader over a [`KeypadScan`]. Both read modes poll with no
/// timeout and no cancellation.
pub struct KeyReader<K> {
    keypad: K,
}

impl<K: KeypadScan> KeyReader<K> {
    pub fn new(keypad: K) -> Self {
        Self { keypad }
    }

    /// Blocks until a key is pressed and released again, then returns its
    /// logical character.
    pub fn read_key(&mut self, delay: &mut impl DelayNs) -> char {
        loop {
            if let Some(code) = self.keypad.poll() {
                // Wait for the release so one press reads as one key.
                while self.keypad.poll().is_some() {
                    delay.delay_ms(POLL_PERIOD_MS);
                }
                if let Some(key) = map_key(code) {
                    return key;
                }
            }
            delay.delay_ms(POLL_PERIOD_MS);
        }
    }

    /// Blocks until a digit key 1..=9 is pressed, discarding everything
    /// else, and returns its numeric value.
    pub fn read_digit(&mut self, delay: &mut impl DelayNs) -> u8 {
        loop {
            let key = self.read_key(delay);
            if key.is_ascii_digit() && key != '0' {
                return key as u8 - b'0';
            }
        }
    }
}

/// Row-scanned 4x4 matrix keypad over plain GPIO: four row outputs driven
/// one at a time, four column inputs with pull-downs sampled after a short
/// settle.
pub struct MatrixKeypad<R, C, D> {
    rows: [R; 4],
    cols: [C; 4],
    delay: D,
}

impl<R: OutputPin, C: InputPin, D: DelayNs> MatrixKeypad<R, C, D> {
    pub fn new(mut rows: [R; 4], cols: [C; 4], delay: D) -> Self {
        for row in rows.iter_mut() {
            let _ = row.set_low();
        }
        Self { rows, cols, delay }
    }
}

impl<R: OutputPin, C: InputPin, D: DelayNs> KeypadScan for MatrixKeypad<R, C, D> {
    fn poll(&mut self) -> Option<u8> {
        for (row_index, row) in self.rows.iter_mut().enumerate() {
            let _ = row.set_high();
            self.delay.delay_us(SCAN_SETTLE_US);

            let mut hit = None;
            for (col_index, col) in self.cols.iter_mut().enumerate() {
                if col.is_high().unwrap_or(false) {
                    hit = Some((row_index * 4 + col_index + 1) as u8);
                    break;
                }
            }

            let _ = row.set_low();
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}
