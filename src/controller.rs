use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::keypad::{KeyReader, KeypadScan};
use crate::preferences::Preferences;
use crate::rendering::{self, Display};
use crate::sensors::{self, AnalogSource};
use crate::storage::{ByteStorage, ReadingLog, StorageError};
use crate::timer::delay_minutes;

/// How long a configuration confirmation screen stays up.
pub const CONFIRM_MS: u32 = 800;

const ALARM_PULSES: u8 = 3;
const ALARM_TONE_MS: u32 = 250;
const ALARM_GAP_MS: u32 = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum State {
    Menu,
    ConfigureInterval,
    ConfigureCount,
    Sampling,
    /// Terminal. No outbound transition; the board parks after `run`
    /// returns.
    Done,
}

/// The logging station's state machine. Owns every capability plus the
/// preferences and run counters; nothing else mutates them.
pub struct Logger<A, K, D, S, B, T> {
    adc: A,
    keys: KeyReader<K>,
    display: D,
    log: ReadingLog<S>,
    buzzer: B,
    delay: T,
    preferences: Preferences,
    completed_measurements: u8,
    state: State,
}

impl<A, K, D, S, B, T> Logger<A, K, D, S, B, T>
where
    A: AnalogSource,
    K: KeypadScan,
    D: Display,
    S: ByteStorage,
    B: OutputPin,
    T: DelayNs,
{
    pub fn new(adc: A, keypad: K, display: D, storage: S, buzzer: B, delay: T) -> Self {
        Self {
            adc,
            keys: KeyReader::new(keypad),
            display,
            log: ReadingLog::new(storage),
            buzzer,
            delay,
            preferences: Preferences::default(),
            completed_measurements: 0,
            state: State::Menu,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Drives the state machine until the terminal state. Returns `Ok` once
    /// the end-of-run sequence has played, or the storage error that
    /// aborted a run.
    pub fn run(&mut self) -> Result<(), StorageError> {
        loop {
            self.state = match self.state {
                State::Menu => self.menu(),
                State::ConfigureInterval => self.configure_interval(),
                State::ConfigureCount => self.configure_count(),
                State::Sampling => match self.sample_run() {
                    Ok(next) => next,
                    Err(error) => {
                        rendering::render_storage_error(&mut self.display);
                        return Err(error);
                    }
                },
                State::Done => {
                    self.finish();
                    return Ok(());
                }
            };
        }
    }

    /// One blocking key read decides the next state; anything that is not a
    /// menu entry re-renders and reads again.
    fn menu(&mut self) -> State {
        rendering::render_menu(&mut self.display);
        match self.keys.read_key(&mut self.delay) {
            '1' => State::Sampling,
            '2' => State::ConfigureInterval,
            '3' => State::ConfigureCount,
            _ => State::Menu,
        }
    }

    fn configure_interval(&mut self) -> State {
        rendering::render_interval_prompt(&mut self.display);
        let digit = self.keys.read_digit(&mut self.delay);
        self.preferences.set_interval_minutes(digit);
        rendering::render_interval_saved(self.preferences.interval_minutes(), &mut self.display);
        self.delay.delay_ms(CONFIRM_MS);
        State::Menu
    }

    fn configure_count(&mut self) -> State {
        rendering::render_count_prompt(&mut self.display);
        let digit = self.keys.read_digit(&mut self.delay);
        self.preferences.set_measurement_count(digit);
        rendering::render_count_saved(self.preferences.measurement_count(), &mut self.display);
        self.delay.delay_ms(CONFIRM_MS);
        State::Menu
    }

    /// One full logging run: sample, persist temperature then humidity,
    /// show the pair, then sit out the interval unless this was the last
    /// measurement.
    fn sample_run(&mut self) -> Result<State, StorageError> {
        self.completed_measurements = 0;
        self.log.reset();

        while self.completed_measurements < self.preferences.measurement_count() {
            let reading = sensors::sample(&mut self.adc);
            self.log.append(reading.temperature_c, &mut self.delay)?;
            self.log.append(reading.humidity_percent, &mut self.delay)?;
            rendering::render_measurement(&reading, &mut self.display);
            self.completed_measurements += 1;

            if self.completed_measurements < self.preferences.measurement_count() {
                rendering::render_waiting(&mut self.display);
                delay_minutes(&mut self.delay, self.preferences.interval_minutes());
            }
        }

        Ok(State::Done)
    }

    /// End-of-run signal: three short buzzer pulses, no trailing gap, then
    /// the final screen.
    fn finish(&mut self) {
        for pulse in 0..ALARM_PULSES {
            let _ = self.buzzer.set_high();
            self.delay.delay_ms(ALARM_TONE_MS);
            let _ = self.buzzer.set_low();
            if pulse + 1 < ALARM_PULSES {
                self.delay.delay_ms(ALARM_GAP_MS);
            }
        }
        rendering::render_done(&mut self.display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use std::collections::VecDeque;
    use std::rc::Rc;

    struct ScriptedAdc {
        temperature_raws: VecDeque<u16>,
        humidity_raws: VecDeque<u16>,
    }

    impl ScriptedAdc {
        fn new(pairs: &[(u16, u16)]) -> Self {
            Self {
                temperature_raws: pairs.iter().map(|&(t, _)| t).collect(),
                humidity_raws: pairs.iter().map(|&(_, h)| h).collect(),
            }
        }
    }

    impl AnalogSource for ScriptedAdc {
        fn read_raw(&mut self, channel: u8) -> u16 {
            let queue = match channel {
                sensors::HUMIDITY_CHANNEL => &mut self.humidity_raws,
                _ => &mut self.temperature_raws,
            };
            queue.pop_front().expect("adc script exhausted")
        }
    }

    struct ScriptedKeys {
        script: VecDeque<Option<u8>>,
    }

    impl ScriptedKeys {
        /// One entry per key press; the release poll is appended here.
        fn presses(codes: &[u8]) -> Self {
            let mut script = VecDeque::new();
            for &code in codes {
                script.push_back(Some(code));
                script.push_back(None);
            }
            Self { script }
        }
    }

    impl KeypadScan for ScriptedKeys {
        fn poll(&mut self) -> Option<u8> {
            self.script.pop_front().expect("keypad script exhausted")
        }
    }

    #[derive(Clone, Default)]
    struct SharedScreen {
        lines: Rc<RefCell<Vec<std::string::String>>>,
    }

    impl Display for SharedScreen {
        fn clear(&mut self) {}

        fn write_at(&mut self, _row: u8, _col: u8, text: &str) {
            self.lines.borrow_mut().push(text.to_string());
        }
    }

    #[derive(Clone, Default)]
    struct SharedStorage {
        writes: Rc<RefCell<Vec<(u16, u8)>>>,
        fail: bool,
    }

    impl ByteStorage for SharedStorage {
        fn write_byte(&mut self, offset: u16, value: u8) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::WriteFailed);
            }
            self.writes.borrow_mut().push((offset, value));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuzzer {
        events: Rc<RefCell<Vec<bool>>>,
    }

    impl embedded_hal::digital::ErrorType for SharedBuzzer {
        type Error = Infallible;
    }

    impl OutputPin for SharedBuzzer {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.events.borrow_mut().push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.events.borrow_mut().push(true);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct SharedDelay {
        ms: Rc<RefCell<Vec<u32>>>,
    }

    impl DelayNs for SharedDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_us(&mut self, _us: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.ms.borrow_mut().push(ms);
        }
    }

    fn count_ms(delay: &SharedDelay, which: u32) -> usize {
        delay.ms.borrow().iter().filter(|&&ms| ms == which).count()
    }

    #[test]
    fn test_single_measurement_run() {
        let storage = SharedStorage::default();
        let buzzer = SharedBuzzer::default();
        let delay = SharedDelay::default();

        let mut logger = Logger::new(
            ScriptedAdc::new(&[(512, 800)]),
            ScriptedKeys::presses(&[1]), // '1' starts the run
            SharedScreen::default(),
            storage.clone(),
            buzzer.clone(),
            delay.clone(),
        );

        assert_eq!(logger.run(), Ok(()));

        // Temperature then humidity at offsets 0 and 1, nothing else.
        assert_eq!(*storage.writes.borrow(), vec![(0, 250), (1, 78)]);
        // A single measurement issues no interval wait.
        assert_eq!(count_ms(&delay, 1000), 0);
        // Three alarm pulses with gaps only in between.
        assert_eq!(
            *buzzer.events.borrow(),
            vec![true, false, true, false, true, false]
        );
        assert_eq!(count_ms(&delay, 250), 3);
        assert_eq!(count_ms(&delay, 150), 2);
    }

    #[test]
    fn test_three_measurements_two_interval_waits() {
        let storage = SharedStorage::default();
        let delay = SharedDelay::default();

        // '3' opens the count screen, digit '3' sets it, '1' starts.
        let mut logger = Logger::new(
            ScriptedAdc::new(&[(0, 0), (512, 800), (1023, 1023)]),
            ScriptedKeys::presses(&[3, 3, 1]),
            SharedScreen::default(),
            storage.clone(),
            SharedBuzzer::default(),
            delay.clone(),
        );

        assert_eq!(logger.run(), Ok(()));
        assert_eq!(logger.preferences().measurement_count(), 3);

        // 2N sequential writes, alternating temperature/humidity.
        assert_eq!(
            *storage.writes.borrow(),
            vec![(0, 0), (1, 0), (2, 250), (3, 78), (4, 255), (5, 100)]
        );
        // Waits after measurements 1 and 2 only, 60 ticks each.
        assert_eq!(count_ms(&delay, 1000), 120);
        // One confirmation screen was held up.
        assert_eq!(count_ms(&delay, CONFIRM_MS), 1);
    }

    #[test]
    fn test_configure_interval_from_keypad() {
        let delay = SharedDelay::default();

        // '2' opens the interval screen, 'A' is discarded, '5' (code 6)
        // sets it, '1' starts a default single-measurement run.
        let mut logger = Logger::new(
            ScriptedAdc::new(&[(100, 100)]),
            ScriptedKeys::presses(&[2, 4, 6, 1]),
            SharedScreen::default(),
            SharedStorage::default(),
            SharedBuzzer::default(),
            delay.clone(),
        );

        assert_eq!(logger.run(), Ok(()));
        assert_eq!(logger.preferences().interval_minutes(), 5);
        // No second measurement, so the 5 minute interval never ran.
        assert_eq!(count_ms(&delay, 1000), 0);
    }

    #[test]
    fn test_menu_ignores_other_keys() {
        let storage = SharedStorage::default();

        // 'D', '*' and '0' all loop back to the menu before '1' starts.
        let mut logger = Logger::new(
            ScriptedAdc::new(&[(512, 800)]),
            ScriptedKeys::presses(&[16, 13, 14, 1]),
            SharedScreen::default(),
            storage.clone(),
            SharedBuzzer::default(),
            SharedDelay::default(),
        );

        assert_eq!(logger.run(), Ok(()));
        assert_eq!(storage.writes.borrow().len(), 2);
    }

    #[test]
    fn test_storage_failure_aborts_run() {
        let screen = SharedScreen::default();
        let buzzer = SharedBuzzer::default();

        let mut logger = Logger::new(
            ScriptedAdc::new(&[(512, 800)]),
            ScriptedKeys::presses(&[1]),
            screen.clone(),
            SharedStorage {
                writes: Rc::new(RefCell::new(Vec::new())),
                fail: true,
            },
            buzzer.clone(),
            SharedDelay::default(),
        );

        assert_eq!(logger.run(), Err(StorageError::WriteFailed));
        assert!(screen
            .lines
            .borrow()
            .iter()
            .any(|line| line == "Storage error"));
        // No end-of-run alarm after an abort.
        assert!(buzzer.events.borrow().is_empty());
    }
}
