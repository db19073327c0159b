#![no_std]
#![no_main]

use bsp::entry;
use defmt::*;
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use embedded_hal_0_2::adc::OneShot;
use panic_probe as _;

// Provide an alias for our BSP so we can switch targets quickly.
// Uncomment the BSP you included in Cargo.toml, the rest of the code does not need to change.
use rp_pico as bsp;

use bsp::hal::{
    adc::{Adc, AdcPin},
    clocks::{init_clocks_and_plls, Clock},
    fugit::RateExtU32,
    gpio::bank0::{Gpio0, Gpio1, Gpio2, Gpio26, Gpio27, Gpio3, Gpio4, Gpio5, Gpio8, Gpio9},
    gpio::{
        DynPinId, FunctionI2C, FunctionSio, Pin, PullDown, PullNone, PullUp, SioInput, SioOutput,
    },
    pac,
    watchdog::Watchdog,
    Timer, I2C,
};
use eeprom24x::{addr_size::TwoBytes, page_size::B64, unique_serial::No, Eeprom24x, SlaveAddr};
use hd44780_driver::bus::FourBitBus;
use hd44780_driver::{Cursor, CursorBlink, Display as ScreenOnOff, DisplayMode, HD44780};
use thermolog_rs::controller::Logger;
use thermolog_rs::keypad::MatrixKeypad;
use thermolog_rs::rendering::Display;
use thermolog_rs::sensors::{self, AnalogSource};
use thermolog_rs::storage::{ByteStorage, StorageError};

/// The LCD driver still takes embedded-hal 0.2 delays; delegate to the
/// timer's embedded-hal 1.0 implementation.
struct LcdDelay(Timer);

impl embedded_hal_0_2::blocking::delay::DelayUs<u16> for LcdDelay {
    fn delay_us(&mut self, us: u16) {
        DelayNs::delay_us(&mut self.0, u32::from(us));
    }
}

impl embedded_hal_0_2::blocking::delay::DelayMs<u8> for LcdDelay {
    fn delay_ms(&mut self, ms: u8) {
        DelayNs::delay_ms(&mut self.0, u32::from(ms));
    }
}

type LcdBus = FourBitBus<
    Pin<Gpio0, FunctionSio<SioOutput>, PullDown>,
    Pin<Gpio1, FunctionSio<SioOutput>, PullDown>,
    Pin<Gpio2, FunctionSio<SioOutput>, PullDown>,
    Pin<Gpio3, FunctionSio<SioOutput>, PullDown>,
    Pin<Gpio4, FunctionSio<SioOutput>, PullDown>,
    Pin<Gpio5, FunctionSio<SioOutput>, PullDown>,
>;

/// 16x2 HD44780 in 4-bit mode. Translates the 0-based rows and columns of
/// the rendering layer into DDRAM addresses (second line starts at 0x40).
struct LcdDisplay {
    lcd: HD44780<LcdBus>,
    delay: LcdDelay,
}

impl Display for LcdDisplay {
    fn clear(&mut self) {
        self.lcd.clear(&mut self.delay).unwrap();
    }

    fn write_at(&mut self, row: u8, col: u8, text: &str) {
        let address = if row == 0 { col } else { 0x40 + col };
        self.lcd.set_cursor_pos(address, &mut self.delay).unwrap();
        self.lcd.write_str(text, &mut self.delay).unwrap();
    }
}

/// Temperature on ADC0 (GPIO26), humidity on ADC1 (GPIO27). The RP2040 ADC
/// is 12-bit; readings are scaled down to the 10-bit range the converters
/// are defined over.
struct BoardSensors {
    adc: Adc,
    temperature_pin: AdcPin<Pin<Gpio26, FunctionSio<SioInput>, PullNone>>,
    humidity_pin: AdcPin<Pin<Gpio27, FunctionSio<SioInput>, PullNone>>,
}

impl AnalogSource for BoardSensors {
    fn read_raw(&mut self, channel: u8) -> u16 {
        let counts: u16 = match channel {
            sensors::HUMIDITY_CHANNEL => self.adc.read(&mut self.humidity_pin).unwrap_or(0),
            _ => self.adc.read(&mut self.temperature_pin).unwrap_or(0),
        };
        counts >> 2
    }
}

type EepromBus = I2C<
    pac::I2C0,
    (
        Pin<Gpio8, FunctionI2C, PullUp>,
        Pin<Gpio9, FunctionI2C, PullUp>,
    ),
>;

/// 24x256 I2C EEPROM. The write-cycle settle time is handled above this
/// layer, in the reading log.
struct BoardStorage {
    eeprom: Eeprom24x<EepromBus, B64, TwoBytes, No>,
}

impl ByteStorage for BoardStorage {
    fn write_byte(&mut self, offset: u16, value: u8) -> Result<(), StorageError> {
        self.eeprom
            .write_byte(u32::from(offset), value)
            .map_err(|_| StorageError::WriteFailed)
    }
}

#[entry]
fn main() -> ! {
    info!("Thermolog starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();
    let _core = pac::CorePeripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = bsp::hal::Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Set up the ADC with both sensor inputs
    let adc = Adc::new(pac.ADC, &mut pac.RESETS);
    let board_sensors = BoardSensors {
        adc,
        temperature_pin: AdcPin::new(pins.gpio26.into_floating_input()).unwrap(),
        humidity_pin: AdcPin::new(pins.gpio27.into_floating_input()).unwrap(),
    };

    // Set up the LCD, 4-bit bus on GPIO0-5
    let mut lcd_delay = LcdDelay(timer);
    let mut lcd = HD44780::new_4bit(
        pins.gpio0.into_push_pull_output(),
        pins.gpio1.into_push_pull_output(),
        pins.gpio2.into_push_pull_output(),
        pins.gpio3.into_push_pull_output(),
        pins.gpio4.into_push_pull_output(),
        pins.gpio5.into_push_pull_output(),
        &mut lcd_delay,
    )
    .unwrap();
    lcd.reset(&mut lcd_delay).unwrap();
    lcd.clear(&mut lcd_delay).unwrap();
    lcd.set_display_mode(
        DisplayMode {
            display: ScreenOnOff::On,
            cursor_visibility: Cursor::Invisible,
            cursor_blink: CursorBlink::Off,
        },
        &mut lcd_delay,
    )
    .unwrap();
    let display = LcdDisplay {
        lcd,
        delay: lcd_delay,
    };

    // Set up the keypad: rows driven on GPIO16-19, columns read on
    // GPIO20-22 and GPIO28
    let rows: [Pin<DynPinId, FunctionSio<SioOutput>, PullDown>; 4] = [
        pins.gpio16.into_push_pull_output().into_dyn_pin(),
        pins.gpio17.into_push_pull_output().into_dyn_pin(),
        pins.gpio18.into_push_pull_output().into_dyn_pin(),
        pins.gpio19.into_push_pull_output().into_dyn_pin(),
    ];
    let cols: [Pin<DynPinId, FunctionSio<SioInput>, PullDown>; 4] = [
        pins.gpio20.into_pull_down_input().into_dyn_pin(),
        pins.gpio21.into_pull_down_input().into_dyn_pin(),
        pins.gpio22.into_pull_down_input().into_dyn_pin(),
        pins.gpio28.into_pull_down_input().into_dyn_pin(),
    ];
    let keypad = MatrixKeypad::new(rows, cols, timer);

    // Set up the EEPROM on I2C0
    let sda_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio8.reconfigure();
    let scl_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio9.reconfigure();
    let i2c = I2C::i2c0(
        pac.I2C0,
        sda_pin,
        scl_pin,
        400.kHz(),
        &mut pac.RESETS,
        clocks.system_clock.freq(),
    );
    let storage = BoardStorage {
        eeprom: Eeprom24x::new_24x256(i2c, SlaveAddr::Default),
    };

    // Set up buzzer
    let buzzer = pins.gpio6.into_push_pull_output();

    let mut logger = Logger::new(board_sensors, keypad, display, storage, buzzer, timer);

    info!("Thermolog ready");

    match logger.run() {
        Ok(()) => info!("logging run complete"),
        Err(StorageError::WriteFailed) => error!("eeprom write failed, run aborted"),
    }

    // Terminal state: nothing left to do until a power cycle.
    loop {
        timer.delay_ms(1000);
        cortex_m::asm::wfi();
    }
}
