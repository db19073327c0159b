use embedded_hal::delay::DelayNs;

/// Settle time after each byte write, covering the EEPROM write cycle.
pub const WRITE_SETTLE_MS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum StorageError {
    WriteFailed,
}

/// Byte-addressed non-volatile storage. The board backend owns the actual
/// EEPROM; offsets are run-relative, starting at 0.
pub trait ByteStorage {
    fn write_byte(&mut self, offset: u16, value: u8) -> Result<(), StorageError>;
}

/// Append-only view over a [`ByteStorage`]. Keeps the next free offset and
/// clamps every reading into a single byte before it is written.
///
/// Layout per run: temperature then humidity, one byte each, per
/// measurement. Each run restarts at offset 0 and overwrites the previous
/// one.
pub struct ReadingLog<S> {
    storage: S,
    cursor: u16,
}

impl<S: ByteStorage> ReadingLog<S> {
    pub fn new(storage: S) -> Self {
        Self { storage, cursor: 0 }
    }

    /// Next free byte offset.
    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    /// Rewinds to offset 0, called at the start of every run.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Clamps `value` to 0..=255, writes it at the cursor and waits out the
    /// write settle time. The cursor only advances on success.
    pub fn append(&mut self, value: u16, delay: &mut impl DelayNs) -> Result<(), StorageError> {
        let byte = value.min(255) as u8;
        self.storage.write_byte(self.cursor, byte)?;
        delay.delay_ms(WRITE_SETTLE_MS);
        self.cursor += 1;
        Ok(())
    }
}
