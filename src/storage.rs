//! Settings and status in the last on-chip flash sector.

use embassy_rp::Peri;
use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash};
use embassy_rp::peripherals::FLASH;
use enguino_cluster::persist::{
    PersistentStatus,
    RECORD_LEN,
    Settings,
    StatusStorage,
    StorageError,
    decode_record,
    encode_record,
};

/// External QSPI flash size on the board.
const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Offset of the sector reserved by `STATUS` in `memory.x`.
const STATUS_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

pub struct FlashStorage<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    /// Written back with every status commit.
    settings: Settings,
}

impl<'d> FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
            settings: Settings::default(),
        }
    }
}

impl StatusStorage for FlashStorage<'_> {
    fn load(&mut self) -> Result<(Settings, PersistentStatus), StorageError> {
        let mut record = [0u8; RECORD_LEN];
        self.flash
            .blocking_read(STATUS_OFFSET, &mut record)
            .map_err(|_| StorageError::Device)?;
        let (settings, status) = decode_record(&record)?;
        self.settings = settings;
        Ok((settings, status))
    }

    fn commit(
        &mut self,
        status: &PersistentStatus,
    ) -> Result<(), StorageError> {
        let record = encode_record(&self.settings, status);
        self.flash
            .blocking_erase(STATUS_OFFSET, STATUS_OFFSET + ERASE_SIZE as u32)
            .map_err(|_| StorageError::Device)?;
        self.flash
            .blocking_write(STATUS_OFFSET, &record)
            .map_err(|_| StorageError::Device)
    }
}
