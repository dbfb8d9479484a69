//! Slowly changing totals that survive power loss.
//!
//! The core only moves the counters and raises the dirty flag. Writing them to
//! nonvolatile memory belongs to a [`StatusStorage`] implementation, which is
//! also the only thing that clears the flag.

/// Highest value of the hobbs counter before it wraps into the overflow count.
pub const HOBBS_MAX: u16 = 39_999;

/// Persisted engine-hours and fuel totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct PersistentStatus {
    /// Engine run time in 1/40 hour ticks, `0..=HOBBS_MAX`.
    pub hobbs: u16,
    /// Number of times `hobbs` wrapped past `HOBBS_MAX`.
    pub hobbs_overflow: u16,
    /// Fuel remaining in quarter display units.
    pub fuel: u16,
}

impl PersistentStatus {
    /// Add one hobbs tick, wrapping into the overflow counter.
    pub fn add_hobbs_tick(&mut self) {
        if self.hobbs >= HOBBS_MAX {
            self.hobbs = 0;
            self.hobbs_overflow = self.hobbs_overflow.wrapping_add(1);
        } else {
            self.hobbs += 1;
        }
    }

    /// Remove one fuel unit, never going below zero.
    ///
    /// Returns `false` when the tank already read empty.
    pub fn consume_fuel_unit(&mut self) -> bool {
        if self.fuel == 0 {
            return false;
        }
        self.fuel -= 1;
        true
    }
}

/// Settings read from nonvolatile memory at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Settings {
    /// Fuel-flow transducer pulses per fuel-remaining unit.
    pub k_factor: u16,
}

impl Default for Settings {
    fn default() -> Self { Self { k_factor: 38 } }
}

// =============================================================================
// Status record with dirty tracking
// =============================================================================

/// The persistent status plus its deferred-write flag.
///
/// `revision` counts every change so a commit that raced with a new change
/// does not clear the flag for data it never saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusRecord {
    pub status: PersistentStatus,
    pub dirty: bool,
    pub revision: u32,
}

impl StatusRecord {
    pub const fn new(status: PersistentStatus) -> Self {
        Self {
            status,
            dirty: false,
            revision: 0,
        }
    }

    /// Hobbs pre-load exhausted: count an hour tick and mark dirty.
    pub fn record_hobbs_tick(&mut self) {
        self.status.add_hobbs_tick();
        self.mark_dirty();
    }

    /// Fuel-flow bounded counter reached the k-factor.
    pub fn record_fuel_unit(&mut self) {
        if self.status.consume_fuel_unit() {
            self.mark_dirty();
        }
    }

    /// Clear the flag if nothing changed since `revision` was snapshotted.
    pub fn mark_committed(
        &mut self,
        revision: u32,
    ) -> bool {
        if self.revision == revision {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision = self.revision.wrapping_add(1);
    }
}

// =============================================================================
// Storage collaborator
// =============================================================================

/// Failure reported by a nonvolatile storage backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum StorageError {
    /// Nothing valid stored yet.
    Blank,
    /// Stored record failed its integrity check.
    Corrupt,
    /// The medium rejected the read, erase or write.
    Device,
}

/// Nonvolatile backing for settings and status.
pub trait StatusStorage {
    /// Read settings and the last committed status.
    fn load(&mut self) -> Result<(Settings, PersistentStatus), StorageError>;

    /// Write `status`.
    fn commit(
        &mut self,
        status: &PersistentStatus,
    ) -> Result<(), StorageError>;
}

// =============================================================================
// Stored record
// =============================================================================

/// Bytes in one stored settings-and-status record.
pub const RECORD_LEN: usize = 16;

const RECORD_MAGIC: [u8; 4] = *b"ENG1";
const CRC_OFFSET: usize = 12;

/// CRC-8, polynomial 0x31, initial value 0xFF.
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Serialize settings and status for nonvolatile storage.
///
/// Layout: magic, then `k_factor`, `hobbs`, `hobbs_overflow` and `fuel` as
/// little-endian `u16`, a CRC-8 over everything before it, and erased-flash
/// padding.
pub fn encode_record(
    settings: &Settings,
    status: &PersistentStatus,
) -> [u8; RECORD_LEN] {
    let mut record = [0xFF; RECORD_LEN];
    record[..4].copy_from_slice(&RECORD_MAGIC);
    let fields = [settings.k_factor, status.hobbs, status.hobbs_overflow, status.fuel];
    for (chunk, field) in record[4..CRC_OFFSET].chunks_exact_mut(2).zip(fields) {
        chunk.copy_from_slice(&field.to_le_bytes());
    }
    record[CRC_OFFSET] = crc8(&record[..CRC_OFFSET]);
    record
}

/// Parse a stored record, rejecting erased or damaged ones.
pub fn decode_record(record: &[u8; RECORD_LEN]) -> Result<(Settings, PersistentStatus), StorageError> {
    if record.iter().all(|&b| b == 0xFF) {
        return Err(StorageError::Blank);
    }
    if record[..4] != RECORD_MAGIC || record[CRC_OFFSET] != crc8(&record[..CRC_OFFSET]) {
        return Err(StorageError::Corrupt);
    }
    let field = |offset: usize| u16::from_le_bytes([record[offset], record[offset + 1]]);
    let status = PersistentStatus {
        hobbs: field(6),
        hobbs_overflow: field(8),
        fuel: field(10),
    };
    if status.hobbs > HOBBS_MAX {
        return Err(StorageError::Corrupt);
    }
    Ok((Settings { k_factor: field(4) }, status))
}

// =============================================================================
// Unit Tests
// =============================================================================
