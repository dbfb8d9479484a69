//! Two-wire bus transactions.
//!
//! The display driver speaks in terms of a minimal start/byte/stop primitive so
//! it runs over a bit-banged bus or a hardware controller alike.
//! [`HalTwoWire`] adapts any `embedded_hal` I2C implementation.

use embedded_hal::i2c::I2c;
use heapless::Vec;

use crate::frame::FRAME_LEN;

/// Start/byte/stop bus primitive.
pub trait TwoWire {
    /// Start a write transaction to the 7-bit `address`. `false` on NACK.
    fn begin(
        &mut self,
        address: u8,
    ) -> bool;

    /// Send one byte. `false` on NACK.
    fn write_byte(
        &mut self,
        byte: u8,
    ) -> bool;

    /// Issue stop. `false` if the bus reported a failure completing the
    /// transaction.
    fn end(&mut self) -> bool;
}

/// Why a transaction was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum BusError {
    /// Nobody acknowledged the address.
    AddressNack,
    /// The byte at this index was not acknowledged.
    DataNack(usize),
    /// The transfer failed while completing.
    Transfer,
}

/// Send `bytes` to `address` as one transaction.
///
/// Any NACK aborts the rest of the transaction. Stop is always issued.
pub fn transmit(
    bus: &mut impl TwoWire,
    address: u8,
    bytes: &[u8],
) -> Result<(), BusError> {
    let sent = if bus.begin(address) {
        match bytes.iter().position(|&b| !bus.write_byte(b)) {
            Some(index) => Err(BusError::DataNack(index)),
            None => Ok(()),
        }
    } else {
        Err(BusError::AddressNack)
    };
    let completed = bus.end();
    sent?;
    if completed { Ok(()) } else { Err(BusError::Transfer) }
}

// =============================================================================
// embedded-hal adapter
// =============================================================================

/// Longest transaction the adapter buffers.
pub const MAX_TRANSACTION: usize = FRAME_LEN;

/// Buffers a transaction and hands it to an `embedded_hal` I2C bus on
/// [`TwoWire::end`].
///
/// A hardware controller reports address and data NACKs together at the end
/// of the write, so they surface as [`BusError::Transfer`]. A transaction
/// longer than [`MAX_TRANSACTION`] is refused byte-by-byte and never sent.
pub struct HalTwoWire<I> {
    i2c: I,
    address: Option<u8>,
    buffer: Vec<u8, MAX_TRANSACTION>,
}

impl<I: I2c> HalTwoWire<I> {
    pub const fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: None,
            buffer: Vec::new(),
        }
    }

    /// Give back the underlying bus.
    pub fn release(self) -> I { self.i2c }
}

impl<I: I2c> TwoWire for HalTwoWire<I> {
    fn begin(
        &mut self,
        address: u8,
    ) -> bool {
        self.buffer.clear();
        self.address = Some(address);
        true
    }

    fn write_byte(
        &mut self,
        byte: u8,
    ) -> bool {
        if self.address.is_none() {
            return false;
        }
        if self.buffer.push(byte).is_err() {
            // too long to buffer; drop the whole transaction
            self.address = None;
            return false;
        }
        true
    }

    fn end(&mut self) -> bool {
        let Some(address) = self.address.take() else {
            return true;
        };
        match self.i2c.write(address, &self.buffer) {
            Ok(()) => true,
            Err(_error) => {
                #[cfg(target_arch = "arm")]
                defmt::debug!("i2c write to {=u8:#x} failed", address);
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    /// Records bus activity and NACKs on request.
    #[derive(Default)]
    struct Recorder {
        events: std::vec::Vec<Event>,
        nack_address: bool,
        nack_after: Option<usize>,
        written: usize,
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Begin(u8),
        Byte(u8),
        End,
    }

    impl TwoWire for Recorder {
        fn begin(
            &mut self,
            address: u8,
        ) -> bool {
            self.events.push(Event::Begin(address));
            !self.nack_address
        }

        fn write_byte(
            &mut self,
            byte: u8,
        ) -> bool {
            self.events.push(Event::Byte(byte));
            self.written += 1;
            self.nack_after.is_none_or(|limit| self.written <= limit)
        }

        fn end(&mut self) -> bool {
            self.events.push(Event::End);
            true
        }
    }

    #[test]
    fn test_transmit_sends_everything() {
        let mut bus = Recorder::default();
        assert_eq!(transmit(&mut bus, 0x70, &[1, 2]), Ok(()));
        assert_eq!(
            bus.events,
            [Event::Begin(0x70), Event::Byte(1), Event::Byte(2), Event::End]
        );
    }

    #[test]
    fn test_address_nack_skips_bytes_but_stops() {
        let mut bus = Recorder {
            nack_address: true,
            ..Default::default()
        };
        assert_eq!(transmit(&mut bus, 0x71, &[1, 2, 3]), Err(BusError::AddressNack));
        assert_eq!(bus.events, [Event::Begin(0x71), Event::End]);
    }

    #[test]
    fn test_data_nack_aborts_and_stops() {
        let mut bus = Recorder {
            nack_after: Some(1),
            ..Default::default()
        };
        assert_eq!(transmit(&mut bus, 0x70, &[1, 2, 3]), Err(BusError::DataNack(1)));
        assert_eq!(
            bus.events,
            [Event::Begin(0x70), Event::Byte(1), Event::Byte(2), Event::End]
        );
    }

    #[test]
    fn test_hal_adapter_writes_one_transaction() {
        let expectations = [
            I2cTransaction::write(0x70, vec![0x21]),
            I2cTransaction::write(0x71, vec![0, 1, 2, 3]),
        ];
        let mut bus = HalTwoWire::new(I2cMock::new(&expectations));
        assert_eq!(transmit(&mut bus, 0x70, &[0x21]), Ok(()));
        assert_eq!(transmit(&mut bus, 0x71, &[0, 1, 2, 3]), Ok(()));
        bus.release().done();
    }

    #[test]
    fn test_hal_adapter_reports_failed_write() {
        let expectations = [I2cTransaction::write(0x70, vec![0x81]).with_error(ErrorKind::Other)];
        let mut bus = HalTwoWire::new(I2cMock::new(&expectations));
        assert_eq!(transmit(&mut bus, 0x70, &[0x81]), Err(BusError::Transfer));
        bus.release().done();
    }

    #[test]
    fn test_hal_adapter_rejects_oversized_transaction() {
        let mut bus = HalTwoWire::new(I2cMock::new(&[]));
        let oversized = [0u8; MAX_TRANSACTION + 1];
        assert_eq!(
            transmit(&mut bus, 0x70, &oversized),
            Err(BusError::DataNack(MAX_TRANSACTION))
        );
        // nothing reaches the bus
        bus.release().done();
    }

    #[test]
    fn test_hal_adapter_end_without_begin() {
        let mut bus = HalTwoWire::new(I2cMock::new(&[]));
        assert!(!bus.write_byte(1));
        assert!(bus.end());
        bus.release().done();
    }
}
