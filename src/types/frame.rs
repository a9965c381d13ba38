//! Frame types produced by the decoder and checksum stages

use std::fmt;

/// Start-of-heading control byte; opens every frame.
pub const SOH: u8 = 0x01;
/// Start-of-text control byte; follows the address byte.
pub const STX: u8 = 0x02;
/// End-of-text control byte; closes the payload.
pub const ETX: u8 = 0x03;
/// Address the Bodet Scorepad uses by default.
pub const DEFAULT_ADDRESS: u8 = 0x7F;
/// Largest payload accepted before the decoder resynchronizes.
pub const MAX_PAYLOAD_LEN: usize = 256;

/// A complete delimited message as seen on the wire.
///
/// Only the [`FrameDecoder`](crate::FrameDecoder) constructs these, after it has
/// observed `SOH addr STX payload ETX lrc` in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Byte following start-of-heading
    pub address: u8,
    /// Bytes strictly between start-of-text and end-of-text
    pub payload: Vec<u8>,
    /// Byte following end-of-text
    pub checksum: u8,
}

impl RawFrame {
    pub fn new(address: u8, payload: Vec<u8>, checksum: u8) -> Self {
        Self { address, payload, checksum }
    }

    /// Number of bytes this frame occupied on the wire.
    pub fn wire_len(&self) -> usize {
        self.payload.len() + 5
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "addr={:#04x} payload={} lrc={:#04x}",
            self.address,
            hex::encode(&self.payload),
            self.checksum
        )
    }
}

/// A frame whose LRC has been confirmed.
///
/// Can only be obtained through [`validate`](crate::checksum::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFrame {
    frame: RawFrame,
}

impl ValidatedFrame {
    pub(crate) fn new_unchecked(frame: RawFrame) -> Self {
        Self { frame }
    }

    pub fn address(&self) -> u8 {
        self.frame.address
    }

    pub fn payload(&self) -> &[u8] {
        &self.frame.payload
    }

    pub fn into_raw(self) -> RawFrame {
        self.frame
    }
}
