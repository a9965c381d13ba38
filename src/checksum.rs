//! Longitudinal redundancy check
//!
//! The scorepad's LRC is the running XOR of the address byte followed by every
//! payload byte. Control bytes are not part of the checked region.

use thiserror::Error;

use crate::types::{RawFrame, ValidatedFrame};

/// A frame whose trailing byte does not match its computed LRC.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("LRC mismatch: received {received:#04x}, calculated {calculated:#04x}")]
pub struct ChecksumMismatch {
    pub received: u8,
    pub calculated: u8,
    /// The rejected frame, kept for diagnostics
    pub frame: RawFrame,
}

/// XOR-fold `address ‖ payload`.
pub fn lrc(address: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(address, |acc, byte| acc ^ byte)
}

/// Promote a raw frame to a [`ValidatedFrame`] if its LRC matches.
pub fn validate(frame: RawFrame) -> Result<ValidatedFrame, ChecksumMismatch> {
    let calculated = lrc(frame.address, &frame.payload);
    if calculated == frame.checksum {
        Ok(ValidatedFrame::new_unchecked(frame))
    } else {
        Err(ChecksumMismatch { received: frame.checksum, calculated, frame })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn documented_example_is_rejected() {
        // 0x7F ^ 0x47 ^ 0x31 ^ 0x31 == 0x38, not 0x2D
        let frame = RawFrame::new(0x7F, vec![0x47, 0x31, 0x31], 0x2D);
        let err = validate(frame).unwrap_err();
        assert_eq!(err.calculated, 0x38);
        assert_eq!(err.received, 0x2D);
        assert!(err.to_string().contains("0x38"));
    }

    #[test]
    fn matching_lrc_is_accepted() {
        let frame = RawFrame::new(0x7F, vec![0x47, 0x31, 0x31], 0x38);
        let validated = validate(frame).unwrap();
        assert_eq!(validated.address(), 0x7F);
        assert_eq!(validated.payload(), &[0x47, 0x31, 0x31]);
    }

    #[test]
    fn empty_payload_lrc_is_address() {
        assert_eq!(lrc(0x7F, &[]), 0x7F);
        assert!(validate(RawFrame::new(0x7F, vec![], 0x7F)).is_ok());
    }

    proptest! {
        #[test]
        fn computed_lrc_always_validates(
            address in any::<u8>(),
            payload in prop::collection::vec(any::<u8>(), 0..64)
        ) {
            let checksum = lrc(address, &payload);
            prop_assert!(validate(RawFrame::new(address, payload, checksum)).is_ok());
        }

        #[test]
        fn any_single_bit_flip_is_rejected(
            address in any::<u8>(),
            payload in prop::collection::vec(any::<u8>(), 0..64),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8
        ) {
            let checksum = lrc(address, &payload);
            let mask = 1u8 << bit;
            // Positions: 0 = address, 1..=len = payload, len + 1 = checksum
            let target = position.index(payload.len() + 2);

            let mut frame = RawFrame::new(address, payload, checksum);
            if target == 0 {
                frame.address ^= mask;
            } else if target <= frame.payload.len() {
                frame.payload[target - 1] ^= mask;
            } else {
                frame.checksum ^= mask;
            }

            prop_assert!(validate(frame).is_err());
        }
    }
}
