//! AS608 frame checksum
//!
//! The checksum covers everything after the address field and before the
//! checksum itself:
//! 1. Package identifier
//! 2. Both bytes of the length field
//! 3. Every payload byte
//!
//! The byte sum is truncated to 16 bits and sent big-endian.

use tracing::trace;

/// Calculate the frame checksum
///
/// # Algorithm
///
/// ```text
/// sum = package_type + len_hi + len_lo + payload[0] + ... + payload[n-1]
/// checksum = sum mod 0x10000
/// ```
///
/// # Examples
///
/// ```
/// use fpterm_core::checksum;
///
/// // GenImg: package type 0x01, length 0x0003, payload [0x01]
/// assert_eq!(checksum::calculate(0x01, 0x0003, &[0x01]), 0x0005);
/// ```
pub fn calculate(package_type: u8, length: u16, payload: &[u8]) -> u16 {
    let [len_hi, len_lo] = length.to_be_bytes();

    let checksum = payload
        .iter()
        .fold(
            u16::from(package_type)
                .wrapping_add(u16::from(len_hi))
                .wrapping_add(u16::from(len_lo)),
            |sum, &byte| sum.wrapping_add(u16::from(byte)),
        );

    trace!(
        package_type = package_type,
        length = length,
        payload_len = payload.len(),
        checksum = format!("0x{:04X}", checksum),
        "Calculated checksum"
    );

    checksum
}

/// Verify checksum
pub fn verify(package_type: u8, length: u16, payload: &[u8], expected: u16) -> bool {
    calculate(package_type, length, payload) == expected
}
