//! Protocol constants

/// Frame start code, transmitted high byte first
pub const HEADER: u16 = 0xEF01;

/// Default module address (broadcast)
pub const DEFAULT_ADDRESS: u32 = 0xFFFF_FFFF;

/// Default module password
pub const DEFAULT_PASSWORD: u32 = 0x0000_0000;

/// Factory UART baud rate
pub const DEFAULT_BAUD_RATE: u32 = 57600;

/// Default read timeout (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;

/// Maximum attempts for template registration
pub const MAX_REGISTER_ATTEMPTS: u32 = 3;

/// Pause between registration attempts (milliseconds)
pub const REGISTER_RETRY_PAUSE_MS: u64 = 500;

/// Number of template slots in the fingerprint library
pub const LIBRARY_CAPACITY: u16 = 176;

/// Fixed response lengths (header + confirmation + extras + checksum)
pub mod response_len {
    /// Acknowledgement carrying only a confirmation code
    pub const ACK: usize = 12;

    /// Search acknowledgement: confirmation, page id, match score
    pub const SEARCH: usize = 16;
}

/// Package identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PackageType {
    Command = 0x01,
    Data = 0x02,
    Ack = 0x07,
    EndData = 0x08,
}

impl PackageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Command),
            0x02 => Some(Self::Data),
            0x07 => Some(Self::Ack),
            0x08 => Some(Self::EndData),
            _ => None,
        }
    }
}

impl From<PackageType> for u8 {
    fn from(value: PackageType) -> u8 {
        value as u8
    }
}
