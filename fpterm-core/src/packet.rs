//! AS608 frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::{debug, trace};

use crate::{
    checksum,
    command::{ConfirmationCode, Instruction},
    constants::{DEFAULT_ADDRESS, HEADER, PackageType},
    error::{Error, Result},
};

/// AS608 protocol frame
///
/// # Frame Structure
///
/// ```text
/// ┌──────────┬──────────┬──────────┬──────────┬─────────────┬──────────┐
/// │  Header  │ Address  │   Type   │  Length  │   Payload   │ Checksum │
/// │ 2 bytes  │ 4 bytes  │  1 byte  │ 2 bytes  │   N bytes   │ 2 bytes  │
/// │ (0xEF01) │ (BE u32) │          │ (N + 2)  │             │ (BE u16) │
/// └──────────┴──────────┴──────────┴──────────┴─────────────┴──────────┘
/// ```
///
/// All multi-byte values are big-endian. For command frames the first
/// payload byte is the instruction code; for acknowledgements it is the
/// confirmation code.
///
/// # Examples
///
/// ```
/// use fpterm_core::{Instruction, Packet};
///
/// let packet = Packet::command(Instruction::GenImg, &[]).unwrap();
/// let encoded = packet.encode();
///
/// let decoded = Packet::decode(encoded).unwrap();
/// assert_eq!(decoded.instruction().unwrap(), Instruction::GenImg);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    /// Module address
    pub address: u32,

    /// Package identifier
    pub package_type: PackageType,

    /// Packet payload (instruction or confirmation code first)
    pub payload: Bytes,

    /// Checksum as received; `None` for locally built frames
    received_checksum: Option<u16>,
}

impl Packet {
    /// Bytes before the payload: header, address, type, length
    pub const HEADER_SIZE: usize = 9;

    /// Trailing checksum size
    pub const CHECKSUM_SIZE: usize = 2;

    /// Largest payload carried by a single frame
    pub const MAX_PAYLOAD_SIZE: usize = 256;

    /// Create a frame for the default address
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` if the payload exceeds [`Packet::MAX_PAYLOAD_SIZE`].
    pub fn with_payload(package_type: PackageType, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();

        if payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            address: DEFAULT_ADDRESS,
            package_type,
            payload,
            received_checksum: None,
        })
    }

    /// Create a command frame: instruction code followed by its parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use fpterm_core::{Instruction, Packet};
    ///
    /// let packet = Packet::command(Instruction::Img2Tz, &[0x01]).unwrap();
    /// assert_eq!(packet.encode().as_ref(), &[
    ///     0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x04, 0x02, 0x01, 0x00, 0x08,
    /// ]);
    /// ```
    pub fn command(instruction: Instruction, params: &[u8]) -> Result<Self> {
        let mut payload = BytesMut::with_capacity(1 + params.len());
        payload.put_u8(instruction.into());
        payload.put_slice(params);

        Self::with_payload(PackageType::Command, payload.freeze())
    }

    /// Create an acknowledgement frame
    pub fn ack(payload: impl Into<Bytes>) -> Result<Self> {
        Self::with_payload(PackageType::Ack, payload)
    }

    /// Address this frame to a specific module
    pub fn with_address(mut self, address: u32) -> Self {
        self.address = address;
        self
    }

    /// Value of the length field: payload plus checksum
    pub fn length(&self) -> u16 {
        (self.payload.len() + Self::CHECKSUM_SIZE) as u16
    }

    /// Calculate checksum for this frame
    pub fn checksum(&self) -> u16 {
        checksum::calculate(self.package_type.into(), self.length(), &self.payload)
    }

    /// Whether the received checksum agrees with the computed one
    ///
    /// Always true for frames built locally.
    pub fn checksum_matches(&self) -> bool {
        self.received_checksum
            .is_none_or(|received| received == self.checksum())
    }

    /// Encode frame to bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use fpterm_core::{Instruction, Packet};
    ///
    /// let bytes = Packet::command(Instruction::GenImg, &[]).unwrap().encode();
    /// assert_eq!(bytes.len(), 12);
    /// assert_eq!(&bytes[10..], &[0x00, 0x05]);
    /// ```
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());

        buf.put_u16(HEADER);
        buf.put_u32(self.address);
        buf.put_u8(self.package_type.into());
        buf.put_u16(self.length());
        buf.put_slice(&self.payload);
        buf.put_u16(self.checksum());

        buf
    }

    /// Decode a frame sent by the module at the default address
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` if:
    /// - Buffer is shorter than the header, or than the length field announces
    /// - Header or address do not match
    /// - Package type is unknown
    ///
    /// The checksum is not enforced: some modules omit or vary it.
    pub fn decode(buf: BytesMut) -> Result<Self> {
        Self::decode_from(buf, DEFAULT_ADDRESS)
    }

    /// Decode a frame sent by the module at `address`
    pub fn decode_from(mut buf: BytesMut, address: u32) -> Result<Self> {
        let minimum = Self::HEADER_SIZE + Self::CHECKSUM_SIZE;
        if buf.len() < minimum {
            return Err(Error::malformed(format!(
                "expected at least {} bytes, got {}",
                minimum,
                buf.len()
            )));
        }

        let header = buf.get_u16();
        if header != HEADER {
            return Err(Error::malformed(format!("bad header 0x{:04X}", header)));
        }

        let frame_address = buf.get_u32();
        if frame_address != address {
            return Err(Error::malformed(format!(
                "address 0x{:08X} does not match 0x{:08X}",
                frame_address, address
            )));
        }

        let type_raw = buf.get_u8();
        let package_type = PackageType::from_u8(type_raw)
            .ok_or_else(|| Error::malformed(format!("unknown package type 0x{:02X}", type_raw)))?;

        let length = buf.get_u16() as usize;
        if length < Self::CHECKSUM_SIZE {
            return Err(Error::malformed(format!("length field {} too small", length)));
        }
        if buf.len() < length {
            return Err(Error::malformed(format!(
                "length field announces {} bytes, {} remain",
                length,
                buf.len()
            )));
        }
        if buf.len() > length {
            trace!("Ignoring {} trailing bytes", buf.len() - length);
        }

        let payload = buf.split_to(length - Self::CHECKSUM_SIZE).freeze();
        let received = buf.get_u16();

        let packet = Self {
            address: frame_address,
            package_type,
            payload,
            received_checksum: Some(received),
        };

        if !packet.checksum_matches() {
            debug!(
                "Checksum mismatch: computed 0x{:04X}, received 0x{:04X}",
                packet.checksum(),
                received
            );
        }

        Ok(packet)
    }

    /// Instruction code of a command frame
    pub fn instruction(&self) -> Result<Instruction> {
        let code = self
            .payload
            .first()
            .copied()
            .ok_or_else(|| Error::malformed("empty command payload"))?;
        Instruction::try_from(code)
    }

    /// Instruction parameters of a command frame
    pub fn params(&self) -> &[u8] {
        self.payload.get(1..).unwrap_or_default()
    }

    /// Confirmation code of an acknowledgement
    pub fn confirmation_code(&self) -> Result<ConfirmationCode> {
        if self.package_type != PackageType::Ack {
            return Err(Error::malformed(format!(
                "expected acknowledgement, got {:?} package",
                self.package_type
            )));
        }

        self.payload
            .first()
            .copied()
            .map(ConfirmationCode::from)
            .ok_or_else(|| Error::malformed("acknowledgement without confirmation code"))
    }

    /// Bytes following the confirmation code
    pub fn ack_data(&self) -> &[u8] {
        self.params()
    }

    /// Get total frame size
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len() + Self::CHECKSUM_SIZE
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("address", &format!("0x{:08X}", self.address))
            .field("package_type", &self.package_type)
            .field("length", &self.length())
            .field("checksum", &format!("0x{:04X}", self.checksum()))
            .field("payload", &hex::encode(&self.payload))
            .finish()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packet[{:?}](addr=0x{:08X}, len={})",
            self.package_type,
            self.address,
            self.payload.len()
        )
    }
}
