//! AS608 instruction set and confirmation codes

use std::fmt;

use crate::error::{Error, Result};

/// Instruction codes
///
/// The subset of the AS608 instruction table that the module firmware
/// accepts on the command package.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Instruction {
    // Image and feature commands
    GenImg = 0x01,
    Img2Tz = 0x02,
    Match = 0x03,
    Search = 0x04,
    RegModel = 0x05,

    // Library commands
    Store = 0x06,
    LoadChar = 0x07,
    UpChar = 0x08,
    DownChar = 0x09,
    UpImage = 0x0A,
    DownImage = 0x0B,
    DeleteChar = 0x0C,
    Empty = 0x0D,

    // System commands
    SetSysPara = 0x0E,
    ReadSysPara = 0x0F,
    SetPwd = 0x12,
    VfyPwd = 0x13,
    GetRandomCode = 0x14,
    SetAddr = 0x15,
    WriteNotepad = 0x18,
    ReadNotepad = 0x19,
    TemplateNum = 0x1D,
}

impl Instruction {
    /// Get instruction name
    pub fn name(self) -> &'static str {
        match self {
            Self::GenImg => "GenImg",
            Self::Img2Tz => "Img2Tz",
            Self::Match => "Match",
            Self::Search => "Search",
            Self::RegModel => "RegModel",
            Self::Store => "Store",
            Self::LoadChar => "LoadChar",
            Self::UpChar => "UpChar",
            Self::DownChar => "DownChar",
            Self::UpImage => "UpImage",
            Self::DownImage => "DownImage",
            Self::DeleteChar => "DeletChar",
            Self::Empty => "Empty",
            Self::SetSysPara => "SetSysPara",
            Self::ReadSysPara => "ReadSysPara",
            Self::SetPwd => "SetPwd",
            Self::VfyPwd => "VfyPwd",
            Self::GetRandomCode => "GetRandomCode",
            Self::SetAddr => "SetAddr",
            Self::WriteNotepad => "WriteNotepad",
            Self::ReadNotepad => "ReadNotepad",
            Self::TemplateNum => "TempleteNum",
        }
    }
}

impl From<Instruction> for u8 {
    fn from(instruction: Instruction) -> u8 {
        instruction as u8
    }
}

impl TryFrom<u8> for Instruction {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Self::GenImg),
            0x02 => Ok(Self::Img2Tz),
            0x03 => Ok(Self::Match),
            0x04 => Ok(Self::Search),
            0x05 => Ok(Self::RegModel),
            0x06 => Ok(Self::Store),
            0x07 => Ok(Self::LoadChar),
            0x08 => Ok(Self::UpChar),
            0x09 => Ok(Self::DownChar),
            0x0A => Ok(Self::UpImage),
            0x0B => Ok(Self::DownImage),
            0x0C => Ok(Self::DeleteChar),
            0x0D => Ok(Self::Empty),
            0x0E => Ok(Self::SetSysPara),
            0x0F => Ok(Self::ReadSysPara),
            0x12 => Ok(Self::SetPwd),
            0x13 => Ok(Self::VfyPwd),
            0x14 => Ok(Self::GetRandomCode),
            0x15 => Ok(Self::SetAddr),
            0x18 => Ok(Self::WriteNotepad),
            0x19 => Ok(Self::ReadNotepad),
            0x1D => Ok(Self::TemplateNum),
            _ => Err(Error::UnknownInstruction(value)),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

/// On-device feature buffer
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CharBuffer {
    One = 1,
    Two = 2,
}

impl From<CharBuffer> for u8 {
    fn from(buffer: CharBuffer) -> u8 {
        buffer as u8
    }
}

impl fmt::Display for CharBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharBuffer{}", *self as u8)
    }
}

/// Confirmation code, byte 0 of every acknowledgement payload
///
/// `Ok` is the only success value; everything else is a command-specific
/// failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConfirmationCode {
    Ok,
    ReceiveError,
    NoFinger,
    EnrollFailed,
    ImageDistorted,
    ImageTooSmall,
    NoMatch,
    NotFound,
    CombineFailed,
    PageOutOfRange,
    TemplateReadError,
    UploadFailed,
    PacketRejected,
    ImageUploadFailed,
    DeleteFailed,
    ClearFailed,
    WrongPassword,
    NoValidImage,
    FlashError,
    Other(u8),
}

impl ConfirmationCode {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::ReceiveError => 0x01,
            Self::NoFinger => 0x02,
            Self::EnrollFailed => 0x03,
            Self::ImageDistorted => 0x06,
            Self::ImageTooSmall => 0x07,
            Self::NoMatch => 0x08,
            Self::NotFound => 0x09,
            Self::CombineFailed => 0x0A,
            Self::PageOutOfRange => 0x0B,
            Self::TemplateReadError => 0x0C,
            Self::UploadFailed => 0x0D,
            Self::PacketRejected => 0x0E,
            Self::ImageUploadFailed => 0x0F,
            Self::DeleteFailed => 0x10,
            Self::ClearFailed => 0x11,
            Self::WrongPassword => 0x13,
            Self::NoValidImage => 0x15,
            Self::FlashError => 0x18,
            Self::Other(code) => code,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Ok => "command executed",
            Self::ReceiveError => "error receiving packet",
            Self::NoFinger => "no finger on sensor",
            Self::EnrollFailed => "failed to enroll finger",
            Self::ImageDistorted => "image too disordered to extract features",
            Self::ImageTooSmall => "too few feature points in image",
            Self::NoMatch => "finger does not match",
            Self::NotFound => "no matching finger in library",
            Self::CombineFailed => "failed to combine character files",
            Self::PageOutOfRange => "page id beyond library",
            Self::TemplateReadError => "error reading template from library",
            Self::UploadFailed => "error uploading template",
            Self::PacketRejected => "module cannot receive following packets",
            Self::ImageUploadFailed => "error uploading image",
            Self::DeleteFailed => "failed to delete template",
            Self::ClearFailed => "failed to clear library",
            Self::WrongPassword => "wrong password",
            Self::NoValidImage => "no valid primary image in buffer",
            Self::FlashError => "error writing flash",
            Self::Other(_) => "undocumented error",
        }
    }
}

impl From<u8> for ConfirmationCode {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Ok,
            0x01 => Self::ReceiveError,
            0x02 => Self::NoFinger,
            0x03 => Self::EnrollFailed,
            0x06 => Self::ImageDistorted,
            0x07 => Self::ImageTooSmall,
            0x08 => Self::NoMatch,
            0x09 => Self::NotFound,
            0x0A => Self::CombineFailed,
            0x0B => Self::PageOutOfRange,
            0x0C => Self::TemplateReadError,
            0x0D => Self::UploadFailed,
            0x0E => Self::PacketRejected,
            0x0F => Self::ImageUploadFailed,
            0x10 => Self::DeleteFailed,
            0x11 => Self::ClearFailed,
            0x13 => Self::WrongPassword,
            0x15 => Self::NoValidImage,
            0x18 => Self::FlashError,
            other => Self::Other(other),
        }
    }
}

impl From<ConfirmationCode> for u8 {
    fn from(code: ConfirmationCode) -> u8 {
        code.as_u8()
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X} ({})", self.as_u8(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_conversion() {
        assert_eq!(u8::from(Instruction::Search), 0x04);
        assert_eq!(Instruction::try_from(0x13).unwrap(), Instruction::VfyPwd);
    }

    #[test]
    fn test_unknown_instruction() {
        let result = Instruction::try_from(0xEE);
        assert!(matches!(result, Err(Error::UnknownInstruction(0xEE))));
    }

    #[test]
    fn test_confirmation_code_only_zero_succeeds() {
        assert!(ConfirmationCode::from(0x00).is_success());
        for raw in 1..=u8::MAX {
            assert!(!ConfirmationCode::from(raw).is_success());
        }
    }

    #[test]
    fn test_confirmation_code_preserves_raw_value() {
        for raw in 0..=u8::MAX {
            assert_eq!(ConfirmationCode::from(raw).as_u8(), raw);
        }
    }

    #[test]
    fn test_confirmation_code_display() {
        let text = ConfirmationCode::NoFinger.to_string();
        assert_eq!(text, "0x02 (no finger on sensor)");
    }
}
