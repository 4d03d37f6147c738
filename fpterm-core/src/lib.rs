//! # fpterm-core
//!
//! Core protocol implementation for AS608-class fingerprint modules.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - Checksum calculation
//! - Instruction and confirmation code tables
//! - Protocol constants

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod packet;

pub use command::{CharBuffer, ConfirmationCode, Instruction};
pub use constants::PackageType;
pub use error::{Error, Result};
pub use packet::Packet;
