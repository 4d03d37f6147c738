//! Search results

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// Library match reported by a successful search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Library page of the matching template
    pub matched_id: u16,

    /// Match score computed by the module
    pub score: u16,
}

impl MatchResult {
    pub fn new(matched_id: u16, score: u16) -> Self {
        Self { matched_id, score }
    }

    /// Parse the bytes that follow the confirmation code in a search
    /// acknowledgement: page id then score, both big-endian
    pub fn from_search_data(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::Parse(format!(
                "search result needs 4 bytes, got {}",
                data.len()
            )));
        }

        Ok(Self {
            matched_id: BigEndian::read_u16(&data[0..2]),
            score: BigEndian::read_u16(&data[2..4]),
        })
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match[id: {}, score: {}]", self.matched_id, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_data() {
        let result = MatchResult::from_search_data(&[0x00, 0x2A, 0x01, 0x02]).unwrap();
        assert_eq!(result, MatchResult::new(42, 258));
    }

    #[test]
    fn test_parse_short_data() {
        assert!(MatchResult::from_search_data(&[0x00, 0x2A]).is_err());
    }
}
