//! Stream identification.
//!
//! A stream is addressed by the pair (data provider, stream id). The data
//! provider is a 20-byte account address written as `0x` + 40 hex digits;
//! the stream id is a fixed 32-character identifier.

use crate::error::{CoreError, Result};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a data provider address in its string form (`0x` + 40 hex).
pub const DATA_PROVIDER_LEN: usize = 42;

/// Length of a stream id.
pub const STREAM_ID_LEN: usize = 32;

/// Check the string form of a data provider address.
///
/// Length is checked before the prefix.
pub fn validate_data_provider(data_provider: &str) -> Result<()> {
    if data_provider.len() != DATA_PROVIDER_LEN {
        return Err(CoreError::invalid("data_provider", "data_provider must be 42 characters"));
    }
    if !data_provider.starts_with("0x") {
        return Err(CoreError::invalid("data_provider", "data_provider must start with '0x'"));
    }
    Ok(())
}

/// Validate and parse a data provider address.
pub fn parse_data_provider(data_provider: &str) -> Result<Address> {
    validate_data_provider(data_provider)?;
    Address::from_str(data_provider).map_err(|_| {
        CoreError::invalid("data_provider", "data_provider must be a valid hex address")
    })
}

/// Check a stream id.
pub fn validate_stream_id(stream_id: &str) -> Result<()> {
    if stream_id.len() != STREAM_ID_LEN {
        return Err(CoreError::invalid("stream_id", "stream_id must be 32 characters"));
    }
    Ok(())
}

/// Fixed-length stream identifier (e.g. `stai0000000000000000000000000000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamId(String);

impl StreamId {
    pub fn new(stream_id: impl Into<String>) -> Result<Self> {
        let stream_id = stream_id.into();
        validate_stream_id(&stream_id)?;
        Ok(Self(stream_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a `bytes32` value: its 32 bytes, verbatim.
    pub fn to_bytes32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.0.as_bytes());
        out
    }

    /// Inverse of [`StreamId::to_bytes32`]. Trailing NUL padding is ignored.
    pub fn from_bytes32(bytes: &[u8; 32]) -> Result<Self> {
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let text = std::str::from_utf8(&bytes[..end])
            .map_err(|_| CoreError::invalid("stream_id", "stream_id must be valid UTF-8"))?;
        Self::new(text)
    }
}

impl FromStr for StreamId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for StreamId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<StreamId> for String {
    fn from(value: StreamId) -> Self {
        value.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique stream address: (data provider, stream id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamLocator {
    pub data_provider: Address,
    pub stream_id: StreamId,
}

impl StreamLocator {
    /// Validate both halves and build a locator.
    pub fn new(data_provider: &str, stream_id: &str) -> Result<Self> {
        Ok(Self {
            data_provider: parse_data_provider(data_provider)?,
            stream_id: StreamId::new(stream_id)?,
        })
    }

    /// Lowercase `0x`-prefixed provider address.
    pub fn data_provider_hex(&self) -> String {
        format!("{:#x}", self.data_provider)
    }
}

impl fmt::Display for StreamLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.data_provider_hex(), self.stream_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVIDER: &str = "0x4710a8d8f0d845da110086812a32de6d90d7ff5c";
    const STREAM: &str = "stai0000000000000000000000000000";

    #[test]
    fn test_data_provider_length_checked_first() {
        let err = validate_data_provider("4710a8d8f0d845da110086812a32de6d90d7ff5c").unwrap_err();
        assert_eq!(err.to_string(), "data_provider must be 42 characters");

        let err = validate_data_provider("xx4710a8d8f0d845da110086812a32de6d90d7ff5c").unwrap_err();
        assert_eq!(err.to_string(), "data_provider must start with '0x'");
    }

    #[test]
    fn test_data_provider_rejects_non_hex() {
        let err = parse_data_provider("0xzz10a8d8f0d845da110086812a32de6d90d7ff5c").unwrap_err();
        assert_eq!(err.field(), Some("data_provider"));
    }

    #[test]
    fn test_stream_id_length() {
        assert!(StreamId::new(STREAM).is_ok());
        let err = StreamId::new("short").unwrap_err();
        assert_eq!(err.to_string(), "stream_id must be 32 characters");
    }

    #[test]
    fn test_stream_id_bytes32() {
        let id = StreamId::new(STREAM).unwrap();
        let bytes = id.to_bytes32();
        assert_eq!(&bytes[..4], b"stai");
        assert_eq!(StreamId::from_bytes32(&bytes).unwrap(), id);
    }

    #[test]
    fn test_locator_display_lowercases_provider() {
        let upper = "0x4710A8D8F0D845DA110086812A32DE6D90D7FF5C";
        let locator = StreamLocator::new(upper, STREAM).unwrap();
        assert_eq!(locator.to_string(), format!("{PROVIDER}/{STREAM}"));
    }
}
