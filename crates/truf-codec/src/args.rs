//! Action argument encoding.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! u16 count
//! repeat count:
//!   u8 tag
//!   payload   Null: none | Bool: u8 | Int: i64
//!             Text / Numeric / Bytes: u32 length + bytes
//! ```
//!
//! Numeric values travel as their decimal string so scale survives the trip.

use crate::error::{CodecError, CodecResult};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_TEXT: u8 = 3;
const TAG_NUMERIC: u8 = 4;
const TAG_BYTES: u8 = 5;

/// A single scalar action argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionArg {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Numeric(Decimal),
    Bytes(Vec<u8>),
}

impl ActionArg {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `Null` when `value` is `None`.
    pub fn opt_int(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |v| Self::Text(v.to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JSON rendering used by the HTTP gateway and parsed payloads.
    ///
    /// Numerics render as strings, bytes as `0x`-prefixed hex.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Text(s) => Value::String(s.clone()),
            Self::Numeric(d) => Value::String(d.to_string()),
            Self::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        }
    }

    /// String form of a scalar threshold argument.
    pub fn as_threshold(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Numeric(d) => Some(d.to_string()),
            Self::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<bool> for ActionArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ActionArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ActionArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ActionArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ActionArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for ActionArg {
    fn from(value: Decimal) -> Self {
        Self::Numeric(value)
    }
}

impl From<Vec<u8>> for ActionArg {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Encode an ordered argument list.
pub fn encode_action_args(args: &[ActionArg]) -> CodecResult<Vec<u8>> {
    let count = u16::try_from(args.len())
        .map_err(|_| CodecError::malformed("action args", "too many arguments"))?;

    let mut out = Vec::with_capacity(2 + args.len() * 9);
    out.extend_from_slice(&count.to_be_bytes());
    for arg in args {
        match arg {
            ActionArg::Null => out.push(TAG_NULL),
            ActionArg::Bool(b) => {
                out.push(TAG_BOOL);
                out.push(u8::from(*b));
            }
            ActionArg::Int(i) => {
                out.push(TAG_INT);
                out.extend_from_slice(&i.to_be_bytes());
            }
            ActionArg::Text(s) => {
                out.push(TAG_TEXT);
                put_prefixed(&mut out, s.as_bytes())?;
            }
            ActionArg::Numeric(d) => {
                out.push(TAG_NUMERIC);
                put_prefixed(&mut out, d.to_string().as_bytes())?;
            }
            ActionArg::Bytes(b) => {
                out.push(TAG_BYTES);
                put_prefixed(&mut out, b)?;
            }
        }
    }
    Ok(out)
}

/// Decode an argument list. Truncated input and trailing bytes are errors.
pub fn decode_action_args(bytes: &[u8]) -> CodecResult<Vec<ActionArg>> {
    const WHAT: &str = "action args";

    let mut reader = ByteReader::new(bytes, WHAT);
    let count = reader.u16()?;
    let mut args = Vec::with_capacity(usize::from(count));
    for idx in 0..count {
        let arg = match reader.u8()? {
            TAG_NULL => ActionArg::Null,
            TAG_BOOL => match reader.u8()? {
                0 => ActionArg::Bool(false),
                1 => ActionArg::Bool(true),
                other => {
                    return Err(CodecError::malformed(
                        WHAT,
                        format!("argument {idx}: invalid bool byte {other}"),
                    ))
                }
            },
            TAG_INT => ActionArg::Int(reader.i64()?),
            TAG_TEXT => ActionArg::Text(reader.prefixed_str()?.to_string()),
            TAG_NUMERIC => {
                let text = reader.prefixed_str()?;
                let value = Decimal::from_str(text).map_err(|e| {
                    CodecError::malformed(WHAT, format!("argument {idx}: invalid numeric: {e}"))
                })?;
                ActionArg::Numeric(value)
            }
            TAG_BYTES => ActionArg::Bytes(reader.prefixed()?.to_vec()),
            tag => {
                return Err(CodecError::malformed(
                    WHAT,
                    format!("argument {idx}: unknown tag {tag}"),
                ))
            }
        };
        args.push(arg);
    }
    reader.finish()?;
    Ok(args)
}

pub(crate) fn put_prefixed(out: &mut Vec<u8>, bytes: &[u8]) -> CodecResult<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| CodecError::malformed("length prefix", "field exceeds u32::MAX bytes"))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// Big-endian cursor over a byte slice.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8], what: &'static str) -> Self {
        Self {
            bytes,
            pos: 0,
            what,
        }
    }

    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                CodecError::malformed(
                    self.what,
                    format!("unexpected end of input at offset {}", self.pos),
                )
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub(crate) fn u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub(crate) fn u64(&mut self) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    pub(crate) fn i64(&mut self) -> CodecResult<i64> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    pub(crate) fn prefixed(&mut self) -> CodecResult<&'a [u8]> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    pub(crate) fn prefixed_str(&mut self) -> CodecResult<&'a str> {
        let bytes = self.prefixed()?;
        std::str::from_utf8(bytes)
            .map_err(|_| CodecError::malformed(self.what, "text field is not valid UTF-8"))
    }

    pub(crate) fn finish(self) -> CodecResult<()> {
        if self.pos != self.bytes.len() {
            return Err(CodecError::malformed(
                self.what,
                format!("{} trailing bytes", self.bytes.len() - self.pos),
            ));
        }
        Ok(())
    }
}
