//! Length-prefixed element and string framing.
//!
//! All multi-byte lengths are 32-bit big-endian; strings are raw bytes
//! terminated by a single `0x00`; elements are
//! `<uint32 length><length bytes>` using each group's canonical byte form.
//! Mirrors `serialize_uint32`/`serialize_element`/`serialize_string` and
//! their unserialize counterparts in the original `libbswabe` `misc.c`.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::CpAbeError;

/// A pairing-group or scalar-field element with canonical byte encoding
/// (implemented for `Zr`, `G1`, `G2`, `Gt` in `pairing.rs`).
pub(crate) trait Element: Sized {
    fn to_bytes(&self) -> Vec<u8>;
    fn from_bytes(bytes: &[u8]) -> Result<Self, CpAbeError>;
}

pub(crate) fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.write_u32::<BigEndian>(value)
        .expect("writing to a Vec<u8> never fails");
}

pub(crate) fn read_u32(bytes: &[u8], offset: &mut usize) -> Result<u32, CpAbeError> {
    let slice = bytes
        .get(*offset..*offset + 4)
        .ok_or_else(|| CpAbeError::DeserializeError("truncated while reading a length".into()))?;
    *offset += 4;
    let mut cursor = slice;
    cursor
        .read_u32::<BigEndian>()
        .map_err(|e| CpAbeError::DeserializeError(format!("malformed length: {}", e)))
}

pub(crate) fn write_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

pub(crate) fn read_str(bytes: &[u8], offset: &mut usize) -> Result<String, CpAbeError> {
    let start = *offset;
    let nul = bytes[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| CpAbeError::DeserializeError("unterminated string".into()))?;
    let raw = &bytes[start..start + nul];
    let s = std::str::from_utf8(raw)
        .map_err(|e| CpAbeError::DeserializeError(format!("string is not UTF-8: {}", e)))?
        .to_owned();
    *offset = start + nul + 1;
    Ok(s)
}

pub(crate) fn write_elem<E: Element>(buf: &mut Vec<u8>, elem: &E) {
    let bytes = elem.to_bytes();
    write_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(&bytes);
}

pub(crate) fn read_elem<E: Element>(bytes: &[u8], offset: &mut usize) -> Result<E, CpAbeError> {
    let len = read_u32(bytes, offset)? as usize;
    let slice = bytes.get(*offset..*offset + len).ok_or_else(|| {
        CpAbeError::DeserializeError("truncated while reading an element".into())
    })?;
    *offset += len;
    E::from_bytes(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_round_trip() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0xdead_beef);
        let mut offset = 0;
        assert_eq!(read_u32(&buf, &mut offset).unwrap(), 0xdead_beef);
        assert_eq!(offset, 4);
    }

    #[test]
    fn str_round_trip() {
        let mut buf = Vec::new();
        write_str(&mut buf, "hello");
        write_str(&mut buf, "world");
        let mut offset = 0;
        assert_eq!(read_str(&buf, &mut offset).unwrap(), "hello");
        assert_eq!(read_str(&buf, &mut offset).unwrap(), "world");
        assert_eq!(offset, buf.len());
    }

    #[test]
    fn read_u32_rejects_truncation() {
        let buf = vec![0u8; 2];
        let mut offset = 0;
        assert!(read_u32(&buf, &mut offset).is_err());
    }

    #[test]
    fn read_str_rejects_missing_terminator() {
        let buf = vec![b'a', b'b', b'c'];
        let mut offset = 0;
        assert!(read_str(&buf, &mut offset).is_err());
    }
}
