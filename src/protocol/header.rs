//! ONELAB frame header
//!
//! The header is two native-endian `i32`s.

use bytes::{Buf, BufMut};

use super::{HEADER_SIZE, MessageType};

/// ONELAB frame header (8 bytes)
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Message Type (4)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                     Payload Length (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Integers use the host's native byte order: the host and the client
/// share a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    msg_type: i32,
    payload_len: i32,
}

impl FrameHeader {
    /// Create a new frame header
    #[must_use]
    pub const fn new(msg_type: i32, payload_len: i32) -> Self {
        Self {
            msg_type,
            payload_len,
        }
    }

    /// Get raw message type code
    #[must_use]
    pub const fn msg_type_code(&self) -> i32 {
        self.msg_type
    }

    /// Get message type, if the code is one this client knows
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_i32(self.msg_type)
    }

    /// Get declared payload length
    #[must_use]
    pub const fn payload_len(&self) -> i32 {
        self.payload_len
    }

    /// Validate the declared length against `max_payload`, returning it as `usize`.
    pub fn validate(&self, max_payload: usize) -> super::Result<usize> {
        let len = usize::try_from(self.payload_len).map_err(|_| super::Error::InvalidLength {
            len: self.payload_len,
        })?;

        if len > max_payload {
            return Err(super::Error::PayloadTooLarge {
                size: len,
                max: max_payload,
            });
        }

        Ok(len)
    }

    /// Append the header to a buffer
    pub fn write_to(&self, buf: &mut impl BufMut) {
        buf.put_i32_ne(self.msg_type);
        buf.put_i32_ne(self.payload_len);
    }

    /// Convert to bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut cursor = &mut bytes[..];
        self.write_to(&mut cursor);
        bytes
    }

    /// Parse from exactly [`HEADER_SIZE`] bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        let mut cursor = &bytes[..];
        let msg_type = cursor.get_i32_ne();
        let payload_len = cursor.get_i32_ne();
        Self {
            msg_type,
            payload_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Error;

    #[test]
    fn test_header_roundtrip() {
        let header = FrameHeader::new(MessageType::ParameterQuery.as_i32(), 789);
        let decoded = FrameHeader::from_bytes(header.to_bytes());

        assert_eq!(decoded.message_type(), Some(MessageType::ParameterQuery));
        assert_eq!(decoded.payload_len(), 789);
    }

    #[test]
    fn test_native_layout() {
        let bytes = FrameHeader::new(23, 5).to_bytes();
        assert_eq!(&bytes[0..4], &23i32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &5i32.to_ne_bytes());
    }

    #[test]
    fn test_negative_length_rejected() {
        let header = FrameHeader::new(10, -4);
        assert!(matches!(
            header.validate(1024),
            Err(Error::InvalidLength { len: -4 })
        ));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let header = FrameHeader::new(10, 2048);
        assert!(matches!(
            header.validate(1024),
            Err(Error::PayloadTooLarge {
                size: 2048,
                max: 1024
            })
        ));
        assert_eq!(FrameHeader::new(10, 1024).validate(1024).unwrap(), 1024);
    }

    #[test]
    fn test_unknown_type_is_kept_raw() {
        let header = FrameHeader::from_bytes(FrameHeader::new(99, 0).to_bytes());
        assert_eq!(header.message_type(), None);
        assert_eq!(header.msg_type_code(), 99);
    }
}
