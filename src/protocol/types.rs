//! ONELAB message type codes

use std::fmt;

/// Message types understood by the ONELAB host.
///
/// Codes are fixed by the host (Gmsh socket protocol); the gaps belong to
/// messages this client never sends nor interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MessageType {
    /// Client announces itself (payload: process id)
    Start = 1,
    /// Client says goodbye
    Stop = 2,
    /// Informational text, also "parameter unknown" in query replies
    Info = 10,
    /// Ask the host to merge a file
    MergeFile = 20,
    /// Ask the host to parse a script string
    ParseString = 21,
    /// Encoded parameter
    Parameter = 23,
    /// Encoded parameter lookup
    ParameterQuery = 24,
    /// Sub-client handshake
    Connect = 27,
}

impl MessageType {
    /// All known message types, in code order.
    pub const ALL: [Self; 8] = [
        Self::Start,
        Self::Stop,
        Self::Info,
        Self::MergeFile,
        Self::ParseString,
        Self::Parameter,
        Self::ParameterQuery,
        Self::Connect,
    ];

    /// Convert from wire code
    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Start),
            2 => Some(Self::Stop),
            10 => Some(Self::Info),
            20 => Some(Self::MergeFile),
            21 => Some(Self::ParseString),
            23 => Some(Self::Parameter),
            24 => Some(Self::ParameterQuery),
            27 => Some(Self::Connect),
            _ => None,
        }
    }

    /// Convert to wire code
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Info => "INFO",
            Self::MergeFile => "MERGE_FILE",
            Self::ParseString => "PARSE_STRING",
            Self::Parameter => "PARAMETER",
            Self::ParameterQuery => "PARAMETER_QUERY",
            Self::Connect => "CONNECT",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_roundtrip() {
        for msg_type in MessageType::ALL {
            let code = msg_type.as_i32();
            let decoded = MessageType::from_i32(code).unwrap();
            assert_eq!(msg_type, decoded);
        }
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(MessageType::Start.as_i32(), 1);
        assert_eq!(MessageType::Stop.as_i32(), 2);
        assert_eq!(MessageType::Info.as_i32(), 10);
        assert_eq!(MessageType::MergeFile.as_i32(), 20);
        assert_eq!(MessageType::ParseString.as_i32(), 21);
        assert_eq!(MessageType::Parameter.as_i32(), 23);
        assert_eq!(MessageType::ParameterQuery.as_i32(), 24);
        assert_eq!(MessageType::Connect.as_i32(), 27);
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(MessageType::from_i32(22), None);
        assert_eq!(MessageType::from_i32(-1), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(MessageType::ParameterQuery.to_string(), "PARAMETER_QUERY");
    }
}
