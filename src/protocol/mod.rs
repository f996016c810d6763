//! ONELAB protocol core implementation
//!
//! This module provides the parameter model, the token codec, and the frame
//! header and message types.

mod codec;
mod error;
mod float;
mod header;
mod parameter;
mod schema;
mod types;

pub use codec::{Codec, decode, encode};
pub use error::{Error, Result};
pub use float::{format_float, parse_float};
pub use header::FrameHeader;
pub use parameter::{
    DEFAULT_STRING_KIND, Metadata, NumberValue, Parameter, ParameterType, ParameterValue,
    StringValue,
};
pub use schema::{COMMON_FIELDS, Field, FieldSpec, FieldType, NUMBER_FIELDS, STRING_FIELDS, fields_of};
pub use types::MessageType;

/// Version tag opening every encoded parameter
pub const WIRE_VERSION: &str = "1.05";

/// Separator between parameter tokens
pub const TOKEN_SEPARATOR: char = '\0';

/// Frame header size in bytes
pub const HEADER_SIZE: usize = 8;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Maximum list/dict count accepted while decoding
pub const MAX_COLLECTION_LEN: usize = 65_536;
