//! ONELAB parameter codec (encode/decode)
//!
//! A parameter travels as a flat list of NUL-separated tokens:
//!
//! ```text
//! "1.05" \0 <type> \0 <field 1 tokens> \0 ... \0 <field N tokens>
//! ```
//!
//! Fields follow the table in [`super::schema`]; lists and dicts are a count
//! token followed by their elements (dict: key then value).

use tracing::{debug, warn};

use super::float::{format_float, parse_float};
use super::parameter::{Parameter, ParameterType};
use super::schema::{Field, FieldType, fields_of};
use super::{Error, MAX_COLLECTION_LEN, Result, TOKEN_SEPARATOR, WIRE_VERSION};

/// Codec settings.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    /// Treat version/type tag disagreement as an error instead of a warning
    pub strict_tags: bool,
    /// Largest list or dict count accepted while decoding
    pub max_collection_len: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            strict_tags: false,
            max_collection_len: MAX_COLLECTION_LEN,
        }
    }
}

impl Codec {
    /// Encode a parameter into its token string
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] if the parameter has no name,
    /// [`Error::EmbeddedSeparator`] if a string field contains NUL.
    pub fn encode(&self, parameter: &Parameter) -> Result<String> {
        if parameter.name().is_empty() {
            return Err(Error::EmptyName);
        }

        let ty = parameter.parameter_type();
        let mut tokens = vec![WIRE_VERSION.to_owned(), ty.as_str().to_owned()];

        for (spec, value) in fields_of(ty).zip(parameter.to_fields()) {
            encode_field(spec.name, &spec.ty, value, &mut tokens)?;
        }

        Ok(tokens.join(TOKEN_SEPARATOR.to_string().as_str()))
    }

    /// Decode a token string into a parameter of type `expected`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token stream ends before the last field
    /// - A numeric token does not parse
    /// - A count token is negative or cannot be satisfied
    /// - Tags disagree and [`Codec::strict_tags`] is set
    pub fn decode(&self, expected: ParameterType, payload: &str) -> Result<Parameter> {
        let mut tokens = Tokens::new(payload);

        let version = tokens.next("version")?;
        if version != WIRE_VERSION {
            if self.strict_tags {
                return Err(Error::VersionMismatch {
                    expected: WIRE_VERSION,
                    found: version.to_owned(),
                });
            }
            warn!(expected = WIRE_VERSION, found = version, "onelab version mismatch");
        }

        let tag = tokens.next("type")?;
        if tag != expected.as_str() {
            if self.strict_tags {
                return Err(Error::TypeMismatch {
                    expected: expected.as_str(),
                    found: tag.to_owned(),
                });
            }
            warn!(expected = expected.as_str(), found = tag, "onelab parameter type mismatch");
        }

        let mut fields = Vec::new();
        for spec in fields_of(expected) {
            fields.push(self.decode_field(spec.name, &spec.ty, &mut tokens)?);
        }

        if tokens.remaining > 0 {
            warn!(surplus = tokens.remaining, "ignoring trailing parameter tokens");
        }

        Parameter::from_fields(expected, fields)
    }

    /// Decode `payload` and overwrite `parameter` with the result.
    ///
    /// On error `parameter` is left untouched.
    pub fn decode_into(&self, parameter: &mut Parameter, payload: &str) -> Result<()> {
        let decoded = self.decode(parameter.parameter_type(), payload)?;
        debug!(name = decoded.name(), "adopting host value");
        parameter.overwrite(decoded);
        Ok(())
    }

    fn decode_field(&self, name: &'static str, ty: &FieldType, tokens: &mut Tokens<'_>) -> Result<Field> {
        match ty {
            FieldType::String => Ok(Field::Str(tokens.next(name)?.to_owned())),
            FieldType::Int => {
                let token = tokens.next(name)?;
                parse_int(name, token).map(Field::Int)
            }
            FieldType::Float => {
                let token = tokens.next(name)?;
                parse_float(token)
                    .map(Field::Float)
                    .ok_or_else(|| Error::InvalidNumber {
                        field: name,
                        expected: "float",
                        token: token.to_owned(),
                    })
            }
            FieldType::List(item) => {
                let count = self.decode_count(name, 1, tokens)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.decode_field(name, item, tokens)?);
                }
                Ok(Field::List(items))
            }
            FieldType::Dict(key, value) => {
                let count = self.decode_count(name, 2, tokens)?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let k = self.decode_field(name, key, tokens)?;
                    let v = self.decode_field(name, value, tokens)?;
                    entries.push((k, v));
                }
                Ok(Field::Dict(entries))
            }
        }
    }

    /// Read a count token; each element needs at least `tokens_per_item` tokens.
    fn decode_count(&self, name: &'static str, tokens_per_item: usize, tokens: &mut Tokens<'_>) -> Result<usize> {
        let token = tokens.next(name)?;
        let count = parse_int(name, token)?;
        let max = self
            .max_collection_len
            .min(tokens.remaining / tokens_per_item);

        match usize::try_from(count) {
            Ok(n) if n <= max => Ok(n),
            _ => Err(Error::CollectionTooLarge {
                field: name,
                count,
                max,
            }),
        }
    }
}

fn encode_field(name: &'static str, ty: &FieldType, value: Field, out: &mut Vec<String>) -> Result<()> {
    match (ty, value) {
        (FieldType::String, Field::Str(s)) => {
            if s.contains(TOKEN_SEPARATOR) {
                return Err(Error::EmbeddedSeparator { field: name });
            }
            out.push(s);
        }
        (FieldType::Int, Field::Int(i)) => out.push(i.to_string()),
        (FieldType::Float, Field::Float(f)) => out.push(format_float(f)),
        (FieldType::List(item), Field::List(items)) => {
            out.push(items.len().to_string());
            for i in items {
                encode_field(name, item, i, out)?;
            }
        }
        (FieldType::Dict(key, val), Field::Dict(entries)) => {
            out.push(entries.len().to_string());
            for (k, v) in entries {
                encode_field(name, key, k, out)?;
                encode_field(name, val, v, out)?;
            }
        }
        _ => return Err(Error::SchemaMismatch { field: name }),
    }
    Ok(())
}

fn parse_int(name: &'static str, token: &str) -> Result<i64> {
    token.trim().parse::<i64>().map_err(|_| Error::InvalidNumber {
        field: name,
        expected: "int",
        token: token.to_owned(),
    })
}

/// Token cursor that knows how many tokens are left.
struct Tokens<'a> {
    inner: std::str::Split<'a, char>,
    remaining: usize,
}

impl<'a> Tokens<'a> {
    fn new(payload: &'a str) -> Self {
        Self {
            inner: payload.split(TOKEN_SEPARATOR),
            remaining: payload.matches(TOKEN_SEPARATOR).count() + 1,
        }
    }

    fn next(&mut self, field: &'static str) -> Result<&'a str> {
        let token = self.inner.next().ok_or(Error::MissingToken { field })?;
        self.remaining -= 1;
        Ok(token)
    }
}

/// Encode a parameter with default codec settings
pub fn encode(parameter: &Parameter) -> Result<String> {
    Codec::default().encode(parameter)
}

/// Decode a parameter with default codec settings
pub fn decode(expected: ParameterType, payload: &str) -> Result<Parameter> {
    Codec::default().decode(expected, payload)
}
