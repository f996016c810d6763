//! Positional field schema for parameter encoding
//!
//! Each parameter type has a fixed, ordered field table. The codec walks the
//! table to encode and decode; field names never appear on the wire.

use std::collections::BTreeMap;

use super::parameter::{Metadata, NumberValue, Parameter, ParameterType, ParameterValue, StringValue};
use super::{Error, Result};

/// Shape of a field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// One token, verbatim
    String,
    /// One decimal integer token
    Int,
    /// One `%g` float token
    Float,
    /// Count token, then each element
    List(&'static FieldType),
    /// Count token, then key and value per entry
    Dict(&'static FieldType, &'static FieldType),
}

/// One entry of a field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, used in diagnostics only
    pub name: &'static str,
    /// Wire shape
    pub ty: FieldType,
}

const fn field(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec { name, ty }
}

/// Fields shared by every parameter type.
pub static COMMON_FIELDS: [FieldSpec; 9] = [
    field("name", FieldType::String),
    field("label", FieldType::String),
    field("help", FieldType::String),
    field("neverChanged", FieldType::Int),
    field("changed", FieldType::Int),
    field("visible", FieldType::Int),
    field("readOnly", FieldType::Int),
    field(
        "attributes",
        FieldType::Dict(&FieldType::String, &FieldType::String),
    ),
    field("clients", FieldType::List(&FieldType::String)),
];

/// Fields appended for string parameters.
pub static STRING_FIELDS: [FieldSpec; 3] = [
    field("value", FieldType::String),
    field("kind", FieldType::String),
    field("choices", FieldType::List(&FieldType::String)),
];

/// Fields appended for number parameters.
pub static NUMBER_FIELDS: [FieldSpec; 7] = [
    field("value", FieldType::Float),
    field("min", FieldType::Float),
    field("max", FieldType::Float),
    field("step", FieldType::Float),
    field("index", FieldType::Int),
    field("choices", FieldType::List(&FieldType::Float)),
    field(
        "labels",
        FieldType::Dict(&FieldType::Float, &FieldType::String),
    ),
];

/// Full field table for `ty`, in wire order.
pub fn fields_of(ty: ParameterType) -> impl Iterator<Item = &'static FieldSpec> {
    let specific: &'static [FieldSpec] = match ty {
        ParameterType::String => &STRING_FIELDS,
        ParameterType::Number => &NUMBER_FIELDS,
    };
    COMMON_FIELDS.iter().chain(specific.iter())
}

/// A decoded (or to-be-encoded) field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// [`FieldType::String`]
    Str(String),
    /// [`FieldType::Int`]
    Int(i64),
    /// [`FieldType::Float`]
    Float(f64),
    /// [`FieldType::List`]
    List(Vec<Field>),
    /// [`FieldType::Dict`]
    Dict(Vec<(Field, Field)>),
}

impl Parameter {
    /// Flatten into field values, in [`fields_of`] order.
    pub(crate) fn to_fields(&self) -> Vec<Field> {
        let m = &self.metadata;
        let mut fields = vec![
            Field::Str(self.name().to_owned()),
            Field::Str(m.label.clone()),
            Field::Str(m.help.clone()),
            Field::Int(i64::from(m.never_changed)),
            Field::Int(i64::from(m.changed)),
            Field::Int(i64::from(m.visible)),
            Field::Int(i64::from(m.read_only)),
            Field::Dict(
                m.attributes
                    .iter()
                    .map(|(k, v)| (Field::Str(k.clone()), Field::Str(v.clone())))
                    .collect(),
            ),
            Field::List(m.clients.iter().cloned().map(Field::Str).collect()),
        ];

        match self.value() {
            ParameterValue::String(s) => fields.extend([
                Field::Str(s.value.clone()),
                Field::Str(s.kind.clone()),
                Field::List(s.choices.iter().cloned().map(Field::Str).collect()),
            ]),
            ParameterValue::Number(n) => fields.extend([
                Field::Float(n.value),
                Field::Float(n.min),
                Field::Float(n.max),
                Field::Float(n.step),
                Field::Int(i64::from(n.index)),
                Field::List(n.choices.iter().copied().map(Field::Float).collect()),
                Field::Dict(
                    n.labels
                        .iter()
                        .map(|(v, l)| (Field::Float(*v), Field::Str(l.clone())))
                        .collect(),
                ),
            ]),
        }

        fields
    }

    /// Rebuild a parameter from field values produced by walking [`fields_of`]`(ty)`.
    pub(crate) fn from_fields(ty: ParameterType, fields: Vec<Field>) -> Result<Self> {
        let mut reader = FieldReader {
            fields: fields.into_iter(),
            specs: fields_of(ty),
        };

        let name = reader.string()?;
        let metadata = Metadata {
            label: reader.string()?,
            help: reader.string()?,
            never_changed: reader.flag()?,
            changed: reader.flag()?,
            visible: reader.flag()?,
            read_only: reader.flag()?,
            attributes: reader
                .string_pairs()?
                .into_iter()
                .collect::<BTreeMap<_, _>>(),
            clients: reader.string_list()?,
        };

        let value = match ty {
            ParameterType::String => ParameterValue::String(StringValue {
                value: reader.string()?,
                kind: reader.string()?,
                choices: reader.string_list()?,
            }),
            ParameterType::Number => ParameterValue::Number(NumberValue {
                value: reader.float()?,
                min: reader.float()?,
                max: reader.float()?,
                step: reader.float()?,
                index: reader.index()?,
                choices: reader.float_list()?,
                labels: reader.float_string_pairs()?,
            }),
        };

        Ok(Self::from_parts(name, metadata, value))
    }
}

/// Pulls field values in table order, checking each against its declared shape.
struct FieldReader<I> {
    fields: std::vec::IntoIter<Field>,
    specs: I,
}

impl<I: Iterator<Item = &'static FieldSpec>> FieldReader<I> {
    fn next(&mut self) -> Result<(&'static str, Field)> {
        let name = self.specs.next().map_or("<end>", |s| s.name);
        let value = self.fields.next().ok_or(Error::MissingToken { field: name })?;
        Ok((name, value))
    }

    fn string(&mut self) -> Result<String> {
        match self.next()? {
            (_, Field::Str(s)) => Ok(s),
            (field, _) => Err(Error::SchemaMismatch { field }),
        }
    }

    fn int(&mut self) -> Result<(&'static str, i64)> {
        match self.next()? {
            (field, Field::Int(i)) => Ok((field, i)),
            (field, _) => Err(Error::SchemaMismatch { field }),
        }
    }

    fn flag(&mut self) -> Result<bool> {
        Ok(self.int()?.1 != 0)
    }

    fn index(&mut self) -> Result<i32> {
        let (field, value) = self.int()?;
        i32::try_from(value).map_err(|_| Error::InvalidNumber {
            field,
            expected: "int",
            token: value.to_string(),
        })
    }

    fn float(&mut self) -> Result<f64> {
        match self.next()? {
            (_, Field::Float(f)) => Ok(f),
            (field, _) => Err(Error::SchemaMismatch { field }),
        }
    }

    fn list(&mut self) -> Result<(&'static str, Vec<Field>)> {
        match self.next()? {
            (field, Field::List(items)) => Ok((field, items)),
            (field, _) => Err(Error::SchemaMismatch { field }),
        }
    }

    fn dict(&mut self) -> Result<(&'static str, Vec<(Field, Field)>)> {
        match self.next()? {
            (field, Field::Dict(entries)) => Ok((field, entries)),
            (field, _) => Err(Error::SchemaMismatch { field }),
        }
    }

    fn string_list(&mut self) -> Result<Vec<String>> {
        let (field, items) = self.list()?;
        items
            .into_iter()
            .map(|item| match item {
                Field::Str(s) => Ok(s),
                _ => Err(Error::SchemaMismatch { field }),
            })
            .collect()
    }

    fn float_list(&mut self) -> Result<Vec<f64>> {
        let (field, items) = self.list()?;
        items
            .into_iter()
            .map(|item| match item {
                Field::Float(f) => Ok(f),
                _ => Err(Error::SchemaMismatch { field }),
            })
            .collect()
    }

    fn string_pairs(&mut self) -> Result<Vec<(String, String)>> {
        let (field, entries) = self.dict()?;
        entries
            .into_iter()
            .map(|entry| match entry {
                (Field::Str(k), Field::Str(v)) => Ok((k, v)),
                _ => Err(Error::SchemaMismatch { field }),
            })
            .collect()
    }

    fn float_string_pairs(&mut self) -> Result<Vec<(f64, String)>> {
        let (field, entries) = self.dict()?;
        entries
            .into_iter()
            .map(|entry| match entry {
                (Field::Float(k), Field::Str(v)) => Ok((k, v)),
                _ => Err(Error::SchemaMismatch { field }),
            })
            .collect()
    }
}
