//! ONELAB parameter model
//!
//! A [`Parameter`] is a named value plus the metadata the host uses to
//! render it. Every parameter carries the same common fields; the
//! [`ParameterValue`] variant adds the string or number specific ones.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default `kind` for string parameters.
pub const DEFAULT_STRING_KIND: &str = "generic";

/// Wire type tag of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ParameterType {
    /// `"string"`
    String,
    /// `"number"`
    Number,
}

impl ParameterType {
    /// Tag written after the version on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation metadata shared by both parameter types.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metadata {
    /// Display label
    pub label: String,
    /// Help text
    pub help: String,
    /// Value was never changed by the user
    pub never_changed: bool,
    /// Value changed since the host last ran a client
    pub changed: bool,
    /// Shown in the host UI
    pub visible: bool,
    /// Not editable in the host UI
    pub read_only: bool,
    /// Free-form attributes
    pub attributes: BTreeMap<String, String>,
    /// Clients that use this parameter
    pub clients: Vec<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            label: String::new(),
            help: String::new(),
            never_changed: false,
            changed: true,
            visible: true,
            read_only: false,
            attributes: BTreeMap::new(),
            clients: Vec::new(),
        }
    }
}

/// String specific fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StringValue {
    /// Current value
    pub value: String,
    /// Semantic kind (`"generic"`, `"file"`, ...)
    pub kind: String,
    /// Allowed values
    pub choices: Vec<String>,
}

/// Number specific fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumberValue {
    /// Current value
    pub value: f64,
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Increment used by the host's sliders and loops
    pub step: f64,
    /// Loop index, `-1` when unset
    pub index: i32,
    /// Allowed values
    pub choices: Vec<f64>,
    /// Text shown for particular values, in wire order
    pub labels: Vec<(f64, String)>,
}

/// Type specific part of a parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterValue {
    /// String parameter
    String(StringValue),
    /// Number parameter
    Number(NumberValue),
}

impl ParameterValue {
    /// Wire type tag
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        match self {
            Self::String(_) => ParameterType::String,
            Self::Number(_) => ParameterType::Number,
        }
    }
}

/// A named, typed ONELAB parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameter {
    name: String,
    /// Common metadata
    pub metadata: Metadata,
    value: ParameterValue,
}

impl Parameter {
    /// Create a string parameter with default metadata.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::default(),
            value: ParameterValue::String(StringValue {
                value: value.into(),
                kind: DEFAULT_STRING_KIND.to_owned(),
                choices: Vec::new(),
            }),
        }
    }

    /// Create a number parameter with default metadata and unbounded range.
    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::default(),
            value: ParameterValue::Number(NumberValue {
                value,
                min: -f64::MAX,
                max: f64::MAX,
                step: 0.0,
                index: -1,
                choices: Vec::new(),
                labels: Vec::new(),
            }),
        }
    }

    /// Assemble a parameter from already-built parts.
    pub fn from_parts(name: impl Into<String>, metadata: Metadata, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            metadata,
            value,
        }
    }

    /// Parameter name, the key the host stores it under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire type tag
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        self.value.parameter_type()
    }

    /// Type specific fields
    #[must_use]
    pub const fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// String fields, if this is a string parameter
    #[must_use]
    pub fn as_string(&self) -> Option<&StringValue> {
        match &self.value {
            ParameterValue::String(s) => Some(s),
            ParameterValue::Number(_) => None,
        }
    }

    /// Mutable string fields, if this is a string parameter
    pub fn as_string_mut(&mut self) -> Option<&mut StringValue> {
        match &mut self.value {
            ParameterValue::String(s) => Some(s),
            ParameterValue::Number(_) => None,
        }
    }

    /// Number fields, if this is a number parameter
    #[must_use]
    pub fn as_number(&self) -> Option<&NumberValue> {
        match &self.value {
            ParameterValue::Number(n) => Some(n),
            ParameterValue::String(_) => None,
        }
    }

    /// Mutable number fields, if this is a number parameter
    pub fn as_number_mut(&mut self) -> Option<&mut NumberValue> {
        match &mut self.value {
            ParameterValue::Number(n) => Some(n),
            ParameterValue::String(_) => None,
        }
    }

    /// Set the label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.metadata.label = label.into();
        self
    }

    /// Set the help text
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.metadata.help = help.into();
        self
    }

    /// Set visibility
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.metadata.visible = visible;
        self
    }

    /// Set the read-only flag
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.metadata.read_only = read_only;
        self
    }

    /// Add or replace an attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.attributes.insert(key.into(), value.into());
        self
    }

    /// Record `client` as a user of this parameter, once.
    pub fn add_client(&mut self, client: &str) {
        if !self.metadata.clients.iter().any(|c| c == client) {
            self.metadata.clients.push(client.to_owned());
        }
    }

    /// Replace every field with `other`'s. The type tag must agree.
    pub(crate) fn overwrite(&mut self, other: Self) {
        debug_assert_eq!(self.parameter_type(), other.parameter_type());
        *self = other;
    }
}

impl NumberValue {
    /// Label for `value`, if one is declared.
    #[must_use]
    pub fn label_for(&self, value: f64) -> Option<&str> {
        self.labels
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, label)| label.as_str())
    }

    /// Add a label, replacing any existing label for the same value.
    pub fn set_label(&mut self, value: f64, label: impl Into<String>) {
        let label = label.into();
        match self.labels.iter_mut().find(|(v, _)| *v == value) {
            Some(entry) => entry.1 = label,
            None => self.labels.push((value, label)),
        }
    }
}
