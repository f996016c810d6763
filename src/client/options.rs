//! Optional fields for `get_string`/`get_number`.

use crate::protocol::{
    DEFAULT_STRING_KIND, Metadata, NumberValue, Parameter, ParameterValue, StringValue,
};

/// Optional fields of a string parameter query.
#[derive(Debug, Clone, PartialEq)]
pub struct StringOptions {
    /// Common metadata
    pub metadata: Metadata,
    /// Semantic kind
    pub kind: String,
    /// Allowed values
    pub choices: Vec<String>,
}

impl Default for StringOptions {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            kind: DEFAULT_STRING_KIND.to_owned(),
            choices: Vec::new(),
        }
    }
}

impl StringOptions {
    /// Set the label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.metadata.label = label.into();
        self
    }

    /// Set the help text
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.metadata.help = help.into();
        self
    }

    /// Set the kind
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the allowed values
    #[must_use]
    pub fn choices<I, T>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Set visibility
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.metadata.visible = visible;
        self
    }

    /// Set the read-only flag
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.metadata.read_only = read_only;
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.attributes.insert(key.into(), value.into());
        self
    }

    pub(crate) fn into_parameter(self, name: &str, value: &str) -> Parameter {
        Parameter::from_parts(
            name,
            self.metadata,
            ParameterValue::String(StringValue {
                value: value.to_owned(),
                kind: self.kind,
                choices: self.choices,
            }),
        )
    }
}

/// Optional fields of a number parameter query.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberOptions {
    /// Common metadata
    pub metadata: Metadata,
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Step
    pub step: f64,
    /// Loop index, `-1` when unset
    pub index: i32,
    /// Allowed values; when `None`, the keys of `labels` are used
    pub choices: Option<Vec<f64>>,
    /// Value labels
    pub labels: Vec<(f64, String)>,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            min: -f64::MAX,
            max: f64::MAX,
            step: 0.0,
            index: -1,
            choices: None,
            labels: Vec::new(),
        }
    }
}

impl NumberOptions {
    /// Set the label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.metadata.label = label.into();
        self
    }

    /// Set the help text
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.metadata.help = help.into();
        self
    }

    /// Set both bounds
    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the step
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the loop index
    #[must_use]
    pub fn index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    /// Set the allowed values explicitly
    #[must_use]
    pub fn choices(mut self, choices: impl IntoIterator<Item = f64>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }

    /// Label a value, replacing an earlier label for it
    #[must_use]
    pub fn value_label(mut self, value: f64, label: impl Into<String>) -> Self {
        let label = label.into();
        match self.labels.iter_mut().find(|(v, _)| *v == value) {
            Some(entry) => entry.1 = label,
            None => self.labels.push((value, label)),
        }
        self
    }

    /// Set visibility
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.metadata.visible = visible;
        self
    }

    /// Set the read-only flag
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.metadata.read_only = read_only;
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.attributes.insert(key.into(), value.into());
        self
    }

    pub(crate) fn into_parameter(self, name: &str, value: f64) -> Parameter {
        let choices = self
            .choices
            .unwrap_or_else(|| self.labels.iter().map(|(v, _)| *v).collect());

        Parameter::from_parts(
            name,
            self.metadata,
            ParameterValue::Number(NumberValue {
                value,
                min: self.min,
                max: self.max,
                step: self.step,
                index: self.index,
                choices,
                labels: self.labels,
            }),
        )
    }
}
