//! Feather (content type) descriptor types.

use serde::{Deserialize, Serialize};

use super::plugin::{Descriptor, PluginDescriptor};

/// Input widget kinds an external form builder knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Multi-line text area.
    TextBlock,
    /// URL input.
    Url,
    /// File upload.
    File,
    /// Drop-down of fixed options.
    Select,
    /// Boolean checkbox.
    Checkbox,
}

/// One input field in a feather's form manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Attribute name the value is submitted under.
    pub name: String,
    /// Widget kind.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Label shown next to the widget.
    pub label: String,
    /// Whether a non-empty value is required.
    #[serde(default)]
    pub required: bool,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Whether several values may be submitted (e.g. multiple files).
    #[serde(default)]
    pub multiple: bool,
    /// Options for `select` fields.
    #[serde(default)]
    pub options: Vec<String>,
}

impl FieldSpec {
    /// Create an optional field.
    pub fn new(name: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: label.into(),
            required: false,
            placeholder: None,
            multiple: false,
            options: Vec::new(),
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Allow multiple values.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Set select options.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// A plugin describing one content type: its form fields and renderer slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatherDescriptor {
    /// Common plugin metadata.
    #[serde(flatten)]
    pub plugin: PluginDescriptor,
    /// Ordered form manifest.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl FeatherDescriptor {
    /// Create a feather descriptor with no fields.
    pub fn new(plugin: PluginDescriptor) -> Self {
        Self {
            plugin,
            fields: Vec::new(),
        }
    }

    /// Append a field to the manifest.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Names of the fields that must be present and non-empty.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }
}

impl Descriptor for FeatherDescriptor {
    fn plugin(&self) -> &PluginDescriptor {
        &self.plugin
    }

    fn plugin_mut(&mut self) -> &mut PluginDescriptor {
        &mut self.plugin
    }
}
