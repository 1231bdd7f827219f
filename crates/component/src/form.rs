//! Host-facing form model: field descriptors, the form map, and the update
//! records a refresh produces.

use {
    indexmap::IndexMap,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::error::{Error, Result};

/// Widget kind the host renders for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Message,
    Multiline,
    Int,
    Dropdown,
    Secret,
    Slider,
    Text,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// One input field as the host form engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Free-text entry allowed in addition to `options`.
    #[serde(default)]
    pub combobox: bool,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub required: bool,
    /// Host re-runs the refresh as soon as the value changes.
    #[serde(default)]
    pub real_time_refresh: bool,
    /// Host shows a manual refresh button next to the field.
    #[serde(default)]
    pub refresh_button: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_spec: Option<RangeSpec>,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        field_type: FieldType,
        value: Value,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            field_type,
            info: None,
            value,
            options: Vec::new(),
            combobox: false,
            advanced: false,
            required: false,
            real_time_refresh: false,
            refresh_button: false,
            range_spec: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.range_spec = Some(RangeSpec { min, max, step });
        self
    }

    pub fn combobox(mut self) -> Self {
        self.combobox = true;
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn real_time_refresh(mut self) -> Self {
        self.real_time_refresh = true;
        self
    }

    pub fn refresh_button(mut self) -> Self {
        self.refresh_button = true;
        self
    }
}

/// Explicit rewrite of one field, applied by the form owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combobox: Option<bool>,
}

impl FieldUpdate {
    /// Replace the field's value only.
    pub fn value(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            options: None,
            value: Some(value),
            combobox: None,
        }
    }

    /// Replace the option list, select its first entry and allow free text.
    /// Returns `None` for an empty list.
    pub fn select_first(field: impl Into<String>, options: Vec<String>) -> Option<Self> {
        let first = options.first()?.clone();
        Some(Self {
            field: field.into(),
            options: Some(options),
            value: Some(Value::String(first)),
            combobox: Some(true),
        })
    }
}

/// Field name to descriptor, in insertion order. Serializes as the JSON
/// object the host consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormConfiguration {
    fields: IndexMap<String, FieldDescriptor>,
}

impl FormConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FieldDescriptor) {
        self.fields.insert(field.name.clone(), field);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(|field| &field.value)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Store a new value for an existing field.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        field.value = value;
        Ok(())
    }

    /// Apply update records. Either every update lands or none does.
    pub fn apply(&mut self, updates: &[FieldUpdate]) -> Result<()> {
        if let Some(missing) = updates.iter().find(|u| !self.fields.contains_key(&u.field)) {
            return Err(Error::UnknownField(missing.field.clone()));
        }
        for update in updates {
            let Some(field) = self.fields.get_mut(&update.field) else {
                continue;
            };
            if let Some(options) = &update.options {
                field.options.clone_from(options);
            }
            if let Some(value) = &update.value {
                field.value = value.clone();
            }
            if let Some(combobox) = update.combobox {
                field.combobox = combobox;
            }
        }
        Ok(())
    }

    /// Copy with secret field values masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut form = self.clone();
        for field in form.fields.values_mut() {
            if field.field_type == FieldType::Secret && is_truthy(&field.value) {
                field.value = Value::String("[REDACTED]".into());
            }
        }
        form
    }
}

impl FromIterator<FieldDescriptor> for FormConfiguration {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        let mut form = Self::new();
        for field in iter {
            form.insert(field);
        }
        form
    }
}

/// Host-side truthiness: null, false, zero, and empty strings, arrays and
/// objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Absent or whitespace-only.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
