use crate::keep::null_as_default;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<PresetOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_noisy: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alerts_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub should_do_noise_now: bool,
}

/// A single filter term of a preset
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PresetOption {
    pub label: String,
    pub value: Value,
}

impl PresetOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Value::String(value.into()),
        }
    }

    pub fn is_cel(&self) -> bool {
        self.label.eq_ignore_ascii_case("cel")
    }

    /// The option value as text; structured (sql) values render as JSON
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl Preset {
    /// A preset with no filter terms
    pub fn builtin(name: &str) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
            options: Vec::new(),
            created_by: None,
            is_private: false,
            is_noisy: false,
            alerts_count: 0,
            should_do_noise_now: false,
        }
    }

    /// The CEL expression of this preset. Empty unless exactly one `cel` option exists.
    pub fn cel_query(&self) -> String {
        let mut cel = self.options.iter().filter(|option| option.is_cel());

        match (cel.next(), cel.next()) {
            (Some(option), None) => option.value_text(),
            _ => String::new(),
        }
    }
}
