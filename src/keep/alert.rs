use crate::keep::null_as_default;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlertDto {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "lastReceived")]
    pub last_received: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(
        rename = "fatigueMeter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fatigue_meter: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pushed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    #[serde(default, deserialize_with = "deleted_list")]
    pub deleted: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dismissed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_environment() -> String {
    "undefined".to_string()
}

/// Older backends send `deleted` as a boolean; those are treated as "not deleted".
fn deleted_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Deleted {
        List(Vec<String>),
        Legacy(bool),
        Missing(Option<()>),
    }

    Ok(match Deleted::deserialize(deserializer)? {
        Deleted::List(list) => list,
        Deleted::Legacy(_) | Deleted::Missing(_) => Vec::new(),
    })
}

impl AlertDto {
    /// De-duplication key, which falls back to the alert name
    pub fn fingerprint(&self) -> &str {
        self.fingerprint.as_deref().unwrap_or(&self.name)
    }

    pub fn is_deleted(&self) -> bool {
        !self.deleted.is_empty()
    }

    /// Look up a field by name for preset filtering: top-level fields first, then labels
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "status" => Some(self.status.clone()),
            "environment" => Some(self.environment.clone()),
            "service" => self.service.clone(),
            "source" => Some(self.source.join(",")),
            "message" => self.message.clone(),
            "description" => self.description.clone(),
            "severity" => self.severity.clone(),
            "fingerprint" => Some(self.fingerprint().to_string()),
            "note" => self.note.clone(),
            "ticket_url" => self.ticket_url.clone(),
            _ => None,
        };

        value.or_else(|| {
            self.labels
                .get(name)
                .or_else(|| self.extra.get(name))
                .map(value_to_string)
        })
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
