use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Provider {
    pub id: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Provider {
    pub fn is_ticketing(&self) -> bool {
        self.tags.iter().any(|tag| tag == "ticketing")
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProvidersResponse {
    #[serde(default)]
    pub installed_providers: Vec<Provider>,
}
