use crate::{
    fetch::Resource,
    keep::KeepClient,
    view::{LOADING, title},
};

pub const TAB: &str = "api-key";

/// Read-only display of the tenant API key
pub struct ApiKeyScreen {
    client: KeepClient,
    selected_tab: String,
    api_key: Resource<String>,
}

impl ApiKeyScreen {
    pub fn new(client: KeepClient, selected_tab: impl Into<String>) -> Self {
        Self {
            client,
            selected_tab: selected_tab.into(),
            api_key: Resource::new("apikey"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.selected_tab == TAB
    }

    /// Fetch the key, only while the tab is selected
    pub async fn load(&self) {
        if self.is_active() {
            self.api_key.load(self.client.get_api_key()).await;
        }
    }

    pub fn render(&self) -> String {
        let snapshot = self.api_key.snapshot();

        if snapshot.is_loading {
            return format!("{}\n", LOADING);
        }
        if let Some(error) = snapshot.error {
            return format!("{}\n", error);
        }

        let mut out = title("API Key");
        out.push_str(&snapshot.data.unwrap_or_default());
        out.push('\n');
        out
    }
}
