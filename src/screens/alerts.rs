use crate::{
    dialogs::{self, DialogAction},
    feed::AlertSnapshot,
    fetch::Resource,
    keep::{KeepClient, alert::AlertDto, preset::Preset, provider::Provider, workflow::Workflow},
    metrics::ui::record_preset_miss,
    modal::{ModalKind, ModalTargets},
    presets,
    screens::history,
    view::{LOADING, Table, or_dash},
};
use tokio::sync::watch;

/// The alerts screen of one preset: tab panel, history and dialogs
pub struct AlertsScreen {
    client: KeepClient,
    preset_name: String,
    alerts: watch::Receiver<AlertSnapshot>,
    presets: Resource<Vec<Preset>>,
    providers: Resource<Vec<Provider>>,
    workflows: Resource<Vec<Workflow>>,
    modals: ModalTargets,
}

impl AlertsScreen {
    pub fn new(
        client: KeepClient,
        preset_name: impl Into<String>,
        alerts: watch::Receiver<AlertSnapshot>,
    ) -> Self {
        Self {
            client,
            preset_name: preset_name.into(),
            alerts,
            presets: Resource::new("presets"),
            providers: Resource::new("providers"),
            workflows: Resource::new("workflows"),
            modals: ModalTargets::default(),
        }
    }

    /// Fetch saved presets and installed providers, plus workflows while that dialog is open
    #[tracing::instrument(skip(self), fields(preset = %self.preset_name))]
    pub async fn refresh(&self) {
        let load_workflows = async {
            if self.modals.is_open(ModalKind::Workflow) {
                self.workflows.load(self.client.get_workflows()).await;
            }
        };

        tokio::join!(
            self.presets.load(self.client.get_presets()),
            self.providers.load(self.client.get_installed_providers()),
            load_workflows,
        );
    }

    /// All presets, built-ins first. A failed fetch of saved presets leaves only the built-ins.
    pub fn presets(&self) -> Vec<Preset> {
        presets::combine(&self.presets.data().unwrap_or_default())
    }

    pub fn selected_preset(&self) -> Option<Preset> {
        presets::resolve(&self.preset_name, &self.presets()).cloned()
    }

    /// Installed providers that can create tickets
    pub fn ticketing_providers(&self) -> Vec<Provider> {
        self.providers
            .data()
            .unwrap_or_default()
            .into_iter()
            .filter(Provider::is_ticketing)
            .collect()
    }

    pub fn modals(&self) -> &ModalTargets {
        &self.modals
    }

    fn find_alerts(&self, fingerprints: &[String]) -> Vec<AlertDto> {
        let snapshot = self.alerts.borrow();
        let alerts = snapshot.alerts.as_deref().unwrap_or_default();

        fingerprints
            .iter()
            .filter_map(|fingerprint| {
                alerts
                    .iter()
                    .find(|alert| alert.fingerprint() == fingerprint)
                    .cloned()
            })
            .collect()
    }

    /// Open a dialog for the alerts with the given fingerprints
    pub async fn open(&mut self, kind: ModalKind, fingerprints: &[String]) -> anyhow::Result<()> {
        let alerts = self.find_alerts(fingerprints);

        if alerts.is_empty() {
            anyhow::bail!("No alert matches {:?}", fingerprints);
        }

        self.modals.open(kind, alerts);

        if kind == ModalKind::Workflow {
            self.workflows.load(self.client.get_workflows()).await;
        }

        Ok(())
    }

    /// Close a dialog. Returns whether it was open.
    pub fn close(&mut self, kind: ModalKind) -> bool {
        self.modals.close(kind)
    }

    /// Submit a dialog
    pub async fn confirm(&mut self, action: DialogAction) -> anyhow::Result<()> {
        let ticketing_providers = self.ticketing_providers();

        dialogs::confirm(
            &self.client,
            &mut self.modals,
            &ticketing_providers,
            action,
        )
        .await
    }

    /// Render the screen. Nothing is rendered when the preset does not exist.
    pub fn render(&self) -> Option<String> {
        let Some(selected) = self.selected_preset() else {
            tracing::debug!("No preset named '{}'", self.preset_name);
            record_preset_miss();
            return None;
        };

        let mut out = self.render_tabs(&selected);
        let snapshot = self.alerts.borrow().clone();

        match &snapshot.alerts {
            None if snapshot.error.is_some() => {
                out.push_str(&format!(
                    "Failed to load alerts: {}\n",
                    snapshot.error.as_deref().unwrap_or_default()
                ));
            }
            None => out.push_str(&format!("{}\n", LOADING)),
            Some(alerts) => {
                let shown = presets::filter(&selected, alerts);

                if snapshot.is_async_loading {
                    out.push_str("Refreshing...\n");
                }
                // The last good alerts stay visible when a later refresh fails
                if let Some(error) = &snapshot.error {
                    out.push_str(&format!("Failed to refresh alerts: {}\n", error));
                }
                out.push_str(&render_table(&shown));
                out.push('\n');
                out.push_str(&history::render(&selected.name, &shown));
            }
        }

        let ticketing_providers = self.ticketing_providers();
        let workflows = self.workflows.data();

        for kind in ModalKind::ALL {
            if let Some(dialog) = dialogs::render(
                kind,
                &self.modals,
                &ticketing_providers,
                workflows.as_deref(),
            ) {
                out.push('\n');
                out.push_str(&dialog);
            }
        }

        Some(out)
    }

    fn render_tabs(&self, selected: &Preset) -> String {
        let tabs: Vec<String> = self
            .presets()
            .iter()
            .map(|preset| {
                if preset.name == selected.name {
                    format!("[{}]", preset.name)
                } else {
                    preset.name.clone()
                }
            })
            .collect();

        let mut out = format!("{}\n", tabs.join(" | "));

        let cel = selected.cel_query();
        if !cel.is_empty() {
            out.push_str(&format!("CEL: {}\n", cel));
        }
        out.push('\n');

        out
    }
}

fn render_table(alerts: &[&AlertDto]) -> String {
    if alerts.is_empty() {
        return "No alerts to display.\n".to_string();
    }

    let mut table = Table::new([
        "Severity",
        "Name",
        "Status",
        "Source",
        "Last received",
        "Fingerprint",
        "Note",
        "Ticket",
    ]);

    for alert in alerts {
        table.row(vec![
            or_dash(alert.severity.as_deref()),
            alert.name.clone(),
            alert.status.clone(),
            or_dash(Some(alert.source.join(",").as_str())),
            alert.last_received.clone(),
            alert.fingerprint().to_string(),
            or_dash(alert.note.as_deref()),
            or_dash(alert.ticket_url.as_deref()),
        ]);
    }

    table.render()
}
