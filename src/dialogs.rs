//! Alert dialogs: rendering over a modal target and the mutation each one confirms.

use crate::{
    keep::{KeepClient, alert::AlertDto, provider::Provider, workflow::Workflow},
    metrics::ui::record_modal_transition,
    modal::{ModalKind, ModalTargets},
    view::{Table, or_dash, title},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// What the user submitted from a dialog
#[derive(Debug, Clone, PartialEq)]
pub enum DialogAction {
    Note {
        note: String,
    },
    Ticket {
        provider_id: String,
        ticket_url: String,
    },
    Workflow {
        workflow_id: String,
    },
    Dismiss {
        note: String,
        dismiss_until: Option<DateTime<Utc>>,
    },
}

impl DialogAction {
    pub fn kind(&self) -> ModalKind {
        match self {
            DialogAction::Note { .. } => ModalKind::Note,
            DialogAction::Ticket { .. } => ModalKind::Ticket,
            DialogAction::Workflow { .. } => ModalKind::Workflow,
            DialogAction::Dismiss { .. } => ModalKind::Dismiss,
        }
    }

    /// Parse the JSON body submitted for a dialog of the given kind
    pub fn from_json(kind: ModalKind, body: serde_json::Value) -> anyhow::Result<Self> {
        #[derive(Deserialize)]
        struct NoteBody {
            note: String,
        }

        #[derive(Deserialize)]
        struct TicketBody {
            provider_id: String,
            ticket_url: String,
        }

        #[derive(Deserialize)]
        struct WorkflowBody {
            workflow_id: String,
        }

        #[derive(Deserialize)]
        struct DismissBody {
            #[serde(default)]
            note: String,
            #[serde(default, rename = "dismissUntil")]
            dismiss_until: Option<DateTime<Utc>>,
        }

        Ok(match kind {
            ModalKind::Note => {
                let body: NoteBody = serde_json::from_value(body)?;
                DialogAction::Note { note: body.note }
            }
            ModalKind::Ticket => {
                let body: TicketBody = serde_json::from_value(body)?;
                DialogAction::Ticket {
                    provider_id: body.provider_id,
                    ticket_url: body.ticket_url,
                }
            }
            ModalKind::Workflow => {
                let body: WorkflowBody = serde_json::from_value(body)?;
                DialogAction::Workflow {
                    workflow_id: body.workflow_id,
                }
            }
            ModalKind::Dismiss => {
                let body: DismissBody = serde_json::from_value(body)?;
                DialogAction::Dismiss {
                    note: body.note,
                    dismiss_until: body.dismiss_until,
                }
            }
            ModalKind::View => anyhow::bail!("The view dialog has no action"),
        })
    }
}

/// Issue the mutation for a dialog, then close it. On failure the dialog stays open.
pub async fn confirm(
    client: &KeepClient,
    targets: &mut ModalTargets,
    ticketing_providers: &[Provider],
    action: DialogAction,
) -> anyhow::Result<()> {
    let kind = action.kind();

    match action {
        DialogAction::Note { note } => {
            let alert = targets.note().ok_or_else(|| not_open(kind))?;
            let enrichments = BTreeMap::from([("note".to_string(), note)]);

            client.enrich_alert(alert.fingerprint(), enrichments).await?;
        }
        DialogAction::Ticket {
            provider_id,
            ticket_url,
        } => {
            let alert = targets.ticket().ok_or_else(|| not_open(kind))?;

            if !ticketing_providers.iter().any(|p| p.id == provider_id) {
                anyhow::bail!("'{}' is not an installed ticketing provider", provider_id);
            }

            let enrichments = BTreeMap::from([
                ("ticket_url".to_string(), ticket_url),
                ("ticket_provider_id".to_string(), provider_id),
            ]);

            client.enrich_alert(alert.fingerprint(), enrichments).await?;
        }
        DialogAction::Workflow { workflow_id } => {
            let alert = targets.workflow().ok_or_else(|| not_open(kind))?;

            client.run_workflow(&workflow_id, alert).await?;
        }
        DialogAction::Dismiss {
            note,
            dismiss_until,
        } => {
            let alerts = targets.dismiss().ok_or_else(|| not_open(kind))?;
            let fingerprints: Vec<String> = alerts
                .iter()
                .map(|alert| alert.fingerprint().to_string())
                .collect();

            let mut enrichments = BTreeMap::from([
                ("dismissed".to_string(), "true".to_string()),
                ("note".to_string(), note),
            ]);
            if let Some(until) = dismiss_until {
                enrichments.insert("dismissUntil".to_string(), until.to_rfc3339());
            }

            client
                .batch_enrich_alerts(&fingerprints, enrichments)
                .await?;
        }
    }

    record_modal_transition(kind.as_str(), "confirm");
    targets.close(kind);

    Ok(())
}

fn not_open(kind: ModalKind) -> anyhow::Error {
    anyhow::anyhow!("The {} dialog is not open", kind)
}

/// Render a dialog, or nothing when it has no target
pub fn render(
    kind: ModalKind,
    targets: &ModalTargets,
    ticketing_providers: &[Provider],
    workflows: Option<&[Workflow]>,
) -> Option<String> {
    match kind {
        ModalKind::Note => targets.note().map(render_note),
        ModalKind::Ticket => targets
            .ticket()
            .map(|alert| render_ticket(alert, ticketing_providers)),
        ModalKind::Workflow => targets
            .workflow()
            .map(|alert| render_workflow(alert, workflows)),
        ModalKind::Dismiss => targets.dismiss().map(render_dismiss),
        ModalKind::View => targets.view().map(render_view),
    }
}

fn render_note(alert: &AlertDto) -> String {
    let mut out = title(&format!("Add note: {}", alert.name));
    out.push_str(&format!("Current note: {}\n", or_dash(alert.note.as_deref())));
    out
}

fn render_ticket(alert: &AlertDto, ticketing_providers: &[Provider]) -> String {
    let mut out = title(&format!("Assign ticket: {}", alert.name));

    if ticketing_providers.is_empty() {
        out.push_str("No ticketing providers are installed. Connect one from the providers page.\n");
        return out;
    }

    if let Some(url) = &alert.ticket_url {
        out.push_str(&format!("Current ticket: {}\n", url));
    }

    let mut table = Table::new(["Provider", "Type", "Id"]);
    for provider in ticketing_providers {
        table.row(vec![
            provider.display_name.clone(),
            provider.provider_type.clone(),
            provider.id.clone(),
        ]);
    }
    out.push_str(&table.render());
    out
}

fn render_workflow(alert: &AlertDto, workflows: Option<&[Workflow]>) -> String {
    let mut out = title(&format!("Run workflow: {}", alert.name));

    match workflows {
        None => out.push_str(&format!("{}\n", crate::view::LOADING)),
        Some([]) => out.push_str("No workflows available.\n"),
        Some(workflows) => {
            let mut table = Table::new(["Workflow", "Id", "Description"]);
            for workflow in workflows {
                table.row(vec![
                    workflow.name.clone(),
                    workflow.id.clone(),
                    or_dash(workflow.description.as_deref()),
                ]);
            }
            out.push_str(&table.render());
        }
    }

    out
}

fn render_dismiss(alerts: &[AlertDto]) -> String {
    let mut out = title(&format!("Dismiss {} alert(s)", alerts.len()));
    for alert in alerts {
        out.push_str(&format!("- {} ({})\n", alert.name, alert.fingerprint()));
    }
    out
}

fn render_view(alert: &AlertDto) -> String {
    let mut out = title(&format!("Alert: {}", alert.name));
    match serde_json::to_string_pretty(alert) {
        Ok(json) => out.push_str(&json),
        Err(e) => out.push_str(&format!("Failed to render alert: {}", e)),
    }
    out.push('\n');
    out
}
