use crate::{keep::alert::AlertDto, metrics::ui::record_modal_transition};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Note,
    Ticket,
    Workflow,
    Dismiss,
    View,
}

impl ModalKind {
    pub const ALL: [ModalKind; 5] = [
        ModalKind::Ticket,
        ModalKind::Note,
        ModalKind::Workflow,
        ModalKind::Dismiss,
        ModalKind::View,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModalKind::Note => "note",
            ModalKind::Ticket => "ticket",
            ModalKind::Workflow => "workflow",
            ModalKind::Dismiss => "dismiss",
            ModalKind::View => "view",
        }
    }
}

impl FromStr for ModalKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModalKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown dialog '{}'", s))
    }
}

impl std::fmt::Display for ModalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The alerts currently targeted by each dialog.
///
/// Every dialog kind has its own slot, so several dialogs may be open at once
/// and opening one never touches another.
#[derive(Debug, Clone, Default)]
pub struct ModalTargets {
    note: Option<AlertDto>,
    ticket: Option<AlertDto>,
    workflow: Option<AlertDto>,
    dismiss: Option<Vec<AlertDto>>,
    view: Option<AlertDto>,
}

impl ModalTargets {
    pub fn set_note(&mut self, alert: AlertDto) {
        record_modal_transition("note", "open");
        self.note = Some(alert);
    }

    pub fn set_ticket(&mut self, alert: AlertDto) {
        record_modal_transition("ticket", "open");
        self.ticket = Some(alert);
    }

    pub fn set_workflow(&mut self, alert: AlertDto) {
        record_modal_transition("workflow", "open");
        self.workflow = Some(alert);
    }

    pub fn set_dismiss(&mut self, alerts: Vec<AlertDto>) {
        record_modal_transition("dismiss", "open");
        self.dismiss = Some(alerts);
    }

    pub fn set_view(&mut self, alert: AlertDto) {
        record_modal_transition("view", "open");
        self.view = Some(alert);
    }

    /// Target the given alerts with a dialog. Single-alert dialogs take the first one.
    pub fn open(&mut self, kind: ModalKind, mut alerts: Vec<AlertDto>) {
        match kind {
            ModalKind::Dismiss => self.set_dismiss(alerts),
            _ if alerts.is_empty() => {}
            ModalKind::Note => self.set_note(alerts.swap_remove(0)),
            ModalKind::Ticket => self.set_ticket(alerts.swap_remove(0)),
            ModalKind::Workflow => self.set_workflow(alerts.swap_remove(0)),
            ModalKind::View => self.set_view(alerts.swap_remove(0)),
        }
    }

    /// Reset the target of a dialog. Returns whether the dialog was open.
    pub fn close(&mut self, kind: ModalKind) -> bool {
        let was_open = match kind {
            ModalKind::Note => self.note.take().is_some(),
            ModalKind::Ticket => self.ticket.take().is_some(),
            ModalKind::Workflow => self.workflow.take().is_some(),
            ModalKind::Dismiss => self.dismiss.take().is_some(),
            ModalKind::View => self.view.take().is_some(),
        };

        if was_open {
            record_modal_transition(kind.as_str(), "close");
        }

        was_open
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        match kind {
            ModalKind::Note => self.note.is_some(),
            ModalKind::Ticket => self.ticket.is_some(),
            ModalKind::Workflow => self.workflow.is_some(),
            ModalKind::Dismiss => self.dismiss.is_some(),
            ModalKind::View => self.view.is_some(),
        }
    }

    pub fn note(&self) -> Option<&AlertDto> {
        self.note.as_ref()
    }

    pub fn ticket(&self) -> Option<&AlertDto> {
        self.ticket.as_ref()
    }

    pub fn workflow(&self) -> Option<&AlertDto> {
        self.workflow.as_ref()
    }

    pub fn dismiss(&self) -> Option<&[AlertDto]> {
        self.dismiss.as_deref()
    }

    pub fn view(&self) -> Option<&AlertDto> {
        self.view.as_ref()
    }
}
