use crate::{keep::alert::AlertDto, view::Table, view::title};
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

const RECENT: usize = 5;

fn received_at(alert: &AlertDto) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(&alert.last_received).ok()
}

/// Status counts and the most recently received alerts of a preset
pub fn render(preset_name: &str, alerts: &[&AlertDto]) -> String {
    let mut out = title(&format!("History: {}", preset_name));

    if alerts.is_empty() {
        out.push_str("No alerts.\n");
        return out;
    }

    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for alert in alerts {
        *by_status.entry(alert.status.as_str()).or_default() += 1;
    }
    let counts: Vec<String> = by_status
        .iter()
        .map(|(status, count)| format!("{}: {}", status, count))
        .collect();
    out.push_str(&format!("{} alerts ({})\n", alerts.len(), counts.join(", ")));

    let mut recent = alerts.to_vec();
    // Unparseable timestamps sort last
    recent.sort_by(|a, b| received_at(b).cmp(&received_at(a)));

    let mut table = Table::new(["Last received", "Name", "Status"]);
    for alert in recent.into_iter().take(RECENT) {
        table.row(vec![
            alert.last_received.clone(),
            alert.name.clone(),
            alert.status.clone(),
        ]);
    }
    out.push_str(&table.render());

    out
}
