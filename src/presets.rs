use crate::keep::{alert::AlertDto, preset::Preset};

pub const FEED: &str = "feed";
pub const DISMISSED: &str = "dismissed";
pub const GROUPS: &str = "groups";

/// Built-in presets, in display order
pub fn default_presets() -> Vec<Preset> {
    [FEED, DISMISSED, GROUPS]
        .into_iter()
        .map(Preset::builtin)
        .collect()
}

/// Built-in presets followed by the saved presets in fetch order
pub fn combine(saved: &[Preset]) -> Vec<Preset> {
    let mut presets = default_presets();
    presets.extend(saved.iter().cloned());
    presets
}

/// Find the preset named by a URL path segment, ignoring case
pub fn resolve<'a>(preset_name: &str, presets: &'a [Preset]) -> Option<&'a Preset> {
    let wanted = percent_decode(preset_name).to_lowercase();

    presets
        .iter()
        .find(|preset| preset.name.to_lowercase() == wanted)
}

/// Decode `%XX` escapes of a path segment. Invalid or truncated escapes are kept verbatim.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let value = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());

            if let Some(value) = value {
                out.push(value);
                i += 3;
                continue;
            }
        }

        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Whether an alert belongs on the tab of the given preset
pub fn matches(preset: &Preset, alert: &AlertDto) -> bool {
    match preset.name.as_str() {
        FEED => !alert.dismissed && !alert.is_deleted(),
        DISMISSED => alert.dismissed,
        GROUPS => alert.group,
        _ => preset
            .options
            .iter()
            .filter(|option| !option.is_cel())
            .all(|option| {
                let wanted = option.value_text().to_lowercase();
                alert
                    .field(&option.label)
                    .map(|value| value.to_lowercase().contains(&wanted))
                    .unwrap_or(false)
            }),
    }
}

/// Alerts shown on the tab of the given preset
pub fn filter<'a>(preset: &Preset, alerts: &'a [AlertDto]) -> Vec<&'a AlertDto> {
    alerts.iter().filter(|alert| matches(preset, alert)).collect()
}
