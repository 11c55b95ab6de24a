//! Text helpers for popups, tooltips and status messages.

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use std::collections::HashMap;

/// Format optional free text for a popup or tooltip: trimmed, empty when absent.
#[must_use]
pub fn for_popup(text: Option<&str>) -> String {
    text.map(str::trim).unwrap_or_default().to_owned()
}

/// Replace `{{key}}` placeholders with values from `data`.
///
/// Unknown keys are replaced by the empty string. Unterminated or empty
/// placeholders are copied through unchanged.
#[must_use]
pub fn template_replace(template: &str, data: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) if end > 0 && !after[..end].contains(['{', '}']) => {
                if let Some(value) = data.get(&after[..end]) {
                    out.push_str(value);
                }
                rest = &after[end + 2..];
            }
            _ => {
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
