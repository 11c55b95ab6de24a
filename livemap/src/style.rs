//! Colors used by the markers and the configurable unit color table.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Unit fill ───────────────────────────────────────────────────

/// Fill of the session's own unit.
pub const SELF_FILL: &str = "yellow";
/// Fill of units without a recent live position.
pub const OFFLINE_FILL: &str = "gray";
/// Fill when no color table entry matches.
pub const DEFAULT_FILL: &str = "white";

// ── Unit outline ────────────────────────────────────────────────

pub const AVAILABLE_OUTLINE: &str = "chartreuse";
pub const BLUE_OUTLINE: &str = "blue";
pub const DEFAULT_OUTLINE: &str = "lightgray";

// ── Relationship lines ──────────────────────────────────────────

/// Line from a unit's last known point to its current position.
pub const FROM_LINE: &str = "gray";
/// Line to a unit's target while en route.
pub const EN_ROUTE_LINE: &str = "green";
/// Any line belonging to a blue incident or a unit assigned to one.
pub const BLUE_LINE: &str = "blue";
/// Line from a regular incident to its units.
pub const INCIDENT_LINE: &str = "gray";

// ── Incident icon ───────────────────────────────────────────────

pub const INCIDENT_FILL: &str = "grey";
pub const INCIDENT_FILL_BLUE: &str = "blue";
pub const INCIDENT_STROKE: &str = "darkorange";
pub const INCIDENT_STROKE_PRIORITY: &str = "red";

/// Ordered keyword to color table for unit fills.
///
/// Serialized as a JSON object; key order is significant because the first
/// keyword contained in a unit name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct UnitColors {
    entries: Vec<(String, String)>,
}

impl UnitColors {
    #[must_use]
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Color of the first keyword contained in `name`, ignoring case.
    #[must_use]
    pub fn color_for(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| name.contains(&keyword.to_lowercase()))
            .map(|(_, color)| color.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Map<String, Value>> for UnitColors {
    fn from(map: Map<String, Value>) -> Self {
        let entries = map
            .into_iter()
            .filter_map(|(keyword, color)| match color {
                Value::String(color) => Some((keyword, color)),
                _ => None,
            })
            .collect();
        Self { entries }
    }
}

impl From<UnitColors> for Map<String, Value> {
    fn from(colors: UnitColors) -> Self {
        colors
            .entries
            .into_iter()
            .map(|(keyword, color)| (keyword, Value::String(color)))
            .collect()
    }
}
