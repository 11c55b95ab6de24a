//! Entity model: units and incidents as received from the API, and their
//! extended forms enriched with derived display state.
//!
//! The wire shape is dictated by the backend (`camelCase` JSON). Optional
//! fields default to absent so that partial records still deserialize; only
//! the two top-level arrays of a [`Scope`] are mandatory.
//!
//! ERROR HANDLING
//! ==============
//! Damage is contained to the smallest enclosing value. A flag or map sent as
//! `null` reads as its default, a malformed nested point or position reads as
//! absent, and an entity that still fails to parse (no id, wrong type) is
//! dropped from its array with a warning. The rest of the snapshot survives.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::geo::LatLng;

/// Stable opaque identifier of a unit or incident, unique within its kind.
pub type EntityId = String;

/// An entity that may be placed on the map.
pub trait LocatedEntity {
    fn id(&self) -> &str;

    /// Resolved coordinate for this pass. `None` means "do not place".
    fn latlng(&self) -> Option<LatLng>;
}

// =============================================================================
// POSITIONS
// =============================================================================

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

/// A live position report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// RFC 3339 timestamp of the fix.
    pub timestamp: String,
    /// Accuracy radius in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl Position {
    #[must_use]
    pub fn point(&self) -> Point {
        Point { latitude: self.latitude, longitude: self.longitude }
    }
}

// =============================================================================
// UNITS
// =============================================================================

/// A mobile unit as delivered by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Last known point, also the origin of the current movement.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_point: Option<Point>,
    /// Destination of the current movement.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub target_point: Option<Point>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_position: Option<Position>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_available_for_dispatching: bool,
}

/// A unit with display state derived during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedUnit {
    #[serde(flatten)]
    pub unit: Unit,
    /// Live position if present, otherwise the last known point.
    pub latlng: Option<LatLng>,
    pub latlng_last: Option<LatLng>,
    pub latlng_next: Option<LatLng>,
    pub online: bool,
    pub is_self: bool,
    pub has_blue: bool,
    pub color_fill: String,
    pub color_outline: String,
}

impl LocatedEntity for ExtendedUnit {
    fn id(&self) -> &str {
        &self.unit.id
    }

    fn latlng(&self) -> Option<LatLng> {
        self.latlng
    }
}

// =============================================================================
// INCIDENTS
// =============================================================================

/// An incident as delivered by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: EntityId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub destination: Option<Point>,
    /// Assigned unit id to role label. The key set is the assignment.
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_units: BTreeMap<EntityId, String>,
}

impl Incident {
    /// Ids of all units currently assigned to this incident.
    pub fn assigned_ids(&self) -> impl Iterator<Item = &str> {
        self.assigned_units.keys().map(String::as_str)
    }
}

/// An incident with resolved coordinates for itself and its assigned units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedIncident {
    #[serde(flatten)]
    pub incident: Incident,
    pub latlng: Option<LatLng>,
    /// Positions of assigned units that have one, in assignment key order.
    pub unit_positions: Vec<LatLng>,
}

impl LocatedEntity for ExtendedIncident {
    fn id(&self) -> &str {
        &self.incident.id
    }

    fn latlng(&self) -> Option<LatLng> {
        self.latlng
    }
}

// =============================================================================
// SCOPE
// =============================================================================

/// One full snapshot of everything visible to the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(deserialize_with = "entities")]
    pub units: Vec<Unit>,
    #[serde(deserialize_with = "entities")]
    pub incidents: Vec<Incident>,
}

impl Scope {
    /// Interpret a JSON payload as a snapshot.
    ///
    /// Payloads missing either array (or otherwise malformed) yield `None`,
    /// which the reconciliation service treats as "keep the previous state".
    /// Individual broken entities are dropped without failing the snapshot.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match serde_json::from_value(value) {
            Ok(scope) => Some(scope),
            Err(e) => {
                warn!(error = %e, "ignoring malformed scope payload");
                None
            }
        }
    }
}

/// The derived state of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedScope {
    pub units: Vec<ExtendedUnit>,
    pub incidents: Vec<ExtendedIncident>,
    /// The instant every time-dependent field was derived against.
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

impl Default for ExtendedScope {
    fn default() -> Self {
        Self { units: Vec::new(), incidents: Vec::new(), generated_at: OffsetDateTime::UNIX_EPOCH }
    }
}

// =============================================================================
// TOLERANT DESERIALIZATION
// =============================================================================

/// Read `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a nested object that does not parse as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(value) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            debug!(error = %e, "treating malformed nested value as absent");
            Ok(None)
        }
    }
}

/// Read an entity array, dropping entries that do not parse.
fn entities<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| {
            let id = value.get("id").map(ToString::to_string);
            match serde_json::from_value(value) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(id = id.as_deref().unwrap_or("-"), error = %e, "dropping malformed entity");
                    None
                }
            }
        })
        .collect())
}
