//! Data reconciliation service: raw snapshot in, extended scope out.
//!
//! DESIGN
//! ======
//! Every pass rebuilds the extended scope from scratch, in a fixed order:
//!
//! 1. collect the ids of units assigned to any blue incident,
//! 2. extend every unit (online, self, blue, colors, coordinates),
//! 3. index resolved unit coordinates by id,
//! 4. extend every incident, resolving assigned unit positions via (3).
//!
//! Derived fields depend only on the snapshot, the settings and `now`; nothing
//! is carried over from the previous pass. The result replaces the stored
//! scope wholesale and is handed to every registered callback in order.
//!
//! ERROR HANDLING
//! ==============
//! A missing snapshot (transport failure, malformed payload) is not an error
//! here: the previous scope is kept and no callback runs. Reporting the
//! connectivity problem is the caller's job.

#[cfg(test)]
#[path = "scope_test.rs"]
mod scope_test;

use std::collections::{HashMap, HashSet};

use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::geo::LatLng;
use crate::model::{ExtendedIncident, ExtendedScope, ExtendedUnit, Incident, Scope, Unit};
use crate::style::{
    AVAILABLE_OUTLINE, BLUE_OUTLINE, DEFAULT_FILL, DEFAULT_OUTLINE, OFFLINE_FILL, SELF_FILL, UnitColors,
};
use crate::timestamp;

/// Default age after which a unit counts as offline.
pub const DEFAULT_ONLINE_TIMEOUT: Duration = Duration::minutes(30);

/// Session and configuration values the derivation depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSettings {
    /// Id of the unit the session is authenticated as.
    pub own_id: Option<String>,
    /// A unit is online iff its live position is strictly younger than this.
    pub online_timeout: Duration,
    pub unit_colors: UnitColors,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self { own_id: None, online_timeout: DEFAULT_ONLINE_TIMEOUT, unit_colors: UnitColors::default() }
    }
}

/// Subscriber invoked with every new extended scope.
pub type ScopeCallback = Box<dyn FnMut(&ExtendedScope)>;

/// Holds the latest extended scope and notifies subscribers.
pub struct DataService {
    settings: ScopeSettings,
    data: ExtendedScope,
    callbacks: Vec<ScopeCallback>,
}

impl DataService {
    #[must_use]
    pub fn new(settings: ScopeSettings) -> Self {
        Self { settings, data: ExtendedScope::default(), callbacks: Vec::new() }
    }

    /// Register a subscriber. It runs once immediately with the current scope.
    pub fn register_callback(&mut self, mut callback: ScopeCallback) {
        callback(&self.data);
        self.callbacks.push(callback);
    }

    /// Derive and publish a new snapshot.
    ///
    /// Returns false, keeping the previous scope, if `scope` is `None`.
    pub fn update_all(&mut self, scope: Option<Scope>, now: OffsetDateTime) -> bool {
        let Some(scope) = scope else {
            debug!("no snapshot; keeping previous scope");
            return false;
        };

        self.data = derive_scope(&scope, &self.settings, now);
        debug!(
            units = self.data.units.len(),
            incidents = self.data.incidents.len(),
            callbacks = self.callbacks.len(),
            "scope updated"
        );
        for callback in &mut self.callbacks {
            callback(&self.data);
        }
        true
    }

    #[must_use]
    pub fn data(&self) -> &ExtendedScope {
        &self.data
    }

    #[must_use]
    pub fn settings(&self) -> &ScopeSettings {
        &self.settings
    }
}

// =============================================================================
// DERIVATION
// =============================================================================

/// Build the extended scope for one snapshot.
#[must_use]
pub fn derive_scope(scope: &Scope, settings: &ScopeSettings, now: OffsetDateTime) -> ExtendedScope {
    let blue = blue_unit_ids(&scope.incidents);

    let units: Vec<ExtendedUnit> = scope
        .units
        .iter()
        .map(|unit| extend_unit(unit, &blue, settings, now))
        .collect();

    let positions: HashMap<&str, LatLng> = units
        .iter()
        .filter_map(|u| u.latlng.map(|latlng| (u.unit.id.as_str(), latlng)))
        .collect();

    let incidents = scope
        .incidents
        .iter()
        .map(|incident| extend_incident(incident, &positions))
        .collect();

    ExtendedScope { units, incidents, generated_at: now }
}

/// Ids of all units assigned to at least one blue incident.
#[must_use]
pub fn blue_unit_ids(incidents: &[Incident]) -> HashSet<&str> {
    incidents
        .iter()
        .filter(|i| i.blue)
        .flat_map(Incident::assigned_ids)
        .collect()
}

/// Derive display state for one unit.
#[must_use]
pub fn extend_unit(unit: &Unit, blue: &HashSet<&str>, settings: &ScopeSettings, now: OffsetDateTime) -> ExtendedUnit {
    let age = timestamp::age(unit.current_position.as_ref().map(|p| p.timestamp.as_str()), now);
    let online = age.is_some_and(|age| age < settings.online_timeout);
    let is_self = settings.own_id.as_deref() == Some(unit.id.as_str());
    let has_blue = blue.contains(unit.id.as_str());

    let color_fill = if is_self {
        SELF_FILL
    } else if !online {
        OFFLINE_FILL
    } else {
        unit.name
            .as_deref()
            .and_then(|name| settings.unit_colors.color_for(name))
            .unwrap_or(DEFAULT_FILL)
    };

    let color_outline = if unit.is_available_for_dispatching {
        AVAILABLE_OUTLINE
    } else if has_blue {
        BLUE_OUTLINE
    } else {
        DEFAULT_OUTLINE
    };

    let latlng_last = unit.last_point.as_ref().and_then(LatLng::from_point);
    let latlng = unit
        .current_position
        .as_ref()
        .and_then(|p| LatLng::from_point(&p.point()))
        .or(latlng_last);

    ExtendedUnit {
        unit: unit.clone(),
        latlng,
        latlng_last,
        latlng_next: unit.target_point.as_ref().and_then(LatLng::from_point),
        online,
        is_self,
        has_blue,
        color_fill: color_fill.to_owned(),
        color_outline: color_outline.to_owned(),
    }
}

/// Resolve an incident's own coordinate and those of its assigned units.
#[must_use]
pub fn extend_incident(incident: &Incident, positions: &HashMap<&str, LatLng>) -> ExtendedIncident {
    ExtendedIncident {
        incident: incident.clone(),
        latlng: incident.location.as_ref().and_then(LatLng::from_point),
        unit_positions: incident
            .assigned_ids()
            .filter_map(|id| positions.get(id).copied())
            .collect(),
    }
}
