//! Incident marker: a triangle icon with lines to every assigned unit.

#[cfg(test)]
#[path = "incident_test.rs"]
mod incident_test;

use std::sync::Arc;

use time::OffsetDateTime;

use crate::geo::{LatLng, POSITION_TOLERANCE};
use crate::icons::{Icon, IconKey, incident_icon};
use crate::marker::DynamicMarker;
use crate::model::ExtendedIncident;
use crate::overlay::{LineOverlay, LineVisibility, MarkerEvent};
use crate::style::{BLUE_LINE, INCIDENT_LINE};
use crate::text;

/// Everything a surface needs to draw one incident.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentView {
    pub position: LatLng,
    /// Shared icon; equal flags yield the same allocation.
    pub icon: Arc<Icon>,
    pub popup: String,
    pub highlighted: bool,
    /// Incident location to each assigned unit.
    pub unit_lines: LineOverlay,
    pub lines_visible: bool,
}

impl IncidentView {
    /// Render an incident from its data alone. Interaction flags start cleared.
    #[must_use]
    pub fn render(incident: &ExtendedIncident) -> Self {
        let color = if incident.incident.blue { BLUE_LINE } else { INCIDENT_LINE };
        let unit_lines = match incident.latlng {
            Some(origin) => LineOverlay::fan(origin, &incident.unit_positions, color),
            None => LineOverlay::new(color),
        };
        Self {
            position: incident.latlng.unwrap_or(LatLng::new(0.0, 0.0)),
            icon: incident_icon(icon_key(incident)),
            popup: text::for_popup(incident.incident.info.as_deref()),
            highlighted: false,
            unit_lines,
            lines_visible: false,
        }
    }
}

/// Icon flags of an incident. It flashes while no unit is assigned.
#[must_use]
pub fn icon_key(incident: &ExtendedIncident) -> IconKey {
    IconKey {
        priority: incident.incident.priority,
        blue: incident.incident.blue,
        flash: incident.incident.assigned_units.is_empty(),
    }
}

/// Marker for one incident.
#[derive(Debug)]
pub struct IncidentMarker {
    incident: ExtendedIncident,
    view: IncidentView,
    lines: LineVisibility,
    highlighted: bool,
}

impl IncidentMarker {
    #[must_use]
    pub fn new(incident: ExtendedIncident) -> Self {
        let view = IncidentView::render(&incident);
        Self { incident, view, lines: LineVisibility::default(), highlighted: false }
    }

    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

impl DynamicMarker for IncidentMarker {
    type Item = ExtendedIncident;
    type View = IncidentView;

    fn data(&self) -> &ExtendedIncident {
        &self.incident
    }

    fn set_data(&mut self, item: ExtendedIncident, _now: OffsetDateTime) {
        let previous = self.view.position;
        self.incident = item;
        self.view = IncidentView::render(&self.incident);
        // Moves below the tolerance are noise; keep the marker where it is.
        if previous.approx_eq(&self.view.position, POSITION_TOLERANCE) {
            self.view.position = previous;
        }
        self.view.lines_visible = self.lines.is_shown();
        self.view.highlighted = self.highlighted;
    }

    fn view(&self) -> &IncidentView {
        &self.view
    }

    fn position(&self) -> LatLng {
        self.view.position
    }

    fn on_detach(&mut self) {
        self.lines.reset();
        self.view.lines_visible = false;
    }

    fn handle_event(&mut self, event: MarkerEvent) -> bool {
        let changed = self.lines.handle(event);
        self.view.lines_visible = self.lines.is_shown();
        changed
    }

    fn highlight(&mut self, matches: &dyn Fn(&str) -> bool) -> bool {
        let matched = matches(&self.view.popup);
        self.highlighted = matched;
        self.view.highlighted = matched;
        matched
    }
}
