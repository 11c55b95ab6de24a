//! Incident layer: every incident with a location is drawn.

use time::OffsetDateTime;

use crate::layer::{DynamicLayer, LayerKind};
use crate::marker::IncidentMarker;
use crate::model::ExtendedIncident;

/// Layer of incident markers.
pub type IncidentLayer = DynamicLayer<IncidentKind>;

#[derive(Debug, Clone, Copy, Default)]
pub struct IncidentKind;

impl LayerKind for IncidentKind {
    type Marker = IncidentMarker;

    fn create_marker(&self, item: ExtendedIncident, _now: OffsetDateTime) -> IncidentMarker {
        IncidentMarker::new(item)
    }

    fn is_visible(&self, _item: &ExtendedIncident) -> bool {
        true
    }
}
