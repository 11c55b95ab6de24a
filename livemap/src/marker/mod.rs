//! Dynamic markers: one stateful visual per tracked entity.
//!
//! A marker is built from its first item, then receives every later version
//! of that entity through [`DynamicMarker::set_data`]. Each update re-renders
//! the complete view from the item; nothing is patched incrementally. Only
//! interaction state (hover/popup, highlight) and the fade timer survive
//! across updates.
//!
//! ```text
//! (construct) ──► rendered ──set_data──► rendered
//!                    │
//!                    └── removed by layer ──► dropped (timer released)
//! ```

pub mod incident;
pub mod unit;

use time::OffsetDateTime;

use crate::geo::LatLng;
use crate::model::LocatedEntity;
use crate::overlay::MarkerEvent;

pub use incident::{IncidentMarker, IncidentView};
pub use unit::{UnitMarker, UnitView};

/// Behavior a layer needs from the markers it owns.
pub trait DynamicMarker {
    type Item: LocatedEntity + Clone + 'static;
    type View: 'static;

    /// The entity version the marker currently renders.
    fn data(&self) -> &Self::Item;

    /// Replace the entity and re-render from scratch.
    fn set_data(&mut self, item: Self::Item, now: OffsetDateTime);

    /// The latest rendered view.
    fn view(&self) -> &Self::View;

    /// Current marker position.
    fn position(&self) -> LatLng;

    /// Called when the marker is added to a surface.
    fn on_attach(&mut self, _now: OffsetDateTime) {}

    /// Called when the marker is removed from a surface.
    fn on_detach(&mut self) {}

    /// Apply a hover or popup event. Returns true if the view changed.
    fn handle_event(&mut self, event: MarkerEvent) -> bool;

    /// Advance time-driven state. Returns true if the view changed.
    fn tick(&mut self, _now: OffsetDateTime) -> bool {
        false
    }

    /// True while a periodic timer is held.
    fn timer_active(&self) -> bool {
        false
    }

    /// Set the highlight from `matches` applied to the marker's label.
    /// Returns whether it matched.
    fn highlight(&mut self, matches: &dyn Fn(&str) -> bool) -> bool;
}
