//! Unit layer: busy-unit filter, clustering and name search.

#[cfg(test)]
#[path = "unit_test.rs"]
mod unit_test;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::fade::FadeOptions;
use crate::geo::Bounds;
use crate::layer::{DynamicLayer, LayerKind};
use crate::marker::{DynamicMarker, UnitMarker, UnitView};
use crate::model::ExtendedUnit;
use crate::surface::{Grouping, Surface};

/// Layer of unit markers.
pub type UnitLayer = DynamicLayer<UnitKind>;

/// Visibility and grouping policy of the unit layer.
pub struct UnitKind {
    fade: FadeOptions,
    hide_busy_units: bool,
    grouping: Grouping,
    /// The surface not currently in use, swapped in when grouping changes.
    parked: Option<Box<dyn Surface<UnitView>>>,
    /// Lowercased active search term; empty when no search is active.
    search_term: String,
}

impl UnitKind {
    #[must_use]
    pub fn new(fade: FadeOptions) -> Self {
        Self { fade, hide_busy_units: false, grouping: Grouping::Plain, parked: None, search_term: String::new() }
    }

    #[must_use]
    pub fn hide_busy_units(&self) -> bool {
        self.hide_busy_units
    }

    #[must_use]
    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    fn matches(&self, name: &str) -> bool {
        !self.search_term.is_empty() && name.to_lowercase().contains(&self.search_term)
    }
}

impl Default for UnitKind {
    fn default() -> Self {
        Self::new(FadeOptions::default())
    }
}

impl LayerKind for UnitKind {
    type Marker = UnitMarker;

    fn create_marker(&self, item: ExtendedUnit, now: OffsetDateTime) -> UnitMarker {
        let mut marker = UnitMarker::new(item, self.fade, now);
        if !self.search_term.is_empty() {
            marker.highlight(&|name: &str| self.matches(name));
        }
        marker
    }

    /// Busy units are shown unless the busy-unit filter is on.
    fn is_visible(&self, item: &ExtendedUnit) -> bool {
        !self.hide_busy_units || item.unit.is_available_for_dispatching
    }
}

impl DynamicLayer<UnitKind> {
    /// Register the alternate surface used while units are clustered.
    pub fn set_cluster_surface(&mut self, surface: Box<dyn Surface<UnitView>>) {
        self.kind.parked = Some(surface);
    }

    /// Toggle the busy-unit filter and re-apply it to every tracked marker.
    pub fn set_hide_busy_units(&mut self, hide: bool, now: OffsetDateTime) {
        self.kind.hide_busy_units = hide;
        self.refresh_visibility(now);
        debug!(hide, visible = self.visible_count(), "busy unit filter changed");
    }

    /// Switch between the plain and the clustering surface.
    ///
    /// Returns false if no alternate surface has been registered.
    pub fn set_cluster_units(&mut self, clustered: bool, now: OffsetDateTime) -> bool {
        let target = if clustered { Grouping::Clustered } else { Grouping::Plain };
        if self.kind.grouping == target {
            return true;
        }
        let Some(alternate) = self.kind.parked.take() else {
            warn!("no cluster surface registered; grouping unchanged");
            return false;
        };
        let previous = self.set_surface(alternate, now);
        self.kind.parked = Some(previous);
        self.kind.grouping = target;
        debug!(?target, "unit grouping changed");
        true
    }

    /// Highlight units whose name contains `term`, ignoring case.
    ///
    /// An empty term clears all highlights. Returns the bounds of the matches.
    pub fn search(&mut self, term: &str) -> Bounds {
        self.kind.search_term = term.trim().to_lowercase();
        let query = self.kind.search_term.clone();
        let bounds = self.highlight(&|name: &str| !query.is_empty() && name.to_lowercase().contains(&query));
        debug!(term = %query, found = !bounds.is_empty(), "unit search");
        bounds
    }
}
