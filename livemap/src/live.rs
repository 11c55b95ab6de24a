//! Live map facade: one reconciliation service feeding both layers.
//!
//! DESIGN
//! ======
//! The layers are subscribed to the [`DataService`] through a single
//! callback, so a pass is: derive the extended scope, synchronize units,
//! then synchronize incidents. Units always complete before incidents.
//! The layers sit behind `Rc<RefCell<..>>` because the callback and the
//! host both need them; everything runs on one thread.

#[cfg(test)]
#[path = "live_test.rs"]
mod live_test;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use time::OffsetDateTime;
use tracing::debug;

use crate::geo::Bounds;
use crate::layer::{IncidentLayer, SyncReport, UnitLayer};
use crate::model::{ExtendedScope, Scope};
use crate::overlay::MarkerEvent;
use crate::scope::{DataService, ScopeSettings};
use crate::text;

/// Outcome of one applied snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub units: SyncReport,
    pub incidents: SyncReport,
    pub visible_units: usize,
    pub visible_incidents: usize,
}

const PASS_SUMMARY: &str = "{{units}} units ({{visible_units}} shown), {{incidents}} incidents ({{visible_incidents}} shown)";

impl PassReport {
    /// One-line human readable summary of the pass.
    #[must_use]
    pub fn summary(&self) -> String {
        let tracked = |r: &SyncReport| r.created + r.updated;
        let values = HashMap::from([
            ("units", tracked(&self.units).to_string()),
            ("visible_units", self.visible_units.to_string()),
            ("incidents", tracked(&self.incidents).to_string()),
            ("visible_incidents", self.visible_incidents.to_string()),
        ]);
        text::template_replace(PASS_SUMMARY, &values)
    }
}

/// Both dynamic layers of the map.
pub struct Layers {
    pub units: UnitLayer,
    pub incidents: IncidentLayer,
}

pub struct LiveMap {
    service: DataService,
    layers: Rc<RefCell<Layers>>,
    last_pass: Rc<Cell<Option<PassReport>>>,
}

impl LiveMap {
    #[must_use]
    pub fn new(settings: ScopeSettings, units: UnitLayer, incidents: IncidentLayer) -> Self {
        let layers = Rc::new(RefCell::new(Layers { units, incidents }));
        let last_pass = Rc::new(Cell::new(None));
        let mut service = DataService::new(settings);

        let sink = Rc::clone(&layers);
        let report = Rc::clone(&last_pass);
        service.register_callback(Box::new(move |scope: &ExtendedScope| {
            let mut layers = sink.borrow_mut();
            let now = scope.generated_at;
            let units = layers.units.update_all(scope.units.iter().cloned(), now);
            let incidents = layers.incidents.update_all(scope.incidents.iter().cloned(), now);
            report.set(Some(PassReport {
                units,
                incidents,
                visible_units: layers.units.visible_count(),
                visible_incidents: layers.incidents.visible_count(),
            }));
        }));

        Self { service, layers, last_pass }
    }

    /// Run one reconciliation pass.
    ///
    /// Returns `None`, leaving every marker untouched, if there is no snapshot.
    pub fn apply(&mut self, snapshot: Option<Scope>, now: OffsetDateTime) -> Option<PassReport> {
        self.last_pass.set(None);
        if !self.service.update_all(snapshot, now) {
            return None;
        }
        let report = self.last_pass.take();
        debug!(?report, "pass applied");
        report
    }

    /// Fire due fade timers on both layers.
    pub fn tick(&mut self, now: OffsetDateTime) -> usize {
        let mut layers = self.layers.borrow_mut();
        layers.units.tick(now) + layers.incidents.tick(now)
    }

    pub fn set_hide_busy_units(&mut self, hide: bool, now: OffsetDateTime) {
        self.layers.borrow_mut().units.set_hide_busy_units(hide, now);
    }

    pub fn set_cluster_units(&mut self, clustered: bool, now: OffsetDateTime) -> bool {
        self.layers.borrow_mut().units.set_cluster_units(clustered, now)
    }

    /// Highlight units by name; see [`UnitLayer::search`].
    pub fn search(&mut self, term: &str) -> Bounds {
        self.layers.borrow_mut().units.search(term)
    }

    pub fn unit_event(&mut self, id: &str, event: MarkerEvent) -> bool {
        self.layers.borrow_mut().units.handle_event(id, event)
    }

    pub fn incident_event(&mut self, id: &str, event: MarkerEvent) -> bool {
        self.layers.borrow_mut().incidents.handle_event(id, event)
    }

    /// The latest extended scope.
    #[must_use]
    pub fn data(&self) -> &ExtendedScope {
        self.service.data()
    }

    #[must_use]
    pub fn units(&self) -> Ref<'_, UnitLayer> {
        Ref::map(self.layers.borrow(), |layers| &layers.units)
    }

    #[must_use]
    pub fn incidents(&self) -> Ref<'_, IncidentLayer> {
        Ref::map(self.layers.borrow(), |layers| &layers.incidents)
    }

    pub fn units_mut(&mut self) -> RefMut<'_, UnitLayer> {
        RefMut::map(self.layers.borrow_mut(), |layers| &mut layers.units)
    }

    /// Number of markers holding a fade timer.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        let layers = self.layers.borrow();
        layers.units.active_timers() + layers.incidents.active_timers()
    }
}
