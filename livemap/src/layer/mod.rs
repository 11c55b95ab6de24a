//! Dynamic layers: the live marker set of one entity kind.
//!
//! DESIGN
//! ======
//! A layer exclusively owns its markers, keyed by entity id. Each batch from
//! the reconciliation service is diffed against that map:
//!
//! ```text
//! tracked ids ──► removal candidates
//!     for each item with a position: upsert, drop id from candidates
//!     for each remaining candidate:   detach + dispose
//! ```
//!
//! Which tracked markers are drawn is a separate decision made by the
//! [`LayerKind::is_visible`] hook. Markers are attached to the current
//! [`Surface`] while visible and detached otherwise; attaching starts their
//! periodic timers and detaching releases them. Changing a policy re-runs the
//! hook over every tracked marker, and swapping the surface (grouping) moves
//! markers without recreating them.
//!
//! ERROR HANDLING
//! ==============
//! None. Items without a position are treated as absent from the batch, and
//! every other input is accepted as is.

pub mod incident;
pub mod unit;

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use time::OffsetDateTime;
use tracing::debug;

use crate::geo::Bounds;
use crate::marker::DynamicMarker;
use crate::model::{EntityId, LocatedEntity};
use crate::overlay::MarkerEvent;
use crate::surface::Surface;

pub use incident::{IncidentKind, IncidentLayer};
pub use unit::{UnitKind, UnitLayer};

/// Entity type handled by a layer kind.
pub type ItemOf<K> = <<K as LayerKind>::Marker as DynamicMarker>::Item;

/// View type rendered by a layer kind.
pub type ViewOf<K> = <<K as LayerKind>::Marker as DynamicMarker>::View;

/// A surface able to draw the markers of a layer kind.
pub type BoxedSurface<K> = Box<dyn Surface<ViewOf<K>>>;

/// The two hooks that specialize a [`DynamicLayer`] for one entity kind.
pub trait LayerKind {
    type Marker: DynamicMarker;

    /// Build the marker for an entity seen for the first time.
    fn create_marker(&self, item: ItemOf<Self>, now: OffsetDateTime) -> Self::Marker;

    /// Whether the entity should currently be drawn.
    fn is_visible(&self, item: &ItemOf<Self>) -> bool;
}

/// Outcome of a single [`DynamicLayer::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
    /// The item lost its position and its marker was disposed.
    Removed,
    /// The item has no position and was not tracked.
    Skipped,
}

/// Counts of one [`DynamicLayer::update_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

struct Tracked<M> {
    marker: M,
    attached: bool,
    /// Creation order within the layer; survives updates and surface swaps.
    serial: u64,
}

/// The tracked markers of one entity kind and the surface they are drawn on.
pub struct DynamicLayer<K: LayerKind> {
    kind: K,
    markers: BTreeMap<EntityId, Tracked<K::Marker>>,
    surface: BoxedSurface<K>,
    next_serial: u64,
}

impl<K: LayerKind> DynamicLayer<K> {
    #[must_use]
    pub fn new(kind: K, surface: BoxedSurface<K>) -> Self {
        Self { kind, markers: BTreeMap::new(), surface, next_serial: 0 }
    }

    // =========================================================================
    // SYNCHRONIZATION
    // =========================================================================

    /// Create or update the marker of one entity.
    ///
    /// An item without a position disposes any existing marker for its id.
    pub fn update(&mut self, item: ItemOf<K>, now: OffsetDateTime) -> Upsert {
        let id = item.id().to_owned();
        if item.latlng().is_none() {
            return if self.remove(&id) { Upsert::Removed } else { Upsert::Skipped };
        }

        let visible = self.kind.is_visible(&item);
        let (outcome, tracked) = match self.markers.entry(id.clone()) {
            Entry::Occupied(entry) => {
                let tracked = entry.into_mut();
                tracked.marker.set_data(item, now);
                (Upsert::Updated, tracked)
            }
            Entry::Vacant(entry) => {
                let marker = self.kind.create_marker(item, now);
                let serial = self.next_serial;
                self.next_serial += 1;
                (Upsert::Created, entry.insert(Tracked { marker, attached: false, serial }))
            }
        };
        sync(self.surface.as_mut(), &id, tracked, visible, true, now);
        outcome
    }

    /// Resynchronize against a complete batch.
    ///
    /// Tracked markers whose id is missing from `items`, or whose item has no
    /// position, are disposed.
    pub fn update_all<I>(&mut self, items: I, now: OffsetDateTime) -> SyncReport
    where
        I: IntoIterator<Item = ItemOf<K>>,
    {
        let mut stale: BTreeSet<EntityId> = self.markers.keys().cloned().collect();
        let mut report = SyncReport::default();

        for item in items {
            let id = item.id().to_owned();
            match self.update(item, now) {
                Upsert::Created => {
                    report.created += 1;
                    stale.remove(&id);
                }
                Upsert::Updated => {
                    report.updated += 1;
                    stale.remove(&id);
                }
                Upsert::Removed => report.removed += 1,
                Upsert::Skipped => {}
            }
        }

        for id in &stale {
            if self.remove(id) {
                report.removed += 1;
            }
        }

        debug!(
            created = report.created,
            updated = report.updated,
            removed = report.removed,
            tracked = self.markers.len(),
            "layer synchronized"
        );
        report
    }

    /// Detach and dispose the marker of `id`. Returns false if it was not tracked.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(mut tracked) = self.markers.remove(id) else {
            return false;
        };
        if tracked.attached {
            self.surface.hide(id);
        }
        tracked.marker.on_detach();
        true
    }

    /// Dispose every marker.
    pub fn clear(&mut self) {
        let ids: Vec<EntityId> = self.markers.keys().cloned().collect();
        for id in &ids {
            self.remove(id);
        }
    }

    // =========================================================================
    // VISIBILITY AND GROUPING
    // =========================================================================

    /// Re-evaluate visibility of every tracked marker against the current policy.
    pub fn refresh_visibility(&mut self, now: OffsetDateTime) {
        for (id, tracked) in &mut self.markers {
            let visible = self.kind.is_visible(tracked.marker.data());
            sync(self.surface.as_mut(), id, tracked, visible, false, now);
        }
    }

    /// Move all markers onto `surface` and return the previous one.
    ///
    /// Every attached marker is detached from the old surface first; visible
    /// markers are then attached to the new one. Marker instances survive.
    pub fn set_surface(&mut self, surface: BoxedSurface<K>, now: OffsetDateTime) -> BoxedSurface<K> {
        for (id, tracked) in &mut self.markers {
            sync(self.surface.as_mut(), id, tracked, false, false, now);
        }
        let previous = std::mem::replace(&mut self.surface, surface);
        self.refresh_visibility(now);
        previous
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Forward a hover or popup event to an attached marker.
    pub fn handle_event(&mut self, id: &str, event: MarkerEvent) -> bool {
        let Some(tracked) = self.markers.get_mut(id) else {
            return false;
        };
        if !tracked.attached {
            return false;
        }
        let changed = tracked.marker.handle_event(event);
        if changed {
            self.surface.show(id, tracked.marker.view());
        }
        changed
    }

    /// Fire due marker timers. Returns the number of redrawn markers.
    pub fn tick(&mut self, now: OffsetDateTime) -> usize {
        let mut redrawn = 0;
        for (id, tracked) in &mut self.markers {
            if tracked.attached && tracked.marker.tick(now) {
                self.surface.show(id, tracked.marker.view());
                redrawn += 1;
            }
        }
        redrawn
    }

    /// Apply `matches` to every marker's label and return the bounds of the
    /// matching markers. Attached markers are redrawn.
    pub fn highlight(&mut self, matches: &dyn Fn(&str) -> bool) -> Bounds {
        let mut bounds = Bounds::default();
        for (id, tracked) in &mut self.markers {
            if tracked.marker.highlight(matches) {
                bounds.extend(tracked.marker.position());
            }
            if tracked.attached {
                self.surface.show(id, tracked.marker.view());
            }
        }
        bounds
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&K::Marker> {
        self.markers.get(id).map(|tracked| &tracked.marker)
    }

    /// Creation serial of the marker of `id`. A marker that is updated or
    /// moved keeps its serial; a recreated one gets a fresh serial.
    #[must_use]
    pub fn serial(&self, id: &str) -> Option<u64> {
        self.markers.get(id).map(|tracked| tracked.serial)
    }

    /// Whether the marker of `id` is currently drawn.
    #[must_use]
    pub fn is_attached(&self, id: &str) -> bool {
        self.markers.get(id).is_some_and(|tracked| tracked.attached)
    }

    /// Tracked ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Number of attached markers.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.markers.values().filter(|tracked| tracked.attached).count()
    }

    /// Number of markers currently holding a periodic timer.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.markers.values().filter(|tracked| tracked.marker.timer_active()).count()
    }

    #[must_use]
    pub fn kind(&self) -> &K {
        &self.kind
    }
}

/// Bring one marker's attachment in line with `visible`.
///
/// With `redraw`, an already attached marker is shown again with its latest view.
fn sync<M: DynamicMarker>(
    surface: &mut dyn Surface<M::View>,
    id: &str,
    tracked: &mut Tracked<M>,
    visible: bool,
    redraw: bool,
    now: OffsetDateTime,
) {
    match (visible, tracked.attached) {
        (true, false) => {
            tracked.marker.on_attach(now);
            surface.show(id, tracked.marker.view());
            tracked.attached = true;
        }
        (true, true) if redraw => surface.show(id, tracked.marker.view()),
        (false, true) => {
            surface.hide(id);
            tracked.marker.on_detach();
            tracked.attached = false;
        }
        _ => {}
    }
}
