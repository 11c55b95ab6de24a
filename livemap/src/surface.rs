//! Rendering surfaces.
//!
//! A surface is whatever actually draws features: a map pane, a clustering
//! container, a log. Layers decide what is shown; surfaces only receive
//! `show` (add or refresh) and `hide` (remove) calls keyed by entity id.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A target for rendered marker views.
pub trait Surface<V> {
    /// Add the feature `id`, or refresh it if already present.
    fn show(&mut self, id: &str, view: &V);

    /// Remove the feature `id`. Unknown ids are ignored.
    fn hide(&mut self, id: &str);
}

impl<V, S: Surface<V>> Surface<V> for Rc<RefCell<S>> {
    fn show(&mut self, id: &str, view: &V) {
        self.borrow_mut().show(id, view);
    }

    fn hide(&mut self, id: &str) {
        self.borrow_mut().hide(id);
    }
}

/// Which surface a layer currently renders into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Grouping {
    #[default]
    Plain,
    Clustered,
}

/// Counters of surface calls, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub added: usize,
    pub refreshed: usize,
    pub removed: usize,
}

/// In-memory surface holding the latest view of every shown feature.
#[derive(Debug, Clone)]
pub struct RecordingSurface<V> {
    shown: BTreeMap<String, V>,
    stats: SurfaceStats,
}

impl<V> Default for RecordingSurface<V> {
    fn default() -> Self {
        Self { shown: BTreeMap::new(), stats: SurfaceStats::default() }
    }
}

impl<V: Clone> RecordingSurface<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared handle, so the caller can inspect a surface owned by a layer.
    #[must_use]
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&V> {
        self.shown.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.shown.contains_key(id)
    }

    /// Ids of all shown features, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.shown.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shown.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }
}

impl<V: Clone> Surface<V> for RecordingSurface<V> {
    fn show(&mut self, id: &str, view: &V) {
        if self.shown.insert(id.to_owned(), view.clone()).is_some() {
            self.stats.refreshed += 1;
        } else {
            self.stats.added += 1;
        }
    }

    fn hide(&mut self, id: &str) {
        if self.shown.remove(id).is_some() {
            self.stats.removed += 1;
        }
    }
}
