//! Log-backed rendering surface for the command-line client.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::collections::BTreeSet;
use std::fmt::Debug;

use livemap::surface::Surface;
use tracing::{debug, trace};

/// Surface that records which features are shown and logs every change.
#[derive(Debug, Default)]
pub struct TraceSurface {
    name: &'static str,
    shown: BTreeSet<String>,
}

impl TraceSurface {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name, shown: BTreeSet::new() }
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.shown.contains(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.shown.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}

impl<V: Debug> Surface<V> for TraceSurface {
    fn show(&mut self, id: &str, view: &V) {
        if self.shown.insert(id.to_owned()) {
            debug!(surface = self.name, id, "feature added");
        }
        trace!(surface = self.name, id, ?view, "feature drawn");
    }

    fn hide(&mut self, id: &str) {
        if self.shown.remove(id) {
            debug!(surface = self.name, id, "feature removed");
        }
    }
}
