//! Relationship lines drawn around a marker, and when they are shown.
//!
//! Lines appear while the marker is hovered or its popup is open. Leaving the
//! marker hides them only if the popup is closed; closing the popup always
//! hides them.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use crate::geo::LatLng;

/// Pointer and popup events a host forwards to a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvent {
    MouseOver,
    MouseOut,
    PopupOpen,
    PopupClose,
}

/// A set of straight segments sharing one color.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOverlay {
    pub segments: Vec<[LatLng; 2]>,
    pub color: &'static str,
}

impl LineOverlay {
    #[must_use]
    pub fn new(color: &'static str) -> Self {
        Self { segments: Vec::new(), color }
    }

    /// A single segment, or nothing if either endpoint is missing.
    #[must_use]
    pub fn between(a: Option<LatLng>, b: Option<LatLng>, color: &'static str) -> Self {
        let segments = match (a, b) {
            (Some(a), Some(b)) => vec![[a, b]],
            _ => Vec::new(),
        };
        Self { segments, color }
    }

    /// One segment from `origin` to each of `targets`.
    #[must_use]
    pub fn fan(origin: LatLng, targets: &[LatLng], color: &'static str) -> Self {
        Self { segments: targets.iter().map(|t| [origin, *t]).collect(), color }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Hover/popup state deciding whether a marker's lines are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineVisibility {
    shown: bool,
    popup_open: bool,
}

impl LineVisibility {
    /// Apply an event. Returns true if the shown state changed.
    pub fn handle(&mut self, event: MarkerEvent) -> bool {
        let before = self.shown;
        match event {
            MarkerEvent::MouseOver => self.shown = true,
            MarkerEvent::PopupOpen => {
                self.popup_open = true;
                self.shown = true;
            }
            MarkerEvent::MouseOut => {
                if !self.popup_open {
                    self.shown = false;
                }
            }
            MarkerEvent::PopupClose => {
                self.popup_open = false;
                self.shown = false;
            }
        }
        before != self.shown
    }

    /// Forget hover and popup state, e.g. when the marker leaves the map.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    #[must_use]
    pub fn is_popup_open(&self) -> bool {
        self.popup_open
    }
}
