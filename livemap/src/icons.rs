//! Incident icons.
//!
//! DESIGN
//! ======
//! An incident icon is fully determined by three booleans, so there are at
//! most eight distinct icons. Each is built once and shared: equal keys return
//! the same `Arc`, which lets renderers compare icons by pointer. The cache
//! lives for the whole process and is never evicted.

#[cfg(test)]
#[path = "icons_test.rs"]
mod icons_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::debug;

use crate::style::{INCIDENT_FILL, INCIDENT_FILL_BLUE, INCIDENT_STROKE, INCIDENT_STROKE_PRIORITY};

const SVG_HEADER: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" width=\"16\" height=\"16\"%3E";
const SVG_FOOTER: &str = "%3C/svg%3E";
const SVG_FLASH: &str =
    "%3Canimate attributeName=\"opacity\" values=\"0;1;1;1;1;1;0;0\" dur=\"1s\" repeatCount=\"indefinite\"/%3E";

/// Downward-pointing triangle inside a 16x16 box.
const TOP_DOWN_TRIANGLE: &str = "M1,1 L8,15 L15,1 z";

const ICON_SIZE: [u32; 2] = [16, 16];
const ICON_ANCHOR: [i32; 2] = [8, 8];
const POPUP_ANCHOR: [i32; 2] = [0, -8];

/// The discriminant of an incident icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconKey {
    /// Stroke is red instead of orange.
    pub priority: bool,
    /// Fill is blue instead of grey.
    pub blue: bool,
    /// Icon blinks; used while no unit is assigned.
    pub flash: bool,
}

impl IconKey {
    /// Stable name of the icon, e.g. `incidentPriorityFlash`.
    #[must_use]
    pub fn name(self) -> String {
        format!(
            "incident{}{}{}",
            if self.priority { "Priority" } else { "" },
            if self.blue { "Blue" } else { "" },
            if self.flash { "Flash" } else { "" },
        )
    }
}

/// A renderable icon descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: String,
    /// Inline SVG data URL.
    pub url: String,
    pub size: [u32; 2],
    pub anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
}

impl Icon {
    fn build(key: IconKey) -> Self {
        let fill = if key.blue { INCIDENT_FILL_BLUE } else { INCIDENT_FILL };
        let stroke = if key.priority { INCIDENT_STROKE_PRIORITY } else { INCIDENT_STROKE };
        Self {
            name: key.name(),
            url: svg_url(TOP_DOWN_TRIANGLE, fill, stroke, key.flash),
            size: ICON_SIZE,
            anchor: ICON_ANCHOR,
            popup_anchor: POPUP_ANCHOR,
        }
    }
}

fn svg_url(path: &str, fill: &str, stroke: &str, flash: bool) -> String {
    format!(
        "{SVG_HEADER}%3Cpath d='{path}' fill='{fill}' stroke='{stroke}' stroke-width='2'%3E{}%3C/path%3E{SVG_FOOTER}",
        if flash { SVG_FLASH } else { "" }
    )
}

/// Memoizing icon factory.
#[derive(Debug, Default)]
pub struct IconCache {
    icons: Mutex<HashMap<IconKey, Arc<Icon>>>,
}

impl IconCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the icon for `key`, building it on first use.
    pub fn get(&self, key: IconKey) -> Arc<Icon> {
        let mut icons = self.icons.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(icons.entry(key).or_insert_with(|| {
            debug!(icon = %key.name(), "building incident icon");
            Arc::new(Icon::build(key))
        }))
    }

    /// Number of distinct icons built so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.icons.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide incident icon lookup.
pub fn incident_icon(key: IconKey) -> Arc<Icon> {
    static CACHE: OnceLock<IconCache> = OnceLock::new();
    CACHE.get_or_init(IconCache::new).get(key)
}
