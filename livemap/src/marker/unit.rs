//! Unit marker: a colored circle with a permanent name label, a line from
//! the last known point and a line to the target.

#[cfg(test)]
#[path = "unit_test.rs"]
mod unit_test;

use time::{Duration, OffsetDateTime};

use crate::fade::{self, FadeOptions, FadeTimer};
use crate::geo::LatLng;
use crate::marker::DynamicMarker;
use crate::model::ExtendedUnit;
use crate::overlay::{LineOverlay, LineVisibility, MarkerEvent};
use crate::style::{BLUE_LINE, EN_ROUTE_LINE, FROM_LINE};
use crate::text;

/// Everything a surface needs to draw one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitView {
    pub position: LatLng,
    pub fill_color: String,
    pub outline_color: String,
    pub fill_opacity: f64,
    /// Permanent label next to the marker.
    pub tooltip: String,
    pub popup: String,
    /// Label is emphasized as a search result.
    pub highlighted: bool,
    /// Last known point to current position.
    pub from_line: LineOverlay,
    /// Current position to target.
    pub target_line: LineOverlay,
    pub lines_visible: bool,
}

impl UnitView {
    /// Render a unit from its data alone. Interaction flags start cleared.
    #[must_use]
    pub fn render(unit: &ExtendedUnit, fade: &FadeOptions, now: OffsetDateTime) -> Self {
        let label = text::for_popup(unit.unit.name.as_deref());
        Self {
            position: unit.latlng.unwrap_or(LatLng::new(0.0, 0.0)),
            fill_color: unit.color_fill.clone(),
            outline_color: unit.color_outline.clone(),
            fill_opacity: unit_opacity(unit, fade, now),
            tooltip: label.clone(),
            popup: label,
            highlighted: false,
            from_line: LineOverlay::between(unit.latlng_last, unit.latlng, FROM_LINE),
            target_line: LineOverlay::between(
                unit.latlng,
                unit.latlng_next,
                if unit.has_blue { BLUE_LINE } else { EN_ROUTE_LINE },
            ),
            lines_visible: false,
        }
    }
}

/// Fill opacity of a unit at `now`.
///
/// Offline units are already grayed out and do not fade any further.
#[must_use]
pub fn unit_opacity(unit: &ExtendedUnit, fade: &FadeOptions, now: OffsetDateTime) -> f64 {
    let elapsed = if unit.online {
        crate::timestamp::age(unit.unit.current_position.as_ref().map(|p| p.timestamp.as_str()), now)
            .unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    };
    fade::opacity(fade, elapsed)
}

/// Marker for one unit.
#[derive(Debug)]
pub struct UnitMarker {
    unit: ExtendedUnit,
    fade: FadeOptions,
    view: UnitView,
    lines: LineVisibility,
    highlighted: bool,
    timer: Option<FadeTimer>,
}

impl UnitMarker {
    #[must_use]
    pub fn new(unit: ExtendedUnit, fade: FadeOptions, now: OffsetDateTime) -> Self {
        let view = UnitView::render(&unit, &fade, now);
        Self { unit, fade, view, lines: LineVisibility::default(), highlighted: false, timer: None }
    }

    fn refresh(&mut self, now: OffsetDateTime) {
        self.view = UnitView::render(&self.unit, &self.fade, now);
        self.view.lines_visible = self.lines.is_shown();
        self.view.highlighted = self.highlighted;
    }

    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

impl DynamicMarker for UnitMarker {
    type Item = ExtendedUnit;
    type View = UnitView;

    fn data(&self) -> &ExtendedUnit {
        &self.unit
    }

    fn set_data(&mut self, item: ExtendedUnit, now: OffsetDateTime) {
        self.unit = item;
        self.refresh(now);
    }

    fn view(&self) -> &UnitView {
        &self.view
    }

    fn position(&self) -> LatLng {
        self.view.position
    }

    fn on_attach(&mut self, now: OffsetDateTime) {
        self.view.fill_opacity = unit_opacity(&self.unit, &self.fade, now);
        if self.timer.is_none() {
            self.timer = Some(FadeTimer::start(now, self.fade.interval));
        }
    }

    fn on_detach(&mut self) {
        self.timer = None;
        self.lines.reset();
        self.view.lines_visible = false;
    }

    fn handle_event(&mut self, event: MarkerEvent) -> bool {
        let changed = self.lines.handle(event);
        self.view.lines_visible = self.lines.is_shown();
        changed
    }

    fn tick(&mut self, now: OffsetDateTime) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };
        if !timer.fire(now) {
            return false;
        }
        let opacity = unit_opacity(&self.unit, &self.fade, now);
        let changed = (opacity - self.view.fill_opacity).abs() > f64::EPSILON;
        self.view.fill_opacity = opacity;
        changed
    }

    fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    fn highlight(&mut self, matches: &dyn Fn(&str) -> bool) -> bool {
        let matched = matches(self.unit.unit.name.as_deref().unwrap_or_default());
        self.highlighted = matched;
        self.view.highlighted = matched;
        matched
    }
}
