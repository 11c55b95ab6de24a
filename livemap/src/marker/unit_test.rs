#![allow(clippy::float_cmp)]

use time::macros::datetime;

use super::*;
use crate::model::{Position, Unit};
use crate::style::{BLUE_LINE, EN_ROUTE_LINE};

const NOW: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);

fn extended(fix_age: Option<Duration>, online: bool) -> ExtendedUnit {
    ExtendedUnit {
        unit: Unit {
            id: "u1".into(),
            name: Some("  RTW 1  ".into()),
            last_point: None,
            target_point: None,
            current_position: fix_age.map(|age| Position {
                latitude: 48.0,
                longitude: 16.0,
                timestamp: crate::timestamp::format(NOW - age).unwrap(),
                accuracy: None,
                heading: None,
                speed: None,
            }),
            is_available_for_dispatching: false,
        },
        latlng: Some(LatLng::new(48.0, 16.0)),
        latlng_last: Some(LatLng::new(47.9, 15.9)),
        latlng_next: Some(LatLng::new(48.1, 16.1)),
        online,
        is_self: false,
        has_blue: false,
        color_fill: "white".into(),
        color_outline: "lightgray".into(),
    }
}

fn fresh() -> ExtendedUnit {
    extended(Some(Duration::ZERO), true)
}

#[test]
fn render_copies_colors_and_label() {
    let view = UnitView::render(&fresh(), &FadeOptions::default(), NOW);
    assert_eq!(view.position, LatLng::new(48.0, 16.0));
    assert_eq!(view.fill_color, "white");
    assert_eq!(view.outline_color, "lightgray");
    assert_eq!(view.tooltip, "RTW 1");
    assert_eq!(view.popup, "RTW 1");
    assert_eq!(view.fill_opacity, 1.0);
}

#[test]
fn render_draws_both_lines() {
    let view = UnitView::render(&fresh(), &FadeOptions::default(), NOW);
    assert_eq!(view.from_line.segments, vec![[LatLng::new(47.9, 15.9), LatLng::new(48.0, 16.0)]]);
    assert_eq!(view.target_line.segments, vec![[LatLng::new(48.0, 16.0), LatLng::new(48.1, 16.1)]]);
    assert_eq!(view.target_line.color, EN_ROUTE_LINE);
}

#[test]
fn missing_endpoint_empties_line() {
    let mut unit = fresh();
    unit.latlng_next = None;
    unit.latlng_last = None;
    let view = UnitView::render(&unit, &FadeOptions::default(), NOW);
    assert!(view.from_line.is_empty());
    assert!(view.target_line.is_empty());
}

#[test]
fn blue_assignment_colors_target_line() {
    let mut unit = fresh();
    unit.has_blue = true;
    let view = UnitView::render(&unit, &FadeOptions::default(), NOW);
    assert_eq!(view.target_line.color, BLUE_LINE);
}

#[test]
fn stale_marker_renders_faded_immediately() {
    let marker = UnitMarker::new(extended(Some(Duration::seconds(45)), true), FadeOptions::default(), NOW);
    assert!((marker.view().fill_opacity - 0.7).abs() < 1e-9);
}

#[test]
fn offline_unit_does_not_fade() {
    let marker = UnitMarker::new(extended(Some(Duration::hours(2)), false), FadeOptions::default(), NOW);
    assert_eq!(marker.view().fill_opacity, 1.0);
}

#[test]
fn timer_exists_only_while_attached() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    assert!(!marker.timer_active());
    marker.on_attach(NOW);
    assert!(marker.timer_active());
    marker.on_detach();
    assert!(!marker.timer_active());
}

#[test]
fn tick_fades_mounted_marker() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    marker.on_attach(NOW);
    assert!(!marker.tick(NOW + Duration::seconds(10)));
    assert!(marker.tick(NOW + Duration::seconds(15)));
    assert!((marker.view().fill_opacity - 0.9).abs() < 1e-9);
}

#[test]
fn tick_is_inert_when_detached() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    assert!(!marker.tick(NOW + Duration::minutes(5)));
    assert_eq!(marker.view().fill_opacity, 1.0);
}

#[test]
fn set_data_rerenders_everything() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    let mut moved = fresh();
    moved.latlng = Some(LatLng::new(48.5, 16.5));
    moved.color_fill = "red".into();
    moved.latlng_next = None;
    marker.set_data(moved, NOW);
    assert_eq!(marker.position(), LatLng::new(48.5, 16.5));
    assert_eq!(marker.view().fill_color, "red");
    assert!(marker.view().target_line.is_empty());
}

#[test]
fn set_data_keeps_interaction_state() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    marker.handle_event(MarkerEvent::PopupOpen);
    marker.highlight(&|name: &str| name.contains("RTW"));
    marker.set_data(fresh(), NOW);
    assert!(marker.view().lines_visible);
    assert!(marker.view().highlighted);
}

#[test]
fn hover_and_popup_drive_lines() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    marker.handle_event(MarkerEvent::MouseOver);
    assert!(marker.view().lines_visible);
    marker.handle_event(MarkerEvent::PopupOpen);
    marker.handle_event(MarkerEvent::MouseOut);
    assert!(marker.view().lines_visible);
    marker.handle_event(MarkerEvent::PopupClose);
    assert!(!marker.view().lines_visible);
}

#[test]
fn highlight_reports_match() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    assert!(marker.highlight(&|name: &str| name.to_lowercase().contains("rtw")));
    assert!(marker.is_highlighted());
    assert!(!marker.highlight(&|name: &str| name.contains("NEF")));
    assert!(!marker.view().highlighted);
}

#[test]
fn reattach_shows_current_fade() {
    let mut marker = UnitMarker::new(fresh(), FadeOptions::default(), NOW);
    marker.on_attach(NOW);
    marker.on_detach();

    marker.on_attach(NOW + Duration::seconds(30));

    assert!((marker.view().fill_opacity - 0.8).abs() < 1e-9);
}
