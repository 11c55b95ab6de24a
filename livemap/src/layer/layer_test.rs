use std::cell::RefCell;
use std::rc::Rc;

use time::Duration;
use time::macros::datetime;

use super::*;
use crate::fade::FadeOptions;
use crate::geo::LatLng;
use crate::marker::{IncidentView, UnitView};
use crate::model::{ExtendedIncident, ExtendedUnit, Incident, Unit};
use crate::surface::RecordingSurface;

const NOW: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);

fn incident(id: &str, latlng: Option<(f64, f64)>) -> ExtendedIncident {
    ExtendedIncident {
        incident: Incident {
            id: id.into(),
            kind: None,
            priority: false,
            blue: false,
            info: Some(format!("incident {id}")),
            location: None,
            destination: None,
            assigned_units: std::collections::BTreeMap::new(),
        },
        latlng: latlng.map(|(lat, lng)| LatLng::new(lat, lng)),
        unit_positions: Vec::new(),
    }
}

fn unit(id: &str) -> ExtendedUnit {
    ExtendedUnit {
        unit: Unit {
            id: id.into(),
            name: Some(id.to_uppercase()),
            last_point: None,
            target_point: None,
            current_position: None,
            is_available_for_dispatching: false,
        },
        latlng: Some(LatLng::new(48.0, 16.0)),
        latlng_last: None,
        latlng_next: None,
        online: false,
        is_self: false,
        has_blue: false,
        color_fill: "gray".into(),
        color_outline: "lightgray".into(),
    }
}

type Shared<V> = Rc<RefCell<RecordingSurface<V>>>;

fn incident_layer() -> (IncidentLayer, Shared<IncidentView>) {
    let surface = RecordingSurface::<IncidentView>::shared();
    (DynamicLayer::new(IncidentKind, Box::new(Rc::clone(&surface))), surface)
}

fn unit_layer() -> (UnitLayer, Shared<UnitView>) {
    let surface = RecordingSurface::<UnitView>::shared();
    (DynamicLayer::new(UnitKind::new(FadeOptions::default()), Box::new(Rc::clone(&surface))), surface)
}

fn batch(ids: &[&str]) -> Vec<ExtendedIncident> {
    ids.iter().map(|id| incident(id, Some((48.0, 16.0)))).collect()
}

#[test]
fn update_creates_then_updates() {
    let (mut layer, surface) = incident_layer();
    assert_eq!(layer.update(incident("a", Some((48.0, 16.0))), NOW), Upsert::Created);
    assert_eq!(layer.update(incident("a", Some((48.5, 16.0))), NOW), Upsert::Updated);
    assert_eq!(layer.len(), 1);
    assert_eq!(surface.borrow().get("a").map(|v| v.position), Some(LatLng::new(48.5, 16.0)));
}

#[test]
fn update_without_position_is_skipped() {
    let (mut layer, surface) = incident_layer();
    assert_eq!(layer.update(incident("a", None), NOW), Upsert::Skipped);
    assert!(layer.is_empty());
    assert!(surface.borrow().is_empty());
}

#[test]
fn update_all_diffs_against_tracked_set() {
    let (mut layer, surface) = incident_layer();
    layer.update_all(batch(&["a", "b", "c"]), NOW);
    let b_before = layer.serial("b");
    assert_eq!(b_before, Some(1));
    let c_before = layer.serial("c");

    let report = layer.update_all(batch(&["b", "c", "d"]), NOW);

    assert_eq!(report, SyncReport { created: 1, updated: 2, removed: 1 });
    assert_eq!(layer.ids().collect::<Vec<_>>(), ["b", "c", "d"]);
    assert_eq!(layer.serial("b"), b_before);
    assert_eq!(layer.serial("c"), c_before);
    assert_eq!(layer.serial("d"), Some(3));
    assert_eq!(surface.borrow().ids(), ["b", "c", "d"]);
}

#[test]
fn update_all_is_idempotent() {
    let (mut layer, surface) = incident_layer();
    layer.update_all(batch(&["a", "b"]), NOW);
    let views: Vec<_> = ["a", "b"].iter().map(|id| surface.borrow().get(id).cloned()).collect();

    let report = layer.update_all(batch(&["a", "b"]), NOW);

    assert_eq!(report, SyncReport { created: 0, updated: 2, removed: 0 });
    let again: Vec<_> = ["a", "b"].iter().map(|id| surface.borrow().get(id).cloned()).collect();
    assert_eq!(views, again);
    assert_eq!(surface.borrow().stats().added, 2);
}

#[test]
fn losing_position_removes_marker() {
    let (mut layer, surface) = incident_layer();
    layer.update_all(batch(&["a", "b"]), NOW);

    let report = layer.update_all(vec![incident("a", None), incident("b", Some((48.0, 16.0)))], NOW);

    assert_eq!(report.removed, 1);
    assert!(layer.get("a").is_none());
    assert!(!surface.borrow().contains("a"));

    layer.update_all(batch(&["a", "b"]), NOW);
    assert_eq!(layer.serial("a"), Some(2));
}

#[test]
fn empty_batch_removes_everything() {
    let (mut layer, surface) = incident_layer();
    layer.update_all(batch(&["a", "b"]), NOW);
    let report = layer.update_all(Vec::new(), NOW);
    assert_eq!(report.removed, 2);
    assert!(layer.is_empty());
    assert!(surface.borrow().is_empty());
}

#[test]
fn remove_unknown_id_is_noop() {
    let (mut layer, _surface) = incident_layer();
    assert!(!layer.remove("ghost"));
}

#[test]
fn events_reach_attached_markers_only() {
    let (mut layer, surface) = incident_layer();
    layer.update_all(batch(&["a"]), NOW);
    assert!(layer.handle_event("a", MarkerEvent::MouseOver));
    assert_eq!(surface.borrow().get("a").map(|v| v.lines_visible), Some(true));
    assert!(!layer.handle_event("ghost", MarkerEvent::MouseOver));
}

#[test]
fn timers_follow_attachment() {
    let (mut layer, _surface) = unit_layer();
    layer.update_all(vec![unit("u1"), unit("u2")], NOW);
    assert_eq!(layer.active_timers(), 2);

    layer.update_all(vec![unit("u1")], NOW);
    assert_eq!(layer.active_timers(), 1);

    layer.clear();
    assert_eq!(layer.active_timers(), 0);
    assert!(layer.is_empty());
}

#[test]
fn tick_redraws_fading_markers() {
    let (mut layer, surface) = unit_layer();
    let mut fresh = unit("u1");
    fresh.online = true;
    fresh.unit.current_position = Some(crate::model::Position {
        latitude: 48.0,
        longitude: 16.0,
        timestamp: "2024-03-01T12:00:00Z".into(),
        accuracy: None,
        heading: None,
        speed: None,
    });
    layer.update_all(vec![fresh], NOW);

    assert_eq!(layer.tick(NOW + Duration::seconds(5)), 0);
    assert_eq!(layer.tick(NOW + Duration::seconds(30)), 1);
    let opacity = surface.borrow().get("u1").map(|v| v.fill_opacity);
    assert!(opacity.is_some_and(|o| (o - 0.8).abs() < 1e-9));
}

#[test]
fn swapping_surface_moves_markers() {
    let (mut layer, plain) = incident_layer();
    layer.update_all(batch(&["a", "b"]), NOW);
    let before = layer.serial("a");

    let other = RecordingSurface::<IncidentView>::shared();
    let previous = layer.set_surface(Box::new(Rc::clone(&other)), NOW);

    assert!(plain.borrow().is_empty());
    assert_eq!(other.borrow().ids(), ["a", "b"]);
    assert_eq!(layer.serial("a"), before);
    drop(previous);
}

#[test]
fn highlight_collects_bounds_of_matches() {
    let (mut layer, surface) = incident_layer();
    layer.update_all(vec![incident("a", Some((48.0, 16.0))), incident("b", Some((47.0, 15.0)))], NOW);

    let bounds = layer.highlight(&|text: &str| text.ends_with('a'));

    assert_eq!(bounds.center(), Some(LatLng::new(48.0, 16.0)));
    assert_eq!(surface.borrow().get("a").map(|v| v.highlighted), Some(true));
    assert_eq!(surface.borrow().get("b").map(|v| v.highlighted), Some(false));
}
