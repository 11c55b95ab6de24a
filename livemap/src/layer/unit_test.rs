use std::rc::Rc;

use time::macros::datetime;

use super::*;
use crate::geo::LatLng;
use crate::model::Unit;
use crate::surface::RecordingSurface;

const NOW: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);

fn unit(id: &str, name: &str, available: bool, latlng: (f64, f64)) -> ExtendedUnit {
    ExtendedUnit {
        unit: Unit {
            id: id.into(),
            name: Some(name.into()),
            last_point: None,
            target_point: None,
            current_position: None,
            is_available_for_dispatching: available,
        },
        latlng: Some(LatLng::new(latlng.0, latlng.1)),
        latlng_last: None,
        latlng_next: None,
        online: false,
        is_self: false,
        has_blue: false,
        color_fill: "gray".into(),
        color_outline: "lightgray".into(),
    }
}

fn units() -> Vec<ExtendedUnit> {
    vec![unit("free", "RTW 1", true, (48.0, 16.0)), unit("busy", "NEF 2", false, (48.2, 16.4))]
}

#[test]
fn hide_busy_units_toggles_without_recreating() {
    let surface = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&surface)));
    layer.update_all(units(), NOW);
    let free = layer.serial("free");
    let busy = layer.serial("busy");

    layer.set_hide_busy_units(true, NOW);
    assert_eq!(surface.borrow().ids(), ["free"]);
    assert!(!layer.is_attached("busy"));
    assert!(!layer.get("busy").is_some_and(|m| m.timer_active()));

    layer.set_hide_busy_units(false, NOW);
    assert_eq!(surface.borrow().ids(), ["busy", "free"]);
    assert_eq!(layer.serial("free"), free);
    assert_eq!(layer.serial("busy"), busy);
}

#[test]
fn hidden_units_stay_tracked_across_updates() {
    let surface = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&surface)));
    layer.set_hide_busy_units(true, NOW);

    let report = layer.update_all(units(), NOW);

    assert_eq!(report.created, 2);
    assert_eq!(layer.len(), 2);
    assert_eq!(surface.borrow().ids(), ["free"]);
}

#[test]
fn unit_becoming_busy_is_hidden_on_update() {
    let surface = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&surface)));
    layer.set_hide_busy_units(true, NOW);
    layer.update_all(units(), NOW);

    layer.update_all(vec![unit("free", "RTW 1", false, (48.0, 16.0))], NOW);

    assert!(surface.borrow().is_empty());
    assert!(layer.get("free").is_some());
}

#[test]
fn clustering_moves_markers_between_surfaces() {
    let plain = RecordingSurface::<UnitView>::shared();
    let cluster = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&plain)));
    layer.set_cluster_surface(Box::new(Rc::clone(&cluster)));
    layer.update_all(units(), NOW);
    let free = layer.serial("free");

    assert!(layer.set_cluster_units(true, NOW));
    assert_eq!(layer.kind().grouping(), Grouping::Clustered);
    assert!(plain.borrow().is_empty());
    assert_eq!(cluster.borrow().ids(), ["busy", "free"]);
    assert_eq!(layer.serial("free"), free);

    assert!(layer.set_cluster_units(false, NOW));
    assert!(cluster.borrow().is_empty());
    assert_eq!(plain.borrow().ids(), ["busy", "free"]);
}

#[test]
fn clustering_respects_busy_filter() {
    let plain = RecordingSurface::<UnitView>::shared();
    let cluster = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&plain)));
    layer.set_cluster_surface(Box::new(Rc::clone(&cluster)));
    layer.set_hide_busy_units(true, NOW);
    layer.update_all(units(), NOW);

    layer.set_cluster_units(true, NOW);

    assert_eq!(cluster.borrow().ids(), ["free"]);
}

#[test]
fn clustering_without_surface_is_refused() {
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(RecordingSurface::<UnitView>::new()));
    assert!(!layer.set_cluster_units(true, NOW));
    assert_eq!(layer.kind().grouping(), Grouping::Plain);
    assert!(layer.set_cluster_units(false, NOW));
}

#[test]
fn search_highlights_and_bounds_matches() {
    let surface = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&surface)));
    layer.update_all(units(), NOW);

    let bounds = layer.search("rtw");

    assert_eq!(bounds.center(), Some(LatLng::new(48.0, 16.0)));
    assert_eq!(surface.borrow().get("free").map(|v| v.highlighted), Some(true));
    assert_eq!(surface.borrow().get("busy").map(|v| v.highlighted), Some(false));
}

#[test]
fn empty_search_clears_highlights() {
    let surface = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&surface)));
    layer.update_all(units(), NOW);
    layer.search("nef");

    let bounds = layer.search("  ");

    assert!(bounds.is_empty());
    assert_eq!(surface.borrow().get("busy").map(|v| v.highlighted), Some(false));
}

#[test]
fn active_search_applies_to_new_units() {
    let surface = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&surface)));
    layer.search("nef");

    layer.update_all(units(), NOW);

    assert_eq!(surface.borrow().get("busy").map(|v| v.highlighted), Some(true));
    assert_eq!(layer.kind().search_term(), "nef");
}

#[test]
fn unhidden_unit_is_drawn_with_current_fade() {
    let surface = RecordingSurface::<UnitView>::shared();
    let mut layer = UnitLayer::new(UnitKind::default(), Box::new(Rc::clone(&surface)));
    let mut busy = unit("busy", "NEF 2", false, (48.2, 16.4));
    busy.online = true;
    busy.unit.current_position = Some(crate::model::Position {
        latitude: 48.2,
        longitude: 16.4,
        timestamp: "2024-03-01T12:00:00Z".into(),
        accuracy: None,
        heading: None,
        speed: None,
    });
    layer.update_all(vec![busy], NOW);
    layer.set_hide_busy_units(true, NOW);

    layer.set_hide_busy_units(false, NOW + time::Duration::seconds(45));

    let opacity = surface.borrow().get("busy").map(|v| v.fill_opacity);
    assert!(opacity.is_some_and(|o| (o - 0.7).abs() < 1e-9));
}
