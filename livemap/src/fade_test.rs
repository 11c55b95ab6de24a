#![allow(clippy::float_cmp)]

use time::macros::datetime;

use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fresh_marker_is_fully_opaque() {
    assert_eq!(opacity(&FadeOptions::default(), Duration::ZERO), 1.0);
}

#[test]
fn partial_interval_does_not_fade() {
    assert_eq!(opacity(&FadeOptions::default(), Duration::milliseconds(14_999)), 1.0);
}

#[test]
fn fades_one_step_per_full_interval() {
    let options = FadeOptions::default();
    assert!(approx(opacity(&options, Duration::seconds(15)), 0.9));
    assert!(approx(opacity(&options, Duration::seconds(29)), 0.9));
    assert!(approx(opacity(&options, Duration::seconds(75)), 0.5));
}

#[test]
fn clamps_at_floor() {
    let options = FadeOptions::default();
    assert_eq!(opacity(&options, Duration::seconds(15 * 7)), 0.3);
    assert_eq!(opacity(&options, Duration::seconds(15 * 10)), 0.3);
    assert_eq!(opacity(&options, Duration::hours(24)), 0.3);
}

#[test]
fn never_goes_negative() {
    let options = FadeOptions { min_opacity: 0.0, ..FadeOptions::default() };
    assert_eq!(opacity(&options, Duration::hours(1)), 0.0);
}

#[test]
fn negative_elapsed_counts_as_zero() {
    assert_eq!(opacity(&FadeOptions::default(), Duration::seconds(-60)), 1.0);
}

#[test]
fn timer_fires_once_per_interval() {
    let start = datetime!(2024-03-01 10:00 UTC);
    let mut timer = FadeTimer::start(start, Duration::seconds(15));
    assert!(!timer.fire(start + Duration::seconds(14)));
    assert!(timer.fire(start + Duration::seconds(15)));
    assert!(!timer.fire(start + Duration::seconds(16)));
    assert_eq!(timer.next_due(), start + Duration::seconds(30));
}

#[test]
fn timer_coalesces_missed_ticks() {
    let start = datetime!(2024-03-01 10:00 UTC);
    let mut timer = FadeTimer::start(start, Duration::seconds(15));
    assert!(timer.fire(start + Duration::minutes(5)));
    assert!(!timer.fire(start + Duration::minutes(5) + Duration::seconds(1)));
}
