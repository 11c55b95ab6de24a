//! Polling loop: fetch, reconcile, fade.
//!
//! DESIGN
//! ======
//! Two tickers share one task. The refresh ticker fetches a snapshot and
//! applies it to the [`LiveMap`]; the fade ticker fires due marker timers.
//! Fetches are awaited inside the loop, so passes never overlap and the most
//! recently completed response is the one on the map. Missed ticks are
//! skipped rather than bunched up after a slow request.
//!
//! ERROR HANDLING
//! ==============
//! A failed fetch keeps the previous markers and the loop carries on; only
//! the shutdown future ends it.

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;

use std::future::Future;
use std::time::Duration;

use livemap::live::{LiveMap, PassReport};
use livemap::model::Scope;
use time::OffsetDateTime;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::api::ApiClient;

/// Period of the fade ticker. Fade intervals are much longer, so this only
/// bounds how late a fade step shows up.
pub const FADE_TICK: Duration = Duration::from_secs(1);

/// Where snapshots come from.
pub trait SnapshotSource {
    fn fetch(&self) -> impl Future<Output = Option<Scope>>;
}

impl SnapshotSource for ApiClient {
    async fn fetch(&self) -> Option<Scope> {
        self.get_scope().await
    }
}

/// Fetch one snapshot and apply it.
pub async fn poll_once<S: SnapshotSource>(source: &S, map: &mut LiveMap) -> Option<PassReport> {
    let snapshot = source.fetch().await;
    let report = map.apply(snapshot, OffsetDateTime::now_utc());
    match report {
        Some(report) => info!(
            units_created = report.units.created,
            units_updated = report.units.updated,
            units_removed = report.units.removed,
            incidents_created = report.incidents.created,
            incidents_updated = report.incidents.updated,
            incidents_removed = report.incidents.removed,
            visible_units = report.visible_units,
            visible_incidents = report.visible_incidents,
            "snapshot applied: {}",
            report.summary()
        ),
        None => debug!("no snapshot; keeping markers"),
    }
    report
}

/// Poll every `refresh` until `shutdown` completes. Returns the number of
/// applied passes.
pub async fn run<S, F>(source: &S, map: &mut LiveMap, refresh: Duration, shutdown: F) -> usize
where
    S: SnapshotSource,
    F: Future<Output = ()>,
{
    let mut refresh_ticker = tokio::time::interval(refresh);
    refresh_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut fade_ticker = tokio::time::interval(FADE_TICK);
    fade_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(refresh_ms = refresh.as_millis(), "polling started");
    let mut applied = 0;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!(applied, "polling stopped");
                break;
            }
            _ = refresh_ticker.tick() => {
                if poll_once(source, map).await.is_some() {
                    applied += 1;
                }
            }
            _ = fade_ticker.tick() => {
                let redrawn = map.tick(OffsetDateTime::now_utc());
                if redrawn > 0 {
                    debug!(redrawn, "markers faded");
                }
            }
        }
    }
    applied
}
