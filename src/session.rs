//! Per-user session flags.
//!
//! The session identifies the unit the client runs as and carries the view
//! toggles chosen at startup. It is built from command-line flags, each with
//! a `GEOCLIENT_*` environment fallback.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Id of the unit this client is authenticated as.
    pub id: Option<String>,
    pub token: Option<String>,
    /// Dispatch-center view: no own position and map controls for all units.
    pub center_mode: bool,
    /// Send own position even in center mode.
    pub send_location: bool,
    pub hide_busy_units: bool,
    pub cluster_units: bool,
    pub debug: bool,
}

impl Session {
    /// Unit id, if set and non-empty.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Token, if set and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    /// True iff both id and token are set.
    #[must_use]
    pub fn authenticated(&self) -> bool {
        self.id().is_some() && self.token().is_some()
    }

    /// True iff the client should obtain and broadcast its own location.
    #[must_use]
    pub fn do_locate(&self) -> bool {
        self.send_location || !self.center_mode
    }

    /// Busy-unit filter; only offered in center mode.
    #[must_use]
    pub fn effective_hide_busy_units(&self) -> bool {
        self.center_mode && self.hide_busy_units
    }

    /// Unit clustering; only offered in center mode.
    #[must_use]
    pub fn effective_cluster_units(&self) -> bool {
        self.center_mode && self.cluster_units
    }
}
