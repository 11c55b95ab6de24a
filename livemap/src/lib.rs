//! Marker and layer synchronization engine for the live dispatch map.
//!
//! The host polls a backend for a full snapshot of units and incidents. This
//! crate turns each snapshot into enriched entities, reconciles them against
//! the live marker set of each layer, and derives everything a renderer needs
//! to draw: colors, opacity, icons, highlight state and the relationship lines
//! between units, incidents and their targets. It does not draw anything
//! itself; rendering is delegated to a [`surface::Surface`] supplied by the host.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Wire entities (`Unit`, `Incident`, `Scope`) and their extended forms |
//! | [`scope`] | Data reconciliation service: snapshot to extended scope, callbacks |
//! | [`marker`] | Dynamic markers for units and incidents |
//! | [`layer`] | Dynamic layers: create/update/remove diff and visibility policy |
//! | [`live`] | [`live::LiveMap`] facade wiring the service to both layers |
//! | [`icons`] | Memoized incident icons |
//! | [`fade`] | Opacity step function and the per-marker fade timer |
//! | [`overlay`] | Relationship lines and their hover/popup visibility |
//! | [`surface`] | Rendering surface trait and an in-memory implementation |
//! | [`style`] | Color constants and the unit color table |
//! | [`geo`] | Map coordinates and bounds |
//! | [`timestamp`] | API timestamp parsing and ages |
//! | [`text`] | Popup text formatting |

pub mod fade;
pub mod geo;
pub mod icons;
pub mod layer;
pub mod live;
pub mod marker;
pub mod model;
pub mod overlay;
pub mod scope;
pub mod style;
pub mod surface;
pub mod text;
pub mod timestamp;
