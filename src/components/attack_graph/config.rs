use serde::Deserialize;

use super::types::Point;

/// Tunables for the attack graph. `Default` matches the stock viewer.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
	/// Identities containing this (upper-cased) marker are high-value targets.
	pub high_value_marker: String,
	/// Center of the initial placement ring, in world space.
	pub origin: Point,
	/// Inner radius of the placement ring.
	pub min_radius: f64,
	/// Outer radius of the placement ring.
	pub max_radius: f64,
	/// Drawn node radius at zoom 1.0. Also the hit-test radius.
	pub node_radius: f64,
	/// Zoom factor applied per wheel notch up.
	pub zoom_in_step: f64,
	/// Zoom factor applied per wheel notch down.
	pub zoom_out_step: f64,
	/// Optional `(min, max)` clamp for the zoom factor. `None` leaves zoom unbounded.
	pub zoom_bounds: Option<(f64, f64)>,
	/// Edge labels are only drawn above this zoom factor.
	pub label_zoom_threshold: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			high_value_marker: "DOMAIN ADMINS".into(),
			origin: Point::new(600.0, 400.0),
			min_radius: 100.0,
			max_radius: 450.0,
			node_radius: 15.0,
			zoom_in_step: 1.1,
			zoom_out_step: 0.9,
			zoom_bounds: None,
			label_zoom_threshold: 0.6,
		}
	}
}
