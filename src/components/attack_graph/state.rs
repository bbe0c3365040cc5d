use log::{info, warn};

use super::config::GraphConfig;
use super::error::{IngestError, PathError};
use super::ingest::{IngestReport, RawRecord, decode_document, ingest_records};
use super::path::find_path_to_high_value;
use super::store::{GraphStore, Placement};
use super::types::{Edge, canonical};
use super::viewport::{PointerEvent, Response, Viewport};

/// Status line of an empty explorer.
pub const READY_STATUS: &str = "Ready. Load a SharpHound ZIP to begin.";

/// Everything one graph view needs: the store, the viewport, the current
/// selection and the status line. Handlers and the renderer take it
/// explicitly.
pub struct AppState {
	/// Settings the store and viewport were built from.
	pub config: GraphConfig,
	/// The loaded graph.
	pub store: GraphStore,
	/// Zoom, pan and the current gesture.
	pub viewport: Viewport,
	/// Most recent search result, start first. Empty when there is none.
	pub selected_path: Vec<String>,
	/// Node shown in the detail panel.
	pub inspected: Option<String>,
	/// Status-bar text.
	pub status: String,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
}

impl AppState {
	/// Empty graph, identity viewport, ready status.
	pub fn new(config: GraphConfig, placement: impl Placement + 'static) -> Self {
		Self {
			store: GraphStore::new(&config, placement),
			viewport: Viewport::new(&config),
			config,
			selected_path: Vec::new(),
			inspected: None,
			status: READY_STATUS.into(),
			width: 0.0,
			height: 0.0,
		}
	}

	/// Replaces the dataset with the given `(file name, contents)` documents.
	///
	/// Every document is decoded before the current graph is touched, so a
	/// decode failure leaves the previous dataset in place.
	pub fn load<'a>(
		&mut self,
		documents: impl IntoIterator<Item = (&'a str, &'a str)>,
	) -> Result<IngestReport, IngestError> {
		let mut records: Vec<RawRecord> = Vec::new();
		for (file_name, text) in documents {
			match decode_document(file_name, text) {
				Ok(decoded) => records.extend(decoded),
				Err(e) => {
					warn!("load aborted: {e}");
					self.status = format!("Error: {e}");
					return Err(e);
				}
			}
		}

		self.clear();
		let report = ingest_records(&mut self.store, &records);
		self.status = format!("Loaded {} objects.", self.store.len());
		Ok(report)
	}

	/// Reports a reader failure without touching the graph.
	pub fn load_failed(&mut self, err: IngestError) {
		warn!("load failed: {err}");
		self.status = format!("Error: {err}");
	}

	/// Empties the graph and the selection.
	pub fn clear(&mut self) {
		self.store.clear();
		self.selected_path.clear();
		self.inspected = None;
		self.viewport.interaction = Default::default();
		self.status = READY_STATUS.into();
		info!("graph cleared");
	}

	/// Searches from `start` to the nearest high-value node and selects the
	/// result. A failed search clears the previous selection.
	pub fn find_path(&mut self, start: &str) -> Result<&[String], PathError> {
		match find_path_to_high_value(&self.store, start) {
			Ok(path) => {
				self.selected_path = path;
				self.status = "ATTACK PATH FOUND".into();
				Ok(&self.selected_path)
			}
			Err(e) => {
				info!("path search from {start}: {e}");
				self.selected_path.clear();
				self.status = match &e {
					PathError::StartNotFound(_) | PathError::TargetNotFound => {
						"Check start node name and ensure Domain Admins exists.".into()
					}
					PathError::NoPath { .. } => "No path found.".into(),
				};
				Err(e)
			}
		}
	}

	/// Routes a pointer event through the viewport and mirrors the outcome
	/// into the selection and status line.
	pub fn pointer(&mut self, event: PointerEvent) -> Response {
		let response = self.viewport.handle(&mut self.store, event);
		match &response {
			Response::Grabbed(node) => self.inspected = Some(node.clone()),
			Response::Hover(Some(node)) => {
				self.status = format!("Object: {node} | Click to view full JSON properties.");
			}
			_ => {}
		}
		response
	}

	/// Whether `identity` is on the selected path.
	pub fn is_path_node(&self, identity: &str) -> bool {
		self.selected_path.iter().any(|n| n == identity)
	}

	/// Whether `edge` joins two consecutive nodes of the selected path.
	pub fn is_path_edge(&self, edge: &Edge) -> bool {
		self.selected_path
			.windows(2)
			.any(|w| w[0] == edge.from && w[1] == edge.to)
	}

	/// Detail-panel text for a node: its name, a rule, then the raw record.
	pub fn details(&self, identity: &str) -> Option<String> {
		let node = self.store.node(identity)?;
		let pretty = serde_json::to_string_pretty(&node.attributes).unwrap_or_default();
		Some(format!("NAME: {}\n{}\n{}", canonical(identity), "=".repeat(30), pretty))
	}

	/// Records the new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
