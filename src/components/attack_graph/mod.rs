//! Attack graph engine: node/edge store, collector ingestion, shortest-path
//! search, and the canvas viewport that draws and manipulates it.

mod archive;
mod component;
mod config;
mod error;
mod ingest;
mod path;
mod render;
mod state;
mod store;
mod types;
mod viewport;

pub use archive::{is_archive, unpack_archive};
pub use component::AttackGraphCanvas;
pub use config::GraphConfig;
pub use error::{IngestError, PathError};
pub use ingest::{
	AceRef, IngestReport, MemberRef, RawRecord, decode_document, ingest_record, ingest_records,
	kind_for_category,
};
pub use path::{find_path, find_path_to_high_value};
pub use render::{COMPUTER_COLOR, GROUP_COLOR, HIGH_VALUE_COLOR, USER_COLOR};
pub use state::{AppState, READY_STATUS};
pub use store::{FixedPlacement, GraphStore, Placement, RingPlacement};
pub use types::{Edge, Node, NodeKind, Point, canonical};
pub use viewport::{Interaction, PointerButton, PointerEvent, Response, Viewport, WheelDirection};
