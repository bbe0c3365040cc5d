//! Error types for path queries and ingestion. All are returned as values;
//! the page turns them into status-bar messages.

use thiserror::Error;

/// Why a path query produced no path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
	/// The start identity is not a node in the graph.
	#[error("start node not found: {0}")]
	StartNotFound(String),

	/// No node satisfies the high-value predicate.
	#[error("no high-value target node in the graph")]
	TargetNotFound,

	/// Both ends exist but the target is unreachable.
	#[error("no path from {start} to {target}")]
	NoPath {
		/// Normalized start identity.
		start: String,
		/// The high-value node that was searched for.
		target: String,
	},
}

/// Ingestion failures.
#[derive(Error, Debug)]
pub enum IngestError {
	/// A record has neither a display name nor an object identifier. Skipped.
	#[error("malformed record in {category}: no name or object identifier")]
	MalformedRecord {
		/// Category hint of the offending record.
		category: String,
	},

	/// A document is not valid JSON.
	#[error("failed to parse {file}: {source}")]
	Json {
		/// Document name.
		file: String,
		/// Parser error.
		#[source]
		source: serde_json::Error,
	},

	/// A selected file or one of its archive entries could not be read.
	#[error("failed to read {file}: {reason}")]
	ArchiveRead {
		/// Selected file, or `archive/entry` for a bad entry.
		file: String,
		/// What the reader reported.
		reason: String,
	},
}
