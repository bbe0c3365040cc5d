//! Turns collector output into graph mutations.
//!
//! Decoding is lenient: a document only has to be JSON with an optional
//! top-level `data` array, and every field inside a record is optional.
//! Records that cannot be named are skipped and counted, never fatal.

use std::ops::AddAssign;

use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::IngestError;
use super::store::GraphStore;
use super::types::NodeKind;

const MEMBER_OF: &str = "MemberOf";

/// A group member reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRef {
	/// The member's `ObjectIdentifier`.
	pub object_identifier: String,
}

/// One access-control entry: `principal` holds `right` over the record's object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AceRef {
	/// Who holds the right.
	pub principal_name: String,
	/// Declared class of the principal, if any.
	pub principal_type: Option<String>,
	/// Right name, used as the edge label.
	pub right_name: String,
}

/// One directory object as read from a collector document.
#[derive(Clone, Debug, Default)]
pub struct RawRecord {
	/// Category hint, usually the source file name (`..._users.json`).
	pub category: String,
	/// `Properties.name`.
	pub name: Option<String>,
	/// `ObjectIdentifier`.
	pub object_identifier: Option<String>,
	/// `Members`, for groups.
	pub members: Vec<MemberRef>,
	/// `Aces`.
	pub aces: Vec<AceRef>,
	/// The whole record, kept for the detail view.
	pub raw: Map<String, Value>,
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
	value
		.and_then(Value::as_str)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
}

fn objects<'a>(record: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
	record
		.get(key)
		.and_then(Value::as_array)
		.into_iter()
		.flatten()
		.filter_map(Value::as_object)
}

impl RawRecord {
	/// Reads the fields the normalizer cares about out of a collector record.
	///
	/// Non-object values produce an empty record, which the normalizer skips.
	pub fn from_value(category: &str, value: Value) -> Self {
		let Value::Object(raw) = value else {
			return Self {
				category: category.to_string(),
				..Self::default()
			};
		};

		let name = non_empty_str(raw.get("Properties").and_then(|p| p.get("name")));
		let object_identifier = non_empty_str(raw.get("ObjectIdentifier"));
		let members = objects(&raw, "Members")
			.map(|m| MemberRef {
				object_identifier: non_empty_str(m.get("ObjectIdentifier")).unwrap_or_default(),
			})
			.collect();
		let aces = objects(&raw, "Aces")
			.map(|ace| AceRef {
				principal_name: non_empty_str(ace.get("PrincipalName")).unwrap_or_default(),
				principal_type: non_empty_str(ace.get("PrincipalType")),
				right_name: non_empty_str(ace.get("RightName")).unwrap_or_default(),
			})
			.collect();

		Self {
			category: category.to_string(),
			name,
			object_identifier,
			members,
			aces,
			raw,
		}
	}

	/// Display name, falling back to the object identifier.
	pub fn identity(&self) -> Option<&str> {
		self.name.as_deref().or(self.object_identifier.as_deref())
	}
}

/// Node kind implied by a category hint. Anything that is neither a user nor
/// a group file is treated as a computer.
pub fn kind_for_category(category: &str) -> NodeKind {
	let category = category.to_lowercase();
	if category.contains("user") {
		NodeKind::User
	} else if category.contains("group") {
		NodeKind::Group
	} else {
		NodeKind::Computer
	}
}

/// Counters for one ingestion pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
	/// Records seen, skipped ones included.
	pub records: usize,
	/// Records without a usable identity.
	pub skipped: usize,
	/// Nodes created by the pass.
	pub nodes_created: usize,
	/// Edges created by the pass.
	pub edges_created: usize,
}

impl AddAssign for IngestReport {
	fn add_assign(&mut self, rhs: Self) {
		self.records += rhs.records;
		self.skipped += rhs.skipped;
		self.nodes_created += rhs.nodes_created;
		self.edges_created += rhs.edges_created;
	}
}

/// Applies one record to the store.
///
/// Member principals are always created as `User`; ACE principals use their
/// declared type and default to `User`.
pub fn ingest_record(store: &mut GraphStore, record: &RawRecord) -> Result<IngestReport, IngestError> {
	let Some(identity) = record.identity() else {
		return Err(IngestError::MalformedRecord {
			category: record.category.clone(),
		});
	};

	let mut report = IngestReport {
		records: 1,
		..IngestReport::default()
	};
	let kind = kind_for_category(&record.category);
	report.nodes_created += usize::from(store.upsert_node(identity, kind, Some(record.raw.clone())));

	for member in record.members.iter().filter(|m| !m.object_identifier.is_empty()) {
		let member = member.object_identifier.as_str();
		report.nodes_created += usize::from(store.upsert_node(member, NodeKind::User, None));
		report.edges_created += usize::from(store.add_edge(member, identity, MEMBER_OF));
	}

	for ace in &record.aces {
		if ace.principal_name.is_empty() || ace.right_name.is_empty() {
			continue;
		}
		let kind = ace
			.principal_type
			.as_deref()
			.map(NodeKind::from_type_name)
			.unwrap_or(NodeKind::User);
		report.nodes_created += usize::from(store.upsert_node(&ace.principal_name, kind, None));
		report.edges_created +=
			usize::from(store.add_edge(&ace.principal_name, identity, &ace.right_name));
	}

	Ok(report)
}

#[derive(Deserialize)]
struct Document {
	#[serde(default)]
	data: Vec<Value>,
}

/// Decodes one collector document into records.
///
/// Files without a `.json` extension yield no records; the category of every
/// record is the file name.
pub fn decode_document(file_name: &str, text: &str) -> Result<Vec<RawRecord>, IngestError> {
	if !file_name.to_lowercase().ends_with(".json") {
		return Ok(Vec::new());
	}
	let doc: Document = serde_json::from_str(text).map_err(|source| IngestError::Json {
		file: file_name.to_string(),
		source,
	})?;
	Ok(doc
		.data
		.into_iter()
		.map(|value| RawRecord::from_value(file_name, value))
		.collect())
}

/// Applies records in order, skipping (and counting) malformed ones.
pub fn ingest_records<'a>(
	store: &mut GraphStore,
	records: impl IntoIterator<Item = &'a RawRecord>,
) -> IngestReport {
	let mut report = IngestReport::default();
	for record in records {
		match ingest_record(store, record) {
			Ok(r) => report += r,
			Err(e) => {
				warn!("{e}");
				report.records += 1;
				report.skipped += 1;
			}
		}
	}
	info!(
		"ingested {} records ({} skipped): +{} nodes, +{} edges",
		report.records, report.skipped, report.nodes_created, report.edges_created
	);
	report
}
