use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use indexmap::IndexMap;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use super::config::GraphConfig;
use super::types::{Edge, Node, NodeKind, Point, canonical};

/// Chooses the world position of a newly created node.
pub trait Placement {
	/// Position for the next node.
	fn place(&mut self) -> Point;
}

/// Uniform random point on an annulus around `origin`.
pub struct RingPlacement {
	origin: Point,
	min_radius: f64,
	max_radius: f64,
	rng: StdRng,
}

impl RingPlacement {
	/// Ring from `config`, radii in either order.
	pub fn new(config: &GraphConfig, seed: u64) -> Self {
		Self {
			origin: config.origin,
			min_radius: config.min_radius.min(config.max_radius),
			max_radius: config.max_radius.max(config.min_radius),
			rng: StdRng::seed_from_u64(seed),
		}
	}
}

impl Placement for RingPlacement {
	fn place(&mut self) -> Point {
		let angle = self.rng.gen_range(0.0..TAU);
		let dist = self.rng.gen_range(self.min_radius..=self.max_radius);
		self.origin + Point::new(dist * angle.cos(), dist * angle.sin())
	}
}

/// Places every node at the same point.
pub struct FixedPlacement(pub Point);

impl Placement for FixedPlacement {
	fn place(&mut self) -> Point {
		self.0
	}
}

/// Authoritative node and edge set for one loaded dataset.
///
/// Nodes iterate in insertion order, so "the first node matching a
/// predicate" is stable for an unchanged graph.
pub struct GraphStore {
	nodes: IndexMap<String, Node>,
	edges: Vec<Edge>,
	edge_index: HashSet<Edge>,
	outgoing: HashMap<String, Vec<usize>>,
	high_value_marker: String,
	placement: Box<dyn Placement>,
}

impl GraphStore {
	/// Empty store.
	pub fn new(config: &GraphConfig, placement: impl Placement + 'static) -> Self {
		Self {
			nodes: IndexMap::new(),
			edges: Vec::new(),
			edge_index: HashSet::new(),
			outgoing: HashMap::new(),
			high_value_marker: canonical(&config.high_value_marker),
			placement: Box::new(placement),
		}
	}

	/// Creates the node if absent, otherwise merges `raw` into its attributes.
	///
	/// `kind`, position and the high-value flag are fixed by the first call.
	/// Returns `true` when a node was created.
	pub fn upsert_node(
		&mut self,
		identity: &str,
		kind: NodeKind,
		raw: Option<Map<String, Value>>,
	) -> bool {
		let identity = canonical(identity);
		if let Some(node) = self.nodes.get_mut(&identity) {
			if let Some(raw) = raw {
				node.attributes.extend(raw);
			}
			return false;
		}

		let node = Node {
			is_high_value: identity.contains(&self.high_value_marker),
			position: self.placement.place(),
			attributes: raw.unwrap_or_default(),
			identity: identity.clone(),
			kind,
		};
		if node.is_high_value {
			debug!("high-value node {identity}");
		}
		self.nodes.insert(identity, node);
		true
	}

	/// Appends the edge unless the same (from, to, label) triple exists.
	///
	/// Endpoints need not exist yet; edges to unknown nodes are skipped by
	/// search and rendering. Returns `true` when an edge was inserted.
	pub fn add_edge(&mut self, from: &str, to: &str, label: &str) -> bool {
		let edge = Edge {
			from: canonical(from),
			to: canonical(to),
			label: label.to_string(),
		};
		if self.edge_index.contains(&edge) {
			return false;
		}
		self.outgoing
			.entry(edge.from.clone())
			.or_default()
			.push(self.edges.len());
		self.edge_index.insert(edge.clone());
		self.edges.push(edge);
		true
	}

	/// Removes every node and edge.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.edge_index.clear();
		self.outgoing.clear();
	}

	/// Lookup by identity in any case.
	pub fn node(&self, identity: &str) -> Option<&Node> {
		self.nodes.get(&canonical(identity))
	}

	/// Mutable lookup, for drags.
	pub fn node_mut(&mut self, identity: &str) -> Option<&mut Node> {
		self.nodes.get_mut(&canonical(identity))
	}

	/// Whether a node with this identity exists.
	pub fn contains(&self, identity: &str) -> bool {
		self.nodes.contains_key(&canonical(identity))
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
		self.nodes.values()
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Edges leaving `identity`, in insertion order.
	pub fn outgoing(&self, identity: &str) -> impl Iterator<Item = &Edge> {
		self.outgoing
			.get(&canonical(identity))
			.into_iter()
			.flatten()
			.map(|&i| &self.edges[i])
	}

	/// Node count.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the store has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Edge count.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn store() -> GraphStore {
		GraphStore::new(&GraphConfig::default(), FixedPlacement(Point::new(1.0, 2.0)))
	}

	fn map(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => unreachable!(),
		}
	}

	#[test]
	fn first_kind_wins() {
		let mut g = store();
		assert!(g.upsert_node("alice", NodeKind::User, None));
		assert!(!g.upsert_node("ALICE", NodeKind::Group, None));
		assert_eq!(g.len(), 1);
		assert_eq!(g.node("Alice").unwrap().kind, NodeKind::User);
	}

	#[test]
	fn attributes_merge_last_write_wins() {
		let mut g = store();
		g.upsert_node("x", NodeKind::Computer, Some(map(json!({ "a": 1, "b": 2 }))));
		g.upsert_node("X", NodeKind::User, Some(map(json!({ "b": 3, "c": [1, 2] }))));
		let node = g.node("x").unwrap();
		assert_eq!(node.attributes.get("a"), Some(&json!(1)));
		assert_eq!(node.attributes.get("b"), Some(&json!(3)));
		assert_eq!(node.attributes.get("c"), Some(&json!([1, 2])));
		assert_eq!(node.kind, NodeKind::Computer);
	}

	#[test]
	fn position_sampled_once() {
		let config = GraphConfig::default();
		let mut g = GraphStore::new(&config, RingPlacement::new(&config, 7));
		g.upsert_node("a", NodeKind::User, None);
		let before = g.node("a").unwrap().position;
		g.upsert_node("a", NodeKind::User, Some(Map::new()));
		assert_eq!(g.node("a").unwrap().position, before);
	}

	#[test]
	fn ring_placement_stays_on_annulus() {
		let config = GraphConfig::default();
		let mut ring = RingPlacement::new(&config, 42);
		for _ in 0..500 {
			let d = ring.place().distance(config.origin);
			assert!(d >= config.min_radius - 1e-9 && d <= config.max_radius + 1e-9, "{d}");
		}
	}

	#[test]
	fn high_value_flag() {
		let mut g = store();
		g.upsert_node("domain admins@corp.local", NodeKind::Group, None);
		g.upsert_node("DOMAIN USERS@CORP.LOCAL", NodeKind::Group, None);
		g.upsert_node("DOMAIN ADMIN", NodeKind::User, None);
		assert!(g.node("DOMAIN ADMINS@CORP.LOCAL").unwrap().is_high_value);
		assert!(!g.node("DOMAIN USERS@CORP.LOCAL").unwrap().is_high_value);
		assert!(!g.node("DOMAIN ADMIN").unwrap().is_high_value);
	}

	#[test]
	fn duplicate_edges_collapse() {
		let mut g = store();
		assert!(g.add_edge("a", "b", "MemberOf"));
		assert!(!g.add_edge("A", "B", "MemberOf"));
		assert!(g.add_edge("a", "b", "GenericAll"));
		assert!(g.add_edge("b", "a", "MemberOf"));
		assert_eq!(g.edge_count(), 3);
		let labels: Vec<_> = g.outgoing("a").map(|e| e.label.as_str()).collect();
		assert_eq!(labels, ["MemberOf", "GenericAll"]);
	}

	#[test]
	fn clear_empties_everything() {
		let mut g = store();
		g.upsert_node("a", NodeKind::User, None);
		g.add_edge("a", "b", "MemberOf");
		g.clear();
		assert!(g.is_empty());
		assert!(g.edges().is_empty());
		assert_eq!(g.outgoing("a").count(), 0);
		assert!(g.add_edge("a", "b", "MemberOf"));
	}
}
