use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A 2D coordinate, used for both world and screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal component.
	pub x: f64,
	/// Vertical component, growing downward.
	pub y: f64,
}

impl Point {
	/// Builds a point from its components.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Component-wise scale.
	pub fn scale(self, k: f64) -> Self {
		Self::new(self.x * k, self.y * k)
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Point {
	fn add_assign(&mut self, rhs: Point) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// Directory object class of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
	/// User account.
	User,
	/// Security group.
	Group,
	/// Computer account. Also the fallback class for collector files.
	Computer,
	/// Domain object.
	Domain,
	/// Group policy object.
	Gpo,
	/// Organizational unit.
	Ou,
	/// Generic container.
	Container,
	/// A principal type the collector reported that we have no variant for.
	Other(String),
}

impl NodeKind {
	/// Parses a collector type name (`"User"`, `"group"`, `"GPO"`, ...).
	pub fn from_type_name(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"user" => Self::User,
			"group" => Self::Group,
			"computer" => Self::Computer,
			"domain" => Self::Domain,
			"gpo" => Self::Gpo,
			"ou" => Self::Ou,
			"container" => Self::Container,
			_ => Self::Other(name.trim().to_string()),
		}
	}

	/// Display name, as the collector spells it.
	pub fn as_str(&self) -> &str {
		match self {
			Self::User => "User",
			Self::Group => "Group",
			Self::Computer => "Computer",
			Self::Domain => "Domain",
			Self::Gpo => "GPO",
			Self::Ou => "OU",
			Self::Container => "Container",
			Self::Other(name) => name,
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A directory object in the attack graph.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
	/// Canonical, upper-cased identity.
	pub identity: String,
	/// Fixed by the first upsert.
	pub kind: NodeKind,
	/// Whether the identity contains the high-value marker.
	pub is_high_value: bool,
	/// World coordinate. Only drag gestures move it after creation.
	pub position: Point,
	/// Raw collector record, merged key by key. Display only.
	pub attributes: Map<String, Value>,
}

/// A directed, labeled relationship between two identities.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
	/// Identity holding the relationship.
	pub from: String,
	/// Identity the relationship points at.
	pub to: String,
	/// `MemberOf` or an access right name.
	pub label: String,
}

/// Canonical form of an identity: upper-cased, otherwise verbatim.
pub fn canonical(identity: &str) -> String {
	identity.to_uppercase()
}
