use std::collections::{HashSet, VecDeque};

use log::info;

use super::error::PathError;
use super::store::GraphStore;
use super::types::{Node, canonical};

/// Shortest relationship path from `start` to the first node (in store order)
/// matching `is_target`.
///
/// Breadth-first over outgoing edges in insertion order, so among equally
/// short paths the earliest discovered one wins. Edges pointing at nodes that
/// were never created are not followed.
pub fn find_path(
	store: &GraphStore,
	start: &str,
	is_target: impl Fn(&Node) -> bool,
) -> Result<Vec<String>, PathError> {
	let start = canonical(start);
	let target = store
		.nodes()
		.find(|&n| is_target(n))
		.map(|n| n.identity.clone())
		.ok_or(PathError::TargetNotFound)?;
	if !store.contains(&start) {
		return Err(PathError::StartNotFound(start));
	}

	let mut visited = HashSet::from([start.clone()]);
	let mut queue = VecDeque::from([vec![start.clone()]]);

	while let Some(path) = queue.pop_front() {
		let Some(current) = path.last() else {
			continue;
		};
		if *current == target {
			info!("path {start} -> {target}: {} hops", path.len() - 1);
			return Ok(path);
		}
		for edge in store.outgoing(current) {
			if !store.contains(&edge.to) || visited.contains(&edge.to) {
				continue;
			}
			visited.insert(edge.to.clone());
			let mut next = path.clone();
			next.push(edge.to.clone());
			queue.push_back(next);
		}
	}

	Err(PathError::NoPath { start, target })
}

/// [`find_path`] toward the first high-value node.
pub fn find_path_to_high_value(store: &GraphStore, start: &str) -> Result<Vec<String>, PathError> {
	find_path(store, start, |n| n.is_high_value)
}
