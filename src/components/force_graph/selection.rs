use std::collections::HashSet;
use std::fmt;

use super::types::{TrackId, TransitionId};

/// The focused node or edge, at most one at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	/// Nothing focused.
	#[default]
	None,
	/// A track.
	Node(TrackId),
	/// A transition.
	Edge(TransitionId),
}

impl Selection {
	/// Focuses `id`, or clears the selection if it was already focused.
	pub fn toggle_node(&mut self, id: TrackId) {
		*self = if *self == Selection::Node(id) {
			Selection::None
		} else {
			Selection::Node(id)
		};
	}

	/// Focuses edge `id`, or clears the selection if it was already focused.
	pub fn toggle_edge(&mut self, id: TransitionId) {
		*self = if *self == Selection::Edge(id) {
			Selection::None
		} else {
			Selection::Edge(id)
		};
	}

	/// Drops the focus.
	pub fn clear(&mut self) {
		*self = Selection::None;
	}

	/// Focused track, if any.
	pub fn node(self) -> Option<TrackId> {
		match self {
			Selection::Node(id) => Some(id),
			_ => None,
		}
	}

	/// Focused transition, if any.
	pub fn edge(self) -> Option<TransitionId> {
		match self {
			Selection::Edge(id) => Some(id),
			_ => None,
		}
	}
}

/// Ordered pair of track ids, printed as `from-to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
	/// Source track.
	pub from: TrackId,
	/// Destination track.
	pub to: TrackId,
}

impl fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.from, self.to)
	}
}

/// Tracks and consecutive transitions of an ordered track list (a playlist),
/// drawn with emphasis over the full graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightSet {
	node_ids: HashSet<TrackId>,
	edge_keys: HashSet<EdgeKey>,
}

impl HighlightSet {
	/// Builds the set from a list in play order.
	pub fn from_ordered(track_ids: &[TrackId]) -> Self {
		Self {
			node_ids: track_ids.iter().copied().collect(),
			edge_keys: track_ids
				.windows(2)
				.map(|pair| EdgeKey {
					from: pair[0],
					to: pair[1],
				})
				.collect(),
		}
	}

	/// Whether nothing is highlighted.
	pub fn is_empty(&self) -> bool {
		self.node_ids.is_empty()
	}

	/// Whether track `id` is highlighted.
	pub fn contains_node(&self, id: TrackId) -> bool {
		self.node_ids.contains(&id)
	}

	/// Whether the transition `from -> to` is highlighted.
	pub fn contains_edge(&self, from: TrackId, to: TrackId) -> bool {
		self.edge_keys.contains(&EdgeKey { from, to })
	}

	/// Highlighted tracks.
	pub fn node_ids(&self) -> &HashSet<TrackId> {
		&self.node_ids
	}

	/// Highlighted consecutive pairs.
	pub fn edge_keys(&self) -> &HashSet<EdgeKey> {
		&self.edge_keys
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selecting_one_kind_clears_the_other() {
		let mut sel = Selection::default();
		sel.toggle_node(3);
		assert_eq!(sel.node(), Some(3));
		sel.toggle_edge(9);
		assert_eq!(sel.node(), None);
		assert_eq!(sel.edge(), Some(9));
		sel.toggle_node(4);
		assert_eq!(sel.edge(), None);
	}

	#[test]
	fn selecting_again_deselects() {
		let mut sel = Selection::default();
		sel.toggle_node(3);
		sel.toggle_node(3);
		assert_eq!(sel, Selection::None);
		sel.toggle_edge(1);
		sel.toggle_edge(1);
		assert_eq!(sel, Selection::None);
	}

	#[test]
	fn highlight_covers_consecutive_pairs_only() {
		let set = HighlightSet::from_ordered(&[3, 7, 2]);
		let mut keys: Vec<String> = set.edge_keys().iter().map(ToString::to_string).collect();
		keys.sort();
		assert_eq!(keys, vec!["3-7", "7-2"]);
		assert_eq!(set.node_ids(), &HashSet::from([3, 7, 2]));
		assert!(!set.contains_edge(3, 2));
		assert!(!set.contains_edge(7, 3));
	}

	#[test]
	fn short_lists() {
		assert!(HighlightSet::from_ordered(&[]).is_empty());
		let single = HighlightSet::from_ordered(&[5]);
		assert!(single.contains_node(5));
		assert!(single.edge_keys().is_empty());
	}
}
