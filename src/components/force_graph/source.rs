//! Where graph views come from.

use std::collections::HashMap;

use serde::Deserialize;

use super::selection::HighlightSet;
use super::types::{Edge, GraphData, GraphModel, Node, TrackId};

/// Folder identifier.
pub type FolderId = i64;
/// Playlist identifier.
pub type PlaylistId = i64;

/// Which part of the library a view shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GraphScope {
	/// Every track.
	#[default]
	All,
	/// Tracks filed in a folder.
	Folder(FolderId),
	/// Tracks of a playlist, with the play order highlighted.
	Playlist(PlaylistId),
}

/// Failure to produce a graph view.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	/// No folder with this id.
	#[error("unknown folder: {0}")]
	UnknownFolder(FolderId),
	/// No playlist with this id.
	#[error("unknown playlist: {0}")]
	UnknownPlaylist(PlaylistId),
	/// The payload could not be decoded.
	#[error("malformed graph payload: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Result alias for data source calls.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Upstream provider of tracks and transitions.
pub trait GraphSource {
	/// Nodes and edges of `scope`. Scoped views only contain transitions whose
	/// both tracks are in scope.
	fn fetch_graph(&self, scope: GraphScope) -> Result<GraphData>;

	/// Track ids of a playlist in play order.
	fn fetch_ordered_track_ids(&self, playlist: PlaylistId) -> Result<Vec<TrackId>>;
}

/// A model plus its highlight, ready to lay out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
	/// Scope the snapshot was built for.
	pub scope: GraphScope,
	/// Nodes and edges.
	pub model: GraphModel,
	/// Emphasised play order, empty outside playlist views.
	pub highlight: HighlightSet,
}

/// Fetches `scope` and builds the snapshot to display.
pub fn load_view(source: &dyn GraphSource, scope: GraphScope) -> Result<GraphSnapshot> {
	let data = source.fetch_graph(scope)?;
	let highlight = match scope {
		GraphScope::Playlist(id) => HighlightSet::from_ordered(&source.fetch_ordered_track_ids(id)?),
		GraphScope::All | GraphScope::Folder(_) => HighlightSet::default(),
	};
	Ok(GraphSnapshot {
		scope,
		model: GraphModel::from_data(data),
		highlight,
	})
}

/// Named, ordered list of tracks.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TrackList {
	/// Display name.
	pub name: String,
	/// Member tracks in order.
	#[serde(default)]
	pub tracks: Vec<TrackId>,
}

/// A whole library held in memory.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MemorySource {
	/// Every track.
	#[serde(default)]
	pub tracks: Vec<Node>,
	/// Every transition.
	#[serde(default)]
	pub transitions: Vec<Edge>,
	/// Folders by id.
	#[serde(default)]
	pub folders: HashMap<FolderId, TrackList>,
	/// Playlists by id.
	#[serde(default)]
	pub playlists: HashMap<PlaylistId, TrackList>,
}

impl MemorySource {
	/// Parses a library dump.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Folders sorted by id, for pickers.
	pub fn folder_list(&self) -> Vec<(FolderId, &TrackList)> {
		sorted(&self.folders)
	}

	/// Playlists sorted by id, for pickers.
	pub fn playlist_list(&self) -> Vec<(PlaylistId, &TrackList)> {
		sorted(&self.playlists)
	}

	fn scoped(&self, members: &[TrackId]) -> GraphData {
		let mut nodes = Vec::with_capacity(members.len());
		for id in members {
			if nodes.iter().any(|n: &Node| n.id == *id) {
				continue;
			}
			if let Some(track) = self.tracks.iter().find(|t| t.id == *id) {
				nodes.push(track.clone());
			}
		}

		let mut edges: Vec<Edge> = self
			.transitions
			.iter()
			.filter(|e| members.contains(&e.from) && members.contains(&e.to))
			.cloned()
			.collect();
		edges.sort_by_key(|e| e.id);

		GraphData { nodes, edges }
	}
}

impl GraphSource for MemorySource {
	fn fetch_graph(&self, scope: GraphScope) -> Result<GraphData> {
		match scope {
			GraphScope::All => {
				let mut nodes = self.tracks.clone();
				nodes.sort_by_key(|n| n.id);
				let mut edges = self.transitions.clone();
				edges.sort_by_key(|e| e.id);
				Ok(GraphData { nodes, edges })
			}
			GraphScope::Folder(id) => self
				.folders
				.get(&id)
				.map(|folder| self.scoped(&folder.tracks))
				.ok_or(SourceError::UnknownFolder(id)),
			GraphScope::Playlist(id) => self
				.playlists
				.get(&id)
				.map(|playlist| self.scoped(&playlist.tracks))
				.ok_or(SourceError::UnknownPlaylist(id)),
		}
	}

	fn fetch_ordered_track_ids(&self, playlist: PlaylistId) -> Result<Vec<TrackId>> {
		self.playlists
			.get(&playlist)
			.map(|p| p.tracks.clone())
			.ok_or(SourceError::UnknownPlaylist(playlist))
	}
}

fn sorted<T>(map: &HashMap<i64, T>) -> Vec<(i64, &T)> {
	let mut list: Vec<(i64, &T)> = map.iter().map(|(&id, v)| (id, v)).collect();
	list.sort_by_key(|(id, _)| *id);
	list
}

#[cfg(test)]
mod tests {
	use super::*;

	fn library() -> MemorySource {
		MemorySource {
			tracks: vec![Node::new(3, "C"), Node::new(1, "A"), Node::new(2, "B")],
			transitions: vec![Edge::new(20, 2, 3, 4), Edge::new(10, 1, 2, 5), Edge::new(30, 3, 1, 2)],
			folders: HashMap::from([(
				1,
				TrackList {
					name: "Warmup".into(),
					tracks: vec![2, 1],
				},
			)]),
			playlists: HashMap::from([(
				7,
				TrackList {
					name: "Friday".into(),
					tracks: vec![1, 2, 3],
				},
			)]),
		}
	}

	#[test]
	fn all_scope_is_sorted_by_id() {
		let data = library().fetch_graph(GraphScope::All).unwrap();
		let ids: Vec<_> = data.nodes.iter().map(|n| n.id).collect();
		assert_eq!(ids, vec![1, 2, 3]);
		let edge_ids: Vec<_> = data.edges.iter().map(|e| e.id).collect();
		assert_eq!(edge_ids, vec![10, 20, 30]);
	}

	#[test]
	fn folder_keeps_membership_order_and_internal_edges() {
		let data = library().fetch_graph(GraphScope::Folder(1)).unwrap();
		let ids: Vec<_> = data.nodes.iter().map(|n| n.id).collect();
		assert_eq!(ids, vec![2, 1]);
		assert_eq!(data.edges.len(), 1);
		assert_eq!(data.edges[0].id, 10);
	}

	#[test]
	fn unknown_scopes_are_errors() {
		let lib = library();
		assert!(matches!(
			lib.fetch_graph(GraphScope::Folder(9)),
			Err(SourceError::UnknownFolder(9))
		));
		assert!(matches!(
			load_view(&lib, GraphScope::Playlist(9)),
			Err(SourceError::UnknownPlaylist(9))
		));
	}

	#[test]
	fn playlist_view_is_highlighted() {
		let snapshot = load_view(&library(), GraphScope::Playlist(7)).unwrap();
		assert!(snapshot.highlight.contains_edge(1, 2));
		assert!(snapshot.highlight.contains_edge(2, 3));
		assert!(!snapshot.highlight.contains_edge(3, 1));
		assert_eq!(snapshot.model.edges().len(), 3);

		let all = load_view(&library(), GraphScope::All).unwrap();
		assert!(all.highlight.is_empty());
	}

	#[test]
	fn parses_library_json() {
		let json = r#"{
			"tracks": [{"id": 1, "title": "A"}],
			"transitions": [],
			"playlists": {"4": {"name": "P", "tracks": [1]}}
		}"#;
		let lib = MemorySource::from_json(json).unwrap();
		assert_eq!(lib.fetch_ordered_track_ids(4).unwrap(), vec![1]);
		assert!(matches!(
			MemorySource::from_json("{"),
			Err(SourceError::Decode(_))
		));
	}
}
