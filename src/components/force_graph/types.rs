use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Upstream track identifier.
pub type TrackId = i64;

/// Upstream transition identifier.
pub type TransitionId = i64;

/// A point in logical canvas (or screen) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Builds a point from its coordinates.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean length of the vector from the origin.
	pub fn length(self) -> f64 {
		self.dot(self).sqrt()
	}

	/// Distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(other - self).length()
	}

	/// Dot product.
	pub fn dot(self, other: Point) -> f64 {
		self.x * other.x + self.y * other.y
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, rhs: f64) -> Point {
		Point::new(self.x * rhs, self.y * rhs)
	}
}

impl Div<f64> for Point {
	type Output = Point;

	fn div(self, rhs: f64) -> Point {
		Point::new(self.x / rhs, self.y / rhs)
	}
}

/// How two tracks are mixed into each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
	/// Long overlapping mix.
	#[default]
	Blend,
	/// Outgoing track tails off on an echo.
	EchoOut,
	/// Hard cut on the drop.
	DropSwap,
	/// Vocal phrase bridges the two tracks.
	Wordplay,
	/// Looped section carries the mix.
	Loop,
}

impl TransitionType {
	/// Human readable name.
	pub fn label(self) -> &'static str {
		match self {
			TransitionType::Blend => "Blend",
			TransitionType::EchoOut => "Echo Out",
			TransitionType::DropSwap => "Drop Swap",
			TransitionType::Wordplay => "Wordplay",
			TransitionType::Loop => "Loop",
		}
	}
}

impl fmt::Display for TransitionType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// A track as drawn in the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Track id; identity of the node.
	pub id: TrackId,
	/// Track title.
	pub title: String,
	/// Track artist.
	#[serde(default)]
	pub artist: String,
	/// Tempo, when analysed.
	#[serde(default)]
	pub bpm: Option<f64>,
	/// Musical key, when analysed.
	#[serde(default)]
	pub key: Option<String>,
}

impl Node {
	/// Builds a node with only an id and a title.
	pub fn new(id: TrackId, title: impl Into<String>) -> Self {
		Self {
			id,
			title: title.into(),
			artist: String::new(),
			bpm: None,
			key: None,
		}
	}

	/// Title shortened to fit inside a node circle.
	pub fn short_title(&self) -> String {
		if self.title.chars().count() > 12 {
			let head: String = self.title.chars().take(10).collect();
			format!("{head}...")
		} else {
			self.title.clone()
		}
	}
}

/// A directed transition between two tracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	/// Transition id.
	pub id: TransitionId,
	/// Track the mix starts from.
	#[serde(rename = "from_track_id")]
	pub from: TrackId,
	/// Track the mix goes into.
	#[serde(rename = "to_track_id")]
	pub to: TrackId,
	/// Star rating in `1..=5`.
	pub rating: u8,
	/// Mix technique.
	#[serde(default)]
	pub transition_type: TransitionType,
	/// Free-form notes.
	#[serde(default)]
	pub notes: Option<String>,
}

impl Edge {
	/// Builds a blend transition with the given rating.
	pub fn new(id: TransitionId, from: TrackId, to: TrackId, rating: u8) -> Self {
		Self {
			id,
			from,
			to,
			rating: rating.clamp(1, 5),
			transition_type: TransitionType::Blend,
			notes: None,
		}
	}

	/// Rating forced into the `1..=5` star range.
	pub fn stars(&self) -> u8 {
		self.rating.clamp(1, 5)
	}
}

/// Raw node and edge lists as delivered by a data source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Tracks in display order.
	#[serde(default)]
	pub nodes: Vec<Node>,
	/// Transitions in upstream order.
	#[serde(default)]
	pub edges: Vec<Edge>,
}

/// Whether a node has transitions in and/or out, used for node colouring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegreeClass {
	/// Both incoming and outgoing transitions.
	Both,
	/// Only outgoing transitions.
	Outgoing,
	/// Only incoming transitions.
	Incoming,
	/// Not connected.
	Isolated,
}

/// Immutable node/edge snapshot for one view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	index: HashMap<TrackId, usize>,
}

impl GraphModel {
	/// Builds a model. Edges pointing at unknown ids are kept; consumers skip
	/// them whenever a position lookup fails. Ratings are clamped to `1..=5`.
	/// Of several nodes sharing an id only the first is kept.
	pub fn build(raw_nodes: Vec<Node>, mut edges: Vec<Edge>) -> Self {
		for edge in &mut edges {
			edge.rating = edge.rating.clamp(1, 5);
		}

		let mut index = HashMap::with_capacity(raw_nodes.len());
		let mut nodes = Vec::with_capacity(raw_nodes.len());
		for node in raw_nodes {
			if index.contains_key(&node.id) {
				log::debug!("duplicate track id {} in graph view", node.id);
				continue;
			}
			index.insert(node.id, nodes.len());
			nodes.push(node);
		}

		let dangling = edges
			.iter()
			.filter(|e| !index.contains_key(&e.from) || !index.contains_key(&e.to))
			.count();
		if dangling > 0 {
			log::debug!("{dangling} transitions reference tracks outside the view");
		}

		Self {
			nodes,
			edges,
			index,
		}
	}

	/// Builds a model from a data source payload.
	pub fn from_data(data: GraphData) -> Self {
		Self::build(data.nodes, data.edges)
	}

	/// Nodes in display order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in upstream order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Whether the view has no tracks.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether `id` is a node of this view.
	pub fn contains(&self, id: TrackId) -> bool {
		self.index.contains_key(&id)
	}

	/// Looks up a node by id.
	pub fn node(&self, id: TrackId) -> Option<&Node> {
		self.index.get(&id).map(|&i| &self.nodes[i])
	}

	/// Looks up an edge by id.
	pub fn edge(&self, id: TransitionId) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Transitions leaving `id`.
	pub fn outgoing(&self, id: TrackId) -> impl Iterator<Item = &Edge> {
		self.edges.iter().filter(move |e| e.from == id)
	}

	/// Transitions entering `id`.
	pub fn incoming(&self, id: TrackId) -> impl Iterator<Item = &Edge> {
		self.edges.iter().filter(move |e| e.to == id)
	}

	/// Number of transitions leaving `id`.
	pub fn outgoing_count(&self, id: TrackId) -> usize {
		self.outgoing(id).count()
	}

	/// Number of transitions entering `id`.
	pub fn incoming_count(&self, id: TrackId) -> usize {
		self.incoming(id).count()
	}

	/// Degree class of `id`.
	pub fn degree_class(&self, id: TrackId) -> DegreeClass {
		match (self.outgoing_count(id) > 0, self.incoming_count(id) > 0) {
			(true, true) => DegreeClass::Both,
			(true, false) => DegreeClass::Outgoing,
			(false, true) => DegreeClass::Incoming,
			(false, false) => DegreeClass::Isolated,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> GraphModel {
		GraphModel::build(
			vec![Node::new(1, "A"), Node::new(2, "B"), Node::new(3, "C")],
			vec![Edge::new(10, 1, 2, 4), Edge::new(11, 1, 2, 2), Edge::new(12, 2, 99, 3)],
		)
	}

	#[test]
	fn keeps_parallel_and_dangling_edges() {
		let model = sample();
		assert_eq!(model.edges().len(), 3);
		assert_eq!(model.outgoing_count(1), 2);
		assert!(!model.contains(99));
	}

	#[test]
	fn classifies_degrees() {
		let model = sample();
		assert_eq!(model.degree_class(1), DegreeClass::Outgoing);
		assert_eq!(model.degree_class(2), DegreeClass::Both);
		assert_eq!(model.degree_class(3), DegreeClass::Isolated);
	}

	#[test]
	fn first_duplicate_node_wins() {
		let model = GraphModel::build(
			vec![Node::new(1, "first"), Node::new(1, "second"), Node::new(2, "other")],
			vec![],
		);
		assert_eq!(model.node(1).map(|n| n.title.as_str()), Some("first"));
		let ids: Vec<TrackId> = model.nodes().iter().map(|n| n.id).collect();
		assert_eq!(ids, vec![1, 2]);
		assert_eq!(model.node(2).map(|n| n.title.as_str()), Some("other"));
	}

	#[test]
	fn shortens_long_titles() {
		assert_eq!(Node::new(1, "Short title").short_title(), "Short title");
		assert_eq!(Node::new(1, "A very long title").short_title(), "A very lon...");
	}

	#[test]
	fn decodes_upstream_payload() {
		let json = r#"{
			"nodes": [{"id": 1, "title": "One", "artist": "X", "bpm": 124.0, "key": "8A"}],
			"edges": [{"id": 5, "from_track_id": 1, "to_track_id": 2, "rating": 3, "transition_type": "echo_out"}]
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();
		assert_eq!(data.nodes[0].bpm, Some(124.0));
		assert_eq!(data.edges[0].transition_type, TransitionType::EchoOut);
		assert_eq!(data.edges[0].notes, None);
	}
}
