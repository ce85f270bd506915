//! Force simulation that relaxes the track graph into a readable layout.
//!
//! Every tick runs four phases over a single shared [`PositionMap`]:
//! pairwise repulsion, spring attraction along transitions, a push that moves
//! nodes off transitions they are not part of, and a clamp into the layout
//! bounds. Phases update the map in place, so later pairs in a phase see the
//! positions written by earlier ones.
//!
//! Cost per tick is `O(n²)` for repulsion plus `O(|E|·n)` for edge avoidance.
//! With the fixed iteration cap a full run is `O(cap·(n² + |E|·n))`, which keeps
//! graphs of a few hundred tracks interactive and is the practical ceiling.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use serde::Deserialize;

use super::types::{Edge, GraphModel, Node, Point, TrackId};

/// Current logical position of every laid out node.
pub type PositionMap = HashMap<TrackId, Point>;

/// Axis-aligned rectangle a coordinate is clamped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Top-left corner.
	pub min: Point,
	/// Bottom-right corner.
	pub max: Point,
}

impl Bounds {
	/// Clamps `p` into the rectangle.
	pub fn clamp(&self, p: Point) -> Point {
		Point::new(
			p.x.clamp(self.min.x, self.max.x),
			p.y.clamp(self.min.y, self.max.y),
		)
	}

	/// Whether `p` lies inside the rectangle (edges included).
	pub fn contains(&self, p: Point) -> bool {
		(self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
	}
}

/// Tunable constants of the layout and drag bounds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParameters {
	/// Logical canvas width.
	pub canvas_width: f64,
	/// Logical canvas height.
	pub canvas_height: f64,
	/// Inset of the bounds the simulation clamps into.
	pub layout_margin: f64,
	/// Inset of the bounds a dragged node is clamped into.
	pub drag_margin: f64,
	/// Initial circle radius contributed by each node.
	pub radius_per_node: f64,
	/// Smallest initial circle radius.
	pub min_radius: f64,
	/// Largest initial circle radius.
	pub max_radius: f64,
	/// Numerator of the inverse-square repulsion.
	pub repulsion: f64,
	/// Rest length of a transition spring.
	pub ideal_edge_length: f64,
	/// Spring stiffness.
	pub spring: f64,
	/// Distance under which a node is pushed off an unrelated transition.
	pub avoidance_distance: f64,
	/// Strength of the edge-avoidance push.
	pub avoidance_strength: f64,
	/// Floor applied to distances before dividing by them.
	pub min_distance: f64,
	/// Number of ticks after which the layout is considered settled.
	pub max_iterations: usize,
}

impl Default for LayoutParameters {
	fn default() -> Self {
		Self {
			canvas_width: 800.0,
			canvas_height: 600.0,
			layout_margin: 60.0,
			drag_margin: 30.0,
			radius_per_node: 15.0,
			min_radius: 150.0,
			max_radius: 250.0,
			repulsion: 8000.0,
			ideal_edge_length: 120.0,
			spring: 0.03,
			avoidance_distance: 60.0,
			avoidance_strength: 0.1,
			min_distance: 1.0,
			max_iterations: 150,
		}
	}
}

impl LayoutParameters {
	/// Parses parameter overrides; absent keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Centre of the logical canvas.
	pub fn center(&self) -> Point {
		Point::new(self.canvas_width / 2.0, self.canvas_height / 2.0)
	}

	/// Bounds the simulation keeps nodes in.
	pub fn layout_bounds(&self) -> Bounds {
		self.inset(self.layout_margin)
	}

	/// Bounds a dragged node is kept in.
	pub fn drag_bounds(&self) -> Bounds {
		self.inset(self.drag_margin)
	}

	fn inset(&self, margin: f64) -> Bounds {
		Bounds {
			min: Point::new(margin, margin),
			max: Point::new(self.canvas_width - margin, self.canvas_height - margin),
		}
	}
}

/// Stateless force model; see the module docs for the tick phases.
#[derive(Clone, Debug, Default)]
pub struct LayoutEngine {
	params: LayoutParameters,
}

impl LayoutEngine {
	/// Builds an engine with the given parameters.
	pub fn new(params: LayoutParameters) -> Self {
		Self { params }
	}

	/// Parameters in use.
	pub fn params(&self) -> &LayoutParameters {
		&self.params
	}

	/// Places nodes evenly on a circle around the canvas centre, starting at the
	/// top and going clockwise in node order.
	pub fn initialize(&self, nodes: &[Node]) -> PositionMap {
		let p = &self.params;
		let count = nodes.len();
		let radius = (count as f64 * p.radius_per_node).clamp(p.min_radius, p.max_radius);
		let center = p.center();

		nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let angle = 2.0 * PI * i as f64 / count as f64 - PI / 2.0;
				let pos = center + Point::new(angle.cos(), angle.sin()) * radius;
				(node.id, pos)
			})
			.collect()
	}

	/// Advances `positions` by one tick. Ids outside `nodes` are never moved
	/// and transitions touching them are skipped.
	pub fn step(&self, positions: &mut PositionMap, nodes: &[Node], edges: &[Edge]) {
		let members: HashSet<TrackId> = nodes
			.iter()
			.map(|n| n.id)
			.filter(|id| positions.contains_key(id))
			.collect();

		self.apply_repulsion(positions, nodes);
		self.apply_springs(positions, edges, &members);
		self.apply_edge_avoidance(positions, nodes, edges, &members);

		let bounds = self.params.layout_bounds();
		for node in nodes {
			if let Some(pos) = positions.get_mut(&node.id) {
				*pos = bounds.clamp(*pos);
			}
		}
	}

	/// Whether a run that has performed `iterations` ticks is finished.
	pub fn is_converged(&self, iterations: usize) -> bool {
		iterations >= self.params.max_iterations
	}

	fn apply_repulsion(&self, positions: &mut PositionMap, nodes: &[Node]) {
		let p = &self.params;
		for (i, a) in nodes.iter().enumerate() {
			for b in &nodes[i + 1..] {
				if a.id == b.id {
					continue;
				}
				let (Some(&pa), Some(&pb)) = (positions.get(&a.id), positions.get(&b.id)) else {
					continue;
				};

				let delta = pb - pa;
				let dist = delta.length().max(p.min_distance);
				let force = p.repulsion / (dist * dist);
				let push = delta / dist * force;

				positions.insert(a.id, pa - push);
				positions.insert(b.id, pb + push);
			}
		}
	}

	fn apply_springs(&self, positions: &mut PositionMap, edges: &[Edge], members: &HashSet<TrackId>) {
		let p = &self.params;
		for edge in edges {
			if !members.contains(&edge.from) || !members.contains(&edge.to) {
				continue;
			}
			let (Some(&from), Some(&to)) = (positions.get(&edge.from), positions.get(&edge.to)) else {
				continue;
			};

			let delta = to - from;
			let dist = delta.length().max(p.min_distance);
			let force = (dist - p.ideal_edge_length) * p.spring;
			let pull = delta / dist * force;

			positions.insert(edge.from, from + pull);
			positions.insert(edge.to, to - pull);
		}
	}

	fn apply_edge_avoidance(
		&self,
		positions: &mut PositionMap,
		nodes: &[Node],
		edges: &[Edge],
		members: &HashSet<TrackId>,
	) {
		let p = &self.params;
		for edge in edges {
			if !members.contains(&edge.from) || !members.contains(&edge.to) {
				continue;
			}
			for node in nodes {
				if node.id == edge.from || node.id == edge.to {
					continue;
				}
				let (Some(&a), Some(&b), Some(&pos)) = (
					positions.get(&edge.from),
					positions.get(&edge.to),
					positions.get(&node.id),
				) else {
					continue;
				};

				let closest = closest_point_on_segment(pos, a, b);
				let away = pos - closest;
				let dist = away.length();
				if dist >= p.avoidance_distance {
					continue;
				}

				let force = (p.avoidance_distance - dist) * p.avoidance_strength;
				let push = away / dist.max(p.min_distance) * force;
				positions.insert(node.id, pos + push);
			}
		}
	}
}

/// Closest point to `p` on the segment `a`–`b`.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
	let ab = b - a;
	let len_sq = ab.dot(ab);
	if len_sq <= f64::EPSILON {
		return a;
	}
	let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
	a + ab * t
}

/// A layout run over one [`GraphModel`]: the engine, the live positions and
/// the tick counter.
#[derive(Clone, Debug)]
pub struct Simulation {
	engine: LayoutEngine,
	positions: PositionMap,
	iterations: usize,
}

impl Simulation {
	/// Starts a run with the circular seed layout of `model`.
	pub fn new(engine: LayoutEngine, model: &GraphModel) -> Self {
		let positions = engine.initialize(model.nodes());
		Self {
			engine,
			positions,
			iterations: 0,
		}
	}

	/// Advances one tick unless the run is finished. Returns whether a tick
	/// was performed.
	pub fn tick(&mut self, model: &GraphModel) -> bool {
		if self.is_converged() {
			return false;
		}
		self.engine
			.step(&mut self.positions, model.nodes(), model.edges());
		self.iterations += 1;
		if self.is_converged() {
			log::info!(
				"layout settled after {} ticks ({} tracks)",
				self.iterations,
				model.nodes().len()
			);
		}
		true
	}

	/// Runs ticks until the iteration cap.
	pub fn run_to_end(&mut self, model: &GraphModel) {
		while self.tick(model) {}
	}

	/// Whether the iteration cap has been reached.
	pub fn is_converged(&self) -> bool {
		self.engine.is_converged(self.iterations)
	}

	/// Ticks performed so far.
	pub fn iterations(&self) -> usize {
		self.iterations
	}

	/// Fraction of the run completed, in `[0, 1]`.
	pub fn progress(&self) -> f64 {
		let cap = self.engine.params().max_iterations;
		if cap == 0 {
			return 1.0;
		}
		(self.iterations as f64 / cap as f64).min(1.0)
	}

	/// Live positions.
	pub fn positions(&self) -> &PositionMap {
		&self.positions
	}

	/// Live positions, for interaction overrides.
	pub fn positions_mut(&mut self) -> &mut PositionMap {
		&mut self.positions
	}

	/// Owned copy of the current positions.
	pub fn snapshot(&self) -> PositionMap {
		self.positions.clone()
	}

	/// Engine driving this run.
	pub fn engine(&self) -> &LayoutEngine {
		&self.engine
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::Edge;

	fn nodes(ids: &[TrackId]) -> Vec<Node> {
		ids.iter().map(|&id| Node::new(id, format!("Track {id}"))).collect()
	}

	fn radius_of(positions: &PositionMap, id: TrackId) -> f64 {
		positions[&id].distance(Point::new(400.0, 300.0))
	}

	#[test]
	fn initial_radius_follows_node_count() {
		let engine = LayoutEngine::default();
		let one = engine.initialize(&nodes(&[1]));
		assert!((radius_of(&one, 1) - 150.0).abs() < 1e-9);

		let ten: Vec<TrackId> = (1..=10).collect();
		let ten_pos = engine.initialize(&nodes(&ten));
		assert!((radius_of(&ten_pos, 5) - 150.0).abs() < 1e-9);

		let twenty: Vec<TrackId> = (1..=20).collect();
		let twenty_pos = engine.initialize(&nodes(&twenty));
		assert!((radius_of(&twenty_pos, 7) - 250.0).abs() < 1e-9);
	}

	#[test]
	fn first_node_starts_at_the_top_then_clockwise() {
		let engine = LayoutEngine::default();
		let positions = engine.initialize(&nodes(&[1, 2, 3, 4]));
		let top = positions[&1];
		assert!((top.x - 400.0).abs() < 1e-9);
		assert!((top.y - 150.0).abs() < 1e-9);
		let right = positions[&2];
		assert!((right.x - 550.0).abs() < 1e-9);
		assert!((right.y - 300.0).abs() < 1e-9);
	}

	#[test]
	fn empty_graph_initializes_to_nothing() {
		assert!(LayoutEngine::default().initialize(&[]).is_empty());
	}

	#[test]
	fn step_leaves_foreign_ids_alone() {
		let engine = LayoutEngine::default();
		let graph = nodes(&[1, 2, 3]);
		let mut positions = engine.initialize(&graph);
		let stranger = Point::new(401.0, 301.0);
		positions.insert(42, stranger);
		let edges = vec![Edge::new(1, 1, 42, 5), Edge::new(2, 42, 3, 5)];

		for _ in 0..10 {
			engine.step(&mut positions, &graph, &edges);
		}
		assert_eq!(positions[&42], stranger);
	}

	#[test]
	fn coincident_nodes_do_not_produce_nan() {
		let engine = LayoutEngine::default();
		let graph = nodes(&[1, 2]);
		let mut positions = PositionMap::new();
		positions.insert(1, Point::new(300.0, 300.0));
		positions.insert(2, Point::new(300.0, 300.0));
		engine.step(&mut positions, &graph, &[Edge::new(1, 1, 2, 3)]);
		assert!(positions.values().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn nodes_are_pushed_off_unrelated_edges() {
		let engine = LayoutEngine::default();
		let graph = nodes(&[1, 2, 3]);
		let mut positions = PositionMap::new();
		positions.insert(1, Point::new(200.0, 300.0));
		positions.insert(2, Point::new(600.0, 300.0));
		positions.insert(3, Point::new(400.0, 310.0));
		let edges = vec![Edge::new(1, 1, 2, 3)];

		engine.apply_edge_avoidance(
			&mut positions,
			&graph,
			&edges,
			&graph.iter().map(|n| n.id).collect(),
		);
		assert!((positions[&3].y - 315.0).abs() < 1e-9);
		assert!((positions[&3].x - 400.0).abs() < 1e-9);
	}

	#[test]
	fn springs_pull_a_long_pair_together() {
		let engine = LayoutEngine::default();
		let mut positions = PositionMap::new();
		positions.insert(1, Point::new(300.0, 300.0));
		positions.insert(2, Point::new(500.0, 300.0));
		let members = [1, 2].into_iter().collect();

		engine.apply_springs(&mut positions, &[Edge::new(1, 1, 2, 3)], &members);
		assert!((positions[&1].x - 302.4).abs() < 1e-9);
		assert!((positions[&2].x - 497.6).abs() < 1e-9);
		assert_eq!(positions[&1].y, 300.0);
	}

	#[test]
	fn repulsion_pushes_both_nodes_by_the_full_force() {
		let engine = LayoutEngine::default();
		let mut positions = PositionMap::new();
		positions.insert(1, Point::new(300.0, 300.0));
		positions.insert(2, Point::new(400.0, 300.0));

		engine.apply_repulsion(&mut positions, &nodes(&[1, 2]));
		assert!((positions[&1].x - 299.2).abs() < 1e-9);
		assert!((positions[&2].x - 400.8).abs() < 1e-9);
	}

	#[test]
	fn closest_point_clamps_to_segment_ends() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(10.0, 0.0);
		assert_eq!(closest_point_on_segment(Point::new(-5.0, 3.0), a, b), a);
		assert_eq!(closest_point_on_segment(Point::new(15.0, 3.0), a, b), b);
		assert_eq!(
			closest_point_on_segment(Point::new(4.0, 3.0), a, b),
			Point::new(4.0, 0.0)
		);
		assert_eq!(closest_point_on_segment(Point::new(4.0, 3.0), a, a), a);
	}

	#[test]
	fn simulation_stops_at_the_cap() {
		let model = GraphModel::build(nodes(&[1, 2, 3]), vec![Edge::new(1, 1, 2, 4)]);
		let mut sim = Simulation::new(LayoutEngine::default(), &model);
		sim.run_to_end(&model);
		assert_eq!(sim.iterations(), 150);
		assert!(sim.is_converged());
		assert!(!sim.tick(&model));
		assert_eq!(sim.progress(), 1.0);
	}

	#[test]
	fn parameters_accept_partial_overrides() {
		let params = LayoutParameters::from_json(r#"{"max_iterations": 20, "spring": 0.05}"#).unwrap();
		assert_eq!(params.max_iterations, 20);
		assert_eq!(params.spring, 0.05);
		assert_eq!(params.repulsion, 8000.0);
	}
}
