use mixgraph::components::force_graph::{
	Edge, GraphModel, LayoutEngine, LayoutParameters, Node, Point, PositionMap, Simulation, TrackId,
};

fn tracks(ids: impl IntoIterator<Item = TrackId>) -> Vec<Node> {
	ids.into_iter().map(|id| Node::new(id, format!("Track {id}"))).collect()
}

#[test]
fn connected_pair_settles_near_the_ideal_edge_length() {
	let model = GraphModel::build(tracks([1, 2]), vec![Edge::new(1, 1, 2, 5)]);
	let mut sim = Simulation::new(LayoutEngine::default(), &model);

	let initial = sim.positions()[&1].distance(sim.positions()[&2]);
	assert!((initial - 300.0).abs() < 1e-9);
	let midpoint = (sim.positions()[&1] + sim.positions()[&2]) / 2.0;
	assert!(midpoint.distance(Point::new(400.0, 300.0)) < 1e-9);

	sim.run_to_end(&model);
	let settled = sim.positions()[&1].distance(sim.positions()[&2]);
	assert!((settled - 120.0).abs() < (initial - 120.0).abs());
	assert!(settled > 120.0 && settled < 150.0);
}

#[test]
fn every_node_ends_inside_the_layout_bounds() {
	let ids: Vec<TrackId> = (1..=30).collect();
	let mut edges: Vec<Edge> = ids
		.iter()
		.map(|&id| Edge::new(id, id, id % 30 + 1, 3))
		.collect();
	edges.push(Edge::new(100, 1, 15, 4));
	edges.push(Edge::new(101, 1, 15, 2));
	edges.push(Edge::new(102, 15, 1, 5));
	let model = GraphModel::build(tracks(ids), edges);

	let mut sim = Simulation::new(LayoutEngine::default(), &model);
	sim.run_to_end(&model);
	assert_eq!(sim.iterations(), 150);

	let bounds = LayoutParameters::default().layout_bounds();
	for node in model.nodes() {
		let pos = sim.positions()[&node.id];
		assert!(bounds.contains(pos), "track {} escaped to {pos:?}", node.id);
		assert!(pos.x.is_finite() && pos.y.is_finite());
	}
}

#[test]
fn dangling_edges_are_skipped() {
	let model = GraphModel::build(
		tracks([1, 2, 3]),
		vec![Edge::new(1, 1, 404, 3), Edge::new(2, 405, 406, 3)],
	);
	let engine = LayoutEngine::default();
	let mut with_dangling = engine.initialize(model.nodes());
	let mut without = with_dangling.clone();

	for _ in 0..20 {
		engine.step(&mut with_dangling, model.nodes(), model.edges());
		engine.step(&mut without, model.nodes(), &[]);
	}
	assert_eq!(with_dangling, without);
}

#[test]
fn nodes_missing_from_the_list_are_untouched() {
	let engine = LayoutEngine::default();
	let listed = tracks([1, 2, 3, 4]);
	let mut positions: PositionMap = engine.initialize(&listed);
	positions.insert(99, Point::new(400.0, 300.0));
	positions.insert(98, Point::new(-10.0, 5000.0));

	for _ in 0..50 {
		engine.step(&mut positions, &listed, &[Edge::new(1, 1, 99, 3)]);
	}
	assert_eq!(positions[&99], Point::new(400.0, 300.0));
	assert_eq!(positions[&98], Point::new(-10.0, 5000.0));
}

#[test]
fn layout_is_deterministic() {
	let model = GraphModel::build(
		tracks([5, 3, 8, 1]),
		vec![Edge::new(1, 5, 3, 3), Edge::new(2, 3, 8, 3), Edge::new(3, 8, 5, 3)],
	);
	let mut a = Simulation::new(LayoutEngine::default(), &model);
	let mut b = Simulation::new(LayoutEngine::default(), &model);
	a.run_to_end(&model);
	b.run_to_end(&model);
	assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn custom_iteration_cap() {
	let params = LayoutParameters {
		max_iterations: 10,
		..LayoutParameters::default()
	};
	let model = GraphModel::build(tracks([1, 2]), vec![]);
	let mut sim = Simulation::new(LayoutEngine::new(params), &model);
	for _ in 0..5 {
		sim.tick(&model);
	}
	assert_eq!(sim.progress(), 0.5);
	sim.run_to_end(&model);
	assert_eq!(sim.iterations(), 10);
}

#[test]
fn one_step_applies_forces_in_place_and_in_order() {
	let engine = LayoutEngine::default();
	let listed = tracks([1, 2, 3]);
	let mut positions = PositionMap::new();
	positions.insert(1, Point::new(300.0, 300.0));
	positions.insert(2, Point::new(400.0, 300.0));
	positions.insert(3, Point::new(500.0, 300.0));

	engine.step(&mut positions, &listed, &[Edge::new(1, 1, 2, 3)]);
	let expected = [(1, 298.431_251_347), (2, 400.560_626_096), (3, 501.008_122_557)];
	for (id, x) in expected {
		assert!((positions[&id].x - x).abs() < 1e-6, "track {id} at {:?}", positions[&id]);
		assert_eq!(positions[&id].y, 300.0);
	}
}

#[test]
fn duplicate_tracks_are_seeded_once() {
	let mut listed = tracks([1, 1, 2]);
	listed[1].title = "Duplicate".into();
	let model = GraphModel::build(listed, vec![]);
	assert_eq!(model.nodes().len(), 2);

	let sim = Simulation::new(LayoutEngine::default(), &model);
	let first = sim.positions()[&1];
	assert!(first.distance(Point::new(400.0, 150.0)) < 1e-9);
	let second = sim.positions()[&2];
	assert!(second.distance(Point::new(400.0, 450.0)) < 1e-9);
}
