use super::geometry::{ARROW_LENGTH, NODE_RADIUS, arrow_path};
use super::layout::{LayoutEngine, LayoutParameters, PositionMap, Simulation};
use super::selection::{HighlightSet, Selection};
use super::source::GraphSnapshot;
use super::types::{GraphModel, Point, TrackId, TransitionId};
use super::viewport::{Release, ViewportController, ViewportLimits};

/// Screen distance within which a click picks a transition.
pub const EDGE_HIT_DISTANCE: f64 = 6.0;

/// Everything the canvas draws and the pointer handlers mutate, shared by the
/// animation frame loop and the event handlers of one canvas.
pub struct ForceGraphState {
	pub model: GraphModel,
	pub highlight: HighlightSet,
	pub simulation: Simulation,
	pub viewport: ViewportController,
	pub selection: Selection,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	epoch: u64,
}

impl ForceGraphState {
	pub fn new(params: LayoutParameters, width: f64, height: f64) -> Self {
		let model = GraphModel::default();
		let drag_bounds = params.drag_bounds();
		Self {
			simulation: Simulation::new(LayoutEngine::new(params), &model),
			model,
			highlight: HighlightSet::default(),
			viewport: ViewportController::new(ViewportLimits::default(), drag_bounds),
			selection: Selection::None,
			width,
			height,
			flow_time: 0.0,
			epoch: 0,
		}
	}

	/// Replaces the displayed graph and restarts the layout. Frame callbacks
	/// scheduled for the previous epoch become stale.
	pub fn load(&mut self, snapshot: GraphSnapshot) -> u64 {
		self.epoch += 1;
		let engine = self.simulation.engine().clone();
		self.simulation = Simulation::new(engine, &snapshot.model);
		self.model = snapshot.model;
		self.highlight = snapshot.highlight;
		self.viewport.cancel();
		let still_present = match self.selection {
			Selection::None => true,
			Selection::Node(id) => self.model.contains(id),
			Selection::Edge(id) => self.model.edge(id).is_some(),
		};
		if !still_present {
			self.selection.clear();
		}
		log::info!(
			"graph view {:?} loaded: {} tracks, {} transitions (epoch {})",
			snapshot.scope,
			self.model.nodes().len(),
			self.model.edges().len(),
			self.epoch
		);
		self.epoch
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	/// One animation frame: a simulation tick followed by the drag override,
	/// so the dragged node stays under the pointer. Returns `false` without
	/// doing anything when `epoch` is stale.
	pub fn frame(&mut self, epoch: u64, dt: f64) -> bool {
		if epoch != self.epoch {
			return false;
		}
		self.simulation.tick(&self.model);
		if let Some((id, pos)) = self.viewport.drag_override() {
			self.simulation.positions_mut().insert(id, pos);
		}
		self.flow_time += dt;
		true
	}

	pub fn positions(&self) -> &PositionMap {
		self.simulation.positions()
	}

	/// Topmost node under a canvas position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<TrackId> {
		let p = self.viewport.transform().to_logical(Point::new(sx, sy));
		let positions = self.positions();
		self.model
			.nodes()
			.iter()
			.rev()
			.find(|n| {
				positions
					.get(&n.id)
					.is_some_and(|pos| pos.distance(p) < NODE_RADIUS)
			})
			.map(|n| n.id)
	}

	/// Closest transition curve under a canvas position.
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<TransitionId> {
		let transform = self.viewport.transform();
		let p = transform.to_logical(Point::new(sx, sy));
		let reach = EDGE_HIT_DISTANCE / transform.zoom;
		let positions = self.positions();
		self.model
			.edges()
			.iter()
			.filter_map(|e| {
				let (from, to) = (positions.get(&e.from)?, positions.get(&e.to)?);
				let curve = arrow_path(*from, *to, NODE_RADIUS, ARROW_LENGTH)?;
				let dist = curve.distance_to(p);
				(dist <= reach).then_some((e.id, dist))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(id, _)| id)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let target = self.node_at_position(sx, sy);
		self.viewport
			.pointer_down(Point::new(sx, sy), target, self.simulation.positions());
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		self.viewport
			.pointer_move(Point::new(sx, sy), self.simulation.positions_mut());
	}

	/// Ends the gesture and applies click selection. Returns whether the
	/// selection changed.
	pub fn pointer_up(&mut self) -> bool {
		let before = self.selection;
		match self.viewport.pointer_up() {
			Release::ClickedNode(id) => self.selection.toggle_node(id),
			Release::ClickedBackground(at) => match self.edge_at_position(at.x, at.y) {
				Some(id) => self.selection.toggle_edge(id),
				None => self.selection.clear(),
			},
			Release::Committed | Release::None => {}
		}
		self.selection != before
	}

	pub fn pointer_leave(&mut self) {
		self.viewport.pointer_leave();
	}

	pub fn wheel(&mut self, delta_y: f64) {
		self.viewport.wheel(delta_y);
	}
}
