//! Pointer and wheel handling: node dragging, panning and zooming.
//!
//! Logical coordinates relate to canvas coordinates through
//! `screen = (logical + pan) * zoom`, so the inverse used by every handler is
//! `logical = screen / zoom - pan`.

use super::layout::{Bounds, PositionMap};
use super::types::{Point, TrackId};

/// Zoom bounds and step sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportLimits {
	/// Smallest zoom factor.
	pub min_zoom: f64,
	/// Largest zoom factor.
	pub max_zoom: f64,
	/// Factor applied per wheel notch towards the user.
	pub wheel_in: f64,
	/// Factor applied per wheel notch away from the user.
	pub wheel_out: f64,
	/// Factor applied by the zoom buttons.
	pub button_step: f64,
	/// Screen distance a press may travel and still count as a click.
	pub click_slop: f64,
}

impl Default for ViewportLimits {
	fn default() -> Self {
		Self {
			min_zoom: 0.3,
			max_zoom: 3.0,
			wheel_in: 1.1,
			wheel_out: 0.9,
			button_step: 1.2,
			click_slop: 3.0,
		}
	}
}

/// Render-time affine transform; never alters logical node positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
	/// Scale factor.
	pub zoom: f64,
	/// Translation in logical units, applied before scaling.
	pub pan: Point,
}

impl Default for ViewportTransform {
	fn default() -> Self {
		Self {
			zoom: 1.0,
			pan: Point::default(),
		}
	}
}

impl ViewportTransform {
	/// Canvas position to logical position.
	pub fn to_logical(&self, screen: Point) -> Point {
		screen / self.zoom - self.pan
	}

	/// Logical position to canvas position.
	pub fn to_screen(&self, logical: Point) -> Point {
		(logical + self.pan) * self.zoom
	}
}

/// Interaction state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interaction {
	/// Nothing pressed.
	#[default]
	Idle,
	/// A node follows the pointer.
	DraggingNode {
		/// Node being dragged.
		node: TrackId,
		/// Pointer-to-node offset captured at press time, in logical units.
		offset: Point,
		/// Screen position of the press.
		pressed_at: Point,
		/// Whether the pointer left the click slop.
		moved: bool,
	},
	/// The view follows the pointer.
	Panning {
		/// Screen position of the previous pointer event.
		last: Point,
		/// Screen position of the press.
		pressed_at: Point,
		/// Whether the pointer left the click slop.
		moved: bool,
	},
}

/// What a pointer release amounted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Release {
	/// Nothing was pressed.
	None,
	/// A drag or pan ended; the current state is kept as is.
	Committed,
	/// Press and release on the same node without moving.
	ClickedNode(TrackId),
	/// Press and release on the background without moving, at this screen point.
	ClickedBackground(Point),
}

/// Pan, zoom and node drag controller.
#[derive(Clone, Debug)]
pub struct ViewportController {
	transform: ViewportTransform,
	interaction: Interaction,
	limits: ViewportLimits,
	drag_bounds: Bounds,
	drag_target: Option<(TrackId, Point)>,
}

impl ViewportController {
	/// Builds an idle controller that clamps dragged nodes into `drag_bounds`.
	pub fn new(limits: ViewportLimits, drag_bounds: Bounds) -> Self {
		Self {
			transform: ViewportTransform::default(),
			interaction: Interaction::Idle,
			limits,
			drag_bounds,
			drag_target: None,
		}
	}

	/// Current transform.
	pub fn transform(&self) -> ViewportTransform {
		self.transform
	}

	/// Current interaction state.
	pub fn interaction(&self) -> Interaction {
		self.interaction
	}

	/// Node currently being dragged.
	pub fn dragged_node(&self) -> Option<TrackId> {
		match self.interaction {
			Interaction::DraggingNode { node, .. } => Some(node),
			_ => None,
		}
	}

	/// Whether the background is being dragged.
	pub fn is_panning(&self) -> bool {
		matches!(self.interaction, Interaction::Panning { .. })
	}

	/// Last position the drag asked for, re-applied after every simulation
	/// tick so the dragged node does not fight the layout.
	pub fn drag_override(&self) -> Option<(TrackId, Point)> {
		self.drag_target
	}

	/// Starts a node drag when `target` has a position, a pan otherwise.
	pub fn pointer_down(&mut self, screen: Point, target: Option<TrackId>, positions: &PositionMap) {
		let node = target.and_then(|id| positions.get(&id).map(|&pos| (id, pos)));
		self.interaction = match node {
			Some((id, pos)) => {
				let offset = self.transform.to_logical(screen) - pos;
				log::debug!("drag start on track {id}");
				Interaction::DraggingNode {
					node: id,
					offset,
					pressed_at: screen,
					moved: false,
				}
			}
			None => Interaction::Panning {
				last: screen,
				pressed_at: screen,
				moved: false,
			},
		};
		self.drag_target = None;
	}

	/// Moves the dragged node or the view.
	pub fn pointer_move(&mut self, screen: Point, positions: &mut PositionMap) {
		let slop = self.limits.click_slop;
		match &mut self.interaction {
			Interaction::Idle => {}
			Interaction::DraggingNode {
				node,
				offset,
				pressed_at,
				moved,
			} => {
				*moved |= screen.distance(*pressed_at) > slop;
				let logical = self.transform.to_logical(screen) - *offset;
				let target = self.drag_bounds.clamp(logical);
				if let Some(pos) = positions.get_mut(&*node) {
					*pos = target;
					self.drag_target = Some((*node, target));
				}
			}
			Interaction::Panning {
				last,
				pressed_at,
				moved,
			} => {
				*moved |= screen.distance(*pressed_at) > slop;
				self.transform.pan = self.transform.pan + (screen - *last) / self.transform.zoom;
				*last = screen;
			}
		}
	}

	/// Ends the current gesture.
	pub fn pointer_up(&mut self) -> Release {
		let release = match self.interaction {
			Interaction::Idle => Release::None,
			Interaction::DraggingNode {
				node, moved: false, ..
			} => Release::ClickedNode(node),
			Interaction::Panning {
				pressed_at,
				moved: false,
				..
			} => Release::ClickedBackground(pressed_at),
			_ => Release::Committed,
		};
		self.reset_gesture();
		release
	}

	/// Ends the current gesture without treating it as a click.
	pub fn pointer_leave(&mut self) {
		self.reset_gesture();
	}

	/// Zooms in for negative `delta_y` and out for positive; zero is ignored.
	pub fn wheel(&mut self, delta_y: f64) {
		if delta_y > 0.0 {
			self.zoom_by(self.limits.wheel_out);
		} else if delta_y < 0.0 {
			self.zoom_by(self.limits.wheel_in);
		}
	}

	/// One zoom-button step in.
	pub fn zoom_in(&mut self) {
		self.zoom_by(self.limits.button_step);
	}

	/// One zoom-button step out.
	pub fn zoom_out(&mut self) {
		self.zoom_by(1.0 / self.limits.button_step);
	}

	/// Back to zoom 1 with no pan.
	pub fn reset_view(&mut self) {
		self.transform = ViewportTransform::default();
	}

	/// Abandons any gesture; used when the graph is replaced.
	pub fn cancel(&mut self) {
		self.reset_gesture();
	}

	fn zoom_by(&mut self, factor: f64) {
		self.transform.zoom =
			(self.transform.zoom * factor).clamp(self.limits.min_zoom, self.limits.max_zoom);
	}

	fn reset_gesture(&mut self) {
		if self.interaction != Interaction::Idle {
			log::debug!("gesture ended: {:?}", self.interaction);
		}
		self.interaction = Interaction::Idle;
		self.drag_target = None;
	}
}

impl Default for ViewportController {
	fn default() -> Self {
		let bounds = super::layout::LayoutParameters::default().drag_bounds();
		Self::new(ViewportLimits::default(), bounds)
	}
}
