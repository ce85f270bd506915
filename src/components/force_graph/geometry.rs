//! Drawable shapes for transitions, derived from endpoint positions only.

use std::fmt::Write;

use super::types::Point;

/// Radius of a track circle in logical units.
pub const NODE_RADIUS: f64 = 25.0;
/// Gap left between a curve and the node it points at, for the arrowhead.
pub const ARROW_LENGTH: f64 = 10.0;
/// Side length of an arrowhead.
pub const ARROW_SIZE: f64 = 8.0;
/// Perpendicular offset of a curve's control point.
pub const CURVE_BOW: f64 = 30.0;
/// Half-angle of an arrowhead, in radians.
const ARROW_SPREAD: f64 = 0.5;

/// Quadratic curve from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadCurve {
	/// Start point.
	pub start: Point,
	/// Control point.
	pub control: Point,
	/// End point.
	pub end: Point,
}

impl QuadCurve {
	/// Point at parameter `t` in `[0, 1]`.
	pub fn at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
	}

	/// Approximate distance from `p` to the curve, sampled along its length.
	pub fn distance_to(&self, p: Point) -> f64 {
		const SAMPLES: usize = 24;
		(0..=SAMPLES)
			.map(|i| self.at(i as f64 / SAMPLES as f64).distance(p))
			.fold(f64::INFINITY, f64::min)
	}

	/// SVG path data, `M x y Q cx cy x y`.
	pub fn to_svg(&self) -> String {
		let mut d = String::new();
		let _ = write!(
			d,
			"M {} {} Q {} {} {} {}",
			self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
		);
		d
	}
}

/// Filled arrowhead triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
	/// Point touching the destination node.
	pub tip: Point,
	/// Back corner on one side.
	pub left: Point,
	/// Back corner on the other side.
	pub right: Point,
}

impl Triangle {
	/// SVG path data, `M tip L left L right Z`.
	pub fn to_svg(&self) -> String {
		format!(
			"M {} {} L {} {} L {} {} Z",
			self.tip.x, self.tip.y, self.left.x, self.left.y, self.right.x, self.right.y
		)
	}
}

/// Curved transition body from `from` to `to`, trimmed by `node_radius` at the
/// start and by `node_radius + arrow_length` at the end, bowed sideways so
/// opposite transitions between two tracks stay apart. `None` when the
/// endpoints coincide.
pub fn arrow_path(from: Point, to: Point, node_radius: f64, arrow_length: f64) -> Option<QuadCurve> {
	let delta = to - from;
	let dist = delta.length();
	if dist <= f64::EPSILON {
		return None;
	}

	let start = from + delta * (node_radius / dist);
	let end = from + delta * ((dist - node_radius - arrow_length) / dist);
	let mid = (start + end) / 2.0;
	let normal = Point::new(-delta.y, delta.x) / dist;

	Some(QuadCurve {
		start,
		control: mid + normal * CURVE_BOW,
		end,
	})
}

/// Arrowhead whose tip sits where the transition meets the destination
/// node's boundary. `None` when the endpoints coincide.
pub fn arrow_head(from: Point, to: Point, node_radius: f64, arrow_size: f64) -> Option<Triangle> {
	let delta = to - from;
	let dist = delta.length();
	if dist <= f64::EPSILON {
		return None;
	}

	let tip = to - delta * (node_radius / dist);
	let angle = delta.y.atan2(delta.x);
	let corner = |a: f64| tip - Point::new(a.cos(), a.sin()) * arrow_size;

	Some(Triangle {
		tip,
		left: corner(angle - ARROW_SPREAD),
		right: corner(angle + ARROW_SPREAD),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_is_trimmed_at_both_ends() {
		let curve = arrow_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 25.0, 10.0).unwrap();
		assert!((curve.start.x - 25.0).abs() < 1e-9);
		assert!(curve.end.x < 90.0);
		assert!((curve.end.x - 65.0).abs() < 1e-9);
		assert!((curve.control.x - 45.0).abs() < 1e-9);
		assert!((curve.control.y - 30.0).abs() < 1e-9);
	}

	#[test]
	fn opposite_transitions_bow_to_opposite_sides() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(100.0, 0.0);
		let forth = arrow_path(a, b, NODE_RADIUS, ARROW_LENGTH).unwrap();
		let back = arrow_path(b, a, NODE_RADIUS, ARROW_LENGTH).unwrap();
		assert!(forth.control.y > 0.0);
		assert!(back.control.y < 0.0);
	}

	#[test]
	fn head_tip_touches_the_destination_circle() {
		let head = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 25.0, 8.0).unwrap();
		assert_eq!(head.tip, Point::new(75.0, 0.0));
		assert!(head.left.x < 75.0 && head.right.x < 75.0);
		assert!((head.left.y + head.right.y).abs() < 1e-9);
	}

	#[test]
	fn coincident_endpoints_yield_nothing() {
		let p = Point::new(3.0, 4.0);
		assert_eq!(arrow_path(p, p, NODE_RADIUS, ARROW_LENGTH), None);
		assert_eq!(arrow_head(p, p, NODE_RADIUS, ARROW_SIZE), None);
	}

	#[test]
	fn svg_output() {
		let curve = arrow_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 25.0, 10.0).unwrap();
		assert_eq!(curve.to_svg(), "M 25 0 Q 45 30 65 0");
	}

	#[test]
	fn curve_distance() {
		let curve = arrow_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 25.0, 10.0).unwrap();
		assert!(curve.distance_to(curve.at(0.5)) < 1e-9);
		assert!(curve.distance_to(Point::new(45.0, -40.0)) > 30.0);
	}
}
