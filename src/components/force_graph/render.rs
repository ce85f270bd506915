use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{ARROW_LENGTH, ARROW_SIZE, NODE_RADIUS, arrow_head, arrow_path};
use super::state::ForceGraphState;
use super::types::{DegreeClass, Edge};

const BACKGROUND: &str = "#1a1a2e";
const ACCENT: &str = "#e94560";
const PLAYLIST: &str = "251, 191, 36";

fn degree_color(class: DegreeClass) -> &'static str {
	match class {
		DegreeClass::Both => "#2d4a7c",
		DegreeClass::Outgoing => "#1a5c3a",
		DegreeClass::Incoming => "#5c3a1a",
		DegreeClass::Isolated => "#3a3a5c",
	}
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let transform = state.viewport.transform();
	ctx.save();
	let _ = ctx.scale(transform.zoom, transform.zoom);
	let _ = ctx.translate(transform.pan.x, transform.pan.y);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();

	draw_progress(state, ctx);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let positions = state.positions();
	let selected = state.selection.edge();
	let dimmed = !state.highlight.is_empty();
	let (dash, gap) = (8.0, 4.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);

	for edge in state.model.edges() {
		let (Some(&from), Some(&to)) = (positions.get(&edge.from), positions.get(&edge.to)) else {
			continue;
		};
		let (Some(curve), Some(head)) = (
			arrow_path(from, to, NODE_RADIUS, ARROW_LENGTH),
			arrow_head(from, to, NODE_RADIUS, ARROW_SIZE),
		) else {
			continue;
		};

		let on_path = state.highlight.contains_edge(edge.from, edge.to);
		let (stroke, fill, width) = edge_style(edge, on_path, dimmed, selected == Some(edge.id));

		ctx.set_stroke_style_str(&stroke);
		ctx.set_line_width(width);
		if on_path {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}
		ctx.begin_path();
		ctx.move_to(curve.start.x, curve.start.y);
		ctx.quadratic_curve_to(curve.control.x, curve.control.y, curve.end.x, curve.end.y);
		ctx.stroke();
		if on_path {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		ctx.set_fill_style_str(&fill);
		ctx.begin_path();
		ctx.move_to(head.tip.x, head.tip.y);
		ctx.line_to(head.left.x, head.left.y);
		ctx.line_to(head.right.x, head.right.y);
		ctx.close_path();
		ctx.fill();
	}
}

/// Stroke colour, arrowhead colour and line width of a transition.
fn edge_style(edge: &Edge, on_path: bool, dimmed: bool, selected: bool) -> (String, String, f64) {
	let rating = edge.stars() as f64;
	let mut stroke_alpha = 0.3 + rating * 0.15;
	let mut head_alpha = 0.5 + rating * 0.1;
	let mut width = 1.0 + rating * 0.5;
	if dimmed && !on_path {
		stroke_alpha *= 0.35;
		head_alpha *= 0.35;
	}
	if selected {
		width += 2.0;
		stroke_alpha = 1.0;
		head_alpha = 1.0;
	}

	let rgb = if on_path { PLAYLIST } else { "233, 69, 96" };
	(
		format!("rgba({rgb}, {stroke_alpha})"),
		format!("rgba({rgb}, {head_alpha})"),
		width,
	)
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let positions = state.positions();
	let selected = state.selection.node();
	let dimmed = !state.highlight.is_empty();

	for node in state.model.nodes() {
		let Some(&pos) = positions.get(&node.id) else {
			continue;
		};
		let is_selected = selected == Some(node.id);
		let on_path = state.highlight.contains_node(node.id);

		ctx.set_global_alpha(if dimmed && !on_path { 0.45 } else { 1.0 });
		ctx.begin_path();
		let _ = ctx.arc(pos.x, pos.y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if is_selected {
			ACCENT
		} else {
			degree_color(state.model.degree_class(node.id))
		});
		ctx.fill();

		let (stroke, width) = match (is_selected, on_path && dimmed) {
			(true, _) => ("#ffffff".to_string(), 3.0),
			(false, true) => (format!("rgb({PLAYLIST})"), 2.5),
			(false, false) => (ACCENT.to_string(), 1.5),
		};
		ctx.set_stroke_style_str(&stroke);
		ctx.set_line_width(width);
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font("500 8px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&node.short_title(), pos.x, pos.y + 3.0);

		ctx.set_font("9px sans-serif");
		ctx.set_text_align("left");
		let outgoing = state.model.outgoing_count(node.id);
		if outgoing > 0 {
			ctx.set_fill_style_str("#4ade80");
			let _ = ctx.fill_text(&format!("↗{outgoing}"), pos.x + 20.0, pos.y - 20.0);
		}
		let incoming = state.model.incoming_count(node.id);
		if incoming > 0 {
			ctx.set_fill_style_str("#fbbf24");
			let _ = ctx.fill_text(&format!("↙{incoming}"), pos.x - 30.0, pos.y - 20.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_progress(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	if state.simulation.is_converged() || state.model.is_empty() {
		return;
	}
	let progress = state.simulation.progress();
	let (x, y, w, h) = (12.0, state.height - 18.0, 160.0, 6.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.15)");
	ctx.fill_rect(x, y, w, h);
	ctx.set_fill_style_str(ACCENT);
	ctx.fill_rect(x, y, w * progress, h);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
	ctx.set_font("10px sans-serif");
	ctx.set_text_align("left");
	let _ = ctx.fill_text(
		&format!("Layout {:.0}%", progress * 100.0),
		x,
		y - 4.0,
	);
}
