use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::layout::LayoutParameters;
use super::render;
use super::selection::Selection;
use super::source::GraphSnapshot;
use super::state::ForceGraphState;

const FRAME_DT: f64 = 0.016;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas that lays out and draws a track transition graph, with node drag,
/// background pan, wheel zoom and click selection.
///
/// Every change of `data` cancels the running layout and starts a new one
/// from the circular seed layout.
#[component]
pub fn ForceGraphCanvas(
	/// Graph view to display.
	#[prop(into)]
	data: Signal<GraphSnapshot>,
	/// Focused node or edge, written on click and read back when changed
	/// from outside.
	#[prop(optional)]
	selection: Option<RwSignal<Selection>>,
	/// Layout constants.
	#[prop(optional)]
	params: Option<LayoutParameters>,
	/// Canvas width; defaults to the parent's width.
	#[prop(optional)]
	width: Option<f64>,
	/// Canvas height; defaults to the parent's height.
	#[prop(optional)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let selection = selection.unwrap_or_else(|| RwSignal::new(Selection::None));
	let zoom = RwSignal::new(1.0_f64);
	let params = params.unwrap_or_default();

	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let (state_init, animate_init, pending_init) = (state.clone(), animate.clone(), pending.clone());

	Effect::new(move |_| {
		let snapshot = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			log::error!("canvas has no 2d context");
			return;
		};

		if let Some(handle) = pending_init.take() {
			let _ = window.cancel_animation_frame(handle);
		}

		let (epoch, loaded_selection) = {
			let mut slot = state_init.borrow_mut();
			let s = slot.get_or_insert_with(|| {
				let parent = canvas.parent_element();
				let w = width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.filter(|w| *w > 0.0)
						.unwrap_or(params.canvas_width)
				});
				let h = height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.filter(|h| *h > 0.0)
						.unwrap_or(params.canvas_height)
				});
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
				ForceGraphState::new(params.clone(), w, h)
			});
			(s.load(snapshot), s.selection)
		};
		selection.set(loaded_selection);

		let (state_anim, animate_inner, pending_anim) =
			(state_init.clone(), animate_init.clone(), pending_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let live = match state_anim.borrow_mut().as_mut() {
				Some(s) => {
					let live = s.frame(epoch, FRAME_DT);
					if live {
						render::render(s, &ctx);
					}
					live
				}
				None => false,
			};
			if !live {
				return;
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				pending_anim.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			pending_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let state_sel = state.clone();
	Effect::new(move |_| {
		let wanted = selection.get();
		if let Some(ref mut s) = *state_sel.borrow_mut() {
			s.selection = wanted;
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let changed = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.pointer_up().then_some(s.selection));
		if let Some(sel) = changed {
			selection.set(sel);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(ev.delta_y());
			zoom.set(s.viewport.transform().zoom);
		}
	};

	let zoom_action = move |f: fn(&mut ForceGraphState)| {
		let state = state.clone();
		move |_: MouseEvent| {
			if let Some(ref mut s) = *state.borrow_mut() {
				f(s);
				zoom.set(s.viewport.transform().zoom);
			}
		}
	};

	view! {
		<div class="graph-canvas-wrap">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="zoom-controls">
				<button class="btn btn-small" on:click=zoom_action(|s| s.viewport.zoom_in())>"+"</button>
				<span>{move || format!("{:.0}%", zoom.get() * 100.0)}</span>
				<button class="btn btn-small" on:click=zoom_action(|s| s.viewport.zoom_out())>"−"</button>
				<button class="btn btn-small btn-secondary" on:click=zoom_action(|s| s.viewport.reset_view())>
					"Reset"
				</button>
			</div>
		</div>
	}
}
