use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::info;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use crate::graph::GraphDataset;

use super::render;
use super::state::{
	bounded_canvas_size, GraphViewState, HoverState, PanState, SelectedNode, CLICK_SLOP,
};

const FRAME_DT: f64 = 0.016;

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let parent_width = canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.unwrap_or(800.0);
	bounded_canvas_size(parent_width)
}

/// Interactive canvas for a competency [`GraphDataset`].
///
/// Any change to `data` tears the previous view down and installs a fresh
/// one — positions are never carried across rebuilds. `on_select` receives
/// `Some(payload)` when a node is clicked and `None` when the selection is
/// cleared; `on_review_questions` fires when a selected code node carries
/// question ids.
#[component]
pub fn CompetencyGraphCanvas(
	#[prop(into)] data: Signal<GraphDataset>,
	#[prop(into)] on_select: Callback<Option<SelectedNode>>,
	#[prop(into)] on_review_questions: Callback<Vec<String>>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<GraphViewState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let dataset = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = match (width, height) {
			(Some(w), Some(h)) => (w, h),
			_ => container_size(&canvas),
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		info!(
			"installing graph dataset: {} nodes, {} edges",
			dataset.nodes.len(),
			dataset.edges.len()
		);
		*state_init.borrow_mut() = Some(GraphViewState::new(dataset, w, h));

		if resize_cb_init.borrow().is_none() && width.is_none() && height.is_none() {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let (nw, nh) = container_size(&canvas_resize);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		if animate_init.borrow().is_none() {
			let ctx: CanvasRenderingContext2d = canvas
				.get_context("2d")
				.unwrap()
				.unwrap()
				.dyn_into()
				.unwrap();
			let (state_anim, animate_inner, resize_anim, canvas_anim) = (
				state_init.clone(),
				animate_init.clone(),
				resize_cb_init.clone(),
				canvas.clone(),
			);
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				// the canvas leaving the DOM means the view unmounted:
				// release the view state and listener, stop the frame loop
				if !canvas_anim.is_connected() {
					if let Some(ref cb) = *resize_anim.borrow() {
						let _ = web_sys::window()
							.unwrap()
							.remove_event_listener_with_callback(
								"resize",
								cb.as_ref().unchecked_ref(),
							);
					}
					*resize_anim.borrow_mut() = None;
					*state_anim.borrow_mut() = None;
					return;
				}
				if let Some(ref mut s) = *state_anim.borrow_mut() {
					s.tick(FRAME_DT);
					render::render(s, &ctx);
				}
				if let Some(ref cb) = *animate_inner.borrow() {
					let _ = web_sys::window()
						.unwrap()
						.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}
	});

	let pointer_position = move |ev: &MouseEvent| -> (f64, f64) {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag.active = true;
				s.drag.node = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				s.drag.moved = false;
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
				s.pan.moved = false;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				let travel = ((x - s.drag.start_x).powi(2) + (y - s.drag.start_y).powi(2)).sqrt();
				if travel > CLICK_SLOP {
					s.drag.moved = true;
				}
				if s.drag.moved {
					if let Some(idx) = s.drag.node {
						s.drag_node_to(idx, x, y);
					}
				}
			} else if s.pan.active {
				let travel = ((x - s.pan.start_x).powi(2) + (y - s.pan.start_y).powi(2)).sqrt();
				if travel > CLICK_SLOP {
					s.pan.moved = true;
				}
				if s.pan.moved {
					s.pan_to(
						s.pan.transform_start_x + (x - s.pan.start_x),
						s.pan.transform_start_y + (y - s.pan.start_y),
					);
				}
			} else {
				s.hover.node = s.node_at_position(x, y);
				s.hover.screen_x = x;
				s.hover.screen_y = y;
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		// resolve against the view state first, then notify the host with
		// the borrow released so callbacks can re-enter freely
		let mut selection: Option<Option<SelectedNode>> = None;
		let mut review: Option<Vec<String>> = None;
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active {
				let clicked = !s.drag.moved;
				let idx = s.drag.node;
				s.release_drag();
				if clicked {
					if let Some(idx) = idx {
						if let Some(payload) = s.select(idx) {
							review = s.review_question_ids(idx);
							selection = Some(Some(payload));
						}
					}
				}
			} else if s.pan.active {
				let clicked = !s.pan.moved;
				s.pan = PanState::default();
				if clicked {
					s.clear_selection();
					selection = Some(None);
				}
			}
		}
		if let Some(payload) = selection {
			on_select.run(payload);
		}
		if let Some(ids) = review {
			on_review_questions.run(ids);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.release_drag();
			s.pan = PanState::default();
			s.hover = HoverState::default();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="competency-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
