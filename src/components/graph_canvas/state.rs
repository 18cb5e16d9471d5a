//! The graph view value object: dataset, simulation, transform and
//! interaction state in one inspectable struct with no framework types.

use crate::graph::{GraphDataset, NodeDetails, NodeKind};

use super::simulation::{node_radius, Simulation};

/// Extra world-space slack around a node for pointer hit-testing.
const HIT_SLACK: f64 = 6.0;
const ZOOM_MIN: f64 = 0.1;
const ZOOM_MAX: f64 = 10.0;
/// Zoom level applied when the view recenters on a selected node.
const SELECT_ZOOM: f64 = 1.8;
/// Pointer travel below this many pixels counts as a click, not a drag.
pub const CLICK_SLOP: f64 = 4.0;
/// Exponential approach rate for animated transforms, per second.
const TRANSFORM_EASE: f64 = 5.0;

const MIN_CANVAS_WIDTH: f64 = 320.0;
const CANVAS_ASPECT: f64 = 0.62;
const MIN_CANVAS_HEIGHT: f64 = 420.0;
const MAX_CANVAS_HEIGHT: f64 = 760.0;

/// Canvas dimensions for a container width, with the aspect ratio bounded
/// so very wide viewports don't produce a needlessly tall canvas.
pub fn bounded_canvas_size(container_width: f64) -> (f64, f64) {
	let width = container_width.max(MIN_CANVAS_WIDTH);
	let height = (width * CANVAS_ASPECT).clamp(MIN_CANVAS_HEIGHT, MAX_CANVAS_HEIGHT);
	(width, height)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub screen_x: f64,
	pub screen_y: f64,
}

/// Payload handed to the host when a node is selected.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedNode {
	pub id: String,
	pub kind: NodeKind,
	pub label: String,
	pub details: Option<NodeDetails>,
}

/// Everything the canvas needs to draw and react. Rebuilt wholesale when a
/// new dataset is installed; nothing survives a reinstall.
pub struct GraphViewState {
	pub dataset: GraphDataset,
	pub simulation: Simulation,
	pub transform: ViewTransform,
	transform_target: Option<ViewTransform>,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub selected: Option<usize>,
	pub width: f64,
	pub height: f64,
}

impl GraphViewState {
	pub fn new(dataset: GraphDataset, width: f64, height: f64) -> Self {
		let simulation = Simulation::new(&dataset, width, height);
		Self {
			dataset,
			simulation,
			transform: ViewTransform::default(),
			transform_target: None,
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			selected: None,
			width,
			height,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position, honouring per-tier radii.
	/// Later nodes draw on top, so the last hit wins.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		for (idx, node) in self.simulation.nodes().iter().enumerate() {
			let (dx, dy) = (node.x - gx, node.y - gy);
			if (dx * dx + dy * dy).sqrt() < node_radius(node.kind) + HIT_SLACK {
				found = Some(idx);
			}
		}
		found
	}

	pub fn selection_payload(&self, idx: usize) -> Option<SelectedNode> {
		let node = self.dataset.nodes.get(idx)?;
		Some(SelectedNode {
			id: node.id.clone(),
			kind: node.kind,
			label: node.label.clone(),
			details: node.details.clone(),
		})
	}

	/// Question ids to surface for review when `idx` is selected, if any.
	pub fn review_question_ids(&self, idx: usize) -> Option<Vec<String>> {
		let node = self.dataset.nodes.get(idx)?;
		if !matches!(node.kind, NodeKind::Code | NodeKind::Subcode) {
			return None;
		}
		let details = node.details.as_ref()?;
		if details.question_ids.is_empty() {
			return None;
		}
		Some(details.question_ids.clone())
	}

	/// Select a node and start the animated recenter/zoom onto it.
	/// Returns the payload for the host.
	pub fn select(&mut self, idx: usize) -> Option<SelectedNode> {
		let payload = self.selection_payload(idx)?;
		self.selected = Some(idx);
		let (nx, ny) = {
			let node = &self.simulation.nodes()[idx];
			(node.x, node.y)
		};
		self.transform_target = Some(ViewTransform {
			x: self.width / 2.0 - nx * SELECT_ZOOM,
			y: self.height / 2.0 - ny * SELECT_ZOOM,
			k: SELECT_ZOOM,
		});
		Some(payload)
	}

	/// Clear the selection and animate back to the default view.
	pub fn clear_selection(&mut self) {
		self.selected = None;
		self.transform_target = Some(ViewTransform::default());
	}

	/// Direct pan; overrides any in-flight recenter animation.
	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.transform_target = None;
		self.transform.x = x;
		self.transform.y = y;
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		// manual zoom overrides any in-flight recenter animation
		self.transform_target = None;
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(ZOOM_MIN, ZOOM_MAX);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Advance the simulation and any in-flight transform animation.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.step();

		if let Some(target) = self.transform_target {
			let t = 1.0 - (-TRANSFORM_EASE * dt).exp();
			self.transform.x += (target.x - self.transform.x) * t;
			self.transform.y += (target.y - self.transform.y) * t;
			self.transform.k += (target.k - self.transform.k) * t;
			let settled = (self.transform.x - target.x).abs() < 0.5
				&& (self.transform.y - target.y).abs() < 0.5
				&& (self.transform.k - target.k).abs() < 0.005;
			if settled {
				self.transform = target;
				self.transform_target = None;
			}
		}
	}

	pub fn drag_node_to(&mut self, idx: usize, sx: f64, sy: f64) {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.simulation.pin(idx, gx, gy);
	}

	pub fn release_drag(&mut self) {
		if let Some(idx) = self.drag.node {
			self.simulation.unpin(idx);
		}
		self.drag = DragState::default();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.resize(width, height);
	}
}
