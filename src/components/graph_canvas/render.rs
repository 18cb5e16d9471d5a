//! Canvas drawing for the competency graph.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::graph::{Category, GraphNode, MasteryStatus, NodeKind};

use super::simulation::node_radius;
use super::state::GraphViewState;

const BACKGROUND: &str = "#f8fafc";
const EDGE_COLOR: &str = "100, 116, 139";
const LABEL_COLOR: &str = "#1e293b";
const SELECTION_STROKE: &str = "#0f172a";
const TOOLTIP_BG: &str = "rgba(15, 23, 42, 0.92)";
const TOOLTIP_TEXT: &str = "#f1f5f9";

const SCORE_GOOD: f64 = 80.0;
const SCORE_WARN: f64 = 60.0;

fn status_color(status: MasteryStatus) -> &'static str {
	match status {
		MasteryStatus::Red => "#ef4444",
		MasteryStatus::Yellow => "#f59e0b",
		MasteryStatus::Green => "#22c55e",
	}
}

fn score_color(score: f64) -> &'static str {
	if score >= SCORE_GOOD {
		"#22c55e"
	} else if score >= SCORE_WARN {
		"#f59e0b"
	} else {
		"#ef4444"
	}
}

fn category_color(category: Category) -> &'static str {
	match category {
		Category::Knowledge => "#3b82f6",
		Category::Skills => "#8b5cf6",
		Category::Attitudes => "#ec4899",
	}
}

fn node_fill(node: &GraphNode) -> &'static str {
	match node.kind {
		NodeKind::Center => score_color(node.score.unwrap_or(0.0)),
		NodeKind::Theme => category_color(node.category.unwrap_or(Category::Knowledge)),
		NodeKind::Code | NodeKind::Subcode => {
			status_color(node.status.unwrap_or(MasteryStatus::Red))
		}
	}
}

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_tooltip(state, ctx);
}

fn draw_edges(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	// resolve endpoints through the id-order invariant between dataset and
	// simulation nodes
	let positions = state.simulation.nodes();
	let index = |id: &str| state.dataset.nodes.iter().position(|n| n.id == id);

	for edge in &state.dataset.edges {
		let (Some(si), Some(ti)) = (index(&edge.source), index(&edge.target)) else {
			continue;
		};
		let (s, t) = (&positions[si], &positions[ti]);
		let (dx, dy) = (t.x - s.x, t.y - s.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let (r1, r2) = (node_radius(s.kind), node_radius(t.kind));

		ctx.set_stroke_style_str(&format!("rgba({EDGE_COLOR}, {})", 0.25 + 0.35 * edge.weight));
		ctx.set_line_width((edge.weight * 2.0) / k);
		ctx.begin_path();
		ctx.move_to(s.x + ux * r1, s.y + uy * r1);
		ctx.line_to(t.x - ux * r2, t.y - uy * r2);
		ctx.stroke();
	}
}

fn draw_nodes(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for (idx, node) in state.dataset.nodes.iter().enumerate() {
		let sim = &state.simulation.nodes()[idx];
		let radius = node_radius(node.kind);

		ctx.begin_path();
		let _ = ctx.arc(sim.x, sim.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_fill(node));
		ctx.fill();

		if state.selected == Some(idx) {
			ctx.begin_path();
			let _ = ctx.arc(sim.x, sim.y, radius + 4.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(SELECTION_STROKE);
			ctx.set_line_width(2.5 / k);
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(6.0 / k),
				&JsValue::from_f64(4.0 / k),
			));
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		match node.kind {
			NodeKind::Center => {
				ctx.set_fill_style_str("white");
				ctx.set_font(&format!("bold {}px sans-serif", 16.0 / k.max(0.5)));
				ctx.set_text_align("center");
				ctx.set_text_baseline("middle");
				let score = node.score.unwrap_or(0.0);
				let _ = ctx.fill_text(&format!("{score:.0}"), sim.x, sim.y);
				ctx.set_text_align("start");
				ctx.set_text_baseline("alphabetic");
			}
			NodeKind::Theme => {
				ctx.set_fill_style_str(LABEL_COLOR);
				ctx.set_font(&format!("bold {}px sans-serif", 12.0 / k.max(0.5)));
				let _ = ctx.fill_text(&node.label, sim.x + radius + 4.0, sim.y + 4.0);
			}
			NodeKind::Code | NodeKind::Subcode => {
				ctx.set_fill_style_str(LABEL_COLOR);
				ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
				let _ = ctx.fill_text(&node.label, sim.x + radius + 3.0, sim.y + 3.0);
			}
		}
	}
}

fn draw_tooltip(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	if state.drag.active || state.pan.active {
		return;
	}
	let Some(idx) = state.hover.node else {
		return;
	};
	let Some(node) = state.dataset.nodes.get(idx) else {
		return;
	};

	let mut lines = vec![node.label.clone()];
	if let Some(details) = &node.details {
		if let (Some(correct), Some(total)) = (details.correct, details.total) {
			lines.push(format!("{correct}/{total} correct"));
		}
		if let Some(explanation) = &details.explanation {
			lines.push(truncate(explanation, 64));
		}
	}

	ctx.set_font("12px sans-serif");
	let mut width = 0.0f64;
	for line in &lines {
		if let Ok(metrics) = ctx.measure_text(line) {
			width = width.max(metrics.width());
		}
	}

	let line_height = 16.0;
	let pad = 8.0;
	let box_w = width + pad * 2.0;
	let box_h = lines.len() as f64 * line_height + pad * 2.0;
	// keep the box inside the canvas
	let x = (state.hover.screen_x + 14.0).min(state.width - box_w - 4.0).max(4.0);
	let y = (state.hover.screen_y + 14.0).min(state.height - box_h - 4.0).max(4.0);

	ctx.set_fill_style_str(TOOLTIP_BG);
	ctx.fill_rect(x, y, box_w, box_h);
	ctx.set_fill_style_str(TOOLTIP_TEXT);
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + pad, y + pad + (i as f64 + 0.75) * line_height);
	}
}

fn truncate(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}
	let cut: String = text.chars().take(max_chars).collect();
	format!("{cut}\u{2026}")
}
