//! Force simulation for the competency graph layout.
//!
//! Four velocity forces (link, charge, radial, centroid) plus a positional
//! collision pass, all scaled by a decaying alpha. Tier constants make
//! subcodes cluster tightly around their parent code while themes spread
//! wide around the center.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::graph::{GraphDataset, NodeKind};

pub const CENTER_RADIUS: f64 = 44.0;
pub const THEME_RADIUS: f64 = 30.0;
pub const CODE_RADIUS: f64 = 18.0;
pub const SUBCODE_RADIUS: f64 = 11.0;

const COLLISION_PADDING: f64 = 6.0;
const COLLISION_PASSES: usize = 2;

const LINK_STRENGTH: f64 = 0.3;
const RADIAL_STRENGTH: f64 = 0.08;
const CENTER_STRENGTH: f64 = 0.05;

const ALPHA_INITIAL: f64 = 1.0;
const ALPHA_DECAY: f64 = 0.02;
const ALPHA_MIN: f64 = 0.003;
const ALPHA_REHEAT: f64 = 0.5;
const VELOCITY_DECAY: f64 = 0.6;

/// Node radius by tier; shared by rendering and hit-testing.
pub fn node_radius(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Center => CENTER_RADIUS,
		NodeKind::Theme => THEME_RADIUS,
		NodeKind::Code => CODE_RADIUS,
		NodeKind::Subcode => SUBCODE_RADIUS,
	}
}

// Link rest length chosen by the tier of the link's *target*: subcodes sit
// closest to their parent, codes further out, with a default for the
// center-theme spokes.
fn link_distance(target: NodeKind) -> f64 {
	match target {
		NodeKind::Subcode => 55.0,
		NodeKind::Code => 105.0,
		NodeKind::Theme => 150.0,
		NodeKind::Center => 190.0,
	}
}

// Repulsion magnitude by tier: themes push hardest so the three sectors
// spread, subcodes barely at all so they stay packed near their parent.
fn charge_strength(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Subcode => 60.0,
		NodeKind::Code => 150.0,
		NodeKind::Theme => 450.0,
		NodeKind::Center => 350.0,
	}
}

/// Per-node layout state. `fx`/`fy` pin the node while set (active drag).
#[derive(Clone, Debug)]
pub struct SimNode {
	pub kind: NodeKind,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

#[derive(Clone, Copy, Debug)]
struct SimLink {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
}

/// The layout engine. Owns all node positions; created fresh whenever a
/// dataset is installed and never shared across rebuilds.
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	width: f64,
	height: f64,
	alpha: f64,
}

impl Simulation {
	/// Build layout state for `dataset`, seeding each node deterministically
	/// on its tier ring. Node order matches `dataset.nodes`.
	pub fn new(dataset: &GraphDataset, width: f64, height: f64) -> Self {
		let (cx, cy) = (width / 2.0, height / 2.0);
		let count = dataset.nodes.len().max(1);

		let nodes: Vec<SimNode> = dataset
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let angle = (i as f64) * 2.0 * PI / (count as f64);
				let ring = seed_ring(node.kind, width, height);
				SimNode {
					kind: node.kind,
					x: cx + ring * angle.cos(),
					y: cy + ring * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					fx: None,
					fy: None,
				}
			})
			.collect();

		let index: HashMap<&str, usize> = dataset
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();

		let links: Vec<SimLink> = dataset
			.edges
			.iter()
			.filter_map(|edge| {
				let source = *index.get(edge.source.as_str())?;
				let target = *index.get(edge.target.as_str())?;
				Some(SimLink {
					source,
					target,
					distance: link_distance(nodes[target].kind),
					strength: edge.weight,
				})
			})
			.collect();

		Self {
			nodes,
			links,
			width,
			height,
			alpha: ALPHA_INITIAL,
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Pin a node to `(x, y)` and keep the layout lively while it is held.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
		self.reheat();
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
	}

	pub fn reheat(&mut self) {
		self.alpha = self.alpha.max(ALPHA_REHEAT);
	}

	/// New canvas dimensions; radial and centroid targets follow.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.reheat();
	}

	/// One integration step. Cheap once alpha has decayed below its floor,
	/// so it can run on every animation frame.
	pub fn step(&mut self) {
		if self.alpha < ALPHA_MIN {
			return;
		}
		self.alpha += (0.0 - self.alpha) * ALPHA_DECAY;

		self.apply_link_force();
		self.apply_charge_force();
		self.apply_radial_force();
		self.integrate();
		self.resolve_collisions();
		self.apply_center_force();
	}

	fn apply_link_force(&mut self) {
		for i in 0..self.links.len() {
			let link = self.links[i];
			let (sx, sy) = (self.nodes[link.source].x, self.nodes[link.source].y);
			let (tx, ty) = (self.nodes[link.target].x, self.nodes[link.target].y);
			let (dx, dy) = (tx - sx, ty - sy);
			let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
			let displacement = dist - link.distance;
			let f = displacement / dist * LINK_STRENGTH * link.strength * self.alpha;

			let source = &mut self.nodes[link.source];
			source.vx += dx * f * 0.5;
			source.vy += dy * f * 0.5;
			let target = &mut self.nodes[link.target];
			target.vx -= dx * f * 0.5;
			target.vy -= dy * f * 0.5;
		}
	}

	fn apply_charge_force(&mut self) {
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (dx, dy) = (self.nodes[j].x - self.nodes[i].x, self.nodes[j].y - self.nodes[i].y);
				let d2 = (dx * dx + dy * dy).max(25.0);
				let dist = d2.sqrt();
				let strength =
					(charge_strength(self.nodes[i].kind) + charge_strength(self.nodes[j].kind)) / 2.0;
				let f = strength / d2 * self.alpha;
				let (ux, uy) = (dx / dist, dy / dist);

				self.nodes[i].vx -= ux * f;
				self.nodes[i].vy -= uy * f;
				self.nodes[j].vx += ux * f;
				self.nodes[j].vy += uy * f;
			}
		}
	}

	// Concentric tier rings around the canvas center, applied at partial
	// strength so link and charge forces can still relax the shape.
	fn apply_radial_force(&mut self) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let (w, h) = (self.width, self.height);
		for node in &mut self.nodes {
			let Some(target) = radial_target(node.kind, w, h) else {
				continue;
			};
			let (dx, dy) = (node.x - cx, node.y - cy);
			let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
			let f = (target - dist) * RADIAL_STRENGTH * self.alpha;
			node.vx += dx / dist * f;
			node.vy += dy / dist * f;
		}
	}

	fn integrate(&mut self) {
		for node in &mut self.nodes {
			if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
				node.x = fx;
				node.y = fy;
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx *= VELOCITY_DECAY;
			node.vy *= VELOCITY_DECAY;
			node.x += node.vx;
			node.y += node.vy;
		}
	}

	// Positional overlap resolution: every pair ends at least
	// radius(a) + radius(b) + padding apart. A pinned node never moves; its
	// partner takes the full push.
	fn resolve_collisions(&mut self) {
		let n = self.nodes.len();
		for _ in 0..COLLISION_PASSES {
			for i in 0..n {
				for j in (i + 1)..n {
					let min_dist =
						node_radius(self.nodes[i].kind) + node_radius(self.nodes[j].kind) + COLLISION_PADDING;
					let (dx, dy) = (self.nodes[j].x - self.nodes[i].x, self.nodes[j].y - self.nodes[i].y);
					let dist = (dx * dx + dy * dy).sqrt();
					if dist >= min_dist {
						continue;
					}
					// coincident nodes get a deterministic nudge apart
					let (ux, uy) = if dist > 1e-6 {
						(dx / dist, dy / dist)
					} else {
						(1.0, 0.0)
					};
					let overlap = min_dist - dist;
					let i_pinned = self.nodes[i].fx.is_some();
					let j_pinned = self.nodes[j].fx.is_some();
					let (push_i, push_j) = match (i_pinned, j_pinned) {
						(true, true) => (0.0, 0.0),
						(true, false) => (0.0, overlap),
						(false, true) => (overlap, 0.0),
						(false, false) => (overlap / 2.0, overlap / 2.0),
					};
					self.nodes[i].x -= ux * push_i;
					self.nodes[i].y -= uy * push_i;
					self.nodes[j].x += ux * push_j;
					self.nodes[j].y += uy * push_j;
				}
			}
		}
	}

	fn apply_center_force(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let count = self.nodes.len() as f64;
		let mean_x = self.nodes.iter().map(|n| n.x).sum::<f64>() / count;
		let mean_y = self.nodes.iter().map(|n| n.y).sum::<f64>() / count;
		let dx = (self.width / 2.0 - mean_x) * CENTER_STRENGTH;
		let dy = (self.height / 2.0 - mean_y) * CENTER_STRENGTH;
		for node in &mut self.nodes {
			if node.fx.is_some() {
				continue;
			}
			node.x += dx;
			node.y += dy;
		}
	}
}

fn seed_ring(kind: NodeKind, width: f64, height: f64) -> f64 {
	radial_target(kind, width, height).unwrap_or(0.0)
}

fn radial_target(kind: NodeKind, width: f64, height: f64) -> Option<f64> {
	let scale = width.min(height);
	match kind {
		NodeKind::Center => None,
		NodeKind::Theme => Some(scale * 0.18),
		NodeKind::Code => Some(scale * 0.32),
		NodeKind::Subcode => Some(scale * 0.42),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::graph::{build_graph, CompetencyInfo, CompetencyMaps, MasteryRecord};

	fn sample_dataset() -> GraphDataset {
		let mut maps = CompetencyMaps::default();
		for code in ["K1", "K1.1", "K2"] {
			maps.knowledge.insert(
				code.to_string(),
				CompetencyInfo {
					summary: "s".to_string(),
					theme: "t".to_string(),
					explanation: None,
				},
			);
		}
		let mastery = BTreeMap::from([
			("K1".to_string(), MasteryRecord {
				correct: 1,
				total: 2,
				question_ids: vec!["Q1".to_string()],
			}),
			("K1.1".to_string(), MasteryRecord {
				correct: 2,
				total: 2,
				question_ids: vec!["Q2".to_string()],
			}),
			("K2".to_string(), MasteryRecord {
				correct: 0,
				total: 1,
				question_ids: vec!["Q3".to_string()],
			}),
		]);
		build_graph(70.0, &mastery, &maps)
	}

	#[test]
	fn seeding_is_deterministic() {
		let dataset = sample_dataset();
		let mut a = Simulation::new(&dataset, 800.0, 600.0);
		let mut b = Simulation::new(&dataset, 800.0, 600.0);
		for _ in 0..50 {
			a.step();
			b.step();
		}
		for (na, nb) in a.nodes().iter().zip(b.nodes()) {
			assert_eq!((na.x, na.y), (nb.x, nb.y));
		}
	}

	#[test]
	fn new_simulation_resets_positions() {
		let dataset = sample_dataset();
		let mut a = Simulation::new(&dataset, 800.0, 600.0);
		for _ in 0..100 {
			a.step();
		}
		let fresh = Simulation::new(&dataset, 800.0, 600.0);
		let seeded = Simulation::new(&dataset, 800.0, 600.0);
		for (nf, ns) in fresh.nodes().iter().zip(seeded.nodes()) {
			assert_eq!((nf.x, nf.y), (ns.x, ns.y));
		}
		// and the stepped one has actually moved off the seed
		assert!(a
			.nodes()
			.iter()
			.zip(fresh.nodes())
			.any(|(na, nf)| (na.x - nf.x).abs() > 1.0 || (na.y - nf.y).abs() > 1.0));
	}

	#[test]
	fn pinned_node_does_not_move() {
		let dataset = sample_dataset();
		let mut sim = Simulation::new(&dataset, 800.0, 600.0);
		sim.pin(1, 123.0, 456.0);
		for _ in 0..30 {
			sim.step();
		}
		assert_eq!((sim.nodes()[1].x, sim.nodes()[1].y), (123.0, 456.0));
	}

	#[test]
	fn coincident_nodes_separate_past_the_collision_minimum() {
		let dataset = sample_dataset();
		let mut sim = Simulation::new(&dataset, 800.0, 600.0);
		// force two theme nodes onto the same spot, then release them
		sim.pin(1, 400.0, 300.0);
		sim.pin(2, 400.0, 300.0);
		sim.step();
		sim.unpin(1);
		sim.unpin(2);
		for _ in 0..30 {
			sim.step();
		}
		let (a, b) = (&sim.nodes()[1], &sim.nodes()[2]);
		let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
		assert!(
			dist >= node_radius(a.kind) + node_radius(b.kind),
			"themes still overlapping after release: {dist}"
		);
	}

	#[test]
	fn centroid_settles_near_the_canvas_midpoint() {
		let dataset = sample_dataset();
		let mut sim = Simulation::new(&dataset, 800.0, 600.0);
		for _ in 0..300 {
			sim.step();
		}
		let count = sim.nodes().len() as f64;
		let mean_x = sim.nodes().iter().map(|n| n.x).sum::<f64>() / count;
		let mean_y = sim.nodes().iter().map(|n| n.y).sum::<f64>() / count;
		assert!((mean_x - 400.0).abs() < 80.0, "centroid x drifted: {mean_x}");
		assert!((mean_y - 300.0).abs() < 80.0, "centroid y drifted: {mean_y}");
	}

	#[test]
	fn reheat_raises_alpha_after_decay() {
		let dataset = sample_dataset();
		let mut sim = Simulation::new(&dataset, 800.0, 600.0);
		for _ in 0..400 {
			sim.step();
		}
		assert!(sim.alpha() < 0.1);
		sim.reheat();
		assert!(sim.alpha() >= 0.5);
	}

	#[test]
	fn resize_reheats_the_layout() {
		let dataset = sample_dataset();
		let mut sim = Simulation::new(&dataset, 800.0, 600.0);
		for _ in 0..400 {
			sim.step();
		}
		sim.resize(1200.0, 900.0);
		assert!(sim.alpha() >= 0.5);
	}
}
