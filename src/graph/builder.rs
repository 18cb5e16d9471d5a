//! Construction of the rooted node/edge dataset from a mastery map.

use std::collections::{BTreeMap, HashSet};

use super::code::{Category, CompetencyCode};
use super::inputs::{CompetencyInfo, CompetencyMaps};
use super::mastery::{MasteryRecord, MasteryStatus};

const CENTER_THEME_WEIGHT: f64 = 1.0;
const THEME_CODE_WEIGHT: f64 = 0.8;
const CODE_SUBCODE_WEIGHT: f64 = 0.6;

/// Node id of the center node.
pub const CENTER_ID: &str = "center";

/// Node tier within the competency graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Center,
	Theme,
	Code,
	Subcode,
}

/// Reference-map content plus mastery counts carried on a code node, shown
/// in the side panel and tooltip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeDetails {
	pub summary: Option<String>,
	pub explanation: Option<String>,
	pub theme: Option<String>,
	pub correct: Option<u32>,
	pub total: Option<u32>,
	pub question_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub kind: NodeKind,
	pub label: String,
	pub score: Option<f64>,
	pub status: Option<MasteryStatus>,
	pub category: Option<Category>,
	pub root_code_id: Option<String>,
	pub details: Option<NodeDetails>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub weight: f64,
}

/// Immutable node/edge snapshot. Built once per input tuple and rebuilt
/// wholesale on any input change; node ids are unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphDataset {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

pub fn theme_id(category: Category) -> String {
	format!("theme-{}", category.key())
}

fn code_node_id(code: &str) -> String {
	format!("code-{code}")
}

/// Build the rooted dataset from the (possibly enhanced) mastery map.
///
/// The center and the three theme nodes are always present. Codes absent
/// from their category's reference map are skipped — an independent check
/// from the calculator's, since the enhancer may have introduced synthetic
/// codes. Root codes are emitted before subcodes; a subcode whose root has
/// no node of its own attaches to its theme instead.
pub fn build_graph(
	overall_score: f64,
	mastery: &BTreeMap<String, MasteryRecord>,
	maps: &CompetencyMaps,
) -> GraphDataset {
	let mut dataset = GraphDataset::default();
	let mut ids: HashSet<String> = HashSet::new();

	ids.insert(CENTER_ID.to_string());
	dataset.nodes.push(GraphNode {
		id: CENTER_ID.to_string(),
		kind: NodeKind::Center,
		label: "Overall".to_string(),
		score: Some(overall_score),
		status: None,
		category: None,
		root_code_id: None,
		details: None,
	});

	for category in Category::ALL {
		let id = theme_id(category);
		ids.insert(id.clone());
		dataset.edges.push(GraphEdge {
			source: CENTER_ID.to_string(),
			target: id.clone(),
			weight: CENTER_THEME_WEIGHT,
		});
		dataset.nodes.push(GraphNode {
			id,
			kind: NodeKind::Theme,
			label: category.label().to_string(),
			score: None,
			status: None,
			category: Some(category),
			root_code_id: None,
			details: None,
		});
	}

	// Root codes first so subcodes can find their parent nodes.
	for (code, record) in mastery {
		if let Some(CompetencyCode::Root { category, .. }) = CompetencyCode::parse(code) {
			let Some(info) = maps.lookup(category, code) else {
				continue;
			};
			push_code_node(
				&mut dataset,
				&mut ids,
				NodeKind::Code,
				category,
				code,
				record,
				info,
				theme_id(category),
				THEME_CODE_WEIGHT,
				None,
			);
		}
	}

	for (code, record) in mastery {
		if let Some(CompetencyCode::Sub { category, root, .. }) = CompetencyCode::parse(code) {
			let Some(info) = maps.lookup(category, code) else {
				continue;
			};
			let root_id = code_node_id(&root);
			// fall back to the theme when the root has no node of its own
			let (parent, weight, root_code_id) = if ids.contains(&root_id) {
				(root_id.clone(), CODE_SUBCODE_WEIGHT, Some(root_id))
			} else {
				(theme_id(category), THEME_CODE_WEIGHT, None)
			};
			push_code_node(
				&mut dataset,
				&mut ids,
				NodeKind::Subcode,
				category,
				code,
				record,
				info,
				parent,
				weight,
				root_code_id,
			);
		}
	}

	dataset
}

#[allow(clippy::too_many_arguments)]
fn push_code_node(
	dataset: &mut GraphDataset,
	ids: &mut HashSet<String>,
	kind: NodeKind,
	category: Category,
	code: &str,
	record: &MasteryRecord,
	info: &CompetencyInfo,
	parent: String,
	weight: f64,
	root_code_id: Option<String>,
) {
	let id = code_node_id(code);
	if !ids.insert(id.clone()) {
		return;
	}
	dataset.edges.push(GraphEdge {
		source: parent,
		target: id.clone(),
		weight,
	});
	dataset.nodes.push(GraphNode {
		id,
		kind,
		label: code.to_string(),
		score: None,
		status: Some(record.status()),
		category: Some(category),
		root_code_id,
		details: Some(NodeDetails {
			summary: Some(info.summary.clone()),
			explanation: info.explanation.clone(),
			theme: Some(info.theme.clone()),
			correct: Some(record.correct),
			total: Some(record.total),
			question_ids: record.question_ids.clone(),
		}),
	});
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;
	use crate::graph::compute_mastery;
	use crate::graph::inputs::{AssessmentQuestion, KsaMapping, UserAnswer};

	fn info(summary: &str) -> CompetencyInfo {
		CompetencyInfo {
			summary: summary.to_string(),
			theme: "t".to_string(),
			explanation: None,
		}
	}

	fn knowledge_maps(codes: &[&str]) -> CompetencyMaps {
		let mut maps = CompetencyMaps::default();
		for code in codes {
			maps.knowledge.insert(code.to_string(), info("s"));
		}
		maps
	}

	fn record(correct: u32, total: u32) -> MasteryRecord {
		MasteryRecord {
			correct,
			total,
			question_ids: vec!["Q1".to_string()],
		}
	}

	fn node_ids(dataset: &GraphDataset) -> BTreeSet<String> {
		dataset.nodes.iter().map(|n| n.id.clone()).collect()
	}

	#[test]
	fn end_to_end_single_correct_answer() {
		let maps = knowledge_maps(&["K1"]);
		let questions = vec![AssessmentQuestion {
			id: "Q1".to_string(),
			domain: None,
			ksa_mapping: Some(KsaMapping {
				knowledge: vec!["K1".to_string()],
				skills: Vec::new(),
				attitudes: Vec::new(),
			}),
		}];
		let answers = vec![UserAnswer {
			question_id: "Q1".to_string(),
			is_correct: true,
		}];

		let mastery = compute_mastery(&questions, &answers, &maps);
		assert_eq!((mastery["K1"].correct, mastery["K1"].total), (1, 1));

		let dataset = build_graph(80.0, &mastery, &maps);
		assert_eq!(
			node_ids(&dataset),
			BTreeSet::from([
				"center".to_string(),
				"theme-knowledge".to_string(),
				"theme-skills".to_string(),
				"theme-attitudes".to_string(),
				"code-K1".to_string(),
			])
		);

		let k1 = dataset.nodes.iter().find(|n| n.id == "code-K1").unwrap();
		assert_eq!(k1.status, Some(MasteryStatus::Green));

		let k1_edges: Vec<_> = dataset
			.edges
			.iter()
			.filter(|e| e.target == "code-K1")
			.collect();
		assert_eq!(k1_edges.len(), 1);
		assert_eq!(k1_edges[0].source, "theme-knowledge");
	}

	#[test]
	fn dropped_code_never_materializes() {
		let maps = CompetencyMaps::default();
		let mastery = BTreeMap::from([("K1".to_string(), record(1, 1))]);

		let dataset = build_graph(50.0, &mastery, &maps);
		assert_eq!(
			node_ids(&dataset),
			BTreeSet::from([
				"center".to_string(),
				"theme-knowledge".to_string(),
				"theme-skills".to_string(),
				"theme-attitudes".to_string(),
			])
		);
	}

	#[test]
	fn subcode_links_to_materialized_root() {
		let maps = knowledge_maps(&["K1", "K1.2"]);
		let mastery = BTreeMap::from([
			("K1".to_string(), record(1, 2)),
			("K1.2".to_string(), record(0, 1)),
		]);

		let dataset = build_graph(50.0, &mastery, &maps);
		let edge = dataset
			.edges
			.iter()
			.find(|e| e.target == "code-K1.2")
			.unwrap();
		assert_eq!(edge.source, "code-K1");
		assert_eq!(edge.weight, 0.6);

		let sub = dataset.nodes.iter().find(|n| n.id == "code-K1.2").unwrap();
		assert_eq!(sub.root_code_id.as_deref(), Some("code-K1"));
	}

	#[test]
	fn orphan_subcode_falls_back_to_theme() {
		let maps = knowledge_maps(&["K1.2"]);
		let mastery = BTreeMap::from([("K1.2".to_string(), record(1, 1))]);

		let dataset = build_graph(50.0, &mastery, &maps);
		let edge = dataset
			.edges
			.iter()
			.find(|e| e.target == "code-K1.2")
			.unwrap();
		assert_eq!(edge.source, "theme-knowledge");
		assert_eq!(edge.weight, 0.8);

		let sub = dataset.nodes.iter().find(|n| n.id == "code-K1.2").unwrap();
		assert_eq!(sub.root_code_id, None);
	}

	#[test]
	fn root_missing_from_map_does_not_adopt_subcode() {
		// K1 has a mastery record but no reference entry, so its node is
		// never materialized; K1.2 must attach to the theme.
		let maps = knowledge_maps(&["K1.2"]);
		let mastery = BTreeMap::from([
			("K1".to_string(), record(1, 1)),
			("K1.2".to_string(), record(1, 1)),
		]);

		let dataset = build_graph(50.0, &mastery, &maps);
		assert!(!node_ids(&dataset).contains("code-K1"));
		let edge = dataset
			.edges
			.iter()
			.find(|e| e.target == "code-K1.2")
			.unwrap();
		assert_eq!(edge.source, "theme-knowledge");
	}

	#[test]
	fn construction_is_idempotent_per_code() {
		let maps = knowledge_maps(&["K1"]);
		let questions = vec![
			AssessmentQuestion {
				id: "Q1".to_string(),
				domain: None,
				ksa_mapping: Some(KsaMapping {
					knowledge: vec!["K1".to_string()],
					skills: Vec::new(),
					attitudes: Vec::new(),
				}),
			},
			AssessmentQuestion {
				id: "Q2".to_string(),
				domain: None,
				ksa_mapping: Some(KsaMapping {
					knowledge: vec!["K1".to_string()],
					skills: Vec::new(),
					attitudes: Vec::new(),
				}),
			},
		];
		let mastery = compute_mastery(&questions, &[], &maps);
		let dataset = build_graph(50.0, &mastery, &maps);

		let k1_nodes = dataset.nodes.iter().filter(|n| n.id == "code-K1").count();
		assert_eq!(k1_nodes, 1);
	}

	#[test]
	fn rebuild_is_structurally_deterministic() {
		let maps = knowledge_maps(&["K1", "K1.1", "K2"]);
		let mastery = BTreeMap::from([
			("K1".to_string(), record(1, 2)),
			("K1.1".to_string(), record(2, 2)),
			("K2".to_string(), record(0, 1)),
		]);

		let a = build_graph(66.0, &mastery, &maps);
		let b = build_graph(66.0, &mastery, &maps);

		assert_eq!(node_ids(&a), node_ids(&b));
		let edge_set = |d: &GraphDataset| -> BTreeSet<(String, String)> {
			d.edges
				.iter()
				.map(|e| (e.source.clone(), e.target.clone()))
				.collect()
		};
		assert_eq!(edge_set(&a), edge_set(&b));
	}

	#[test]
	fn every_code_node_passes_the_allow_list() {
		let maps = knowledge_maps(&["K1", "K1.1"]);
		let mastery = BTreeMap::from([
			("K1".to_string(), record(1, 1)),
			("K1.1".to_string(), record(1, 1)),
			("K7".to_string(), record(1, 1)),
			("bogus".to_string(), record(1, 1)),
		]);

		let dataset = build_graph(50.0, &mastery, &maps);
		for node in &dataset.nodes {
			if matches!(node.kind, NodeKind::Code | NodeKind::Subcode) {
				let category = node.category.unwrap();
				assert!(maps.lookup(category, &node.label).is_some());
			}
		}
		assert!(!node_ids(&dataset).contains("code-K7"));
	}
}
