//! Blending of coarse strong/weak evaluation hints into calculated mastery.

use std::collections::BTreeMap;

use super::code::Category;
use super::inputs::KsaAnalysis;
use super::mastery::MasteryRecord;

const STRONG_FRACTION: f64 = 0.8;
const WEAK_FRACTION: f64 = 0.3;

// Synthetic record size for codes only mentioned by hints. The value is a
// provisional heuristic awaiting product confirmation (see DESIGN.md).
const SYNTHETIC_TOTAL: u32 = 2;

/// Blend strong/weak hints from the upstream evaluation into the calculated
/// mastery map.
///
/// A "strong" code is raised to at least `ceil(total * 0.8)` correct, a
/// "weak" code capped at `floor(total * 0.3)`; totals and question ids are
/// untouched. A hinted code with no calculated record gets a synthetic one.
/// Codes not mentioned by any hint pass through unmodified, and the whole
/// step is a no-op when no analysis is supplied.
pub fn apply_evaluation_hints(
	mastery: &mut BTreeMap<String, MasteryRecord>,
	analysis: Option<&KsaAnalysis>,
) {
	let Some(analysis) = analysis else {
		return;
	};
	for category in Category::ALL {
		let hints = analysis.hints_for(category);
		for code in &hints.strong {
			raise_floor(mastery, code);
		}
		for code in &hints.weak {
			lower_cap(mastery, code);
		}
	}
}

fn raise_floor(mastery: &mut BTreeMap<String, MasteryRecord>, code: &str) {
	match mastery.get_mut(code) {
		Some(record) => {
			let floor = (f64::from(record.total) * STRONG_FRACTION).ceil() as u32;
			record.correct = record.correct.max(floor);
		}
		None => {
			mastery.insert(
				code.to_string(),
				MasteryRecord {
					correct: SYNTHETIC_TOTAL,
					total: SYNTHETIC_TOTAL,
					question_ids: Vec::new(),
				},
			);
		}
	}
}

fn lower_cap(mastery: &mut BTreeMap<String, MasteryRecord>, code: &str) {
	match mastery.get_mut(code) {
		Some(record) => {
			let cap = (f64::from(record.total) * WEAK_FRACTION).floor() as u32;
			record.correct = record.correct.min(cap);
		}
		None => {
			mastery.insert(
				code.to_string(),
				MasteryRecord {
					correct: 0,
					total: SYNTHETIC_TOTAL,
					question_ids: Vec::new(),
				},
			);
		}
	}
}
