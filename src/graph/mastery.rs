//! Per-code mastery aggregation and the Red/Yellow/Green status rule.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::warn;

use super::inputs::{AssessmentQuestion, CompetencyMaps, UserAnswer};

/// Aggregated performance on one competency code. `question_ids` lists each
/// question that references the code, once per question.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MasteryRecord {
	pub correct: u32,
	pub total: u32,
	pub question_ids: Vec<String>,
}

impl MasteryRecord {
	pub fn status(&self) -> MasteryStatus {
		MasteryStatus::of(self.correct, self.total)
	}
}

/// Traffic-light classification of a mastery record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MasteryStatus {
	Red,
	Yellow,
	Green,
}

impl MasteryStatus {
	/// The single mastery rule: no data or nothing correct is red, a clean
	/// sweep is green, anything in between yellow. Every status in the graph
	/// comes through here.
	pub fn of(correct: u32, total: u32) -> MasteryStatus {
		if total == 0 || correct == 0 {
			MasteryStatus::Red
		} else if correct == total {
			MasteryStatus::Green
		} else {
			MasteryStatus::Yellow
		}
	}
}

/// Aggregate per-code counts from raw questions and answers.
///
/// Codes missing from their category's reference map are dropped here and
/// never enter the mastery map. Questions without a `ksa_mapping` and
/// answers referencing unknown question ids are skipped without error.
pub fn compute_mastery(
	questions: &[AssessmentQuestion],
	answers: &[UserAnswer],
	maps: &CompetencyMaps,
) -> BTreeMap<String, MasteryRecord> {
	let mut mastery: BTreeMap<String, MasteryRecord> = BTreeMap::new();
	let mut dropped = 0usize;

	let by_id: HashMap<&str, &AssessmentQuestion> =
		questions.iter().map(|q| (q.id.as_str(), q)).collect();

	for question in questions {
		let Some(mapping) = &question.ksa_mapping else {
			continue;
		};
		// once per question even if the mapping repeats a code
		let mut seen: HashSet<&str> = HashSet::new();
		for (category, code) in mapping.iter_codes() {
			if maps.lookup(category, code).is_none() {
				dropped += 1;
				continue;
			}
			if !seen.insert(code) {
				continue;
			}
			let record = mastery.entry(code.to_string()).or_default();
			record.total += 1;
			record.question_ids.push(question.id.clone());
		}
	}

	for answer in answers {
		if !answer.is_correct {
			continue;
		}
		let Some(question) = by_id.get(answer.question_id.as_str()) else {
			continue;
		};
		let Some(mapping) = &question.ksa_mapping else {
			continue;
		};
		let mut seen: HashSet<&str> = HashSet::new();
		for (_, code) in mapping.iter_codes() {
			if !seen.insert(code) {
				continue;
			}
			// only codes retained by the allow-list above
			if let Some(record) = mastery.get_mut(code) {
				record.correct += 1;
			}
		}
	}

	if dropped > 0 {
		warn!("mastery aggregation dropped {dropped} code references missing from the reference maps");
	}
	mastery
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::inputs::{CompetencyInfo, KsaMapping};

	fn info(summary: &str) -> CompetencyInfo {
		CompetencyInfo {
			summary: summary.to_string(),
			theme: "theme".to_string(),
			explanation: None,
		}
	}

	fn maps_with(knowledge: &[&str], skills: &[&str]) -> CompetencyMaps {
		let mut maps = CompetencyMaps::default();
		for code in knowledge {
			maps.knowledge.insert(code.to_string(), info(code));
		}
		for code in skills {
			maps.skills.insert(code.to_string(), info(code));
		}
		maps
	}

	fn question(id: &str, knowledge: &[&str], skills: &[&str]) -> AssessmentQuestion {
		AssessmentQuestion {
			id: id.to_string(),
			domain: None,
			ksa_mapping: Some(KsaMapping {
				knowledge: knowledge.iter().map(|c| c.to_string()).collect(),
				skills: skills.iter().map(|c| c.to_string()).collect(),
				attitudes: Vec::new(),
			}),
		}
	}

	fn answer(id: &str, correct: bool) -> UserAnswer {
		UserAnswer {
			question_id: id.to_string(),
			is_correct: correct,
		}
	}

	#[test]
	fn aggregates_totals_and_correct_counts() {
		let maps = maps_with(&["K1"], &["S1"]);
		let questions = vec![
			question("Q1", &["K1"], &[]),
			question("Q2", &["K1"], &["S1"]),
		];
		let answers = vec![answer("Q1", true), answer("Q2", false)];

		let mastery = compute_mastery(&questions, &answers, &maps);

		let k1 = &mastery["K1"];
		assert_eq!((k1.correct, k1.total), (1, 2));
		assert_eq!(k1.question_ids, vec!["Q1", "Q2"]);
		let s1 = &mastery["S1"];
		assert_eq!((s1.correct, s1.total), (0, 1));
	}

	#[test]
	fn drops_codes_missing_from_reference_maps() {
		let maps = maps_with(&["K1"], &[]);
		let questions = vec![question("Q1", &["K1", "K9"], &["S1"])];
		let answers = vec![answer("Q1", true)];

		let mastery = compute_mastery(&questions, &answers, &maps);

		assert!(mastery.contains_key("K1"));
		assert!(!mastery.contains_key("K9"));
		assert!(!mastery.contains_key("S1"));
	}

	#[test]
	fn skips_unmapped_questions_and_unknown_answers() {
		let maps = maps_with(&["K1"], &[]);
		let questions = vec![
			AssessmentQuestion {
				id: "Q1".to_string(),
				domain: None,
				ksa_mapping: None,
			},
			question("Q2", &["K1"], &[]),
		];
		let answers = vec![answer("Q2", true), answer("missing", true)];

		let mastery = compute_mastery(&questions, &answers, &maps);

		assert_eq!(mastery.len(), 1);
		assert_eq!(mastery["K1"].correct, 1);
	}

	#[test]
	fn counts_a_repeated_code_once_per_question() {
		let maps = maps_with(&["K1"], &[]);
		let questions = vec![question("Q1", &["K1", "K1"], &[])];
		let answers = vec![answer("Q1", true)];

		let mastery = compute_mastery(&questions, &answers, &maps);

		assert_eq!((mastery["K1"].correct, mastery["K1"].total), (1, 1));
		assert_eq!(mastery["K1"].question_ids, vec!["Q1"]);
	}

	#[test]
	fn empty_inputs_yield_an_empty_map() {
		let mastery = compute_mastery(&[], &[], &CompetencyMaps::default());
		assert!(mastery.is_empty());
	}

	#[test]
	fn status_rule_covers_all_cases() {
		assert_eq!(MasteryStatus::of(0, 0), MasteryStatus::Red);
		assert_eq!(MasteryStatus::of(0, 3), MasteryStatus::Red);
		assert_eq!(MasteryStatus::of(3, 3), MasteryStatus::Green);
		assert_eq!(MasteryStatus::of(1, 3), MasteryStatus::Yellow);
		assert_eq!(MasteryStatus::of(2, 3), MasteryStatus::Yellow);
		assert_eq!(MasteryStatus::of(1, 1), MasteryStatus::Green);
	}
}
