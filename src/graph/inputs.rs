//! Host-facing input types.
//!
//! The host delivers these as plain in-process values (deserialised from
//! JSON on its side of the boundary); everything here is inert data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::code::Category;

/// Strong/weak code lists for one KSA category, produced by the upstream
/// evaluation. Coarse hints only; the mastery calculator stays authoritative
/// for anything it actually counted.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CategoryHints {
	#[serde(default)]
	pub strong: Vec<String>,
	#[serde(default)]
	pub weak: Vec<String>,
}

/// Per-category hints attached to an assessment result.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct KsaAnalysis {
	#[serde(default)]
	pub knowledge: CategoryHints,
	#[serde(default)]
	pub skills: CategoryHints,
	#[serde(default)]
	pub attitudes: CategoryHints,
}

impl KsaAnalysis {
	pub fn hints_for(&self, category: Category) -> &CategoryHints {
		match category {
			Category::Knowledge => &self.knowledge,
			Category::Skills => &self.skills,
			Category::Attitudes => &self.attitudes,
		}
	}
}

/// Aggregate outcome of one assessment run.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
	#[serde(default)]
	pub overall_score: f64,
	#[serde(default)]
	pub domain_scores: HashMap<String, f64>,
	#[serde(default)]
	pub ksa_analysis: Option<KsaAnalysis>,
}

/// Code lists a question is tagged with, one list per category.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct KsaMapping {
	#[serde(default)]
	pub knowledge: Vec<String>,
	#[serde(default)]
	pub skills: Vec<String>,
	#[serde(default)]
	pub attitudes: Vec<String>,
}

impl KsaMapping {
	pub fn codes_for(&self, category: Category) -> &[String] {
		match category {
			Category::Knowledge => &self.knowledge,
			Category::Skills => &self.skills,
			Category::Attitudes => &self.attitudes,
		}
	}

	/// All (category, code) pairs in K, S, A order.
	pub fn iter_codes(&self) -> impl Iterator<Item = (Category, &str)> + '_ {
		Category::ALL
			.into_iter()
			.flat_map(|c| self.codes_for(c).iter().map(move |code| (c, code.as_str())))
	}
}

/// One assessment question. A question without a `ksa_mapping` contributes
/// nothing to the graph.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AssessmentQuestion {
	pub id: String,
	#[serde(default)]
	pub domain: Option<String>,
	#[serde(default)]
	pub ksa_mapping: Option<KsaMapping>,
}

/// One answered question.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
	pub question_id: String,
	pub is_correct: bool,
}

/// Reference-map entry describing one competency code.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CompetencyInfo {
	pub summary: String,
	pub theme: String,
	#[serde(default)]
	pub explanation: Option<String>,
}

/// The three authoritative code → info maps. A code absent from its
/// category's map never appears in the graph, no matter where it was
/// referenced.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CompetencyMaps {
	#[serde(default)]
	pub knowledge: HashMap<String, CompetencyInfo>,
	#[serde(default)]
	pub skills: HashMap<String, CompetencyInfo>,
	#[serde(default)]
	pub attitudes: HashMap<String, CompetencyInfo>,
}

impl CompetencyMaps {
	pub fn map_for(&self, category: Category) -> &HashMap<String, CompetencyInfo> {
		match category {
			Category::Knowledge => &self.knowledge,
			Category::Skills => &self.skills,
			Category::Attitudes => &self.attitudes,
		}
	}

	pub fn lookup(&self, category: Category, code: &str) -> Option<&CompetencyInfo> {
		self.map_for(category).get(code)
	}
}

/// Everything the host hands the subsystem for one render pass.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AssessmentInput {
	#[serde(default)]
	pub result: AssessmentResult,
	#[serde(default)]
	pub questions: Vec<AssessmentQuestion>,
	#[serde(default)]
	pub answers: Vec<UserAnswer>,
	#[serde(default)]
	pub maps: CompetencyMaps,
}
