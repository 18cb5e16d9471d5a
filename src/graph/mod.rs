//! Pure competency-graph core: mastery aggregation, evaluation-hint
//! blending, and dataset construction. No rendering dependencies; fully
//! unit-testable on the host target.

mod builder;
mod code;
mod enhance;
mod inputs;
mod mastery;

pub use builder::{
	build_graph, theme_id, GraphDataset, GraphEdge, GraphNode, NodeDetails, NodeKind, CENTER_ID,
};
pub use code::{Category, CompetencyCode};
pub use enhance::apply_evaluation_hints;
pub use inputs::{
	AssessmentInput, AssessmentQuestion, AssessmentResult, CategoryHints, CompetencyInfo,
	CompetencyMaps, KsaAnalysis, KsaMapping, UserAnswer,
};
pub use mastery::{compute_mastery, MasteryRecord, MasteryStatus};
