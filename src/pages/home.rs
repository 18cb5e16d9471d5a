use leptos::prelude::*;
use log::error;

use crate::components::graph_canvas::{CompetencyGraphCanvas, SelectedNode};
use crate::graph::{
	apply_evaluation_hints, build_graph, compute_mastery, AssessmentInput, GraphDataset,
};

const SAMPLE_ASSESSMENT: &str = include_str!("../../demos/sample_assessment.json");

fn load_sample() -> AssessmentInput {
	serde_json::from_str(SAMPLE_ASSESSMENT).unwrap_or_else(|err| {
		error!("failed to parse bundled assessment: {err}");
		AssessmentInput::default()
	})
}

/// The full pure pipeline: aggregate mastery, blend evaluation hints,
/// build the dataset.
fn build_dataset(input: &AssessmentInput) -> GraphDataset {
	let mut mastery = compute_mastery(&input.questions, &input.answers, &input.maps);
	apply_evaluation_hints(&mut mastery, input.result.ksa_analysis.as_ref());
	build_graph(input.result.overall_score, &mastery, &input.maps)
}

/// Default Home Page: the competency graph for a bundled sample assessment,
/// with a side panel mirroring the selection and drill-down events a host
/// application would receive.
#[component]
pub fn Home() -> impl IntoView {
	let (selected, set_selected) = signal(None::<SelectedNode>);
	let (review_ids, set_review_ids) = signal(Vec::<String>::new());
	let dataset = Signal::derive(|| build_dataset(&load_sample()));

	let on_select = Callback::new(move |selection: Option<SelectedNode>| {
		if selection.is_none() {
			set_review_ids.set(Vec::new());
		}
		set_selected.set(selection);
	});
	let on_review = Callback::new(move |ids: Vec<String>| {
		set_review_ids.set(ids);
	});

	view! {
		<div class="graph-page">
			<div class="graph-pane">
				<CompetencyGraphCanvas
					data=dataset
					on_select=on_select
					on_review_questions=on_review
				/>
			</div>
			<aside class="side-panel">
				<h1>"Competency Graph"</h1>
				<p class="subtitle">
					"Drag nodes to reposition. Scroll to zoom. Click a node for details."
				</p>
				{move || {
					selected
						.get()
						.map(|node| {
							let details = node.details.unwrap_or_default();
							let counts = match (details.correct, details.total) {
								(Some(correct), Some(total)) => {
									Some(format!("{correct} of {total} correct"))
								}
								_ => None,
							};
							view! {
								<div class="node-detail">
									<h2>{node.label}</h2>
									{details.theme.map(|theme| view! { <p class="theme">{theme}</p> })}
									{details.summary.map(|summary| view! { <p>{summary}</p> })}
									{counts.map(|counts| view! { <p class="counts">{counts}</p> })}
									{details
										.explanation
										.map(|explanation| view! { <p class="explanation">{explanation}</p> })}
								</div>
							}
						})
				}}
				{move || {
					let ids = review_ids.get();
					(!ids.is_empty())
						.then(|| {
							view! {
								<div class="question-review">
									<h3>"Review these questions"</h3>
									<ul>
										{ids
											.into_iter()
											.map(|id| view! { <li>{id}</li> })
											.collect_view()}
									</ul>
								</div>
							}
						})
				}}
			</aside>
		</div>
	}
}
