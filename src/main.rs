use leptos::prelude::*;

use ksa_graph_canvas::{init_logging, App};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(|| view! { <App /> });
}
