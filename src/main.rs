use leptos::prelude::*;
use mixgraph::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
