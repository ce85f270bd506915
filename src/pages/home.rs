use std::sync::Arc;

use leptos::prelude::*;

use crate::components::force_graph::{
	ForceGraphCanvas, GraphModel, GraphScope, GraphSnapshot, MemorySource, Selection, load_view,
};

const DEMO_LIBRARY: &str = include_str!("demo_library.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewType {
	All,
	Folder,
	Playlist,
}

fn demo_library() -> MemorySource {
	MemorySource::from_json(DEMO_LIBRARY).unwrap_or_else(|err| {
		log::error!("demo library failed to load: {err}");
		MemorySource::default()
	})
}

fn parse_id(value: &str) -> Option<i64> {
	value.parse().ok()
}

fn node_details(model: &GraphModel, id: i64, selection: RwSignal<Selection>) -> AnyView {
	let Some(node) = model.node(id) else {
		return ().into_any();
	};
	let outgoing = model.outgoing_count(id);
	let incoming = model.incoming_count(id);
	let bpm = node
		.bpm
		.map(|bpm| format!("{bpm:.1} BPM"))
		.unwrap_or_else(|| "? BPM".into());
	let key = node.key.clone().unwrap_or_else(|| "N/A".into());
	let transitions = model
		.outgoing(id)
		.map(|edge| {
			let target = edge.to;
			let title = model
				.node(target)
				.map(|n| n.title.clone())
				.unwrap_or_default();
			let stars = "⭐".repeat(edge.stars() as usize);
			view! {
				<div class="transition-item" on:click=move |_| selection.set(Selection::Node(target))>
					<span>{title}</span>
					<span class="stars">{stars}</span>
				</div>
			}
		})
		.collect_view();

	view! {
		<h3>{node.title.clone()}</h3>
		<p class="artist">{node.artist.clone()}</p>
		<div class="node-meta">
			<span class="bpm-badge">{bpm}</span>
			<span class="key-badge">{key}</span>
		</div>
		<div class="node-stats">
			<div>
				<strong>{outgoing}</strong>
				<span>"Outgoing"</span>
			</div>
			<div>
				<strong>{incoming}</strong>
				<span>"Incoming"</span>
			</div>
		</div>
		{(outgoing > 0)
			.then(|| {
				view! {
					<div class="node-transitions">
						<h4>"Transitions to:"</h4>
						{transitions}
					</div>
				}
			})}
	}
	.into_any()
}

fn edge_details(model: &GraphModel, id: i64) -> AnyView {
	let Some(edge) = model.edge(id) else {
		return ().into_any();
	};
	let title = |track| {
		model
			.node(track)
			.map(|n| n.title.clone())
			.unwrap_or_else(|| format!("#{track}"))
	};
	view! {
		<h3>{format!("{} → {}", title(edge.from), title(edge.to))}</h3>
		<p class="transition-type">{edge.transition_type.label()}</p>
		<p class="stars">{"⭐".repeat(edge.stars() as usize)}</p>
		<p class="notes">{edge.notes.clone().unwrap_or_default()}</p>
	}
	.into_any()
}

/// Transition graph page: view picker, canvas, details panel and legend.
#[component]
pub fn Home() -> impl IntoView {
	let library = Arc::new(demo_library());
	let folders: Vec<(i64, String)> = library
		.folder_list()
		.into_iter()
		.map(|(id, f)| (id, format!("📁 {} ({})", f.name, f.tracks.len())))
		.collect();
	let playlists: Vec<(i64, String)> = library
		.playlist_list()
		.into_iter()
		.map(|(id, p)| (id, format!("📋 {}", p.name)))
		.collect();

	let view_type = RwSignal::new(ViewType::All);
	let folder = RwSignal::new(None::<i64>);
	let playlist = RwSignal::new(None::<i64>);
	let selection = RwSignal::new(Selection::None);

	let scope = Memo::new(move |_| match (view_type.get(), folder.get(), playlist.get()) {
		(ViewType::Folder, Some(id), _) => GraphScope::Folder(id),
		(ViewType::Playlist, _, Some(id)) => GraphScope::Playlist(id),
		_ => GraphScope::All,
	});

	let source = library;
	let snapshot = Memo::new(move |_| {
		load_view(&*source, scope.get()).unwrap_or_else(|err| {
			log::warn!("falling back to an empty graph: {err}");
			GraphSnapshot::default()
		})
	});

	let details = move || {
		snapshot.with(|s| match selection.get() {
			Selection::Node(id) => node_details(&s.model, id, selection),
			Selection::Edge(id) => edge_details(&s.model, id),
			Selection::None => ().into_any(),
		})
	};

	view! {
		<div class="graph-page">
			<div class="graph-controls">
				<div class="graph-filter">
					<label>"View:"</label>
					<select on:change=move |ev| {
						let next = match event_target_value(&ev).as_str() {
							"folder" => ViewType::Folder,
							"playlist" => ViewType::Playlist,
							_ => {
								folder.set(None);
								playlist.set(None);
								ViewType::All
							}
						};
						view_type.set(next);
					}>
						<option value="all">"All Tracks"</option>
						<option value="folder">"By Folder"</option>
						<option value="playlist">"By Playlist"</option>
					</select>
					<Show when=move || view_type.get() == ViewType::Folder>
						<select on:change=move |ev| folder.set(parse_id(&event_target_value(&ev)))>
							<option value="">"Select Folder..."</option>
							{folders
								.iter()
								.map(|(id, label)| view! { <option value={id.to_string()}>{label.clone()}</option> })
								.collect_view()}
						</select>
					</Show>
					<Show when=move || view_type.get() == ViewType::Playlist>
						<select on:change=move |ev| playlist.set(parse_id(&event_target_value(&ev)))>
							<option value="">"Select Playlist..."</option>
							{playlists
								.iter()
								.map(|(id, label)| view! { <option value={id.to_string()}>{label.clone()}</option> })
								.collect_view()}
						</select>
					</Show>
				</div>
				<div class="graph-stats">
					<span>{move || snapshot.with(|s| format!("🎵 {} tracks", s.model.nodes().len()))}</span>
					<span>{move || snapshot.with(|s| format!("➡️ {} transitions", s.model.edges().len()))}</span>
				</div>
			</div>

			<div class="graph-container">
				<Show when=move || snapshot.with(|s| s.model.is_empty())>
					<div class="graph-empty">
						<h3>"No tracks to display"</h3>
						<p>
							{move || {
								if view_type.get() == ViewType::All {
									"Import some tracks to see the graph"
								} else {
									"Add tracks to see the graph"
								}
							}}
						</p>
					</div>
				</Show>
				<ForceGraphCanvas data=snapshot selection=selection width=800.0 height=600.0 />
			</div>

			<Show when=move || selection.get() != Selection::None>
				<div class="node-details">
					{details}
					<button class="btn btn-secondary btn-small" on:click=move |_| selection.set(Selection::None)>
						"Close"
					</button>
				</div>
			</Show>

			<div class="graph-legend">
				<h4>"Legend"</h4>
				<div class="legend-item">
					<span class="legend-circle" style="background: #2d4a7c"></span>
					<span>"Has transitions both ways"</span>
				</div>
				<div class="legend-item">
					<span class="legend-circle" style="background: #1a5c3a"></span>
					<span>"Only outgoing transitions"</span>
				</div>
				<div class="legend-item">
					<span class="legend-circle" style="background: #5c3a1a"></span>
					<span>"Only incoming transitions"</span>
				</div>
				<div class="legend-item">
					<span class="legend-circle" style="background: #3a3a5c"></span>
					<span>"No transitions"</span>
				</div>
			</div>
		</div>
	}
}
