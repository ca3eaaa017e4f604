//! skill-graph: Interactive force-directed skill graph for a portfolio site.
//!
//! This crate provides a WASM-based canvas component that lays out skills
//! with a force simulation, links them by hierarchy, category and shared
//! tags, and supports hover, selection, dragging, pan and zoom.

use std::collections::BTreeSet;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod skills;

pub use components::force_graph::{
	ColorMode, Entity, GraphFilter, HoverInfo, SkillGraphCanvas, Theme,
};
pub use skills::SkillData;

use components::force_graph::scale::Tier;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("skill-graph: logging initialized");
}

/// Load skill data from a script element with id="skill-data".
/// Expected format: JSON with { skills: [...], hierarchy: {...}, simulation: {...} }
fn load_skill_data() -> Option<SkillData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("skill-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match SkillData::parse(&json_text) {
		Ok(data) => {
			info!(
				"skill-graph: loaded {} skills, {} hierarchy roots",
				data.entities.len(),
				data.rules.hierarchy.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("skill-graph: failed to parse skill data: {}", e);
			None
		}
	}
}

/// Side panel for the selected skill.
#[component]
fn SkillDetails(entity: Entity, on_close: Callback<()>) -> impl IntoView {
	let tier = Tier::from_level(entity.level).label();
	let years = entity
		.meta
		.years
		.map(|y| view! { <li>{format!("{y} years")}</li> });
	let projects = entity
		.meta
		.projects
		.map(|p| view! { <li>{format!("{p} projects")}</li> });
	let certifications = entity
		.meta
		.certifications
		.iter()
		.map(|c| view! { <li class="cert">{c.clone()}</li> })
		.collect_view();
	let tags = entity
		.tags
		.iter()
		.map(|t| view! { <span class="tag">{t.clone()}</span> })
		.collect_view();

	view! {
		<aside class="skill-details">
			<button class="close" title="Close" on:click=move |_| on_close.run(())>"x"</button>
			<h2>{entity.name.clone()}</h2>
			<p class="level">{format!("{tier} ({:.0}/100)", entity.level)}</p>
			<p class="category">{entity.category.clone()}</p>
			<p class="description">{entity.description.clone()}</p>
			<ul class="meta">{years}{projects}{certifications}</ul>
			<div class="tags">{tags}</div>
		</aside>
	}
}

/// Main application component.
/// Loads skill data from the DOM and renders the graph with its controls.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let data = load_skill_data().unwrap_or_default();
	let categories = data.categories();
	let entities = Signal::stored(data.entities);

	let search = RwSignal::new(String::new());
	let min_level = RwSignal::new(0.0_f64);
	let active = RwSignal::new(BTreeSet::<String>::new());
	let color_mode = RwSignal::new(ColorMode::default());
	let selected = RwSignal::new(None::<Entity>);
	let hovered = RwSignal::new(None::<HoverInfo>);
	let close_requests = RwSignal::new(0_u32);

	let filter = Signal::derive(move || GraphFilter {
		search: search.get(),
		categories: active.get(),
		min_level: min_level.get(),
	});

	let category_buttons = categories
		.into_iter()
		.map(|category| {
			let name = category.clone();
			let is_active = {
				let category = category.clone();
				move || active.with(|set| set.contains(&category))
			};
			let toggle = move |_| {
				active.update(|set| {
					if !set.remove(&category) {
						set.insert(category.clone());
					}
				})
			};
			view! {
				<button class="category" class:active=is_active on:click=toggle>{name}</button>
			}
		})
		.collect_view();

	let tooltip = move || {
		hovered.get().map(|info| {
			view! {
				<div
					class="skill-tooltip"
					style=format!("left: {}px; top: {}px;", info.x + 14.0, info.y + 14.0)
				>
					<strong>{info.entity.name.clone()}</strong>
					<span>{format!(" {:.0}", info.entity.level)}</span>
				</div>
			}
		})
	};

	let details = move || {
		selected.get().map(|entity| {
			view! {
				<SkillDetails
					entity=entity
					on_close=Callback::new(move |_| close_requests.update(|n| *n += 1))
				/>
			}
		})
	};

	view! {
		<Html
			attr:lang="en"
			attr:dir="ltr"
			attr:data-theme=move || match color_mode.get() {
				ColorMode::Dark => "dark",
				ColorMode::Light => "light",
			}
		/>
		<Title text="Skill Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<SkillGraphCanvas
				entities=entities
				filter=filter
				color_mode=color_mode
				rules=data.rules
				simulation=data.simulation
				on_select=Callback::new(move |entity| selected.set(entity))
				on_hover=Callback::new(move |info| hovered.set(info))
				close_requests=close_requests
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Skills"</h1>
				<p class="subtitle">"Click a skill for details. Drag to reposition. Scroll to zoom."</p>
				<input
					type="search"
					placeholder="Search skills"
					prop:value=move || search.get()
					on:input=move |ev| search.set(event_target_value(&ev))
				/>
				<label>
					"Minimum level "
					<input
						type="range"
						min="0"
						max="100"
						step="5"
						prop:value=move || min_level.get().to_string()
						on:input=move |ev| {
							min_level.set(event_target_value(&ev).parse().unwrap_or(0.0))
						}
					/>
				</label>
				<div class="categories">{category_buttons}</div>
				<button
					class="theme-toggle"
					on:click=move |_| color_mode.update(|m| *m = m.toggled())
				>
					{move || match color_mode.get() {
						ColorMode::Dark => "Light mode",
						ColorMode::Light => "Dark mode",
					}}
				</button>
			</div>
			{tooltip}
			{details}
		</div>
	}
}
