//! Skill data: the built-in skill list and hierarchy, and the JSON payload a
//! page can embed to replace them.

use std::collections::HashMap;

use log::info;
use serde::Deserialize;

use crate::components::force_graph::{
	Entity, LinkRules, RawEntity, SimulationConfig, validate_entities,
};

/// Payload embedded in the page as `<script id="skill-data" type="application/json">`.
///
/// ```json
/// { "skills": [{ "id": "rust", "level": 90, "category": "language" }],
///   "hierarchy": { "rust": ["leptos"] },
///   "simulation": { "link_distance": 120 } }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SkillPayload {
	pub skills: Vec<RawEntity>,
	pub hierarchy: HashMap<String, Vec<String>>,
	pub link_siblings: Option<bool>,
	pub link_tags: Option<bool>,
	pub simulation: SimulationConfig,
}

/// Everything the graph needs to mount.
#[derive(Clone, Debug)]
pub struct SkillData {
	pub entities: Vec<Entity>,
	pub rules: LinkRules,
	pub simulation: SimulationConfig,
}

impl Default for SkillData {
	fn default() -> Self {
		Self::builtin()
	}
}

impl SkillData {
	/// The built-in skill list with its hierarchy table.
	pub fn builtin() -> Self {
		Self {
			entities: default_skills(),
			rules: LinkRules::with_hierarchy(default_hierarchy()),
			simulation: SimulationConfig::default(),
		}
	}

	/// Parse a page payload. Missing or entirely invalid skill lists fall back
	/// to the built-in ones, as does an empty hierarchy table.
	pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
		let payload: SkillPayload = serde_json::from_str(json)?;
		Ok(Self::from_payload(payload))
	}

	pub fn from_payload(payload: SkillPayload) -> Self {
		let builtin = Self::builtin();
		let submitted = payload.skills.len();

		let mut entities = validate_entities(payload.skills);
		if entities.is_empty() {
			if submitted > 0 {
				info!("skill-graph: no usable skills in payload, using built-in list");
			}
			entities = builtin.entities;
		}

		let mut rules = if payload.hierarchy.is_empty() {
			builtin.rules
		} else {
			LinkRules {
				hierarchy: payload.hierarchy,
				..LinkRules::default()
			}
		};
		if let Some(link_siblings) = payload.link_siblings {
			rules.link_siblings = link_siblings;
		}
		if let Some(link_tags) = payload.link_tags {
			rules.link_tags = link_tags;
		}

		Self {
			entities,
			rules,
			simulation: payload.simulation,
		}
	}

	/// Distinct categories in first-seen order, for filter controls.
	pub fn categories(&self) -> Vec<String> {
		let mut seen = Vec::new();
		for entity in &self.entities {
			if !seen.contains(&entity.category) {
				seen.push(entity.category.clone());
			}
		}
		seen
	}
}

fn skill(id: &str, name: &str, category: &str, level: f64) -> Entity {
	Entity::new(id, category, level).with_name(name)
}

/// The portfolio's static skill list.
pub fn default_skills() -> Vec<Entity> {
	vec![
		skill("rust", "Rust", "language", 92.0)
			.with_description("Systems programming, WASM front-ends and async services.")
			.with_tags(["systems", "wasm"])
			.with_experience(5.0, 14),
		skill("typescript", "TypeScript", "language", 88.0)
			.with_description("Typed front-end and Node.js codebases.")
			.with_tags(["web"])
			.with_experience(6.0, 20),
		skill("python", "Python", "language", 75.0)
			.with_description("Tooling, data wrangling and scripting.")
			.with_tags(["data", "scripting"])
			.with_experience(7.0, 12),
		skill("go", "Go", "language", 60.0)
			.with_description("Network services and CLIs.")
			.with_tags(["systems"])
			.with_experience(2.0, 4),
		skill("leptos", "Leptos", "frontend", 80.0)
			.with_description("Fine-grained reactive UI in Rust.")
			.with_tags(["wasm", "web"])
			.with_experience(2.0, 5),
		skill("react", "React", "frontend", 85.0)
			.with_description("Component-driven SPAs.")
			.with_tags(["web"])
			.with_experience(6.0, 18),
		skill("svelte", "Svelte", "frontend", 55.0)
			.with_tags(["web"])
			.with_experience(1.0, 2),
		skill("axum", "Axum", "backend", 78.0)
			.with_description("HTTP APIs on tokio.")
			.with_tags(["systems", "http"])
			.with_experience(3.0, 6),
		skill("node", "Node.js", "backend", 82.0)
			.with_tags(["http"])
			.with_experience(6.0, 15),
		skill("django", "Django", "backend", 50.0)
			.with_tags(["http"])
			.with_experience(1.5, 3),
		skill("postgres", "PostgreSQL", "database", 80.0)
			.with_description("Schema design, query tuning, migrations.")
			.with_tags(["data", "sql"])
			.with_experience(6.0, 16),
		skill("sqlite", "SQLite", "database", 65.0)
			.with_tags(["sql"])
			.with_experience(4.0, 8),
		skill("redis", "Redis", "database", 58.0)
			.with_tags(["data"])
			.with_experience(3.0, 5),
		skill("docker", "Docker", "devops", 84.0)
			.with_tags(["containers"])
			.with_experience(6.0, 20),
		skill("kubernetes", "Kubernetes", "devops", 62.0)
			.with_tags(["containers"])
			.with_experience(2.0, 4),
		skill("nix", "Nix", "devops", 70.0)
			.with_description("Reproducible builds and dev shells.")
			.with_tags(["systems", "scripting"])
			.with_experience(3.0, 7),
		skill("aws", "AWS", "cloud", 68.0)
			.with_tags(["containers"])
			.with_experience(4.0, 9),
		skill("git", "Git", "tools", 90.0).with_experience(9.0, 40),
		skill("figma", "Figma", "design", 45.0)
			.with_tags(["web"])
			.with_experience(3.0, 6),
	]
}

/// Parent -> children encompassed by it.
pub fn default_hierarchy() -> Vec<(&'static str, Vec<&'static str>)> {
	vec![
		("rust", vec!["leptos", "axum"]),
		("typescript", vec!["react", "svelte", "node"]),
		("python", vec!["django"]),
		("docker", vec!["kubernetes"]),
	]
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::{EdgeKind, build};

	#[test]
	fn builtin_ids_are_unique_and_hierarchy_resolves() {
		let data = SkillData::builtin();
		let mut ids: Vec<_> = data.entities.iter().map(|e| e.id.as_str()).collect();
		ids.sort_unstable();
		ids.dedup();
		assert_eq!(ids.len(), data.entities.len());

		for (parent, children) in default_hierarchy() {
			assert!(ids.contains(&parent), "{parent}");
			for child in children {
				assert!(ids.contains(&child), "{child}");
			}
		}
	}

	#[test]
	fn builtin_graph_links_framework_to_language() {
		let data = SkillData::builtin();
		let model = build(&data.entities, &data.rules);
		let rust = model.index_of("rust").unwrap();
		let leptos = model.index_of("leptos").unwrap();
		let edge = model
			.edges
			.iter()
			.find(|e| e.touches(rust) && e.touches(leptos))
			.unwrap();
		assert_eq!(edge.kind, EdgeKind::Hierarchical);
	}

	#[test]
	fn payload_replaces_skills_and_keeps_defaults_elsewhere() {
		let data = SkillData::parse(
			r#"{
				"skills": [
					{ "id": "zig", "name": "Zig", "category": "language", "level": 40 },
					{ "name": "no id", "level": 10 }
				],
				"simulation": { "link_distance": 150 }
			}"#,
		)
		.unwrap();
		assert_eq!(data.entities.len(), 1);
		assert_eq!(data.entities[0].name, "Zig");
		assert_eq!(data.simulation.link_distance, 150.0);
		assert_eq!(
			data.simulation.velocity_decay,
			SimulationConfig::default().velocity_decay
		);
		assert!(data.rules.hierarchy.contains_key("rust"));
	}

	#[test]
	fn payload_without_usable_skills_falls_back() {
		let data = SkillData::parse(r#"{ "skills": [{ "id": "x" }], "link_tags": false }"#).unwrap();
		assert_eq!(data.entities.len(), default_skills().len());
		assert!(!data.rules.link_tags);
		assert!(data.rules.link_siblings);
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(SkillData::parse("{ skills: ").is_err());
	}

	#[test]
	fn categories_are_listed_once_in_order() {
		let cats = SkillData::builtin().categories();
		assert_eq!(cats.first().map(String::as_str), Some("language"));
		assert_eq!(cats.iter().filter(|c| *c == "devops").count(), 1);
	}
}
