//! Skill entity records consumed by the graph builder.

use serde::Deserialize;
use thiserror::Error;

/// Optional experience metadata attached to a skill.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EntityMeta {
	/// Years of hands-on experience.
	#[serde(default)]
	pub years: Option<f64>,
	/// Number of projects the skill was used in.
	#[serde(default)]
	pub projects: Option<u32>,
	/// Certifications backing the skill.
	#[serde(default)]
	pub certifications: Vec<String>,
}

/// A validated skill record. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
	/// Unique identifier. Used by hierarchy rules and selection tracking.
	pub id: String,
	/// Display name, drawn as the node label.
	pub name: String,
	/// Free-text description shown in the details panel.
	pub description: String,
	/// Category name; decides node color and sibling links.
	pub category: String,
	/// Proficiency level in `0.0..=100.0`.
	pub level: f64,
	/// Free-form tags; shared tags produce `Related` links.
	pub tags: Vec<String>,
	/// Experience metadata.
	pub meta: EntityMeta,
	/// Optional icon URL. Nodes fall back to an initial glyph while it loads.
	pub icon: Option<String>,
}

impl Entity {
	/// Create an entity with the required fields; the name defaults to the id.
	pub fn new(id: impl Into<String>, category: impl Into<String>, level: f64) -> Self {
		let id = id.into();
		Self {
			name: id.clone(),
			id,
			description: String::new(),
			category: category.into(),
			level: level.clamp(0.0, 100.0),
			tags: Vec::new(),
			meta: EntityMeta::default(),
			icon: None,
		}
	}

	/// Builder: set the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	/// Builder: set the description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	/// Builder: set the tags.
	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}

	/// Builder: set years of experience and project count.
	pub fn with_experience(mut self, years: f64, projects: u32) -> Self {
		self.meta.years = Some(years);
		self.meta.projects = Some(projects);
		self
	}

	/// Whether the two entities share at least one tag (case-insensitive).
	pub fn shares_tag_with(&self, other: &Entity) -> bool {
		self.tags
			.iter()
			.any(|a| other.tags.iter().any(|b| a.eq_ignore_ascii_case(b)))
	}
}

/// Unvalidated skill record as it appears in the page's JSON payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawEntity {
	pub id: Option<String>,
	pub name: Option<String>,
	pub description: Option<String>,
	pub category: Option<String>,
	pub level: Option<f64>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default, flatten)]
	pub meta: EntityMeta,
	pub icon: Option<String>,
}

/// Why a raw record could not become an [`Entity`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
	#[error("skill entry has no id")]
	MissingId,

	#[error("skill `{id}` has no level")]
	MissingLevel { id: String },

	#[error("skill `{id}` has a non-numeric level ({level})")]
	InvalidLevel { id: String, level: f64 },
}

impl TryFrom<RawEntity> for Entity {
	type Error = EntityError;

	fn try_from(raw: RawEntity) -> Result<Self, Self::Error> {
		let id = raw
			.id
			.map(|id| id.trim().to_string())
			.filter(|id| !id.is_empty())
			.ok_or(EntityError::MissingId)?;
		let level = raw
			.level
			.ok_or_else(|| EntityError::MissingLevel { id: id.clone() })?;
		if !level.is_finite() {
			return Err(EntityError::InvalidLevel { id, level });
		}

		Ok(Self {
			name: raw.name.unwrap_or_else(|| id.clone()),
			id,
			description: raw.description.unwrap_or_default(),
			category: raw.category.unwrap_or_else(|| "other".to_string()),
			level: level.clamp(0.0, 100.0),
			tags: raw.tags,
			meta: raw.meta,
			icon: raw.icon,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn raw_entity_defaults_name_and_category() {
		let raw = RawEntity {
			id: Some("rust".into()),
			level: Some(140.0),
			..Default::default()
		};
		let entity = Entity::try_from(raw).unwrap();
		assert_eq!(entity.name, "rust");
		assert_eq!(entity.category, "other");
		assert_eq!(entity.level, 100.0);
	}

	#[test]
	fn raw_entity_without_id_or_level_is_rejected() {
		let missing_id = RawEntity {
			id: Some("   ".into()),
			level: Some(10.0),
			..Default::default()
		};
		assert_eq!(Entity::try_from(missing_id), Err(EntityError::MissingId));

		let missing_level = RawEntity {
			id: Some("go".into()),
			..Default::default()
		};
		assert_eq!(
			Entity::try_from(missing_level),
			Err(EntityError::MissingLevel { id: "go".into() })
		);
	}

	#[test]
	fn metadata_is_read_from_flat_json() {
		let raw: RawEntity = serde_json::from_str(
			r#"{"id":"k8s","level":70,"years":3.5,"projects":4,"certifications":["CKA"]}"#,
		)
		.unwrap();
		let entity = Entity::try_from(raw).unwrap();
		assert_eq!(entity.meta.years, Some(3.5));
		assert_eq!(entity.meta.projects, Some(4));
		assert_eq!(entity.meta.certifications, vec!["CKA".to_string()]);
	}

	#[test]
	fn tag_sharing_ignores_case() {
		let a = Entity::new("a", "x", 1.0).with_tags(["Web"]);
		let b = Entity::new("b", "y", 1.0).with_tags(["web", "ui"]);
		let c = Entity::new("c", "y", 1.0).with_tags(["cli"]);
		assert!(a.shares_tag_with(&b));
		assert!(!a.shares_tag_with(&c));
	}
}
