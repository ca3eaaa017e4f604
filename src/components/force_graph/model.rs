//! Graph model: skill entities turned into positioned nodes and typed edges.
//!
//! Nodes live in an arena (`Vec<Node>`) and are addressed by [`NodeIdx`]. A
//! model is never patched in place; every filter change builds a fresh one.

use std::collections::{BTreeSet, HashMap};
use std::f64::consts::PI;

use log::warn;
use serde::Deserialize;

use super::scale::{Tier, level_radius};
use super::types::{Entity, RawEntity};

/// Index of a node in [`GraphModel::nodes`]. Only valid for the model that
/// produced it.
pub type NodeIdx = usize;

/// Why two nodes are linked, in descending precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
	/// Listed in the hierarchy table (e.g. a language and a framework on it).
	Hierarchical,
	/// Same category.
	Sibling,
	/// At least one shared tag.
	Related,
}

/// An unordered link between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub source: NodeIdx,
	pub target: NodeIdx,
	pub kind: EdgeKind,
	/// Offset in `[0, 1)` of this edge's flow particle.
	pub phase: f64,
}

impl Edge {
	/// Whether the edge touches `idx`.
	pub fn touches(&self, idx: NodeIdx) -> bool {
		self.source == idx || self.target == idx
	}
}

/// A simulated node. Owns a copy of its entity for the lifetime of the model.
#[derive(Clone, Debug)]
pub struct Node {
	pub entity: Entity,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Position forced by a drag; overrides integration while set.
	pub pin: Option<(f64, f64)>,
	/// World-space radius, from the entity level.
	pub radius: f64,
	pub tier: Tier,
}

impl Node {
	fn new(entity: Entity, x: f64, y: f64) -> Self {
		Self {
			radius: level_radius(entity.level),
			tier: Tier::from_level(entity.level),
			entity,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			pin: None,
		}
	}

	pub fn id(&self) -> &str {
		&self.entity.id
	}

	pub fn category(&self) -> &str {
		&self.entity.category
	}

	/// Squared distance from the node centre to a world-space point.
	pub fn distance_sq(&self, x: f64, y: f64) -> f64 {
		let (dx, dy) = (self.x - x, self.y - y);
		dx * dx + dy * dy
	}
}

/// Linking configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LinkRules {
	/// Parent id -> ids of the children it encompasses.
	pub hierarchy: HashMap<String, Vec<String>>,
	/// Link skills of the same category.
	pub link_siblings: bool,
	/// Link skills sharing a tag.
	pub link_tags: bool,
}

impl Default for LinkRules {
	fn default() -> Self {
		Self {
			hierarchy: HashMap::new(),
			link_siblings: true,
			link_tags: true,
		}
	}
}

impl LinkRules {
	/// Rules with the given hierarchy table and sibling/tag linking enabled.
	pub fn with_hierarchy<I, P, C>(table: I) -> Self
	where
		I: IntoIterator<Item = (P, Vec<C>)>,
		P: Into<String>,
		C: Into<String>,
	{
		Self {
			hierarchy: table
				.into_iter()
				.map(|(parent, children)| {
					(parent.into(), children.into_iter().map(Into::into).collect())
				})
				.collect(),
			..Self::default()
		}
	}

	fn is_hierarchical(&self, a: &str, b: &str) -> bool {
		let lists = |parent: &str, child: &str| {
			self.hierarchy
				.get(parent)
				.is_some_and(|children| children.iter().any(|c| c == child))
		};
		lists(a, b) || lists(b, a)
	}

	/// Highest-precedence rule linking the pair, if any.
	pub fn classify(&self, a: &Entity, b: &Entity) -> Option<EdgeKind> {
		if a.id == b.id {
			return None;
		}
		if self.is_hierarchical(&a.id, &b.id) {
			Some(EdgeKind::Hierarchical)
		} else if self.link_siblings && a.category.eq_ignore_ascii_case(&b.category) {
			Some(EdgeKind::Sibling)
		} else if self.link_tags && a.shares_tag_with(b) {
			Some(EdgeKind::Related)
		} else {
			None
		}
	}
}

/// Active filter predicate. The default matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphFilter {
	/// Case-insensitive substring over name, id, description and tags.
	pub search: String,
	/// Categories to keep; empty keeps all.
	pub categories: BTreeSet<String>,
	/// Minimum level to keep.
	pub min_level: f64,
}

impl GraphFilter {
	pub fn matches(&self, entity: &Entity) -> bool {
		if entity.level < self.min_level {
			return false;
		}
		if !self.categories.is_empty()
			&& !self
				.categories
				.iter()
				.any(|c| c.eq_ignore_ascii_case(&entity.category))
		{
			return false;
		}

		let needle = self.search.trim().to_lowercase();
		if needle.is_empty() {
			return true;
		}
		entity.name.to_lowercase().contains(&needle)
			|| entity.id.to_lowercase().contains(&needle)
			|| entity.description.to_lowercase().contains(&needle)
			|| entity
				.tags
				.iter()
				.any(|t| t.to_lowercase().contains(&needle))
	}

	/// Entities passing the filter, in input order.
	pub fn apply<'a>(&self, entities: &'a [Entity]) -> Vec<&'a Entity> {
		entities.iter().filter(|e| self.matches(e)).collect()
	}
}

/// Nodes and edges of one filtered entity set.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	index: HashMap<String, NodeIdx>,
}

impl GraphModel {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node handle for an entity id.
	pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	pub fn node(&self, idx: NodeIdx) -> Option<&Node> {
		self.nodes.get(idx)
	}

	pub fn node_mut(&mut self, idx: NodeIdx) -> Option<&mut Node> {
		self.nodes.get_mut(idx)
	}

	/// Reuse positions (and pins) of nodes present in `previous` as seeds.
	pub fn seed_from(&mut self, previous: &GraphModel) {
		for node in &mut self.nodes {
			if let Some(old) = previous.index_of(node.id()).and_then(|i| previous.node(i)) {
				node.x = old.x;
				node.y = old.y;
				node.vx = old.vx;
				node.vy = old.vy;
				node.pin = old.pin;
			}
		}
	}
}

/// Build nodes and edges for `entities`.
///
/// Duplicate ids keep the later entity in place of the earlier one. Each
/// unordered pair gets at most one edge, typed by the first matching rule
/// (hierarchical, then sibling, then shared tag).
pub fn build<'a, I>(entities: I, rules: &LinkRules) -> GraphModel
where
	I: IntoIterator<Item = &'a Entity>,
{
	let mut unique: Vec<Entity> = Vec::new();
	let mut index: HashMap<String, NodeIdx> = HashMap::new();
	for entity in entities {
		let existing = index.get(&entity.id).copied();
		match existing {
			Some(slot) => unique[slot] = entity.clone(),
			None => {
				index.insert(entity.id.clone(), unique.len());
				unique.push(entity.clone());
			}
		}
	}

	let count = unique.len();
	let nodes: Vec<Node> = unique
		.into_iter()
		.enumerate()
		.map(|(i, entity)| {
			let (x, y) = seed_position(i);
			Node::new(entity, x, y)
		})
		.collect();

	let mut edges = Vec::new();
	for a in 0..count {
		for b in (a + 1)..count {
			if let Some(kind) = rules.classify(&nodes[a].entity, &nodes[b].entity) {
				edges.push(Edge {
					source: a,
					target: b,
					kind,
					phase: edge_phase(nodes[a].id(), nodes[b].id()),
				});
			}
		}
	}

	GraphModel {
		nodes,
		edges,
		index,
	}
}

/// Validate raw records, skipping malformed ones, then [`build`].
pub fn build_from_raw(raw: Vec<RawEntity>, rules: &LinkRules) -> GraphModel {
	let entities = validate_entities(raw);
	build(&entities, rules)
}

/// Convert raw records into entities, logging and dropping the invalid ones.
pub fn validate_entities(raw: Vec<RawEntity>) -> Vec<Entity> {
	raw.into_iter()
		.filter_map(|r| match Entity::try_from(r) {
			Ok(entity) => Some(entity),
			Err(e) => {
				warn!("skill-graph: skipping skill entry: {}", e);
				None
			}
		})
		.collect()
}

/// Phyllotaxis spiral around the origin, so fresh nodes never coincide.
fn seed_position(i: usize) -> (f64, f64) {
	let radius = 10.0 * (0.5 + i as f64).sqrt();
	let angle = i as f64 * PI * (3.0 - 5.0_f64.sqrt());
	(radius * angle.cos(), radius * angle.sin())
}

/// Stable per-edge phase derived from the (order-independent) endpoint ids.
fn edge_phase(a: &str, b: &str) -> f64 {
	let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
	let hash = lo
		.bytes()
		.chain(std::iter::once(0))
		.chain(hi.bytes())
		.fold(0x811c_9dc5_u32, |h, byte| {
			(h ^ byte as u32).wrapping_mul(0x0100_0193)
		});
	(hash % 10_000) as f64 / 10_000.0
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	fn sample() -> Vec<Entity> {
		vec![
			Entity::new("rust", "language", 90.0).with_tags(["systems", "wasm"]),
			Entity::new("typescript", "language", 85.0).with_tags(["web"]),
			Entity::new("react", "frontend", 80.0).with_tags(["web", "ui"]),
			Entity::new("leptos", "frontend", 60.0).with_tags(["wasm", "ui"]),
			Entity::new("postgres", "database", 70.0),
			Entity::new("docker", "devops", 65.0).with_tags(["containers"]),
		]
	}

	fn rules() -> LinkRules {
		LinkRules::with_hierarchy([
			("rust", vec!["leptos"]),
			("typescript", vec!["react"]),
		])
	}

	fn edge_pairs(model: &GraphModel) -> HashSet<(String, String)> {
		model
			.edges
			.iter()
			.map(|e| {
				let (a, b) = (model.nodes[e.source].id(), model.nodes[e.target].id());
				if a <= b {
					(a.to_string(), b.to_string())
				} else {
					(b.to_string(), a.to_string())
				}
			})
			.collect()
	}

	#[test]
	fn empty_input_builds_empty_model() {
		let model = build(&[], &rules());
		assert!(model.nodes.is_empty());
		assert!(model.edges.is_empty());
	}

	#[test]
	fn two_entities_of_same_category_get_one_sibling_edge() {
		let entities = vec![Entity::new("a", "X", 50.0), Entity::new("b", "X", 80.0)];
		let model = build(&entities, &LinkRules::default());

		assert_eq!(model.nodes.len(), 2);
		assert_eq!(model.edges.len(), 1);
		assert_eq!(model.edges[0].kind, EdgeKind::Sibling);

		let a = &model.nodes[model.index_of("a").unwrap()];
		let b = &model.nodes[model.index_of("b").unwrap()];
		assert!(b.radius > a.radius);
	}

	#[test]
	fn edges_are_unique_and_never_self_loops() {
		let model = build(&sample(), &rules());
		let mut seen = HashSet::new();
		for edge in &model.edges {
			assert_ne!(edge.source, edge.target);
			let key = (edge.source.min(edge.target), edge.source.max(edge.target));
			assert!(seen.insert(key), "duplicate edge {key:?}");
		}
	}

	#[test]
	fn hierarchy_beats_category_and_tags() {
		let model = build(&sample(), &rules());
		let kind_of = |a: &str, b: &str| {
			let (ia, ib) = (model.index_of(a).unwrap(), model.index_of(b).unwrap());
			model
				.edges
				.iter()
				.find(|e| (e.source == ia && e.target == ib) || (e.source == ib && e.target == ia))
				.map(|e| e.kind)
		};

		// rust/leptos share a tag too, hierarchy wins
		assert_eq!(kind_of("rust", "leptos"), Some(EdgeKind::Hierarchical));
		// react/leptos share a category and a tag, sibling wins
		assert_eq!(kind_of("react", "leptos"), Some(EdgeKind::Sibling));
		assert_eq!(kind_of("typescript", "leptos"), None);
		assert_eq!(kind_of("typescript", "react"), Some(EdgeKind::Hierarchical));
		assert_eq!(kind_of("postgres", "docker"), None);
	}

	#[test]
	fn hierarchy_applies_in_either_direction() {
		let rules = LinkRules {
			link_siblings: false,
			link_tags: false,
			..LinkRules::with_hierarchy([("child", vec!["parent"])])
		};
		let entities = vec![Entity::new("parent", "a", 1.0), Entity::new("child", "b", 1.0)];
		let model = build(&entities, &rules);
		assert_eq!(model.edges.len(), 1);
		assert_eq!(model.edges[0].kind, EdgeKind::Hierarchical);
	}

	#[test]
	fn duplicate_ids_keep_the_last_entity() {
		let entities = vec![
			Entity::new("a", "X", 10.0),
			Entity::new("b", "X", 20.0),
			Entity::new("a", "Y", 90.0),
		];
		let model = build(&entities, &LinkRules::default());
		assert_eq!(model.nodes.len(), 2);
		let a = &model.nodes[model.index_of("a").unwrap()];
		assert_eq!(a.entity.category, "Y");
		assert_eq!(a.entity.level, 90.0);
		assert!(model.edges.is_empty());
	}

	#[test]
	fn malformed_entries_are_skipped_without_dangling_edges() {
		let raw = vec![
			RawEntity {
				id: Some("a".into()),
				category: Some("X".into()),
				level: Some(10.0),
				..Default::default()
			},
			RawEntity {
				id: Some("broken".into()),
				category: Some("X".into()),
				..Default::default()
			},
			RawEntity {
				category: Some("X".into()),
				level: Some(50.0),
				..Default::default()
			},
			RawEntity {
				id: Some("b".into()),
				category: Some("X".into()),
				level: Some(30.0),
				..Default::default()
			},
		];
		let model = build_from_raw(raw, &LinkRules::default());
		assert_eq!(model.nodes.len(), 2);
		assert!(model.index_of("broken").is_none());
		for edge in &model.edges {
			assert!(edge.source < model.nodes.len());
			assert!(edge.target < model.nodes.len());
		}
	}

	#[test]
	fn filter_matches_search_category_and_level() {
		let entities = sample();
		let filter = GraphFilter {
			search: "WASM".into(),
			..Default::default()
		};
		let ids: Vec<_> = filter.apply(&entities).iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["rust", "leptos"]);

		let filter = GraphFilter {
			categories: ["frontend".to_string()].into_iter().collect(),
			min_level: 70.0,
			..Default::default()
		};
		let ids: Vec<_> = filter.apply(&entities).iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["react"]);
	}

	#[test]
	fn applying_a_filter_twice_is_idempotent() {
		let entities = sample();
		let filter = GraphFilter {
			search: "e".into(),
			min_level: 60.0,
			..Default::default()
		};
		let once = build(filter.apply(&entities), &rules());
		let twice = build(filter.apply(&entities), &rules());

		let ids = |m: &GraphModel| m.nodes.iter().map(|n| n.id().to_string()).collect::<Vec<_>>();
		assert_eq!(ids(&once), ids(&twice));
		assert_eq!(edge_pairs(&once), edge_pairs(&twice));
	}

	#[test]
	fn edge_phase_is_order_independent_and_in_range() {
		let p = edge_phase("rust", "leptos");
		assert_eq!(p, edge_phase("leptos", "rust"));
		assert!((0.0..1.0).contains(&p));
	}

	#[test]
	fn seeding_keeps_positions_of_surviving_nodes() {
		let entities = sample();
		let mut first = build(&entities, &rules());
		let rust = first.index_of("rust").unwrap();
		first.nodes[rust].x = 123.0;
		first.nodes[rust].y = -45.0;

		let filter = GraphFilter {
			search: "rust".into(),
			..Default::default()
		};
		let mut second = build(filter.apply(&entities), &rules());
		second.seed_from(&first);
		let node = &second.nodes[second.index_of("rust").unwrap()];
		assert_eq!((node.x, node.y), (123.0, -45.0));
	}
}
