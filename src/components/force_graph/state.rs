//! Graph state: the built model, its simulation, the view transform and the
//! interaction/selection state, plus the rebuild lifecycle on filter changes.
//!
//! Created once when the component mounts, then mutated by the animation
//! loop (`tick`) and by input events (`handle_pointer`, see `interaction.rs`).

use log::debug;

use super::highlight::HighlightState;
use super::interaction::{Cursor, Effect, InteractionState};
use super::model::{GraphFilter, GraphModel, LinkRules, NodeIdx, build};
use super::scale::ScaleConfig;
use super::simulation::{Simulation, SimulationConfig};
use super::types::Entity;
use super::view::ViewTransform;

/// Hovered entity plus its screen position, for tooltip placement.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
	pub entity: Entity,
	pub x: f64,
	pub y: f64,
}

/// Core graph state combining the physics simulation with view, interaction
/// and highlight tracking.
pub struct ForceGraphState {
	entities: Vec<Entity>,
	rules: LinkRules,
	filter: GraphFilter,
	pub model: GraphModel,
	pub simulation: Simulation,
	pub transform: ViewTransform,
	pub interaction: InteractionState,
	pub selected: Option<NodeIdx>,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	/// Seconds since mount; drives pulse and flow animations.
	pub flow_time: f64,
}

impl ForceGraphState {
	pub fn new(
		entities: Vec<Entity>,
		rules: LinkRules,
		config: SimulationConfig,
		width: f64,
		height: f64,
	) -> Self {
		let filter = GraphFilter::default();
		let model = build(filter.apply(&entities), &rules);
		debug!(
			"skill-graph: built {} nodes, {} edges",
			model.nodes.len(),
			model.edges.len()
		);

		Self {
			entities,
			rules,
			filter,
			model,
			simulation: Simulation::new(config),
			transform: ViewTransform::centered(width, height),
			interaction: InteractionState::Idle,
			selected: None,
			highlight: HighlightState::default(),
			width,
			height,
			flow_time: 0.0,
		}
	}

	pub fn filter(&self) -> &GraphFilter {
		&self.filter
	}

	pub fn entities(&self) -> &[Entity] {
		&self.entities
	}

	/// Replace the filter and rebuild. Same filter twice is a no-op.
	pub fn set_filter(&mut self, filter: GraphFilter) -> Vec<Effect> {
		if filter == self.filter {
			return Vec::new();
		}
		self.filter = filter;
		self.rebuild()
	}

	/// Replace the source entities and rebuild.
	pub fn set_entities(&mut self, entities: Vec<Entity>) -> Vec<Effect> {
		if entities == self.entities {
			return Vec::new();
		}
		self.entities = entities;
		self.rebuild()
	}

	/// Replace entities and filter together, rebuilding at most once.
	pub fn set_data(&mut self, entities: Vec<Entity>, filter: GraphFilter) -> Vec<Effect> {
		if entities == self.entities && filter == self.filter {
			return Vec::new();
		}
		self.entities = entities;
		self.filter = filter;
		self.rebuild()
	}

	/// Build a fresh model for the current filter, carrying positions,
	/// selection, hover and any drag over to the nodes that survive.
	fn rebuild(&mut self) -> Vec<Effect> {
		let mut model = build(self.filter.apply(&self.entities), &self.rules);
		model.seed_from(&self.model);
		let old = std::mem::replace(&mut self.model, model);
		debug!(
			"skill-graph: rebuilt {} -> {} nodes, {} edges",
			old.nodes.len(),
			self.model.nodes.len(),
			self.model.edges.len()
		);

		let mut effects = Vec::new();
		if let Some(selected) = self.selected {
			self.selected = remap(&old, &self.model, selected);
			if self.selected.is_none() {
				effects.push(Effect::SelectionChanged(None));
			}
		}

		self.interaction = match std::mem::take(&mut self.interaction) {
			InteractionState::Idle => InteractionState::Idle,
			InteractionState::Hovering(idx) => match remap(&old, &self.model, idx) {
				Some(idx) => InteractionState::Hovering(idx),
				None => {
					effects.push(Effect::HoverChanged(None));
					effects.push(Effect::Cursor(Cursor::Grab));
					InteractionState::Idle
				}
			},
			InteractionState::DraggingNode {
				node,
				origin,
				moved,
			} => match remap(&old, &self.model, node) {
				Some(node) => InteractionState::DraggingNode {
					node,
					origin,
					moved,
				},
				None => {
					// dragged node filtered out: behave like a release
					self.simulation.end_drag();
					effects.push(Effect::Cursor(Cursor::Grab));
					InteractionState::Idle
				}
			},
			panning @ InteractionState::Panning { .. } => panning,
		};

		self.highlight.reset();
		self.highlight.set_focus(self.focused(), &self.model.edges);
		self.simulation.reheat();
		effects
	}

	/// Node under the pointer (hovered) when idle.
	pub fn hovered(&self) -> Option<NodeIdx> {
		match self.interaction {
			InteractionState::Hovering(idx) => Some(idx),
			_ => None,
		}
	}

	/// Node being dragged, if any.
	pub fn dragged(&self) -> Option<NodeIdx> {
		match self.interaction {
			InteractionState::DraggingNode { node, .. } => Some(node),
			_ => None,
		}
	}

	/// Node whose neighborhood is highlighted: the dragged or hovered one.
	pub fn focused(&self) -> Option<NodeIdx> {
		self.dragged().or_else(|| self.hovered())
	}

	pub fn selected_entity(&self) -> Option<&Entity> {
		self.selected
			.and_then(|idx| self.model.node(idx))
			.map(|n| &n.entity)
	}

	pub fn hover_info(&self, idx: NodeIdx) -> Option<HoverInfo> {
		let node = self.model.node(idx)?;
		let (x, y) = self.transform.world_to_screen(node.x, node.y);
		Some(HoverInfo {
			entity: node.entity.clone(),
			x,
			y,
		})
	}

	/// Topmost node whose hit radius contains the screen point.
	///
	/// Nodes are painted in arena order, so the scan runs backwards and the
	/// last-painted match wins when circles overlap.
	pub fn node_at(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<NodeIdx> {
		let (wx, wy) = self.transform.screen_to_world(sx, sy);
		self.model
			.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, node)| {
				let hit = config.hit_radius(node.radius);
				node.distance_sq(wx, wy) < hit * hit
			})
			.map(|(idx, _)| idx)
	}

	/// Clear the selection (the shell's "close" action).
	pub fn clear_selection(&mut self) -> Vec<Effect> {
		if self.selected.take().is_some() {
			vec![Effect::SelectionChanged(None)]
		} else {
			Vec::new()
		}
	}

	/// Advance physics and animations by one frame.
	pub fn tick(&mut self, dt: f64) {
		self.simulation
			.tick(&mut self.model.nodes, &self.model.edges);
		self.flow_time += dt;
		self.highlight.tick(dt);
	}

	/// Keep the graph centred in a resized canvas and re-heat the layout.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform
			.pan_by((width - self.width) / 2.0, (height - self.height) / 2.0);
		self.width = width;
		self.height = height;
		self.simulation.reheat();
	}

	pub fn zoom_by(&mut self, factor: f64) {
		self.transform.zoom_by(factor);
	}

	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::centered(self.width, self.height);
	}
}

fn remap(old: &GraphModel, new: &GraphModel, idx: NodeIdx) -> Option<NodeIdx> {
	old.node(idx).and_then(|n| new.index_of(n.id()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_state() -> ForceGraphState {
		let entities = vec![
			Entity::new("a", "X", 50.0).with_name("Alpha"),
			Entity::new("b", "X", 80.0).with_name("Beta"),
			Entity::new("c", "Y", 30.0).with_name("Gamma"),
		];
		ForceGraphState::new(
			entities,
			LinkRules::default(),
			SimulationConfig::default(),
			800.0,
			600.0,
		)
	}

	fn search(text: &str) -> GraphFilter {
		GraphFilter {
			search: text.into(),
			..Default::default()
		}
	}

	#[test]
	fn filter_removing_selected_node_clears_selection() {
		let mut state = sample_state();
		state.selected = state.model.index_of("a");
		assert_eq!(state.selected_entity().map(|e| e.id.as_str()), Some("a"));

		let effects = state.set_filter(search("beta"));
		assert_eq!(effects, vec![Effect::SelectionChanged(None)]);
		assert!(state.selected.is_none());
		assert!(state.selected_entity().is_none());
		assert!(state.model.index_of("a").is_none());
	}

	#[test]
	fn selection_survives_filter_that_keeps_it() {
		let mut state = sample_state();
		state.selected = state.model.index_of("b");
		let effects = state.set_filter(search("beta"));
		assert!(effects.is_empty());
		assert_eq!(state.selected_entity().map(|e| e.id.as_str()), Some("b"));
	}

	#[test]
	fn same_filter_twice_does_not_rebuild() {
		let mut state = sample_state();
		state.set_filter(search("a"));
		let ids: Vec<_> = state.model.nodes.iter().map(|n| n.id().to_string()).collect();
		assert!(state.set_filter(search("a")).is_empty());
		let again: Vec<_> = state.model.nodes.iter().map(|n| n.id().to_string()).collect();
		assert_eq!(ids, again);
	}

	#[test]
	fn filter_change_reheats_and_keeps_positions() {
		let mut state = sample_state();
		for _ in 0..600 {
			state.tick(1.0 / 60.0);
		}
		assert!(!state.simulation.is_hot());
		let b = state.model.index_of("b").unwrap();
		let before = (state.model.nodes[b].x, state.model.nodes[b].y);

		state.set_filter(GraphFilter {
			min_level: 40.0,
			..Default::default()
		});
		assert!(state.simulation.is_hot());
		let b = state.model.index_of("b").unwrap();
		assert_eq!((state.model.nodes[b].x, state.model.nodes[b].y), before);
	}

	#[test]
	fn empty_filter_result_ticks_without_panicking() {
		let mut state = sample_state();
		state.set_filter(search("no such skill"));
		assert!(state.model.is_empty());
		state.tick(1.0 / 60.0);
		assert!(state.node_at(400.0, 300.0, &ScaleConfig::default()).is_none());
	}

	#[test]
	fn resize_keeps_world_origin_centred() {
		let mut state = sample_state();
		state.resize(1000.0, 400.0);
		assert_eq!(state.transform.world_to_screen(0.0, 0.0), (500.0, 200.0));
	}

	#[test]
	fn stopped_simulation_holds_layout_until_restart() {
		let mut state = sample_state();
		state.simulation.stop();
		assert!(!state.simulation.is_running());
		let before: Vec<_> = state.model.nodes.iter().map(|n| (n.x, n.y)).collect();
		state.tick(1.0 / 60.0);
		let after: Vec<_> = state.model.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);

		state.simulation.restart();
		state.tick(1.0 / 60.0);
		let moved: Vec<_> = state.model.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_ne!(before, moved);
	}
}
