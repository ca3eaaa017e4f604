//! Pointer interaction as an explicit state machine.
//!
//! `Idle -> {Hovering, DraggingNode, Panning} -> Idle`. Each pointer event
//! moves the machine to its next state and returns the outward effects
//! (hover/selection changes, cursor). Nothing here touches the DOM, so every
//! transition can be driven directly from tests.

use super::model::NodeIdx;
use super::scale::ScaleConfig;
use super::state::ForceGraphState;
use super::view::ViewTransform;

/// Pointer travel (screen pixels) below which a press and release still
/// count as a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

/// Pointer input in canvas-relative screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
	Down { x: f64, y: f64 },
	Move { x: f64, y: f64 },
	Up { x: f64, y: f64 },
	Leave,
	Wheel { delta_y: f64 },
}

/// Current interaction mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
	#[default]
	Idle,
	Hovering(NodeIdx),
	DraggingNode {
		node: NodeIdx,
		/// Screen position of the press.
		origin: (f64, f64),
		/// Whether the pointer left the click tolerance.
		moved: bool,
	},
	Panning {
		/// Screen position of the previous move.
		last: (f64, f64),
	},
}

/// Mouse cursor to show over the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
	Grab,
	Pointer,
	Grabbing,
}

impl Cursor {
	pub fn css(self) -> &'static str {
		match self {
			Cursor::Grab => "grab",
			Cursor::Pointer => "pointer",
			Cursor::Grabbing => "grabbing",
		}
	}
}

/// Outward consequences of a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
	HoverChanged(Option<NodeIdx>),
	SelectionChanged(Option<NodeIdx>),
	Cursor(Cursor),
}

impl ForceGraphState {
	/// Feed one pointer event through the state machine.
	pub fn handle_pointer(&mut self, event: PointerEvent, config: &ScaleConfig) -> Vec<Effect> {
		let current = std::mem::take(&mut self.interaction);
		let (next, effects) = self.transition(current, event, config);
		self.interaction = next;
		effects
	}

	fn transition(
		&mut self,
		current: InteractionState,
		event: PointerEvent,
		config: &ScaleConfig,
	) -> (InteractionState, Vec<Effect>) {
		use InteractionState::*;

		// `self.interaction` is vacated while a transition runs.
		let previous = match current {
			Hovering(idx) => Some(idx),
			_ => None,
		};

		match (current, event) {
			(state, PointerEvent::Wheel { delta_y }) => {
				self.zoom_by(ViewTransform::wheel_factor(delta_y));
				(state, Vec::new())
			}

			(Idle | Hovering(_), PointerEvent::Down { x, y }) => {
				let mut effects = Vec::new();
				if previous.is_some() {
					effects.push(Effect::HoverChanged(None));
				}
				effects.push(Effect::Cursor(Cursor::Grabbing));

				match self.node_at(x, y, config) {
					Some(node) => {
						if let Some(n) = self.model.node_mut(node) {
							n.pin = Some((n.x, n.y));
						}
						self.simulation.begin_drag();
						self.highlight.set_focus(Some(node), &self.model.edges);
						let state = DraggingNode {
							node,
							origin: (x, y),
							moved: false,
						};
						(state, effects)
					}
					None => {
						self.highlight.set_focus(None, &self.model.edges);
						(Panning { last: (x, y) }, effects)
					}
				}
			}

			(Idle | Hovering(_), PointerEvent::Move { x, y }) => self.hover_at(previous, x, y, config),

			(
				DraggingNode {
					node,
					origin,
					moved,
				},
				PointerEvent::Move { x, y },
			) => {
				let moved = moved
					|| (x - origin.0).hypot(y - origin.1) > CLICK_TOLERANCE;
				let (wx, wy) = self.transform.screen_to_world(x, y);
				if let Some(n) = self.model.node_mut(node) {
					n.pin = Some((wx, wy));
				}
				let state = DraggingNode {
					node,
					origin,
					moved,
				};
				(state, Vec::new())
			}

			(DraggingNode { node, moved, .. }, PointerEvent::Up { x, y }) => {
				self.release(node);
				let mut effects = Vec::new();
				if !moved {
					effects.push(self.toggle_selection(node));
				}
				let (state, hover_effects) = self.hover_at(None, x, y, config);
				effects.extend(hover_effects);
				(state, effects)
			}

			(DraggingNode { node, .. }, PointerEvent::Leave) => {
				self.release(node);
				self.highlight.set_focus(None, &self.model.edges);
				(Idle, vec![Effect::Cursor(Cursor::Grab)])
			}

			(Panning { last }, PointerEvent::Move { x, y }) => {
				self.transform.pan_by(x - last.0, y - last.1);
				(Panning { last: (x, y) }, Vec::new())
			}

			(Panning { .. }, PointerEvent::Up { x, y }) => self.hover_at(None, x, y, config),

			(Panning { .. }, PointerEvent::Leave) => (Idle, vec![Effect::Cursor(Cursor::Grab)]),

			(Hovering(_), PointerEvent::Leave) => {
				self.highlight.set_focus(None, &self.model.edges);
				(
					Idle,
					vec![
						Effect::HoverChanged(None),
						Effect::Cursor(Cursor::Grab),
					],
				)
			}

			// presses during a gesture, stray releases, leaving while idle
			(state, _) => (state, Vec::new()),
		}
	}

	/// Hover detection at a screen point, reporting a change from `previous`.
	fn hover_at(
		&mut self,
		previous: Option<NodeIdx>,
		x: f64,
		y: f64,
		config: &ScaleConfig,
	) -> (InteractionState, Vec<Effect>) {
		let hovered = self.node_at(x, y, config);
		self.highlight.set_focus(hovered, &self.model.edges);

		let mut effects = Vec::new();
		if hovered != previous {
			effects.push(Effect::HoverChanged(hovered));
		}
		let cursor = if hovered.is_some() {
			Cursor::Pointer
		} else {
			Cursor::Grab
		};
		effects.push(Effect::Cursor(cursor));

		let state = match hovered {
			Some(idx) => InteractionState::Hovering(idx),
			None => InteractionState::Idle,
		};
		(state, effects)
	}

	/// End a drag: drop the pin and let the simulation cool again.
	fn release(&mut self, node: NodeIdx) {
		if let Some(n) = self.model.node_mut(node) {
			n.pin = None;
		}
		self.simulation.end_drag();
	}

	/// Click on a node: select it, or deselect it if already selected.
	fn toggle_selection(&mut self, node: NodeIdx) -> Effect {
		self.selected = if self.selected == Some(node) {
			None
		} else {
			Some(node)
		};
		Effect::SelectionChanged(self.selected)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::{GraphFilter, LinkRules};
	use crate::components::force_graph::simulation::SimulationConfig;
	use crate::components::force_graph::types::Entity;

	/// Three nodes at fixed world positions, canvas 800x600 (origin at 400,300).
	fn state() -> ForceGraphState {
		let entities = vec![
			Entity::new("a", "X", 50.0),
			Entity::new("b", "X", 80.0),
			Entity::new("c", "Y", 20.0),
		];
		let mut state = ForceGraphState::new(
			entities,
			LinkRules::default(),
			SimulationConfig::default(),
			800.0,
			600.0,
		);
		for (id, (x, y)) in [("a", (0.0, 0.0)), ("b", (150.0, 0.0)), ("c", (-150.0, 80.0))] {
			let idx = state.model.index_of(id).unwrap();
			state.model.nodes[idx].x = x;
			state.model.nodes[idx].y = y;
		}
		state
	}

	fn idx(state: &ForceGraphState, id: &str) -> NodeIdx {
		state.model.index_of(id).unwrap()
	}

	fn click(state: &mut ForceGraphState, x: f64, y: f64) -> Vec<Effect> {
		let config = ScaleConfig::default();
		let mut effects = state.handle_pointer(PointerEvent::Down { x, y }, &config);
		effects.extend(state.handle_pointer(PointerEvent::Up { x, y }, &config));
		effects
	}

	#[test]
	fn hit_test_respects_zoom() {
		let config = ScaleConfig::default();
		for k in [0.5, 1.0, 2.0] {
			let mut state = state();
			state.transform.k = k;
			let a = idx(&state, "a");
			let hit = config.hit_radius(state.model.nodes[a].radius);

			let (sx, sy) = state.transform.world_to_screen(hit * 0.99, 0.0);
			assert_eq!(state.node_at(sx, sy, &config), Some(a), "inside at k={k}");

			let (sx, sy) = state.transform.world_to_screen(hit * 1.01, 0.0);
			assert_eq!(state.node_at(sx, sy, &config), None, "outside at k={k}");
		}
	}

	#[test]
	fn overlapping_nodes_resolve_to_topmost() {
		let config = ScaleConfig::default();
		let mut state = state();
		let (a, b) = (idx(&state, "a"), idx(&state, "b"));
		state.model.nodes[b].x = 2.0;
		let (sx, sy) = state.transform.world_to_screen(1.0, 0.0);
		assert_eq!(state.node_at(sx, sy, &config), Some(a.max(b)));
	}

	#[test]
	fn hover_tracks_single_node() {
		let config = ScaleConfig::default();
		let mut state = state();
		let a = idx(&state, "a");

		let effects = state.handle_pointer(PointerEvent::Move { x: 400.0, y: 300.0 }, &config);
		assert_eq!(state.interaction, InteractionState::Hovering(a));
		assert_eq!(
			effects,
			vec![
				Effect::HoverChanged(Some(a)),
				Effect::Cursor(Cursor::Pointer)
			]
		);

		// moving within the same node reports no hover change
		let effects = state.handle_pointer(PointerEvent::Move { x: 402.0, y: 300.0 }, &config);
		assert!(!effects.contains(&Effect::HoverChanged(Some(a))));

		let effects = state.handle_pointer(PointerEvent::Move { x: 10.0, y: 10.0 }, &config);
		assert_eq!(state.interaction, InteractionState::Idle);
		assert!(effects.contains(&Effect::HoverChanged(None)));
	}

	#[test]
	fn press_while_hovering_ends_hover() {
		let config = ScaleConfig::default();
		let mut state = state();
		let a = idx(&state, "a");

		state.handle_pointer(PointerEvent::Move { x: 400.0, y: 300.0 }, &config);
		let effects = state.handle_pointer(PointerEvent::Move { x: 401.0, y: 300.0 }, &config);
		assert_eq!(effects, vec![Effect::Cursor(Cursor::Pointer)]);

		let effects = state.handle_pointer(PointerEvent::Down { x: 401.0, y: 300.0 }, &config);
		assert_eq!(
			effects,
			vec![
				Effect::HoverChanged(None),
				Effect::Cursor(Cursor::Grabbing)
			]
		);
		assert_eq!(state.dragged(), Some(a));
		assert_eq!(state.hovered(), None);
	}

	#[test]
	fn press_on_empty_space_clears_hover_highlight() {
		let config = ScaleConfig::default();
		let mut state = state();

		let a = idx(&state, "a");

		state.handle_pointer(PointerEvent::Move { x: 400.0, y: 300.0 }, &config);
		assert_eq!(state.highlight.focus(), Some(a));
		// the hovered node drifts away before the press
		state.model.nodes[a].x = 300.0;
		let effects = state.handle_pointer(PointerEvent::Down { x: 400.0, y: 300.0 }, &config);
		assert_eq!(
			effects,
			vec![
				Effect::HoverChanged(None),
				Effect::Cursor(Cursor::Grabbing)
			]
		);
		assert!(matches!(state.interaction, InteractionState::Panning { .. }));
		assert_eq!(state.highlight.focus(), None);
	}

	#[test]
	fn click_toggles_and_replaces_selection() {
		let mut state = state();
		let (a, b) = (idx(&state, "a"), idx(&state, "b"));

		let effects = click(&mut state, 400.0, 300.0);
		assert!(effects.contains(&Effect::SelectionChanged(Some(a))));
		assert_eq!(state.selected, Some(a));

		click(&mut state, 550.0, 300.0);
		assert_eq!(state.selected, Some(b));

		let effects = click(&mut state, 550.0, 300.0);
		assert!(effects.contains(&Effect::SelectionChanged(None)));
		assert_eq!(state.selected, None);
	}

	#[test]
	fn clicking_empty_space_keeps_selection() {
		let mut state = state();
		let a = idx(&state, "a");
		click(&mut state, 400.0, 300.0);
		let effects = click(&mut state, 20.0, 20.0);
		assert_eq!(state.selected, Some(a));
		assert!(!effects.iter().any(|e| matches!(e, Effect::SelectionChanged(_))));
	}

	#[test]
	fn drag_pins_then_release_returns_node_to_simulation() {
		let config = ScaleConfig::default();
		let mut state = state();
		let a = idx(&state, "a");

		state.handle_pointer(PointerEvent::Down { x: 400.0, y: 300.0 }, &config);
		assert_eq!(state.dragged(), Some(a));
		assert!(state.simulation.is_hot());

		state.handle_pointer(PointerEvent::Move { x: 460.0, y: 340.0 }, &config);
		assert_eq!(state.model.nodes[a].pin, Some((60.0, 40.0)));
		state.tick(1.0 / 60.0);
		assert_eq!((state.model.nodes[a].x, state.model.nodes[a].y), (60.0, 40.0));

		let effects = state.handle_pointer(PointerEvent::Up { x: 460.0, y: 340.0 }, &config);
		assert!(!effects.iter().any(|e| matches!(e, Effect::SelectionChanged(_))));
		assert_eq!(state.model.nodes[a].pin, None);
		assert_eq!(state.selected, None);

		state.tick(1.0 / 60.0);
		assert_ne!((state.model.nodes[a].x, state.model.nodes[a].y), (60.0, 40.0));
	}

	#[test]
	fn panning_moves_view_by_screen_delta() {
		let config = ScaleConfig::default();
		let mut state = state();
		state.transform.k = 2.0;

		state.handle_pointer(PointerEvent::Down { x: 20.0, y: 20.0 }, &config);
		assert!(matches!(state.interaction, InteractionState::Panning { .. }));
		state.handle_pointer(PointerEvent::Move { x: 50.0, y: 10.0 }, &config);
		state.handle_pointer(PointerEvent::Move { x: 70.0, y: 15.0 }, &config);
		state.handle_pointer(PointerEvent::Up { x: 70.0, y: 15.0 }, &config);

		assert_eq!((state.transform.x, state.transform.y), (450.0, 295.0));
		assert_eq!(state.interaction, InteractionState::Idle);
	}

	#[test]
	fn wheel_zoom_is_multiplicative_and_clamped() {
		let config = ScaleConfig::default();
		let mut state = state();
		state.handle_pointer(PointerEvent::Wheel { delta_y: -100.0 }, &config);
		assert!((state.transform.k - 1.1).abs() < 1e-12);
		for _ in 0..500 {
			state.handle_pointer(PointerEvent::Wheel { delta_y: 100.0 }, &config);
		}
		assert_eq!(state.transform.k, 0.1);
		assert_eq!((state.transform.x, state.transform.y), (400.0, 300.0));
	}

	#[test]
	fn leaving_mid_drag_releases_pin() {
		let config = ScaleConfig::default();
		let mut state = state();
		let a = idx(&state, "a");
		state.handle_pointer(PointerEvent::Down { x: 400.0, y: 300.0 }, &config);
		state.handle_pointer(PointerEvent::Move { x: 420.0, y: 300.0 }, &config);
		state.handle_pointer(PointerEvent::Leave, &config);
		assert_eq!(state.interaction, InteractionState::Idle);
		assert_eq!(state.model.nodes[a].pin, None);
	}

	#[test]
	fn filtering_out_dragged_node_ends_drag() {
		let config = ScaleConfig::default();
		let mut state = state();
		state.handle_pointer(PointerEvent::Down { x: 400.0, y: 300.0 }, &config);
		state.handle_pointer(PointerEvent::Move { x: 430.0, y: 300.0 }, &config);

		let effects = state.set_filter(GraphFilter {
			min_level: 60.0,
			..Default::default()
		});
		assert!(effects.contains(&Effect::Cursor(Cursor::Grab)));
		assert_eq!(state.interaction, InteractionState::Idle);
		assert!(state.model.nodes.iter().all(|n| n.pin.is_none()));

		// the release that follows is a stray event
		let effects = state.handle_pointer(PointerEvent::Up { x: 430.0, y: 300.0 }, &config);
		assert!(effects.is_empty());
		state.tick(1.0 / 60.0);
	}

	#[test]
	fn dragged_node_surviving_filter_keeps_pin() {
		let config = ScaleConfig::default();
		let mut state = state();
		state.handle_pointer(PointerEvent::Down { x: 550.0, y: 300.0 }, &config);
		state.handle_pointer(PointerEvent::Move { x: 560.0, y: 310.0 }, &config);

		state.set_filter(GraphFilter {
			min_level: 60.0,
			..Default::default()
		});
		let b = idx(&state, "b");
		assert_eq!(state.dragged(), Some(b));
		assert_eq!(state.model.nodes[b].pin, Some((160.0, 10.0)));
	}

	#[test]
	fn leaving_restores_grab_cursor() {
		let config = ScaleConfig::default();
		let mut state = state();
		state.handle_pointer(PointerEvent::Move { x: 400.0, y: 300.0 }, &config);
		let effects = state.handle_pointer(PointerEvent::Leave, &config);
		assert_eq!(effects.last(), Some(&Effect::Cursor(Cursor::Grab)));
		assert_eq!(Cursor::Grab.css(), "grab");
		assert_eq!(Cursor::Grabbing.css(), "grabbing");
	}
}
