//! Smoothed neighbor highlighting for the focused node.
//!
//! Each node has its own intensity value (0.0 to 1.0) that eases toward 1.0
//! while it is in the active set (the focused node and its neighbors) and
//! back toward 0.0 afterwards. Exponential smoothing gives a natural
//! ease-out, and a short hold time keeps the highlight from flashing when
//! the pointer skims the edge of a node.

use std::collections::{HashMap, HashSet};

use super::model::{Edge, NodeIdx};

/// Minimum time (seconds) a highlight must be held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;

/// Intensities below this are dropped.
const VISIBLE_EPSILON: f64 = 0.005;

#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	focus: Option<NodeIdx>,
	target_set: HashSet<NodeIdx>,
	node_intensity: HashMap<NodeIdx, f64>,
	hold_timer: HashMap<NodeIdx, f64>,
	cached_max: f64,
}

impl HighlightState {
	/// Focus a node (or nothing) and recompute the target set.
	pub fn set_focus(&mut self, node: Option<NodeIdx>, edges: &[Edge]) {
		if self.focus == node {
			return;
		}

		self.focus = node;
		self.target_set.clear();

		if let Some(idx) = node {
			self.target_set.insert(idx);
			for edge in edges.iter().filter(|e| e.touches(idx)) {
				self.target_set.insert(edge.source);
				self.target_set.insert(edge.target);
			}
			for &idx in &self.target_set {
				self.hold_timer.insert(idx, MIN_HOLD_TIME);
			}
		}
	}

	pub fn focus(&self) -> Option<NodeIdx> {
		self.focus
	}

	/// Forget everything. Node handles are invalid after a rebuild.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	/// Ease all intensities toward their targets.
	///
	/// `value += (target - value) * (1 - e^(-speed * dt))`
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0; // ~150ms to 95%
		const FADE_OUT_SPEED: f64 = 4.0; // ~250ms to 95%

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target_set {
			let intensity = self.node_intensity.entry(idx).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}

		let target_set = &self.target_set;
		self.hold_timer.retain(|idx, timer| {
			if target_set.contains(idx) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		let hold_timer = &self.hold_timer;
		let mut new_max: f64 = 0.0;
		self.node_intensity.retain(|idx, intensity| {
			if !target_set.contains(idx) && hold_timer.get(idx).copied().unwrap_or(0.0) <= 0.0 {
				*intensity *= fade_out_decay;
			}
			new_max = new_max.max(*intensity);
			target_set.contains(idx) || *intensity > VISIBLE_EPSILON
		});

		self.cached_max = new_max;
	}

	pub fn node_intensity(&self, idx: NodeIdx) -> f64 {
		self.node_intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoint intensities; smoother than `min`.
	pub fn edge_intensity(&self, a: NodeIdx, b: NodeIdx) -> f64 {
		(self.node_intensity(a) * self.node_intensity(b)).sqrt()
	}

	/// Highest intensity of any node, used to dim everything else.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}
