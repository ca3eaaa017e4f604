//! Force-directed layout with a decaying temperature (alpha).
//!
//! Each tick applies link, charge, centering and collision forces to node
//! velocities, then integrates positions and decays velocities. The
//! simulation never reports "done": alpha drifts toward its target and the
//! caller re-heats it when the graph or the interaction changes. Pinned nodes
//! are placed at their pin and keep zero velocity.

use serde::Deserialize;

use super::model::{Edge, Node};

/// Force and cooling parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Rest length shared by all links.
	pub link_distance: f64,
	/// Spring strength of links.
	pub link_strength: f64,
	/// Charge per node; negative values repel.
	pub charge_strength: f64,
	/// Distances below this are treated as this for charge (limits blow-ups).
	pub charge_min_distance: f64,
	/// Pairs farther apart than this do not interact.
	pub charge_max_distance: f64,
	/// Pull toward the centre, per unit of distance.
	pub center_strength: f64,
	/// Extra gap kept between node circles. Soft, unlike the radii.
	pub collision_padding: f64,
	/// Fraction of an overlap corrected per tick.
	pub collision_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Fraction of the distance to the alpha target covered per tick.
	pub alpha_decay: f64,
	/// Below this temperature the force step is skipped.
	pub alpha_min: f64,
	/// Alpha set by a re-heat.
	pub reheat_alpha: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			link_distance: 90.0,
			link_strength: 0.08,
			charge_strength: -9000.0,
			charge_min_distance: 20.0,
			charge_max_distance: 600.0,
			center_strength: 0.03,
			collision_padding: 4.0,
			collision_strength: 0.7,
			velocity_decay: 0.4,
			// 1 - 0.001^(1/300): cools to alpha_min in ~300 ticks
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			reheat_alpha: 0.6,
			drag_alpha_target: 0.3,
		}
	}
}

/// Physics solver. Owns no nodes; it works on the arena slice it is handed.
#[derive(Clone, Debug)]
pub struct Simulation {
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	center: (f64, f64),
	rng_state: u32,
}

impl Simulation {
	pub fn new(config: SimulationConfig) -> Self {
		Self {
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			center: (0.0, 0.0),
			rng_state: 12345,
		}
	}

	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Whether a tick would still move free nodes.
	pub fn is_hot(&self) -> bool {
		self.running && self.alpha >= self.config.alpha_min
	}

	/// Raise the temperature to at least the configured re-heat alpha.
	pub fn reheat(&mut self) {
		self.alpha = self.alpha.max(self.config.reheat_alpha);
		self.running = true;
	}

	/// Keep the simulation warm while a drag is in progress.
	pub fn begin_drag(&mut self) {
		self.alpha_target = self.config.drag_alpha_target;
		self.reheat();
	}

	/// Let the simulation cool down again after a drag.
	pub fn end_drag(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Halt ticking until [`Simulation::restart`] or a re-heat.
	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn restart(&mut self) {
		self.running = true;
	}

	/// World-space point the centering force pulls toward.
	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Advance the layout by one step.
	pub fn tick(&mut self, nodes: &mut [Node], edges: &[Edge]) {
		if !self.running || nodes.is_empty() {
			return;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		if nodes.len() == 1 {
			let node = &mut nodes[0];
			let (x, y) = node.pin.unwrap_or(self.center);
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
			return;
		}

		if self.alpha >= self.config.alpha_min {
			self.apply_links(nodes, edges);
			self.apply_charge(nodes);
			self.apply_center(nodes);
		}
		self.integrate(nodes);
		// runs cold too, so residual drift cannot leave circles overlapping
		self.apply_collisions(nodes);
	}

	fn apply_links(&mut self, nodes: &mut [Node], edges: &[Edge]) {
		let strength = self.config.link_strength * self.alpha;
		for edge in edges {
			let (s, t) = (edge.source, edge.target);
			if s == t || s >= nodes.len() || t >= nodes.len() {
				continue;
			}

			let mut dx = (nodes[t].x + nodes[t].vx) - (nodes[s].x + nodes[s].vx);
			let mut dy = (nodes[t].y + nodes[t].vy) - (nodes[s].y + nodes[s].vy);
			if dx == 0.0 && dy == 0.0 {
				dx = self.jiggle();
				dy = self.jiggle();
			}

			let dist = (dx * dx + dy * dy).sqrt();
			let force = (dist - self.config.link_distance) / dist * strength * 0.5;
			let (fx, fy) = (dx * force, dy * force);

			nodes[t].vx -= fx;
			nodes[t].vy -= fy;
			nodes[s].vx += fx;
			nodes[s].vy += fy;
		}
	}

	/// Pairwise repulsion with magnitude `charge / distance^2`.
	fn apply_charge(&mut self, nodes: &mut [Node]) {
		let strength = self.config.charge_strength * self.alpha;
		let min_dist_sq = self.config.charge_min_distance.powi(2);
		let max_dist_sq = self.config.charge_max_distance.powi(2);
		let n = nodes.len();

		for i in 0..n {
			for j in (i + 1)..n {
				let mut dx = nodes[j].x - nodes[i].x;
				let mut dy = nodes[j].y - nodes[i].y;
				if dx == 0.0 && dy == 0.0 {
					dx = self.jiggle();
					dy = self.jiggle();
				}

				let dist_sq = dx * dx + dy * dy;
				if dist_sq > max_dist_sq {
					continue;
				}

				let clamped_sq = dist_sq.max(min_dist_sq);
				let dist = dist_sq.sqrt();
				let force = strength / clamped_sq;
				let (fx, fy) = (dx / dist * force, dy / dist * force);

				// negative charge pushes i away from j and j away from i
				nodes[i].vx += fx;
				nodes[i].vy += fy;
				nodes[j].vx -= fx;
				nodes[j].vy -= fy;
			}
		}
	}

	fn apply_center(&self, nodes: &mut [Node]) {
		let strength = self.config.center_strength * self.alpha;
		let (cx, cy) = self.center;
		for node in nodes.iter_mut() {
			node.vx += (cx - node.x) * strength;
			node.vy += (cy - node.y) * strength;
		}
	}

	fn integrate(&self, nodes: &mut [Node]) {
		let keep = 1.0 - self.config.velocity_decay;
		for node in nodes.iter_mut() {
			if let Some((px, py)) = node.pin {
				node.x = px;
				node.y = py;
				node.vx = 0.0;
				node.vy = 0.0;
			} else {
				node.vx *= keep;
				node.vy *= keep;
				node.x += node.vx;
				node.y += node.vy;
			}
		}
	}

	/// Positional correction toward `r_a + r_b + padding` between centres.
	/// Each pass closes `collision_strength` of an overlap, so the padding is
	/// soft: dense clusters may eat into it, but never into the circles.
	/// A pinned node does not move; its partner takes the whole correction.
	fn apply_collisions(&mut self, nodes: &mut [Node]) {
		let strength = self.config.collision_strength;
		let padding = self.config.collision_padding;
		let n = nodes.len();

		for i in 0..n {
			for j in (i + 1)..n {
				let min_dist = nodes[i].radius + nodes[j].radius + padding;
				let mut dx = nodes[j].x - nodes[i].x;
				let mut dy = nodes[j].y - nodes[i].y;
				if dx == 0.0 && dy == 0.0 {
					dx = self.jiggle();
					dy = self.jiggle();
				}

				let dist_sq = dx * dx + dy * dy;
				if dist_sq >= min_dist * min_dist {
					continue;
				}

				let dist = dist_sq.sqrt();
				let push = (min_dist - dist) / dist * strength;
				let (share_i, share_j) = match (nodes[i].pin.is_some(), nodes[j].pin.is_some()) {
					(true, true) => continue,
					(true, false) => (0.0, 1.0),
					(false, true) => (1.0, 0.0),
					(false, false) => (0.5, 0.5),
				};

				nodes[i].x -= dx * push * share_i;
				nodes[i].y -= dy * push * share_i;
				nodes[j].x += dx * push * share_j;
				nodes[j].y += dy * push * share_j;
			}
		}
	}

	/// Tiny deterministic offset for coincident points.
	fn jiggle(&mut self) -> f64 {
		self.rng_state = self.rng_state.wrapping_mul(1_103_515_245).wrapping_add(12345);
		((self.rng_state & 0xFFFF) as f64 / 65536.0 - 0.5) * 1e-3
	}
}

impl Default for Simulation {
	fn default() -> Self {
		Self::new(SimulationConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::{LinkRules, build};
	use crate::components::force_graph::types::Entity;

	fn model(entities: &[Entity]) -> crate::components::force_graph::model::GraphModel {
		build(entities, &LinkRules::default())
	}

	#[test]
	fn zero_nodes_is_a_no_op() {
		let mut sim = Simulation::default();
		sim.tick(&mut [], &[]);
		assert!(sim.alpha() <= 1.0);
	}

	#[test]
	fn single_node_is_centred() {
		let mut m = model(&[Entity::new("solo", "x", 50.0)]);
		m.nodes[0].x = 250.0;
		m.nodes[0].y = -80.0;
		let mut sim = Simulation::default();
		sim.set_center(10.0, 20.0);
		sim.tick(&mut m.nodes, &m.edges);
		assert_eq!((m.nodes[0].x, m.nodes[0].y), (10.0, 20.0));
	}

	#[test]
	fn alpha_cools_below_minimum_and_reheats() {
		let mut m = model(&[Entity::new("a", "x", 10.0), Entity::new("b", "x", 20.0)]);
		let mut sim = Simulation::default();
		for _ in 0..400 {
			sim.tick(&mut m.nodes, &m.edges);
		}
		assert!(!sim.is_hot());
		assert!(sim.alpha() > 0.0);

		sim.reheat();
		assert!(sim.is_hot());
		assert_eq!(sim.alpha(), sim.config().reheat_alpha);
	}

	/// Smallest centre distance over `r_a + r_b` across all pairs.
	fn tightest_pair(nodes: &[Node]) -> f64 {
		let mut worst = f64::INFINITY;
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let (a, b) = (&nodes[i], &nodes[j]);
				worst = worst.min(a.distance_sq(b.x, b.y).sqrt() / (a.radius + b.radius));
			}
		}
		worst
	}

	#[test]
	fn layout_separates_nodes_and_stays_finite() {
		let entities: Vec<Entity> = (0..12)
			.map(|i| Entity::new(format!("n{i}"), if i % 2 == 0 { "a" } else { "b" }, i as f64 * 8.0))
			.collect();
		let mut m = model(&entities);
		let mut sim = Simulation::default();
		for _ in 0..300 {
			sim.tick(&mut m.nodes, &m.edges);
		}

		for node in &m.nodes {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
		assert!(tightest_pair(&m.nodes) >= 0.999, "{}", tightest_pair(&m.nodes));
	}

	#[test]
	fn dense_cluster_never_overlaps_circles() {
		// one category links every pair; max level gives the largest radii
		let entities: Vec<Entity> = (0..30)
			.map(|i| Entity::new(format!("n{i}"), "lang", 100.0))
			.collect();
		let mut m = model(&entities);
		assert_eq!(m.edges.len(), 30 * 29 / 2);
		let mut sim = Simulation::default();
		for _ in 0..1000 {
			sim.tick(&mut m.nodes, &m.edges);
		}
		assert!(tightest_pair(&m.nodes) >= 0.999, "{}", tightest_pair(&m.nodes));
	}

	#[test]
	fn pinned_node_follows_pin_with_zero_velocity() {
		let mut m = model(&[Entity::new("a", "x", 10.0), Entity::new("b", "x", 20.0)]);
		m.nodes[0].pin = Some((300.0, 300.0));
		m.nodes[0].vx = 5.0;
		let mut sim = Simulation::default();
		for _ in 0..5 {
			sim.tick(&mut m.nodes, &m.edges);
			assert_eq!((m.nodes[0].x, m.nodes[0].y), (300.0, 300.0));
			assert_eq!((m.nodes[0].vx, m.nodes[0].vy), (0.0, 0.0));
		}
	}

	#[test]
	fn stopped_simulation_does_not_move_nodes() {
		let mut m = model(&[Entity::new("a", "x", 10.0), Entity::new("b", "x", 20.0)]);
		let before: Vec<_> = m.nodes.iter().map(|n| (n.x, n.y)).collect();
		let mut sim = Simulation::default();
		sim.stop();
		sim.tick(&mut m.nodes, &m.edges);
		let after: Vec<_> = m.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);
		assert!(!sim.is_hot());
	}

	#[test]
	fn drag_keeps_alpha_warm() {
		let mut m = model(&[Entity::new("a", "x", 10.0), Entity::new("b", "x", 20.0)]);
		let mut sim = Simulation::default();
		sim.begin_drag();
		for _ in 0..1000 {
			sim.tick(&mut m.nodes, &m.edges);
		}
		assert!(sim.alpha() > 0.25);
		sim.end_drag();
		for _ in 0..1000 {
			sim.tick(&mut m.nodes, &m.edges);
		}
		assert!(!sim.is_hot());
	}
}
