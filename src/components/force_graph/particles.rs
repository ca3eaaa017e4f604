//! Particle effects: ambient background dust and the flow dots that travel
//! along edges.

use std::f64::consts::TAU;

use super::theme::ParticleStyle;

/// Position in `[0, 1)` of an edge's flow particle at `elapsed` seconds.
pub fn flow_position(elapsed: f64, speed: f64, phase: f64) -> f64 {
	(elapsed * speed + phase).rem_euclid(1.0)
}

/// Point at parameter `t` on the straight segment from `a` to `b`.
pub fn point_on_line(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
	(a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Point at parameter `t` on the quadratic Bezier `a`, `control`, `b`.
pub fn point_on_quadratic(a: (f64, f64), control: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
	let u = 1.0 - t;
	(
		u * u * a.0 + 2.0 * u * t * control.0 + t * t * b.0,
		u * u * a.1 + 2.0 * u * t * control.1 + t * t * b.1,
	)
}

/// Particles may drift this far past the canvas edge before wrapping.
const MARGIN: f64 = 10.0;

/// Twinkle frequency in radians per second.
const TWINKLE_RATE: f64 = 1.5;

/// Small LCG so the particle field is identical on every load.
struct Lcg(u32);

impl Lcg {
	/// Next value in `[0, 1)`.
	fn next(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		(self.0 >> 8) as f64 / (1u32 << 24) as f64
	}
}

fn wrap(v: f64, extent: f64) -> f64 {
	(v + MARGIN).rem_euclid(extent + 2.0 * MARGIN) - MARGIN
}

/// A single drifting dust mote.
#[derive(Clone, Debug)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub size: f64,
	/// Peak opacity.
	pub alpha: f64,
	phase: f64,
}

impl Particle {
	/// Opacity at `time` seconds, oscillating between 60% and 100% of peak.
	pub fn alpha_at(&self, time: f64) -> f64 {
		let wave = 0.5 + 0.5 * (time * TWINKLE_RATE + self.phase).sin();
		self.alpha * (0.6 + 0.4 * wave)
	}
}

/// Screen-space background particles. Drawn behind the graph and never
/// affected by pan or zoom.
pub struct ParticleSystem {
	pub particles: Vec<Particle>,
	width: f64,
	height: f64,
}

impl ParticleSystem {
	pub fn new(style: &ParticleStyle, width: f64, height: f64) -> Self {
		let mut rng = Lcg(0x5eed);
		let particles = (0..style.count)
			.map(|_| {
				let heading = rng.next() * TAU;
				let drift = style.speed * (0.5 + 0.5 * rng.next());
				Particle {
					x: rng.next() * width,
					y: rng.next() * height,
					vx: heading.cos() * drift,
					vy: heading.sin() * drift,
					size: style.size_min + (style.size_max - style.size_min) * rng.next(),
					alpha: style.opacity * (0.3 + 0.7 * rng.next()),
					phase: rng.next() * TAU,
				}
			})
			.collect();

		Self {
			particles,
			width,
			height,
		}
	}

	/// Drift by `dt` seconds; velocities are in pixels per 60 Hz frame.
	pub fn update(&mut self, dt: f64) {
		let frames = dt * 60.0;
		for p in &mut self.particles {
			p.x = wrap(p.x + p.vx * frames, self.width);
			p.y = wrap(p.y + p.vy * frames, self.height);
		}
	}

	/// Stretch the field to new canvas bounds.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.width > 0.0 && self.height > 0.0 {
			let (sx, sy) = (width / self.width, height / self.height);
			for p in &mut self.particles {
				p.x *= sx;
				p.y *= sy;
			}
		}
		self.width = width;
		self.height = height;
	}
}
