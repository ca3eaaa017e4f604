//! Level-derived node sizing and zoom-dependent scaling for graph visuals.
//!
//! Two kinds of size live here:
//!
//! - **Level encodings** ([`level_radius`], [`Tier`]): pure functions of a
//!   skill's level. The simulator uses the radius for collisions and the
//!   controller uses it for hit-testing, so it is a world-space value that
//!   never depends on zoom.
//! - **Zoom scaling** ([`ScaleConfig`], [`ScaledValues`]): line widths, label
//!   fonts and rings that should keep a sensible on-screen size as the view
//!   zooms.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the coordinate system of the simulation. Values in
//!   world-space scale proportionally with zoom.
//! - **Screen-space**: pixel coordinates on the canvas. Values in screen-space
//!   remain constant regardless of zoom level.

/// Level domain mapped onto the node radius range.
pub const LEVEL_DOMAIN: (f64, f64) = (0.0, 100.0);

/// World-space radius range for levels at the ends of [`LEVEL_DOMAIN`].
pub const RADIUS_RANGE: (f64, f64) = (8.0, 24.0);

/// Node radius for a skill level: linear over [`LEVEL_DOMAIN`] into
/// [`RADIUS_RANGE`]. Levels outside the domain are clamped.
pub fn level_radius(level: f64) -> f64 {
	let (lo, hi) = LEVEL_DOMAIN;
	let t = ((level - lo) / (hi - lo)).clamp(0.0, 1.0);
	RADIUS_RANGE.0 + (RADIUS_RANGE.1 - RADIUS_RANGE.0) * t
}

/// Proficiency band drawn as extra rings around a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
	Novice,
	Intermediate,
	Advanced,
	Expert,
}

impl Tier {
	/// Band for a level in `0..=100`.
	pub fn from_level(level: f64) -> Self {
		match level {
			l if l >= 90.0 => Tier::Expert,
			l if l >= 70.0 => Tier::Advanced,
			l if l >= 40.0 => Tier::Intermediate,
			_ => Tier::Novice,
		}
	}

	/// Number of outline rings drawn for this tier.
	pub fn rings(self) -> usize {
		match self {
			Tier::Novice => 0,
			Tier::Intermediate => 1,
			Tier::Advanced => 2,
			Tier::Expert => 3,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Tier::Novice => "Novice",
			Tier::Intermediate => "Intermediate",
			Tier::Advanced => "Advanced",
			Tier::Expert => "Expert",
		}
	}
}

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "World variant completes the API for users customizing ScaleConfig"
)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for a base value at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "Constant variant available for custom alpha behaviors"
)]
pub enum AlphaBehavior {
	/// Constant alpha regardless of zoom.
	Constant,
	/// Fully visible at `full_alpha_k`, fades to zero at `zero_alpha_k`.
	Fade {
		zero_alpha_k: f64,
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Alpha multiplier for zoom `k`.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Node sizing and emphasis.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Hit radius as a multiple of the node radius.
	pub hit_multiplier: f64,
	/// Size multiplier applied to the hovered node.
	pub hover_scale: f64,
	/// Size multiplier applied to the selected node. Composes with hover.
	pub selected_scale: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Labels of idle nodes are only drawn at or above this zoom.
	pub label_min_k: f64,
	/// Width of tier rings in screen pixels.
	pub tier_ring_width: f64,
}

/// Edge line and flow-particle sizing.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Base line width in screen pixels.
	pub line_width: f64,
	/// Dash pattern (dash, gap) in world units for `Related` edges.
	pub dash_pattern: (f64, f64),
	/// How dash visibility scales with zoom. Faded dashes become solid lines.
	pub dash_alpha_behavior: AlphaBehavior,
	/// Flow particle travel speed in edge lengths per second.
	pub flow_speed: f64,
	/// Flow particle radius in world units.
	pub flow_radius: f64,
	/// How the flow particle radius scales with zoom.
	pub flow_radius_behavior: ScaleBehavior,
}

/// Glow, pulse and selection ring sizing.
#[derive(Clone, Debug)]
pub struct GlowScaleConfig {
	/// Glow halo radius as a multiple of the node radius.
	pub halo_radius: f64,
	/// Stroke width for the selection ring in screen pixels.
	pub ring_width: f64,
	/// Ring offset from node edge in screen pixels.
	pub ring_offset: f64,
	/// Breathing speed of the halo in radians per second.
	pub pulse_speed: f64,
	/// Relative halo size change at the peak of a breath.
	pub pulse_amount: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
	pub glow: GlowScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				hit_multiplier: 1.2,
				hover_scale: 1.2,
				selected_scale: 1.45,
				label_size: 11.0,
				label_min_k: 0.9,
				tier_ring_width: 1.0,
			},
			edge: EdgeScaleConfig {
				line_width: 1.2,
				dash_pattern: (6.0, 4.0),
				dash_alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.4,
					full_alpha_k: 0.9,
				},
				flow_speed: 0.35,
				flow_radius: 2.0,
				flow_radius_behavior: ScaleBehavior::Clamped {
					min_screen: 1.5,
					max_screen: 4.0,
				},
			},
			glow: GlowScaleConfig {
				halo_radius: 2.2,
				ring_width: 2.0,
				ring_offset: 3.0,
				pulse_speed: 2.0,
				pulse_amount: 0.12,
			},
		}
	}
}

impl ScaleConfig {
	/// Emphasis multiplier for a node's drawn size. Hover and selection compose.
	pub fn emphasis(&self, hovered: bool, selected: bool) -> f64 {
		let mut scale = 1.0;
		if hovered {
			scale *= self.node.hover_scale;
		}
		if selected {
			scale *= self.node.selected_scale;
		}
		scale
	}

	/// Hit radius for a node of the given world-space radius.
	pub fn hit_radius(&self, radius: f64) -> f64 {
		radius * self.node.hit_multiplier
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Label font string (e.g., "11px sans-serif").
	pub label_font: String,
	/// Label font size in world-space.
	pub label_size: f64,
	/// Whether idle nodes show their labels at this zoom.
	pub show_idle_labels: bool,
	/// Edge line width in world-space.
	pub edge_line_width: f64,
	/// Dash pattern in world-space.
	pub dash_pattern: (f64, f64),
	/// Dash pattern visibility [0, 1]. At 0, edges are solid lines.
	pub dash_alpha: f64,
	/// Flow particle radius in world-space.
	pub flow_radius: f64,
	/// Selection ring width in world-space.
	pub ring_width: f64,
	/// Selection ring offset in world-space.
	pub ring_offset: f64,
	/// Tier ring width in world-space.
	pub tier_ring_width: f64,
}

impl ScaledValues {
	/// Compute scaled values from configuration and current zoom level.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_size = ScaleBehavior::Screen.apply(config.node.label_size, k);

		Self {
			k,
			label_font: format!("{label_size}px sans-serif"),
			label_size,
			show_idle_labels: k >= config.node.label_min_k,
			edge_line_width: ScaleBehavior::Screen.apply(config.edge.line_width, k),
			dash_pattern: config.edge.dash_pattern,
			dash_alpha: config.edge.dash_alpha_behavior.apply(k),
			flow_radius: config
				.edge
				.flow_radius_behavior
				.apply(config.edge.flow_radius, k),
			ring_width: ScaleBehavior::Screen.apply(config.glow.ring_width, k),
			ring_offset: ScaleBehavior::Screen.apply(config.glow.ring_offset, k),
			tier_ring_width: ScaleBehavior::Screen.apply(config.node.tier_ring_width, k),
		}
	}
}
