//! Visual theming for the skill graph.
//!
//! The color mode only picks background gradients, edge tints and particle
//! colors. Node colors come from the category palette and are identical in
//! both modes.

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * (1.0 - t) + other.r as f64 * t) as u8,
			g: (self.g as f64 * (1.0 - t) + other.g as f64 * t) as u8,
			b: (self.b as f64 * (1.0 - t) + other.b as f64 * t) as u8,
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Light or dark page appearance, supplied by the surrounding UI shell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
	#[default]
	Dark,
	Light,
}

impl ColorMode {
	pub fn toggled(self) -> Self {
		match self {
			ColorMode::Dark => ColorMode::Light,
			ColorMode::Light => ColorMode::Dark,
		}
	}
}

/// Fixed colors for the known skill categories, with a hashed fallback.
#[derive(Clone, Debug)]
pub struct CategoryPalette {
	known: Vec<(&'static str, Color)>,
	fallback: Vec<Color>,
}

impl Default for CategoryPalette {
	fn default() -> Self {
		Self {
			known: vec![
				("language", Color::rgb(222, 165, 90)),
				("frontend", Color::rgb(94, 160, 222)),
				("backend", Color::rgb(120, 190, 130)),
				("database", Color::rgb(190, 120, 200)),
				("devops", Color::rgb(230, 120, 100)),
				("cloud", Color::rgb(90, 190, 200)),
				("tools", Color::rgb(170, 170, 185)),
				("design", Color::rgb(235, 135, 175)),
			],
			fallback: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(130, 120, 150), // Wisteria
				Color::rgb(180, 136, 100), // Tan
				Color::rgb(125, 145, 140), // Sage
				Color::rgb(175, 125, 105), // Clay
			],
		}
	}
}

impl CategoryPalette {
	/// Color for a category. Depends on the name only, so it survives filter
	/// rebuilds and never changes between frames.
	pub fn color(&self, category: &str) -> Color {
		let key = category.trim();
		if let Some((_, color)) = self
			.known
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(key))
		{
			return *color;
		}
		let hash = key
			.bytes()
			.map(|b| b.to_ascii_lowercase())
			.fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
		self.fallback[hash as usize % self.fallback.len()]
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Outer background color
	pub color: Color,
	/// Inner color of the radial gradient
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
	/// Color of the "no skills match" placeholder text
	pub placeholder: Color,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Tint for `Hierarchical` edges
	pub hierarchical: Color,
	/// Tint for `Sibling` edges
	pub sibling: Color,
	/// Tint for `Related` edges
	pub related: Color,
	/// Traveling flow particle color
	pub flow: Color,
	/// Draw edges as quadratic curves instead of straight lines
	pub curved: bool,
	/// Curvature amount for curved edges
	pub curve_tension: f64,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Shade node bodies with a radial gradient
	pub use_gradient: bool,
	/// Halo opacity (0.0 disables the halo)
	pub glow_intensity: f64,
	/// Tier ring and selection ring color
	pub ring_color: Color,
	/// Label text color
	pub label_color: Color,
	/// Initial glyph color drawn when an icon is unavailable
	pub glyph_color: Color,
}

/// Ambient background particle configuration.
#[derive(Clone, Debug)]
pub struct ParticleStyle {
	/// Enable ambient particles
	pub enabled: bool,
	/// Number of particles
	pub count: usize,
	/// Particle color
	pub color: Color,
	/// Minimum particle size
	pub size_min: f64,
	/// Maximum particle size
	pub size_max: f64,
	/// Particle movement speed
	pub speed: f64,
	/// Particle opacity
	pub opacity: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub mode: ColorMode,
	/// Accent color from the UI shell (selection ring, flow particles).
	pub accent: Color,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub particles: ParticleStyle,
	pub palette: CategoryPalette,
}

impl Theme {
	/// Theme for the given color mode with the default accent.
	pub fn for_mode(mode: ColorMode) -> Self {
		match mode {
			ColorMode::Dark => Self::dark(),
			ColorMode::Light => Self::light(),
		}
	}

	/// Dark editor-like theme (default)
	pub fn dark() -> Self {
		let accent = Color::rgb(97, 175, 239);
		Self {
			mode: ColorMode::Dark,
			accent,
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(32, 38, 48),
				use_gradient: true,
				vignette: 0.18,
				placeholder: Color::rgba(200, 210, 225, 0.6),
			},
			edge: EdgeStyle {
				hierarchical: Color::rgba(222, 185, 120, 0.55),
				sibling: Color::rgba(140, 160, 180, 0.45),
				related: Color::rgba(140, 160, 180, 0.3),
				flow: accent.with_alpha(0.85),
				curved: true,
				curve_tension: 0.35,
			},
			node: NodeStyle {
				use_gradient: true,
				glow_intensity: 0.45,
				ring_color: Color::rgba(255, 255, 255, 0.55),
				label_color: Color::rgba(230, 235, 242, 0.92),
				glyph_color: Color::rgba(20, 24, 30, 0.85),
			},
			particles: ParticleStyle {
				enabled: true,
				count: 60,
				color: Color::rgb(160, 180, 210),
				size_min: 0.6,
				size_max: 1.8,
				speed: 0.12,
				opacity: 0.35,
			},
			palette: CategoryPalette::default(),
		}
	}

	/// Light paper-like theme
	pub fn light() -> Self {
		let accent = Color::rgb(0, 122, 204);
		Self {
			mode: ColorMode::Light,
			accent,
			background: BackgroundStyle {
				color: Color::rgb(236, 239, 244),
				color_secondary: Color::rgb(250, 251, 253),
				use_gradient: true,
				vignette: 0.0,
				placeholder: Color::rgba(60, 70, 85, 0.6),
			},
			edge: EdgeStyle {
				hierarchical: Color::rgba(170, 120, 40, 0.55),
				sibling: Color::rgba(90, 105, 125, 0.4),
				related: Color::rgba(90, 105, 125, 0.28),
				flow: accent.with_alpha(0.8),
				curved: true,
				curve_tension: 0.35,
			},
			node: NodeStyle {
				use_gradient: true,
				glow_intensity: 0.25,
				ring_color: Color::rgba(40, 48, 60, 0.5),
				label_color: Color::rgba(30, 36, 46, 0.9),
				glyph_color: Color::rgba(255, 255, 255, 0.9),
			},
			particles: ParticleStyle {
				enabled: false,
				count: 0,
				color: Color::rgba(0, 0, 0, 0.0),
				size_min: 0.0,
				size_max: 0.0,
				speed: 0.0,
				opacity: 0.0,
			},
			palette: CategoryPalette::default(),
		}
	}

	/// Builder: override the accent color.
	pub fn with_accent(mut self, accent: Color) -> Self {
		self.accent = accent;
		self.edge.flow = accent.with_alpha(self.edge.flow.a);
		self
	}

	/// Base color of a node in `category`.
	pub fn category_color(&self, category: &str) -> Color {
		self.palette.color(category)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
