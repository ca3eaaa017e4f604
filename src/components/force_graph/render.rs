//! Canvas rendering for the skill graph.
//!
//! Handles all drawing operations: background, edges, nodes, labels, and effects.
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background and particles (screen space)
//! 2. Edge lines with their flow dots (world space)
//! 3. Node halos, then node bodies in arena order
//! 4. Vignette (screen space)
//!
//! Drawing goes through the [`Canvas`] trait so frames can be recorded in
//! tests without a browser.

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::icons::{IconCache, fallback_glyph};
use super::model::{Edge, EdgeKind, Node};
use super::particles::{ParticleSystem, flow_position, point_on_line, point_on_quadratic};
use super::scale::{ScaleConfig, ScaledValues};
use super::state::ForceGraphState;
use super::theme::{Color, Theme};

/// Placeholder shown when the filter leaves no nodes.
pub const EMPTY_MESSAGE: &str = "No skills match the current filters";

/// Fill style: a flat color or a radial gradient.
#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
	Solid(Color),
	Radial {
		inner: (f64, f64, f64),
		outer: (f64, f64, f64),
		stops: Vec<(f64, Color)>,
	},
}

/// The subset of the 2D context API the renderer uses.
pub trait Canvas {
	fn save(&mut self);
	fn restore(&mut self);
	fn translate(&mut self, x: f64, y: f64);
	fn scale(&mut self, k: f64);
	fn set_fill(&mut self, fill: &Fill);
	fn set_stroke(&mut self, color: Color);
	fn set_line_width(&mut self, width: f64);
	/// Empty slice resets to solid lines.
	fn set_line_dash(&mut self, segments: &[f64]);
	fn set_font(&mut self, font: &str);
	fn set_text_align(&mut self, align: &str);
	fn begin_path(&mut self);
	/// Full circle sub-path.
	fn circle(&mut self, x: f64, y: f64, radius: f64);
	fn move_to(&mut self, x: f64, y: f64);
	fn line_to(&mut self, x: f64, y: f64);
	fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
	fn fill(&mut self);
	fn stroke(&mut self);
	fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
	fn fill_text(&mut self, text: &str, x: f64, y: f64);
	/// Draw the cached icon for `id` centred at `(x, y)`. False on a cache miss.
	fn draw_icon(&mut self, id: &str, x: f64, y: f64, size: f64) -> bool;
}

/// [`Canvas`] over a browser 2D context and the loaded icons.
pub struct WebCanvas<'a> {
	ctx: &'a CanvasRenderingContext2d,
	icons: &'a IconCache<HtmlImageElement>,
}

impl<'a> WebCanvas<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d, icons: &'a IconCache<HtmlImageElement>) -> Self {
		Self { ctx, icons }
	}
}

impl Canvas for WebCanvas<'_> {
	fn save(&mut self) {
		self.ctx.save();
	}

	fn restore(&mut self) {
		self.ctx.restore();
	}

	fn translate(&mut self, x: f64, y: f64) {
		let _ = self.ctx.translate(x, y);
	}

	fn scale(&mut self, k: f64) {
		let _ = self.ctx.scale(k, k);
	}

	fn set_fill(&mut self, fill: &Fill) {
		match fill {
			Fill::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
			Fill::Radial {
				inner,
				outer,
				stops,
			} => {
				let gradient = self
					.ctx
					.create_radial_gradient(inner.0, inner.1, inner.2, outer.0, outer.1, outer.2)
					.and_then(|gradient| {
						for (offset, color) in stops {
							gradient.add_color_stop(*offset as f32, &color.to_css())?;
						}
						Ok(gradient)
					});
				match gradient {
					Ok(gradient) => {
						#[allow(deprecated)]
						self.ctx.set_fill_style(&gradient);
					}
					Err(_) => {
						// degenerate radii: fall back to the first stop
						let color = stops.first().map(|(_, c)| *c).unwrap_or(Color::rgba(0, 0, 0, 0.0));
						self.ctx.set_fill_style_str(&color.to_css());
					}
				}
			}
		}
	}

	fn set_stroke(&mut self, color: Color) {
		self.ctx.set_stroke_style_str(&color.to_css());
	}

	fn set_line_width(&mut self, width: f64) {
		self.ctx.set_line_width(width);
	}

	fn set_line_dash(&mut self, segments: &[f64]) {
		let array: js_sys::Array = segments.iter().map(|&s| JsValue::from_f64(s)).collect();
		let _ = self.ctx.set_line_dash(&array);
	}

	fn set_font(&mut self, font: &str) {
		self.ctx.set_font(font);
	}

	fn set_text_align(&mut self, align: &str) {
		self.ctx.set_text_align(align);
	}

	fn begin_path(&mut self) {
		self.ctx.begin_path();
	}

	fn circle(&mut self, x: f64, y: f64, radius: f64) {
		let _ = self.ctx.arc(x, y, radius.max(0.0), 0.0, std::f64::consts::TAU);
	}

	fn move_to(&mut self, x: f64, y: f64) {
		self.ctx.move_to(x, y);
	}

	fn line_to(&mut self, x: f64, y: f64) {
		self.ctx.line_to(x, y);
	}

	fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
		self.ctx.quadratic_curve_to(cx, cy, x, y);
	}

	fn fill(&mut self) {
		self.ctx.fill();
	}

	fn stroke(&mut self) {
		self.ctx.stroke();
	}

	fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
		self.ctx.fill_rect(x, y, width, height);
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64) {
		let _ = self.ctx.fill_text(text, x, y);
	}

	fn draw_icon(&mut self, id: &str, x: f64, y: f64, size: f64) -> bool {
		let Some(image) = self.icons.get(id) else {
			return false;
		};
		self.ctx
			.draw_image_with_html_image_element_and_dw_and_dh(
				image,
				x - size / 2.0,
				y - size / 2.0,
				size,
				size,
			)
			.is_ok()
	}
}

/// Cubic Hermite ease `3t^2 - 2t^3` over `[0, 1]`, flat at both ends.
/// Maps highlight intensities to the dimming and emphasis blend.
fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph. Reads the state, never writes it.
pub fn render(
	canvas: &mut dyn Canvas,
	state: &ForceGraphState,
	config: &ScaleConfig,
	theme: &Theme,
	particles: Option<&ParticleSystem>,
) {
	draw_background(canvas, state, theme);

	if state.model.is_empty() {
		draw_placeholder(canvas, state, theme);
		return;
	}

	if let Some(ps) = particles.filter(|_| theme.particles.enabled) {
		draw_particles(canvas, state, theme, ps);
	}

	let scale = ScaledValues::new(config, state.transform.k);

	canvas.save();
	canvas.translate(state.transform.x, state.transform.y);
	canvas.scale(state.transform.k);

	draw_edges(canvas, state, config, &scale, theme);
	draw_nodes(canvas, state, config, &scale, theme);

	canvas.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(canvas, state, theme);
	}
}

fn draw_background(canvas: &mut dyn Canvas, state: &ForceGraphState, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let fill = if theme.background.use_gradient {
		Fill::Radial {
			inner: (cx, cy, 0.0),
			outer: (cx, cy, state.width.max(state.height) * 0.8),
			stops: vec![
				(0.0, theme.background.color_secondary),
				(1.0, theme.background.color),
			],
		}
	} else {
		Fill::Solid(theme.background.color)
	};
	canvas.set_fill(&fill);
	canvas.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_placeholder(canvas: &mut dyn Canvas, state: &ForceGraphState, theme: &Theme) {
	canvas.set_fill(&Fill::Solid(theme.background.placeholder));
	canvas.set_font("14px sans-serif");
	canvas.set_text_align("center");
	canvas.fill_text(EMPTY_MESSAGE, state.width / 2.0, state.height / 2.0);
}

fn draw_vignette(canvas: &mut dyn Canvas, state: &ForceGraphState, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	canvas.set_fill(&Fill::Radial {
		inner: (cx, cy, state.width.min(state.height) * 0.3),
		outer: (cx, cy, state.width.max(state.height) * 0.7),
		stops: vec![
			(0.0, Color::rgba(0, 0, 0, 0.0)),
			(1.0, Color::rgba(0, 0, 0, theme.background.vignette)),
		],
	});
	canvas.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_particles(
	canvas: &mut dyn Canvas,
	state: &ForceGraphState,
	theme: &Theme,
	particles: &ParticleSystem,
) {
	for p in &particles.particles {
		let alpha = p.alpha_at(state.flow_time);
		canvas.set_fill(&Fill::Solid(theme.particles.color.with_alpha(alpha)));
		canvas.begin_path();
		canvas.circle(p.x, p.y, p.size);
		canvas.fill();
	}
}

/// Control point of a curved edge, or `None` when drawn straight.
fn curve_control(a: &Node, b: &Node, theme: &Theme) -> Option<(f64, f64)> {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let dist = dx.hypot(dy);
	if !theme.edge.curved || dist <= (a.radius + b.radius) * 2.0 {
		return None;
	}
	let offset = dist * theme.edge.curve_tension * 0.3;
	let (ux, uy) = (dx / dist, dy / dist);
	Some(((a.x + b.x) / 2.0 - uy * offset, (a.y + b.y) / 2.0 + ux * offset))
}

fn edge_color(kind: EdgeKind, theme: &Theme) -> Color {
	match kind {
		EdgeKind::Hierarchical => theme.edge.hierarchical,
		EdgeKind::Sibling => theme.edge.sibling,
		EdgeKind::Related => theme.edge.related,
	}
}

fn draw_edges(
	canvas: &mut dyn Canvas,
	state: &ForceGraphState,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let max_t = smooth_step(state.highlight.max_intensity());

	for edge in &state.model.edges {
		let (Some(a), Some(b)) = (state.model.node(edge.source), state.model.node(edge.target))
		else {
			continue;
		};
		if a.distance_sq(b.x, b.y) < 1e-6 {
			continue;
		}

		let edge_t = smooth_step(state.highlight.edge_intensity(edge.source, edge.target));
		let (alpha, width) = if edge_t > 0.01 {
			(1.0 + 0.6 * edge_t, scale.edge_line_width * (1.0 + 0.5 * edge_t))
		} else if max_t > 0.01 {
			(1.0 - 0.7 * max_t, scale.edge_line_width * (1.0 - 0.3 * max_t))
		} else {
			(1.0, scale.edge_line_width)
		};

		let base = edge_color(edge.kind, theme);
		canvas.set_stroke(base.with_alpha((base.a * alpha).min(1.0)));
		canvas.set_line_width(width);

		// Related edges are dashed; the gap closes when zoomed out
		let gap = scale.dash_pattern.1 * scale.dash_alpha;
		if edge.kind == EdgeKind::Related && gap > 0.1 {
			canvas.set_line_dash(&[scale.dash_pattern.0, gap]);
		} else {
			canvas.set_line_dash(&[]);
		}

		let control = curve_control(a, b, theme);
		canvas.begin_path();
		canvas.move_to(a.x, a.y);
		match control {
			Some((cx, cy)) => canvas.quadratic_curve_to(cx, cy, b.x, b.y),
			None => canvas.line_to(b.x, b.y),
		}
		canvas.stroke();

		draw_flow_dot(canvas, state, config, scale, theme, edge, a, b, control, alpha);
	}

	canvas.set_line_dash(&[]);
}

#[allow(clippy::too_many_arguments)]
fn draw_flow_dot(
	canvas: &mut dyn Canvas,
	state: &ForceGraphState,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
	edge: &Edge,
	a: &Node,
	b: &Node,
	control: Option<(f64, f64)>,
	alpha: f64,
) {
	let t = flow_position(state.flow_time, config.edge.flow_speed, edge.phase);
	let (x, y) = match control {
		Some(c) => point_on_quadratic((a.x, a.y), c, (b.x, b.y), t),
		None => point_on_line((a.x, a.y), (b.x, b.y), t),
	};
	// fade in and out at the endpoints so the dot does not pop
	let edge_fade = (t * (1.0 - t) * 4.0).min(1.0);
	let color = theme.edge.flow;
	canvas.set_fill(&Fill::Solid(
		color.with_alpha((color.a * alpha * edge_fade).min(1.0)),
	));
	canvas.begin_path();
	canvas.circle(x, y, scale.flow_radius);
	canvas.fill();
}

/// Per-node appearance resolved from highlight, hover and selection.
struct NodeLook {
	radius: f64,
	alpha: f64,
	emphasized: bool,
	selected: bool,
}

fn node_look(
	state: &ForceGraphState,
	config: &ScaleConfig,
	idx: usize,
	node: &Node,
	max_t: f64,
) -> NodeLook {
	let hovered = state.focused() == Some(idx);
	let selected = state.selected == Some(idx);
	let node_t = smooth_step(state.highlight.node_intensity(idx));

	let dim_alpha = if max_t > 0.01 { 1.0 - 0.7 * max_t } else { 1.0 };
	let alpha = dim_alpha + (1.0 - dim_alpha) * node_t;
	let radius = node.radius * config.emphasis(hovered, selected) * (1.0 + 0.1 * node_t);

	NodeLook {
		radius,
		alpha,
		emphasized: hovered || selected,
		selected,
	}
}

fn draw_nodes(
	canvas: &mut dyn Canvas,
	state: &ForceGraphState,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let looks: Vec<NodeLook> = state
		.model
		.nodes
		.iter()
		.enumerate()
		.map(|(idx, node)| node_look(state, config, idx, node, max_t))
		.collect();

	// Pass 1: halos, so no halo covers a neighbouring body
	if theme.node.glow_intensity > 0.0 {
		for (idx, (node, look)) in state.model.nodes.iter().zip(&looks).enumerate() {
			let pulse = (state.flow_time * config.glow.pulse_speed + idx as f64 * 0.7).sin()
				* config.glow.pulse_amount;
			draw_halo(canvas, node, look, config, theme, pulse);
		}
	}

	// Pass 2: bodies in arena order (hit testing relies on this order)
	for (node, look) in state.model.nodes.iter().zip(&looks) {
		draw_node(canvas, node, look, scale, theme);
	}
}

fn draw_halo(
	canvas: &mut dyn Canvas,
	node: &Node,
	look: &NodeLook,
	config: &ScaleConfig,
	theme: &Theme,
	pulse: f64,
) {
	let boost = if look.emphasized { 1.5 } else { 1.0 };
	let alpha = theme.node.glow_intensity * look.alpha * boost * 0.5;
	if alpha < 0.01 {
		return;
	}
	let color = theme.category_color(node.category());
	let outer = look.radius * config.glow.halo_radius * (1.0 + pulse);

	canvas.set_fill(&Fill::Radial {
		inner: (node.x, node.y, look.radius * 0.5),
		outer: (node.x, node.y, outer),
		stops: vec![
			(0.0, color.with_alpha(alpha.min(1.0))),
			(1.0, color.with_alpha(0.0)),
		],
	});
	canvas.begin_path();
	canvas.circle(node.x, node.y, outer);
	canvas.fill();
}

fn draw_node(
	canvas: &mut dyn Canvas,
	node: &Node,
	look: &NodeLook,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let (x, y, r) = (node.x, node.y, look.radius);
	let color = theme.category_color(node.category()).with_alpha(look.alpha);

	let body = if theme.node.use_gradient {
		Fill::Radial {
			inner: (x - r * 0.3, y - r * 0.3, r * 0.1),
			outer: (x, y, r),
			stops: vec![(0.0, color.lighten(0.35)), (1.0, color)],
		}
	} else {
		Fill::Solid(color)
	};
	canvas.set_fill(&body);
	canvas.begin_path();
	canvas.circle(x, y, r);
	canvas.fill();

	let ring = theme.node.ring_color;
	let ring = ring.with_alpha(ring.a * look.alpha);
	canvas.set_stroke(ring);
	canvas.set_line_width(scale.tier_ring_width);
	for i in 0..node.tier.rings() {
		canvas.begin_path();
		canvas.circle(x, y, r + scale.tier_ring_width * (2.0 + 2.5 * i as f64));
		canvas.stroke();
	}

	if look.selected {
		let outside = scale.tier_ring_width * 2.5 * node.tier.rings() as f64;
		canvas.set_stroke(theme.accent);
		canvas.set_line_width(scale.ring_width);
		canvas.begin_path();
		canvas.circle(x, y, r + outside + scale.ring_offset);
		canvas.stroke();
	}

	let icon_size = r * 1.2;
	let has_icon = node.entity.icon.is_some() && canvas.draw_icon(node.id(), x, y, icon_size);
	if !has_icon {
		let glyph = theme.node.glyph_color;
		canvas.set_fill(&Fill::Solid(glyph.with_alpha(glyph.a * look.alpha)));
		canvas.set_font(&format!("bold {:.1}px sans-serif", r * 0.8));
		canvas.set_text_align("center");
		canvas.fill_text(&fallback_glyph(&node.entity.name), x, y + r * 0.28);
	}

	if scale.show_idle_labels || look.emphasized {
		let label = theme.node.label_color;
		canvas.set_fill(&Fill::Solid(label.with_alpha(label.a * look.alpha)));
		canvas.set_font(&scale.label_font);
		canvas.set_text_align("center");
		canvas.fill_text(&node.entity.name, x, y + r + scale.label_size + 2.0);
	}
}
