//! Leptos component wrapping the skill graph canvas.
//!
//! The component creates an HTML canvas element and forwards mouse/wheel events
//! to the interaction state machine. An animation loop runs via
//! `requestAnimationFrame`, ticking the simulation and repainting each frame,
//! and is cancelled when the component unmounts.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use leptos::ev;
use leptos::prelude::*;
use log::{debug, error, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement, HtmlImageElement, MouseEvent,
	WheelEvent, Window,
};

use super::icons::IconCache;
use super::interaction::{Cursor, Effect as GraphEffect, PointerEvent};
use super::model::{GraphFilter, LinkRules};
use super::particles::ParticleSystem;
use super::render::{self, WebCanvas};
use super::scale::ScaleConfig;
use super::simulation::SimulationConfig;
use super::state::{ForceGraphState, HoverInfo};
use super::theme::{Color, ColorMode, Theme};
use super::types::Entity;
use super::view::ZOOM_STEP;

/// Fixed frame step in seconds.
const FRAME_DT: f64 = 1.0 / 60.0;

/// Bundles graph state with visual configuration (scaling, theme, particles).
struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
	particles: Option<ParticleSystem>,
}

impl GraphContext {
	fn set_theme(&mut self, theme: Theme) {
		self.particles = theme
			.particles
			.enabled
			.then(|| ParticleSystem::new(&theme.particles, self.state.width, self.state.height));
		self.theme = theme;
	}
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;
type SharedIcons = Rc<RefCell<IconCache<HtmlImageElement>>>;

/// Cancelable handle for the frame loop.
///
/// Only holds atomics so it can move into `on_cleanup`.
#[derive(Clone, Default)]
struct AnimationLoop {
	stopped: Arc<AtomicBool>,
	frame: Arc<AtomicI32>,
}

impl AnimationLoop {
	fn is_running(&self) -> bool {
		!self.stopped.load(Ordering::Relaxed)
	}

	fn schedule(&self, window: &Window, callback: &Closure<dyn FnMut()>) {
		match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
			Ok(id) => self.frame.store(id, Ordering::Relaxed),
			Err(e) => error!("skill-graph: requestAnimationFrame failed: {e:?}"),
		}
	}

	fn stop(&self) {
		if self.stopped.swap(true, Ordering::Relaxed) {
			return;
		}
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(self.frame.load(Ordering::Relaxed));
		}
		debug!("skill-graph: animation loop stopped");
	}
}

/// What the host page hears about.
enum Notice {
	Hover(Option<HoverInfo>),
	Select(Option<Entity>),
	Cursor(Cursor),
}

/// Resolve node handles to owned entities while the state is still borrowed.
fn resolve(state: &ForceGraphState, effects: Vec<GraphEffect>) -> Vec<Notice> {
	effects
		.into_iter()
		.map(|effect| match effect {
			GraphEffect::HoverChanged(idx) => Notice::Hover(idx.and_then(|i| state.hover_info(i))),
			GraphEffect::SelectionChanged(idx) => {
				Notice::Select(idx.and_then(|i| state.model.node(i)).map(|n| n.entity.clone()))
			}
			GraphEffect::Cursor(cursor) => Notice::Cursor(cursor),
		})
		.collect()
}

/// Host callbacks plus the canvas for cursor updates.
#[derive(Clone, Copy)]
struct Outputs {
	canvas_ref: NodeRef<leptos::html::Canvas>,
	on_select: Option<Callback<Option<Entity>>>,
	on_hover: Option<Callback<Option<HoverInfo>>>,
}

impl Outputs {
	/// Run callbacks. Must be called with the graph context released, since
	/// host callbacks may update signals that feed back into the graph.
	fn dispatch(&self, notices: Vec<Notice>) {
		for notice in notices {
			match notice {
				Notice::Hover(info) => {
					if let Some(cb) = self.on_hover {
						cb.run(info);
					}
				}
				Notice::Select(entity) => {
					if let Some(cb) = self.on_select {
						cb.run(entity);
					}
				}
				Notice::Cursor(cursor) => {
					if let Some(canvas) = self.canvas_ref.get_untracked() {
						let canvas: HtmlCanvasElement = canvas.into();
						let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor.css());
					}
				}
			}
		}
	}
}

/// Apply `f` to the graph state, then dispatch the effects it returns.
fn with_state(
	context: &SharedContext,
	outputs: &Outputs,
	f: impl FnOnce(&mut GraphContext) -> Vec<GraphEffect>,
) {
	let notices = {
		let mut guard = context.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		let effects = f(c);
		resolve(&c.state, effects)
	};
	outputs.dispatch(notices);
}

/// Pointer position relative to the canvas.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
		return (dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0));
	}
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.filter(|h| *h > 0.0)
				.unwrap_or(600.0)
		}),
	)
}

/// Start fetching icons for entities that have not been requested yet.
fn load_icons(entities: &[Entity], icons: &SharedIcons) {
	for entity in entities {
		let Some(url) = entity.icon.as_deref() else {
			continue;
		};
		if !icons.borrow_mut().begin_load(&entity.id) {
			continue;
		}
		let Ok(image) = HtmlImageElement::new() else {
			icons.borrow_mut().fail(&entity.id);
			continue;
		};

		let (icons_ok, image_ok, id_ok) = (icons.clone(), image.clone(), entity.id.clone());
		let onload = Closure::once_into_js(move || {
			icons_ok.borrow_mut().finish(&id_ok, image_ok);
		});
		let (icons_err, id_err, url_err) = (icons.clone(), entity.id.clone(), url.to_string());
		let onerror = Closure::once_into_js(move || {
			warn!("skill-graph: icon for {id_err} failed to load from {url_err}");
			icons_err.borrow_mut().fail(&id_err);
		});

		image.set_onload(Some(onload.unchecked_ref()));
		image.set_onerror(Some(onerror.unchecked_ref()));
		image.set_src(url);
	}
}

/// Offer the current frame as a PNG download.
fn export_png(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
	let url = canvas.to_data_url_with_type("image/png")?;
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into().map_err(JsValue::from)?;
	anchor.set_href(&url);
	anchor.set_download("skill-graph.png");
	anchor.click();
	Ok(())
}

/// Renders the interactive skill graph on a canvas element.
///
/// `entities` and `filter` drive the node set; every change rebuilds the
/// graph, keeping positions of surviving nodes. The component sizes itself
/// to its parent container by default; set `fullscreen = true` to fill the
/// viewport and resize automatically with the window. Explicit
/// `width`/`height` override automatic sizing.
#[component]
pub fn SkillGraphCanvas(
	#[prop(into)] entities: Signal<Vec<Entity>>,
	#[prop(into, default = Signal::stored(GraphFilter::default()))] filter: Signal<GraphFilter>,
	#[prop(into, default = Signal::stored(ColorMode::default()))] color_mode: Signal<ColorMode>,
	/// Overrides the color mode's accent (flow dots, selection ring).
	#[prop(optional)]
	accent: Option<Color>,
	#[prop(default = LinkRules::default())] rules: LinkRules,
	#[prop(default = SimulationConfig::default())] simulation: SimulationConfig,
	#[prop(optional)] on_select: Option<Callback<Option<Entity>>>,
	#[prop(optional)] on_hover: Option<Callback<Option<HoverInfo>>>,
	/// Each change clears the selection, e.g. from a details panel's close button.
	#[prop(into, optional)]
	close_requests: Option<Signal<u32>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let icons: SharedIcons = Rc::new(RefCell::new(IconCache::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let animation = AnimationLoop::default();
	let outputs = Outputs {
		canvas_ref,
		on_select,
		on_hover,
	};

	let theme_for = move |mode: ColorMode| {
		let theme = Theme::for_mode(mode);
		match accent {
			Some(accent) => theme.with_accent(accent),
			None => theme,
		}
	};

	let (context_init, icons_init, animate_init, animation_init) =
		(context.clone(), icons.clone(), animate.clone(), animation.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("skill-graph: no window");
			return;
		};

		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("skill-graph: canvas 2d context unavailable");
				return;
			}
		};

		let entities = entities.get_untracked();
		load_icons(&entities, &icons_init);
		let mut state = ForceGraphState::new(entities, rules.clone(), simulation.clone(), w, h);
		state.set_filter(filter.get_untracked());

		let mut graph = GraphContext {
			state,
			scale: ScaleConfig::default(),
			theme: Theme::default(),
			particles: None,
		};
		graph.set_theme(theme_for(color_mode.get_untracked()));
		*context_init.borrow_mut() = Some(graph);

		// The frame closure only holds a weak handle to itself, so dropping
		// `animate` on cleanup frees the closure and the context it captured.
		let (context_anim, icons_anim, animate_inner, animation_inner) = (
			context_init.clone(),
			icons_init.clone(),
			Rc::downgrade(&animate_init),
			animation_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !animation_inner.is_running() {
				return;
			}
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.tick(FRAME_DT);
				if let Some(ref mut ps) = c.particles {
					ps.update(FRAME_DT);
				}
				let icons = icons_anim.borrow();
				let mut surface = WebCanvas::new(&ctx, &icons);
				render::render(&mut surface, &c.state, &c.scale, &c.theme, c.particles.as_ref());
			}
			let (Some(animate), Some(window)) = (animate_inner.upgrade(), web_sys::window()) else {
				return;
			};
			if let Some(ref cb) = *animate.borrow() {
				animation_inner.schedule(&window, cb);
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			animation_init.schedule(&window, cb);
		}
		debug!("skill-graph: mounted {w}x{h}");
	});

	// Data or filter changes rebuild the model
	let (context_data, icons_data) = (context.clone(), icons.clone());
	Effect::new(move |_| {
		let entities = entities.get();
		let filter = filter.get();
		load_icons(&entities, &icons_data);
		with_state(&context_data, &outputs, |c| c.state.set_data(entities, filter));
	});

	let context_theme = context.clone();
	Effect::new(move |_| {
		let mode = color_mode.get();
		if let Some(ref mut c) = *context_theme.borrow_mut() {
			c.set_theme(theme_for(mode));
		}
	});

	if let Some(close_requests) = close_requests {
		let context_close = context.clone();
		Effect::new(move |previous: Option<u32>| {
			let current = close_requests.get();
			if previous.is_some_and(|p| p != current) {
				with_state(&context_close, &outputs, |c| c.state.clear_selection());
			}
			current
		});
	}

	if fullscreen {
		let context_resize = context.clone();
		let resize = window_event_listener(ev::resize, move |_| {
			let (Some(window), Some(canvas)) = (web_sys::window(), canvas_ref.get_untracked()) else {
				return;
			};
			let canvas: HtmlCanvasElement = canvas.into();
			let (nw, nh) = canvas_size(&window, &canvas, true, None, None);
			canvas.set_width(nw as u32);
			canvas.set_height(nh as u32);
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.state.resize(nw, nh);
				if let Some(ref mut ps) = c.particles {
					ps.resize(nw, nh);
				}
			}
		});
		on_cleanup(move || resize.remove());
	}

	let context_key = context.clone();
	let escape = window_event_listener(ev::keydown, move |ev| {
		if ev.key() == "Escape" {
			with_state(&context_key, &outputs, |c| c.state.clear_selection());
		}
	});
	on_cleanup(move || escape.remove());

	let teardown = SendWrapper::new((context.clone(), animate.clone()));
	let animation_cleanup = animation.clone();
	on_cleanup(move || {
		animation_cleanup.stop();
		let (context, animate) = teardown.take();
		if let Some(mut c) = context.borrow_mut().take() {
			c.state.simulation.stop();
		}
		animate.borrow_mut().take();
		debug!("skill-graph: unmounted");
	});

	let pointer = {
		let context = context.clone();
		move |event: PointerEvent| {
			with_state(&context, &outputs, |c| c.state.handle_pointer(event, &c.scale));
		}
	};

	let on_mousedown = {
		let pointer = pointer.clone();
		move |ev: MouseEvent| {
			if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
				pointer(PointerEvent::Down { x, y });
			}
		}
	};
	let on_mousemove = {
		let pointer = pointer.clone();
		move |ev: MouseEvent| {
			if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
				pointer(PointerEvent::Move { x, y });
			}
		}
	};
	let on_mouseup = {
		let pointer = pointer.clone();
		move |ev: MouseEvent| {
			if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
				pointer(PointerEvent::Up { x, y });
			}
		}
	};
	let on_mouseleave = {
		let pointer = pointer.clone();
		move |_: MouseEvent| pointer(PointerEvent::Leave)
	};
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		pointer(PointerEvent::Wheel {
			delta_y: ev.delta_y(),
		});
	};

	let zoom = |context: SharedContext, factor: Option<f64>| {
		move |_: MouseEvent| {
			if let Some(ref mut c) = *context.borrow_mut() {
				match factor {
					Some(factor) => c.state.zoom_by(factor),
					None => c.state.reset_view(),
				}
			}
		}
	};
	let on_zoom_in = zoom(context.clone(), Some(ZOOM_STEP));
	let on_zoom_out = zoom(context.clone(), Some(1.0 / ZOOM_STEP));
	let on_zoom_reset = zoom(context.clone(), None);

	let on_export = move |_: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		if let Err(e) = export_png(&canvas) {
			error!("skill-graph: PNG export failed: {e:?}");
		}
	};

	view! {
		<div class="skill-graph" class:fullscreen=fullscreen>
			<canvas
				node_ref=canvas_ref
				class="skill-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="skill-graph-toolbar">
				<button title="Zoom in" on:click=on_zoom_in>"+"</button>
				<button title="Zoom out" on:click=on_zoom_out>"-"</button>
				<button title="Reset view" on:click=on_zoom_reset>"Reset"</button>
				<button title="Download PNG" on:click=on_export>"PNG"</button>
			</div>
		</div>
	}
}
