//! Force-directed skill graph visualization component.
//!
//! Renders an interactive force-directed graph of skills on an HTML canvas with:
//! - Nodes and typed edges built from a flat skill list and a hierarchy table
//! - Physics-based node positioning via a d3-style force simulation
//! - Pan, zoom, node dragging and click selection driven by a state machine
//! - Smooth neighbor highlighting on hover
//! - Configurable theming and visual scaling
//!
//! Everything except [`SkillGraphCanvas`] is plain Rust and runs without a
//! browser.
//!
//! # Example
//!
//! ```ignore
//! use skill_graph::{Entity, SkillGraphCanvas};
//!
//! let skills = vec![
//!     Entity::new("rust", "language", 90.0).with_name("Rust"),
//!     Entity::new("go", "language", 60.0).with_name("Go"),
//! ];
//!
//! view! { <SkillGraphCanvas entities=Signal::stored(skills) fullscreen=true /> }
//! ```

mod component;
mod highlight;
mod icons;
mod interaction;
mod model;
mod particles;
mod render;
pub mod scale;
mod simulation;
mod state;
pub mod theme;
mod types;
mod view;

pub use component::SkillGraphCanvas;
pub use interaction::{Cursor, Effect, InteractionState, PointerEvent};
pub use model::{
	Edge, EdgeKind, GraphFilter, GraphModel, LinkRules, Node, NodeIdx, build, build_from_raw,
	validate_entities,
};
pub use render::{Canvas, Fill, render};
pub use simulation::{Simulation, SimulationConfig};
pub use state::{ForceGraphState, HoverInfo};
pub use theme::{ColorMode, Theme};
pub use types::{Entity, EntityError, EntityMeta, RawEntity};
pub use view::ViewTransform;
