//! Strata renders tile-based levels into packed per-camera rasters.
//!
//! A render is incremental and budgeted: construct a [`LevelRender`], then call
//! [`LevelRender::next`] (or [`LevelRender::step_for`]) until it reports
//! [`RenderState::Done`]. Each call performs one bounded unit of work, so the render can share a
//! thread with an interactive editor.
//!
//! - Load a project with [`load_project`] (or build a [`Level`] and [`Definitions`] in code)
//! - Pick a [`ScriptHost`]; [`BuiltinHost`] draws plain geometry without user scripts
//! - Drive the [`LevelRender`] and collect one [`CameraRender`] per camera
#![forbid(unsafe_code)]

mod foundation;

pub mod level;
pub mod render;
pub mod script;

pub use crate::foundation::config::RenderConfig;
pub use crate::foundation::core::{Extent, Point, PolarOffset, Quad, Rect, Vec2};
pub use crate::foundation::error::{StrataError, StrataResult};

pub use crate::level::camera::Camera;
pub use crate::level::defs::{
    Definitions, EffectDef, EffectId, Granularity, PropDef, PropId, PropKind, SoftShading,
    TileDef, TileId, TileKind,
};
pub use crate::level::grid::Grid;
pub use crate::level::loader::{Project, load_definitions, load_project};
pub use crate::level::model::{
    Cell, Connection, EffectInstance, Geo, Level, LightSettings, Pole, PropInstance,
};
pub use crate::render::connections::{PathKind, TracedPath};
pub use crate::render::encoder::{CameraRender, EncodedPixel};
pub use crate::render::orchestrator::{LevelRender, Progress, RenderState};
pub use crate::render::palette::Shade;
pub use crate::render::stack::LayerStack;
pub use crate::script::{BuiltinHost, EffectStep, NoopHost, ScriptCall, ScriptContext, ScriptHost};
