//! The capability boundary between the render core and user rendering procedures.
//!
//! Tiles, effects and custom props are drawn by procedures the core does not know about. The
//! core only promises to call [`ScriptHost::invoke`] in a deterministic, coordinate-ascending
//! order and to hand over the layer stack for the duration of the call.

pub mod builtin;

use crate::foundation::config::RenderConfig;
use crate::foundation::core::{Rect, Vec2};
use crate::foundation::error::StrataResult;
use crate::level::camera::Camera;
use crate::level::defs::{Definitions, EffectDef, PropDef, TileDef, TileId};
use crate::level::model::{EffectInstance, Level, PropInstance};
use crate::render::stack::LayerStack;

pub use builtin::BuiltinHost;

/// Position of one effect invocation, per [`crate::level::defs::Granularity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectStep {
    Whole,
    Row(i64),
    Cell(i64, i64),
}

/// One render procedure invocation.
#[derive(Clone, Copy, Debug)]
pub enum ScriptCall<'a> {
    Tile {
        id: TileId,
        def: &'a TileDef,
        x: i64,
        y: i64,
        depth: usize,
    },
    Effect {
        index: usize,
        instance: &'a EffectInstance,
        def: &'a EffectDef,
        step: EffectStep,
    },
    Prop {
        index: usize,
        instance: &'a PropInstance,
        def: &'a PropDef,
    },
}

/// What a procedure may read and draw into.
pub struct ScriptContext<'a> {
    pub level: &'a Level,
    pub defs: &'a Definitions,
    pub camera: &'a Camera,
    pub camera_index: usize,
    pub config: &'a RenderConfig,
    pub layers: &'a mut LayerStack,
}

impl ScriptContext<'_> {
    /// Translation from level pixels to layer-surface pixels.
    pub fn layer_origin(&self) -> Vec2 {
        self.camera.layer_origin(self.config)
    }

    /// Cell `(x, y)` in layer-surface pixels.
    pub fn cell_rect(&self, x: i64, y: i64) -> Rect {
        let c = f64::from(self.config.cell_size);
        let o = self.layer_origin();
        Rect::new(
            x as f64 * c + o.x,
            y as f64 * c + o.y,
            (x + 1) as f64 * c + o.x,
            (y + 1) as f64 * c + o.y,
        )
    }
}

/// Executes render procedures on behalf of the core.
pub trait ScriptHost {
    fn invoke(&mut self, call: ScriptCall<'_>, ctx: &mut ScriptContext<'_>) -> StrataResult<()>;
}

impl<H: ScriptHost + ?Sized> ScriptHost for &mut H {
    fn invoke(&mut self, call: ScriptCall<'_>, ctx: &mut ScriptContext<'_>) -> StrataResult<()> {
        (**self).invoke(call, ctx)
    }
}

impl<H: ScriptHost + ?Sized> ScriptHost for Box<H> {
    fn invoke(&mut self, call: ScriptCall<'_>, ctx: &mut ScriptContext<'_>) -> StrataResult<()> {
        (**self).invoke(call, ctx)
    }
}

/// Host that accepts every call and draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHost;

impl ScriptHost for NoopHost {
    fn invoke(&mut self, _call: ScriptCall<'_>, _ctx: &mut ScriptContext<'_>) -> StrataResult<()> {
        Ok(())
    }
}
