//! The incremental render state machine.
//!
//! [`LevelRender`] owns one camera pass at a time: a layer stack plus a fresh set of
//! sub-renderers. Every [`LevelRender::next`] call advances the active stage by one bounded unit
//! of work, so a caller can interleave rendering with anything else it has to keep responsive.

use std::time::{Duration, Instant};

use crate::foundation::config::RenderConfig;
use crate::foundation::error::{StrataError, StrataResult};
use crate::level::camera::Camera;
use crate::level::defs::Definitions;
use crate::level::model::Level;
use crate::level::sampler::{CellWindow, GeoSampler};
use crate::render::effects::EffectRenderer;
use crate::render::encoder::{CameraRender, encode_camera};
use crate::render::light::LightRenderer;
use crate::render::poles::PoleRenderer;
use crate::render::props::PropRenderer;
use crate::render::stack::LayerStack;
use crate::render::tiles::TileRenderer;
use crate::script::{ScriptContext, ScriptHost};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderState {
    Idle,
    Tiles,
    Props,
    Poles,
    Connections,
    Effects,
    Lighting,
    Encoding,
    Finalizing,
    Done,
    Aborted,
}

impl RenderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RenderState::Done | RenderState::Aborted)
    }

    /// The stage after a completed per-camera stage.
    fn following(self) -> RenderState {
        match self {
            RenderState::Tiles => RenderState::Props,
            RenderState::Props => RenderState::Poles,
            RenderState::Poles => RenderState::Connections,
            RenderState::Connections => RenderState::Effects,
            RenderState::Effects => RenderState::Lighting,
            RenderState::Lighting => RenderState::Encoding,
            other => other,
        }
    }
}

/// Snapshot for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Progress {
    pub state: RenderState,
    /// Camera currently being rendered (or last rendered, once finished).
    pub camera: usize,
    pub cameras: usize,
    /// Cameras whose packed raster is complete.
    pub encoded: usize,
}

enum StageOutcome {
    Pending,
    Complete,
    Encoded(image::RgbaImage),
}

/// Per-camera state, rebuilt whenever the orchestrator moves to the next camera.
struct CameraPass {
    index: usize,
    stack: LayerStack,
    tiles: TileRenderer,
    props: PropRenderer,
    poles: PoleRenderer,
    effects: EffectRenderer,
    light: LightRenderer,
}

impl CameraPass {
    fn new(
        level: &Level,
        camera: &Camera,
        cfg: &RenderConfig,
        index: usize,
        stack: LayerStack,
    ) -> Self {
        let window = CellWindow::for_camera(level, camera, cfg);
        Self {
            index,
            stack,
            tiles: TileRenderer::new(level, window),
            props: PropRenderer::new(level, camera, cfg),
            poles: PoleRenderer::new(),
            effects: EffectRenderer::new(level, window),
            light: LightRenderer::new(level, camera, cfg),
        }
    }

    fn run(
        &mut self,
        stage: RenderState,
        level: &Level,
        defs: &Definitions,
        config: &RenderConfig,
        host: &mut dyn ScriptHost,
    ) -> StrataResult<StageOutcome> {
        let camera = level
            .cameras
            .get(self.index)
            .ok_or_else(|| StrataError::render(format!("camera {} missing", self.index)))?;
        let sampler = GeoSampler::new(level, camera, config);
        let mut ctx = ScriptContext {
            level,
            defs,
            camera,
            camera_index: self.index,
            config,
            layers: &mut self.stack,
        };
        let complete = match stage {
            RenderState::Tiles => {
                self.tiles.next(host, &mut ctx)?;
                self.tiles.is_done()
            }
            RenderState::Props => {
                self.props.next(host, &mut ctx)?;
                self.props.is_done()
            }
            RenderState::Poles => {
                self.poles.draw_poles(&sampler, &mut ctx);
                self.poles.poles_done()
            }
            RenderState::Connections => {
                self.poles.draw_connections(&sampler, &mut ctx);
                self.poles.paths_done()
            }
            RenderState::Effects => {
                self.effects.next(host, &mut ctx)?;
                self.effects.is_done()
            }
            RenderState::Lighting => {
                self.light.next(ctx.layers);
                self.light.is_done()
            }
            RenderState::Encoding => {
                let raster = encode_camera(ctx.layers, self.light.exposure(), camera, config)?;
                return Ok(StageOutcome::Encoded(raster));
            }
            other => {
                return Err(StrataError::render(format!(
                    "{other:?} is not a camera stage"
                )));
            }
        };
        Ok(if complete {
            StageOutcome::Complete
        } else {
            StageOutcome::Pending
        })
    }
}

/// Renders every camera of a level into packed rasters, one bounded unit per [`Self::next`].
pub struct LevelRender<'a, H: ScriptHost> {
    level: &'a Level,
    defs: &'a Definitions,
    config: RenderConfig,
    host: H,
    state: RenderState,
    camera: usize,
    pass: Option<CameraPass>,
    outputs: Vec<CameraRender>,
}

impl<'a, H: ScriptHost> LevelRender<'a, H> {
    /// Validate inputs and set up an idle render. Nothing is drawn until the first `next()`.
    #[tracing::instrument(skip_all, fields(level = %level.name, cameras = level.cameras.len()))]
    pub fn new(
        level: &'a Level,
        defs: &'a Definitions,
        config: RenderConfig,
        host: H,
    ) -> StrataResult<Self> {
        config.validate()?;
        if level.cameras.is_empty() {
            return Err(StrataError::validation("level has no cameras"));
        }
        if level.depth() > config.depths as usize {
            return Err(StrataError::validation(format!(
                "level has {} geometry layers but the stack holds {}",
                level.depth(),
                config.depths
            )));
        }
        level.validate()?;
        Ok(Self {
            level,
            defs,
            config,
            host,
            state: RenderState::Idle,
            camera: 0,
            pass: None,
            outputs: Vec::new(),
        })
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn progress(&self) -> Progress {
        Progress {
            state: self.state,
            camera: self.camera,
            cameras: self.level.cameras.len(),
            encoded: self.outputs.len(),
        }
    }

    /// Packed rasters of the cameras finished so far, in camera order.
    pub fn outputs(&self) -> &[CameraRender] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<CameraRender> {
        self.outputs
    }

    /// The layer stack of the active camera pass.
    pub fn layers(&self) -> Option<&LayerStack> {
        self.pass.as_ref().map(|p| &p.stack)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Stop permanently. Partially drawn layers are left as they are.
    pub fn abort(&mut self) {
        if !self.state.is_terminal() {
            tracing::debug!(from = ?self.state, camera = self.camera, "render aborted by caller");
            self.state = RenderState::Aborted;
            self.pass = None;
        }
    }

    /// Advance by one bounded unit of work.
    ///
    /// A no-op once the render is done or aborted. An error aborts the render and is returned
    /// once; subsequent calls do nothing.
    pub fn next(&mut self) -> StrataResult<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        if let Err(err) = self.advance() {
            tracing::warn!(state = ?self.state, camera = self.camera, error = %err, "render aborted");
            self.state = RenderState::Aborted;
            self.pass = None;
            return Err(err);
        }
        Ok(())
    }

    /// Call [`Self::next`] until `budget` is spent or a terminal state is reached.
    /// Returns the number of units performed; at least one unless already terminal.
    pub fn step_for(&mut self, budget: Duration) -> StrataResult<usize> {
        let start = Instant::now();
        let mut units = 0usize;
        while !self.state.is_terminal() {
            self.next()?;
            units += 1;
            if start.elapsed() >= budget {
                break;
            }
        }
        Ok(units)
    }

    /// Drive the render to completion.
    pub fn run_to_end(&mut self) -> StrataResult<()> {
        while !self.state.is_terminal() {
            self.next()?;
        }
        Ok(())
    }

    fn advance(&mut self) -> StrataResult<()> {
        match self.state {
            RenderState::Idle => {
                self.begin_camera(0)?;
                self.enter(RenderState::Tiles);
            }
            RenderState::Finalizing => {
                self.pass = None;
                self.enter(RenderState::Done);
            }
            RenderState::Done | RenderState::Aborted => {}
            stage => {
                let pass = self
                    .pass
                    .as_mut()
                    .ok_or_else(|| StrataError::render("no active camera pass"))?;
                let index = pass.index;
                let outcome = pass.run(stage, self.level, self.defs, &self.config, &mut self.host)?;
                match outcome {
                    StageOutcome::Pending => {}
                    StageOutcome::Complete => self.enter(stage.following()),
                    StageOutcome::Encoded(raster) => {
                        self.outputs.push(CameraRender {
                            camera_index: index,
                            raster,
                        });
                        if index + 1 < self.level.cameras.len() {
                            self.begin_camera(index + 1)?;
                            self.enter(RenderState::Tiles);
                        } else {
                            self.enter(RenderState::Finalizing);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the pass for camera `index`, reusing the previous stack after clearing it.
    fn begin_camera(&mut self, index: usize) -> StrataResult<()> {
        let camera = self
            .level
            .cameras
            .get(index)
            .ok_or_else(|| StrataError::render(format!("camera {index} missing")))?;
        let stack = match self.pass.take() {
            Some(pass) => {
                let mut stack = pass.stack;
                stack.clear();
                stack
            }
            None => LayerStack::new(&self.config),
        };
        self.pass = Some(CameraPass::new(
            self.level,
            camera,
            &self.config,
            index,
            stack,
        ));
        self.camera = index;
        tracing::debug!(camera = index, "camera pass started");
        Ok(())
    }

    fn enter(&mut self, state: RenderState) {
        tracing::debug!(from = ?self.state, to = ?state, camera = self.camera, "render state");
        self.state = state;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
