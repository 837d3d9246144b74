use crate::foundation::error::StrataResult;
use crate::level::defs::{Definitions, EffectDef, Granularity};
use crate::level::model::{EffectInstance, Level};
use crate::level::sampler::CellWindow;
use crate::script::{EffectStep, ScriptCall, ScriptContext, ScriptHost};

/// Maximum granular effect invocations per [`EffectRenderer::next`] call.
pub const EFFECT_BUDGET: usize = 100;

/// Walks every effect instance in level order, invoking its procedure at the definition's
/// granularity. Resumable: the active effect and an `(x, y)` cursor survive between calls.
pub struct EffectRenderer {
    window: CellWindow,
    effect: usize,
    effect_count: usize,
    cursor: (i64, i64),
}

impl EffectRenderer {
    pub fn new(level: &Level, window: CellWindow) -> Self {
        Self {
            window,
            effect: 0,
            effect_count: level.effects.len(),
            cursor: (window.x0, window.y0),
        }
    }

    pub fn is_done(&self) -> bool {
        self.effect >= self.effect_count
    }

    /// Index of the effect instance currently being rendered.
    pub fn active_effect(&self) -> Option<usize> {
        (!self.is_done()).then_some(self.effect)
    }

    /// Perform up to [`EFFECT_BUDGET`] invocations. Returns the number performed.
    pub fn next(
        &mut self,
        host: &mut dyn ScriptHost,
        ctx: &mut ScriptContext<'_>,
    ) -> StrataResult<usize> {
        let (level, defs) = (ctx.level, ctx.defs);
        let mut steps = 0usize;
        while steps < EFFECT_BUDGET {
            let Some((index, instance, def, step)) = self.pending(level, defs)? else {
                break;
            };
            host.invoke(
                ScriptCall::Effect {
                    index,
                    instance,
                    def,
                    step,
                },
                ctx,
            )?;
            steps += 1;
            match step {
                EffectStep::Whole => self.cursor.1 += 1,
                EffectStep::Row(_) => self.cursor.1 += 1,
                EffectStep::Cell(..) => self.cursor.0 += 1,
            }
        }
        // Settle on the next pending step so exhaustion is visible right away.
        self.pending(level, defs)?;
        tracing::trace!(steps, effect = self.effect, "effect slice rendered");
        Ok(steps)
    }

    /// The step under the cursor, skipping past exhausted effects.
    fn pending<'l>(
        &mut self,
        level: &'l Level,
        defs: &'l Definitions,
    ) -> StrataResult<Option<(usize, &'l EffectInstance, &'l EffectDef, EffectStep)>> {
        let w = self.window;
        while let Some(instance) = level.effects.get(self.effect) {
            let def = defs.effect(instance.effect)?;
            let step = match def.granularity {
                Granularity::Whole => (self.cursor == (w.x0, w.y0)).then_some(EffectStep::Whole),
                Granularity::Row => {
                    let y_end = w.y1.min(level.height() as i64);
                    (self.cursor.1 < y_end).then_some(EffectStep::Row(self.cursor.1))
                }
                Granularity::Cell => {
                    let x_end = w.x1.min(instance.intensity.width() as i64);
                    let y_end = w.y1.min(instance.intensity.height() as i64);
                    if self.cursor.0 >= x_end {
                        self.cursor = (w.x0, self.cursor.1 + 1);
                    }
                    (self.cursor.0 < x_end && self.cursor.1 < y_end)
                        .then_some(EffectStep::Cell(self.cursor.0, self.cursor.1))
                }
            };
            if let Some(step) = step {
                return Ok(Some((self.effect, instance, def, step)));
            }
            self.effect += 1;
            self.cursor = (w.x0, w.y0);
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/effects.rs"]
mod tests;
