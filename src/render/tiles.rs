use std::collections::BTreeMap;

use crate::foundation::error::StrataResult;
use crate::level::defs::TileId;
use crate::level::model::Level;
use crate::level::sampler::CellWindow;
use crate::script::{ScriptCall, ScriptContext, ScriptHost};

/// Cells of one geometry layer grouped by the tile that draws them.
///
/// Groups iterate in ascending tile id, cells within a group in row-major order.
pub type TileBatches = BTreeMap<TileId, Vec<(i64, i64)>>;

/// Group the visible cells of `depth` by tile definition.
///
/// A cell with an explicit tile always draws it; an occupied cell without one falls back to the
/// level's default tile; everything else is skipped.
pub fn batch_layer(level: &Level, window: &CellWindow, depth: usize) -> TileBatches {
    let mut batches = TileBatches::new();
    for (x, y) in window.cells() {
        let Some(cell) = level.cell(x, y, depth) else {
            continue;
        };
        let tile = match cell.tile {
            Some(t) => Some(t),
            None if cell.geo.is_occupied() => level.default_tile,
            None => None,
        };
        if let Some(t) = tile {
            batches.entry(t).or_default().push((x, y));
        }
    }
    batches
}

/// Invokes tile procedures, one geometry layer per [`TileRenderer::next`] call.
pub struct TileRenderer {
    window: CellWindow,
    next_depth: usize,
    depth_count: usize,
}

impl TileRenderer {
    pub fn new(level: &Level, window: CellWindow) -> Self {
        Self {
            window,
            next_depth: 0,
            depth_count: level.depth(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.next_depth >= self.depth_count
    }

    /// Render the next geometry layer. Returns the number of procedure calls made.
    pub fn next(
        &mut self,
        host: &mut dyn ScriptHost,
        ctx: &mut ScriptContext<'_>,
    ) -> StrataResult<usize> {
        if self.is_done() {
            return Ok(0);
        }
        let depth = self.next_depth;
        let batches = batch_layer(ctx.level, &self.window, depth);
        let defs = ctx.defs;
        let mut calls = 0usize;
        for (id, cells) in &batches {
            let def = defs.tile(*id)?;
            for &(x, y) in cells {
                host.invoke(
                    ScriptCall::Tile {
                        id: *id,
                        def,
                        x,
                        y,
                        depth,
                    },
                    ctx,
                )?;
                calls += 1;
            }
        }
        tracing::trace!(depth, groups = batches.len(), calls, "tile layer rendered");
        self.next_depth += 1;
        Ok(calls)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/tiles.rs"]
mod tests;
