//! Connectivity tracing over the connection-type grid.
//!
//! Every traced path starts at an entrance and walks the 4-connected graph one cell at a time
//! until it reaches a non-path cell or runs out of unvisited neighbours.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::level::model::Connection;
use crate::level::sampler::GeoSampler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Fallback priority order.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(self) -> (i64, i64) {
        match self {
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Dir::Up => 1,
            Dir::Right => 2,
            Dir::Down => 4,
            Dir::Left => 8,
        }
    }

    pub fn step(self, (x, y): (i64, i64)) -> (i64, i64) {
        let (dx, dy) = self.delta();
        (x + dx, y + dy)
    }
}

/// Which of a cell's four neighbours satisfy some predicate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbors(u8);

impl Neighbors {
    pub fn of(cell: (i64, i64), mut pred: impl FnMut(i64, i64) -> bool) -> Self {
        let mut bits = 0u8;
        for d in Dir::ALL {
            let (x, y) = d.step(cell);
            if pred(x, y) {
                bits |= d.bit();
            }
        }
        Self(bits)
    }

    pub fn from_dirs(dirs: &[Dir]) -> Self {
        Self(dirs.iter().fold(0, |acc, d| acc | d.bit()))
    }

    pub fn has(self, d: Dir) -> bool {
        self.0 & d.bit() != 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn dirs(self) -> SmallVec<[Dir; 4]> {
        Dir::ALL.into_iter().filter(|d| self.has(*d)).collect()
    }

    fn without(self, d: Option<Dir>) -> Self {
        match d {
            Some(d) => Self(self.0 & !d.bit()),
            None => self,
        }
    }
}

/// Pick the next step from a cell whose connected neighbours are `pattern`.
///
/// `came_from` points back at the previous cell and is never chosen. With several candidates a
/// T-junction steps toward its stem and a full cross continues straight.
pub fn step_direction(pattern: Neighbors, came_from: Option<Dir>) -> Option<Dir> {
    pick(pattern, pattern.without(came_from), came_from)
}

/// Apply the priority table for `pattern` to an already narrowed candidate set.
fn pick(pattern: Neighbors, candidates: Neighbors, came_from: Option<Dir>) -> Option<Dir> {
    match candidates.count() {
        0 => return None,
        1 => return candidates.dirs().first().copied(),
        _ => {}
    }
    let preferred = if pattern.count() == 4 {
        came_from.map(Dir::opposite)
    } else if pattern.count() == 3 {
        Dir::ALL
            .into_iter()
            .find(|d| !pattern.has(*d))
            .map(Dir::opposite)
    } else {
        None
    };
    match preferred {
        Some(d) if candidates.has(d) => Some(d),
        _ => candidates.dirs().first().copied(),
    }
}

/// How a traced path ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Exit,
    Spawn,
    Warp,
    /// Ends at another entrance.
    Shortcut,
    Dead,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TracedPath {
    /// Cells from the entrance to the terminal cell, inclusive.
    pub cells: Vec<(i64, i64)>,
    pub kind: PathKind,
}

impl TracedPath {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn entrance(&self) -> Option<(i64, i64)> {
        self.cells.first().copied()
    }

    pub fn terminal(&self) -> Option<(i64, i64)> {
        self.cells.last().copied()
    }
}

/// Walk from the entrance at `start`.
pub fn trace_from(sampler: &GeoSampler<'_>, start: (i64, i64)) -> TracedPath {
    let mut cells = vec![start];
    let mut visited: HashSet<(i64, i64)> = HashSet::from([start]);
    let mut came_from: Option<Dir> = None;
    let mut cur = start;

    loop {
        if cur != start && sampler.connection(cur.0, cur.1) != Connection::Path {
            break;
        }
        let pattern = Neighbors::of(cur, |x, y| sampler.connected(x, y));
        let open = pattern
            .without(came_from)
            .dirs()
            .into_iter()
            .filter(|d| !visited.contains(&d.step(cur)))
            .collect::<SmallVec<[Dir; 4]>>();
        let Some(dir) = pick(pattern, Neighbors::from_dirs(&open), came_from) else {
            break;
        };
        let next = dir.step(cur);
        visited.insert(next);
        cells.push(next);
        came_from = Some(dir.opposite());
        cur = next;
    }

    let kind = match (cells.len(), sampler.connection(cur.0, cur.1)) {
        (1, _) => PathKind::Dead,
        (_, Connection::Exit) => PathKind::Exit,
        (_, Connection::Spawn) => PathKind::Spawn,
        (_, Connection::Warp) => PathKind::Warp,
        (_, Connection::Entrance) => PathKind::Shortcut,
        (_, Connection::Path | Connection::None) => PathKind::Dead,
    };
    TracedPath { cells, kind }
}

/// Trace every entrance inside the sampler's window, in row-major order.
pub fn trace_all(sampler: &GeoSampler<'_>) -> Vec<TracedPath> {
    sampler
        .window()
        .cells()
        .filter(|&(x, y)| sampler.connection(x, y) == Connection::Entrance)
        .map(|start| trace_from(sampler, start))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/connections.rs"]
mod tests;
