use crate::foundation::error::{StrataError, StrataResult};

/// Dense row-major 2D matrix indexed by level cell coordinates.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    try_from = "GridRepr<T>",
    bound(deserialize = "T: serde::Deserialize<'de>")
)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// Unchecked wire form; deserialized grids go through [`Grid::from_vec`].
#[derive(serde::Deserialize)]
struct GridRepr<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> TryFrom<GridRepr<T>> for Grid<T> {
    type Error = StrataError;

    fn try_from(repr: GridRepr<T>) -> StrataResult<Self> {
        Self::from_vec(repr.width, repr.height, repr.cells)
    }
}

impl<T: Clone> Grid<T> {
    /// A `width x height` grid filled with `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap a row-major vector; the length must equal `width * height`.
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> StrataResult<Self> {
        if width.checked_mul(height) != Some(cells.len()) {
            return Err(StrataError::validation(format!(
                "grid expects {width}x{height} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Cell at signed coordinates; `None` outside the grid.
    pub fn get(&self, x: i64, y: i64) -> Option<&T> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: i64, y: i64) -> Option<&mut T> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Overwrite a cell; out-of-range writes are ignored and reported as `false`.
    pub fn set(&mut self, x: i64, y: i64, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/level/grid.rs"]
mod tests;
