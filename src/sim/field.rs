//! Reflector field: the `(N+1) x N` grid of reflector cells
//!
//! Rows are 1..=N+1 (row boundaries a rail can strike), columns are 1..=N.
//! All coordinate arguments are signed so callers may address cells outside the grid;
//! out-of-range reads return [`Cell::Empty`] and out-of-range writes are ignored.

use rand::Rng;

use crate::consts::MAX_DIMENSION;

/// State of a single reflector cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Reflective,
}

impl Cell {
    #[inline]
    pub fn is_reflective(self) -> bool {
        self == Cell::Reflective
    }

    /// Pattern character for this state
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => '0',
            Cell::Reflective => '1',
        }
    }

    /// Anything other than `'0'` reads as a reflector
    pub fn from_char(c: char) -> Self {
        if c == '0' { Cell::Empty } else { Cell::Reflective }
    }
}

impl std::ops::Not for Cell {
    type Output = Cell;

    fn not(self) -> Cell {
        match self {
            Cell::Empty => Cell::Reflective,
            Cell::Reflective => Cell::Empty,
        }
    }
}

/// Which full row a fill targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillTarget {
    /// Row 1
    Top,
    /// Row N+1
    Bottom,
}

/// Reflector grid for `N` lanes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectorField {
    dimension: usize,
    /// Row-major, `(dimension + 1) * dimension` cells
    cells: Vec<Cell>,
}

/// Cell storage needed for `dimension` lanes, `None` past [`MAX_DIMENSION`]
fn cell_count(dimension: usize) -> Option<usize> {
    if dimension > MAX_DIMENSION {
        return None;
    }
    dimension.checked_add(1)?.checked_mul(dimension)
}

impl ReflectorField {
    /// Create an all-empty field. The dimension is clamped to `1..=MAX_DIMENSION`.
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.clamp(1, MAX_DIMENSION);
        Self {
            dimension,
            cells: vec![Cell::Empty; (dimension + 1) * dimension],
        }
    }

    /// Number of lanes (and columns)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of rows (`N + 1`)
    #[inline]
    pub fn rows(&self) -> usize {
        self.dimension + 1
    }

    fn index(&self, row: i64, col: i64) -> Option<usize> {
        let n = self.dimension as i64;
        if (1..=n + 1).contains(&row) && (1..=n).contains(&col) {
            Some(((row - 1) * n + (col - 1)) as usize)
        } else {
            None
        }
    }

    /// Read a cell; anything outside the grid is empty
    pub fn get(&self, row: i64, col: i64) -> Cell {
        self.index(row, col)
            .map(|i| self.cells[i])
            .unwrap_or_default()
    }

    /// Write a cell; silently ignored outside the grid
    pub fn set(&mut self, row: i64, col: i64, cell: Cell) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = cell;
        }
    }

    /// Flip a cell, returning its new state (None if out of range)
    pub fn toggle(&mut self, row: i64, col: i64) -> Option<Cell> {
        let i = self.index(row, col)?;
        self.cells[i] = !self.cells[i];
        Some(self.cells[i])
    }

    /// Reshape to `new_dimension` lanes, keeping the overlapping cells.
    ///
    /// Returns false (and leaves the field alone) for zero or past `MAX_DIMENSION`.
    pub fn resize(&mut self, new_dimension: usize) -> bool {
        if new_dimension == 0 {
            return false;
        }
        let Some(len) = cell_count(new_dimension) else {
            return false;
        };
        if new_dimension == self.dimension {
            return true;
        }

        let mut cells = vec![Cell::Empty; len];
        let keep_rows = self.rows().min(new_dimension + 1);
        let keep_cols = self.dimension.min(new_dimension);
        for row in 0..keep_rows {
            let src = row * self.dimension;
            let dst = row * new_dimension;
            cells[dst..dst + keep_cols].copy_from_slice(&self.cells[src..src + keep_cols]);
        }

        self.dimension = new_dimension;
        self.cells = cells;
        true
    }

    /// Make every cell of the top or bottom row reflective
    pub fn fill_row(&mut self, target: FillTarget) {
        let row = match target {
            FillTarget::Top => 1,
            FillTarget::Bottom => self.rows() as i64,
        };
        for col in 1..=self.dimension as i64 {
            self.set(row, col, Cell::Reflective);
        }
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Randomize every cell, each reflective with probability `density`
    pub fn scatter<R: Rng>(&mut self, rng: &mut R, density: f64) {
        let density = if density.is_finite() {
            density.clamp(0.0, 1.0)
        } else {
            0.0
        };
        for cell in &mut self.cells {
            *cell = if rng.random_bool(density) {
                Cell::Reflective
            } else {
                Cell::Empty
            };
        }
    }

    /// Iterate `(row, col)` of every reflective cell, top row first
    pub fn reflectors(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        let n = self.dimension;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_reflective())
            .map(move |(i, _)| ((i / n) as i64 + 1, (i % n) as i64 + 1))
    }

    /// Number of reflective cells
    pub fn reflector_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_reflective()).count()
    }

    /// Render as `N+1` lines of `N` characters (`1` = reflector), no trailing newline
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.rows() * (self.dimension + 1));
        for (i, row) in self.cells.chunks(self.dimension).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|c| c.as_char()));
        }
        out
    }

    /// Load a pattern, resizing to the width of its first line.
    ///
    /// Inputs with fewer than `count` lines start `count - lines` rows down.
    /// Cells falling outside the field are dropped. Returns
    /// false when the first line is empty.
    pub fn deserialize(&mut self, text: &str) -> bool {
        let lines: Vec<&str> = text
            .trim()
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let count = lines[0].chars().count();
        if !self.resize(count) {
            return false;
        }

        let row_offset = 1 + count.saturating_sub(lines.len()) as i64;
        for (i, line) in lines.iter().enumerate() {
            for (j, c) in line.chars().enumerate() {
                self.set(i as i64 + row_offset, j as i64 + 1, Cell::from_char(c));
            }
        }
        true
    }
}

impl Default for ReflectorField {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_DIMENSION)
    }
}
