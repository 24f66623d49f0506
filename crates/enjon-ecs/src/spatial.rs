//! Uniform spatial hash grid for collision broad-phase
//!
//! The grid covers a fixed cartesian rectangle. Every entity is inserted into
//! each cell its AABB overlaps, so two truly overlapping boxes always share a
//! cell. Coordinates outside the covered area clamp to the border cells.

use enjon_core::Aabb;
use glam::Vec2;

use crate::entity::EntityId;
use crate::error::EcsError;

/// Inclusive range of cells overlapped by a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min_col: usize,
    pub max_col: usize,
    pub min_row: usize,
    pub max_row: usize,
}

impl CellRange {
    pub fn cell_count(&self) -> usize {
        (self.max_col - self.min_col + 1) * (self.max_row - self.min_row + 1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub entities: Vec<EntityId>,
    /// Pathing cost written by whatever was last registered here
    pub obstruction: f32,
}

pub struct SpatialHash {
    origin: Vec2,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl SpatialHash {
    /// Allocate `ceil(width / cell_size) x ceil(height / cell_size)` cells starting at `origin`.
    pub fn new(origin: Vec2, width: f32, height: f32, cell_size: f32) -> Result<Self, EcsError> {
        if !(width > 0.0 && height > 0.0 && cell_size > 0.0) {
            return Err(EcsError::InvalidGrid {
                width,
                height,
                cell_size,
            });
        }
        let cols = (width / cell_size).ceil() as usize;
        let rows = (height / cell_size).ceil() as usize;
        let count = cols
            .checked_mul(rows)
            .ok_or(EcsError::GridAllocation { cells: usize::MAX })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| EcsError::GridAllocation { cells: count })?;
        cells.resize_with(count, Cell::default);

        Ok(Self {
            origin,
            cell_size,
            cols,
            rows,
            cells,
        })
    }

    /// Grid spanning an AABB of world space.
    pub fn covering(bounds: Aabb, cell_size: f32) -> Result<Self, EcsError> {
        let size = bounds.size();
        Self::new(bounds.min, size.x, size.y, cell_size)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Empty every cell, keeping their allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.entities.clear();
            cell.obstruction = 0.0;
        }
    }

    fn col_of(&self, x: f32) -> usize {
        let col = ((x - self.origin.x) / self.cell_size).floor();
        (col.max(0.0) as usize).min(self.cols - 1)
    }

    fn row_of(&self, y: f32) -> usize {
        let row = ((y - self.origin.y) / self.cell_size).floor();
        (row.max(0.0) as usize).min(self.rows - 1)
    }

    /// Cells overlapped by `aabb`, clamped to the grid.
    pub fn cell_range(&self, aabb: &Aabb) -> CellRange {
        let a = self.col_of(aabb.min.x);
        let b = self.col_of(aabb.max.x);
        let c = self.row_of(aabb.min.y);
        let d = self.row_of(aabb.max.y);
        CellRange {
            min_col: a.min(b),
            max_col: a.max(b),
            min_row: c.min(d),
            max_row: c.max(d),
        }
    }

    /// Register `id` in every cell `aabb` overlaps and return that range.
    pub fn find_cells(&mut self, id: EntityId, aabb: &Aabb, obstruction: f32) -> CellRange {
        let range = self.cell_range(aabb);
        for row in range.min_row..=range.max_row {
            for col in range.min_col..=range.max_col {
                let cell = &mut self.cells[row * self.cols + col];
                if !cell.entities.contains(&id) {
                    cell.entities.push(id);
                }
                cell.obstruction = obstruction;
            }
        }
        range
    }

    /// Union of every entity sharing a cell with `aabb`, excluding `id`.
    ///
    /// Each neighbour appears once, in first-seen cell order.
    pub fn find_cell(&self, id: EntityId, aabb: &Aabb) -> Vec<EntityId> {
        let range = self.cell_range(aabb);
        let mut neighbours = Vec::new();
        for row in range.min_row..=range.max_row {
            for col in range.min_col..=range.max_col {
                for &other in &self.cells[row * self.cols + col].entities {
                    if other != id && !neighbours.contains(&other) {
                        neighbours.push(other);
                    }
                }
            }
        }
        neighbours
    }
}
