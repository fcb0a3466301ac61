//! Board module - manages the game grid
//!
//! The board is `width` columns by `height` simulated rows, where the top
//! `height - visible_height` rows form a hidden spawn buffer.
//! Uses a flat array (row-major, `y * width + x`) for cache locality.
//! Coordinates: (x, y) with x growing rightwards and y growing downwards; row 0
//! is the top hidden row.
//!
//! Besides cells, the board keeps a table of locked pieces keyed by
//! [`PieceId`]. Cells carry only the id, and the table is what line clears
//! consult to keep each piece's anchor and mask in step with the grid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pieces::Mask;
use crate::types::{Block, Cell, PieceId, PieceKind};

/// A piece whose cells have been copied into the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPiece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
    pub mask: Mask,
}

impl LockedPiece {
    /// Absolute board coordinates of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.mask
            .cells()
            .into_iter()
            .map(move |(c, r)| (self.x + c, self.y + r))
    }

    fn block(&self) -> Block {
        Block {
            kind: self.kind,
            solid: true,
            piece: self.id,
        }
    }
}

/// Result of [`Board::clear_full_rows`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClear {
    /// Indices of the removed rows (pre-clear coordinates), top to bottom
    pub rows: Vec<usize>,
}

impl LineClear {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Topmost cleared row, if any
    pub fn first_row(&self) -> Option<usize> {
        self.rows.first().copied()
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u8,
    height: u8,
    visible_height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
    pieces: BTreeMap<PieceId, LockedPiece>,
}

impl Board {
    /// Create a new empty board
    ///
    /// `hidden_rows` are added above the `visible_height` visible rows.
    pub fn new(width: u8, visible_height: u8, hidden_rows: u8) -> Self {
        let height = visible_height.saturating_add(hidden_rows);
        Self {
            width,
            height,
            visible_height,
            cells: vec![None; width as usize * height as usize],
            pieces: BTreeMap::new(),
        }
    }

    /// Rebuild a board from rows of cells and a locked-piece table
    ///
    /// Returns `None` if the rows don't form a `width` x `height` grid.
    pub fn from_rows(
        width: u8,
        visible_height: u8,
        rows: Vec<Vec<Cell>>,
        pieces: Vec<LockedPiece>,
    ) -> Option<Self> {
        let height = u8::try_from(rows.len()).ok()?;
        if height < visible_height || rows.iter().any(|row| row.len() != width as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            visible_height,
            cells: rows.into_iter().flatten().collect(),
            pieces: pieces.into_iter().map(|p| (p.id, p)).collect(),
        })
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.is_out_of_bounds(x, y) {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get width of the board
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Get simulated height (hidden buffer included)
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get number of visible rows
    pub fn visible_height(&self) -> u8 {
        self.visible_height
    }

    /// Number of hidden rows above the visible area
    pub fn hidden_rows(&self) -> u8 {
        self.height - self.visible_height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if a piece cell may occupy (x, y): in bounds and not solid
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        match self.get(x, y) {
            Some(None) => true,
            Some(Some(block)) => !block.solid,
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if position is out of bounds
    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32
    }

    /// Check if a row is completely filled with solid blocks
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        self.row(y)
            .iter()
            .all(|cell| matches!(cell, Some(block) if block.solid))
    }

    /// Cells of row `y`
    ///
    /// Panics if `y` is out of range.
    pub fn row(&self, y: usize) -> &[Cell] {
        let width = self.width as usize;
        let start = y * width;
        &self.cells[start..start + width]
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width as usize)
    }

    /// Rows as owned vectors, top to bottom
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|row| row.to_vec()).collect()
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Clear all full rows
    ///
    /// Full rows are removed and the same number of empty rows appear at the
    /// top; the remaining rows keep their relative order, so the grid always
    /// has `height` rows. Surviving rows are compacted in place with two
    /// pointers; the cleared indices are returned in the [`LineClear`].
    /// Locked pieces touched by the clear are adjusted afterwards, see
    /// [`Board::adjust_locked_pieces`].
    pub fn clear_full_rows(&mut self) -> LineClear {
        let rows: Vec<usize> = (0..self.height as usize)
            .filter(|&y| self.is_row_full(y))
            .collect();
        if rows.is_empty() {
            return LineClear::default();
        }

        let width = self.width as usize;
        let mut write_y = self.height as usize;

        // Scan from bottom to top
        for read_y in (0..self.height as usize).rev() {
            if rows.binary_search(&read_y).is_ok() {
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                // copy_within handles the overlap
                let src_start = read_y * width;
                self.cells
                    .copy_within(src_start..src_start + width, write_y * width);
            }
        }

        // Clear the remaining rows at the top
        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        self.adjust_locked_pieces(&rows);

        LineClear { rows }
    }

    /// Bring the locked-piece table in line with a completed compaction
    ///
    /// For a piece spanning rows `y..y + size`:
    /// - cleared rows inside that span are cut from its mask, with empty rows
    ///   pushed in at the top so the mask keeps its size;
    /// - its anchor moves down by the number of cleared rows below the span.
    ///
    /// A piece entirely below the cleared rows is therefore untouched and one
    /// entirely above them shifts by the cleared count. Pieces left without
    /// cells are dropped. Straddling pieces are re-projected into the grid.
    fn adjust_locked_pieces(&mut self, cleared: &[usize]) {
        let mut emptied = Vec::new();
        let mut reproject = Vec::new();

        for piece in self.pieces.values_mut() {
            let size = piece.mask.size() as i32;
            let top = piece.y;
            let bottom = piece.y + size - 1;

            let below = cleared.iter().filter(|&&r| r as i32 > bottom).count() as i32;
            let inside: Vec<usize> = cleared
                .iter()
                .map(|&r| r as i32)
                .filter(|&r| r >= top && r <= bottom)
                .map(|r| (r - top) as usize)
                .collect();

            if inside.is_empty() {
                piece.y += below;
                continue;
            }

            piece.mask = piece.mask.without_rows(&inside);
            piece.y += below;

            if piece.mask.is_empty() {
                emptied.push(piece.id);
            } else {
                reproject.push(piece.id);
            }
        }

        for id in emptied {
            self.pieces.remove(&id);
        }

        for id in reproject {
            let Some(piece) = self.pieces.get(&id).cloned() else {
                continue;
            };
            let block = piece.block();
            for (x, y) in piece.cells() {
                debug_assert!(
                    matches!(self.get(x, y), Some(Some(b)) if b.piece == id),
                    "piece {} lost cell ({}, {}) during compaction",
                    id,
                    x,
                    y
                );
                self.set(x, y, Some(block));
            }
        }
    }

    /// Record a locked piece so later clears can adjust it
    pub fn register_piece(&mut self, piece: LockedPiece) {
        self.pieces.insert(piece.id, piece);
    }

    /// Look up a locked piece by id
    pub fn locked_piece(&self, id: PieceId) -> Option<&LockedPiece> {
        self.pieces.get(&id)
    }

    /// All locked pieces, ordered by id
    pub fn locked_pieces(&self) -> impl Iterator<Item = &LockedPiece> {
        self.pieces.values()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
        self.pieces.clear();
    }
}

impl Default for Board {
    fn default() -> Self {
        use crate::types::{DEFAULT_HIDDEN_ROWS, DEFAULT_VISIBLE_HEIGHT, DEFAULT_WIDTH};

        Self::new(DEFAULT_WIDTH, DEFAULT_VISIBLE_HEIGHT, DEFAULT_HIDDEN_ROWS)
    }
}
