//! Tetrimino module - a single piece and its movement rules
//!
//! A piece is a kind, a facing, an anchor (top-left of its mask in board
//! coordinates) and the mask itself. Every mutating operation checks the whole
//! candidate placement first and commits only if it is valid, so callers never
//! see a half-applied move or rotation.

use std::cell::Cell as Memo;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::board::{Board, LockedPiece};
use crate::pieces::{kick_offsets, spawn_column, spawn_mask, spawn_row, Mask};
use crate::types::{Block, Direction, Facing, PieceId, PieceKind, RotationKind};

/// Lifecycle of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceState {
    Falling,
    Solid,
}

/// A falling (or held) piece
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tetrimino {
    id: PieceId,
    kind: PieceKind,
    facing: Facing,
    x: i32,
    y: i32,
    mask: Mask,
    state: PieceState,
    active: bool,
    held: bool,
    /// Cached landing row; `None` once a horizontal move or rotation happens
    #[serde(skip)]
    zenith: Memo<Option<i32>>,
}

impl PartialEq for Tetrimino {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.facing == other.facing
            && self.x == other.x
            && self.y == other.y
            && self.mask == other.mask
            && self.state == other.state
            && self.active == other.active
            && self.held == other.held
    }
}

impl Eq for Tetrimino {}

impl Tetrimino {
    /// Create a falling piece in spawn orientation with its anchor at (0, 0)
    pub fn new(kind: PieceKind, id: PieceId) -> Self {
        Self {
            id,
            kind,
            facing: Facing::North,
            x: 0,
            y: 0,
            mask: spawn_mask(kind),
            state: PieceState::Falling,
            active: false,
            held: false,
            zenith: Memo::new(None),
        }
    }

    /// Place a new active piece at the top of the board, horizontally centered
    ///
    /// Returns `None` if any of its cells are blocked, which means game over.
    pub fn spawn(kind: PieceKind, id: PieceId, board: &Board) -> Option<Self> {
        let mut piece = Self::new(kind, id);
        piece.x = spawn_column(board.width(), piece.mask.size());
        piece.y = spawn_row(kind);
        piece.active = true;

        if !piece.fits(board, piece.x, piece.y, &piece.mask) {
            return None;
        }
        Some(piece)
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Absolute board coordinates of every occupied cell
    pub fn cells(&self) -> ArrayVec<(i32, i32), 16> {
        self.mask
            .cells()
            .into_iter()
            .map(|(c, r)| (self.x + c, self.y + r))
            .collect()
    }

    /// Check every occupied cell of `mask` anchored at (x, y)
    fn fits(&self, board: &Board, x: i32, y: i32, mask: &Mask) -> bool {
        mask.cells()
            .iter()
            .all(|&(c, r)| board.is_valid(x + c, y + r))
    }

    /// Check if the piece is resting on something
    pub fn is_grounded(&self, board: &Board) -> bool {
        !self.fits(board, self.x, self.y + 1, &self.mask)
    }

    /// Try to translate the piece
    ///
    /// On conflict nothing changes and `false` is returned. A committed
    /// horizontal move invalidates the cached zenith.
    pub fn try_move(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        if !self.fits(board, self.x + dx, self.y + dy, &self.mask) {
            return false;
        }

        self.x += dx;
        self.y += dy;
        if dx != 0 {
            self.invalidate_zenith();
        }
        true
    }

    /// Rotate the piece with the given algorithm
    pub fn rotate(&mut self, board: &Board, kind: RotationKind, direction: Direction) -> bool {
        match kind {
            RotationKind::Simple => self.rotate_simple(board, direction),
            RotationKind::Super => self.rotate_super(board, direction),
        }
    }

    /// Rotate the mask in place, without any translation
    pub fn rotate_simple(&mut self, board: &Board, direction: Direction) -> bool {
        let candidate = self.mask.rotated(direction);
        if !self.fits(board, self.x, self.y, &candidate) {
            return false;
        }

        self.mask = candidate;
        self.facing = self.facing.turned(direction);
        self.invalidate_zenith();
        true
    }

    /// Rotate using the SRS kick offsets
    ///
    /// Each offset is tried in order: the translated placement must be valid
    /// with the current mask, and the rotated mask must be valid there too.
    /// The first offset passing both is committed. The O piece always
    /// succeeds without changing.
    pub fn rotate_super(&mut self, board: &Board, direction: Direction) -> bool {
        let Some(offsets) = kick_offsets(self.kind, self.facing, direction) else {
            return true;
        };

        let candidate = self.mask.rotated(direction);
        for &(dx, dy) in offsets {
            let (x, y) = (self.x + dx, self.y + dy);
            if self.fits(board, x, y, &self.mask) && self.fits(board, x, y, &candidate) {
                self.x = x;
                self.y = y;
                self.mask = candidate;
                self.facing = self.facing.turned(direction);
                self.invalidate_zenith();
                return true;
            }
        }

        false
    }

    /// Landing row of the anchor if the piece were dropped straight down
    ///
    /// Cached until the next horizontal move or rotation.
    pub fn zenith(&self, board: &Board) -> i32 {
        if let Some(row) = self.zenith.get() {
            return row;
        }

        let mut row = self.y;
        while self.fits(board, self.x, row + 1, &self.mask) {
            row += 1;
        }

        self.zenith.set(Some(row));
        row
    }

    /// Rows the piece can still fall
    pub fn drop_distance(&self, board: &Board) -> i32 {
        self.zenith(board) - self.y
    }

    pub fn invalidate_zenith(&self) {
        self.zenith.set(None);
    }

    /// Move the piece straight to its zenith; returns the distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let distance = self.drop_distance(board);
        self.y += distance;
        distance
    }

    /// Solidify the piece into the board
    ///
    /// Every occupied cell is written as a solid block carrying this piece's
    /// id, and the piece is registered in the board's locked-piece table.
    ///
    /// # Panics
    ///
    /// Panics if the piece is already solid, or if one of its cells lands on a
    /// solid block. Both mean the game state is already corrupted.
    pub fn lock(&mut self, board: &mut Board) -> LockedPiece {
        assert!(
            self.state == PieceState::Falling,
            "piece {} locked twice",
            self.id
        );

        self.state = PieceState::Solid;
        self.active = false;

        let block = Block {
            kind: self.kind,
            solid: true,
            piece: self.id,
        };

        for (x, y) in self.cells() {
            match board.get(x, y) {
                None => {
                    tracing::warn!(piece = self.id, x, y, "skipping out-of-range cell on lock");
                }
                Some(Some(existing)) if existing.solid => {
                    panic!(
                        "piece {} locked onto solid cell ({}, {}) owned by piece {}",
                        self.id, x, y, existing.piece
                    );
                }
                Some(_) => {
                    board.set(x, y, Some(block));
                }
            }
        }

        let locked = LockedPiece {
            id: self.id,
            kind: self.kind,
            x: self.x,
            y: self.y,
            mask: self.mask,
        };
        board.register_piece(locked.clone());
        locked
    }

    /// Move the anchor without validation (swap placement)
    pub(crate) fn place_at(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.invalidate_zenith();
    }

    /// Turn this piece into the held piece: back to spawn orientation
    pub(crate) fn stow(&mut self) {
        self.mask = spawn_mask(self.kind);
        self.facing = Facing::North;
        self.active = false;
        self.held = true;
        self.invalidate_zenith();
    }

    /// Turn this piece into the active one
    pub(crate) fn activate(&mut self) {
        self.active = true;
        self.held = false;
        self.invalidate_zenith();
    }

    /// Check a deserialized piece for a usable mask
    pub(crate) fn is_well_formed(&self) -> bool {
        self.mask.is_well_formed() && !self.mask.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_positions() {
        let board = Board::default();

        let i = Tetrimino::spawn(PieceKind::I, 1, &board).unwrap();
        assert_eq!((i.x(), i.y()), (3, 0));
        assert_eq!(i.cells().as_slice(), &[(3, 1), (4, 1), (5, 1), (6, 1)]);

        let t = Tetrimino::spawn(PieceKind::T, 2, &board).unwrap();
        assert_eq!((t.x(), t.y()), (3, 1));
        assert_eq!(t.facing(), Facing::North);
        assert!(t.is_active());
        assert_eq!(t.state(), PieceState::Falling);
    }

    #[test]
    fn test_spawn_blocked() {
        let mut board = Board::default();
        board.set(4, 2, Some(Block::solid(PieceKind::Z)));
        assert!(Tetrimino::spawn(PieceKind::T, 1, &board).is_none());
        // The I piece only covers row 1
        assert!(Tetrimino::spawn(PieceKind::I, 1, &board).is_some());
    }

    #[test]
    fn test_move_rollback_on_wall() {
        let board = Board::default();
        let mut piece = Tetrimino::spawn(PieceKind::J, 1, &board).unwrap();

        let mut moved = 0;
        while piece.try_move(&board, -1, 0) {
            moved += 1;
        }
        assert_eq!(moved, 3);
        assert_eq!(piece.x(), 0);

        let before = piece.clone();
        assert!(!piece.try_move(&board, -1, 0));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_zenith_memo_invalidated_by_horizontal_move() {
        let mut board = Board::default();
        // A tower under column 3 only
        for y in 10..22 {
            board.set(3, y, Some(Block::solid(PieceKind::I)));
        }
        let mut piece = Tetrimino::spawn(PieceKind::J, 1, &board).unwrap();

        let first = piece.zenith(&board);
        assert_eq!(first, 8);

        assert!(piece.try_move(&board, 1, 0));
        assert_eq!(piece.zenith(&board), 20);
    }

    #[test]
    fn test_zenith_kept_on_vertical_move() {
        let board = Board::default();
        let mut piece = Tetrimino::spawn(PieceKind::T, 1, &board).unwrap();
        let zenith = piece.zenith(&board);
        assert!(piece.try_move(&board, 0, 1));
        assert_eq!(piece.zenith(&board), zenith);
        assert_eq!(piece.drop_distance(&board), zenith - piece.y());
    }

    #[test]
    fn test_zenith_does_not_move_piece() {
        let board = Board::default();
        let piece = Tetrimino::spawn(PieceKind::S, 1, &board).unwrap();
        let y = piece.y();
        let _ = piece.zenith(&board);
        assert_eq!(piece.y(), y);
    }

    #[test]
    fn test_rotate_simple_updates_facing() {
        let board = Board::default();
        let mut piece = Tetrimino::spawn(PieceKind::T, 1, &board).unwrap();
        assert!(piece.rotate_simple(&board, Direction::Clockwise));
        assert_eq!(piece.facing(), Facing::East);
        assert_eq!(
            *piece.mask(),
            Mask::from_rows(&[".#.", ".##", ".#."]).unwrap()
        );
    }

    #[test]
    #[should_panic(expected = "locked twice")]
    fn test_lock_twice_panics() {
        let mut board = Board::default();
        let mut piece = Tetrimino::spawn(PieceKind::O, 1, &board).unwrap();
        piece.lock(&mut board);
        piece.lock(&mut board);
    }

    #[test]
    #[should_panic(expected = "locked onto solid cell")]
    fn test_lock_onto_solid_panics() {
        let mut board = Board::default();
        let mut piece = Tetrimino::spawn(PieceKind::O, 1, &board).unwrap();
        let (x, y) = piece.cells()[0];
        board.set(x, y, Some(Block::solid(PieceKind::L)));
        piece.lock(&mut board);
    }

    #[test]
    fn test_lock_writes_cells_and_registers() {
        let mut board = Board::default();
        let mut piece = Tetrimino::spawn(PieceKind::L, 9, &board).unwrap();
        piece.hard_drop(&board);
        let locked = piece.lock(&mut board);

        assert_eq!(piece.state(), PieceState::Solid);
        assert!(!piece.is_active());
        assert_eq!(board.occupied_count(), 4);
        for (x, y) in piece.cells() {
            let block = board.get(x, y).unwrap().unwrap();
            assert!(block.solid);
            assert_eq!(block.piece, 9);
            assert_eq!(block.kind, PieceKind::L);
        }
        assert_eq!(board.locked_piece(9), Some(&locked));
    }

    #[test]
    fn test_stow_resets_orientation() {
        let board = Board::default();
        let mut piece = Tetrimino::spawn(PieceKind::S, 1, &board).unwrap();
        assert!(piece.rotate_super(&board, Direction::Clockwise));
        piece.stow();
        assert_eq!(piece.facing(), Facing::North);
        assert_eq!(*piece.mask(), spawn_mask(PieceKind::S));
        assert!(piece.is_held());
        assert!(!piece.is_active());
    }
}
