use serde::{Deserialize, Serialize};

use crate::pieces::Mask;
use crate::scoring::ScoreRecord;
use crate::tetrimino::Tetrimino;
use crate::types::{Cell, Facing, PieceId, PieceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub id: PieceId,
    pub kind: PieceKind,
    pub facing: Facing,
    pub x: i32,
    pub y: i32,
    pub mask: Mask,
}

impl From<&Tetrimino> for ActiveSnapshot {
    fn from(value: &Tetrimino) -> Self {
        Self {
            id: value.id(),
            kind: value.kind(),
            facing: value.facing(),
            x: value.x(),
            y: value.y(),
            mask: *value.mask(),
        }
    }
}

/// Everything a renderer needs after a state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub width: u8,
    pub height: u8,
    pub visible_height: u8,
    /// Full simulated grid, top row first
    pub board: Vec<Vec<Cell>>,
    pub active: Option<ActiveSnapshot>,
    /// Anchor row the active piece would land on
    pub ghost_y: Option<i32>,
    pub held: Option<PieceKind>,
    pub next_queue: Vec<PieceKind>,
    pub score: ScoreRecord,
    pub swap_used: bool,
    pub paused: bool,
    pub ended: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.ended && !self.paused
    }

    /// Rows below the hidden buffer
    pub fn visible_rows(&self) -> &[Vec<Cell>] {
        let hidden = (self.height - self.visible_height) as usize;
        &self.board[hidden..]
    }
}
