//! Save module - export and import of a complete game
//!
//! [`SavedGame`] is a plain serde struct holding every piece of state needed
//! to resume: config, bag queues and RNG, board cells, the locked-piece table,
//! active and held pieces, score and flags. Exporting, importing and exporting
//! again yields an identical value. Import validates everything and rejects
//! state that would break the board or bag invariants.
//!
//! The scoring rule is not part of the save; an imported game uses the
//! default rule until [`Game::set_scoring`] is called.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bag::{Bag, SimpleRng};
use crate::board::{Board, LockedPiece};
use crate::config::{ConfigError, GameConfig};
use crate::game::Game;
use crate::scoring::{ScoreRecord, ScoringRule};
use crate::tetrimino::{PieceState, Tetrimino};
use crate::types::{Cell, PieceId, PieceKind, UNTRACKED_PIECE};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("board rows don't match a {width}x{height} grid")]
    BoardShape { width: u8, height: u16 },
    #[error("bag queues are inconsistent")]
    Bag,
    #[error("piece {0} is malformed")]
    MalformedPiece(PieceId),
    #[error("piece {0} doesn't match the board cells or reuses an id")]
    PieceMismatch(PieceId),
    #[error("a running game needs an active piece")]
    MissingActive,
    #[error("next piece id {next} is not above used id {used}")]
    StaleId { next: PieceId, used: PieceId },
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializable snapshot of a whole game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub config: GameConfig,
    pub primary: Vec<PieceKind>,
    pub secondary: Vec<PieceKind>,
    pub rng: SimpleRng,
    /// Full simulated grid, top row first
    pub rows: Vec<Vec<Cell>>,
    pub pieces: Vec<LockedPiece>,
    pub active: Option<Tetrimino>,
    pub held: Option<Tetrimino>,
    pub score: ScoreRecord,
    pub swap_used: bool,
    pub paused: bool,
    pub ended: bool,
    pub next_id: PieceId,
}

impl SavedGame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Game {
    /// Capture the complete game state
    pub fn export(&self) -> SavedGame {
        SavedGame {
            config: self.config.clone(),
            primary: self.bag.primary().iter().copied().collect(),
            secondary: self.bag.secondary().iter().copied().collect(),
            rng: self.bag.rng().clone(),
            rows: self.board.to_rows(),
            pieces: self.board.locked_pieces().cloned().collect(),
            active: self.active.clone(),
            held: self.held.clone(),
            score: self.score,
            swap_used: self.swap_used,
            paused: self.paused,
            ended: self.ended,
            next_id: self.next_id,
        }
    }

    /// Rebuild a game from a save, validating it fully
    pub fn import(saved: SavedGame) -> Result<Self, ImportError> {
        let SavedGame {
            config,
            primary,
            secondary,
            rng,
            rows,
            pieces,
            active,
            held,
            score,
            swap_used,
            paused,
            ended,
            next_id,
        } = saved;

        config.validate()?;

        let height = config.simulated_height();
        if rows.len() != height as usize {
            return Err(ImportError::BoardShape {
                width: config.width,
                height,
            });
        }
        let board = Board::from_rows(config.width, config.visible_height, rows, pieces).ok_or(
            ImportError::BoardShape {
                width: config.width,
                height,
            },
        )?;
        check_locked_pieces(&board)?;

        let bag = Bag::from_parts(primary, secondary, rng).ok_or(ImportError::Bag)?;

        let mut ids: BTreeSet<PieceId> = board.locked_pieces().map(|p| p.id).collect();

        if let Some(piece) = &active {
            check_active(piece, &board)?;
            claim_id(&mut ids, piece.id())?;
        } else if !ended {
            return Err(ImportError::MissingActive);
        }

        if let Some(piece) = &held {
            check_held(piece)?;
            claim_id(&mut ids, piece.id())?;
        }

        let used = ids.last().copied().unwrap_or(UNTRACKED_PIECE);

        if next_id <= used {
            return Err(ImportError::StaleId {
                next: next_id,
                used,
            });
        }

        Ok(Self {
            config,
            scoring: ScoringRule::default(),
            board,
            bag,
            active,
            held,
            swap_used,
            score,
            paused: paused || ended,
            ended,
            next_id,
            events: Vec::new(),
        })
    }
}

/// Every locked piece must own exactly the solid cells its mask projects
fn check_locked_pieces(board: &Board) -> Result<(), ImportError> {
    let mut owned = 0;
    for piece in board.locked_pieces() {
        if piece.id == UNTRACKED_PIECE || !piece.mask.is_well_formed() || piece.mask.is_empty() {
            return Err(ImportError::MalformedPiece(piece.id));
        }
        for (x, y) in piece.cells() {
            match board.get(x, y) {
                Some(Some(block)) if block.solid && block.piece == piece.id => owned += 1,
                _ => return Err(ImportError::PieceMismatch(piece.id)),
            }
        }
    }

    let tracked = board
        .cells()
        .iter()
        .flatten()
        .filter(|block| block.piece != UNTRACKED_PIECE)
        .count();
    if tracked != owned {
        let stray = board
            .cells()
            .iter()
            .flatten()
            .find(|block| {
                block.piece != UNTRACKED_PIECE && board.locked_piece(block.piece).is_none()
            })
            .map_or(UNTRACKED_PIECE, |block| block.piece);
        return Err(ImportError::PieceMismatch(stray));
    }
    Ok(())
}

fn check_active(piece: &Tetrimino, board: &Board) -> Result<(), ImportError> {
    if !piece.is_well_formed()
        || !piece.is_active()
        || piece.is_held()
        || piece.state() != PieceState::Falling
        || piece.id() == UNTRACKED_PIECE
    {
        return Err(ImportError::MalformedPiece(piece.id()));
    }

    let mut placed = piece.clone();
    if !placed.try_move(board, 0, 0) {
        return Err(ImportError::PieceMismatch(piece.id()));
    }
    Ok(())
}

/// A held piece is a falling piece parked off the board
fn check_held(piece: &Tetrimino) -> Result<(), ImportError> {
    if !piece.is_well_formed()
        || !piece.is_held()
        || piece.is_active()
        || piece.state() != PieceState::Falling
        || piece.id() == UNTRACKED_PIECE
    {
        return Err(ImportError::MalformedPiece(piece.id()));
    }
    Ok(())
}

/// Piece ids are unique across the locked table and the live pieces
fn claim_id(ids: &mut BTreeSet<PieceId>, id: PieceId) -> Result<(), ImportError> {
    if !ids.insert(id) {
        return Err(ImportError::PieceMismatch(id));
    }
    Ok(())
}
