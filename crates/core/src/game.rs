//! Game module - the orchestrator
//!
//! Ties together the board, the bag, the active and held pieces and the score.
//! The host drives gravity by calling [`Game::tick`] at a fixed interval (see
//! [`crate::driver::TickDriver`]) and forwards player input as [`Command`]s.
//! Every operation commits fully or not at all; once the game has ended all of
//! them become no-ops.

use std::time::Instant;

use tracing::{debug, trace};

use crate::bag::Bag;
use crate::board::{Board, LineClear};
use crate::config::{ConfigError, GameConfig};
use crate::scoring::{ScoreRecord, ScoringRule};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::tetrimino::Tetrimino;
use crate::types::{
    Command, Direction, PieceId, PieceKind, RotationKind, PREVIEW_LEN, UNTRACKED_PIECE,
};

/// Result of a lock-and-advance cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSummary {
    /// The piece that was locked
    pub piece: PieceId,
    pub lines_cleared: u32,
    /// Topmost cleared row (pre-clear coordinates)
    pub first_row: Option<usize>,
    pub points: u32,
}

/// What a gravity step or hard drop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happened (paused, ended, or not playable)
    Idle,
    /// The active piece fell one row
    Fell,
    /// The active piece locked and the next one spawned
    Locked(LockSummary),
    /// The next piece could not spawn
    GameOver,
}

/// Change notifications for rendering consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Spawned { piece: PieceId, kind: PieceKind },
    Moved,
    Rotated,
    Locked { piece: PieceId, lines: u32 },
    Swapped,
    Paused,
    Resumed,
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) scoring: ScoringRule,
    pub(crate) board: Board,
    pub(crate) bag: Bag,
    pub(crate) active: Option<Tetrimino>,
    pub(crate) held: Option<Tetrimino>,
    /// Set once a swap happened since the last lock
    pub(crate) swap_used: bool,
    pub(crate) score: ScoreRecord,
    pub(crate) paused: bool,
    pub(crate) ended: bool,
    /// Id handed to the next spawned piece
    pub(crate) next_id: PieceId,
    pub(crate) events: Vec<GameEvent>,
}

impl Game {
    /// Create a game and spawn its first piece
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let board = Board::new(config.width, config.visible_height, config.hidden_rows);
        let bag = Bag::new(config.seed);
        let mut game = Self {
            config,
            scoring: ScoringRule::default(),
            board,
            bag,
            active: None,
            held: None,
            swap_used: false,
            score: ScoreRecord::default(),
            paused: false,
            ended: false,
            next_id: UNTRACKED_PIECE + 1,
            events: Vec::new(),
        };

        if !game.spawn_next() {
            game.end();
        }
        Ok(game)
    }

    /// Default-sized game with the given seed
    pub fn with_seed(seed: u32) -> Self {
        let config = GameConfig {
            seed,
            ..GameConfig::default()
        };
        match Self::new(config) {
            Ok(game) => game,
            Err(e) => unreachable!("default config is valid: {e}"),
        }
    }

    pub fn set_scoring(&mut self, scoring: ScoringRule) {
        self.scoring = scoring;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bag(&self) -> &Bag {
        &self.bag
    }

    pub fn active(&self) -> Option<&Tetrimino> {
        self.active.as_ref()
    }

    pub fn held(&self) -> Option<&Tetrimino> {
        self.held.as_ref()
    }

    pub fn score(&self) -> ScoreRecord {
        self.score
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn swap_used(&self) -> bool {
        self.swap_used
    }

    /// Whether commands currently take effect
    pub fn playable(&self) -> bool {
        !self.ended && !self.paused
    }

    /// Upcoming kinds, next first
    pub fn next_queue(&self) -> Vec<PieceKind> {
        self.bag.preview(PREVIEW_LEN)
    }

    /// Anchor row the active piece would land on (for ghost rendering)
    pub fn ghost_y(&self) -> Option<i32> {
        let active = self.active.as_ref()?;
        if !self.config.trace.zenith {
            return Some(active.zenith(&self.board));
        }

        let started = Instant::now();
        let zenith = active.zenith(&self.board);
        trace!(elapsed_us = started.elapsed().as_micros() as u64, "zenith");
        Some(zenith)
    }

    /// Pull-based view for rendering
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.board.width(),
            height: self.board.height(),
            visible_height: self.board.visible_height(),
            board: self.board.to_rows(),
            active: self.active.as_ref().map(ActiveSnapshot::from),
            ghost_y: self.ghost_y(),
            held: self.held.as_ref().map(Tetrimino::kind),
            next_queue: self.next_queue(),
            score: self.score,
            swap_used: self.swap_used,
            paused: self.paused,
            ended: self.ended,
        }
    }

    /// Take every change notification recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn allocate_id(&mut self) -> PieceId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(UNTRACKED_PIECE + 1);
        id
    }

    /// Draw from the bag and spawn; false means the spawn cells are blocked
    fn spawn_next(&mut self) -> bool {
        let kind = self.bag.pick();
        let id = self.allocate_id();
        match Tetrimino::spawn(kind, id, &self.board) {
            Some(piece) => {
                self.active = Some(piece);
                self.events.push(GameEvent::Spawned { piece: id, kind });
                true
            }
            None => false,
        }
    }

    fn end(&mut self) {
        self.ended = true;
        self.paused = true;
        self.active = None;
        self.events.push(GameEvent::GameOver);
        debug!(
            points = self.score.points,
            lines = self.score.lines,
            "game over"
        );
    }

    /// One gravity step
    pub fn tick(&mut self) -> Outcome {
        if !self.playable() {
            return Outcome::Idle;
        }

        let started = self.config.trace.tick.then(Instant::now);
        let outcome = self.step_down();
        if let Some(started) = started {
            trace!(elapsed_us = started.elapsed().as_micros() as u64, ?outcome, "tick");
        }
        outcome
    }

    fn step_down(&mut self) -> Outcome {
        let Some(active) = self.active.as_mut() else {
            return Outcome::Idle;
        };

        if active.try_move(&self.board, 0, 1) {
            self.events.push(GameEvent::Moved);
            return Outcome::Fell;
        }

        self.lock_and_advance()
    }

    /// Lock the active piece, spawn the next one, then clear rows and score
    fn lock_and_advance(&mut self) -> Outcome {
        let Some(mut piece) = self.active.take() else {
            return Outcome::Idle;
        };

        piece.lock(&mut self.board);
        self.swap_used = false;

        if !self.spawn_next() {
            self.events.push(GameEvent::Locked {
                piece: piece.id(),
                lines: 0,
            });
            self.end();
            return Outcome::GameOver;
        }

        let cleared: LineClear = self.board.clear_full_rows();
        let lines = cleared.count() as u32;
        let points = self.scoring.apply(&mut self.score, lines);

        debug!(
            piece = piece.id(),
            kind = piece.kind().as_str(),
            lines,
            points,
            "locked"
        );
        self.events.push(GameEvent::Locked {
            piece: piece.id(),
            lines,
        });

        // Rows above a clear drop down into the spawn area
        let still_fits = self
            .active
            .as_mut()
            .is_some_and(|next| next.try_move(&self.board, 0, 0));
        if !still_fits {
            self.end();
            return Outcome::GameOver;
        }

        Outcome::Locked(LockSummary {
            piece: piece.id(),
            lines_cleared: lines,
            first_row: cleared.first_row(),
            points,
        })
    }

    /// Move the active piece; false if blocked or not playable
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if !self.playable() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        let moved = active.try_move(&self.board, dx, dy);
        if moved {
            self.events.push(GameEvent::Moved);
        }
        moved
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    /// Move down one row; never locks
    pub fn soft_drop(&mut self) -> bool {
        self.try_move(0, 1)
    }

    /// Rotate the active piece; false if blocked or not playable
    pub fn rotate(&mut self, kind: RotationKind, direction: Direction) -> bool {
        if !self.playable() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        let started = self.config.trace.rotate.then(Instant::now);
        let rotated = active.rotate(&self.board, kind, direction);
        if let Some(started) = started {
            trace!(
                elapsed_us = started.elapsed().as_micros() as u64,
                ?kind,
                ?direction,
                rotated,
                "rotate"
            );
        }

        if rotated {
            self.events.push(GameEvent::Rotated);
        }
        rotated
    }

    /// Drop the active piece to its zenith and lock it at once
    pub fn hard_drop(&mut self) -> Outcome {
        if !self.playable() {
            return Outcome::Idle;
        }
        let Some(active) = self.active.as_mut() else {
            return Outcome::Idle;
        };

        active.hard_drop(&self.board);
        self.lock_and_advance()
    }

    /// Swap the active piece with the held one
    ///
    /// With nothing held, the next bag piece comes in instead. The incoming
    /// piece takes the outgoing piece's anchor; if it doesn't fit there,
    /// nothing changes. Allowed once per drop cycle.
    pub fn swap_held(&mut self) -> bool {
        if !self.playable() || self.swap_used {
            return false;
        }
        let Some(outgoing) = self.active.as_ref() else {
            return false;
        };

        let (x, y) = (outgoing.x(), outgoing.y());
        let from_bag = self.held.is_none();
        let mut incoming = match &self.held {
            Some(held) => held.clone(),
            None => Tetrimino::new(self.bag.peek(), self.next_id),
        };
        incoming.place_at(x, y);
        incoming.activate();

        if !incoming.try_move(&self.board, 0, 0) {
            return false;
        }

        if from_bag {
            let _ = self.bag.pick();
            let _ = self.allocate_id();
        }

        let Some(mut outgoing) = self.active.replace(incoming) else {
            return false;
        };
        outgoing.stow();
        debug!(held = outgoing.kind().as_str(), from_bag, "swapped");
        self.held = Some(outgoing);
        self.swap_used = true;
        self.events.push(GameEvent::Swapped);
        true
    }

    /// Suspend ticks; false once the game has ended
    pub fn pause(&mut self) -> bool {
        if self.ended {
            return false;
        }
        if !self.paused {
            self.paused = true;
            self.events.push(GameEvent::Paused);
        }
        true
    }

    /// Resume ticks; false once the game has ended
    pub fn unpause(&mut self) -> bool {
        if self.ended {
            return false;
        }
        if self.paused {
            self.paused = false;
            self.events.push(GameEvent::Resumed);
        }
        true
    }

    /// Apply an input command
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::SoftDrop => self.soft_drop(),
            Command::HardDrop => self.hard_drop() != Outcome::Idle,
            Command::RotateCw(kind) => self.rotate(kind, Direction::Clockwise),
            Command::RotateCcw(kind) => self.rotate(kind, Direction::CounterClockwise),
            Command::Hold => self.swap_held(),
            Command::Pause => self.pause(),
            Command::Unpause => self.unpause(),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::with_seed(1)
    }
}
