//! Core game logic - pure, deterministic, and testable
//!
//! All of the rules and state of a falling-block puzzle game. There is no
//! terminal, networking or timer code here: the host calls [`Game::tick`] on
//! its own schedule (or through [`TickDriver`]), forwards input as
//! [`Command`](types::Command)s and reads [`GameSnapshot`]s back for rendering.
//! The same seed always produces the same game.
//!
//! # Module Structure
//!
//! - [`bag`]: two-queue 7-bag randomizer
//! - [`board`]: grid with a hidden spawn buffer, row clearing and the locked-piece table
//! - [`pieces`]: masks, spawn placement and SRS kick tables
//! - [`tetrimino`]: a single piece (move, rotate, zenith, lock)
//! - [`game`]: the orchestrator (gravity, lock-and-advance, hold, pause)
//! - [`scoring`]: pluggable points and level rules
//! - [`save`]: export/import of a complete game
//! - [`driver`]: fixed-interval tick scheduling
//!
//! # Example
//!
//! ```
//! use tetrimino_core::{Game, Outcome};
//! use tetrimino_types::{Command, RotationKind};
//!
//! let mut game = Game::with_seed(12345);
//!
//! game.apply(Command::MoveRight);
//! game.apply(Command::RotateCw(RotationKind::Super));
//! assert!(matches!(game.hard_drop(), Outcome::Locked(_)));
//!
//! let snapshot = game.snapshot();
//! assert_eq!(snapshot.board.len(), 22);
//! ```

pub mod bag;
pub mod board;
pub mod config;
pub mod driver;
pub mod game;
pub mod pieces;
pub mod save;
pub mod scoring;
pub mod snapshot;
pub mod tetrimino;

pub use tetrimino_types as types;

// Re-export commonly used types for convenience
pub use bag::{Bag, SimpleRng};
pub use board::{Board, LineClear, LockedPiece};
pub use config::{ConfigError, GameConfig, TraceToggles};
pub use driver::TickDriver;
pub use game::{Game, GameEvent, LockSummary, Outcome};
pub use pieces::Mask;
pub use save::{ImportError, SavedGame};
pub use scoring::{ScoreRecord, ScoringRule};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
pub use tetrimino::{PieceState, Tetrimino};
