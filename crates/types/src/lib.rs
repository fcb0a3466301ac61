//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data (serde-derivable for save files), making them
//! usable in any context (core logic, rendering consumers, input front ends).
//!
//! # Board Dimensions
//!
//! The default playfield is 10 columns wide with 20 visible rows. Two extra
//! hidden rows sit above the visible area, so the simulated height is 22.
//! Row 0 is the top (hidden) row.
//!
//! # Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_TICK_MS` | 200 | Gravity interval of the fixed-rate tick driver |
//! | `MAX_CATCH_UP_TICKS` | 4 | Overdue ticks run per driver call before dropping backlog |
//!
//! # Examples
//!
//! ```
//! use tetrimino_types::{Command, Facing, PieceKind, RotationKind};
//!
//! // Parse from string (case-insensitive)
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//!
//! // Rotate
//! assert_eq!(Facing::North.rotate_cw(), Facing::East);
//!
//! // Parse commands
//! assert_eq!(Command::from_str("moveLeft"), Some(Command::MoveLeft));
//! assert_eq!(
//!     Command::from_str("rotateCwSimple"),
//!     Some(Command::RotateCw(RotationKind::Simple))
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const DEFAULT_WIDTH: u8 = 10;

/// Default number of visible rows
pub const DEFAULT_VISIBLE_HEIGHT: u8 = 20;

/// Default number of hidden buffer rows above the visible area
pub const DEFAULT_HIDDEN_ROWS: u8 = 2;

/// Default gravity interval in milliseconds
pub const DEFAULT_TICK_MS: u32 = 200;

/// Maximum number of overdue ticks the driver runs in one call
pub const MAX_CATCH_UP_TICKS: u32 = 4;

/// Number of kinds in one bag
pub const BAG_SIZE: usize = 7;

/// Number of upcoming pieces exposed for preview
pub const PREVIEW_LEN: usize = 5;

/// Line clear scoring table (Classic Nintendo scoring)
///
/// Base points for clearing N lines, multiplied by the current level.
/// Clears of more than 4 rows at once are scored as 4.
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Number of cleared lines per level step in the classic level curve
pub const LINES_PER_LEVEL: u32 = 10;

/// Identifier linking board cells to the piece that produced them
pub type PieceId = u32;

/// Piece id used for cells that were not produced by a tracked piece
pub const UNTRACKED_PIECE: PieceId = 0;

/// The seven tetrimino piece kinds
///
/// - **I**: horizontal bar, 4x4 mask
/// - **O**: 2x2 square, 4x4 mask (rotation invariant)
/// - **T**, **S**, **Z**, **J**, **L**: 3x3 masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every kind, in a fixed order (the unshuffled bag)
    pub const ALL: [PieceKind; BAG_SIZE] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrimino_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// Facing of a piece, one of the four cardinal rotation states
///
/// The cycle goes: North → East → South → West → North.
/// Pieces spawn facing North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    North,
    East,
    South,
    West,
}

impl Facing {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrimino_types::Facing;
    ///
    /// assert_eq!(Facing::North.rotate_cw(), Facing::East);
    /// assert_eq!(Facing::West.rotate_cw(), Facing::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Facing::North => Facing::East,
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrimino_types::Facing;
    ///
    /// assert_eq!(Facing::North.rotate_ccw(), Facing::West);
    /// assert_eq!(Facing::East.rotate_ccw(), Facing::North);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }

    /// Facing reached by turning once in `direction`
    pub fn turned(&self, direction: Direction) -> Self {
        match direction {
            Direction::Clockwise => self.rotate_cw(),
            Direction::CounterClockwise => self.rotate_ccw(),
        }
    }

    /// Parse facing from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "north" | "n", "east" | "e", "south" | "s", "west" | "w"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Facing::North),
            "east" | "e" => Some(Facing::East),
            "south" | "s" => Some(Facing::South),
            "west" | "w" => Some(Facing::West),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::North => "north",
            Facing::East => "east",
            Facing::South => "south",
            Facing::West => "west",
        }
    }
}

/// Turning direction for a rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

/// Rotation algorithm
///
/// - **Simple**: rotate the mask in place, no translation
/// - **Super**: try the wall-kick offsets in order, rotating at each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RotationKind {
    Simple,
    #[default]
    Super,
}

/// Commands an input front end can issue against a game
///
/// Each one maps to exactly one game operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down
    SoftDrop,
    /// Drop piece to its zenith and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw(RotationKind),
    /// Rotate piece 90° counter-clockwise
    RotateCcw(RotationKind),
    /// Swap the active piece with the held one
    Hold,
    /// Suspend ticks
    Pause,
    /// Resume ticks
    Unpause,
}

impl Command {
    /// Parse a command from string
    ///
    /// Bare rotation names use super rotation; a `Simple` suffix selects
    /// simple rotation.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrimino_types::{Command, RotationKind};
    ///
    /// assert_eq!(Command::from_str("hardDrop"), Some(Command::HardDrop));
    /// assert_eq!(Command::from_str("rotateCcw"), Some(Command::RotateCcw(RotationKind::Super)));
    /// assert_eq!(Command::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Command::MoveLeft),
            "moveright" => Some(Command::MoveRight),
            "softdrop" => Some(Command::SoftDrop),
            "harddrop" => Some(Command::HardDrop),
            "rotatecw" | "rotatecwsuper" => Some(Command::RotateCw(RotationKind::Super)),
            "rotatecwsimple" => Some(Command::RotateCw(RotationKind::Simple)),
            "rotateccw" | "rotateccwsuper" => Some(Command::RotateCcw(RotationKind::Super)),
            "rotateccwsimple" => Some(Command::RotateCcw(RotationKind::Simple)),
            "hold" => Some(Command::Hold),
            "pause" => Some(Command::Pause),
            "unpause" => Some(Command::Unpause),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::SoftDrop => "softDrop",
            Command::HardDrop => "hardDrop",
            Command::RotateCw(RotationKind::Super) => "rotateCw",
            Command::RotateCw(RotationKind::Simple) => "rotateCwSimple",
            Command::RotateCcw(RotationKind::Super) => "rotateCcw",
            Command::RotateCcw(RotationKind::Simple) => "rotateCcwSimple",
            Command::Hold => "hold",
            Command::Pause => "pause",
            Command::Unpause => "unpause",
        }
    }
}

/// Contents of an occupied board cell
///
/// Only the lightweight (kind, solid) pair plus the owning piece id is
/// stored. The id resolves through the board's locked-piece table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub kind: PieceKind,
    pub solid: bool,
    pub piece: PieceId,
}

impl Block {
    /// A solid block not linked to any tracked piece
    pub fn solid(kind: PieceKind) -> Self {
        Self {
            kind,
            solid: true,
            piece: UNTRACKED_PIECE,
        }
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Block)`: Cell occupied by the given block
pub type Cell = Option<Block>;
