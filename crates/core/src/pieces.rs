//! Pieces module - local occupancy masks and SRS wall-kick tables
//!
//! Every kind is an entry in a table of square masks (3x3 or 4x4). Rotation
//! operates on the mask itself, so no kind needs special-case rotation code;
//! the kind only selects which kick table applies.
//! Reference: https://tetris.wiki/SRS

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::types::{Direction, Facing, PieceKind};

/// Largest mask edge length (the I and O masks)
pub const MAX_MASK_SIZE: usize = 4;

/// Square occupancy matrix in piece-local coordinates
///
/// `cells[row][col]`; only the top-left `size` x `size` block is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mask {
    size: u8,
    cells: [[bool; MAX_MASK_SIZE]; MAX_MASK_SIZE],
}

impl Mask {
    /// Build a 3x3 mask from rows of 0/1
    const fn three(rows: [[u8; 3]; 3]) -> Self {
        let mut cells = [[false; MAX_MASK_SIZE]; MAX_MASK_SIZE];
        let mut r = 0;
        while r < 3 {
            let mut c = 0;
            while c < 3 {
                cells[r][c] = rows[r][c] == 1;
                c += 1;
            }
            r += 1;
        }
        Self { size: 3, cells }
    }

    /// Build a 4x4 mask from rows of 0/1
    const fn four(rows: [[u8; 4]; 4]) -> Self {
        let mut cells = [[false; MAX_MASK_SIZE]; MAX_MASK_SIZE];
        let mut r = 0;
        while r < 4 {
            let mut c = 0;
            while c < 4 {
                cells[r][c] = rows[r][c] == 1;
                c += 1;
            }
            r += 1;
        }
        Self { size: 4, cells }
    }

    /// Build a mask from string rows (`#` = occupied), mostly for tests
    ///
    /// Returns `None` unless there are 3 or 4 rows, each as long as the row count.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let size = rows.len();
        if size != 3 && size != 4 {
            return None;
        }
        let mut cells = [[false; MAX_MASK_SIZE]; MAX_MASK_SIZE];
        for (r, row) in rows.iter().enumerate() {
            if row.chars().count() != size {
                return None;
            }
            for (c, ch) in row.chars().enumerate() {
                cells[r][c] = ch == '#';
            }
        }
        Some(Self {
            size: size as u8,
            cells,
        })
    }

    /// Edge length (3 or 4)
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Whether local cell (col, row) is occupied; false outside the mask
    pub fn get(&self, col: usize, row: usize) -> bool {
        col < self.size() && row < self.size() && self.cells[row][col]
    }

    /// Occupied local cells as (col, row)
    pub fn cells(&self) -> ArrayVec<(i32, i32), 16> {
        let n = self.size();
        let mut out = ArrayVec::new();
        for row in 0..n {
            for col in 0..n {
                if self.cells[row][col] {
                    out.push((col as i32, row as i32));
                }
            }
        }
        out
    }

    /// Number of occupied cells
    pub fn count(&self) -> usize {
        self.cells().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Mask rotated 90° in `direction`
    pub fn rotated(&self, direction: Direction) -> Self {
        let n = self.size();
        let mut cells = [[false; MAX_MASK_SIZE]; MAX_MASK_SIZE];
        for row in 0..n {
            for col in 0..n {
                cells[row][col] = match direction {
                    Direction::Clockwise => self.cells[n - 1 - col][row],
                    Direction::CounterClockwise => self.cells[col][n - 1 - row],
                };
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Drop the given local rows and push empty rows in at the top
    ///
    /// The row count stays the same; surviving rows keep their order and end
    /// up at the bottom of the mask.
    pub fn without_rows(&self, rows: &[usize]) -> Self {
        let n = self.size();
        let mut cells = [[false; MAX_MASK_SIZE]; MAX_MASK_SIZE];
        let kept: ArrayVec<usize, MAX_MASK_SIZE> =
            (0..n).filter(|r| !rows.contains(r)).collect();
        let offset = n - kept.len();
        for (i, &row) in kept.iter().enumerate() {
            cells[offset + i] = self.cells[row];
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// True if nothing outside the `size` x `size` block is set
    pub fn is_well_formed(&self) -> bool {
        let n = self.size();
        (n == 3 || n == 4)
            && (0..MAX_MASK_SIZE).all(|r| {
                (0..MAX_MASK_SIZE).all(|c| (r < n && c < n) || !self.cells[r][c])
            })
    }
}

const I_MASK: Mask = Mask::four([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]);
// Centered so that every rotation leaves the mask unchanged.
const O_MASK: Mask = Mask::four([[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]]);
const T_MASK: Mask = Mask::three([[0, 1, 0], [1, 1, 1], [0, 0, 0]]);
const S_MASK: Mask = Mask::three([[0, 1, 1], [1, 1, 0], [0, 0, 0]]);
const Z_MASK: Mask = Mask::three([[1, 1, 0], [0, 1, 1], [0, 0, 0]]);
const J_MASK: Mask = Mask::three([[1, 0, 0], [1, 1, 1], [0, 0, 0]]);
const L_MASK: Mask = Mask::three([[0, 0, 1], [1, 1, 1], [0, 0, 0]]);

/// Mask of a freshly spawned piece (facing North)
pub fn spawn_mask(kind: PieceKind) -> Mask {
    match kind {
        PieceKind::I => I_MASK,
        PieceKind::O => O_MASK,
        PieceKind::T => T_MASK,
        PieceKind::S => S_MASK,
        PieceKind::Z => Z_MASK,
        PieceKind::J => J_MASK,
        PieceKind::L => L_MASK,
    }
}

/// Spawn row of a piece's anchor: the I piece spawns one row higher
pub fn spawn_row(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::I => 0,
        _ => 1,
    }
}

/// Anchor column that centers a mask of `size` on a board of `width`
pub fn spawn_column(width: u8, size: usize) -> i32 {
    (width as i32 - size as i32).div_euclid(2)
}

/// SRS wall kick data
/// Each entry is (dx, dy) offset to try, in board coordinates (y grows down)
/// Order: 0=initial rotation, 1-4=wall kicks
pub type KickTable = [[(i32, i32); 5]; 8];

/// Kick table for a piece kind
///
/// Returns `None` for the O piece, which never needs to move when rotating.
pub fn get_kick_table(kind: PieceKind) -> Option<&'static KickTable> {
    match kind {
        PieceKind::O => None,
        PieceKind::I => Some(&I_KICKS),
        _ => Some(&JLSTZ_KICKS),
    }
}

/// JLSTZ kick table (shared by J, L, S, T, Z)
const JLSTZ_KICKS: KickTable = [
    // 0->1 (N->E, clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 0->3 (N->W, counter-clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 1->0 (E->N, counter-clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 1->2 (E->S, clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->1 (S->E, counter-clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 2->3 (S->W, clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 3->2 (W->S, counter-clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 3->0 (W->N, clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// I piece kick table (different from JLSTZ)
const I_KICKS: KickTable = [
    // 0->1 (N->E)
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 0->3 (N->W)
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 1->0 (E->N)
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 1->2 (E->S)
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2->1 (S->E)
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // 2->3 (S->W)
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 3->2 (W->S)
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 3->0 (W->N)
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

/// Get the kick index for a rotation transition
pub fn get_kick_index(from: Facing, direction: Direction) -> usize {
    use Direction::{Clockwise, CounterClockwise};

    match (from, direction) {
        (Facing::North, Clockwise) => 0,        // N->E
        (Facing::North, CounterClockwise) => 1, // N->W
        (Facing::East, CounterClockwise) => 2,  // E->N
        (Facing::East, Clockwise) => 3,         // E->S
        (Facing::South, CounterClockwise) => 4, // S->E
        (Facing::South, Clockwise) => 5,        // S->W
        (Facing::West, CounterClockwise) => 6,  // W->S
        (Facing::West, Clockwise) => 7,         // W->N
    }
}

/// Candidate offsets for turning `kind` from `from` in `direction`
pub fn kick_offsets(
    kind: PieceKind,
    from: Facing,
    direction: Direction,
) -> Option<&'static [(i32, i32); 5]> {
    get_kick_table(kind).map(|table| &table[get_kick_index(from, direction)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_spawn_mask_has_four_cells() {
        for kind in PieceKind::ALL {
            let mask = spawn_mask(kind);
            assert_eq!(mask.count(), 4, "{:?}", kind);
            assert!(mask.is_well_formed());
        }
    }

    #[test]
    fn test_mask_sizes() {
        assert_eq!(spawn_mask(PieceKind::I).size(), 4);
        assert_eq!(spawn_mask(PieceKind::O).size(), 4);
        for kind in [PieceKind::T, PieceKind::S, PieceKind::Z, PieceKind::J, PieceKind::L] {
            assert_eq!(spawn_mask(kind).size(), 3);
        }
    }

    #[test]
    fn test_rotate_t_clockwise() {
        let east = spawn_mask(PieceKind::T).rotated(Direction::Clockwise);
        assert_eq!(east, Mask::from_rows(&[".#.", ".##", ".#."]).unwrap());
    }

    #[test]
    fn test_rotate_t_counter_clockwise() {
        let west = spawn_mask(PieceKind::T).rotated(Direction::CounterClockwise);
        assert_eq!(west, Mask::from_rows(&[".#.", "##.", ".#."]).unwrap());
    }

    #[test]
    fn test_four_rotations_are_identity() {
        for kind in PieceKind::ALL {
            let mask = spawn_mask(kind);
            let mut cw = mask;
            let mut ccw = mask;
            for _ in 0..4 {
                cw = cw.rotated(Direction::Clockwise);
                ccw = ccw.rotated(Direction::CounterClockwise);
            }
            assert_eq!(cw, mask);
            assert_eq!(ccw, mask);
        }
    }

    #[test]
    fn test_cw_then_ccw_is_identity() {
        for kind in PieceKind::ALL {
            let mask = spawn_mask(kind);
            assert_eq!(
                mask.rotated(Direction::Clockwise)
                    .rotated(Direction::CounterClockwise),
                mask
            );
        }
    }

    #[test]
    fn test_o_mask_rotation_invariant() {
        let o = spawn_mask(PieceKind::O);
        assert_eq!(o.rotated(Direction::Clockwise), o);
        assert_eq!(o.rotated(Direction::CounterClockwise), o);
    }

    #[test]
    fn test_without_rows_prepends_empty_rows() {
        let l = Mask::from_rows(&["#..", "#..", "##."]).unwrap();
        let trimmed = l.without_rows(&[1]);
        assert_eq!(trimmed, Mask::from_rows(&["...", "#..", "##."]).unwrap());
        assert_eq!(trimmed.size(), 3);

        let bottom_gone = l.without_rows(&[2]);
        assert_eq!(bottom_gone, Mask::from_rows(&["...", "#..", "#.."]).unwrap());

        assert!(l.without_rows(&[0, 1, 2]).is_empty());
    }

    #[test]
    fn test_spawn_column_centers() {
        assert_eq!(spawn_column(10, 4), 3);
        assert_eq!(spawn_column(10, 3), 3);
        assert_eq!(spawn_column(8, 4), 2);
    }

    #[test]
    fn test_kick_tables() {
        assert!(get_kick_table(PieceKind::O).is_none());
        assert_eq!(get_kick_table(PieceKind::I), Some(&I_KICKS));
        assert_eq!(get_kick_table(PieceKind::T), Some(&JLSTZ_KICKS));

        // Every transition starts with the in-place attempt
        for kind in [PieceKind::I, PieceKind::J] {
            let table = get_kick_table(kind).unwrap();
            for row in table {
                assert_eq!(row[0], (0, 0));
            }
        }
    }

    #[test]
    fn test_from_rows_rejects_bad_shapes() {
        assert!(Mask::from_rows(&["##", "##"]).is_none());
        assert!(Mask::from_rows(&["###", "##", "###"]).is_none());
    }
}
