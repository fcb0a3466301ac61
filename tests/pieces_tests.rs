//! Piece tests - masks, movement and SRS rotation against a board

use tetrimino::core::pieces::{kick_offsets, spawn_mask, Mask};
use tetrimino::core::{Board, Tetrimino};
use tetrimino::types::{Block, Direction, Facing, PieceKind, RotationKind};

/// Fill every cell the piece doesn't cover
fn box_in(piece: &Tetrimino) -> Board {
    let mut board = Board::default();
    let cells = piece.cells();
    for y in 0..board.height() as i32 {
        for x in 0..board.width() as i32 {
            if !cells.contains(&(x, y)) {
                board.set(x, y, Some(Block::solid(PieceKind::Z)));
            }
        }
    }
    board
}

// ============== Mask Tests ==============

#[test]
fn test_i_piece_rotations() {
    let north = spawn_mask(PieceKind::I);
    assert_eq!(north.cells().as_slice(), &[(0, 1), (1, 1), (2, 1), (3, 1)]);

    let east = north.rotated(Direction::Clockwise);
    assert_eq!(east.cells().as_slice(), &[(2, 0), (2, 1), (2, 2), (2, 3)]);

    let south = east.rotated(Direction::Clockwise);
    assert_eq!(south.cells().as_slice(), &[(0, 2), (1, 2), (2, 2), (3, 2)]);

    let west = north.rotated(Direction::CounterClockwise);
    assert_eq!(west.cells().as_slice(), &[(1, 0), (1, 1), (1, 2), (1, 3)]);
}

#[test]
fn test_four_turns_return_to_spawn() {
    for kind in PieceKind::ALL {
        let mask = spawn_mask(kind);
        let mut cw = mask;
        let mut ccw = mask;
        for _ in 0..4 {
            cw = cw.rotated(Direction::Clockwise);
            ccw = ccw.rotated(Direction::CounterClockwise);
        }
        assert_eq!(cw, mask, "{:?}", kind);
        assert_eq!(ccw, mask, "{:?}", kind);
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
fn test_mask_without_rows() {
    let l = Mask::from_rows(&["#..", "#..", "##."]).unwrap();
    let cut = l.without_rows(&[1]);
    assert_eq!(cut, Mask::from_rows(&["...", "#..", "##."]).unwrap());

    let gone = l.without_rows(&[0, 1, 2]);
    assert!(gone.is_empty());
    assert_eq!(gone.size(), 3);
}

#[test]
fn test_kick_tables() {
    assert!(kick_offsets(PieceKind::O, Facing::North, Direction::Clockwise).is_none());

    let t = kick_offsets(PieceKind::T, Facing::North, Direction::Clockwise).unwrap();
    let i = kick_offsets(PieceKind::I, Facing::North, Direction::Clockwise).unwrap();
    assert_eq!(t[0], (0, 0));
    assert_eq!(i[0], (0, 0));
    assert_ne!(t, i);
}

// ============== Movement Tests ==============

#[test]
fn test_failed_move_leaves_everything() {
    let mut board = Board::default();
    board.set(4, 3, Some(Block::solid(PieceKind::L)));
    let mut piece = Tetrimino::spawn(PieceKind::T, 1, &board).unwrap();

    let piece_before = piece.clone();
    let board_before = board.clone();
    assert!(!piece.try_move(&board, 0, 1));
    assert_eq!(piece, piece_before);
    assert_eq!(board, board_before);
}

#[test]
fn test_hard_drop_rests_piece() {
    let board = Board::default();
    for kind in PieceKind::ALL {
        let mut piece = Tetrimino::spawn(kind, 1, &board).unwrap();
        let distance = piece.hard_drop(&board);
        assert!(distance > 0);
        assert!(piece.is_grounded(&board));
        assert!(!piece.try_move(&board, 0, 1), "{:?} not resting", kind);
        assert!(piece.cells().iter().any(|&(_, y)| y == 21));
    }
}

#[test]
fn test_zenith_tracks_rotation() {
    let board = Board::default();
    let mut piece = Tetrimino::spawn(PieceKind::I, 1, &board).unwrap();
    assert_eq!(piece.zenith(&board), 20);

    assert!(piece.rotate(&board, RotationKind::Super, Direction::Clockwise));
    // Vertical: four rows tall from the anchor
    assert_eq!(piece.zenith(&board), 18);
}

// ============== Rotation Tests ==============

#[test]
fn test_wall_kick_off_left_wall() {
    let board = Board::default();
    let mut piece = Tetrimino::spawn(PieceKind::T, 1, &board).unwrap();
    assert!(piece.rotate(&board, RotationKind::Super, Direction::Clockwise));
    while piece.try_move(&board, -1, 0) {}
    assert_eq!(piece.x(), -1);

    // Simple rotation would push a cell through the wall
    let mut simple = piece.clone();
    assert!(!simple.rotate(&board, RotationKind::Simple, Direction::Clockwise));
    assert_eq!(simple, piece);

    assert!(piece.rotate(&board, RotationKind::Super, Direction::Clockwise));
    assert_eq!(piece.facing(), Facing::South);
    assert_eq!(piece.x(), 0);
    assert!(piece.cells().iter().all(|&(x, _)| x >= 0));
}

#[test]
fn test_failed_rotation_restores_state() {
    for kind in [PieceKind::I, PieceKind::T, PieceKind::S, PieceKind::J] {
        let spawn_board = Board::default();
        let piece = Tetrimino::spawn(kind, 1, &spawn_board).unwrap();
        let board = box_in(&piece);

        for rotation in [RotationKind::Simple, RotationKind::Super] {
            for direction in [Direction::Clockwise, Direction::CounterClockwise] {
                let mut attempt = piece.clone();
                assert!(!attempt.rotate(&board, rotation, direction));
                assert_eq!(attempt, piece, "{:?} {:?} {:?}", kind, rotation, direction);
            }
        }
    }
}

#[test]
fn test_o_super_rotation_always_succeeds() {
    let spawn_board = Board::default();
    let piece = Tetrimino::spawn(PieceKind::O, 1, &spawn_board).unwrap();
    let board = box_in(&piece);

    let mut o = piece.clone();
    assert!(o.rotate(&board, RotationKind::Super, Direction::Clockwise));
    assert!(o.rotate(&board, RotationKind::Super, Direction::CounterClockwise));
    assert_eq!(o.mask(), piece.mask());
    assert_eq!((o.x(), o.y()), (piece.x(), piece.y()));
}

#[test]
fn test_super_rotation_full_cycle() {
    let board = Board::default();
    let mut piece = Tetrimino::spawn(PieceKind::J, 1, &board).unwrap();
    let start = piece.clone();

    for expected in [Facing::East, Facing::South, Facing::West, Facing::North] {
        assert!(piece.rotate(&board, RotationKind::Super, Direction::Clockwise));
        assert_eq!(piece.facing(), expected);
    }
    assert_eq!(piece.mask(), start.mask());
    assert_eq!((piece.x(), piece.y()), (start.x(), start.y()));
}
