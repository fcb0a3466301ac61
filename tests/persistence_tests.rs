//! Export/import round trips

use serde_json::{json, Value};
use tetrimino::core::{Game, ImportError, Outcome, SavedGame};
use tetrimino::types::{Command, RotationKind};

/// A game with locked pieces, a held piece and a half-fallen active piece
fn played_game() -> Game {
    let mut game = Game::with_seed(2024);
    let moves = [
        Command::MoveLeft,
        Command::MoveLeft,
        Command::MoveLeft,
        Command::MoveLeft,
        Command::HardDrop,
        Command::Hold,
        Command::RotateCw(RotationKind::Super),
        Command::MoveRight,
        Command::MoveRight,
        Command::MoveRight,
        Command::MoveRight,
        Command::HardDrop,
        Command::SoftDrop,
        Command::SoftDrop,
    ];
    for command in moves {
        game.apply(command);
        game.tick();
    }
    game
}

#[test]
fn test_round_trip_is_identical() {
    let game = played_game();
    let first = game.export();

    let restored = Game::import(first.clone()).unwrap();
    let second = restored.export();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_json_round_trip() {
    let game = played_game();
    let json = game.export().to_json().unwrap();

    let restored = Game::import(SavedGame::from_json(&json).unwrap()).unwrap();
    assert_eq!(restored.export().to_json().unwrap(), json);
    assert_eq!(restored.snapshot(), game.snapshot());
}

#[test]
fn test_restored_game_continues_identically() {
    let mut original = played_game();
    let mut restored = Game::import(original.export()).unwrap();

    for _ in 0..200 {
        assert_eq!(original.tick(), restored.tick());
        original.apply(Command::MoveLeft);
        restored.apply(Command::MoveLeft);
    }
    assert_eq!(original.export(), restored.export());
}

#[test]
fn test_ended_game_round_trip() {
    let mut game = Game::with_seed(5);
    while game.hard_drop() != Outcome::GameOver {}
    let saved = game.export();
    assert!(saved.ended);
    assert!(saved.active.is_none());

    let restored = Game::import(saved.clone()).unwrap();
    assert!(restored.ended());
    assert_eq!(restored.export(), saved);
}

#[test]
fn test_flags_survive() {
    let mut game = Game::with_seed(8);
    game.swap_held();
    game.pause();
    let restored = Game::import(game.export()).unwrap();

    assert!(restored.paused());
    assert!(restored.swap_used());
    assert!(!restored.ended());
    assert_eq!(
        restored.held().map(|p| p.kind()),
        game.held().map(|p| p.kind())
    );
}

#[test]
fn test_tampered_save_rejected() {
    let mut saved = played_game().export();
    saved.primary.clear();
    assert!(matches!(Game::import(saved), Err(ImportError::Bag)));

    let mut saved = played_game().export();
    saved.config.width = 2;
    assert!(matches!(Game::import(saved), Err(ImportError::Config(_))));
}

/// Import a save after editing its JSON form
fn import_edited(game: &Game, edit: impl FnOnce(&mut Value)) -> Result<Game, ImportError> {
    let mut value: Value = serde_json::from_str(&game.export().to_json().unwrap()).unwrap();
    edit(&mut value);
    Game::import(SavedGame::from_json(&value.to_string())?)
}

#[test]
fn test_active_piece_cannot_reuse_locked_id() {
    let mut game = Game::with_seed(2024);
    game.hard_drop();
    let locked = game.board().locked_pieces().next().unwrap().id;

    let result = import_edited(&game, |save| save["active"]["id"] = json!(locked));
    assert!(
        matches!(result, Err(ImportError::PieceMismatch(id)) if id == locked),
        "{:?}",
        result.err()
    );
}

#[test]
fn test_held_piece_cannot_reuse_locked_id() {
    let game = played_game();
    let locked = game.board().locked_pieces().next().unwrap().id;
    assert!(game.held().is_some());

    let result = import_edited(&game, |save| save["held"]["id"] = json!(locked));
    assert!(matches!(result, Err(ImportError::PieceMismatch(id)) if id == locked));
}

#[test]
fn test_held_piece_cannot_share_active_id() {
    let game = played_game();
    let active = game.active().unwrap().id();

    let result = import_edited(&game, |save| save["held"]["id"] = json!(active));
    assert!(matches!(result, Err(ImportError::PieceMismatch(id)) if id == active));
}

#[test]
fn test_held_piece_needs_tracked_id() {
    let game = played_game();
    let result = import_edited(&game, |save| save["held"]["id"] = json!(0));
    assert!(matches!(result, Err(ImportError::MalformedPiece(0))));
}

#[test]
fn test_held_piece_must_still_be_falling() {
    let game = played_game();
    let held = game.held().unwrap().id();

    let result = import_edited(&game, |save| save["held"]["state"] = json!("Solid"));
    assert!(matches!(result, Err(ImportError::MalformedPiece(id)) if id == held));
}

#[test]
fn test_imported_game_reimports_after_play() {
    let game = played_game();
    let mut restored = import_edited(&game, |_| {}).unwrap();

    for command in [
        Command::Hold,
        Command::MoveRight,
        Command::MoveRight,
        Command::HardDrop,
        Command::HardDrop,
    ] {
        restored.apply(command);
        restored.tick();
    }
    let again = Game::import(restored.export()).unwrap();
    assert_eq!(again.export(), restored.export());
}
