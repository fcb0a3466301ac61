//! Tetrimino (workspace facade crate).
//!
//! Exposes `tetrimino::{core,types}` while the implementation lives in
//! dedicated crates under `crates/`.

pub use tetrimino_core as core;
pub use tetrimino_types as types;
