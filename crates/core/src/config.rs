//! Game configuration
//!
//! Defaults match a standard 10x20 playfield with a two-row hidden buffer
//! and a 200ms gravity tick. [`GameConfig::from_env`] lets a host override
//! any field without a config file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pieces::MAX_MASK_SIZE;
use crate::types::{DEFAULT_HIDDEN_ROWS, DEFAULT_TICK_MS, DEFAULT_VISIBLE_HEIGHT, DEFAULT_WIDTH};

/// Developer logging switches
///
/// Each one emits a `trace!` event with the elapsed time of the matching
/// operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceToggles {
    pub tick: bool,
    pub rotate: bool,
    pub zenith: bool,
}

impl TraceToggles {
    /// Parse a comma-separated list such as `"tick,rotate"`
    ///
    /// Unknown names are ignored; `"all"` turns everything on.
    pub fn parse(list: &str) -> Self {
        let mut toggles = Self::default();
        for name in list.split(',').map(|s| s.trim().to_lowercase()) {
            match name.as_str() {
                "tick" => toggles.tick = true,
                "rotate" => toggles.rotate = true,
                "zenith" => toggles.zenith = true,
                "all" => {
                    toggles = Self {
                        tick: true,
                        rotate: true,
                        zenith: true,
                    }
                }
                _ => {}
            }
        }
        toggles
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width {0} is narrower than the widest piece")]
    TooNarrow(u8),
    #[error("board needs at least one visible row")]
    NoVisibleRows,
    #[error("board height {0} leaves no room to spawn")]
    TooShort(u16),
    #[error("tick interval must be positive")]
    ZeroTick,
}

/// Board and timing configuration for a game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: u8,
    pub visible_height: u8,
    pub hidden_rows: u8,
    pub tick_ms: u32,
    pub seed: u32,
    pub trace: TraceToggles,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            visible_height: DEFAULT_VISIBLE_HEIGHT,
            hidden_rows: DEFAULT_HIDDEN_ROWS,
            tick_ms: DEFAULT_TICK_MS,
            seed: 1,
            trace: TraceToggles::default(),
        }
    }
}

impl GameConfig {
    /// Create from environment variables, falling back to defaults per field
    ///
    /// `TETRIMINO_WIDTH`, `TETRIMINO_VISIBLE_HEIGHT`, `TETRIMINO_HIDDEN_ROWS`,
    /// `TETRIMINO_TICK_MS`, `TETRIMINO_SEED`, `TETRIMINO_TRACE`.
    pub fn from_env() -> Self {
        use std::env;

        fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
            env::var(key)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        let trace = env::var("TETRIMINO_TRACE")
            .map(|s| TraceToggles::parse(&s))
            .unwrap_or_default();

        Self {
            width: parsed("TETRIMINO_WIDTH", defaults.width),
            visible_height: parsed("TETRIMINO_VISIBLE_HEIGHT", defaults.visible_height),
            hidden_rows: parsed("TETRIMINO_HIDDEN_ROWS", defaults.hidden_rows),
            tick_ms: parsed("TETRIMINO_TICK_MS", defaults.tick_ms),
            seed: parsed("TETRIMINO_SEED", defaults.seed),
            trace,
        }
    }

    /// Simulated height: visible rows plus the hidden buffer
    pub fn simulated_height(&self) -> u16 {
        self.visible_height as u16 + self.hidden_rows as u16
    }

    /// Check the board can hold and spawn every piece
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.width as usize) < MAX_MASK_SIZE {
            return Err(ConfigError::TooNarrow(self.width));
        }
        if self.visible_height == 0 {
            return Err(ConfigError::NoVisibleRows);
        }
        let height = self.simulated_height();
        if height < MAX_MASK_SIZE as u16 || height > u8::MAX as u16 {
            return Err(ConfigError::TooShort(height));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.simulated_height(), 22);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_small_boards() {
        let narrow = GameConfig {
            width: 3,
            ..GameConfig::default()
        };
        assert_eq!(narrow.validate(), Err(ConfigError::TooNarrow(3)));

        let blind = GameConfig {
            visible_height: 0,
            ..GameConfig::default()
        };
        assert_eq!(blind.validate(), Err(ConfigError::NoVisibleRows));

        let short = GameConfig {
            visible_height: 2,
            hidden_rows: 0,
            ..GameConfig::default()
        };
        assert_eq!(short.validate(), Err(ConfigError::TooShort(2)));

        let frozen = GameConfig {
            tick_ms: 0,
            ..GameConfig::default()
        };
        assert_eq!(frozen.validate(), Err(ConfigError::ZeroTick));
    }

    #[test]
    fn test_trace_toggles_parse() {
        assert_eq!(TraceToggles::parse(""), TraceToggles::default());
        assert_eq!(
            TraceToggles::parse("Tick, zenith,bogus"),
            TraceToggles {
                tick: true,
                rotate: false,
                zenith: true,
            }
        );
        let all = TraceToggles::parse("all");
        assert!(all.tick && all.rotate && all.zenith);
    }
}
