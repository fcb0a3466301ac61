//! Scoring module - pluggable line-clear scoring
//!
//! The engine never hard-codes a formula: a [`ScoringRule`] bundles a points
//! function of (lines cleared, level) and a level function of total lines.
//! [`ScoringRule::CLASSIC`] is the default.

use serde::{Deserialize, Serialize};

use crate::types::{LINES_PER_LEVEL, LINE_SCORES};

/// Running score of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub points: u32,
    /// Total lines cleared
    pub lines: u32,
    pub level: u32,
}

impl Default for ScoreRecord {
    fn default() -> Self {
        Self {
            points: 0,
            lines: 0,
            level: 1,
        }
    }
}

/// Points and level formulas
#[derive(Debug, Clone, Copy)]
pub struct ScoringRule {
    /// Points for clearing `lines` rows at once at `level`
    pub points: fn(lines: u32, level: u32) -> u32,
    /// Level reached after `total_lines` cleared rows
    pub level: fn(total_lines: u32) -> u32,
}

impl ScoringRule {
    /// Classic Nintendo table, level = 1 + lines / 10
    pub const CLASSIC: ScoringRule = ScoringRule {
        points: calculate_line_score,
        level: classic_level,
    };

    /// Lines are counted but never score
    pub const NONE: ScoringRule = ScoringRule {
        points: no_points,
        level: classic_level,
    };

    /// Apply a clear of `lines` rows to `score`; returns the points awarded
    pub fn apply(&self, score: &mut ScoreRecord, lines: u32) -> u32 {
        score.lines += lines;
        score.level = (self.level)(score.lines);

        let points = (self.points)(lines, score.level);
        score.points = score.points.saturating_add(points);
        points
    }
}

impl Default for ScoringRule {
    fn default() -> Self {
        Self::CLASSIC
    }
}

/// Calculate line clear score (Classic rules)
/// lines: number of lines cleared (values above 4 score as 4)
/// level: current level (1-based)
pub fn calculate_line_score(lines: u32, level: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    let base_score = LINE_SCORES[lines.min(4) as usize];
    base_score.saturating_mul(level)
}

/// Level curve: one level per ten lines, starting at 1
pub fn classic_level(total_lines: u32) -> u32 {
    1 + total_lines / LINES_PER_LEVEL
}

fn no_points(_lines: u32, _level: u32) -> u32 {
    0
}
