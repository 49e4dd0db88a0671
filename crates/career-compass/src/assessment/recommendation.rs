use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::ProgramId;
use super::scoring::ProgramScoreTable;

/// Winning program together with the scores it was chosen from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    program: ProgramId,
    scores: ProgramScoreTable,
}

impl RecommendationResult {
    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn scores(&self) -> &ProgramScoreTable {
        &self.scores
    }

    /// False when no tagged Likert answer contributed any points, in which case
    /// `program` is just the first program in canonical order.
    pub fn has_signal(&self) -> bool {
        !self.scores.is_all_zero()
    }
}

/// Pick the highest-scoring program.
///
/// Walks programs in canonical order and only replaces the running best on a strictly
/// greater score, so ties go to the earliest declared program.
pub fn resolve(scores: &ProgramScoreTable) -> RecommendationResult {
    let (program, _) = scores
        .iter()
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
        .unwrap_or((ProgramId::ALL[0], 0));

    if scores.is_all_zero() {
        warn!(
            program = program.code(),
            "no program received points; recommending first program by default"
        );
    }

    RecommendationResult {
        program,
        scores: *scores,
    }
}
