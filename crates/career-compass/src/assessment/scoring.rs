use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::domain::{LikertScore, ProgramId};

/// Running point total for every program, kept in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramScoreTable {
    scores: [u32; ProgramId::COUNT],
}

impl ProgramScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, program: ProgramId) -> u32 {
        self.scores[program.position()]
    }

    pub fn set(&mut self, program: ProgramId, score: u32) {
        self.scores[program.position()] = score;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProgramId, u32)> + '_ {
        ProgramId::ALL
            .into_iter()
            .map(move |program| (program, self.get(program)))
    }

    /// Sum of all programs, saturating like the individual slots.
    pub fn total(&self) -> u32 {
        self.scores.iter().fold(0u32, |sum, score| sum.saturating_add(*score))
    }

    pub fn is_all_zero(&self) -> bool {
        self.scores.iter().all(|score| *score == 0)
    }

    /// Add the Likert transform for a tagged, in-range answer.
    ///
    /// Returns the points added, or `None` when the answer is untagged or outside 1-5.
    /// Re-answering a question adds again; prior contributions are not subtracted.
    pub fn accumulate(&mut self, program: Option<ProgramId>, raw: i64) -> Option<u32> {
        let program = program?;
        let score = LikertScore::try_from(raw).ok()?;
        Some(self.accumulate_likert(program, score))
    }

    pub fn accumulate_likert(&mut self, program: ProgramId, score: LikertScore) -> u32 {
        let points = score.points();
        let slot = &mut self.scores[program.position()];
        *slot = slot.saturating_add(points);
        points
    }

    pub fn reset(&mut self) {
        self.scores = [0; ProgramId::COUNT];
    }
}

impl FromIterator<(ProgramId, u32)> for ProgramScoreTable {
    fn from_iter<T: IntoIterator<Item = (ProgramId, u32)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (program, score) in iter {
            table.set(program, score);
        }
        table
    }
}

impl Serialize for ProgramScoreTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ordered: BTreeMap<ProgramId, u32> = self.iter().collect();
        ordered.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProgramScoreTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<ProgramId, u32>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
