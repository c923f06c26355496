use log::debug;

use crate::model::{GradedAnswer, ProficiencyLevel};

//
// ─── TALLY ─────────────────────────────────────────────────────────────────────
//

/// Per-level counts of asked and correctly answered placement questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelTally {
    asked: [u32; ProficiencyLevel::ALL.len()],
    correct: [u32; ProficiencyLevel::ALL.len()],
}

impl LevelTally {
    /// Count answers by the level each question was generated for.
    #[must_use]
    pub fn from_answers(answers: &[GradedAnswer]) -> Self {
        let mut tally = Self::default();
        for answer in answers {
            let slot = usize::from(answer.question_level().rank());
            tally.asked[slot] = tally.asked[slot].saturating_add(1);
            if answer.is_correct() {
                tally.correct[slot] = tally.correct[slot].saturating_add(1);
            }
        }
        tally
    }

    #[must_use]
    pub fn asked(&self, level: ProficiencyLevel) -> u32 {
        self.asked[usize::from(level.rank())]
    }

    #[must_use]
    pub fn correct(&self, level: ProficiencyLevel) -> u32 {
        self.correct[usize::from(level.rank())]
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Outcome of a placement test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub level: ProficiencyLevel,
    pub tally: LevelTally,
}

/// Highest level in `levels_in_test_order` with at least
/// `proficiency_threshold` correct answers.
///
/// Levels are scanned by rank from hardest to easiest, regardless of how the
/// slice is ordered. When no level qualifies the lowest given level is
/// returned; with no levels at all, `ProficiencyLevel::lowest()`. The result
/// does not depend on the order of `answers`.
#[must_use]
pub fn determine_level(
    answers: &[GradedAnswer],
    levels_in_test_order: &[ProficiencyLevel],
    proficiency_threshold: u32,
) -> ProficiencyLevel {
    let tally = LevelTally::from_answers(answers);
    level_from_tally(&tally, levels_in_test_order, proficiency_threshold)
}

/// Same as `determine_level`, keeping the per-level tally for display.
#[must_use]
pub fn score_placement(
    answers: &[GradedAnswer],
    levels_in_test_order: &[ProficiencyLevel],
    proficiency_threshold: u32,
) -> PlacementReport {
    let tally = LevelTally::from_answers(answers);
    let level = level_from_tally(&tally, levels_in_test_order, proficiency_threshold);

    for candidate in ProficiencyLevel::ALL {
        if tally.asked(candidate) > 0 {
            debug!(
                "placement {}: {}/{} correct",
                candidate.code(),
                tally.correct(candidate),
                tally.asked(candidate)
            );
        }
    }
    debug!("placement result: {}", level.code());

    PlacementReport { level, tally }
}

fn level_from_tally(
    tally: &LevelTally,
    levels: &[ProficiencyLevel],
    threshold: u32,
) -> ProficiencyLevel {
    let mut ordered = levels.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let floor = ordered
        .first()
        .copied()
        .unwrap_or_else(ProficiencyLevel::lowest);

    // A level with no correct answers never qualifies.
    let threshold = threshold.max(1);
    ordered
        .into_iter()
        .rev()
        .find(|level| tally.correct(*level) >= threshold)
        .unwrap_or(floor)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
