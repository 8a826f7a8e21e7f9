use crate::attempt::AttemptState;
use crate::model::{QuestionId, QuizDocument};

//
// ─── RESULTS ──────────────────────────────────────────────────────────────────
//

/// Correctness of a single question within a graded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub ordinal: usize,
    pub is_correct: bool,
}

/// Outcome of grading one attempt against a document's answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeReport {
    correct: usize,
    total: usize,
    percentage: u8,
    results: Vec<QuestionResult>,
}

impl GradeReport {
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whole-number percentage, rounded half up.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Per-question correctness in document order.
    #[must_use]
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    #[must_use]
    pub fn is_correct(&self, id: QuestionId) -> bool {
        self.results
            .iter()
            .any(|r| r.question_id == id && r.is_correct)
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.percentage)
    }
}

//
// ─── SCORE BAND ───────────────────────────────────────────────────────────────
//

/// Coarse rating of a percentage for result screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 80% and above.
    High,
    /// 60% to 79%.
    Medium,
    Low,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            80.. => Self::High,
            60..=79 => Self::Medium,
            _ => Self::Low,
        }
    }
}

//
// ─── GRADING ──────────────────────────────────────────────────────────────────
//

/// `round(correct / total * 100)` with halves rounded up, in integer math.
///
/// A zero total yields 0.
#[must_use]
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u128;
    let total = total as u128;
    let rounded = (correct * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

/// Compare every selection in `attempt` to the answer key of `document`.
///
/// Matching is exact string equality; unanswered questions count as wrong.
/// Pure: the attempt is only read.
#[must_use]
pub fn grade(document: &QuizDocument, attempt: &AttemptState) -> GradeReport {
    let results: Vec<QuestionResult> = document
        .questions()
        .iter()
        .map(|question| QuestionResult {
            question_id: question.id(),
            ordinal: question.ordinal(),
            is_correct: attempt
                .selection(question.id())
                .is_some_and(|selected| question.is_correct(selected)),
        })
        .collect();

    let correct = results.iter().filter(|r| r.is_correct).count();
    let total = document.question_count();

    GradeReport {
        correct,
        total,
        percentage: percentage(correct, total),
        results,
    }
}
