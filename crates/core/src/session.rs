use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::attempt::AttemptState;
use crate::grader::{self, GradeReport};
use crate::model::{Question, QuestionId, QuizDocument};
use crate::navigator;
use crate::time::Clock;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a take-quiz session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Selections may change; no score exists yet.
    Answering,
    /// Submitted and graded; selections are frozen until retake.
    Reviewing,
}

//
// ─── REVIEW ROWS ───────────────────────────────────────────────────────────────
//

/// One row of the post-submission review listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewItem<'a> {
    pub question: &'a Question,
    pub selected: Option<&'a str>,
    pub is_correct: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Drives one attempt at a quiz: answering, submitting, reviewing, retaking.
///
/// The document is shared read-only; the attempt is owned exclusively by the
/// session for as long as the quiz is open.
pub struct QuizSession {
    document: Arc<QuizDocument>,
    attempt: AttemptState,
    clock: Clock,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    #[must_use]
    pub fn new(document: Arc<QuizDocument>) -> Self {
        Self::with_clock(document, Clock::default())
    }

    #[must_use]
    pub fn with_clock(document: Arc<QuizDocument>, clock: Clock) -> Self {
        let attempt = AttemptState::new(&document);
        Self {
            document,
            attempt,
            clock,
            started_at: clock.now(),
            submitted_at: None,
        }
    }

    #[must_use]
    pub fn document(&self) -> &Arc<QuizDocument> {
        &self.document
    }

    #[must_use]
    pub fn attempt(&self) -> &AttemptState {
        &self.attempt
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.attempt.is_finalized() {
            SessionPhase::Reviewing
        } else {
            SessionPhase::Answering
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    // ─── Position ──────────────────────────────────────────────────────────────

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.attempt.current_index()
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // The index is clamped into a document that is never empty.
        &self.document.questions()[self.attempt.current_index()]
    }

    pub fn go_to(&mut self, index: usize) -> usize {
        navigator::go_to(&mut self.attempt, index)
    }

    pub fn next(&mut self) -> usize {
        navigator::next(&mut self.attempt)
    }

    pub fn previous(&mut self) -> usize {
        navigator::previous(&mut self.attempt)
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        navigator::is_first(&self.attempt)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        navigator::is_last(&self.attempt)
    }

    // ─── Answers ───────────────────────────────────────────────────────────────

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        self.attempt.answers()
    }

    #[must_use]
    pub fn selection(&self, id: QuestionId) -> Option<&str> {
        self.attempt.selection(id)
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.attempt.is_answered(id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.attempt.answered_count()
    }

    #[must_use]
    pub fn all_answered(&self) -> bool {
        self.attempt.all_answered()
    }

    /// Select `option` for the question with `id`.
    ///
    /// Returns `false` if the question is unknown, the option is not offered,
    /// or the session is reviewing.
    pub fn select_answer(&mut self, id: QuestionId, option: &str) -> bool {
        let Some(question) = self.document.question_by_id(id) else {
            return false;
        };
        self.attempt.select_answer(question, option)
    }

    /// Select the option at `option_index` on the current question.
    pub fn select_option_at(&mut self, option_index: usize) -> bool {
        let question = &self.document.questions()[self.attempt.current_index()];
        match question.options().get(option_index) {
            Some(option) => self.attempt.select_answer(question, option),
            None => false,
        }
    }

    // ─── Lifecycle ─────────────────────────────────────────────────────────────

    /// Grade and freeze the attempt.
    ///
    /// Does nothing and returns `None` unless every question is answered and
    /// the session is still answering. A second call while reviewing returns
    /// the report stored by the first.
    pub fn submit(&mut self) -> Option<&GradeReport> {
        if self.attempt.is_finalized() {
            return self.attempt.report();
        }
        if !self.attempt.all_answered() {
            return None;
        }
        let report = grader::grade(&self.document, &self.attempt);
        self.attempt.finalize(report);
        self.submitted_at = Some(self.clock.now());
        self.attempt.report()
    }

    /// Score fixed at submission time.
    #[must_use]
    pub fn report(&self) -> Option<&GradeReport> {
        self.attempt.report()
    }

    /// Per-question review rows, available only while reviewing.
    #[must_use]
    pub fn review(&self) -> Option<Vec<ReviewItem<'_>>> {
        let report = self.attempt.report()?;
        let rows = self
            .document
            .questions()
            .iter()
            .zip(report.results())
            .map(|(question, result)| ReviewItem {
                question,
                selected: self.attempt.selection(question.id()),
                is_correct: result.is_correct,
            })
            .collect();
        Some(rows)
    }

    /// Start over with no selections. Only valid while reviewing; returns
    /// whether the reset happened.
    pub fn retake(&mut self) -> bool {
        if !self.attempt.is_finalized() {
            return false;
        }
        self.attempt.reset();
        self.started_at = self.clock.now();
        self.submitted_at = None;
        true
    }

    /// Leave take mode for the read-only quiz view, keeping the attempt.
    #[must_use]
    pub fn exit(self) -> SuspendedSession {
        SuspendedSession { session: self }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.document.id())
            .field("questions", &self.document.question_count())
            .field("current", &self.attempt.current_index())
            .field("answered", &self.attempt.answered_count())
            .field("phase", &self.phase())
            .field("started_at", &self.started_at)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}

/// A session the learner stepped out of; its answers and score survive.
#[derive(Debug)]
pub struct SuspendedSession {
    session: QuizSession,
}

impl SuspendedSession {
    #[must_use]
    pub fn document(&self) -> &Arc<QuizDocument> {
        self.session.document()
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        self.session.answers()
    }

    #[must_use]
    pub fn report(&self) -> Option<&GradeReport> {
        self.session.report()
    }

    /// Return to take mode exactly where the learner left.
    #[must_use]
    pub fn resume(self) -> QuizSession {
        self.session
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::document;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn session(answers: &[&str]) -> QuizSession {
        QuizSession::with_clock(Arc::new(document(answers)), Clock::fixed(fixed_now()))
    }

    fn answer_all(session: &mut QuizSession, picks: &[&str]) {
        let ids: Vec<_> = session.document().questions().iter().map(Question::id).collect();
        for (id, pick) in ids.into_iter().zip(picks) {
            assert!(session.select_answer(id, pick));
        }
    }

    #[test]
    fn submit_requires_every_answer() {
        let mut s = session(&["A", "B", "C", "D"]);
        answer_all(&mut s, &["A", "B", "C"]);

        assert!(s.submit().is_none());
        assert_eq!(s.phase(), SessionPhase::Answering);
        assert!(s.report().is_none());
        assert!(s.submitted_at().is_none());
    }

    #[test]
    fn submit_grades_and_enters_review() {
        let mut s = session(&["A", "B", "C", "D"]);
        answer_all(&mut s, &["A", "X", "C", "D"]);

        let report = s.submit().cloned().unwrap();
        assert_eq!(report.correct(), 3);
        assert_eq!(report.percentage(), 75);
        assert_eq!(s.phase(), SessionPhase::Reviewing);
        assert_eq!(s.submitted_at(), Some(fixed_now()));
    }

    #[test]
    fn selections_after_submit_change_nothing() {
        let mut s = session(&["A", "B"]);
        answer_all(&mut s, &["A", "C"]);
        let report = s.submit().cloned().unwrap();
        let answers = s.answers().clone();

        let first = s.document().questions()[0].id();
        assert!(!s.select_answer(first, "B"));
        assert!(!s.select_option_at(3));

        assert_eq!(s.answers(), &answers);
        assert_eq!(s.report(), Some(&report));
        assert_eq!(s.submit(), Some(&report));
    }

    #[test]
    fn retake_clears_everything() {
        let mut s = session(&["A", "B"]);
        assert!(!s.retake());

        answer_all(&mut s, &["A", "B"]);
        s.go_to(1);
        s.submit();
        assert!(s.retake());

        assert_eq!(s.phase(), SessionPhase::Answering);
        assert_eq!(s.answered_count(), 0);
        assert_eq!(s.current_index(), 0);
        assert!(s.report().is_none());
        assert!(s.submitted_at().is_none());
    }

    #[test]
    fn navigation_is_allowed_while_reviewing() {
        let mut s = session(&["A", "B", "C"]);
        answer_all(&mut s, &["A", "B", "C"]);
        s.submit();

        assert_eq!(s.next(), 1);
        assert_eq!(s.go_to(10), 2);
        assert!(s.is_last());
        assert_eq!(s.current_question().answer(), "C");
        assert_eq!(s.phase(), SessionPhase::Reviewing);
    }

    #[test]
    fn select_option_at_uses_current_question() {
        let mut s = session(&["A", "B"]);
        s.next();
        assert!(s.select_option_at(1));
        let second = s.document().questions()[1].id();
        assert_eq!(s.selection(second), Some("B"));
        assert!(!s.select_option_at(42));
    }

    #[test]
    fn unknown_question_is_ignored() {
        let mut s = session(&["A"]);
        assert!(!s.select_answer(QuestionId::new(404), "A"));
        assert_eq!(s.answered_count(), 0);
    }

    #[test]
    fn review_rows_follow_document_order() {
        let mut s = session(&["A", "B"]);
        assert!(s.review().is_none());
        answer_all(&mut s, &["A", "D"]);
        s.submit();

        let rows = s.review().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].selected, Some("A"));
        assert!(rows[0].is_correct);
        assert_eq!(rows[1].selected, Some("D"));
        assert!(!rows[1].is_correct);
        assert_eq!(rows[1].question.answer(), "B");
    }

    #[test]
    fn exit_keeps_the_attempt_for_later() {
        let mut s = session(&["A", "B"]);
        answer_all(&mut s, &["A", "B"]);
        s.submit();

        let parked = s.exit();
        assert_eq!(parked.answers().len(), 2);
        assert_eq!(parked.report().map(GradeReport::percentage), Some(100));

        let resumed = parked.resume();
        assert_eq!(resumed.phase(), SessionPhase::Reviewing);
    }

    #[test]
    fn retake_restamps_start_time() {
        let doc = Arc::new(document(&["A"]));
        let mut clock = Clock::fixed(fixed_now());
        let mut s = QuizSession::with_clock(Arc::clone(&doc), clock);
        assert_eq!(s.started_at(), fixed_now());

        clock.advance(Duration::minutes(3));
        s.clock = clock;
        s.select_option_at(0);
        s.submit();
        s.retake();
        assert_eq!(s.started_at(), fixed_now() + Duration::minutes(3));
    }
}
