use std::collections::{HashMap, HashSet};

use crate::grader::GradeReport;
use crate::model::{Question, QuestionId, QuizDocument};

/// One learner's answers for one quiz document.
///
/// The selection map is sparse: a missing entry means the question has not
/// been answered. Once a grade report is stored the attempt is finalized and
/// selections are frozen until [`AttemptState::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    question_ids: HashSet<QuestionId>,
    selections: HashMap<QuestionId, String>,
    current: usize,
    report: Option<GradeReport>,
}

impl AttemptState {
    #[must_use]
    pub fn new(document: &QuizDocument) -> Self {
        Self {
            question_ids: document.questions().iter().map(Question::id).collect(),
            selections: HashMap::with_capacity(document.question_count()),
            current: 0,
            report: None,
        }
    }

    /// Record `option` as the selection for `question`, replacing any earlier one.
    ///
    /// Returns `false` without changing anything when the attempt is finalized,
    /// the question is not part of this attempt's document, or `option` is not
    /// one of the question's options.
    pub fn select_answer(&mut self, question: &Question, option: &str) -> bool {
        if self.is_finalized()
            || !self.question_ids.contains(&question.id())
            || !question.has_option(option)
        {
            return false;
        }
        self.selections.insert(question.id(), option.to_owned());
        true
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.selections.contains_key(&id)
    }

    #[must_use]
    pub fn selection(&self, id: QuestionId) -> Option<&str> {
        self.selections.get(&id).map(String::as_str)
    }

    /// Read-only view of every recorded selection.
    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        &self.selections
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_ids.len()
    }

    /// Selections are keyed by question id and only accepted for known
    /// questions, so a full map means every question is answered.
    #[must_use]
    pub fn all_answered(&self) -> bool {
        self.selections.len() == self.question_ids.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.report.is_some()
    }

    /// The score stored at submission; `None` while answering.
    #[must_use]
    pub fn report(&self) -> Option<&GradeReport> {
        self.report.as_ref()
    }

    /// Forget every selection and the score, and return to the first question.
    pub fn reset(&mut self) {
        self.selections.clear();
        self.report = None;
        self.current = 0;
    }

    pub(crate) fn set_current(&mut self, index: usize) {
        self.current = index;
    }

    pub(crate) fn finalize(&mut self, report: GradeReport) {
        self.report = Some(report);
    }
}
