#![forbid(unsafe_code)]

//! Quiz-taking state machine and scoring engine.
//!
//! A [`model::QuizDocument`] is validated once at load; a [`QuizSession`]
//! owns the [`AttemptState`] for it and moves between answering and
//! reviewing. Navigation and grading are plain functions over the two.

pub mod attempt;
pub mod grader;
pub mod model;
pub mod navigator;
pub mod session;
pub mod time;

#[cfg(test)]
mod test_support;

pub use attempt::AttemptState;
pub use grader::{GradeReport, QuestionResult, ScoreBand, grade};
pub use session::{QuizSession, ReviewItem, SessionPhase, SuspendedSession};
pub use time::Clock;
