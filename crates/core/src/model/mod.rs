mod document;
mod history;
mod ids;
mod question;
mod timestamp;

pub use document::{
    DocumentError, GENERAL_SECTION, KeyEntities, QuizDocument, QuizDocumentDraft, SectionGroup,
    parse_source_url,
};
pub use history::QuizHistoryItem;
pub use ids::{ParseIdError, QuestionId, QuizId};
pub use question::{Difficulty, Question, QuestionDraft, QuestionError};
