use crate::model::{KeyEntities, QuestionDraft, QuestionId, QuizDocument, QuizDocumentDraft};

/// Every generated question offers these options.
pub const OPTIONS: [&str; 5] = ["A", "B", "C", "D", "X"];

pub fn question_draft(id: u64, answer: &str) -> QuestionDraft {
    QuestionDraft {
        id: QuestionId::new(id),
        question: format!("Question {id}?"),
        options: OPTIONS.iter().map(|o| (*o).to_owned()).collect(),
        answer: answer.to_owned(),
        difficulty: "medium".into(),
        explanation: format!("Because {answer}."),
        section_reference: None,
    }
}

/// A draft whose question `i` has id `i + 1` and the given answer.
pub fn document_draft(answers: &[&str]) -> QuizDocumentDraft {
    QuizDocumentDraft {
        id: None,
        title: "Test article".into(),
        url: "https://en.wikipedia.org/wiki/Test".into(),
        summary: "A test article.".into(),
        key_entities: KeyEntities::default(),
        sections: vec!["Intro".into()],
        quiz: answers
            .iter()
            .zip(1_u64..)
            .map(|(answer, id)| question_draft(id, answer))
            .collect(),
        related_topics: Vec::new(),
        created_at: None,
    }
}

pub fn document(answers: &[&str]) -> QuizDocument {
    document_draft(answers).validate().unwrap()
}
