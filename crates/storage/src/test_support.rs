use chrono::Duration;
use quiz_core::model::{KeyEntities, QuestionDraft, QuestionId, QuizDocument, QuizDocumentDraft, QuizId};
use quiz_core::time::fixed_now;

/// A two-question quiz created `minutes` after the fixed test timestamp.
pub fn build_quiz(id: u64, minutes: i64) -> QuizDocument {
    QuizDocumentDraft {
        id: Some(QuizId::new(id)),
        title: format!("Article {id}"),
        url: format!("https://en.wikipedia.org/wiki/Article_{id}"),
        summary: "Summary.".into(),
        key_entities: KeyEntities {
            people: vec!["Ada Lovelace".into()],
            ..KeyEntities::default()
        },
        sections: vec!["History".into()],
        quiz: (1..=2)
            .map(|q| QuestionDraft {
                id: QuestionId::new(q),
                question: format!("Question {q}?"),
                options: vec!["yes".into(), "no".into()],
                answer: "yes".into(),
                difficulty: "easy".into(),
                explanation: "Because.".into(),
                section_reference: Some("History".into()),
            })
            .collect(),
        related_topics: vec!["Computing".into()],
        created_at: Some(fixed_now() + Duration::minutes(minutes)),
    }
    .validate()
    .unwrap()
}
