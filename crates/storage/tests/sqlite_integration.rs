use chrono::Duration;
use quiz_core::model::{
    KeyEntities, QuestionDraft, QuestionId, QuizDocument, QuizDocumentDraft, QuizId,
};
use quiz_core::time::fixed_now;
use storage::repository::{QuizRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn build_quiz(id: u64, minutes: i64, answers: &[&str]) -> QuizDocument {
    QuizDocumentDraft {
        id: Some(QuizId::new(id)),
        title: format!("Article {id}"),
        url: format!("https://en.wikipedia.org/wiki/Article_{id}"),
        summary: "Summary.".into(),
        key_entities: KeyEntities {
            organizations: vec!["Royal Society".into()],
            ..KeyEntities::default()
        },
        sections: vec!["Early life".into(), "Career".into()],
        quiz: answers
            .iter()
            .zip(1_u64..)
            .map(|(answer, q)| QuestionDraft {
                id: QuestionId::new(q),
                question: format!("Question {q}?"),
                options: vec!["North".into(), "South".into(), "East".into()],
                answer: (*answer).to_owned(),
                difficulty: "Hard".into(),
                explanation: "See the article.".into(),
                section_reference: Some("Career".into()),
            })
            .collect(),
        related_topics: vec!["Navigation".into()],
        created_at: Some(fixed_now() + Duration::minutes(minutes)),
    }
    .validate()
    .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_document() {
    let repo = connect("memdb_quiz_roundtrip").await;
    let quiz = build_quiz(7, 0, &["North", "East"]);
    repo.upsert_quiz(&quiz).await.unwrap();

    let fetched = repo.get_quiz(QuizId::new(7)).await.expect("fetch");
    assert_eq!(fetched, quiz);
    assert_eq!(fetched.questions()[1].answer(), "East");
    assert_eq!(fetched.questions()[1].ordinal(), 1);
}

#[tokio::test]
async fn sqlite_upsert_replaces_and_lists_newest_first() {
    let repo = connect("memdb_quiz_history").await;
    repo.upsert_quiz(&build_quiz(1, 0, &["North"])).await.unwrap();
    repo.upsert_quiz(&build_quiz(2, 10, &["South"])).await.unwrap();
    repo.upsert_quiz(&build_quiz(1, 20, &["North", "South", "East"]))
        .await
        .unwrap();

    let history = repo.list_history().await.unwrap();
    let ids: Vec<u64> = history.iter().map(|h| h.id.value()).collect();
    assert_eq!(ids, [1, 2]);
    assert_eq!(history[0].question_count, 3);
    assert_eq!(history[0].url, "https://en.wikipedia.org/wiki/Article_1");
}

#[tokio::test]
async fn sqlite_remove_and_missing() {
    let repo = connect("memdb_quiz_remove").await;
    repo.upsert_quiz(&build_quiz(3, 0, &["North"])).await.unwrap();
    repo.remove_quiz(QuizId::new(3)).await.unwrap();

    let err = repo.get_quiz(QuizId::new(3)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    let err = repo.remove_quiz(QuizId::new(3)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_quiz_migrate").await;
    repo.migrate().await.expect("second migrate");
    assert!(repo.list_history().await.unwrap().is_empty());
}
