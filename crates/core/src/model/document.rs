use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

use crate::model::history::QuizHistoryItem;
use crate::model::ids::{QuestionId, QuizId};
use crate::model::question::{Question, QuestionDraft, QuestionError};
use crate::model::timestamp;

/// Label used for questions that carry no section reference.
pub const GENERAL_SECTION: &str = "General";

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Reasons a quiz document is rejected at load time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("duplicate question id {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("invalid question {id}: {source}")]
    Question {
        id: QuestionId,
        #[source]
        source: QuestionError,
    },

    #[error("invalid source url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

//
// ─── KEY ENTITIES ─────────────────────────────────────────────────────────────
//

/// Named entities the generator pulled out of the article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntities {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

impl KeyEntities {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.organizations.is_empty() && self.locations.is_empty()
    }
}

//
// ─── SOURCE URL ───────────────────────────────────────────────────────────────
//

/// Parse a reference-article link, accepting only `http` and `https`.
///
/// # Errors
///
/// Returns `DocumentError::InvalidUrl` if the string is not an absolute web URL.
pub fn parse_source_url(raw: &str) -> Result<Url, DocumentError> {
    let url = Url::parse(raw.trim()).map_err(|e| DocumentError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DocumentError::InvalidUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

//
// ─── DOCUMENT TYPES ───────────────────────────────────────────────────────────
//

/// Wire shape of a quiz as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDocumentDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuizId>,
    pub title: String,
    pub url: String,
    pub summary: String,
    #[serde(default)]
    pub key_entities: KeyEntities,
    #[serde(default)]
    pub sections: Vec<String>,
    pub quiz: Vec<QuestionDraft>,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_opt"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuizDocumentDraft {
    /// Validate every question and assign stable ordinals.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` when the question list is empty, an id repeats,
    /// a question is malformed, or the source URL is not a web URL.
    pub fn validate(self) -> Result<QuizDocument, DocumentError> {
        if self.quiz.is_empty() {
            return Err(DocumentError::NoQuestions);
        }
        let url = parse_source_url(&self.url)?;

        let mut ordinals = HashMap::with_capacity(self.quiz.len());
        let mut questions = Vec::with_capacity(self.quiz.len());
        for (ordinal, draft) in self.quiz.into_iter().enumerate() {
            let id = draft.id;
            if ordinals.insert(id, ordinal).is_some() {
                return Err(DocumentError::DuplicateQuestionId(id));
            }
            let question = draft
                .validate(ordinal)
                .map_err(|source| DocumentError::Question { id, source })?;
            questions.push(question);
        }

        Ok(QuizDocument {
            id: self.id,
            title: self.title,
            url,
            summary: self.summary,
            key_entities: self.key_entities,
            sections: self.sections,
            questions,
            related_topics: self.related_topics,
            created_at: self.created_at,
            ordinals,
        })
    }
}

/// Ordinals of the questions that share one section reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup {
    pub name: String,
    pub ordinals: Vec<usize>,
}

/// An immutable, validated quiz.
///
/// Never empty, every answer is one of its question's options, and every
/// question knows its ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizDocumentDraft", into = "QuizDocumentDraft")]
pub struct QuizDocument {
    id: Option<QuizId>,
    title: String,
    url: Url,
    summary: String,
    key_entities: KeyEntities,
    sections: Vec<String>,
    questions: Vec<Question>,
    related_topics: Vec<String>,
    created_at: Option<DateTime<Utc>>,
    ordinals: HashMap<QuestionId, usize>,
}

impl TryFrom<QuizDocumentDraft> for QuizDocument {
    type Error = DocumentError;

    fn try_from(draft: QuizDocumentDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<QuizDocument> for QuizDocumentDraft {
    fn from(doc: QuizDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            url: doc.url.into(),
            summary: doc.summary,
            key_entities: doc.key_entities,
            sections: doc.sections,
            quiz: doc.questions.iter().map(Question::to_draft).collect(),
            related_topics: doc.related_topics,
            created_at: doc.created_at,
        }
    }
}

impl QuizDocument {
    #[must_use]
    pub fn id(&self) -> Option<QuizId> {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn key_entities(&self) -> &KeyEntities {
        &self.key_entities
    }

    #[must_use]
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    #[must_use]
    pub fn related_topics(&self) -> &[String] {
        &self.related_topics
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Always at least 1.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, ordinal: usize) -> Option<&Question> {
        self.questions.get(ordinal)
    }

    #[must_use]
    pub fn ordinal_of(&self, id: QuestionId) -> Option<usize> {
        self.ordinals.get(&id).copied()
    }

    #[must_use]
    pub fn question_by_id(&self, id: QuestionId) -> Option<&Question> {
        self.ordinal_of(id).and_then(|ordinal| self.question(ordinal))
    }

    /// Group question ordinals by section reference, in order of first appearance.
    #[must_use]
    pub fn questions_by_section(&self) -> Vec<SectionGroup> {
        let mut groups: Vec<SectionGroup> = Vec::new();
        for question in &self.questions {
            let name = question.section_reference().unwrap_or(GENERAL_SECTION);
            match groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.ordinals.push(question.ordinal()),
                None => groups.push(SectionGroup {
                    name: name.to_owned(),
                    ordinals: vec![question.ordinal()],
                }),
            }
        }
        groups
    }

    /// History listing entry, available once the backend assigned an id and timestamp.
    #[must_use]
    pub fn history_item(&self) -> Option<QuizHistoryItem> {
        Some(QuizHistoryItem {
            id: self.id?,
            url: self.url.to_string(),
            title: self.title.clone(),
            created_at: self.created_at?,
            question_count: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{document_draft, question_draft};

    #[test]
    fn validate_assigns_ordinals_in_order() {
        let doc = document_draft(&["A", "B", "C"]).validate().unwrap();
        assert_eq!(doc.question_count(), 3);
        for (i, q) in doc.questions().iter().enumerate() {
            assert_eq!(q.ordinal(), i);
            assert_eq!(doc.ordinal_of(q.id()), Some(i));
        }
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let mut draft = document_draft(&["A"]);
        draft.quiz.clear();
        assert_eq!(draft.validate().unwrap_err(), DocumentError::NoQuestions);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut draft = document_draft(&["A", "B"]);
        draft.quiz[1].id = draft.quiz[0].id;
        assert_eq!(
            draft.validate().unwrap_err(),
            DocumentError::DuplicateQuestionId(QuestionId::new(1))
        );
    }

    #[test]
    fn answer_outside_options_is_rejected() {
        let mut draft = document_draft(&["A", "B"]);
        draft.quiz[1].answer = "Z".into();
        let err = draft.validate().unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Question {
                source: QuestionError::AnswerNotInOptions { .. },
                ..
            }
        ));
    }

    #[test]
    fn non_web_url_is_rejected() {
        let mut draft = document_draft(&["A"]);
        draft.url = "ftp://example.org/article".into();
        assert!(matches!(
            draft.validate().unwrap_err(),
            DocumentError::InvalidUrl { .. }
        ));
    }

    #[test]
    fn sections_group_in_first_seen_order() {
        let mut draft = document_draft(&["A", "B", "C", "D"]);
        draft.quiz[0].section_reference = Some("History".into());
        draft.quiz[1].section_reference = None;
        draft.quiz[2].section_reference = Some("History".into());
        draft.quiz[3].section_reference = Some("Legacy".into());
        let doc = draft.validate().unwrap();

        let groups = doc.questions_by_section();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["History", GENERAL_SECTION, "Legacy"]);
        assert_eq!(groups[0].ordinals, vec![0, 2]);
    }

    #[test]
    fn deserializes_backend_payload() {
        let json = r#"{
            "id": 12,
            "title": "Alan Turing",
            "url": "https://en.wikipedia.org/wiki/Alan_Turing",
            "summary": "Mathematician.",
            "key_entities": {"people": ["Alan Turing"], "organizations": [], "locations": ["Bletchley Park"]},
            "sections": ["Early life"],
            "quiz": [{
                "id": 1,
                "question": "Where did Turing work during the war?",
                "options": ["Bletchley Park", "Cambridge"],
                "answer": "Bletchley Park",
                "difficulty": "MEDIUM",
                "explanation": "Codebreaking.",
                "section_reference": "Early life"
            }],
            "related_topics": ["Enigma"],
            "created_at": "2024-05-01T10:00:00Z"
        }"#;
        let doc: QuizDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id(), Some(QuizId::new(12)));
        assert_eq!(doc.key_entities().locations, ["Bletchley Park"]);
        let item = doc.history_item().unwrap();
        assert_eq!(item.question_count, 1);
    }

    #[test]
    fn naive_created_at_is_read_as_utc() {
        let mut value = serde_json::to_value(document_draft(&["A"])).unwrap();
        value["id"] = serde_json::json!(3);
        value["created_at"] = serde_json::json!("2024-05-01T10:00:00");
        let doc: QuizDocument = serde_json::from_value(value).unwrap();

        let created = doc.created_at().unwrap();
        assert_eq!(created.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert!(doc.history_item().is_some());

        let round_trip: QuizDocument =
            serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(round_trip, doc);
    }

    #[test]
    fn malformed_payload_fails_to_deserialize() {
        let mut draft = document_draft(&["A"]);
        draft.quiz.push(question_draft(2, "B"));
        draft.quiz[1].options = vec!["only".into()];
        let json = serde_json::to_string(&draft).unwrap();
        assert!(serde_json::from_str::<QuizDocument>(&json).is_err());
    }
}
