//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase on the wire; message tags are snake_case.

use serde::{Deserialize, Serialize};

use crate::badges::BadgeStatus;
use crate::checker::Judgement;
use crate::domain::{Language, Progress, Question, QuestionKind};
use crate::i18n::instruction;
use crate::visual::VisualSnapshot;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewQuestion {
        level: u32,
        #[serde(default)]
        lang: Option<String>,
    },
    SubmitAnswer {
        #[serde(rename = "questionId")]
        question_id: String,
        answer: String,
    },
    VisualStart {
        numerator: u32,
        denominator: u32,
    },
    AddBar,
    AddPartition {
        #[serde(rename = "barId")]
        bar_id: u32,
    },
    SegmentPress {
        #[serde(rename = "barId")]
        bar_id: u32,
        segment: u32,
    },
    SegmentMove {
        #[serde(rename = "barId")]
        bar_id: u32,
        segment: u32,
    },
    SegmentRelease {
        #[serde(rename = "barId")]
        bar_id: u32,
        segment: u32,
    },
    ReleaseOutside,
    SegmentToggle {
        #[serde(rename = "barId")]
        bar_id: u32,
        segment: u32,
    },
    SubmitVisual {
        #[serde(rename = "questionId")]
        question_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Question {
        question: QuestionOut,
    },
    AnswerResult(AnswerOut),
    VisualState {
        state: VisualSnapshot,
    },
    SelectedCount {
        count: String,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for question delivery. The answer is never sent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
    /// Present for standalone questions; session questions are addressed by index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    pub instruction: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerator: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<i64>,
    pub level: u32,
    pub language: Language,
}

pub fn to_out(id: Option<String>, q: &Question, level: u32) -> QuestionOut {
    QuestionOut {
        id,
        kind: q.kind,
        question: q.question.clone(),
        instruction: instruction(q.kind, q.language),
        numerator: q.numerator,
        denominator: q.denominator,
        level,
        language: q.language,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub level: Option<u32>,
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub question_id: String,
    pub answer: String,
}
#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub judgement: Judgement,
    /// Revealed once the answer has been judged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckIn {
    pub answer: String,
    pub expected: String,
}
#[derive(Serialize)]
pub struct CheckOut {
    pub correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct LevelStartIn {
    pub level: u32,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OnboardingStartIn {
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    pub questions: Vec<QuestionOut>,
}

#[derive(Debug, Deserialize)]
pub struct SessionAnswerIn {
    pub index: usize,
    pub answer: String,
}
#[derive(Debug, Serialize)]
pub struct SessionAnswerOut {
    pub judgement: Judgement,
    pub correct: bool,
    /// Revealed once the answer has been judged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub answered: usize,
    pub score: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelFinishOut {
    pub level: u32,
    pub score: u32,
    pub max_score: u32,
    pub stars: u8,
    pub new_badges: Vec<String>,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingFinishOut {
    pub correct: usize,
    pub total: usize,
    pub starting_level: u32,
    pub progress: Progress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageBody {
    pub language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgesOut {
    pub total_earned: usize,
    pub badges: Vec<BadgeStatus>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
