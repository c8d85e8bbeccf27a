//! Answer models - anonymous response sessions and per-field answers.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Answer session entity. Its id is the public `response_session_id`
/// cookie; respondents are anonymous.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerSession {
    pub answer_session_id: Uuid,
    pub form_id: Uuid,
    pub submitted_flag: bool,
    pub submitted_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl AnswerSession {
    pub fn new(form_id: Uuid) -> Self {
        Self {
            answer_session_id: Uuid::new_v4(),
            form_id,
            submitted_flag: false,
            submitted_utc: None,
            created_utc: Utc::now(),
        }
    }
}

/// Field answer entity. One row per (answer session, field), upserted.
#[derive(Debug, Clone, FromRow)]
pub struct FieldAnswer {
    pub answer_id: Uuid,
    pub field_id: Uuid,
    pub answer_session_id: Uuid,
    pub value_text: Option<String>,
}

impl FieldAnswer {
    pub fn new(field_id: Uuid, answer_session_id: Uuid, value_text: Option<String>) -> Self {
        Self {
            answer_id: Uuid::new_v4(),
            field_id,
            answer_session_id,
            value_text,
        }
    }
}
