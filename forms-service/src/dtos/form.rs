use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AnswerSession, FieldAnswer, FieldType, Form, FormField};
use crate::services::translation::SupportedLanguage;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FormCreateRequest {
    #[validate(length(min = 1, message = "Label is required"))]
    #[schema(example = "Community survey")]
    pub label: String,
    pub description: Option<String>,
    pub deadline_utc: Option<DateTime<Utc>>,
    pub submissions_limit: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FormUpdateRequest {
    pub label: Option<String>,
    pub description: Option<String>,
    pub deadline_utc: Option<DateTime<Utc>>,
    pub submissions_limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormResponse {
    pub form_id: Uuid,
    pub label: String,
    pub description: Option<String>,
    pub open: bool,
    pub submissions_limit: Option<i32>,
    pub submissions: i32,
    pub deadline_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl From<Form> for FormResponse {
    fn from(f: Form) -> Self {
        Self {
            form_id: f.form_id,
            label: f.label,
            description: f.description,
            open: f.open_flag,
            submissions_limit: f.submissions_limit,
            submissions: f.submission_count,
            deadline_utc: f.deadline_utc,
            created_utc: f.created_utc,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FieldCreateRequest {
    pub form_id: Uuid,

    #[validate(length(min = 1, message = "Label is required"))]
    pub label: String,

    pub description: String,
    pub field_type: FieldType,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Backslash-separated options (Select/Multiselect).
    pub possible_answers: Option<String>,
    /// "min:max"
    pub number_bounds: Option<String>,
    /// "min:max"
    pub text_bounds: Option<String>,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FieldUpdateRequest {
    pub label: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub field_type: Option<FieldType>,
    pub required: Option<bool>,
    pub possible_answers: Option<String>,
    pub number_bounds: Option<String>,
    pub text_bounds: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldResponse {
    pub field_id: Uuid,
    pub form_id: Uuid,
    pub label: String,
    pub description: String,
    pub position: Option<i32>,
    pub required: bool,
    pub field_type: String,
    pub possible_answers: Option<String>,
    pub number_bounds: Option<String>,
    pub text_bounds: Option<String>,
}

impl From<FormField> for FieldResponse {
    fn from(f: FormField) -> Self {
        Self {
            field_id: f.field_id,
            form_id: f.form_id,
            label: f.label,
            description: f.description,
            position: f.position,
            required: f.required_flag,
            field_type: f.field_type_code,
            possible_answers: f.possible_answers,
            number_bounds: f.number_bounds,
            text_bounds: f.text_bounds,
        }
    }
}

/// One answer within a response session.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RespondRequest {
    pub field_id: Uuid,
    pub value: Option<String>,
}

/// Bulk save: field_id -> value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveResponsesRequest {
    pub form_id: Uuid,
    pub field_answers: HashMap<Uuid, Option<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditResponseRequest {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerResponse {
    pub answer_id: Uuid,
    pub field_id: Uuid,
    pub answer_session_id: Uuid,
    pub value: Option<String>,
}

impl From<FieldAnswer> for AnswerResponse {
    fn from(a: FieldAnswer) -> Self {
        Self {
            answer_id: a.answer_id,
            field_id: a.field_id,
            answer_session_id: a.answer_session_id,
            value: a.value_text,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerSessionResponse {
    pub answer_session_id: Uuid,
    pub form_id: Uuid,
    pub submitted: bool,
    pub submitted_utc: Option<DateTime<Utc>>,
    pub answers: Vec<AnswerResponse>,
}

impl AnswerSessionResponse {
    pub fn from_parts(session: AnswerSession, answers: Vec<FieldAnswer>) -> Self {
        Self {
            answer_session_id: session.answer_session_id,
            form_id: session.form_id,
            submitted: session.submitted_flag,
            submitted_utc: session.submitted_utc,
            answers: answers.into_iter().map(AnswerResponse::from).collect(),
        }
    }
}

/// A form plus its fields, as fed to and returned by the translator.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormTranslation {
    pub form: TranslatedForm,
    pub fields: Vec<TranslatedField>,
}

/// Translatable form subset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranslatedForm {
    pub form_id: Uuid,
    pub label: String,
    pub description: Option<String>,
}

/// Translatable field subset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranslatedField {
    pub field_id: Uuid,
    pub label: String,
    pub description: String,
    pub possible_answers: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateFormRequest {
    pub language: SupportedLanguage,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateTextRequest {
    pub text: String,
    pub language: SupportedLanguage,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}
