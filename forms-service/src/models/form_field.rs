//! Form field model - typed questions attached to a form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Field type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FieldType {
    Boolean,
    Numerical,
    Text,
    LongText,
    Select,
    Multiselect,
    Email,
    Phone,
    Currency,
    Date,
    #[serde(rename = "URL")]
    Url,
    Alpha,
    Alphanum,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Boolean => "Boolean",
            FieldType::Numerical => "Numerical",
            FieldType::Text => "Text",
            FieldType::LongText => "LongText",
            FieldType::Select => "Select",
            FieldType::Multiselect => "Multiselect",
            FieldType::Email => "Email",
            FieldType::Phone => "Phone",
            FieldType::Currency => "Currency",
            FieldType::Date => "Date",
            FieldType::Url => "URL",
            FieldType::Alpha => "Alpha",
            FieldType::Alphanum => "Alphanum",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "Boolean" => Some(FieldType::Boolean),
            "Numerical" => Some(FieldType::Numerical),
            "Text" => Some(FieldType::Text),
            "LongText" => Some(FieldType::LongText),
            "Select" => Some(FieldType::Select),
            "Multiselect" => Some(FieldType::Multiselect),
            "Email" => Some(FieldType::Email),
            "Phone" => Some(FieldType::Phone),
            "Currency" => Some(FieldType::Currency),
            "Date" => Some(FieldType::Date),
            "URL" => Some(FieldType::Url),
            "Alpha" => Some(FieldType::Alpha),
            "Alphanum" => Some(FieldType::Alphanum),
            _ => None,
        }
    }
}

/// Form field entity.
///
/// `possible_answers` is backslash-separated; `number_bounds` and
/// `text_bounds` are "min:max".
#[derive(Debug, Clone, FromRow)]
pub struct FormField {
    pub field_id: Uuid,
    pub form_id: Uuid,
    pub label: String,
    pub description: String,
    pub position: Option<i32>,
    pub field_type_code: String,
    pub required_flag: bool,
    pub possible_answers: Option<String>,
    pub number_bounds: Option<String>,
    pub text_bounds: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl FormField {
    pub fn new(
        form_id: Uuid,
        label: String,
        description: String,
        field_type: FieldType,
        required: bool,
    ) -> Self {
        Self {
            field_id: Uuid::new_v4(),
            form_id,
            label,
            description,
            position: None,
            field_type_code: field_type.as_str().to_string(),
            required_flag: required,
            possible_answers: None,
            number_bounds: None,
            text_bounds: None,
            created_utc: Utc::now(),
        }
    }

    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(&self.field_type_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_codes_round_trip() {
        for ty in [
            FieldType::Boolean,
            FieldType::Numerical,
            FieldType::Text,
            FieldType::LongText,
            FieldType::Select,
            FieldType::Multiselect,
            FieldType::Email,
            FieldType::Phone,
            FieldType::Currency,
            FieldType::Date,
            FieldType::Url,
            FieldType::Alpha,
            FieldType::Alphanum,
        ] {
            assert_eq!(FieldType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(FieldType::parse("Unknown"), None);
    }
}
