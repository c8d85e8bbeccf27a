//! Answer validator collaborator.
//!
//! Consumes a field descriptor and a candidate value, returns accept or
//! reject. All rejections collapse to the same generic error; the field
//! rules themselves are data on the field row.

use validator::{ValidateEmail, ValidateUrl};

use crate::models::{FieldType, FormField};
use crate::services::error::ServiceError;

fn parse_bounds(bounds: &str) -> Option<(i64, i64)> {
    let mut parts = bounds.splitn(2, ':');
    let min = parts.next()?.trim().parse().ok()?;
    let max = parts.next()?.trim().parse().ok()?;
    Some((min, max))
}

fn possible_answers(field: &FormField) -> Vec<String> {
    field
        .possible_answers
        .as_deref()
        .map(|answers| answers.split('\\').map(|a| a.trim().to_string()).collect())
        .unwrap_or_default()
}

fn is_valid_phone(value: &str) -> bool {
    let digits: String = value
        .strip_prefix('+')
        .unwrap_or(value)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '(' && *c != ')')
        .collect();
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Validate a candidate answer against its field descriptor.
pub fn validate_answer(field: &FormField, answer: Option<&str>) -> Result<(), ServiceError> {
    let empty = answer.map_or(true, |a| a.is_empty());
    if field.required_flag && empty {
        return Err(ServiceError::InvalidAnswer);
    }
    if empty {
        return Ok(());
    }
    let value = answer.unwrap_or_default();

    let Some(field_type) = field.field_type() else {
        return Err(ServiceError::InvalidAnswer);
    };

    let accepted = match field_type {
        FieldType::Boolean => value == "0" || value == "1",
        FieldType::Select => possible_answers(field).iter().any(|a| a == value),
        FieldType::Multiselect => {
            let options = possible_answers(field);
            value
                .split(',')
                .all(|choice| options.iter().any(|a| a == choice))
        }
        FieldType::Numerical => match field.number_bounds.as_deref().and_then(parse_bounds) {
            Some((min, max)) => value
                .parse::<i64>()
                .map(|n| n >= min && n <= max)
                .unwrap_or(false),
            None => value.parse::<i64>().is_ok(),
        },
        FieldType::Text | FieldType::LongText => {
            match field.text_bounds.as_deref().and_then(parse_bounds) {
                Some((min, max)) => {
                    let len = value.chars().count() as i64;
                    len >= min && len <= max
                }
                None => true,
            }
        }
        FieldType::Email => value.validate_email(),
        FieldType::Phone => is_valid_phone(value),
        FieldType::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        FieldType::Url => value.validate_url(),
        FieldType::Alpha => value.chars().all(|c| c.is_ascii_alphabetic() || c == ' '),
        FieldType::Alphanum => value.chars().all(|c| c.is_ascii_alphanumeric() || c == ' '),
        FieldType::Currency => value.parse::<f64>().map(|n| n >= 0.0).unwrap_or(false),
    };

    if accepted {
        Ok(())
    } else {
        Err(ServiceError::InvalidAnswer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn field(field_type: FieldType, required: bool) -> FormField {
        FormField::new(
            Uuid::new_v4(),
            "label".into(),
            "description".into(),
            field_type,
            required,
        )
    }

    #[test]
    fn required_field_rejects_empty() {
        let f = field(FieldType::Text, true);
        assert!(validate_answer(&f, None).is_err());
        assert!(validate_answer(&f, Some("")).is_err());
        assert!(validate_answer(&f, Some("hello")).is_ok());
    }

    #[test]
    fn optional_field_accepts_empty() {
        let f = field(FieldType::Email, false);
        assert!(validate_answer(&f, None).is_ok());
    }

    #[test]
    fn boolean_accepts_only_zero_or_one() {
        let f = field(FieldType::Boolean, true);
        assert!(validate_answer(&f, Some("0")).is_ok());
        assert!(validate_answer(&f, Some("1")).is_ok());
        assert!(validate_answer(&f, Some("true")).is_err());
    }

    #[test]
    fn select_requires_known_option() {
        let mut f = field(FieldType::Select, true);
        f.possible_answers = Some(r"Red\Green\Blue".to_string());
        assert!(validate_answer(&f, Some("Green")).is_ok());
        assert!(validate_answer(&f, Some("Purple")).is_err());
    }

    #[test]
    fn multiselect_requires_every_choice_known() {
        let mut f = field(FieldType::Multiselect, true);
        f.possible_answers = Some(r"Red\Green\Blue".to_string());
        assert!(validate_answer(&f, Some("Red,Blue")).is_ok());
        assert!(validate_answer(&f, Some("Red,Purple")).is_err());
    }

    #[test]
    fn numerical_respects_bounds() {
        let mut f = field(FieldType::Numerical, true);
        f.number_bounds = Some("1:10".to_string());
        assert!(validate_answer(&f, Some("5")).is_ok());
        assert!(validate_answer(&f, Some("0")).is_err());
        assert!(validate_answer(&f, Some("11")).is_err());
        assert!(validate_answer(&f, Some("five")).is_err());
    }

    #[test]
    fn text_respects_length_bounds() {
        let mut f = field(FieldType::Text, true);
        f.text_bounds = Some("2:5".to_string());
        assert!(validate_answer(&f, Some("abc")).is_ok());
        assert!(validate_answer(&f, Some("a")).is_err());
        assert!(validate_answer(&f, Some("abcdef")).is_err());
    }

    #[test]
    fn email_and_url_formats() {
        assert!(validate_answer(&field(FieldType::Email, true), Some("a@x.com")).is_ok());
        assert!(validate_answer(&field(FieldType::Email, true), Some("not-an-email")).is_err());
        assert!(validate_answer(&field(FieldType::Url, true), Some("https://example.com")).is_ok());
        assert!(validate_answer(&field(FieldType::Url, true), Some("nope")).is_err());
    }

    #[test]
    fn date_requires_iso_format() {
        assert!(validate_answer(&field(FieldType::Date, true), Some("2024-02-29")).is_ok());
        assert!(validate_answer(&field(FieldType::Date, true), Some("29/02/2024")).is_err());
    }

    #[test]
    fn phone_is_lenient_but_numeric() {
        assert!(validate_answer(&field(FieldType::Phone, true), Some("+22890011223")).is_ok());
        assert!(validate_answer(&field(FieldType::Phone, true), Some("not a phone")).is_err());
    }

    #[test]
    fn alpha_and_alphanum() {
        assert!(validate_answer(&field(FieldType::Alpha, true), Some("John Doe")).is_ok());
        assert!(validate_answer(&field(FieldType::Alpha, true), Some("John 2nd")).is_err());
        assert!(validate_answer(&field(FieldType::Alphanum, true), Some("John 2nd")).is_ok());
        assert!(validate_answer(&field(FieldType::Alphanum, true), Some("John_2nd")).is_err());
    }
}
