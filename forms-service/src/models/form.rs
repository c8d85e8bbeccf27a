//! Form model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Form entity.
#[derive(Debug, Clone, FromRow)]
pub struct Form {
    pub form_id: Uuid,
    pub owner_user_id: Uuid,
    pub label: String,
    pub description: Option<String>,
    pub open_flag: bool,
    pub submissions_limit: Option<i32>,
    pub submission_count: i32,
    pub deadline_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl Form {
    /// Create a new, open form.
    pub fn new(
        owner_user_id: Uuid,
        label: String,
        description: Option<String>,
        submissions_limit: Option<i32>,
        deadline_utc: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            form_id: Uuid::new_v4(),
            owner_user_id,
            label,
            description,
            open_flag: true,
            submissions_limit,
            submission_count: 0,
            deadline_utc,
            created_utc: Utc::now(),
        }
    }

    /// Whether the form currently accepts responses.
    pub fn accepts_responses(&self, now: DateTime<Utc>) -> bool {
        self.open_flag
            && self.deadline_utc.map_or(true, |deadline| deadline > now)
            && self
                .submissions_limit
                .map_or(true, |limit| self.submission_count < limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn open_form_without_limits_accepts() {
        let form = Form::new(Uuid::new_v4(), "f".into(), None, None, None);
        assert!(form.accepts_responses(Utc::now()));
    }

    #[test]
    fn closed_form_rejects() {
        let mut form = Form::new(Uuid::new_v4(), "f".into(), None, None, None);
        form.open_flag = false;
        assert!(!form.accepts_responses(Utc::now()));
    }

    #[test]
    fn past_deadline_rejects() {
        let deadline = Utc::now() - Duration::hours(1);
        let form = Form::new(Uuid::new_v4(), "f".into(), None, None, Some(deadline));
        assert!(!form.accepts_responses(Utc::now()));
    }

    #[test]
    fn reached_submission_limit_rejects() {
        let mut form = Form::new(Uuid::new_v4(), "f".into(), None, Some(2), None);
        form.submission_count = 2;
        assert!(!form.accepts_responses(Utc::now()));
    }
}
