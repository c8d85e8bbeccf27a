//! Form service: owner-side CRUD and the public response flow.
//!
//! Every owner-side operation gates through the permission evaluator over
//! the caller's grant snapshot; the response flow is anonymous and bound to
//! the `response_session_id` cookie instead.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::Database;
use crate::dtos::MessageResponse;
use crate::dtos::form::{
    AnswerResponse, AnswerSessionResponse, FieldCreateRequest, FieldResponse, FieldUpdateRequest,
    FormCreateRequest, FormResponse, FormTranslation, FormUpdateRequest, RespondRequest,
    SaveResponsesRequest, TranslatedField, TranslatedForm,
};
use crate::models::{
    Action, AnswerSession, FieldAnswer, FieldType, Form, FormField, Permission, Resource, Role,
    RoleGrants, User,
};
use crate::services::authz::{
    ADMIN_ROLE_NAME, PermissionCheck, PermissionChecker, SUPER_ADMIN_ROLE_NAME,
};
use crate::services::error::ServiceError;
use crate::services::translation::{SupportedLanguage, TranslationProvider};
use crate::services::validation::validate_answer;

#[derive(Clone)]
pub struct FormService {
    db: Database,
    translator: Arc<dyn TranslationProvider>,
}

impl FormService {
    pub fn new(db: Database, translator: Arc<dyn TranslationProvider>) -> Self {
        Self { db, translator }
    }

    async fn grants_for(&self, user: &User) -> Result<Vec<RoleGrants>, ServiceError> {
        Ok(self.db.find_role_grants_for_user(user.user_id).await?)
    }

    // ==================== Forms ====================

    /// Create a form; the creator receives an ad hoc `form:<id>:rw` grant.
    pub async fn create_form(
        &self,
        user: &User,
        req: FormCreateRequest,
    ) -> Result<FormResponse, ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [PermissionCheck::global(Resource::Form, &[Action::ReadWrite])];
        PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
            .check(false, None)?;

        let form = Form::new(
            user.user_id,
            req.label,
            req.description,
            req.submissions_limit,
            req.deadline_utc,
        );
        let role = Role::grant_container();
        let permission =
            Permission::scoped(role.role_id, Resource::Form, form.form_id, Action::ReadWrite);
        self.db
            .create_form_with_grant(&form, &role, &permission)
            .await?;

        tracing::info!(form_id = %form.form_id, owner = %user.user_id, "form created");
        Ok(form.into())
    }

    /// List all forms - admin only.
    pub async fn list_forms(
        &self,
        user: &User,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FormResponse>, ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [PermissionCheck::global(Resource::Form, &[Action::ReadWrite])];
        PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
            .check(false, None)?;

        let forms = self.db.list_forms(skip, limit).await?;
        Ok(forms.into_iter().map(FormResponse::from).collect())
    }

    /// List forms owned by the caller.
    pub async fn list_my_forms(
        &self,
        user: &User,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FormResponse>, ServiceError> {
        let forms = self
            .db
            .list_forms_by_owner(user.user_id, skip, limit)
            .await?;
        Ok(forms.into_iter().map(FormResponse::from).collect())
    }

    /// Get a form. Public while it accepts responses; otherwise only its
    /// owner (or an admin) may see it.
    pub async fn get_form(
        &self,
        user: Option<&User>,
        form_id: Uuid,
    ) -> Result<FormResponse, ServiceError> {
        let form = self
            .db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;

        if !form.accepts_responses(Utc::now()) {
            let user = user.ok_or(ServiceError::NotAuthenticated)?;
            let grants = self.grants_for(user).await?;
            let checks = [PermissionCheck::scoped(
                Resource::Form,
                form_id,
                &[Action::ReadWrite],
            )];
            PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
                .check(false, None)?;
        }

        Ok(form.into())
    }

    /// Get a form's fields. Public while the form is open.
    pub async fn get_form_fields(
        &self,
        user: Option<&User>,
        form_id: Uuid,
    ) -> Result<Vec<FieldResponse>, ServiceError> {
        let form = self
            .db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;

        if !form.open_flag {
            let user = user.ok_or(ServiceError::NotAuthenticated)?;
            let grants = self.grants_for(user).await?;
            let checks = [PermissionCheck::scoped(
                Resource::Form,
                form_id,
                &[Action::ReadWrite],
            )];
            PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
                .check(false, None)?;
        }

        let fields = self.db.find_fields_by_form(form_id).await?;
        Ok(fields.into_iter().map(FieldResponse::from).collect())
    }

    /// Update form attributes.
    pub async fn update_form(
        &self,
        user: &User,
        form_id: Uuid,
        req: FormUpdateRequest,
    ) -> Result<FormResponse, ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::ReadWrite],
        )];
        PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
            .check(false, None)?;

        let mut form = self
            .db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;

        if let Some(label) = req.label {
            form.label = label;
        }
        if let Some(description) = req.description {
            form.description = Some(description);
        }
        if let Some(limit) = req.submissions_limit {
            form.submissions_limit = Some(limit);
        }
        if let Some(deadline) = req.deadline_utc {
            form.deadline_utc = Some(deadline);
        }

        self.db.update_form(&form).await?;
        Ok(form.into())
    }

    /// Delete a form and everything under it.
    pub async fn delete_form(
        &self,
        user: &User,
        form_id: Uuid,
    ) -> Result<MessageResponse, ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::ReadWrite],
        )];
        PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
            .check(false, None)?;

        self.db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;
        self.db.delete_form(form_id).await?;
        tracing::info!(form_id = %form_id, "form deleted");
        Ok(MessageResponse::new("Form deleted successfully"))
    }

    /// Open or close a form for responses.
    pub async fn set_form_open(
        &self,
        user: &User,
        form_id: Uuid,
        open: bool,
    ) -> Result<MessageResponse, ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::ReadWrite],
        )];
        PermissionChecker::new(&grants, &[SUPER_ADMIN_ROLE_NAME], &checks).check(false, None)?;

        self.db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;
        self.db.set_form_open(form_id, open).await?;
        Ok(MessageResponse::new(if open {
            "Form opened."
        } else {
            "Form closed."
        }))
    }

    /// Translate a form's labels via the LLM collaborator. Read-only:
    /// stored data never changes.
    pub async fn translate_form(
        &self,
        form_id: Uuid,
        language: SupportedLanguage,
    ) -> Result<FormTranslation, ServiceError> {
        let form = self
            .db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;
        let fields = self.db.find_fields_by_form(form_id).await?;

        let payload = FormTranslation {
            form: TranslatedForm {
                form_id: form.form_id,
                label: form.label,
                description: form.description,
            },
            fields: fields
                .into_iter()
                .map(|f| TranslatedField {
                    field_id: f.field_id,
                    label: f.label,
                    description: f.description,
                    possible_answers: f.possible_answers,
                })
                .collect(),
        };

        let json = serde_json::to_string(&payload)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;
        let translated = self.translator.translate_json(&json, language).await?;

        serde_json::from_str(&translated)
            .map_err(|e| ServiceError::TranslationError(format!("unparsable completion: {}", e)))
    }

    // ==================== Fields ====================

    /// Add a field to a form. Passes with either the scoped form grant or
    /// a global field grant; the creator receives a `formfield:<id>:rw`
    /// grant for the new field.
    pub async fn add_field(
        &self,
        user: &User,
        req: FieldCreateRequest,
    ) -> Result<FieldResponse, ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [
            PermissionCheck::scoped(Resource::Form, req.form_id, &[Action::ReadWrite]),
            PermissionCheck::global(Resource::FormField, &[Action::ReadWrite]),
        ];
        PermissionChecker::new(&grants, &[SUPER_ADMIN_ROLE_NAME], &checks).check(true, None)?;

        self.db
            .find_form_by_id(req.form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;

        let selectish = matches!(req.field_type, FieldType::Select | FieldType::Multiselect);
        if selectish && req.possible_answers.is_none() {
            return Err(ServiceError::ValidationError(
                "Select fields need possible answers".to_string(),
            ));
        }

        let mut field = FormField::new(
            req.form_id,
            req.label,
            req.description,
            req.field_type,
            req.required,
        );
        field.possible_answers = req.possible_answers;
        field.number_bounds = req.number_bounds;
        field.text_bounds = req.text_bounds;

        let role = Role::grant_container();
        let permission = Permission::scoped(
            role.role_id,
            Resource::FormField,
            field.field_id,
            Action::ReadWrite,
        );
        self.db
            .create_field_with_grant(&field, user.user_id, &role, &permission)
            .await?;

        tracing::info!(field_id = %field.field_id, form_id = %field.form_id, "field added");
        Ok(field.into())
    }

    /// Update a field. Either the scoped field grant or the scoped grant on
    /// its parent form suffices.
    pub async fn update_field(
        &self,
        user: &User,
        field_id: Uuid,
        req: FieldUpdateRequest,
    ) -> Result<FieldResponse, ServiceError> {
        let mut field = self
            .db
            .find_field_by_id(field_id)
            .await?
            .ok_or(ServiceError::FieldNotFound)?;

        let grants = self.grants_for(user).await?;
        let checks = [
            PermissionCheck::scoped(Resource::FormField, field_id, &[Action::ReadWrite]),
            PermissionCheck::scoped(Resource::Form, field.form_id, &[Action::ReadWrite]),
        ];
        PermissionChecker::new(&grants, &[SUPER_ADMIN_ROLE_NAME], &checks).check(true, None)?;

        if let Some(label) = req.label {
            field.label = label;
        }
        if let Some(description) = req.description {
            field.description = description;
        }
        if let Some(position) = req.position {
            field.position = Some(position);
        }
        if let Some(field_type) = req.field_type {
            field.field_type_code = field_type.as_str().to_string();
        }
        if let Some(required) = req.required {
            field.required_flag = required;
        }
        if let Some(possible_answers) = req.possible_answers {
            field.possible_answers = Some(possible_answers);
        }
        if let Some(number_bounds) = req.number_bounds {
            field.number_bounds = Some(number_bounds);
        }
        if let Some(text_bounds) = req.text_bounds {
            field.text_bounds = Some(text_bounds);
        }

        self.db.update_field(&field).await?;
        Ok(field.into())
    }

    /// Delete a field.
    pub async fn delete_field(
        &self,
        user: &User,
        field_id: Uuid,
    ) -> Result<MessageResponse, ServiceError> {
        let field = self
            .db
            .find_field_by_id(field_id)
            .await?
            .ok_or(ServiceError::FieldNotFound)?;

        let grants = self.grants_for(user).await?;
        let checks = [
            PermissionCheck::scoped(Resource::FormField, field_id, &[Action::ReadWrite]),
            PermissionCheck::scoped(Resource::Form, field.form_id, &[Action::ReadWrite]),
        ];
        PermissionChecker::new(&grants, &[SUPER_ADMIN_ROLE_NAME], &checks).check(true, None)?;

        self.db.delete_field(field_id).await?;
        Ok(MessageResponse::new("Field deleted successfully!"))
    }

    // ==================== Response flow (anonymous) ====================

    fn guard_accepting(form: &Form) -> Result<(), ServiceError> {
        if !form.open_flag {
            return Err(ServiceError::FormClosed);
        }
        if let Some(deadline) = form.deadline_utc {
            if deadline <= Utc::now() {
                return Err(ServiceError::DeadlineReached);
            }
        }
        if let Some(limit) = form.submissions_limit {
            if form.submission_count >= limit {
                return Err(ServiceError::SubmissionsLimitReached);
            }
        }
        Ok(())
    }

    async fn resolve_or_create_session(
        &self,
        answer_session_id: Option<Uuid>,
        form_id: Uuid,
    ) -> Result<AnswerSession, ServiceError> {
        match answer_session_id {
            Some(id) => self
                .db
                .find_answer_session(id)
                .await?
                .ok_or(ServiceError::AnswerSessionNotFound),
            None => {
                let session = AnswerSession::new(form_id);
                self.db.insert_answer_session(&session).await?;
                Ok(session)
            }
        }
    }

    /// Record one answer, creating the answer session on first contact.
    /// Values are not validated here; validation happens at submit time.
    pub async fn respond_to_field(
        &self,
        answer_session_id: Option<Uuid>,
        req: RespondRequest,
    ) -> Result<(AnswerSession, AnswerResponse), ServiceError> {
        let field = self
            .db
            .find_field_by_id(req.field_id)
            .await?
            .ok_or(ServiceError::FieldNotFound)?;
        let form = self
            .db
            .find_form_by_id(field.form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;
        Self::guard_accepting(&form)?;

        let session = self
            .resolve_or_create_session(answer_session_id, field.form_id)
            .await?;

        let answer = match self
            .db
            .find_answer_for_field(session.answer_session_id, field.field_id)
            .await?
        {
            Some(existing) => {
                self.db
                    .update_field_answer(existing.answer_id, req.value.as_deref())
                    .await?;
                FieldAnswer {
                    value_text: req.value,
                    ..existing
                }
            }
            None => {
                let answer =
                    FieldAnswer::new(field.field_id, session.answer_session_id, req.value);
                self.db.insert_field_answer(&answer).await?;
                answer
            }
        };

        Ok((session, answer.into()))
    }

    /// Bulk upsert of answers, each validated before it lands.
    pub async fn save_responses(
        &self,
        answer_session_id: Option<Uuid>,
        req: SaveResponsesRequest,
    ) -> Result<AnswerSessionResponse, ServiceError> {
        let session = self
            .resolve_or_create_session(answer_session_id, req.form_id)
            .await?;

        for (field_id, value) in &req.field_answers {
            let field = self
                .db
                .find_field_by_id(*field_id)
                .await?
                .ok_or(ServiceError::FieldNotFound)?;
            validate_answer(&field, value.as_deref())?;

            match self
                .db
                .find_answer_for_field(session.answer_session_id, *field_id)
                .await?
            {
                Some(existing) => {
                    self.db
                        .update_field_answer(existing.answer_id, value.as_deref())
                        .await?;
                }
                None => {
                    let answer =
                        FieldAnswer::new(*field_id, session.answer_session_id, value.clone());
                    self.db.insert_field_answer(&answer).await?;
                }
            }
        }

        let answers = self
            .db
            .find_answers_by_session(session.answer_session_id)
            .await?;
        Ok(AnswerSessionResponse::from_parts(session, answers))
    }

    /// Edit one previously recorded answer, bound to the session cookie.
    pub async fn edit_response(
        &self,
        answer_id: Uuid,
        answer_session_id: Option<Uuid>,
        value: Option<String>,
    ) -> Result<AnswerResponse, ServiceError> {
        let session_id = answer_session_id.ok_or(ServiceError::AnswerSessionNotFound)?;
        self.db
            .find_answer_session(session_id)
            .await?
            .ok_or(ServiceError::AnswerSessionNotFound)?;

        let answer = self
            .db
            .find_field_answer_by_id(answer_id)
            .await?
            .ok_or(ServiceError::AnswerNotFound)?;
        if answer.answer_session_id != session_id {
            return Err(ServiceError::NotAuthorized(
                "Not authorized to edit this resource".to_string(),
            ));
        }

        self.db
            .update_field_answer(answer_id, value.as_deref())
            .await?;
        Ok(FieldAnswer {
            value_text: value,
            ..answer
        }
        .into())
    }

    /// Delete an answer. The anonymous path requires the owning session
    /// cookie; the authenticated path requires the global response grant.
    pub async fn delete_response(
        &self,
        user: Option<&User>,
        answer_id: Uuid,
        answer_session_id: Option<Uuid>,
    ) -> Result<MessageResponse, ServiceError> {
        let answer = self
            .db
            .find_field_answer_by_id(answer_id)
            .await?
            .ok_or(ServiceError::AnswerNotFound)?;

        match answer_session_id {
            Some(session_id) => {
                self.db
                    .find_answer_session(session_id)
                    .await?
                    .ok_or(ServiceError::AnswerSessionNotFound)?;
                if answer.answer_session_id != session_id {
                    return Err(ServiceError::NotAuthorized(
                        "Not authorized to delete this resource".to_string(),
                    ));
                }
            }
            None => {
                let user = user.ok_or(ServiceError::NotAuthenticated)?;
                let grants = self.grants_for(user).await?;
                let checks = [PermissionCheck::global(
                    Resource::FieldResponse,
                    &[Action::ReadWrite],
                )];
                PermissionChecker::new(
                    &grants,
                    &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME],
                    &checks,
                )
                .check(false, None)?;
            }
        }

        self.db.delete_field_answer(answer_id).await?;
        Ok(MessageResponse::new("Answer deleted."))
    }

    /// Submit a session: every required field answered, every answer valid.
    pub async fn submit(
        &self,
        answer_session_id: Option<Uuid>,
        form_id: Uuid,
    ) -> Result<MessageResponse, ServiceError> {
        let session_id = answer_session_id.ok_or(ServiceError::AnswerSessionNotFound)?;
        let session = self
            .db
            .find_answer_session(session_id)
            .await?
            .ok_or(ServiceError::AnswerSessionNotFound)?;
        let form = self
            .db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;

        if let Some(limit) = form.submissions_limit {
            if form.submission_count >= limit {
                return Err(ServiceError::SubmissionsLimitReached);
            }
        }

        let answers = self
            .db
            .find_answers_by_session(session.answer_session_id)
            .await?;
        let answered: HashMap<Uuid, &FieldAnswer> =
            answers.iter().map(|a| (a.field_id, a)).collect();

        for required in self.db.find_required_fields(form_id).await? {
            if !answered.contains_key(&required.field_id) {
                return Err(ServiceError::RequiredFieldMissing(required.label));
            }
        }

        // Full validation happens only at submission time.
        let fields: HashMap<Uuid, FormField> = self
            .db
            .find_fields_by_form(form_id)
            .await?
            .into_iter()
            .map(|f| (f.field_id, f))
            .collect();
        for answer in &answers {
            if let Some(field) = fields.get(&answer.field_id) {
                validate_answer(field, answer.value_text.as_deref())?;
            }
        }

        self.db
            .submit_answer_session(session.answer_session_id, form_id, Utc::now())
            .await?;
        tracing::info!(form_id = %form_id, session_id = %session.answer_session_id, "responses submitted");
        Ok(MessageResponse::new("Responses submitted."))
    }

    /// Fetch the caller's answer session with its answers.
    pub async fn get_answer_session(
        &self,
        answer_session_id: Option<Uuid>,
    ) -> Result<AnswerSessionResponse, ServiceError> {
        let session_id = answer_session_id.ok_or(ServiceError::AnswerSessionNotFound)?;
        let session = self
            .db
            .find_answer_session(session_id)
            .await?
            .ok_or(ServiceError::AnswerSessionNotFound)?;
        let answers = self
            .db
            .find_answers_by_session(session.answer_session_id)
            .await?;
        Ok(AnswerSessionResponse::from_parts(session, answers))
    }

    /// List a form's submitted sessions - owner or admin.
    pub async fn get_responses(
        &self,
        user: &User,
        form_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AnswerSessionResponse>, ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::ReadWrite],
        )];
        PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
            .check(false, None)?;

        self.db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;

        let sessions = self.db.list_submitted_sessions(form_id, skip, limit).await?;
        let mut out = Vec::with_capacity(sessions.len());
        for session in sessions {
            let answers = self
                .db
                .find_answers_by_session(session.answer_session_id)
                .await?;
            out.push(AnswerSessionResponse::from_parts(session, answers));
        }
        Ok(out)
    }

    /// Export a form's submitted responses as CSV: one row per session,
    /// one column per field.
    pub async fn export_responses_csv(
        &self,
        user: &User,
        form_id: Uuid,
    ) -> Result<(String, String), ServiceError> {
        let grants = self.grants_for(user).await?;
        let checks = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::ReadWrite],
        )];
        PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
            .check(false, None)?;

        let form = self
            .db
            .find_form_by_id(form_id)
            .await?
            .ok_or(ServiceError::FormNotFound)?;
        let fields = self.db.find_fields_by_form(form_id).await?;
        let sessions = self.db.list_submitted_sessions(form_id, 0, i64::MAX).await?;

        let mut csv = String::new();
        let mut header: Vec<String> = fields.iter().map(|f| f.label.clone()).collect();
        header.push("Response ID".to_string());
        header.push("Submitted At".to_string());
        push_csv_row(&mut csv, &header);

        for session in sessions {
            let answers = self
                .db
                .find_answers_by_session(session.answer_session_id)
                .await?;
            let by_field: HashMap<Uuid, String> = answers
                .into_iter()
                .map(|a| (a.field_id, a.value_text.unwrap_or_default()))
                .collect();
            let mut row: Vec<String> = fields
                .iter()
                .map(|f| by_field.get(&f.field_id).cloned().unwrap_or_default())
                .collect();
            row.push(session.answer_session_id.to_string());
            row.push(
                session
                    .submitted_utc
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            );
            push_csv_row(&mut csv, &row);
        }

        let filename = format!("{}_responses.csv", form.label.trim().replace(' ', "_"));
        Ok((filename, csv))
    }
}

fn push_csv_row(out: &mut String, cells: &[String]) {
    let escaped: Vec<String> = cells
        .iter()
        .map(|cell| {
            if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect();
    out.push_str(&escaped.join(","));
    out.push_str("\r\n");
}
