//! PostgreSQL database service.
//!
//! Thin sqlx wrapper; one method per query, grouped by entity.

use service_core::error::AppError;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{
    AccountVerificationSession, AnswerSession, AuthSession, FieldAnswer, Form, FormField,
    LoginSession, Permission, Role, User,
};
use crate::models::role::RoleGrants;

fn db_err(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!(e))
}

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!("Database health check failed: {}", e))
            })?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Find user by ID.
    pub async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Find user by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Find user holding either the email or the username (uniqueness probe).
    pub async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1) OR username = $2",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Insert a new user together with its self-grant: an unnamed role
    /// linked to the user, holding the scoped permission on the user row.
    ///
    /// A concurrent duplicate insert surfaces as Conflict via the schema's
    /// unique constraints.
    pub async fn create_user_with_grants(
        &self,
        user: &User,
        role: &Role,
        permission: &Permission,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (user_id, email, username, password_hash, display_name, verified, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.verified)
        .bind(user.created_utc)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if let sqlx::Error::Database(ref dbe) = e {
                if dbe.code().as_deref() == Some("23505") {
                    return Err(AppError::Conflict(anyhow::anyhow!(
                        "email or username already registered"
                    )));
                }
            }
            return Err(db_err(e));
        }

        Self::insert_grant_in_tx(&mut tx, user.user_id, role, permission).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // ==================== Role / Permission Operations ====================

    async fn insert_grant_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        role: &Role,
        permission: &Permission,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO roles (role_id, role_name, created_utc) VALUES ($1, $2, $3)")
            .bind(role.role_id)
            .bind(&role.role_name)
            .bind(role.created_utc)
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role.role_id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO permissions (permission_id, role_id, resource_code, resource_id, action_code, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(permission.permission_id)
        .bind(permission.role_id)
        .bind(&permission.resource_code)
        .bind(permission.resource_id)
        .bind(&permission.action_code)
        .bind(permission.created_utc)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    /// Insert an ad hoc grant: a fresh role linked to `user_id` holding one
    /// permission.
    pub async fn create_grant(
        &self,
        user_id: Uuid,
        role: &Role,
        permission: &Permission,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        Self::insert_grant_in_tx(&mut tx, user_id, role, permission).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Find a named role.
    pub async fn find_role_by_name(&self, role_name: &str) -> Result<Option<Role>, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE role_name = $1")
            .bind(role_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Attach an existing role to a user.
    pub async fn link_user_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Load a user's full role set with each role's permissions, preserving
    /// attachment order. The permission evaluator runs over this snapshot.
    pub async fn find_role_grants_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RoleGrants>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.* FROM roles r
            JOIN user_roles ur ON r.role_id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.created_utc
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let role_ids: Vec<Uuid> = roles.iter().map(|r| r.role_id).collect();
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE role_id = ANY($1)",
        )
        .bind(&role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut grants: Vec<RoleGrants> = roles
            .into_iter()
            .map(|role| RoleGrants {
                role,
                permissions: Vec::new(),
            })
            .collect();
        for permission in permissions {
            if let Some(grant) = grants
                .iter_mut()
                .find(|g| g.role.role_id == permission.role_id)
            {
                grant.permissions.push(permission);
            }
        }

        Ok(grants)
    }

    // ==================== Login Session Operations ====================

    /// Insert a login session.
    pub async fn insert_login_session(&self, session: &LoginSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO login_sessions (session_id, user_id, expiry_utc, expired_flag, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.session_id)
        .bind(session.user_id)
        .bind(session.expiry_utc)
        .bind(session.expired_flag)
        .bind(session.created_utc)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Find login session by ID.
    pub async fn find_login_session(
        &self,
        session_id: &str,
    ) -> Result<Option<LoginSession>, AppError> {
        sqlx::query_as::<_, LoginSession>("SELECT * FROM login_sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    // ==================== Auth Session Operations ====================

    /// Insert a pre-login OTP session.
    pub async fn insert_auth_session(&self, session: &AuthSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (session_id, user_id, otp_code, attempt_count, attempt_max, expiry_utc, expired_flag, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&session.session_id)
        .bind(session.user_id)
        .bind(&session.otp_code)
        .bind(session.attempt_count)
        .bind(session.attempt_max)
        .bind(session.expiry_utc)
        .bind(session.expired_flag)
        .bind(session.created_utc)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Find auth session by ID.
    pub async fn find_auth_session(
        &self,
        session_id: &str,
    ) -> Result<Option<AuthSession>, AppError> {
        sqlx::query_as::<_, AuthSession>("SELECT * FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Increment an auth session's attempt counter.
    pub async fn increment_auth_session_attempts(
        &self,
        session_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE auth_sessions SET attempt_count = attempt_count + 1 WHERE session_id = $1",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// One-shot consume: soft-expire the auth session and mint the login
    /// session in the same transaction.
    pub async fn promote_auth_session(
        &self,
        auth_session_id: &str,
        login_session: &LoginSession,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("UPDATE auth_sessions SET expired_flag = true WHERE session_id = $1")
            .bind(auth_session_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO login_sessions (session_id, user_id, expiry_utc, expired_flag, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&login_session.session_id)
        .bind(login_session.user_id)
        .bind(login_session.expiry_utc)
        .bind(login_session.expired_flag)
        .bind(login_session.created_utc)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // ==================== Verification Session Operations ====================

    /// Insert an account-verification OTP session.
    pub async fn insert_verification_session(
        &self,
        session: &AccountVerificationSession,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO account_verification_sessions (session_id, user_id, otp_code, attempt_count, attempt_max, expiry_utc, expired_flag, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&session.session_id)
        .bind(session.user_id)
        .bind(&session.otp_code)
        .bind(session.attempt_count)
        .bind(session.attempt_max)
        .bind(session.expiry_utc)
        .bind(session.expired_flag)
        .bind(session.created_utc)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Find verification session by ID.
    pub async fn find_verification_session(
        &self,
        session_id: &str,
    ) -> Result<Option<AccountVerificationSession>, AppError> {
        sqlx::query_as::<_, AccountVerificationSession>(
            "SELECT * FROM account_verification_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Increment a verification session's attempt counter.
    pub async fn increment_verification_session_attempts(
        &self,
        session_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE account_verification_sessions SET attempt_count = attempt_count + 1 WHERE session_id = $1",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// One-shot consume: delete the verification session and mark the user
    /// verified in the same transaction.
    pub async fn finalize_verification_session(
        &self,
        session_id: &str,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM account_verification_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("UPDATE users SET verified = true WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // ==================== Form Operations ====================

    /// Insert a form together with its owner's ad hoc grant.
    pub async fn create_form_with_grant(
        &self,
        form: &Form,
        role: &Role,
        permission: &Permission,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO forms (form_id, owner_user_id, label, description, open_flag, submissions_limit, submission_count, deadline_utc, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(form.form_id)
        .bind(form.owner_user_id)
        .bind(&form.label)
        .bind(&form.description)
        .bind(form.open_flag)
        .bind(form.submissions_limit)
        .bind(form.submission_count)
        .bind(form.deadline_utc)
        .bind(form.created_utc)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        Self::insert_grant_in_tx(&mut tx, form.owner_user_id, role, permission).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Find form by ID.
    pub async fn find_form_by_id(&self, form_id: Uuid) -> Result<Option<Form>, AppError> {
        sqlx::query_as::<_, Form>("SELECT * FROM forms WHERE form_id = $1")
            .bind(form_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// List all forms with pagination.
    pub async fn list_forms(&self, skip: i64, limit: i64) -> Result<Vec<Form>, AppError> {
        sqlx::query_as::<_, Form>(
            "SELECT * FROM forms ORDER BY created_utc DESC OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    /// List forms owned by a user, with pagination.
    pub async fn list_forms_by_owner(
        &self,
        owner_user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Form>, AppError> {
        sqlx::query_as::<_, Form>(
            "SELECT * FROM forms WHERE owner_user_id = $1 ORDER BY created_utc DESC OFFSET $2 LIMIT $3",
        )
        .bind(owner_user_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Update a form's editable fields.
    pub async fn update_form(&self, form: &Form) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE forms
            SET label = $2, description = $3, open_flag = $4, submissions_limit = $5, deadline_utc = $6
            WHERE form_id = $1
            "#,
        )
        .bind(form.form_id)
        .bind(&form.label)
        .bind(&form.description)
        .bind(form.open_flag)
        .bind(form.submissions_limit)
        .bind(form.deadline_utc)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Delete a form (cascades to fields, answers and sessions).
    pub async fn delete_form(&self, form_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM forms WHERE form_id = $1")
            .bind(form_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Open or close a form.
    pub async fn set_form_open(&self, form_id: Uuid, open: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE forms SET open_flag = $2 WHERE form_id = $1")
            .bind(form_id)
            .bind(open)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ==================== Form Field Operations ====================

    /// Insert a field together with its creator's ad hoc grant.
    pub async fn create_field_with_grant(
        &self,
        field: &FormField,
        user_id: Uuid,
        role: &Role,
        permission: &Permission,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO form_fields (field_id, form_id, label, description, position, field_type_code, required_flag, possible_answers, number_bounds, text_bounds, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(field.field_id)
        .bind(field.form_id)
        .bind(&field.label)
        .bind(&field.description)
        .bind(field.position)
        .bind(&field.field_type_code)
        .bind(field.required_flag)
        .bind(&field.possible_answers)
        .bind(&field.number_bounds)
        .bind(&field.text_bounds)
        .bind(field.created_utc)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        Self::insert_grant_in_tx(&mut tx, user_id, role, permission).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Find field by ID.
    pub async fn find_field_by_id(&self, field_id: Uuid) -> Result<Option<FormField>, AppError> {
        sqlx::query_as::<_, FormField>("SELECT * FROM form_fields WHERE field_id = $1")
            .bind(field_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Find all fields of a form, ordered by position.
    pub async fn find_fields_by_form(&self, form_id: Uuid) -> Result<Vec<FormField>, AppError> {
        sqlx::query_as::<_, FormField>(
            "SELECT * FROM form_fields WHERE form_id = $1 ORDER BY position NULLS LAST, created_utc",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Find the required fields of a form.
    pub async fn find_required_fields(&self, form_id: Uuid) -> Result<Vec<FormField>, AppError> {
        sqlx::query_as::<_, FormField>(
            "SELECT * FROM form_fields WHERE form_id = $1 AND required_flag = true",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Update a field's editable attributes.
    pub async fn update_field(&self, field: &FormField) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE form_fields
            SET label = $2, description = $3, position = $4, field_type_code = $5, required_flag = $6, possible_answers = $7, number_bounds = $8, text_bounds = $9
            WHERE field_id = $1
            "#,
        )
        .bind(field.field_id)
        .bind(&field.label)
        .bind(&field.description)
        .bind(field.position)
        .bind(&field.field_type_code)
        .bind(field.required_flag)
        .bind(&field.possible_answers)
        .bind(&field.number_bounds)
        .bind(&field.text_bounds)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Delete a field (cascades to its answers).
    pub async fn delete_field(&self, field_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM form_fields WHERE field_id = $1")
            .bind(field_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ==================== Answer Session Operations ====================

    /// Insert an answer session.
    pub async fn insert_answer_session(&self, session: &AnswerSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO answer_sessions (answer_session_id, form_id, submitted_flag, submitted_utc, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.answer_session_id)
        .bind(session.form_id)
        .bind(session.submitted_flag)
        .bind(session.submitted_utc)
        .bind(session.created_utc)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Find answer session by ID.
    pub async fn find_answer_session(
        &self,
        answer_session_id: Uuid,
    ) -> Result<Option<AnswerSession>, AppError> {
        sqlx::query_as::<_, AnswerSession>(
            "SELECT * FROM answer_sessions WHERE answer_session_id = $1",
        )
        .bind(answer_session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// List a form's submitted sessions, oldest submission first.
    pub async fn list_submitted_sessions(
        &self,
        form_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AnswerSession>, AppError> {
        sqlx::query_as::<_, AnswerSession>(
            r#"
            SELECT * FROM answer_sessions
            WHERE form_id = $1 AND submitted_flag = true
            ORDER BY submitted_utc ASC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(form_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Mark a session submitted and bump the form's submission counter in
    /// one transaction.
    pub async fn submit_answer_session(
        &self,
        answer_session_id: Uuid,
        form_id: Uuid,
        submitted_utc: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "UPDATE answer_sessions SET submitted_flag = true, submitted_utc = $2 WHERE answer_session_id = $1",
        )
        .bind(answer_session_id)
        .bind(submitted_utc)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("UPDATE forms SET submission_count = submission_count + 1 WHERE form_id = $1")
            .bind(form_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // ==================== Field Answer Operations ====================

    /// Find all answers of a session.
    pub async fn find_answers_by_session(
        &self,
        answer_session_id: Uuid,
    ) -> Result<Vec<FieldAnswer>, AppError> {
        sqlx::query_as::<_, FieldAnswer>(
            "SELECT * FROM field_answers WHERE answer_session_id = $1",
        )
        .bind(answer_session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Find the answer a session gave to one field.
    pub async fn find_answer_for_field(
        &self,
        answer_session_id: Uuid,
        field_id: Uuid,
    ) -> Result<Option<FieldAnswer>, AppError> {
        sqlx::query_as::<_, FieldAnswer>(
            "SELECT * FROM field_answers WHERE answer_session_id = $1 AND field_id = $2",
        )
        .bind(answer_session_id)
        .bind(field_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Find field answer by ID.
    pub async fn find_field_answer_by_id(
        &self,
        answer_id: Uuid,
    ) -> Result<Option<FieldAnswer>, AppError> {
        sqlx::query_as::<_, FieldAnswer>("SELECT * FROM field_answers WHERE answer_id = $1")
            .bind(answer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Insert a field answer.
    pub async fn insert_field_answer(&self, answer: &FieldAnswer) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO field_answers (answer_id, field_id, answer_session_id, value_text)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(answer.answer_id)
        .bind(answer.field_id)
        .bind(answer.answer_session_id)
        .bind(&answer.value_text)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Update a field answer's value.
    pub async fn update_field_answer(
        &self,
        answer_id: Uuid,
        value_text: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE field_answers SET value_text = $2 WHERE answer_id = $1")
            .bind(answer_id)
            .bind(value_text)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Delete a field answer.
    pub async fn delete_field_answer(&self, answer_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM field_answers WHERE answer_id = $1")
            .bind(answer_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
