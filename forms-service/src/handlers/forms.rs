//! Form and response endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header, HeaderValue},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    AppState,
    dtos::{
        ErrorResponse, MessageResponse,
        form::{
            AnswerResponse, AnswerSessionResponse, EditResponseRequest, FieldCreateRequest,
            FieldResponse, FieldUpdateRequest, FormCreateRequest, FormResponse, FormTranslation,
            FormUpdateRequest, Pagination, RespondRequest, SaveResponsesRequest,
            TranslateFormRequest,
        },
    },
    middleware::{ANSWER_SESSION_COOKIE, CurrentUser, OptionalUser},
    utils::ValidatedJson,
};

fn answer_session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(ANSWER_SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}

fn answer_session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((ANSWER_SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .path("/")
        .build()
}

/// Create a form
#[utoipa::path(
    post,
    path = "/forms",
    request_body = FormCreateRequest,
    responses(
        (status = 201, description = "Form created", body = FormResponse),
        (status = 401, description = "Not authorized", body = ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<FormCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.create_form(&user, req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// List all forms - admin only
#[utoipa::path(
    get,
    path = "/forms",
    params(Pagination),
    responses(
        (status = 200, description = "All forms", body = Vec<FormResponse>),
        (status = 401, description = "Not authorized", body = ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn list_forms(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .list_forms(&user, page.skip, page.limit)
        .await?;
    Ok(Json(res))
}

/// List forms owned by the caller
#[utoipa::path(
    get,
    path = "/forms/my",
    params(Pagination),
    responses(
        (status = 200, description = "Own forms", body = Vec<FormResponse>)
    ),
    tag = "Forms"
)]
pub async fn list_my_forms(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .list_my_forms(&user, page.skip, page.limit)
        .await?;
    Ok(Json(res))
}

/// Get the caller's answer session
#[utoipa::path(
    get,
    path = "/forms/sessions",
    responses(
        (status = 200, description = "Answer session", body = AnswerSessionResponse),
        (status = 404, description = "No session", body = ErrorResponse)
    ),
    tag = "Responses"
)]
pub async fn get_answer_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .get_answer_session(answer_session_id(&jar))
        .await?;
    Ok(Json(res))
}

/// Get a form
#[utoipa::path(
    get,
    path = "/forms/{form_id}",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "The form", body = FormResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn get_form(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.get_form(user.as_ref(), form_id).await?;
    Ok(Json(res))
}

/// Translate a form's labels
#[utoipa::path(
    post,
    path = "/forms/{form_id}/translate",
    params(("form_id" = Uuid, Path, description = "Form id")),
    request_body = TranslateFormRequest,
    responses(
        (status = 200, description = "Translated form", body = FormTranslation),
        (status = 502, description = "Provider failure", body = ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn translate_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(req): Json<TranslateFormRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .translate_form(form_id, req.language)
        .await?;
    Ok(Json(res))
}

/// Update a form
#[utoipa::path(
    put,
    path = "/forms/{form_id}",
    params(("form_id" = Uuid, Path, description = "Form id")),
    request_body = FormUpdateRequest,
    responses(
        (status = 200, description = "Updated form", body = FormResponse),
        (status = 401, description = "Not authorized", body = ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn update_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(form_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<FormUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.update_form(&user, form_id, req).await?;
    Ok(Json(res))
}

/// Delete a form
#[utoipa::path(
    delete,
    path = "/forms/{form_id}",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Form deleted", body = MessageResponse),
        (status = 401, description = "Not authorized", body = ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn delete_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.delete_form(&user, form_id).await?;
    Ok(Json(res))
}

/// Close a form to new responses
#[utoipa::path(
    post,
    path = "/forms/{form_id}/close",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Form closed", body = MessageResponse)
    ),
    tag = "Forms"
)]
pub async fn close_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.set_form_open(&user, form_id, false).await?;
    Ok(Json(res))
}

/// Reopen a form for responses
#[utoipa::path(
    post,
    path = "/forms/{form_id}/open",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Form opened", body = MessageResponse)
    ),
    tag = "Forms"
)]
pub async fn open_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.set_form_open(&user, form_id, true).await?;
    Ok(Json(res))
}

/// Get a form's fields
#[utoipa::path(
    get,
    path = "/forms/{form_id}/fields",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Fields", body = Vec<FieldResponse>)
    ),
    tag = "Fields"
)]
pub async fn get_form_fields(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .get_form_fields(user.as_ref(), form_id)
        .await?;
    Ok(Json(res))
}

/// Add a field to a form
#[utoipa::path(
    post,
    path = "/forms/fields",
    request_body = FieldCreateRequest,
    responses(
        (status = 201, description = "Field added", body = FieldResponse),
        (status = 401, description = "Not authorized", body = ErrorResponse)
    ),
    tag = "Fields"
)]
pub async fn add_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<FieldCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.add_field(&user, req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// Update a field
#[utoipa::path(
    put,
    path = "/forms/fields/{field_id}",
    params(("field_id" = Uuid, Path, description = "Field id")),
    request_body = FieldUpdateRequest,
    responses(
        (status = 200, description = "Updated field", body = FieldResponse)
    ),
    tag = "Fields"
)]
pub async fn update_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(field_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<FieldUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.update_field(&user, field_id, req).await?;
    Ok(Json(res))
}

/// Delete a field
#[utoipa::path(
    delete,
    path = "/forms/fields/{field_id}",
    params(("field_id" = Uuid, Path, description = "Field id")),
    responses(
        (status = 200, description = "Field deleted", body = MessageResponse)
    ),
    tag = "Fields"
)]
pub async fn delete_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(field_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.form_service.delete_field(&user, field_id).await?;
    Ok(Json(res))
}

/// Record one answer (anonymous)
#[utoipa::path(
    post,
    path = "/forms/responses",
    request_body = RespondRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerResponse),
        (status = 422, description = "Form not accepting responses", body = ErrorResponse)
    ),
    tag = "Responses"
)]
pub async fn respond_to_field(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RespondRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (session, answer) = state
        .form_service
        .respond_to_field(answer_session_id(&jar), req)
        .await?;
    let jar = jar.add(answer_session_cookie(session.answer_session_id));
    Ok((jar, Json(answer)))
}

/// Save a batch of answers (anonymous)
#[utoipa::path(
    post,
    path = "/forms/responses/save",
    request_body = SaveResponsesRequest,
    responses(
        (status = 200, description = "Answers saved", body = AnswerSessionResponse),
        (status = 422, description = "Invalid answer", body = ErrorResponse)
    ),
    tag = "Responses"
)]
pub async fn save_responses(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SaveResponsesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .save_responses(answer_session_id(&jar), req)
        .await?;
    let jar = jar.add(answer_session_cookie(res.answer_session_id));
    Ok((jar, Json(res)))
}

/// Edit a recorded answer (anonymous, session-bound)
#[utoipa::path(
    put,
    path = "/forms/responses/{answer_id}",
    params(("answer_id" = Uuid, Path, description = "Answer id")),
    request_body = EditResponseRequest,
    responses(
        (status = 200, description = "Answer updated", body = AnswerResponse)
    ),
    tag = "Responses"
)]
pub async fn edit_response(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(answer_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<EditResponseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .edit_response(answer_id, answer_session_id(&jar), req.value)
        .await?;
    Ok(Json(res))
}

/// Delete a recorded answer
#[utoipa::path(
    delete,
    path = "/forms/responses/{answer_id}",
    params(("answer_id" = Uuid, Path, description = "Answer id")),
    responses(
        (status = 200, description = "Answer deleted", body = MessageResponse)
    ),
    tag = "Responses"
)]
pub async fn delete_response(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
    Path(answer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .delete_response(user.as_ref(), answer_id, answer_session_id(&jar))
        .await?;
    Ok(Json(res))
}

/// Submit the caller's answer session
#[utoipa::path(
    post,
    path = "/forms/{form_id}/sessions/submit",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Responses submitted", body = MessageResponse),
        (status = 422, description = "Missing or invalid answers", body = ErrorResponse)
    ),
    tag = "Responses"
)]
pub async fn submit_responses(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .submit(answer_session_id(&jar), form_id)
        .await?;
    let jar = jar.remove(Cookie::build(ANSWER_SESSION_COOKIE).path("/").build());
    Ok((jar, Json(res)))
}

/// List a form's submitted responses - owner or admin
#[utoipa::path(
    get,
    path = "/forms/{form_id}/responses",
    params(("form_id" = Uuid, Path, description = "Form id"), Pagination),
    responses(
        (status = 200, description = "Submitted sessions", body = Vec<AnswerSessionResponse>),
        (status = 401, description = "Not authorized", body = ErrorResponse)
    ),
    tag = "Responses"
)]
pub async fn get_form_responses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(form_id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .form_service
        .get_responses(&user, form_id, page.skip, page.limit)
        .await?;
    Ok(Json(res))
}

/// Export a form's submitted responses as CSV
#[utoipa::path(
    get,
    path = "/forms/{form_id}/responses/export",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 401, description = "Not authorized", body = ErrorResponse)
    ),
    tag = "Responses"
)]
pub async fn export_form_responses_csv(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (filename, csv) = state
        .form_service
        .export_responses_csv(&user, form_id)
        .await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
