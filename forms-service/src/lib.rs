pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use service_core::error::AppError;
use service_core::middleware::{
    rate_limit::{IpRateLimiter, ip_rate_limit_middleware},
    security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{FormsConfig, SwaggerMode};
use crate::db::Database;
use crate::services::{AuthService, FormService, Mailer, TranslationProvider};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::verify_login,
        handlers::auth::verify_account,
        handlers::auth::send_verification,
        handlers::auth::me,
        handlers::auth::logout,
        handlers::forms::create_form,
        handlers::forms::list_forms,
        handlers::forms::list_my_forms,
        handlers::forms::get_form,
        handlers::forms::update_form,
        handlers::forms::delete_form,
        handlers::forms::close_form,
        handlers::forms::open_form,
        handlers::forms::translate_form,
        handlers::forms::get_form_fields,
        handlers::forms::add_field,
        handlers::forms::update_field,
        handlers::forms::delete_field,
        handlers::forms::get_answer_session,
        handlers::forms::respond_to_field,
        handlers::forms::save_responses,
        handlers::forms::edit_response,
        handlers::forms::delete_response,
        handlers::forms::submit_responses,
        handlers::forms::get_form_responses,
        handlers::forms::export_form_responses_csv,
        handlers::misc::translate_text,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::MessageResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::LoginRequest,
            dtos::auth::VerifyLoginRequest,
            dtos::auth::VerifyAccountRequest,
            dtos::auth::SendVerificationRequest,
            dtos::auth::UserResponse,
            dtos::form::FormCreateRequest,
            dtos::form::FormUpdateRequest,
            dtos::form::FormResponse,
            dtos::form::FieldCreateRequest,
            dtos::form::FieldUpdateRequest,
            dtos::form::FieldResponse,
            dtos::form::RespondRequest,
            dtos::form::SaveResponsesRequest,
            dtos::form::EditResponseRequest,
            dtos::form::AnswerResponse,
            dtos::form::AnswerSessionResponse,
            dtos::form::FormTranslation,
            dtos::form::TranslatedForm,
            dtos::form::TranslatedField,
            dtos::form::TranslateFormRequest,
            dtos::form::TranslateTextRequest,
            models::FieldType,
            services::translation::SupportedLanguage,
        )
    ),
    modifiers(&SessionCookieSecurity),
    tags(
        (name = "Authentication", description = "Registration, OTP login and sessions"),
        (name = "Forms", description = "Form management"),
        (name = "Fields", description = "Form field management"),
        (name = "Responses", description = "Anonymous response collection"),
        (name = "Miscellaneous", description = "Translation helpers"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SessionCookieSecurity;

impl Modify for SessionCookieSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    middleware::USER_SESSION_COOKIE,
                ))),
            );
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: FormsConfig,
    pub db: Database,
    pub auth_service: AuthService,
    pub form_service: FormService,
    pub translator: Arc<dyn TranslationProvider>,
    pub mailer: Mailer,
    pub login_rate_limiter: IpRateLimiter,
    pub register_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

/// Build the application router with all routes and middleware.
pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    let origins: Vec<HeaderValue> = state
        .config
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let login_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route_layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let register_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route_layer(from_fn_with_state(
            state.register_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let auth_routes = Router::new()
        .route("/auth/verify-login", post(handlers::auth::verify_login))
        .route("/auth/verify-account", post(handlers::auth::verify_account))
        .route(
            "/auth/send-verification",
            post(handlers::auth::send_verification),
        )
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/logout", post(handlers::auth::logout));

    let form_routes = Router::new()
        .route(
            "/forms",
            post(handlers::forms::create_form).get(handlers::forms::list_forms),
        )
        .route("/forms/my", get(handlers::forms::list_my_forms))
        .route("/forms/sessions", get(handlers::forms::get_answer_session))
        .route("/forms/fields", post(handlers::forms::add_field))
        .route(
            "/forms/fields/:field_id",
            put(handlers::forms::update_field).delete(handlers::forms::delete_field),
        )
        .route(
            "/forms/responses",
            post(handlers::forms::respond_to_field),
        )
        .route("/forms/responses/save", post(handlers::forms::save_responses))
        .route(
            "/forms/responses/:answer_id",
            put(handlers::forms::edit_response).delete(handlers::forms::delete_response),
        )
        .route(
            "/forms/:form_id",
            get(handlers::forms::get_form)
                .put(handlers::forms::update_form)
                .delete(handlers::forms::delete_form),
        )
        .route("/forms/:form_id/close", post(handlers::forms::close_form))
        .route("/forms/:form_id/open", post(handlers::forms::open_form))
        .route(
            "/forms/:form_id/translate",
            post(handlers::forms::translate_form),
        )
        .route(
            "/forms/:form_id/fields",
            get(handlers::forms::get_form_fields),
        )
        .route(
            "/forms/:form_id/sessions/submit",
            post(handlers::forms::submit_responses),
        )
        .route(
            "/forms/:form_id/responses",
            get(handlers::forms::get_form_responses),
        )
        .route(
            "/forms/:form_id/responses/export",
            get(handlers::forms::export_form_responses_csv),
        );

    let misc_routes = Router::new()
        .route("/translate", post(handlers::misc::translate_text))
        .route("/health", get(handlers::health::health_check));

    let mut app = Router::new()
        .merge(login_routes)
        .merge(register_routes)
        .merge(auth_routes)
        .merge(form_routes)
        .merge(misc_routes);

    if state.config.swagger.enabled == SwaggerMode::Public {
        app = app.merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    let app = app
        .layer(from_fn_with_state(
            state.ip_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}
