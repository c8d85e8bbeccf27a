use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::services::sessions::SessionSettings;

#[derive(Debug, Clone)]
pub struct FormsConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub smtp: SmtpConfig,
    pub security: SecurityConfig,
    pub frontend: FrontendConfig,
    pub gemini: GeminiConfig,
    pub sessions: SessionSettings,
    pub swagger: SwaggerConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub relay: String,
    pub port: u16,
    pub user: String,
    pub app_password: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
    pub admin_emails: Vec<String>,
    pub super_admin_emails: Vec<String>,
    pub admins_only_login: bool,
}

#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub enabled: SwaggerMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwaggerMode {
    Public,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub register_attempts: u32,
    pub register_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl FormsConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = FormsConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("forms-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10", is_prod)?,
            },
            smtp: SmtpConfig {
                relay: get_env("SMTP_RELAY", Some("smtp.gmail.com"), is_prod)?,
                port: parse_env("SMTP_PORT", "587", is_prod)?,
                user: get_env("APP_EMAIL_ADDRESS", None, is_prod)?,
                app_password: get_env("EMAIL_APP_PASSWORD", None, is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: split_csv(&get_env(
                    "CORS_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?),
                admin_emails: split_csv(&get_env("ADMIN_EMAILS", Some(""), is_prod)?),
                super_admin_emails: split_csv(&get_env("SUPER_ADMIN_EMAILS", Some(""), is_prod)?),
                admins_only_login: get_env("ALLOW_ADMINS_ONLY", Some("false"), is_prod)?
                    .parse()
                    .unwrap_or(false),
            },
            frontend: FrontendConfig {
                base_url: get_env(
                    "FRONTEND_BASE_URL",
                    Some("http://localhost:3000"),
                    is_prod,
                )?,
            },
            gemini: GeminiConfig {
                api_key: get_env("GEMINI_API_KEY", Some(""), is_prod)?,
                model: get_env("GEMINI_MODEL", Some("gemini-2.0-flash"), is_prod)?,
            },
            sessions: SessionSettings {
                login_ttl_days: parse_env("LOGIN_SESSION_TTL_DAYS", "60", is_prod)?,
                auth_ttl_minutes: parse_env("AUTH_SESSION_TTL_MINUTES", "60", is_prod)?,
                verification_ttl_hours: parse_env("VERIFICATION_SESSION_TTL_HOURS", "24", is_prod)?,
                otp_digits: parse_env("OTP_DIGITS", "8", is_prod)?,
                max_attempts: parse_env("OTP_MAX_ATTEMPTS", "3", is_prod)?,
            },
            swagger: SwaggerConfig {
                enabled: get_env("ENABLE_SWAGGER", Some("public"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse_env("RATE_LIMIT_LOGIN_ATTEMPTS", "5", is_prod)?,
                login_window_seconds: parse_env("RATE_LIMIT_LOGIN_WINDOW_SECONDS", "900", is_prod)?,
                register_attempts: parse_env("RATE_LIMIT_REGISTER_ATTEMPTS", "3", is_prod)?,
                register_window_seconds: parse_env(
                    "RATE_LIMIT_REGISTER_WINDOW_SECONDS",
                    "3600",
                    is_prod,
                )?,
                global_ip_limit: parse_env("RATE_LIMIT_GLOBAL_IP_LIMIT", "100", is_prod)?,
                global_ip_window_seconds: parse_env(
                    "RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS",
                    "60",
                    is_prod,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.sessions.login_ttl_days <= 0
            || self.sessions.auth_ttl_minutes <= 0
            || self.sessions.verification_ttl_hours <= 0
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "session TTLs must be positive"
            )));
        }

        if self.sessions.otp_digits < 4 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "OTP_DIGITS must be at least 4"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.swagger.enabled == SwaggerMode::Public {
                tracing::warn!(
                    "Swagger is publicly accessible in production - consider disabling it"
                );
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError> {
    get_env(key, Some(default), is_prod)?
        .parse()
        .map_err(|_| AppError::ConfigError(anyhow::anyhow!(format!("{} is not a valid value", key))))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for SwaggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(SwaggerMode::Public),
            "disabled" => Ok(SwaggerMode::Disabled),
            _ => Err(format!("Invalid swagger mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_splitting_trims_and_drops_empties() {
        assert_eq!(
            split_csv("a@x.com, b@x.com ,,"),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert!("staging".parse::<Environment>().is_err());
    }
}
