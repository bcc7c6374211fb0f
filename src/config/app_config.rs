//! config/app_config.rs
//! Configuración global leída del entorno, con valores por defecto.

use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

use crate::models::confirmation_model::ConfirmationChannel;

/// Errores de configuración. Un adaptador que falla con uno de estos
/// queda deshabilitado durante toda la vida del proceso.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub http_workers: usize,
    pub database_url: String,
    pub company_name: String,
    pub timeouts: ChannelTimeouts,
    pub twilio: TwilioConfig,
    pub smtp: SmtpConfig,
}

/// Límite de tiempo por canal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTimeouts {
    pub voice: Duration,
    pub email: Duration,
    pub sms: Duration,
}

impl ChannelTimeouts {
    pub fn for_channel(&self, channel: ConfirmationChannel) -> Duration {
        match channel {
            ConfirmationChannel::Voice => self.voice,
            ConfirmationChannel::Email => self.email,
            ConfirmationChannel::Sms => self.sms,
        }
    }

    pub fn max(&self) -> Duration {
        self.voice.max(self.email).max(self.sms)
    }

    #[cfg(test)]
    pub fn uniform(limit: Duration) -> Self {
        Self {
            voice: limit,
            email: limit,
            sms: limit,
        }
    }
}

impl Default for ChannelTimeouts {
    fn default() -> Self {
        Self {
            voice: Duration::from_secs(20),
            email: Duration::from_secs(15),
            sms: Duration::from_secs(10),
        }
    }
}

/// Credenciales de Twilio (voz y SMS).
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub api_base: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twilio.com".to_string(),
            account_sid: None,
            auth_token: None,
            from_number: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 587,
            user: None,
            pass: None,
            from_address: None,
            from_name: "Dispatch".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 5022,
            http_workers: 1,
            database_url: "sqlite:data/dispatch.db".to_string(),
            company_name: "Demolition & Carting".to_string(),
            timeouts: ChannelTimeouts::default(),
            twilio: TwilioConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl AppConfig {
    /// Lee la configuración del entorno (llamar después de `dotenv()`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let timeouts = ChannelTimeouts {
            voice: env_millis("VOICE_TIMEOUT_MS", defaults.timeouts.voice)?,
            email: env_millis("EMAIL_TIMEOUT_MS", defaults.timeouts.email)?,
            sms: env_millis("SMS_TIMEOUT_MS", defaults.timeouts.sms)?,
        };

        let twilio = TwilioConfig {
            api_base: env_or("TWILIO_API_BASE", &defaults.twilio.api_base),
            account_sid: env_opt("TWILIO_ACCOUNT_SID"),
            auth_token: env_opt("TWILIO_AUTH_TOKEN"),
            from_number: env_opt("TWILIO_FROM_NUMBER"),
        };

        let smtp = SmtpConfig {
            host: env_opt("SMTP_HOST"),
            port: env_parse("SMTP_PORT", defaults.smtp.port)?,
            user: env_opt("SMTP_USER"),
            pass: env_opt("SMTP_PASS"),
            from_address: env_opt("SMTP_FROM_ADDRESS"),
            from_name: env_or("SMTP_FROM_NAME", &defaults.smtp.from_name),
        };

        Ok(AppConfig {
            bind_host: env_or("BIND_HOST", &defaults.bind_host),
            bind_port: env_parse("BIND_PORT", defaults.bind_port)?,
            http_workers: env_parse("HTTP_WORKERS", defaults.http_workers)?,
            database_url: env_or("DATABASE_URL", &defaults.database_url),
            company_name: env_or("COMPANY_NAME", &defaults.company_name),
            timeouts,
            twilio,
            smtp,
        })
    }
}

/// Variable opcional; vacía cuenta como ausente.
fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn env_millis(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let millis = env_parse::<u64>(key, default.as_millis() as u64)?;
    if millis == 0 {
        return Err(ConfigError::Invalid {
            key,
            message: "timeout must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_millis(millis))
}
