//! services/twilio_client.rs
//! Cliente REST mínimo de Twilio (Calls / Messages). Lo usan los
//! adaptadores de voz y SMS; cada uno tiene su propia instancia.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    config::app_config::{ConfigError, TwilioConfig},
    models::confirmation_model::{ChannelErrorKind, ChannelFailure},
};

#[derive(Debug, Clone)]
pub struct TwilioClient {
    http_client: Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct TwilioResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

impl TwilioClient {
    pub fn new(config: &TwilioConfig) -> Result<Self, ConfigError> {
        let account_sid = config
            .account_sid
            .clone()
            .ok_or(ConfigError::Missing("TWILIO_ACCOUNT_SID"))?;
        let auth_token = config
            .auth_token
            .clone()
            .ok_or(ConfigError::Missing("TWILIO_AUTH_TOKEN"))?;
        let from_number = config
            .from_number
            .clone()
            .ok_or(ConfigError::Missing("TWILIO_FROM_NUMBER"))?;

        let http_client = Client::builder()
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "TWILIO_API_BASE",
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_sid,
            auth_token,
            from_number,
        })
    }

    /// POST /2010-04-01/Accounts/{sid}/{resource}.json
    /// Devuelve el `sid` del recurso creado.
    pub async fn create(
        &self,
        resource: &str,
        to: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ChannelFailure> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/{}.json",
            self.api_base, self.account_sid, resource
        );

        let mut form: Vec<(&str, &str)> = vec![("To", to), ("From", self.from_number.as_str())];
        form.extend_from_slice(params);

        log::info!("(twilio) POST {} to={}", resource, to);
        let resp = self
            .http_client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::error!("(twilio) {} respondió status={} body='{}'", resource, status, body);
            return Err(map_status_error(status, &body));
        }

        let created = resp
            .json::<TwilioResource>()
            .await
            .map_err(|e| ChannelFailure::provider(format!("invalid Twilio response: {e}")))?;
        Ok(created.sid)
    }
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> ChannelFailure {
    if error.is_timeout() {
        ChannelFailure::timeout(error.to_string())
    } else {
        ChannelFailure::provider(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &str) -> ChannelFailure {
    let detail = serde_json::from_str::<TwilioErrorBody>(body)
        .ok()
        .and_then(|b| match (b.code, b.message) {
            (Some(code), Some(msg)) => Some(format!("{code}: {msg}")),
            (None, Some(msg)) => Some(msg),
            _ => None,
        })
        .unwrap_or_else(|| body.chars().take(160).collect());
    let message = format!("status {}: {}", status.as_u16(), detail);

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChannelErrorKind::AuthFailure,
        StatusCode::TOO_MANY_REQUESTS => ChannelErrorKind::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ChannelErrorKind::ChannelTimeout
        }
        _ if status.is_client_error() => ChannelErrorKind::InvalidDestination,
        _ => ChannelErrorKind::ChannelProviderError,
    };
    ChannelFailure::new(kind, message)
}
