//! models/confirmation_model.rs
//! Canales, resultados por canal y resultado agregado de un despacho.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canales de confirmación. El orden de declaración es el orden de intento
/// y el orden en que aparecen los resultados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationChannel {
    Voice,
    Email,
    Sms,
}

impl ConfirmationChannel {
    pub const ALL: [ConfirmationChannel; 3] = [
        ConfirmationChannel::Voice,
        ConfirmationChannel::Email,
        ConfirmationChannel::Sms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationChannel::Voice => "voice",
            ConfirmationChannel::Email => "email",
            ConfirmationChannel::Sms => "sms",
        }
    }
}

impl fmt::Display for ConfirmationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelErrorKind {
    ChannelTimeout,
    InvalidDestination,
    AuthFailure,
    RateLimited,
    ChannelProviderError,
    Cancelled,
}

impl fmt::Display for ChannelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChannelErrorKind::ChannelTimeout => "ChannelTimeout",
            ChannelErrorKind::InvalidDestination => "InvalidDestination",
            ChannelErrorKind::AuthFailure => "AuthFailure",
            ChannelErrorKind::RateLimited => "RateLimited",
            ChannelErrorKind::ChannelProviderError => "ChannelProviderError",
            ChannelErrorKind::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Falla ordinaria de un proveedor. Se devuelve como dato, nunca aborta el despacho.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ChannelFailure {
    pub kind: ChannelErrorKind,
    pub message: String,
}

impl ChannelFailure {
    pub fn new(kind: ChannelErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ChannelErrorKind::ChannelTimeout, message)
    }

    pub fn invalid_destination(message: impl Into<String>) -> Self {
        Self::new(ChannelErrorKind::InvalidDestination, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChannelErrorKind::ChannelProviderError, message)
    }
}

/// Resultado de intentar un canal para un trabajo. Inmutable una vez creado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutcome {
    pub channel: ConfirmationChannel,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ChannelErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChannelOutcome {
    pub fn succeeded(channel: ConfirmationChannel, provider_reference: String) -> Self {
        Self {
            channel,
            succeeded: true,
            provider_reference: Some(provider_reference),
            error_kind: None,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(channel: ConfirmationChannel, failure: ChannelFailure) -> Self {
        Self {
            channel,
            succeeded: false,
            provider_reference: None,
            error_kind: Some(failure.kind),
            error_message: Some(failure.message),
            timestamp: Utc::now(),
        }
    }

    /// "voice=ok(CA123)" / "sms=RateLimited(...)"
    pub fn summary(&self) -> String {
        if self.succeeded {
            format!(
                "{}=ok({})",
                self.channel,
                self.provider_reference.as_deref().unwrap_or_default()
            )
        } else {
            format!(
                "{}={}({})",
                self.channel,
                self.error_kind
                    .unwrap_or(ChannelErrorKind::ChannelProviderError),
                self.error_message.as_deref().unwrap_or_default()
            )
        }
    }
}

/// Agregado de todos los resultados de un despacho.
///
/// Política de éxito global: "best effort" entre canales. El trabajo queda
/// confirmado si al menos un canal llegó al cliente. Sin canales aplicables
/// el resultado es válido pero `overall_succeeded = false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub job_id: String,
    pub outcomes: Vec<ChannelOutcome>,
    pub overall_succeeded: bool,
    pub created_at: DateTime<Utc>,
}

impl DispatchResult {
    pub fn new(job_id: String, outcomes: Vec<ChannelOutcome>) -> Self {
        let overall_succeeded = outcomes.iter().any(|o| o.succeeded);
        Self {
            job_id,
            outcomes,
            overall_succeeded,
            created_at: Utc::now(),
        }
    }

    #[cfg(test)]
    pub fn outcome(&self, channel: ConfirmationChannel) -> Option<&ChannelOutcome> {
        self.outcomes.iter().find(|o| o.channel == channel)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}

/// Body de POST /confirm
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmRequest {
    #[serde(rename = "jobId", default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResponse {
    pub success: bool,
    pub message: String,
    /// Detalle por canal (el cliente debe revisar `overallSucceeded`).
    pub dispatch: DispatchResult,
}
