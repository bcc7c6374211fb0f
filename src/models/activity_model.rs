//! models/activity_model.rs
//! Registro de auditoría (solo inserciones).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::confirmation_model::DispatchResult;

pub const SYSTEM_ACTOR_ID: &str = "system";
pub const SYSTEM_ACTOR_NAME: &str = "Confirmation Dispatcher";
pub const CONFIRMATION_MODULE: &str = "confirmation";
pub const SEND_CONFIRMATIONS_ACTION: &str = "send_confirmations";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub actor_id: String,
    pub actor_name: String,
    pub action: String,
    pub module: String,
    pub detail: String,
    pub job_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Entrada del actor de sistema para un despacho (éxito o falla total).
    pub fn for_dispatch(result: &DispatchResult) -> Self {
        let detail = if result.outcomes.is_empty() {
            "no applicable channels (no phone or email on file)".to_string()
        } else {
            result
                .outcomes
                .iter()
                .map(|o| o.summary())
                .collect::<Vec<_>>()
                .join("; ")
        };

        let error = if result.overall_succeeded {
            None
        } else if result.outcomes.is_empty() {
            Some("no confirmation channel attempted".to_string())
        } else {
            Some(format!(
                "all {} confirmation channels failed",
                result.outcomes.len()
            ))
        };

        Self {
            actor_id: SYSTEM_ACTOR_ID.to_string(),
            actor_name: SYSTEM_ACTOR_NAME.to_string(),
            action: SEND_CONFIRMATIONS_ACTION.to_string(),
            module: CONFIRMATION_MODULE.to_string(),
            detail,
            job_id: Some(result.job_id.clone()),
            error,
            created_at: result.created_at,
        }
    }
}
