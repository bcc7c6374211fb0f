//! handlers/confirmation_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    models::confirmation_model::{ConfirmRequest, ConfirmResponse},
    services::confirmation_service::ConfirmationService,
};

/// POST /confirm
///
/// 200 aunque todos los canales fallen (el trabajo existe); el detalle por
/// canal va en `dispatch`. 500 solo si no se encontró el trabajo o falló
/// la orquestación.
pub async fn confirm_endpoint(
    confirmation_service: web::Data<ConfirmationService>,
    body: web::Json<ConfirmRequest>,
) -> HttpResponse {
    let job_id = match body
        .into_inner()
        .job_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
    {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "error": "jobId required"
            }))
        }
    };

    match confirmation_service.dispatch(&job_id).await {
        Ok(result) => HttpResponse::Ok().json(ConfirmResponse {
            success: true,
            message: "Confirmations sent".to_string(),
            dispatch: result,
        }),
        Err(e) => {
            log::error!("(confirm_endpoint) job_id={} error: {}", job_id, e);
            HttpResponse::InternalServerError().json(json!({
                "error": e.to_string()
            }))
        }
    }
}
