//! app.rs
use actix_web::{error, web, HttpResponse};
use serde_json::json;

use crate::handlers::confirmation_handler;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/confirm", web::post().to(confirmation_handler::confirm_endpoint));
}

/// JSON inválido -> 400 con el mismo formato `{ error }`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": message })),
        )
        .into()
    })
}
