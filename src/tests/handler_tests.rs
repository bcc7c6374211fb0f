//! tests/handler_tests.rs
//! Pruebas del endpoint POST /confirm.

#[cfg(test)]
mod tests {
    use actix_rt::test;
    use actix_web::{
        http::{header::ContentType, StatusCode},
        test as web_test, web, App,
    };
    use serde_json::{json, Value};

    use crate::app;
    use crate::models::confirmation_model::{ChannelErrorKind, ConfirmationChannel};
    use crate::services::confirmation_service::ConfirmationService;
    use crate::tests::support::{build_service, insert_job, short_timeouts, test_pool, Behavior, ScriptedAdapter};

    async fn post_confirm(service: ConfirmationService, payload: Value) -> (StatusCode, Value) {
        let app = web_test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(app::init_app),
        )
        .await;
        let req = web_test::TestRequest::post()
            .uri("/confirm")
            .set_json(payload)
            .to_request();
        let resp = web_test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = web_test::read_body_json(resp).await;
        (status, body)
    }

    #[test]
    async fn test_missing_job_id_is_bad_request() {
        let pool = test_pool().await;
        let (service, _) = build_service(&pool, vec![], short_timeouts());

        let (status, body) = post_confirm(service, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "jobId required" }));
    }

    #[test]
    async fn test_blank_job_id_is_bad_request() {
        let pool = test_pool().await;
        let (service, _) = build_service(&pool, vec![], short_timeouts());

        let (status, body) = post_confirm(service, json!({ "jobId": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "jobId required");
    }

    #[test]
    async fn test_malformed_json_is_bad_request() {
        let pool = test_pool().await;
        let (service, _) = build_service(&pool, vec![], short_timeouts());
        let app = web_test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(app::init_app),
        )
        .await;

        let req = web_test::TestRequest::post()
            .uri("/confirm")
            .insert_header(ContentType::json())
            .set_payload("{\"jobId\": ")
            .to_request();
        let resp = web_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = web_test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[test]
    async fn test_unknown_job_is_server_error() {
        let pool = test_pool().await;
        let (service, _) = build_service(&pool, vec![], short_timeouts());

        let (status, body) = post_confirm(service, json!({ "jobId": "nope" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Job not found: nope" }));
    }

    #[test]
    async fn test_all_channels_failed_is_still_ok_with_detail() {
        let pool = test_pool().await;
        insert_job(&pool, "J20", Some("+1-555-0120"), None).await;
        let (voice, _) = ScriptedAdapter::new(
            ConfirmationChannel::Voice,
            Behavior::Fail(ChannelErrorKind::InvalidDestination, "status 400: 21211: invalid To"),
        );
        let (service, _) = build_service(&pool, vec![voice], short_timeouts());

        let (status, body) = post_confirm(service, json!({ "jobId": "J20" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Confirmations sent");
        assert_eq!(body["dispatch"]["jobId"], "J20");
        assert_eq!(body["dispatch"]["overallSucceeded"], false);
        assert_eq!(body["dispatch"]["outcomes"][0]["channel"], "voice");
        assert_eq!(body["dispatch"]["outcomes"][0]["errorKind"], "InvalidDestination");
        assert!(body["dispatch"]["outcomes"][0].get("providerReference").is_none());
    }

    #[test]
    async fn test_successful_dispatch_exposes_provider_references() {
        let pool = test_pool().await;
        insert_job(&pool, "J21", Some("+1-555-0121"), Some("dana@example.com")).await;
        let (email, _) =
            ScriptedAdapter::new(ConfirmationChannel::Email, Behavior::Succeed("250 2.0.0 queued"));
        let (sms, _) = ScriptedAdapter::new(ConfirmationChannel::Sms, Behavior::Succeed("SM21"));
        let (service, _) = build_service(&pool, vec![email, sms], short_timeouts());

        let (status, body) = post_confirm(service, json!({ "jobId": "J21" })).await;
        assert_eq!(status, StatusCode::OK);
        let outcomes = body["dispatch"]["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["channel"], "email");
        assert_eq!(outcomes[0]["providerReference"], "250 2.0.0 queued");
        assert_eq!(outcomes[1]["channel"], "sms");
        assert!(outcomes[1].get("errorKind").is_none());
        assert_eq!(body["dispatch"]["overallSucceeded"], true);
    }
}
