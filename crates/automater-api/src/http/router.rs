//! Axum router: `/health`, `/health/` and `/dispatch`.
//!
//! Unknown paths get a 404 envelope; known paths with the wrong method get a
//! 405 envelope. Middleware: body size limit, request tracing.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        .route(
            "/health",
            get(handlers::health::health).fallback(handlers::get_required),
        )
        .route(
            "/health/",
            get(handlers::health::health).fallback(handlers::get_required),
        )
        .route(
            "/dispatch",
            post(handlers::dispatch::dispatch).fallback(handlers::post_required),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use automater_core::auth::signer::sign_body;
    use automater_infra::crypto::signer::HmacSha256Signer;
    use automater_types::config::{parse_task_list, TriggerConfig};
    use automater_types::key::KeyId;
    use automater_types::secret::{Redacted, SecretMaterial, SourcedSecret};

    use super::*;

    const SCENARIO_BODY: &str = r#"{"task":"health","ref":"master","inputs":{"kind":"fix"}}"#;

    fn config() -> TriggerConfig {
        let mut config = TriggerConfig::default();
        config.auth.secrets.per_key.insert(
            KeyId::parse("K1").unwrap(),
            SourcedSecret::new(SecretMaterial::new("mysecret"), "AUTOMATE_TRIGGER_SECRET_K1"),
        );
        config.dispatch.owner = "acme".to_string();
        config.dispatch.repo = "site".to_string();
        config.dispatch.workflow = "automater-dispatch.yml".to_string();
        config
    }

    fn app(config: TriggerConfig) -> Router {
        build_router(AppState::new(config).unwrap())
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn signed_request(body: &str, ts: i64, sig: Option<&str>) -> Request<Body> {
        let sig = sig
            .map(str::to_string)
            .unwrap_or_else(|| sign_body(&HmacSha256Signer, b"mysecret", ts, body.as_bytes()).unwrap());
        Request::builder()
            .method("POST")
            .uri("/dispatch")
            .header("content-type", "application/json")
            .header("X-AUTOMATE-Kid", "K1")
            .header("X-AUTOMATE-Ts", ts.to_string())
            .header("X-AUTOMATE-Signature", sig)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        for uri in ["/health", "/health/"] {
            let (status, json) = send(app(config()), get(uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                json,
                serde_json::json!({"ok": true, "service": "site-automater-trigger"})
            );
        }
    }

    #[tokio::test]
    async fn test_health_without_repo_is_unknown() {
        let (_, json) = send(app(TriggerConfig::default()), get("/health")).await;
        assert_eq!(json["service"], "unknown-automater-trigger");
    }

    #[tokio::test]
    async fn test_health_wrong_method() {
        let request = Request::builder()
            .method("POST")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app(config()), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["code"], "MethodNotAllowed");
        assert_eq!(json["message"], "GET required");
    }

    #[tokio::test]
    async fn test_dispatch_wrong_method() {
        let (status, json) = send(app(config()), get("/dispatch")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["message"], "POST required");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, json) = send(app(config()), get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["ok"], false);
        assert_eq!(json["code"], "NotFound");
    }

    #[tokio::test]
    async fn test_missing_timestamp_header() {
        let request = Request::builder()
            .method("POST")
            .uri("/dispatch")
            .header("X-AUTOMATE-Signature", "00")
            .body(Body::from(SCENARIO_BODY))
            .unwrap();
        let (status, json) = send(app(config()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "MissingAuth");
    }

    #[tokio::test]
    async fn test_bad_signature() {
        let request = signed_request(SCENARIO_BODY, now(), Some("00"));
        let (status, json) = send(app(config()), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["ok"], false);
        assert_eq!(json["code"], "BadSignature");
        assert_eq!(json["kid"], "K1");
        assert!(json.get("debug").is_none());
    }

    #[tokio::test]
    async fn test_bad_signature_debug_mode_echoes_values() {
        let mut config = config();
        config.auth.debug = true;
        let ts = now();
        let (_, json) = send(app(config), signed_request(SCENARIO_BODY, ts, Some("00"))).await;
        assert_eq!(json["secretSource"], "AUTOMATE_TRIGGER_SECRET_K1");
        assert_eq!(json["debug"]["ts"], ts);
        assert_eq!(json["debug"]["rawBody"], SCENARIO_BODY);
        assert_eq!(
            json["debug"]["expected"],
            sign_body(&HmacSha256Signer, b"mysecret", ts, SCENARIO_BODY.as_bytes()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_uppercase_signature_is_accepted() {
        let ts = now();
        let sig = sign_body(&HmacSha256Signer, b"mysecret", ts, SCENARIO_BODY.as_bytes())
            .unwrap()
            .to_ascii_uppercase();
        let mut config = config();
        config.dev_mode = true;
        let (status, _) = send(app(config), signed_request(SCENARIO_BODY, ts, Some(&sig))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dev_mode_verifies_without_dispatch() {
        let mut config = config();
        config.dev_mode = true;
        let (status, json) = send(app(config), signed_request(SCENARIO_BODY, now(), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["verified"], true);
        assert_eq!(json["dispatched"], false);
        assert!(json["reason"].is_string());
    }

    #[tokio::test]
    async fn test_no_token_outside_dev_mode_is_misconfig() {
        let (status, json) = send(app(config()), signed_request(SCENARIO_BODY, now(), None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "Misconfig");
    }

    #[tokio::test]
    async fn test_task_not_in_allow_list() {
        let mut config = config();
        config.dev_mode = true;
        config.tasks.allowed = parse_task_list("health,scan");
        let request = signed_request(r#"{"task":"deploy"}"#, now(), None);
        let (status, json) = send(app(config), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "TaskNotAllowed");
    }

    #[tokio::test]
    async fn test_stale_timestamp() {
        let ts = now() - 3_600;
        let (status, json) = send(app(config()), signed_request(SCENARIO_BODY, ts, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "TimestampSkew");
    }

    #[tokio::test]
    async fn test_non_numeric_timestamp() {
        let request = Request::builder()
            .method("POST")
            .uri("/dispatch")
            .header("X-AUTOMATE-Ts", "yesterday")
            .header("X-AUTOMATE-Signature", "00")
            .body(Body::from(SCENARIO_BODY))
            .unwrap();
        let (status, json) = send(app(config()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "BadTimestamp");
    }

    #[tokio::test]
    async fn test_bad_kid() {
        let request = Request::builder()
            .method("POST")
            .uri("/dispatch")
            .header("X-AUTOMATER-Kid", "admin")
            .header("X-AUTOMATE-Ts", now().to_string())
            .header("X-AUTOMATE-Signature", "00")
            .body(Body::from(SCENARIO_BODY))
            .unwrap();
        let (status, json) = send(app(config()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "BadKid");
    }

    #[tokio::test]
    async fn test_legacy_header_names_and_secret() {
        let mut config = config();
        config.dev_mode = true;
        config.auth.secrets.per_key.clear();
        config.auth.secrets.legacy = Some(SourcedSecret::new(
            SecretMaterial::new("mysecret"),
            "AUTOMATER_TRIGGER_SECRET",
        ));
        let ts = now();
        let sig = sign_body(&HmacSha256Signer, b"mysecret", ts, SCENARIO_BODY.as_bytes()).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/dispatch")
            .header("X-AUTOMATER-Kid", "k3")
            .header("X-AUTOMATER-Timestamp", ts.to_string())
            .header("X-AUTOMATER-Signature", sig)
            .body(Body::from(SCENARIO_BODY))
            .unwrap();
        let (status, json) = send(app(config), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["verified"], true);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_rejected() {
        let mut config = config();
        config.server.max_body_bytes = 16;
        let body = format!(r#"{{"task":"health","pad":"{}"}}"#, "x".repeat(64));
        let (status, json) = send(app(config), signed_request(&body, now(), None)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["code"], "PayloadTooLarge");
    }

    fn github_config(server: &MockServer) -> TriggerConfig {
        let mut config = config();
        config.dispatch.token = Some(Redacted::new("ghp_test"));
        config.dispatch.api_base = server.uri();
        config
    }

    #[tokio::test]
    async fn test_dispatch_forwarded_to_github() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/site/actions/workflows/automater-dispatch.yml/dispatches"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let config = github_config(&server);
        let (status, json) = send(app(config), signed_request(SCENARIO_BODY, now(), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({
                "ok": true,
                "verified": true,
                "dispatched": true,
                "repo": "acme/site",
                "workflow": "automater-dispatch.yml",
                "ref": "master",
                "task": "health",
            })
        );
    }

    #[tokio::test]
    async fn test_github_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
            .mount(&server)
            .await;

        let config = github_config(&server);
        let (status, json) = send(app(config), signed_request(SCENARIO_BODY, now(), None)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "DispatchFailed");
        assert_eq!(json["status"], 404);
        assert_eq!(json["dispatched"], false);
        assert_eq!(json["github"], r#"{"message":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_rejected_request_makes_no_outbound_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let config = github_config(&server);
        let (status, _) = send(app(config), signed_request(SCENARIO_BODY, now(), Some("00"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
