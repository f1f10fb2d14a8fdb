//! Request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use vassago_core::{Error, Result, TrackingId};
use vassago_mail::{tracking_email, tracking_url};
use vassago_telemetry::SendTimer;

use crate::api::{
    error_parts, ReportResponse, SendEmailRequest, SendEmailResponse, StatusResponse,
};
use crate::pixel::pixel_response;
use crate::server::AppState;

fn error_response(err: &Error) -> Response {
    let (status, body) = error_parts(err);
    match err {
        e if e.is_client_error() => tracing::debug!(error = %e, "Rejected request"),
        // Logged with its tracking id where the send failed.
        Error::Mail { .. } => {},
        e => tracing::error!(error = %e, "Request failed"),
    }
    (status, Json(body)).into_response()
}

// === Health Endpoints ===

pub(crate) async fn health() -> &'static str {
    "OK"
}

pub(crate) async fn server_status(State(state): State<Arc<AppState>>) -> Response {
    let tracked_emails = match state.store.count().await {
        Ok(count) => count,
        Err(e) => return error_response(&e),
    };

    Json(StatusResponse {
        status: "running".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        tracked_emails,
        public_url: state.config.public_url.clone(),
        metrics: state.metrics.snapshot(),
    })
    .into_response()
}

// === Tracking Endpoints ===

pub(crate) async fn track_pixel(
    State(state): State<Arc<AppState>>,
    Path(pixel_id): Path<String>,
) -> Response {
    let id = TrackingId::from(pixel_id);

    match state.store.record_open(&id).await {
        Ok(true) => {
            state.metrics.record_pixel(true);
            tracing::info!(tracking_id = %id, "Email opened");
            pixel_response()
        },
        Ok(false) => {
            state.metrics.record_pixel(false);
            tracing::debug!(tracking_id = %id, "Unknown tracking pixel");
            StatusCode::NOT_FOUND.into_response()
        },
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn send_email(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match dispatch(&state, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn dispatch(state: &AppState, body: &[u8]) -> Result<SendEmailResponse> {
    let request = SendEmailRequest::from_slice(body)?;

    // The record is kept even if the send below fails.
    let tracking_id = state.store.create(&request.email).await?;

    let url = tracking_url(&state.config.public_url, &tracking_id);
    let mail = tracking_email(
        state.config.sender.as_str(),
        request.email,
        state.config.subject.as_str(),
        &url,
    );

    let timer = SendTimer::start();
    let outcome = state.mailer.send(mail).await;
    timer.finish(&state.metrics, tracking_id.as_str(), outcome.is_ok());

    if let Err(e) = outcome {
        tracing::warn!(
            tracking_id = %tracking_id,
            error = %e,
            "Failed to send tracking email; record kept"
        );
        return Err(e);
    }

    tracing::info!(tracking_id = %tracking_id, "Tracking email sent");
    Ok(SendEmailResponse {
        message: "Email sent!".to_string(),
        tracking_id,
    })
}

pub(crate) async fn report(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Response {
    let record = match state.store.find_by_recipient(&email).await {
        Ok(Some(record)) => record,
        Ok(None) => return error_response(&Error::not_found("tracking record", email)),
        Err(e) => return error_response(&e),
    };

    Json(ReportResponse::from(record)).into_response()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::Router;
    use parking_lot::Mutex;
    use serde_json::Value;
    use tower::ServiceExt;

    use std::time::Duration;

    use vassago_mail::{Mailer, OutgoingMail};
    use vassago_store::{InMemoryStore, TrackingStore};

    use super::*;
    use crate::pixel::PIXEL_PNG;
    use crate::server::{router, ServerConfig};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<()> {
            self.sent.lock().push(mail);
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _mail: OutgoingMail) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err(Error::mail("Invalid login: 535 Authentication failed"))
        }
    }

    fn test_config() -> ServerConfig {
        ServerConfig::builder()
            .public_url("http://localhost:3000")
            .sender("me@example.com")
            .build()
    }

    fn test_app(mailer: Arc<dyn Mailer>) -> (Router, Arc<AppState>) {
        let store: Arc<dyn TrackingStore> = Arc::new(InMemoryStore::new());
        let state = Arc::new(AppState::new(test_config(), store, mailer));
        (router(Arc::clone(&state)), state)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(resp: Response) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[tokio::test]
    async fn test_send_track_report_scenario() {
        let mailer = Arc::new(RecordingMailer::default());
        let (app, _state) = test_app(mailer.clone());

        let resp = app
            .clone()
            .oneshot(post_json("/send-email", r#"{"email":"a@x.com"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "Email sent!");
        let tracking_id = body["trackingId"].as_str().unwrap().to_string();

        {
            let sent = mailer.sent.lock();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].to, "a@x.com");
            assert_eq!(sent[0].from, "me@example.com");
            assert_eq!(sent[0].subject, "Email Tracking Test");
            assert!(sent[0]
                .html
                .contains(&format!("http://localhost:3000/track/{tracking_id}")));
        }

        let resp = app
            .clone()
            .oneshot(get(&format!("/track/{tracking_id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_bytes(resp).await, PIXEL_PNG);

        let resp = app.oneshot(get("/report/a@x.com")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["email"], "a@x.com");
        assert_eq!(body["opens"], 1);
        let last_opened = body["lastOpened"].as_str().unwrap();
        assert!(last_opened.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_repeated_fetches_return_identical_pixel() {
        let (app, state) = test_app(Arc::new(RecordingMailer::default()));
        let id = state.store.create("a@x.com").await.unwrap();

        let mut bodies = Vec::new();
        for _ in 0..3 {
            let resp = app
                .clone()
                .oneshot(get(&format!("/track/{id}")))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            bodies.push(body_bytes(resp).await);
        }

        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
        let record = state.store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.open_count, 3);
    }

    #[tokio::test]
    async fn test_unknown_pixel_is_404_without_body() {
        let (app, state) = test_app(Arc::new(RecordingMailer::default()));

        let resp = app.oneshot(get("/track/unknown-id")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(resp).await.is_empty());
        assert_eq!(state.store.count().await.unwrap(), 0);
        assert_eq!(state.metrics.snapshot().unknown_pixels, 1);
    }

    #[tokio::test]
    async fn test_send_without_email_is_400() {
        let mailer = Arc::new(RecordingMailer::default());
        let (app, state) = test_app(mailer.clone());

        let resp = app.oneshot(post_json("/send-email", "{}")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"error": "Email is required"})
        );
        assert!(mailer.sent.lock().is_empty());
        assert_eq!(state.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_send_with_non_object_body_is_400() {
        let mailer = Arc::new(RecordingMailer::default());
        let (app, state) = test_app(mailer.clone());

        for body in [r#"["a@x.com"]"#, r#""a@x.com""#] {
            let resp = app.clone().oneshot(post_json("/send-email", body)).await.unwrap();

            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                body_json(resp).await,
                serde_json::json!({"error": "Email is required"})
            );
        }

        assert!(mailer.sent.lock().is_empty());
        assert_eq!(state.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_send_with_malformed_body_is_400() {
        let (app, _state) = test_app(Arc::new(RecordingMailer::default()));

        let resp = app
            .oneshot(post_json("/send-email", "not json"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn test_mail_failure_is_500_and_record_kept() {
        let (app, state) = test_app(Arc::new(FailingMailer));

        let resp = app
            .clone()
            .oneshot(post_json("/send-email", r#"{"email":"a@x.com"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Failed to send email");
        assert_eq!(body["details"], "Invalid login: 535 Authentication failed");

        assert_eq!(state.store.count().await.unwrap(), 1);
        let metrics = state.metrics.snapshot();
        assert_eq!(metrics.send_failures, 1);
        assert_eq!(metrics.emails_sent, 0);
        assert!(metrics.send_time_ms >= 5);

        let resp = app.oneshot(get("/report/a@x.com")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["opens"], 0);
    }

    #[tokio::test]
    async fn test_report_unknown_recipient_is_404() {
        let (app, _state) = test_app(Arc::new(RecordingMailer::default()));

        let resp = app
            .oneshot(get("/report/never-emailed@x.com"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"error": "No data found"})
        );
    }

    #[tokio::test]
    async fn test_report_never_opened_has_null_last_opened() {
        let (app, state) = test_app(Arc::new(RecordingMailer::default()));
        state.store.create("a@x.com").await.unwrap();

        // Percent-encoded `@` decodes to the same recipient.
        let resp = app.oneshot(get("/report/a%40x.com")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"email": "a@x.com", "opens": 0, "lastOpened": null})
        );
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let (app, state) = test_app(Arc::new(RecordingMailer::default()));
        state.store.create("a@x.com").await.unwrap();

        let resp = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_bytes(resp).await, b"OK");

        let resp = app.oneshot(get("/api/status")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["tracked_emails"], 1);
        assert_eq!(body["public_url"], "http://localhost:3000");
        assert_eq!(body["metrics"]["emails_sent"], 0);
        assert_eq!(body["metrics"]["send_time_ms"], 0);
    }
}
