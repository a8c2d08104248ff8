// HTTP API: body-language session endpoints and health check

pub mod dto;
pub mod fault;
pub mod handlers;
pub mod routes;

#[cfg(test)]
mod tests {
    use crate::core::config::Config;
    use crate::core::frame_analyzer::tests::{BrokenDetector, StubDetector};
    use crate::core::frame_analyzer::FrameAnalyzer;
    use crate::core::gesture_classifier::tests::FixedModel;
    use crate::core::gesture_classifier::GestureClassifier;
    use crate::core::image_codec::tests::png_data_url;
    use crate::core::image_codec::JPEG_DATA_URL_PREFIX;
    use crate::http::routes::build_router;
    use crate::platform::pose::MediaPipeBridge;
    use crate::AppState;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(detector: Box<dyn MediaPipeBridge>, classifier: GestureClassifier) -> Router {
        let state = AppState::new(Config::default(), FrameAnalyzer::new(detector, classifier));
        build_router(state)
    }

    fn open_palm_app() -> Router {
        app_with(
            Box::new(StubDetector { person: true }),
            GestureClassifier::new(Arc::new(FixedModel::always("Open Palm", 0.9))),
        )
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, Body::from(body.to_string())).await
    }

    async fn start(app: &Router) -> Value {
        let (status, body) = post(app, "/api/body-language/start-session", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session started successfully");
        body["session_id"].clone()
    }

    async fn frame(app: &Router, session_id: &Value) -> (StatusCode, Value) {
        post(
            app,
            "/api/body-language/analyze-frame",
            json!({"session_id": session_id, "image_data": png_data_url(64, 48)}),
        )
        .await
    }

    #[tokio::test]
    async fn test_full_open_palm_session() {
        let app = open_palm_app();
        let session_id = start(&app).await;

        for _ in 0..10 {
            let (status, body) = frame(&app, &session_id).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["processed_image"]
                .as_str()
                .unwrap()
                .starts_with(JPEG_DATA_URL_PREFIX));
            assert_eq!(
                body["prediction"],
                json!({"class": "Open Palm", "confidence": 0.9})
            );
            assert!(body.get("error").is_none());
        }

        let (status, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["session_id"], session_id);
        assert_eq!(report["frames_processed"], 10);
        assert_eq!(report["gesture_percentages"]["Open Palm"]["gesture_percentage"], 100.0);
        assert_eq!(report["gesture_percentages"]["Open Palm"]["gesture_count"], 10);
        assert_eq!(report["allowed_gestures"]["Thumbs Up"]["gesture_count"], 0);
        assert_eq!(report["disallowed_gestures"]["Victorious"]["gesture_percentage"], 0.0);
        assert_eq!(report["overall_score"], 100.0);
        assert!(report["feedback"]
            .as_str()
            .unwrap()
            .contains("✓ Your open palm gestures convey openness and honesty."));
    }

    #[tokio::test]
    async fn test_empty_session_report() {
        let app = open_palm_app();
        let session_id = start(&app).await;

        let (status, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["frames_processed"], 0);
        assert_eq!(report["gesture_percentages"], json!({}));
        assert_eq!(report["overall_score"], 0.0);
    }

    #[tokio::test]
    async fn test_stopped_session_is_gone() {
        let app = open_palm_app();
        let session_id = start(&app).await;
        let stop = json!({"session_id": session_id});

        let (status, _) = post(&app, "/api/body-language/stop-session", stop.clone()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post(&app, "/api/body-language/stop-session", stop).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["frames_processed"], 0);
        assert_eq!(body["feedback"], "No session data available");

        let (status, body) = frame(&app, &session_id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Session not found or expired");
        assert_eq!(body["processed_image"], "");
    }

    #[tokio::test]
    async fn test_unknown_session_stop() {
        let app = open_palm_app();
        let (status, body) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": "does-not-exist"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Session ID not found: does-not-exist");
        assert_eq!(body["session_id"], "does-not-exist");
        assert_eq!(body["metrics"], json!({}));
        assert_eq!(body["overall_score"], 0);
    }

    #[tokio::test]
    async fn test_numeric_session_id_matches() {
        let app = open_palm_app();
        let session_id = start(&app).await;
        let numeric: i64 = session_id.as_str().unwrap().parse().unwrap();

        let (status, body) = frame(&app, &json!(numeric)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("error").is_none());

        let (_, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": numeric}),
        )
        .await;
        assert_eq!(report["frames_processed"], 1);
    }

    #[tokio::test]
    async fn test_analyze_frame_validation() {
        let app = open_palm_app();
        let session_id = start(&app).await;
        let uri = "/api/body-language/analyze-frame";

        let (status, body) = send(&app, Method::POST, uri, Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No data provided"}));

        let (status, body) = post(&app, uri, json!({"image_data": png_data_url(4, 4)})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing session_id"}));

        let (status, body) = post(&app, uri, json!({"session_id": session_id})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing image_data"}));

        let not_an_image = "data:image/png;base64,bm90IGFuIGltYWdl";
        let (status, body) = post(
            &app,
            uri,
            json!({"session_id": session_id, "image_data": not_an_image}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid image data"}));
    }

    #[tokio::test]
    async fn test_malformed_data_url_is_a_frame_error() {
        let app = open_palm_app();
        let session_id = start(&app).await;
        let uri = "/api/body-language/analyze-frame";

        for image_data in ["no-comma-here", "data:image/png;base64,@@@"] {
            let (status, body) = post(
                &app,
                uri,
                json!({"session_id": session_id, "image_data": image_data}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["processed_image"], "");
            assert_eq!(body["prediction"], Value::Null);
            assert!(body["error"]
                .as_str()
                .unwrap()
                .starts_with("Error processing frame: Invalid image data"));
        }

        let (_, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(report["frames_processed"], 0);
    }

    #[tokio::test]
    async fn test_line_wrapped_image_data_is_accepted() {
        let app = open_palm_app();
        let session_id = start(&app).await;

        let url = png_data_url(64, 48);
        let (header, payload) = url.split_once(',').unwrap();
        let lines: Vec<String> = payload
            .as_bytes()
            .chunks(20)
            .map(|chunk| String::from_utf8(chunk.to_vec()).unwrap())
            .collect();
        let wrapped = format!("{},{}\n", header, lines.join("\n"));

        let (status, body) = post(
            &app,
            "/api/body-language/analyze-frame",
            json!({"session_id": session_id, "image_data": wrapped}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("error").is_none());
        assert!(body["processed_image"]
            .as_str()
            .unwrap()
            .starts_with(JPEG_DATA_URL_PREFIX));
        assert_eq!(body["prediction"]["class"], "Open Palm");
    }

    #[tokio::test]
    async fn test_stop_session_validation() {
        let app = open_palm_app();
        let uri = "/api/body-language/stop-session";

        let (status, body) = send(&app, Method::POST, uri, Body::from("not json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": "No data provided", "metrics": {}}));

        let (status, body) = post(&app, uri, json!({"other": 1})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": "Missing session_id", "metrics": {}}));
    }

    #[tokio::test]
    async fn test_unavailable_classifier_counts_frames() {
        let app = app_with(
            Box::new(StubDetector { person: true }),
            GestureClassifier::unavailable(),
        );
        let session_id = start(&app).await;

        for _ in 0..3 {
            let (status, body) = frame(&app, &session_id).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["prediction"], Value::Null);
            assert!(body.get("error").is_none());
        }

        let (_, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(report["frames_processed"], 3);
        assert_eq!(report["gesture_percentages"], json!({}));
        assert_eq!(report["overall_score"], 50.0);
    }

    #[tokio::test]
    async fn test_no_person_counts_frame_without_detection() {
        let app = app_with(
            Box::new(StubDetector { person: false }),
            GestureClassifier::new(Arc::new(FixedModel::always("Pointing", 0.8))),
        );
        let session_id = start(&app).await;

        let (_, body) = frame(&app, &session_id).await;
        assert_eq!(body["prediction"], Value::Null);

        let (_, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(report["frames_processed"], 1);
        assert!(report["gesture_percentages"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detector_failure_is_reported_per_frame() {
        let app = app_with(Box::new(BrokenDetector), GestureClassifier::unavailable());
        let session_id = start(&app).await;

        let (status, body) = frame(&app, &session_id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Error processing frame: Inference failed: graph crashed");
        assert_eq!(body["processed_image"], "");

        let (_, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(report["frames_processed"], 0);
    }

    #[tokio::test]
    async fn test_linear_model_end_to_end() {
        let model = crate::core::ml_models::tests::biased_model(3);
        let app = app_with(
            Box::new(StubDetector { person: true }),
            GestureClassifier::new(Arc::new(model)),
        );
        let session_id = start(&app).await;

        let (_, body) = frame(&app, &session_id).await;
        assert_eq!(body["prediction"]["class"], "Thumbs Up");
        let confidence = body["prediction"]["confidence"].as_f64().unwrap();
        assert!(confidence > 0.2 && confidence <= 1.0);

        let (_, report) = post(
            &app,
            "/api/body-language/stop-session",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(report["overall_score"], 100.0);
        assert!(report["feedback"]
            .as_str()
            .unwrap()
            .contains("✓ Your positive gestures like thumbs up help reinforce key points."));
    }

    #[tokio::test]
    async fn test_health() {
        let app = open_palm_app();
        let (status, body) = send(&app, Method::GET, "/api/health", Body::empty()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Server is running");
        assert_eq!(body["classifier_available"], true);
        assert_eq!(body["detector"], "stub detector");
    }

    #[tokio::test]
    async fn test_cors_headers_and_preflight() {
        let app = open_palm_app();

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/body-language/analyze-frame")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let app = app_with(
            Box::new(StubDetector { person: true }),
            GestureClassifier::new(Arc::new(FixedModel::always("Crossed Arms", 0.7))),
        );
        let first = start(&app).await;
        let second = start(&app).await;
        assert_ne!(first, second);

        frame(&app, &first).await;
        frame(&app, &first).await;
        frame(&app, &second).await;

        let stop = "/api/body-language/stop-session";
        let (_, a) = post(&app, stop, json!({"session_id": first})).await;
        let (_, b) = post(&app, stop, json!({"session_id": second})).await;
        assert_eq!(a["frames_processed"], 2);
        assert_eq!(b["frames_processed"], 1);
        assert_eq!(a["overall_score"], 0.0);
    }
}
