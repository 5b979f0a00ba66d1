//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::planner::PlanError;

use super::dto::*;
use super::state::AppState;
use super::templates::IndexTemplate;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with the journey form.
async fn index_page() -> IndexTemplate {
    IndexTemplate
}

/// All station names, sorted.
async fn list_stations(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.context.list_stations().to_vec())
}

/// Estimate a journey.
async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PredictRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(body = %String::from_utf8_lossy(&body), "Rejected predict body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let itinerary = state
        .context
        .predict(&req.start, &req.end, &req.time)
        .map_err(AppError::from)?;

    Ok(Json(PredictResponse::from_itinerary(&itinerary)))
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        // Every planning failure is a problem with the request
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        warn!(%status, %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use crate::context::{EtaContext, sample_timetable};
    use crate::model::BoostConfig;
    use crate::planner::PlannerConfig;

    fn state() -> AppState {
        static STATE: OnceLock<AppState> = OnceLock::new();
        STATE
            .get_or_init(|| {
                let context = EtaContext::initialize(
                    &sample_timetable(),
                    &BoostConfig::new(50, 0.3, 8, 5),
                    PlannerConfig::default(),
                )
                .unwrap();
                AppState::new(context)
            })
            .clone()
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = create_router(state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_predict(body: &str) -> Request<Body> {
        Request::post("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = create_router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn index_page_is_html() {
        let response = create_router(state())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"), "content type was {content_type}");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.contains("/api/predict"));
    }

    #[tokio::test]
    async fn stations_are_listed() {
        let (status, json) = send(Request::get("/api/stations").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!(["Alpha", "Beta", "Delta", "Hub"]));
    }

    #[tokio::test]
    async fn predict_returns_segments() {
        let (status, json) =
            send(post_predict(r#"{"start": "Alpha", "end": "Delta", "time": "08:00"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        let segments = json["segments"].as_array().unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1]["line"], "Transfer");
        assert_eq!(segments[1]["duration"], 5.0);
        assert_eq!(segments[0]["start"], "Alpha");
        assert_eq!(segments[2]["end"], "Delta");
        assert!(json["total_time"].as_f64().unwrap() > 0.0);
        assert!(json["arrival_time"].as_str().unwrap().starts_with("08:"));
    }

    #[tokio::test]
    async fn predict_defaults_departure() {
        let (status, json) = send(post_predict(r#"{"start": "beta", "end": "hub"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["arrival_time"].as_str().unwrap().starts_with("09:"));
    }

    #[tokio::test]
    async fn predict_rejects_unknown_station() {
        let (status, json) = send(post_predict(r#"{"start": "Alpha", "end": "Atlantis"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Stations not found. Please select from the list.");
    }

    #[tokio::test]
    async fn predict_rejects_unreachable_destination() {
        let (status, json) = send(post_predict(r#"{"start": "Delta", "end": "Alpha"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No route available between these stations.");
    }

    #[tokio::test]
    async fn predict_rejects_bad_input() {
        let (status, json) =
            send(post_predict(r#"{"start": "Alpha", "end": "Delta", "time": "25:00"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("Invalid departure time"));

        let (status, json) = send(post_predict("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }
}
