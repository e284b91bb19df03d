//! Snapshot Greeks over HTTP
//!
//! `POST /api/v1/greeks` takes one snapshot as the JSON body and answers with
//! the snapshot result, or the `{error}` envelope on failure.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::Json,
    routing::post,
    Router,
};
use pricer_pricing::SnapshotResult;

use super::AppState;
use crate::error::ApiError;

/// Build the greeks routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/greeks", post(greeks_handler))
}

/// POST /api/v1/greeks - Price and Greeks for every contract of a snapshot
///
/// The body is read raw so malformed JSON and oversized bodies are reported
/// through the same envelope as every other failure.
async fn greeks_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SnapshotResult>, ApiError> {
    let body = body?;
    let raw = String::from_utf8_lossy(&body);
    let result = state.process(&raw).await?;

    tracing::debug!(
        symbol = %result.symbol,
        contracts = result.results.len(),
        "Greeks computed"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::error::ErrorBody;
    use crate::routes::{build_router, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    const NIFTY: &str = r#"{
        "timestamp": "2025-08-25T16:50:00Z",
        "underlying_symbol": "NIFTY",
        "underlying_price": 24967.75,
        "risk_free_rate": 0.0545,
        "data": [
            {
                "strike": 24900.0,
                "expiry_date": "2025-08-28",
                "call_option": {"implied_volatility": 0.0901, "ltp": 120.5},
                "put_option": {"implied_volatility": 0.0573, "ltp": 48.0}
            }
        ]
    }"#;

    fn router() -> Router {
        routes().with_state(test_state(ServerConfig {
            worker_threads: 2,
            cache_capacity: 8,
            ..Default::default()
        }))
    }

    async fn post_snapshot(router: Router, body: impl Into<Body>) -> Response {
        router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/greeks")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_greeks_for_snapshot() {
        let response = post_snapshot(router(), NIFTY).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["symbol"], "NIFTY");
        assert_eq!(json["timestamp"], "2025-08-25T16:50:00Z");

        let contract = &json["results"][0];
        assert_eq!(contract["strike"], 24900.0);
        assert_eq!(contract["expiry_date"], "2025-08-28");
        let iv = contract["iv"].as_f64().unwrap();
        assert!((iv - 0.0737).abs() < 1e-12);
        assert!(contract["call"]["delta"].as_f64().unwrap() > 0.0);
        assert!(contract["put"]["delta"].as_f64().unwrap() < 0.0);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_envelope() {
        let response = post_snapshot(router(), "{\"timestamp\":").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let envelope: ErrorBody = serde_json::from_value(json_body(response).await).unwrap();
        assert!(envelope.error.starts_with("Invalid snapshot"));
    }

    #[tokio::test]
    async fn test_missing_field_returns_envelope() {
        let response = post_snapshot(
            router(),
            r#"{"timestamp":"2025-08-25T16:50:00Z","underlying_symbol":"NIFTY","data":[]}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("underlying_price"));
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_body_returns_envelope() {
        let router = build_router(test_state(ServerConfig {
            worker_threads: 1,
            cache_capacity: 4,
            max_body_bytes: 256,
            ..Default::default()
        }));
        assert!(NIFTY.len() > 256);

        let response = post_snapshot(router, NIFTY).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let json = json_body(response).await;
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_body_limit_above_axum_default() {
        // 3 MB of padding around an empty chain, over axum's 2 MB default
        let mut body = String::from(
            r#"{"timestamp":"2025-08-25T16:50:00Z","underlying_symbol":"NIFTY","underlying_price":24967.75,"data":[]"#,
        );
        body.push_str(&" ".repeat(3 * 1024 * 1024));
        body.push('}');

        let router = build_router(test_state(ServerConfig {
            worker_threads: 1,
            cache_capacity: 4,
            ..Default::default()
        }));
        let response = post_snapshot(router, body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_greeks_route_is_post_only() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/greeks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
