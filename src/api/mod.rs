use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};

use crate::screen::{ScreenHandle, ScreenSnapshot};

pub fn router(handle: ScreenHandle) -> Router {
    Router::new()
        .route("/snapshot", get(get_snapshot))
        .route("/override", post(request_override))
        .with_state(handle)
}

async fn get_snapshot(State(handle): State<ScreenHandle>) -> Json<ScreenSnapshot> {
    Json(handle.snapshot())
}

async fn request_override(State(handle): State<ScreenHandle>) -> StatusCode {
    handle.run_anyway();
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::error::FetchError;
    use crate::location::{Authorization, LocationProvider};
    use crate::models::{Coordinate, CurrentConditions, ForecastWindow};
    use crate::screen::AdvisorScreen;
    use crate::weather::{FetchResult, WeatherSource};

    struct Denied;

    #[async_trait]
    impl LocationProvider for Denied {
        async fn request_authorization(&self) -> Authorization {
            Authorization::Denied
        }

        async fn current_coordinate(&self) -> crate::Result<Coordinate> {
            Coordinate::new(0.0, 0.0)
        }
    }

    struct Offline;

    #[async_trait]
    impl WeatherSource for Offline {
        async fn current_conditions(&self, _: Coordinate) -> FetchResult<CurrentConditions> {
            Err(FetchError::Network("offline".into()))
        }

        async fn location_name(&self, _: Coordinate) -> FetchResult<String> {
            Err(FetchError::Network("offline".into()))
        }

        async fn forecast(&self, _: Coordinate) -> FetchResult<ForecastWindow> {
            Err(FetchError::Network("offline".into()))
        }
    }

    fn screen() -> AdvisorScreen {
        AdvisorScreen::mount(Arc::new(Denied), Arc::new(Offline), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_get_snapshot() {
        let screen = screen();
        screen.activate().await;

        let response = router(screen.handle())
            .oneshot(Request::get("/snapshot").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["phase"], "failed");
        assert_eq!(value["error_state"]["kind"], "permission_denied");
    }

    #[tokio::test]
    async fn test_override_always_accepted() {
        let screen = screen();
        screen.activate().await;
        let handle = screen.handle();

        let response = router(handle.clone())
            .oneshot(Request::post("/override").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(handle.snapshot().override_requested);
    }
}
