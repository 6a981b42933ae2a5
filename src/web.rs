use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::Result;
use crate::api;
use crate::screen::ScreenHandle;

pub async fn run(port: u16, handle: ScreenHandle) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api::router(handle))
        .layer(cors);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
