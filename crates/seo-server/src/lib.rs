pub mod error;
pub mod routes;
pub mod state;

use axum::handler::HandlerWithoutStateExt;
use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

async fn not_found() -> impl IntoResponse {
    AppError::not_found()
}

/// Build the axum Router with the API route, static files and middleware.
/// Used by `serve()` and available for integration testing.
///
/// GET/HEAD requests that miss the API are served from `state.root`
/// (`index.html` for directories); every other unmatched request, including
/// other methods on the API path, is a JSON 404.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let files = ServeDir::new(&state.root)
        .append_index_html_on_directories(true)
        .call_fallback_on_method_not_allowed(true)
        .fallback(not_found.into_service());

    Router::new()
        .route(
            "/api/parse-invoice",
            post(routes::parse_invoice::parse_invoice).fallback(not_found),
        )
        .fallback_service(files)
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the local development server on `127.0.0.1:<port>`.
pub async fn serve(state: AppState, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    serve_on(state, listener, open_browser).await
}

/// Start on a pre-bound listener so the caller can read the actual port
/// (useful when `port = 0` and the OS picks a free port).
pub async fn serve_on(
    state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let url = format!("http://localhost:{actual_port}");
    let key_status = if state.claude.is_some() {
        "set"
    } else {
        "NOT SET (export ANTHROPIC_API_KEY=sk-ant-... to test AI features)"
    };
    tracing::info!(root = %state.root.display(), "serving {url}, API key {key_status}");

    let app = build_router(state);
    if open_browser {
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
