//! Axum router construction.
//!
//! Builds the full application router with the procedure surface, health
//! check, API docs, middleware layers and static file serving.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(title = "Pokédex API", description = "Read-only Pokémon catalog procedures"),
    paths(routes::health::health_check, routes::trpc::query_procedure),
    components(schemas(
        routes::health::HealthResponse,
        crate::service::PokemonDto,
        crate::procedures::TrpcEnvelope,
        crate::procedures::TrpcResult,
        crate::procedures::TrpcError,
        crate::procedures::TrpcErrorData,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new().route(
        "/trpc/{path}",
        get(routes::trpc::query_procedure).post(routes::trpc::mutation_not_supported),
    );

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(ctx);

    // Static file serving for a pre-built UI.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(tower_http::services::ServeFile::new(index_path)),
            );
        }
    }

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use pokedex_core::config::Config;
    use pokedex_db::pool::init_memory_pool;
    use pokedex_db::seed::seed_builtin;
    use tower::ServiceExt;

    fn app() -> Router {
        let pool = init_memory_pool().unwrap();
        seed_builtin(&pool.get().unwrap()).unwrap();
        build_router(AppContext::new(pool, Config::default()), None)
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_ok() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn single_procedure_call() {
        let (status, body) =
            get_json("/api/trpc/pokemon.getPokemonByName?input=%22Pikachu%22").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["data"]["name"], "Pikachu");
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let resp = app()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn request_id_is_generated() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = resp.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn openapi_document_lists_procedures() {
        let (status, body) = get_json("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/trpc/{path}"].is_object());
        assert!(body["components"]["schemas"]["PokemonDto"].is_object());
    }

    #[tokio::test]
    async fn post_is_refused() {
        let resp = app()
            .oneshot(
                Request::post("/api/trpc/pokemon.getAllTypes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn static_dir_fallback_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>pokedex</html>").unwrap();

        let pool = init_memory_pool().unwrap();
        let app = build_router(
            AppContext::new(pool, Config::default()),
            Some(dir.path().to_path_buf()),
        );
        let resp = app
            .oneshot(Request::get("/filterable").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<html>pokedex</html>");
    }
}
