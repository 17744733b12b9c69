/*
 * Responsibility
 * - Config load -> dependency construction -> Router assembly
 * - Middleware application (CORS / security headers / HTTP layers)
 * - Startup: migrations, listener, axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::relationships::PgRelationshipStore;
use crate::services::token::TokenCodec;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,conduit_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they don't get lost when stderr is
        // hidden by the process supervisor.
        tracing::error!(?info, "panic");

        // Development: fail fast so broken state is noticed immediately.
        // Production: default behavior, keep the server running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let state = build_state(pool, &config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(pool: PgPool, config: &Config) -> AppState {
    let tokens = Arc::new(TokenCodec::new(
        &config.jwt_secret,
        config.token_ttl_seconds,
    ));
    let relationships = Arc::new(PgRelationshipStore::new(pool.clone()));
    AppState::new(pool, tokens, relationships)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api", api::routes(&state))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppEnv;

    fn test_config() -> Config {
        Config {
            addr: "0.0.0.0:8080".parse().unwrap(),
            database_url: "postgres://postgres@localhost/conduit_test".to_string(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            jwt_secret: "router-test-secret".to_string(),
            token_ttl_seconds: 60 * 60 * 24,
        }
    }

    /// Full app router over a lazy pool: nothing connects unless a handler
    /// actually runs a query, so gate/validation paths are testable offline.
    fn app() -> Router {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let state = build_state(pool, &config);
        build_router(state, &config)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_answers_without_auth() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn required_routes_reject_missing_token() {
        for (method, uri) in [
            ("GET", "/api/user"),
            ("POST", "/api/articles"),
            ("PUT", "/api/articles/some-slug"),
            ("DELETE", "/api/articles/some-slug"),
            ("POST", "/api/articles/some-slug/favorite"),
            ("DELETE", "/api/articles/some-slug/favorite"),
            ("POST", "/api/articles/some-slug/comments"),
            ("POST", "/api/profiles/jake/follow"),
            ("GET", "/api/articles/feed"),
        ] {
            let response = app()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{method} {uri} should 401 without a token"
            );
        }
    }

    #[tokio::test]
    async fn required_routes_reject_wrong_scheme() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/user")
                    .header(header::AUTHORIZATION, "Bearer some-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_validation_fails_before_storage() {
        let payload =
            r#"{"user":{"username":"_wangzitian0","email":"w@example.com","password":"0122"}}"#;
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["errors"]["Username"], "{key: alphanum}");
        assert_eq!(json["errors"]["Password"], "{min: 8}");
    }
}
