//! Identity resolution gate: `Authorization: Token <jwt>` → Viewer.
//!
//! The gate is the single authority for identity resolution; no handler
//! decodes tokens itself. Each route group gets exactly one gate with a mode
//! fixed at registration time:
//!
//! - `Optional`: absent, malformed or invalid tokens all downgrade silently
//!   to an anonymous viewer and the request continues.
//! - `Required`: the same conditions reject with a bodyless 401 (which
//!   sub-case occurred is deliberately not disclosed).
//!
//! ```ignore
//! let articles = middleware::auth::apply(articles, AuthGate::new(codec, AuthMode::Optional));
//! ```
use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::Viewer;
use crate::error::AppError;
use crate::services::token::TokenCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Optional,
    Required,
}

#[derive(Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    mode: AuthMode,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>, mode: AuthMode) -> Self {
        Self { codec, mode }
    }
}

/// Install the gate on a route group.
pub fn apply<S>(router: Router<S>, gate: AuthGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, resolve_viewer))
}

async fn resolve_viewer(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let viewer = match scheme_token(req.headers()) {
        Some(raw) => match gate.codec.verify(raw) {
            Ok(id) => Viewer::Authenticated(id),
            Err(err) => {
                if gate.mode == AuthMode::Required {
                    tracing::warn!(error = %err, "token verification failed");
                    return Err(AppError::Unauthorized);
                }
                Viewer::Anonymous
            }
        },
        None => {
            if gate.mode == AuthMode::Required {
                return Err(AppError::Unauthorized);
            }
            Viewer::Anonymous
        }
    };

    // gate → extractor hand-off
    req.extensions_mut().insert(viewer);

    Ok(next.run(req).await)
}

/// Raw token from `Authorization: Token <jwt>`. The scheme prefix is
/// case-sensitive; any other scheme counts as no token at all.
fn scheme_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Token ")
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, http::StatusCode, routing::get};
    use chrono::Utc;
    use tower::ServiceExt;

    use super::*;
    use crate::services::token::Claims;

    const SECRET: &str = "gate-test-secret";

    async fn whoami(viewer: Viewer) -> String {
        match viewer {
            Viewer::Anonymous => "anonymous".to_string(),
            Viewer::Authenticated(id) => format!("user:{}", id),
        }
    }

    fn gated_router(mode: AuthMode) -> Router {
        let codec = Arc::new(TokenCodec::new(SECRET, 60 * 60 * 24));
        apply(
            Router::new().route("/whoami", get(whoami)),
            AuthGate::new(codec, mode),
        )
    }

    fn request(auth_header: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some(value) = auth_header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn expired_token() -> String {
        let claims = Claims {
            id: 7,
            exp: (Utc::now() - chrono::Duration::hours(1)).timestamp(),
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn valid_token(id: i64) -> String {
        TokenCodec::new(SECRET, 60 * 60 * 24).issue(id).unwrap()
    }

    #[tokio::test]
    async fn optional_mode_continues_as_anonymous() {
        for header in [
            None,
            Some("Bearer whatever".to_string()),
            Some("Token not-a-jwt".to_string()),
            Some(format!("Token {}", expired_token())),
            // wrong scheme case
            Some(format!("token {}", valid_token(7))),
        ] {
            let response = gated_router(AuthMode::Optional)
                .oneshot(request(header.as_deref()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, "anonymous");
        }
    }

    #[tokio::test]
    async fn optional_mode_authenticates_valid_token() {
        let header = format!("Token {}", valid_token(42));
        let response = gated_router(AuthMode::Optional)
            .oneshot(request(Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "user:42");
    }

    #[tokio::test]
    async fn required_mode_rejects_with_bodyless_401() {
        for header in [
            None,
            Some("Bearer whatever".to_string()),
            Some("Token not-a-jwt".to_string()),
            Some(format!("Token {}", expired_token())),
        ] {
            let response = gated_router(AuthMode::Required)
                .oneshot(request(header.as_deref()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            // no oracle for forgery attempts
            assert_eq!(body_string(response).await, "");
        }
    }

    #[tokio::test]
    async fn required_mode_authenticates_valid_token() {
        let header = format!("Token {}", valid_token(42));
        let response = gated_router(AuthMode::Required)
            .oneshot(request(Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "user:42");
    }
}
