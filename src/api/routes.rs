/*
 * Responsibility
 * - URL structure under /api
 * - Exactly one auth gate per route group, with the mode fixed here at
 *   registration time: public (no gate), optional, required
 */
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::api::handlers::{
    articles::{
        create_article, delete_article, favorite_article, feed_articles, get_article,
        list_articles, list_tags, unfavorite_article, update_article,
    },
    comments::{create_comment, delete_comment, list_comments},
    health::health,
    profiles::{follow_user, get_profile, unfollow_user},
    users::{current_user, login, register, update_user},
};
use crate::middleware::auth::{self, AuthGate, AuthMode};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/users", post(register))
        .route("/users/login", post(login));

    let optional = Router::new()
        .route("/articles", get(list_articles))
        .route("/articles/{slug}", get(get_article))
        .route("/articles/{slug}/comments", get(list_comments))
        .route("/profiles/{username}", get(get_profile))
        .route("/tags", get(list_tags));
    let optional = auth::apply(
        optional,
        AuthGate::new(state.tokens.clone(), AuthMode::Optional),
    );

    let required = Router::new()
        .route("/user", get(current_user).put(update_user))
        .route("/articles", post(create_article))
        .route("/articles/feed", get(feed_articles))
        .route(
            "/articles/{slug}",
            put(update_article).delete(delete_article),
        )
        .route(
            "/articles/{slug}/favorite",
            post(favorite_article).delete(unfavorite_article),
        )
        .route("/articles/{slug}/comments", post(create_comment))
        .route("/articles/{slug}/comments/{id}", delete(delete_comment))
        .route(
            "/profiles/{username}/follow",
            post(follow_user).delete(unfollow_user),
        );
    let required = auth::apply(
        required,
        AuthGate::new(state.tokens.clone(), AuthMode::Required),
    );

    public.merge(optional).merge(required)
}
