/*
 * Responsibility
 * - Shared per-process context attached to the Router
 * - Clone is cheap (PgPool and Arcs)
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::repos::relationships::RelationshipStore;
use crate::services::token::TokenCodec;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenCodec>,
    pub relationships: Arc<dyn RelationshipStore>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        tokens: Arc<TokenCodec>,
        relationships: Arc<dyn RelationshipStore>,
    ) -> Self {
        Self {
            db,
            tokens,
            relationships,
        }
    }
}
