/*
 * Responsibility
 * - Storage-layer error meaning as seen by callers
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Conflict(String),
    #[error("db error")]
    Db(#[from] sqlx::Error),
}

impl RepoError {
    /// Classify unique-constraint violations (SQLSTATE 23505) as conflicts so
    /// duplicate emails/usernames/slugs surface as 422 instead of 500.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict(dbe.message().to_string());
        }
        RepoError::Db(e)
    }
}
