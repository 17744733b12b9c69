/*
 * Responsibility
 * - Password hashing/verification (bcrypt)
 * - Hashing is CPU-bound, so it runs on the blocking pool
 */
use crate::error::AppError;

pub async fn hash(plain: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            AppError::Internal
        })
}

pub async fn verify(plain: String, hashed: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "password verification failed");
            AppError::Internal
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_roundtrip() {
        let hashed = hash("0123456789".to_string()).await.unwrap();
        assert_ne!(hashed, "0123456789");
        assert!(verify("0123456789".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify("wrong-password".to_string(), hashed).await.unwrap());
    }
}
