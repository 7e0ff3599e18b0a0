// auth/mod.rs - password hashing for the built-in User type
//
// bcrypt is deliberately slow, so both directions run on the blocking pool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, PasswordError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// True only when `password` matches `hash`. A stored value that isn't a
/// bcrypt hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> bool {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await;
    match outcome {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            tracing::warn!("Stored password is not a valid bcrypt hash: {}", e);
            false
        }
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}
