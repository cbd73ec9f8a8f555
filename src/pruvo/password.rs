use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use tracing::instrument;

/// Hash a plaintext password with Argon2id into PHC string format.
/// Hashing is CPU-bound, so it runs off the reactor.
#[instrument(skip_all)]
pub async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("Error hashing password: {}", e))
    })
    .await?
}

/// Verify a candidate password against a stored PHC hash.
/// The comparison inside argon2 is constant-time.
#[instrument(skip_all)]
pub async fn verify(stored_hash: String, candidate: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&stored_hash).map_err(|e| anyhow!("Invalid password hash: {}", e))?;

        Ok(Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    })
    .await?
}
