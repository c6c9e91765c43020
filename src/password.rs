//! Argon2id password hashing.

use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::auth::AuthError;

/// Hash a password into a self-describing PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingFailure(e.to_string()))
}

/// Check a password against a stored digest.
///
/// Returns `PasswordMismatch` when the password is wrong and `MalformedHash`
/// when the digest itself cannot be used.
pub fn verify_password(hash: &str, plain: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::MalformedHash)?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(AuthError::PasswordMismatch),
        Err(_) => Err(AuthError::MalformedHash),
    }
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(plain: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(hash: String, plain: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &plain))
        .await
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "correct horse battery staple").is_ok());
    }

    #[test]
    fn test_same_password_different_digests() {
        let first = hash_password("password").unwrap();
        let second = hash_password("password").unwrap();

        assert_ne!(first, second, "salt should differ per call");
        assert!(verify_password(&first, "password").is_ok());
        assert!(verify_password(&second, "password").is_ok());
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("password").unwrap();
        assert!(matches!(
            verify_password(&hash, "wrongpassword"),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            verify_password(&hash, ""),
            Err(AuthError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_malformed_digest() {
        assert!(matches!(
            verify_password("not-a-phc-string", "password"),
            Err(AuthError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("", "password"),
            Err(AuthError::MalformedHash)
        ));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("hunter22".to_string()).await.unwrap();
        assert!(
            verify_password_blocking(hash.clone(), "hunter22".to_string())
                .await
                .is_ok()
        );
        assert!(matches!(
            verify_password_blocking(hash, "hunter23".to_string()).await,
            Err(AuthError::PasswordMismatch)
        ));
    }
}
