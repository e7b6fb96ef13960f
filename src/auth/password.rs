//! Argon2 hashing for admin accounts. Failures come back as `anyhow` errors and are
//! logged once, by `ApiError`, at the handler boundary.

use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Same algorithm and cost parameters as `hash_password` output; matches no password.
const UNKNOWN_USER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("hash password: {e}"))
}

/// Constant-time check of `plain` against a stored PHC string.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("parse stored password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Login check. A missing account still pays for one argon2 verification, so response
/// time does not tell known usernames from unknown ones.
pub fn check_credentials(plain: &str, stored_hash: Option<&str>) -> anyhow::Result<bool> {
    match stored_hash {
        Some(hash) => verify_password(plain, hash),
        None => verify_password(plain, UNKNOWN_USER_HASH).map(|_| false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("masters-admin").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("masters-admin", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("masters-admin").expect("hashing should succeed");
        assert!(!verify_password("masters-admin ", &hash).expect("verify should not error"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_hash_is_an_error_with_context() {
        let err = verify_password("admin123", "admin123").unwrap_err();
        assert!(err.to_string().starts_with("parse stored password hash"));
    }

    #[test]
    fn unknown_user_hash_costs_the_same_as_a_real_one() {
        let real = hash_password("masters-admin").unwrap();
        let real = PasswordHash::new(&real).unwrap();
        let dummy = PasswordHash::new(UNKNOWN_USER_HASH).unwrap();
        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params.to_string(), real.params.to_string());
    }

    #[test]
    fn unknown_user_never_matches() {
        for guess in ["", "masters-admin", "password"] {
            assert!(!check_credentials(guess, None).unwrap());
        }
    }

    #[test]
    fn known_user_is_verified() {
        let hash = hash_password("masters-admin").unwrap();
        assert!(check_credentials("masters-admin", Some(&hash)).unwrap());
        assert!(!check_credentials("wrong-password", Some(&hash)).unwrap());
    }
}
