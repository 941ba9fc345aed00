//! Admin credential: an Argon2id PHC string with a per-hash random salt.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct Password {
    phc: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Password {
    /// Hash a plain-text password chosen at registration.
    ///
    /// Rejects anything shorter than `MIN_PASSWORD_LENGTH` characters.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if (plain_text.chars().count() as u64) < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();
        Ok(Self { phc })
    }

    /// Wrap a hash loaded from the admins table.
    pub fn from_hash(phc: String) -> Self {
        Self { phc }
    }

    /// The PHC string to persist.
    pub fn into_hash(self) -> String {
        self.phc
    }

    /// Never fails: a malformed stored hash simply does not verify.
    pub fn verify(&self, plain_text: &str) -> bool {
        PasswordHash::new(&self.phc)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plain_text.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}
