//! Password hashing with Argon2id, plus placeholder-credential generation.
//!
//! Accounts created through SSO are never accessed by password, but the user
//! store requires a credential. `generate_placeholder` produces an
//! unpredictable random password that is hashed and then discarded.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as Argon2Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;
use rand::distributions::Alphanumeric;
use thiserror::Error;

const PLACEHOLDER_LENGTH: usize = 32;

#[derive(Error, Debug)]
pub enum HashingError {
    #[error("Failed to hash or verify password: {0}")]
    Hash(Argon2Error),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Hasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, HashingError>;

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashingError>;
}

/// Generates a random alphanumeric credential for accounts that only ever
/// sign in through the identity provider.
pub fn generate_placeholder() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PLACEHOLDER_LENGTH)
        .map(char::from)
        .collect()
}

pub struct Argon2Hasher<'a> {
    argon2: Argon2<'a>,
}

impl Argon2Hasher<'_> {
    pub fn new() -> Self {
        Self { argon2: Argon2::default() }
    }
}

impl Default for Argon2Hasher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Argon2Hasher<'_> {
    fn hash(&self, plain: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self.argon2.hash_password(plain.as_bytes(), &salt)?.to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashingError> {
        let parsed_hash = PasswordHash::new(hash)?;

        Ok(self.argon2.verify_password(plain.as_bytes(), &parsed_hash).is_ok())
    }
}

impl From<Argon2Error> for HashingError {
    fn from(err: Argon2Error) -> Self {
        HashingError::Hash(err)
    }
}
