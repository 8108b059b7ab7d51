//! Argon2id password hashing with per-hash random salts.

use argon2::password_hash::{self, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::Argon2;
use rand::RngCore;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{PasswordHash, PlainPassword};

const SALT_LEN: usize = 16;

/// [`PasswordHasher`] producing PHC-encoded Argon2id hashes with the
/// crate's default cost parameters.
#[derive(Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, PasswordHashError> {
        let mut salt_bytes = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        self.argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| PasswordHash::from_phc(hash.to_string()))
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let parsed = password_hash::PasswordHash::new(hash.as_str())
            .map_err(|err| PasswordHashError::malformed(err.to_string()))?;
        match self
            .argon2
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    #[rstest]
    fn hashes_verify_only_their_password(hasher: Argon2PasswordHasher) {
        let hash = hasher
            .hash(&PlainPassword::new("correct horse battery"))
            .expect("hashed");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(
            hasher
                .verify(&PlainPassword::new("correct horse battery"), &hash)
                .expect("verified")
        );
        assert!(
            !hasher
                .verify(&PlainPassword::new("correct horse battery "), &hash)
                .expect("verified")
        );
    }

    #[rstest]
    fn equal_passwords_get_distinct_salts(hasher: Argon2PasswordHasher) {
        let password = PlainPassword::new("s3cret-enough");
        let first = hasher.hash(&password).expect("hashed");
        let second = hasher.hash(&password).expect("hashed");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hashes_are_reported(hasher: Argon2PasswordHasher) {
        let result = hasher.verify(
            &PlainPassword::new("whatever"),
            &PasswordHash::from_phc("not-a-phc-string"),
        );
        assert!(matches!(result, Err(PasswordHashError::Malformed { .. })));
    }
}
