use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{self, SaltString, rand_core::OsRng},
};

/// Upper bound on accepted password input.
pub const MAX_PASSWORD_BYTES: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("password is empty")]
    Empty,
    #[error("password is longer than {} bytes", MAX_PASSWORD_BYTES)]
    TooLong,
    #[error("invalid hash cost: {0}")]
    Params(argon2::Error),
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    Malformed(password_hash::Error),
}

/// One-way password hashing with Argon2id.
///
/// The default cost is argon2's recommended parameter set. Verification reads
/// the cost back out of the stored PHC string, so hashes made under a
/// different cost keep verifying after the configuration changes.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    params: Params,
}

impl Credentials {
    /// Custom cost: memory in KiB and number of passes.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(HashError::Params)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` with a fresh random salt. Returns a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        if password.is_empty() {
            return Err(HashError::Empty);
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::TooLong);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(HashError::Hash)?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on a wrong password. Errors are reserved for a stored hash
    /// that cannot be parsed or verified at all.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(hash).map_err(HashError::Malformed)?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Hash(e)),
        }
    }
}
