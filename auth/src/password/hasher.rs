use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as _;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Prefixes of bcrypt hashes written by earlier deployments (cost 12).
const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// One-way credential hasher.
///
/// New hashes are Argon2id in PHC string format. Verification also accepts
/// bcrypt hashes so that records created before the switch keep working.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher with the default Argon2id cost (m = 19 MiB, t = 2, p = 1).
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a hasher with explicit Argon2id cost parameters.
    ///
    /// Only affects newly produced hashes; verification always uses the
    /// parameters embedded in the stored hash.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    /// Create a hasher from raw Argon2id costs.
    ///
    /// # Arguments
    /// * `m_cost` - Memory size in KiB
    /// * `t_cost` - Number of iterations
    /// * `p_cost` - Degree of parallelism
    ///
    /// # Errors
    /// * `HashingFailed` - Costs are outside what Argon2 accepts
    pub fn from_costs(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        Params::new(m_cost, t_cost, p_cost, None)
            .map(Self::with_params)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a freshly generated salt.
    ///
    /// # Returns
    /// PHC string (algorithm, parameters, salt and digest)
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 rejected the input or parameters
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Comparison is constant-time. Any mismatch yields `Ok(false)`, including
    /// a parseable hash whose algorithm or parameters cannot be used.
    ///
    /// # Errors
    /// * `InvalidCredentialFormat` - The stored value is not a hash encoding at all
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        if BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix)) {
            // bcrypt errors echo the offending hash, so only a fixed message is kept.
            return bcrypt::verify(password, hash).map_err(|_| {
                PasswordError::InvalidCredentialFormat("malformed bcrypt hash".to_string())
            });
        }

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::InvalidCredentialFormat(e.to_string()))?;

        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
