//! Salted password credentials for password locks.
//!
//! Passwords are hashed with Argon2id into a raw 32-byte digest. Every call to
//! [`Credential::derive`] draws a fresh random salt, so two locks sharing a
//! password never share a hash. The hashing parameters travel with the
//! credential; changing the configured parameters later only affects new
//! passwords.

use crate::error::{LatchError, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Digest length in bytes.
pub const HASH_LEN: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashParams {
    /// Check the parameters are acceptable to Argon2.
    pub fn validate(&self) -> Result<()> {
        self.argon2().map(|_| ())
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(HASH_LEN),
        )
        .map_err(|e| LatchError::Credential(format!("invalid hashing parameters: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// A salted password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    salt: Vec<u8>,
    hash: Vec<u8>,
    params: HashParams,
}

impl Credential {
    /// Hash `password` under a freshly generated salt.
    pub fn derive(password: &str, params: HashParams) -> Result<Self> {
        let salt = generate_salt()?;
        let hash = hash_with(password, &salt, &params)?;
        Ok(Self {
            salt: salt.to_vec(),
            hash,
            params,
        })
    }

    /// Rebuild a credential from stored parts.
    pub fn from_parts(salt: Vec<u8>, hash: Vec<u8>, params: HashParams) -> Self {
        Self { salt, hash, params }
    }

    /// Check `password` against the stored hash in constant time.
    ///
    /// Any hashing failure counts as a mismatch.
    pub fn verify(&self, password: &str) -> bool {
        match hash_with(password, &self.salt, &self.params) {
            Ok(candidate) => candidate.as_slice().ct_eq(self.hash.as_slice()).into(),
            Err(_) => false,
        }
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn params(&self) -> HashParams {
        self.params
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("salt", &"<redacted>")
            .field("hash", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt)
        .map_err(|e| LatchError::Credential(format!("failed to generate salt: {}", e)))?;
    Ok(salt)
}

fn hash_with(password: &str, salt: &[u8], params: &HashParams) -> Result<Vec<u8>> {
    let mut out = vec![0u8; HASH_LEN];
    params
        .argon2()?
        .hash_password_into(password.as_bytes(), salt, &mut out)
        .map_err(|e| LatchError::Credential(e.to_string()))?;
    Ok(out)
}
