use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

pub const SALT_SIZE: usize = 16;

/// Salted Argon2id credential in PHC string form.
///
/// This is the only credential representation that is ever persisted; raw
/// passwords never reach a storage slot.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn from_password(password: &str) -> Result<Self, CredentialError> {
        let mut salt_bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        Ok(Self(hash.to_string()))
    }

    pub fn verify(&self, password: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(&self.0).map_err(|e| CredentialError::Malformed(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialHash(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_correct_password() {
        let hash = CredentialHash::from_password("hunter22").unwrap();
        assert!(hash.verify("hunter22").unwrap());
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = CredentialHash::from_password("hunter22").unwrap();
        assert!(!hash.verify("hunter23").unwrap());
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = CredentialHash::from_password("secret1").unwrap();
        let b = CredentialHash::from_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_does_not_contain_password() {
        let hash = CredentialHash::from_password("plaintext-pw").unwrap();
        assert!(!hash.as_str().contains("plaintext-pw"));
        assert!(hash.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hash: CredentialHash = serde_json::from_str("\"not-a-phc-string\"").unwrap();
        assert!(matches!(hash.verify("x"), Err(CredentialError::Malformed(_))));
    }
}
