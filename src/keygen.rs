//! RSA key pair generation.
//!
//! Every entity in the hierarchy gets a fresh key pair; keys are never reused
//! across entities. Bit strength is caller-supplied (4096 for CAs, 2048 for
//! leaf certificates under the default policy).

use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;

use crate::error::{PkiError, Result};

/// Generate a fresh RSA key pair of the requested bit strength.
///
/// # Errors
/// Returns [`PkiError::KeyGeneration`] if the underlying entropy source or
/// RSA implementation cannot produce a key.
pub fn generate_rsa_keypair(bits: u32) -> Result<PKey<Private>> {
    let rsa =
        Rsa::generate(bits).map_err(|e| PkiError::KeyGeneration(format!("RSA-{}: {}", bits, e)))?;

    PKey::from_rsa(rsa).map_err(|e| PkiError::KeyGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair_requested_strength() {
        let key = generate_rsa_keypair(2048).unwrap();
        assert_eq!(key.rsa().unwrap().size() * 8, 2048);
    }

    #[test]
    fn test_generated_keys_are_distinct() {
        let a = generate_rsa_keypair(2048).unwrap();
        let b = generate_rsa_keypair(2048).unwrap();
        assert!(!a.public_eq(&b));
    }
}
