//! Error types for certificate generation and persistence.
//!
//! Every failure in a hierarchy run is fatal: a partially built hierarchy is
//! not independently useful, so callers short-circuit on the first error and
//! regenerate from the top.

use thiserror::Error;

/// The error taxonomy for PKI hierarchy generation.
#[derive(Error, Debug)]
pub enum PkiError {
    /// RSA key generation failed (entropy source or algorithm failure).
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// The issuer key does not correspond to the issuer certificate, or the
    /// signature over the to-be-signed structure could not be produced.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Certificate descriptor fields could not be serialized into X.509
    /// structures (e.g. a malformed subject alternative name).
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// An artifact could not be written to or read back from the store.
    #[error("Persistence failure for '{name}': {source}")]
    Persistence {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Chain assembly referenced an artifact absent from the store.
    #[error("Missing artifact '{0}'")]
    MissingArtifact(String),
}

/// A specialized Result type for PKI operations.
pub type Result<T> = std::result::Result<T, PkiError>;
