//! PKI Forge - Self-Contained Certificate Hierarchy Generator
//!
//! Generates a complete two-tier PKI hierarchy — a root CA, an intermediate
//! CA signed by the root, and server/client leaf certificates signed by the
//! intermediate — and emits the concatenated chain files TLS peers present
//! during handshake verification.
//!
//! # Overview
//!
//! ```text
//! Root CA (self-signed, pathlen=2)
//!   └── Intermediate CA (signed by Root, pathlen=0)
//!       ├── Server certificate (signed by Intermediate, serverAuth, SAN)
//!       └── Client certificate (signed by Intermediate, clientAuth)
//! ```
//!
//! One generation run produces, under the output directory:
//!
//! - `rootCA.key` / `rootCA.crt`, `intermediateCA.key` / `intermediateCA.crt`,
//!   `server.key` / `server.crt`, `client.key` / `client.crt`
//! - `server-chain.crt` — server certificate followed by the intermediate
//! - `client-chain.crt` — client certificate followed by the intermediate
//! - `ca-chain.crt` — root followed by the intermediate, for distributing
//!   the full CA trust path
//!
//! Keys are RSA (4096-bit for CAs, 2048-bit for leaves by default) in PEM
//! PKCS#1 framing; certificates are X.509v3, SHA-256 signed, in PEM.
//!
//! # Quick Start
//!
//! ```no_run
//! use pki_forge::configs::AppConfig;
//! use pki_forge::hierarchy::generate_and_store;
//! use pki_forge::storage::DirectoryStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::default();
//!     let mut store = DirectoryStore::create(&config.output.directory)?;
//!     generate_and_store(&config, &mut store)?;
//!     println!("Hierarchy written to {}", store.root().display());
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`keygen`] — fresh RSA key pairs of caller-supplied strength
//! - [`profiles`] — the declarative role-policy table (serials, validity,
//!   key usage, CA constraints, SANs) consumed uniformly by issuance
//! - [`issuance`] — the single descriptor-driven certificate builder
//! - [`hierarchy`] — orchestration of the four issuance steps in strict
//!   dependency order
//! - [`chain_assembly`] — order-significant concatenation of stored
//!   certificates into chain files
//! - [`storage`] — the `ArtifactStore` seam (filesystem-backed for the
//!   binary, in-memory for tests)
//! - [`configs`] — TOML configuration; every field defaults to the fixed
//!   policy, so no file is required
//! - [`error`] — the error taxonomy; all failures abort the run
//!
//! # Error Handling
//!
//! Library operations return [`error::PkiError`]; there is no partial
//! success and no retry. A hierarchy with a missing member is not useful,
//! and regenerating from the top is cheap, so the first failure wins.

pub mod chain_assembly;
pub mod configs;
pub mod error;
pub mod hierarchy;
pub mod issuance;
pub mod keygen;
pub mod profiles;
pub mod storage;

pub use configs::AppConfig;
pub use error::{PkiError, Result};
pub use hierarchy::{build_hierarchy, generate_and_store, persist_hierarchy, PkiHierarchy};
pub use profiles::{CertProfile, CertRole};
pub use storage::{ArtifactStore, DirectoryStore, MemoryStore};
