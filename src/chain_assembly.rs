//! Chain file assembly.
//!
//! A chain is the order-significant concatenation of already-encoded
//! certificates: the leaf first, then each ancestor up to (but not
//! including) the root. The CA chain is the exception, carrying the root
//! followed by the intermediate for out-of-band trust distribution.
//!
//! Inputs are read back from the [`ArtifactStore`] rather than taken from
//! memory, so a corrupted or incomplete store surfaces as
//! [`crate::error::PkiError::MissingArtifact`] instead of a silent partial
//! chain file.

use crate::error::Result;
use crate::profiles::CertRole;
use crate::storage::ArtifactStore;

pub const SERVER_CHAIN_FILE: &str = "server-chain.crt";
pub const CLIENT_CHAIN_FILE: &str = "client-chain.crt";
pub const CA_CHAIN_FILE: &str = "ca-chain.crt";

/// Concatenate the named artifacts in order. Pure byte concatenation; the
/// PEM blocks themselves are the only separators.
pub fn assemble_chain(store: &dyn ArtifactStore, parts: &[&str]) -> Result<Vec<u8>> {
    let mut chain = Vec::new();
    for name in parts {
        chain.extend_from_slice(&store.read(name)?);
    }
    Ok(chain)
}

/// Assemble and persist the three chain files from the stored certificates:
/// server + intermediate, client + intermediate, and root + intermediate.
pub fn write_chain_files(store: &mut dyn ArtifactStore) -> Result<()> {
    let server_chain = assemble_chain(
        store,
        &[
            CertRole::Server.cert_file(),
            CertRole::Intermediate.cert_file(),
        ],
    )?;
    store.write(SERVER_CHAIN_FILE, &server_chain)?;

    let client_chain = assemble_chain(
        store,
        &[
            CertRole::Client.cert_file(),
            CertRole::Intermediate.cert_file(),
        ],
    )?;
    store.write(CLIENT_CHAIN_FILE, &client_chain)?;

    let ca_chain = assemble_chain(
        store,
        &[
            CertRole::Root.cert_file(),
            CertRole::Intermediate.cert_file(),
        ],
    )?;
    store.write(CA_CHAIN_FILE, &ca_chain)?;

    Ok(())
}
