//! Role policy for the certificate hierarchy.
//!
//! The four certificate roles (root CA, intermediate CA, server leaf, client
//! leaf) are described declaratively as [`CertProfile`] descriptors instead of
//! four near-duplicate issuance paths. The issuance step consumes the profile
//! as-is and infers nothing from context.
//!
//! # Role policy
//! ```text
//! Role         Serial  Validity  KeyUsage                          ExtKeyUsage  CA   pathlen  SAN
//! Root         1       10y       certSign, cRLSign, digSignature   -            yes  2        -
//! Intermediate 2       5y        certSign, cRLSign, digSignature   -            yes  0        -
//! Server       3       2y        digSignature, keyEncipherment     serverAuth   no   -        DNS/IP
//! Client       4       2y        digSignature, keyEncipherment     clientAuth   no   -        -
//! ```
//!
//! Validity periods, key strengths, subject names and the server SAN list are
//! configurable; serials, usage flags and CA constraints are fixed policy.

use crate::configs::AppConfig;

const ROOT_CA_PATH_LENGTH: u32 = 2; // Allows intermediate CA + leaf below the root
const INTERMEDIATE_CA_PATH_LENGTH: u32 = 0; // Can only sign end-entity certs, not other CAs
const DAYS_PER_YEAR: u32 = 365;

/// The four entities of one hierarchy generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertRole {
    Root,
    Intermediate,
    Server,
    Client,
}

impl CertRole {
    /// Serial number assigned to this role, monotonically per hierarchy run.
    pub fn serial(&self) -> u32 {
        match self {
            CertRole::Root => 1,
            CertRole::Intermediate => 2,
            CertRole::Server => 3,
            CertRole::Client => 4,
        }
    }

    /// File name of the persisted private key for this role.
    pub fn key_file(&self) -> &'static str {
        match self {
            CertRole::Root => "rootCA.key",
            CertRole::Intermediate => "intermediateCA.key",
            CertRole::Server => "server.key",
            CertRole::Client => "client.key",
        }
    }

    /// File name of the persisted certificate for this role.
    pub fn cert_file(&self) -> &'static str {
        match self {
            CertRole::Root => "rootCA.crt",
            CertRole::Intermediate => "intermediateCA.crt",
            CertRole::Server => "server.crt",
            CertRole::Client => "client.crt",
        }
    }
}

/// Key usage bits carried by a certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyUsageFlags {
    pub digital_signature: bool,
    pub key_encipherment: bool,
    pub key_cert_sign: bool,
    pub crl_sign: bool,
}

const CA_KEY_USAGE: KeyUsageFlags = KeyUsageFlags {
    digital_signature: true,
    key_encipherment: false,
    key_cert_sign: true,
    crl_sign: true,
};

const LEAF_KEY_USAGE: KeyUsageFlags = KeyUsageFlags {
    digital_signature: true,
    key_encipherment: true,
    key_cert_sign: false,
    crl_sign: false,
};

/// Extended key usage purpose of a leaf certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedUsage {
    ServerAuth,
    ClientAuth,
}

/// One subject alternative name entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanEntry {
    Dns(String),
    Ip(String),
}

/// Complete certificate descriptor for one role: everything the issuance step
/// needs besides the keys involved.
#[derive(Debug, Clone)]
pub struct CertProfile {
    pub role: CertRole,
    pub serial: u32,
    pub common_name: String,
    pub validity_days: u32,
    pub key_bits: u32,
    pub key_usage: KeyUsageFlags,
    pub extended_usage: Option<ExtendedUsage>,
    pub is_ca: bool,
    pub max_path_len: Option<u32>,
    pub subject_alt_names: Vec<SanEntry>,
}

impl CertProfile {
    /// Build the complete descriptor for a role from the fixed policy table
    /// and the configurable fields (validity, key strength, names, SANs).
    pub fn for_role(role: CertRole, config: &AppConfig) -> Self {
        match role {
            CertRole::Root => CertProfile {
                role,
                serial: role.serial(),
                common_name: config.subjects.root.clone(),
                validity_days: config.validity.ca_years * DAYS_PER_YEAR,
                key_bits: config.keys.ca_bits,
                key_usage: CA_KEY_USAGE,
                extended_usage: None,
                is_ca: true,
                max_path_len: Some(ROOT_CA_PATH_LENGTH),
                subject_alt_names: Vec::new(),
            },
            CertRole::Intermediate => CertProfile {
                role,
                serial: role.serial(),
                common_name: config.subjects.intermediate.clone(),
                validity_days: config.validity.intermediate_years * DAYS_PER_YEAR,
                key_bits: config.keys.ca_bits,
                key_usage: CA_KEY_USAGE,
                extended_usage: None,
                is_ca: true,
                max_path_len: Some(INTERMEDIATE_CA_PATH_LENGTH),
                subject_alt_names: Vec::new(),
            },
            CertRole::Server => CertProfile {
                role,
                serial: role.serial(),
                common_name: config.subjects.server.clone(),
                validity_days: config.validity.leaf_years * DAYS_PER_YEAR,
                key_bits: config.keys.leaf_bits,
                key_usage: LEAF_KEY_USAGE,
                extended_usage: Some(ExtendedUsage::ServerAuth),
                is_ca: false,
                max_path_len: None,
                subject_alt_names: config
                    .server_san
                    .dns
                    .iter()
                    .cloned()
                    .map(SanEntry::Dns)
                    .chain(config.server_san.ip.iter().cloned().map(SanEntry::Ip))
                    .collect(),
            },
            CertRole::Client => CertProfile {
                role,
                serial: role.serial(),
                common_name: config.subjects.client.clone(),
                validity_days: config.validity.leaf_years * DAYS_PER_YEAR,
                key_bits: config.keys.leaf_bits,
                key_usage: LEAF_KEY_USAGE,
                extended_usage: Some(ExtendedUsage::ClientAuth),
                is_ca: false,
                max_path_len: None,
                subject_alt_names: Vec::new(),
            },
        }
    }
}
