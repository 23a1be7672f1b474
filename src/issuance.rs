//! Certificate issuance.
//!
//! One descriptor-driven issuance function covers all four roles of the
//! hierarchy. The caller supplies a complete [`CertProfile`] (the role policy
//! table), the subject's key pair, and the issuer's key/certificate pair —
//! or no issuer certificate for the self-signed root.
//!
//! # PKI Hierarchy
//! ```text
//! Root CA (self-signed, pathlen=2)
//!   └── Intermediate CA (signed by Root, pathlen=0)
//!       ├── Server certificate (signed by Intermediate, serverAuth)
//!       └── Client certificate (signed by Intermediate, clientAuth)
//! ```
//!
//! # Certificate Properties
//! - **Version**: X.509v3
//! - **Signature Algorithm**: SHA-256 with RSA
//! - **Serial Number**: monotonic per hierarchy run (1=root .. 4=client)
//! - **Basic Constraints**: critical; CA and pathlen per profile
//! - **Key Usage**: critical; bits per profile
//! - **Extended Key Usage / SAN**: leaf profiles only

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
};
use openssl::x509::{X509, X509Name};

use crate::error::{PkiError, Result};
use crate::profiles::{CertProfile, ExtendedUsage, SanEntry};

const X509_VERSION_3: i32 = 2; // X509 version 3 is represented by 2

/// Issue a certificate described by `profile` over `subject_key`'s public
/// key, signed with `issuer_key`.
///
/// When `issuer_cert` is `None` the certificate is self-signed (used only
/// for the root): the profile's own subject serves as the issuer template
/// and `issuer_key` must be the subject's own key. Otherwise the issuer
/// fields are derived from `issuer_cert`'s subject and the signature is
/// produced with `issuer_key`.
///
/// # Errors
/// - [`PkiError::Signing`] if `issuer_key` does not correspond to
///   `issuer_cert`'s public key, or the signature cannot be produced.
/// - [`PkiError::Encoding`] if profile fields cannot be serialized (e.g. a
///   malformed subject alternative name).
pub fn issue_certificate(
    profile: &CertProfile,
    subject_key: &PKey<Private>,
    issuer_key: &PKey<Private>,
    issuer_cert: Option<&X509>,
) -> Result<X509> {
    // The issuer key must be the private half of the issuer certificate's
    // public key; a mismatch would produce a chain that never verifies.
    if let Some(cert) = issuer_cert {
        let issuer_public = cert
            .public_key()
            .map_err(|e| PkiError::Signing(format!("Failed to read issuer public key: {}", e)))?;
        if !issuer_key.public_eq(&issuer_public) {
            return Err(PkiError::Signing(
                "Issuer key does not correspond to issuer certificate".to_string(),
            ));
        }
    }

    let mut builder =
        X509::builder().map_err(|e| PkiError::Encoding(format!("X509 builder: {}", e)))?;

    builder
        .set_version(X509_VERSION_3)
        .map_err(|e| PkiError::Encoding(format!("Failed to set version: {}", e)))?;

    let serial = BigNum::from_u32(profile.serial)
        .and_then(|bn| bn.to_asn1_integer())
        .map_err(|e| PkiError::Encoding(format!("Failed to encode serial number: {}", e)))?;
    builder
        .set_serial_number(&serial)
        .map_err(|e| PkiError::Encoding(format!("Failed to set serial number: {}", e)))?;

    let subject_name = build_subject_name(&profile.common_name)?;
    builder
        .set_subject_name(&subject_name)
        .map_err(|e| PkiError::Encoding(format!("Failed to set subject: {}", e)))?;

    // Issuer is the signer's subject; the root issues to itself.
    match issuer_cert {
        Some(cert) => builder
            .set_issuer_name(cert.subject_name())
            .map_err(|e| PkiError::Encoding(format!("Failed to set issuer: {}", e)))?,
        None => builder
            .set_issuer_name(&subject_name)
            .map_err(|e| PkiError::Encoding(format!("Failed to set issuer: {}", e)))?,
    }

    let not_before = Asn1Time::days_from_now(0)
        .map_err(|e| PkiError::Encoding(format!("Failed to create not_before: {}", e)))?;
    builder
        .set_not_before(&not_before)
        .map_err(|e| PkiError::Encoding(format!("Failed to set not_before: {}", e)))?;

    let not_after = Asn1Time::days_from_now(profile.validity_days)
        .map_err(|e| PkiError::Encoding(format!("Failed to create not_after: {}", e)))?;
    builder
        .set_not_after(&not_after)
        .map_err(|e| PkiError::Encoding(format!("Failed to set not_after: {}", e)))?;

    builder
        .set_pubkey(subject_key)
        .map_err(|e| PkiError::Encoding(format!("Failed to set public key: {}", e)))?;

    // Basic Constraints, critical. CA certificates carry their path length
    // constraint; leaves are CA=false.
    let mut bc = BasicConstraints::new();
    bc.critical();
    if profile.is_ca {
        bc.ca();
        if let Some(path_len) = profile.max_path_len {
            bc.pathlen(path_len);
        }
    }
    let bc_extension = bc
        .build()
        .map_err(|e| PkiError::Encoding(format!("Failed to build BasicConstraints: {}", e)))?;
    builder
        .append_extension(bc_extension)
        .map_err(|e| PkiError::Encoding(format!("Failed to add BasicConstraints: {}", e)))?;

    let mut ku = KeyUsage::new();
    ku.critical();
    if profile.key_usage.digital_signature {
        ku.digital_signature();
    }
    if profile.key_usage.key_encipherment {
        ku.key_encipherment();
    }
    if profile.key_usage.key_cert_sign {
        ku.key_cert_sign();
    }
    if profile.key_usage.crl_sign {
        ku.crl_sign();
    }
    let ku_extension = ku
        .build()
        .map_err(|e| PkiError::Encoding(format!("Failed to build KeyUsage: {}", e)))?;
    builder
        .append_extension(ku_extension)
        .map_err(|e| PkiError::Encoding(format!("Failed to add KeyUsage: {}", e)))?;

    if let Some(purpose) = profile.extended_usage {
        let mut eku = ExtendedKeyUsage::new();
        match purpose {
            ExtendedUsage::ServerAuth => eku.server_auth(),
            ExtendedUsage::ClientAuth => eku.client_auth(),
        };
        let eku_extension = eku
            .build()
            .map_err(|e| PkiError::Encoding(format!("Failed to build ExtendedKeyUsage: {}", e)))?;
        builder
            .append_extension(eku_extension)
            .map_err(|e| PkiError::Encoding(format!("Failed to add ExtendedKeyUsage: {}", e)))?;
    }

    if !profile.subject_alt_names.is_empty() {
        let mut san = SubjectAlternativeName::new();
        for entry in &profile.subject_alt_names {
            match entry {
                SanEntry::Dns(name) => san.dns(name),
                SanEntry::Ip(addr) => san.ip(addr),
            };
        }
        let san_extension = {
            let context = builder.x509v3_context(issuer_cert.map(|c| &**c), None);
            san.build(&context)
        }
        .map_err(|e| {
            PkiError::Encoding(format!("Failed to build SubjectAlternativeName: {}", e))
        })?;
        builder
            .append_extension(san_extension)
            .map_err(|e| PkiError::Encoding(format!("Failed to add SubjectAlternativeName: {}", e)))?;
    }

    builder
        .sign(issuer_key, MessageDigest::sha256())
        .map_err(|e| PkiError::Signing(format!("Failed to sign certificate: {}", e)))?;

    Ok(builder.build())
}

fn build_subject_name(common_name: &str) -> Result<X509Name> {
    let mut name_builder =
        X509Name::builder().map_err(|e| PkiError::Encoding(format!("Name builder: {}", e)))?;
    name_builder
        .append_entry_by_nid(Nid::COMMONNAME, common_name)
        .map_err(|e| PkiError::Encoding(format!("Failed to set CN: {}", e)))?;
    Ok(name_builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::AppConfig;
    use crate::keygen::generate_rsa_keypair;
    use crate::profiles::CertRole;
    use openssl::x509::X509VerifyResult;

    // 2048-bit CA keys keep the tests fast; policy content is unchanged.
    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.keys.ca_bits = 2048;
        config
    }

    fn common_name_of(name: &openssl::x509::X509NameRef) -> String {
        name.entries_by_nid(Nid::COMMONNAME)
            .next()
            .unwrap()
            .data()
            .as_utf8()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_root_is_self_signed() {
        let config = test_config();
        let profile = CertProfile::for_role(CertRole::Root, &config);
        let key = generate_rsa_keypair(profile.key_bits).unwrap();
        let cert = issue_certificate(&profile, &key, &key, None).unwrap();

        assert_eq!(
            common_name_of(cert.subject_name()),
            common_name_of(cert.issuer_name())
        );
        assert!(cert.verify(&key).unwrap());
        assert_eq!(cert.serial_number().to_bn().unwrap(), BigNum::from_u32(1).unwrap());
    }

    #[test]
    fn test_issuer_name_matches_signer_subject() {
        let config = test_config();
        let root_profile = CertProfile::for_role(CertRole::Root, &config);
        let root_key = generate_rsa_keypair(root_profile.key_bits).unwrap();
        let root_cert = issue_certificate(&root_profile, &root_key, &root_key, None).unwrap();

        let inter_profile = CertProfile::for_role(CertRole::Intermediate, &config);
        let inter_key = generate_rsa_keypair(inter_profile.key_bits).unwrap();
        let inter_cert =
            issue_certificate(&inter_profile, &inter_key, &root_key, Some(&root_cert)).unwrap();

        assert_eq!(
            common_name_of(inter_cert.issuer_name()),
            common_name_of(root_cert.subject_name())
        );
        assert_eq!(root_cert.issued(&inter_cert), X509VerifyResult::OK);
        assert!(inter_cert.verify(&root_key).unwrap());
    }

    #[test]
    fn test_mismatched_issuer_key_is_a_signing_error() {
        let config = test_config();
        let root_profile = CertProfile::for_role(CertRole::Root, &config);
        let root_key = generate_rsa_keypair(root_profile.key_bits).unwrap();
        let root_cert = issue_certificate(&root_profile, &root_key, &root_key, None).unwrap();

        let unrelated_key = generate_rsa_keypair(2048).unwrap();
        let inter_profile = CertProfile::for_role(CertRole::Intermediate, &config);
        let inter_key = generate_rsa_keypair(inter_profile.key_bits).unwrap();

        let result =
            issue_certificate(&inter_profile, &inter_key, &unrelated_key, Some(&root_cert));
        assert!(matches!(result, Err(PkiError::Signing(_))));
    }

    #[test]
    fn test_malformed_san_is_an_encoding_error() {
        let config = test_config();
        let root_profile = CertProfile::for_role(CertRole::Root, &config);
        let root_key = generate_rsa_keypair(root_profile.key_bits).unwrap();
        let root_cert = issue_certificate(&root_profile, &root_key, &root_key, None).unwrap();

        let mut profile = CertProfile::for_role(CertRole::Server, &config);
        profile.subject_alt_names = vec![SanEntry::Ip("999.999.999.999".to_string())];
        let key = generate_rsa_keypair(profile.key_bits).unwrap();

        let result = issue_certificate(&profile, &key, &root_key, Some(&root_cert));
        assert!(matches!(result, Err(PkiError::Encoding(_))));
    }

    #[test]
    fn test_server_certificate_carries_sans() {
        let config = test_config();
        let root_profile = CertProfile::for_role(CertRole::Root, &config);
        let root_key = generate_rsa_keypair(root_profile.key_bits).unwrap();
        let root_cert = issue_certificate(&root_profile, &root_key, &root_key, None).unwrap();

        let profile = CertProfile::for_role(CertRole::Server, &config);
        let key = generate_rsa_keypair(profile.key_bits).unwrap();
        let cert = issue_certificate(&profile, &key, &root_key, Some(&root_cert)).unwrap();

        let sans = cert.subject_alt_names().unwrap();
        let dns: Vec<&str> = sans.iter().filter_map(|n| n.dnsname()).collect();
        let ips: Vec<&[u8]> = sans.iter().filter_map(|n| n.ipaddress()).collect();
        assert_eq!(dns, vec!["localhost"]);
        assert_eq!(ips, vec![&[127u8, 0, 0, 1][..]]);
    }

    #[test]
    fn test_client_certificate_has_no_sans() {
        let config = test_config();
        let root_profile = CertProfile::for_role(CertRole::Root, &config);
        let root_key = generate_rsa_keypair(root_profile.key_bits).unwrap();
        let root_cert = issue_certificate(&root_profile, &root_key, &root_key, None).unwrap();

        let profile = CertProfile::for_role(CertRole::Client, &config);
        let key = generate_rsa_keypair(profile.key_bits).unwrap();
        let cert = issue_certificate(&profile, &key, &root_key, Some(&root_cert)).unwrap();

        assert!(cert.subject_alt_names().is_none());
    }

    // The builder deliberately does not require a child's validity window to
    // nest inside its issuer's; the verifying side enforces time validity at
    // use. This test pins the permissive behavior.
    #[test]
    fn test_child_validity_window_not_constrained_by_issuer() {
        let config = test_config();
        let mut root_profile = CertProfile::for_role(CertRole::Root, &config);
        root_profile.validity_days = 1;
        let root_key = generate_rsa_keypair(root_profile.key_bits).unwrap();
        let root_cert = issue_certificate(&root_profile, &root_key, &root_key, None).unwrap();

        let mut profile = CertProfile::for_role(CertRole::Server, &config);
        profile.validity_days = 100; // outlives the issuer
        let key = generate_rsa_keypair(profile.key_bits).unwrap();

        let cert = issue_certificate(&profile, &key, &root_key, Some(&root_cert)).unwrap();
        assert!(cert.not_after() > root_cert.not_after());
    }
}
