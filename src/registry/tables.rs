//! Lookup tables for algorithm names.
//!
//! Every table is keyed by the canonical (IANA registry) name. The
//! per-implementation tables translate that name to the spelling a given
//! TLS tool expects on its command line.

use phf::phf_map;

use super::{CipherSuite, NamedGroup, SignatureAlgorithm};

/// Canonical name → cipher suite
pub static CIPHER_SUITES: phf::Map<&'static str, CipherSuite> = phf_map! {
    "TLS_AES_128_GCM_SHA256" => CipherSuite::Aes128GcmSha256,
    "TLS_AES_256_GCM_SHA384" => CipherSuite::Aes256GcmSha384,
    "TLS_CHACHA20_POLY1305_SHA256" => CipherSuite::Chacha20Poly1305Sha256,
    "TLS_AES_128_CCM_SHA256" => CipherSuite::Aes128CcmSha256,
    "TLS_AES_128_CCM_8_SHA256" => CipherSuite::Aes128Ccm8Sha256,
};

/// Canonical name → signature algorithm
pub static SIGNATURE_ALGORITHMS: phf::Map<&'static str, SignatureAlgorithm> = phf_map! {
    "ecdsa_secp256r1_sha256" => SignatureAlgorithm::EcdsaSecp256r1Sha256,
    "ecdsa_secp384r1_sha384" => SignatureAlgorithm::EcdsaSecp384r1Sha384,
    "ecdsa_secp521r1_sha512" => SignatureAlgorithm::EcdsaSecp521r1Sha512,
    "rsa_pss_rsae_sha256" => SignatureAlgorithm::RsaPssRsaeSha256,
};

/// Canonical name → named group
pub static NAMED_GROUPS: phf::Map<&'static str, NamedGroup> = phf_map! {
    "secp256r1" => NamedGroup::Secp256r1,
    "secp384r1" => NamedGroup::Secp384r1,
    "secp521r1" => NamedGroup::Secp521r1,
    "x25519" => NamedGroup::X25519,
    "x448" => NamedGroup::X448,
    "ffdhe2048" => NamedGroup::Ffdhe2048,
};

/// OpenSSL `-groups` spelling
pub static OPENSSL_NAMED_GROUP: phf::Map<&'static str, &'static str> = phf_map! {
    "secp256r1" => "P-256",
    "secp384r1" => "P-384",
    "secp521r1" => "P-521",
    "x25519" => "X25519",
    "x448" => "X448",
    "ffdhe2048" => "ffdhe2048",
};

/// GnuTLS priority string items for a cipher suite
pub static GNUTLS_CIPHER_SUITE: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "TLS_AES_256_GCM_SHA384" => &["AES-256-GCM", "SHA384", "AEAD"],
    "TLS_AES_128_GCM_SHA256" => &["AES-128-GCM", "SHA256", "AEAD"],
    "TLS_CHACHA20_POLY1305_SHA256" => &["CHACHA20-POLY1305", "SHA256", "AEAD"],
    "TLS_AES_128_CCM_SHA256" => &["AES-128-CCM", "SHA256", "AEAD"],
    "TLS_AES_128_CCM_8_SHA256" => &["AES-128-CCM-8", "SHA256", "AEAD"],
};

/// GnuTLS priority string items for a signature algorithm
pub static GNUTLS_SIGNATURE_ALGORITHM: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "ecdsa_secp256r1_sha256" => &["SIGN-ECDSA-SECP256R1-SHA256"],
    "ecdsa_secp384r1_sha384" => &["SIGN-ECDSA-SECP384R1-SHA384"],
    "ecdsa_secp521r1_sha512" => &["SIGN-ECDSA-SECP521R1-SHA512"],
    "rsa_pss_rsae_sha256" => &["SIGN-RSA-PSS-RSAE-SHA256"],
};

/// GnuTLS priority string items for a named group
pub static GNUTLS_NAMED_GROUP: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "secp256r1" => &["GROUP-SECP256R1"],
    "secp384r1" => &["GROUP-SECP384R1"],
    "secp521r1" => &["GROUP-SECP521R1"],
    "x25519" => &["GROUP-X25519"],
    "x448" => &["GROUP-X448"],
    "ffdhe2048" => &["GROUP-FFDHE2048"],
};

/// Mbed TLS build option a named group needs
pub static MBEDTLS_NAMED_GROUP_CONFIG: phf::Map<&'static str, &'static str> = phf_map! {
    "secp256r1" => "PSA_WANT_ECC_SECP_R1_256",
    "secp384r1" => "PSA_WANT_ECC_SECP_R1_384",
    "secp521r1" => "PSA_WANT_ECC_SECP_R1_521",
    "x25519" => "PSA_WANT_ECC_MONTGOMERY_255",
    "x448" => "PSA_WANT_ECC_MONTGOMERY_448",
    "ffdhe2048" => "PSA_WANT_DH_RFC7919_2048",
};
