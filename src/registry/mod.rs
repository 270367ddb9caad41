//! TLS 1.3 algorithm registry.
//!
//! Cipher suites, signature algorithms and named groups the generator
//! exercises, with their IANA code points and the test certificates each
//! signature algorithm is served with.

pub mod tables;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, Result};

/// TLS 1.3 cipher suites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    /// TLS_AES_128_GCM_SHA256
    #[serde(rename = "TLS_AES_128_GCM_SHA256")]
    Aes128GcmSha256,
    /// TLS_AES_256_GCM_SHA384
    #[serde(rename = "TLS_AES_256_GCM_SHA384")]
    Aes256GcmSha384,
    /// TLS_CHACHA20_POLY1305_SHA256
    #[serde(rename = "TLS_CHACHA20_POLY1305_SHA256")]
    Chacha20Poly1305Sha256,
    /// TLS_AES_128_CCM_SHA256
    #[serde(rename = "TLS_AES_128_CCM_SHA256")]
    Aes128CcmSha256,
    /// TLS_AES_128_CCM_8_SHA256
    #[serde(rename = "TLS_AES_128_CCM_8_SHA256")]
    Aes128Ccm8Sha256,
}

impl CipherSuite {
    /// All suites in code point order
    pub fn all() -> [Self; 5] {
        [
            Self::Aes128GcmSha256,
            Self::Aes256GcmSha384,
            Self::Chacha20Poly1305Sha256,
            Self::Aes128CcmSha256,
            Self::Aes128Ccm8Sha256,
        ]
    }

    /// IANA name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes128GcmSha256 => "TLS_AES_128_GCM_SHA256",
            Self::Aes256GcmSha384 => "TLS_AES_256_GCM_SHA384",
            Self::Chacha20Poly1305Sha256 => "TLS_CHACHA20_POLY1305_SHA256",
            Self::Aes128CcmSha256 => "TLS_AES_128_CCM_SHA256",
            Self::Aes128Ccm8Sha256 => "TLS_AES_128_CCM_8_SHA256",
        }
    }

    /// IANA code point
    pub fn iana_value(&self) -> u16 {
        match self {
            Self::Aes128GcmSha256 => 0x1301,
            Self::Aes256GcmSha384 => 0x1302,
            Self::Chacha20Poly1305Sha256 => 0x1303,
            Self::Aes128CcmSha256 => 0x1304,
            Self::Aes128Ccm8Sha256 => 0x1305,
        }
    }

    /// Name without the `TLS_` prefix, as used in test names
    pub fn short_name(&self) -> &'static str {
        &self.name()[4..]
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        tables::CIPHER_SUITES
            .get(s.to_uppercase().as_str())
            .copied()
            .ok_or_else(|| CompatError::UnknownCipherSuite(s.to_string()))
    }
}

/// Test certificate files for one signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Certificate {
    /// CA that issued the certificate
    pub ca_file: &'static str,
    /// Server certificate
    pub cert_file: &'static str,
    /// Private key
    pub key_file: &'static str,
}

const ECDSA_CA: &str = "data_files/test-ca2.crt";

/// TLS 1.3 signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureAlgorithm {
    /// ecdsa_secp256r1_sha256
    EcdsaSecp256r1Sha256,
    /// ecdsa_secp384r1_sha384
    EcdsaSecp384r1Sha384,
    /// ecdsa_secp521r1_sha512
    EcdsaSecp521r1Sha512,
    /// rsa_pss_rsae_sha256
    RsaPssRsaeSha256,
}

impl SignatureAlgorithm {
    /// All schemes in registry order
    pub fn all() -> [Self; 4] {
        [
            Self::EcdsaSecp256r1Sha256,
            Self::EcdsaSecp384r1Sha384,
            Self::EcdsaSecp521r1Sha512,
            Self::RsaPssRsaeSha256,
        ]
    }

    /// IANA name
    pub fn name(&self) -> &'static str {
        match self {
            Self::EcdsaSecp256r1Sha256 => "ecdsa_secp256r1_sha256",
            Self::EcdsaSecp384r1Sha384 => "ecdsa_secp384r1_sha384",
            Self::EcdsaSecp521r1Sha512 => "ecdsa_secp521r1_sha512",
            Self::RsaPssRsaeSha256 => "rsa_pss_rsae_sha256",
        }
    }

    /// IANA code point
    pub fn iana_value(&self) -> u16 {
        match self {
            Self::EcdsaSecp256r1Sha256 => 0x0403,
            Self::EcdsaSecp384r1Sha384 => 0x0503,
            Self::EcdsaSecp521r1Sha512 => 0x0603,
            Self::RsaPssRsaeSha256 => 0x0804,
        }
    }

    /// Certificate chain the server presents for this scheme
    pub fn certificate(&self) -> Certificate {
        match self {
            Self::EcdsaSecp256r1Sha256 => Certificate {
                ca_file: ECDSA_CA,
                cert_file: "data_files/ecdsa_secp256r1.crt",
                key_file: "data_files/ecdsa_secp256r1.key",
            },
            Self::EcdsaSecp384r1Sha384 => Certificate {
                ca_file: ECDSA_CA,
                cert_file: "data_files/ecdsa_secp384r1.crt",
                key_file: "data_files/ecdsa_secp384r1.key",
            },
            Self::EcdsaSecp521r1Sha512 => Certificate {
                ca_file: ECDSA_CA,
                cert_file: "data_files/ecdsa_secp521r1.crt",
                key_file: "data_files/ecdsa_secp521r1.key",
            },
            Self::RsaPssRsaeSha256 => Certificate {
                ca_file: "data_files/test-ca_cat12.crt",
                cert_file: "data_files/server2-sha256.crt",
                key_file: "data_files/server2.key",
            },
        }
    }

    /// True for RSASSA-PSS schemes
    pub fn is_rsa_pss(&self) -> bool {
        matches!(self, Self::RsaPssRsaeSha256)
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        tables::SIGNATURE_ALGORITHMS
            .get(s.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| CompatError::UnknownSignatureAlgorithm(s.to_string()))
    }
}

/// TLS 1.3 key share groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedGroup {
    /// secp256r1
    Secp256r1,
    /// secp384r1
    Secp384r1,
    /// secp521r1
    Secp521r1,
    /// x25519
    X25519,
    /// x448
    X448,
    /// ffdhe2048
    Ffdhe2048,
}

impl NamedGroup {
    /// All groups in registry order.
    ///
    /// Only one finite field group, to keep test run time reasonable.
    pub fn all() -> [Self; 6] {
        [
            Self::Secp256r1,
            Self::Secp384r1,
            Self::Secp521r1,
            Self::X25519,
            Self::X448,
            Self::Ffdhe2048,
        ]
    }

    /// IANA name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secp256r1 => "secp256r1",
            Self::Secp384r1 => "secp384r1",
            Self::Secp521r1 => "secp521r1",
            Self::X25519 => "x25519",
            Self::X448 => "x448",
            Self::Ffdhe2048 => "ffdhe2048",
        }
    }

    /// IANA code point
    pub fn iana_value(&self) -> u16 {
        match self {
            Self::Secp256r1 => 0x17,
            Self::Secp384r1 => 0x18,
            Self::Secp521r1 => 0x19,
            Self::X25519 => 0x1d,
            Self::X448 => 0x1e,
            Self::Ffdhe2048 => 0x100,
        }
    }

    /// True for finite field Diffie-Hellman groups
    pub fn is_ffdh(&self) -> bool {
        matches!(self, Self::Ffdhe2048)
    }
}

impl fmt::Display for NamedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedGroup {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        tables::NAMED_GROUPS
            .get(s.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| CompatError::UnknownNamedGroup(s.to_string()))
    }
}
