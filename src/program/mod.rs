//! Command builders for TLS test programs.
//!
//! A [`Program`] describes one side of a test handshake: which TLS
//! implementation runs, in which [`Role`], and with which algorithms and
//! PSK settings. From that it renders the `ssl-opt.sh` requirement lines,
//! the command line, and the output checks that assert the handshake went
//! the way the model predicts.
//!
//! Each implementation's spelling lives behind the [`CommandBuilder`] trait:
//!
//! | Implementation | Builder                | Negotiation policy        |
//! |----------------|------------------------|---------------------------|
//! | OpenSSL        | [`openssl::OpenSsl`]   | `Generic`                 |
//! | GnuTLS         | [`gnutls::GnuTls`]     | `AlternateWithOverride`   |
//! | Mbed TLS       | [`mbedtls::MbedTls`]   | `Generic`                 |

pub mod gnutls;
pub mod mbedtls;
pub mod openssl;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, Result};
use crate::kex::{KexMode, NegotiationPolicy};
use crate::registry::{CipherSuite, NamedGroup, SignatureAlgorithm};

/// Identity used when nothing else is configured
pub const DEFAULT_PSK_IDENTITY: &str = "Client_identity";

/// Key used when nothing else is configured (ASCII `abcdefghijklmnop`)
pub const DEFAULT_PSK_KEY: &[u8] = b"abcdefghijklmnop";

/// TLS implementations under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    /// OpenSSL `s_client` / `s_server`
    OpenSsl,
    /// GnuTLS `gnutls-cli` / `gnutls-serv`
    GnuTls,
    /// Mbed TLS `ssl_client2` / `ssl_server2`
    MbedTls,
}

impl Implementation {
    /// All implementations, in the order test cases are generated
    pub fn all() -> [Self; 3] {
        [Self::OpenSsl, Self::GnuTls, Self::MbedTls]
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenSsl => "OpenSSL",
            Self::GnuTls => "GnuTLS",
            Self::MbedTls => "MbedTLS",
        }
    }

    /// First letter of the name, used in test names
    pub fn initial(&self) -> char {
        match self {
            Self::OpenSsl => 'O',
            Self::GnuTls => 'G',
            Self::MbedTls => 'M',
        }
    }

    /// Command builder for this implementation
    pub fn builder(&self) -> &'static dyn CommandBuilder {
        match self {
            Self::OpenSsl => &openssl::OpenSsl,
            Self::GnuTls => &gnutls::GnuTls,
            Self::MbedTls => &mbedtls::MbedTls,
        }
    }

    /// How this implementation picks a key exchange mode
    pub fn negotiation_policy(&self) -> NegotiationPolicy {
        self.builder().negotiation_policy()
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Implementation {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openssl" | "o" => Ok(Self::OpenSsl),
            "gnutls" | "g" => Ok(Self::GnuTls),
            "mbedtls" | "mbed" | "m" => Ok(Self::MbedTls),
            _ => Err(CompatError::UnknownImplementation(s.to_string())),
        }
    }
}

/// Side of the handshake a program plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Initiates the handshake
    Client,
    /// Accepts the handshake and selects parameters
    Server,
}

/// One pre-shared key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PskIdentity {
    /// Identity sent in the ClientHello
    pub identity: String,
    /// Raw key bytes
    pub key: Vec<u8>,
}

impl PskIdentity {
    /// Create a new identity/key pair
    pub fn new(identity: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            identity: identity.into(),
            key: key.into(),
        }
    }

    /// Key as lowercase hex, the form every tool takes on its command line
    pub fn key_hex(&self) -> String {
        hex::encode(&self.key)
    }
}

impl Default for PskIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_PSK_IDENTITY, DEFAULT_PSK_KEY)
    }
}

/// PSK settings for one side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PskConfig {
    /// Configured identities. Only the first one is used.
    pub identities: Vec<PskIdentity>,
    /// Key exchange modes this side accepts
    pub kex_mode: KexMode,
}

impl PskConfig {
    /// Single-identity PSK configuration
    pub fn new(identity: PskIdentity, kex_mode: KexMode) -> Self {
        Self {
            identities: vec![identity],
            kex_mode,
        }
    }

    /// Identity that goes on the command line.
    ///
    /// Multiple identities are accepted for configuration but only the
    /// first one is ever offered.
    pub fn primary(&self) -> Option<&PskIdentity> {
        self.identities.first()
    }
}

/// Implementation-specific rendering of a [`Program`]
pub trait CommandBuilder: Send + Sync {
    /// `ssl-opt.sh` requirement lines that must hold before the test runs
    fn pre_checks(&self, program: &Program) -> Vec<String>;

    /// Command line, one argument group per element
    fn cmd(&self, program: &Program) -> Result<Vec<String>>;

    /// Output checks for a successful certificate handshake
    fn post_checks(&self, program: &Program) -> Vec<String>;

    /// Output checks proving a HelloRetryRequest selected `group`
    fn hrr_post_checks(&self, _program: &Program, _group: NamedGroup) -> Vec<String> {
        Vec::new()
    }

    /// Output checks proving the handshake settled on `expected`
    fn kex_mode_checks(&self, _program: &Program, _expected: Option<KexMode>) -> Vec<String> {
        Vec::new()
    }

    /// How this implementation picks a key exchange mode
    fn negotiation_policy(&self) -> NegotiationPolicy {
        NegotiationPolicy::Generic
    }
}

/// One side of a generated handshake test
#[derive(Debug, Clone)]
pub struct Program {
    implementation: Implementation,
    role: Role,
    ciphers: Vec<CipherSuite>,
    sig_algs: Vec<SignatureAlgorithm>,
    named_groups: Vec<NamedGroup>,
    cert_sig_algs: Vec<SignatureAlgorithm>,
    compat_mode: bool,
    psk: Option<PskConfig>,
}

/// Append items not already present, keeping first-seen order
fn extend_unique<T: PartialEq + Copy>(target: &mut Vec<T>, items: &[T]) {
    for item in items {
        if !target.contains(item) {
            target.push(*item);
        }
    }
}

impl Program {
    /// Create a program with no algorithm restrictions
    pub fn new(implementation: Implementation, role: Role) -> Self {
        Self {
            implementation,
            role,
            ciphers: Vec::new(),
            sig_algs: Vec::new(),
            named_groups: Vec::new(),
            cert_sig_algs: Vec::new(),
            compat_mode: true,
            psk: None,
        }
    }

    /// Shorthand for a client
    pub fn client(implementation: Implementation) -> Self {
        Self::new(implementation, Role::Client)
    }

    /// Shorthand for a server
    pub fn server(implementation: Implementation) -> Self {
        Self::new(implementation, Role::Server)
    }

    /// Restrict cipher suites
    pub fn add_cipher_suites(&mut self, ciphers: &[CipherSuite]) -> &mut Self {
        extend_unique(&mut self.ciphers, ciphers);
        self
    }

    /// Restrict signature algorithms
    pub fn add_signature_algorithms(&mut self, sig_algs: &[SignatureAlgorithm]) -> &mut Self {
        extend_unique(&mut self.sig_algs, sig_algs);
        self
    }

    /// Restrict named groups, in preference order
    pub fn add_named_groups(&mut self, groups: &[NamedGroup]) -> &mut Self {
        extend_unique(&mut self.named_groups, groups);
        self
    }

    /// Choose the certificates the program is provisioned with
    pub fn add_cert_signature_algorithms(&mut self, sig_algs: &[SignatureAlgorithm]) -> &mut Self {
        extend_unique(&mut self.cert_sig_algs, sig_algs);
        self
    }

    /// Builder form of [`Program::add_cipher_suites`]
    pub fn with_cipher_suite(mut self, cipher: CipherSuite) -> Self {
        self.add_cipher_suites(&[cipher]);
        self
    }

    /// Builder form of [`Program::add_signature_algorithms`]
    pub fn with_signature_algorithm(mut self, sig_alg: SignatureAlgorithm) -> Self {
        self.add_signature_algorithms(&[sig_alg]);
        self
    }

    /// Builder form of [`Program::add_named_groups`]
    pub fn with_named_group(mut self, group: NamedGroup) -> Self {
        self.add_named_groups(&[group]);
        self
    }

    /// Builder form of [`Program::add_cert_signature_algorithms`]
    pub fn with_cert_signature_algorithm(mut self, sig_alg: SignatureAlgorithm) -> Self {
        self.add_cert_signature_algorithms(&[sig_alg]);
        self
    }

    /// Enable or disable TLS 1.3 middlebox compatibility mode
    pub fn with_compat_mode(mut self, compat_mode: bool) -> Self {
        self.compat_mode = compat_mode;
        self
    }

    /// Switch to PSK handshakes
    pub fn with_psk(mut self, psk: PskConfig) -> Self {
        self.psk = Some(psk);
        self
    }

    /// Implementation under test
    pub fn implementation(&self) -> Implementation {
        self.implementation
    }

    /// Client or server
    pub fn role(&self) -> Role {
        self.role
    }

    /// Configured cipher suites
    pub fn ciphers(&self) -> &[CipherSuite] {
        &self.ciphers
    }

    /// Configured signature algorithms
    pub fn sig_algs(&self) -> &[SignatureAlgorithm] {
        &self.sig_algs
    }

    /// Configured named groups
    pub fn named_groups(&self) -> &[NamedGroup] {
        &self.named_groups
    }

    /// Middlebox compatibility mode
    pub fn compat_mode(&self) -> bool {
        self.compat_mode
    }

    /// PSK settings, if this is a PSK program
    pub fn psk(&self) -> Option<&PskConfig> {
        self.psk.as_ref()
    }

    /// True for a server
    pub fn is_server(&self) -> bool {
        self.role == Role::Server
    }

    /// Key exchange modes this side accepts.
    ///
    /// A certificate-only program accepts plain (EC)DHE.
    pub fn kex_mode(&self) -> KexMode {
        self.psk
            .as_ref()
            .map(|psk| psk.kex_mode)
            .unwrap_or(KexMode::EPHEMERAL)
    }

    /// PSK identity to put on the command line.
    pub fn psk_identity(&self) -> Result<&PskIdentity> {
        self.psk
            .as_ref()
            .and_then(PskConfig::primary)
            .ok_or_else(|| CompatError::MissingPskIdentity(self.implementation.to_string()))
    }

    /// Certificates the program is started with.
    ///
    /// Certificate handshakes with nothing configured get every test
    /// certificate. PSK servers from other vendors still refuse to start
    /// without one, so they get a single ECDSA P-256 certificate.
    pub fn cert_sig_algs(&self) -> Vec<SignatureAlgorithm> {
        if !self.cert_sig_algs.is_empty() {
            return self.cert_sig_algs.clone();
        }
        match &self.psk {
            None => SignatureAlgorithm::all().to_vec(),
            Some(_) if self.is_server() && self.implementation != Implementation::MbedTls => {
                vec![SignatureAlgorithm::EcdsaSecp256r1Sha256]
            },
            Some(_) => Vec::new(),
        }
    }

    /// Signature algorithms to advertise: explicit ones, then the
    /// certificate ones.
    pub fn advertised_sig_algs(&self) -> Vec<SignatureAlgorithm> {
        let mut all = self.sig_algs.clone();
        extend_unique(&mut all, &self.cert_sig_algs());
        all
    }

    /// Requirement lines for `ssl-opt.sh`
    pub fn pre_checks(&self) -> Vec<String> {
        self.implementation.builder().pre_checks(self)
    }

    /// Command line
    pub fn cmd(&self) -> Result<Vec<String>> {
        self.implementation.builder().cmd(self)
    }

    /// Output checks for a successful certificate handshake
    pub fn post_checks(&self) -> Vec<String> {
        self.implementation.builder().post_checks(self)
    }

    /// Output checks for a HelloRetryRequest to `group`
    pub fn hrr_post_checks(&self, group: NamedGroup) -> Vec<String> {
        self.implementation.builder().hrr_post_checks(self, group)
    }

    /// Output checks for the negotiated key exchange mode
    pub fn kex_mode_checks(&self, expected: Option<KexMode>) -> Vec<String> {
        self.implementation.builder().kex_mode_checks(self, expected)
    }

    /// Negotiation policy of the underlying implementation
    pub fn negotiation_policy(&self) -> NegotiationPolicy {
        self.implementation.negotiation_policy()
    }

    /// Predict the mode a handshake with a peer offering `peer_kex_mode`
    /// ends up with, judged from this side's configuration and policy.
    pub fn select_expected_kex_mode(&self, peer_kex_mode: KexMode) -> Option<KexMode> {
        self.negotiation_policy()
            .resolve(self.kex_mode(), peer_kex_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implementation_from_str() {
        assert_eq!(
            "GnuTLS".parse::<Implementation>().unwrap(),
            Implementation::GnuTls
        );
        assert_eq!("m".parse::<Implementation>().unwrap(), Implementation::MbedTls);
        assert!(matches!(
            "wolfssl".parse::<Implementation>(),
            Err(CompatError::UnknownImplementation(_))
        ));
    }

    #[test]
    fn test_policies() {
        assert_eq!(
            Implementation::OpenSsl.negotiation_policy(),
            NegotiationPolicy::Generic
        );
        assert_eq!(
            Implementation::GnuTls.negotiation_policy(),
            NegotiationPolicy::AlternateWithOverride
        );
        assert_eq!(
            Implementation::MbedTls.negotiation_policy(),
            NegotiationPolicy::Generic
        );
    }

    #[test]
    fn test_add_dedups_in_order() {
        let mut program = Program::client(Implementation::MbedTls);
        program
            .add_named_groups(&[NamedGroup::X25519, NamedGroup::Secp256r1])
            .add_named_groups(&[NamedGroup::X25519, NamedGroup::X448]);
        assert_eq!(
            program.named_groups(),
            &[NamedGroup::X25519, NamedGroup::Secp256r1, NamedGroup::X448]
        );
    }

    #[test]
    fn test_default_certificates() {
        let cert = Program::server(Implementation::OpenSsl);
        assert_eq!(cert.cert_sig_algs().len(), 4);

        let psk = PskConfig::new(PskIdentity::default(), KexMode::PSK);
        let server = Program::server(Implementation::GnuTls).with_psk(psk.clone());
        assert_eq!(
            server.cert_sig_algs(),
            vec![SignatureAlgorithm::EcdsaSecp256r1Sha256]
        );
        let server = Program::server(Implementation::MbedTls).with_psk(psk.clone());
        assert!(server.cert_sig_algs().is_empty());
        let client = Program::client(Implementation::OpenSsl).with_psk(psk);
        assert!(client.cert_sig_algs().is_empty());
    }

    #[test]
    fn test_advertised_sig_algs() {
        let program = Program::server(Implementation::MbedTls)
            .with_signature_algorithm(SignatureAlgorithm::RsaPssRsaeSha256)
            .with_cert_signature_algorithm(SignatureAlgorithm::EcdsaSecp256r1Sha256)
            .with_cert_signature_algorithm(SignatureAlgorithm::RsaPssRsaeSha256);
        assert_eq!(
            program.advertised_sig_algs(),
            vec![
                SignatureAlgorithm::RsaPssRsaeSha256,
                SignatureAlgorithm::EcdsaSecp256r1Sha256
            ]
        );
    }

    #[test]
    fn test_only_first_identity_used() {
        let psk = PskConfig {
            identities: vec![
                PskIdentity::new("first", vec![1, 2]),
                PskIdentity::new("second", vec![3, 4]),
            ],
            kex_mode: KexMode::ALL,
        };
        let program = Program::client(Implementation::MbedTls).with_psk(psk);
        let identity = program.psk_identity().unwrap();
        assert_eq!(identity.identity, "first");
        assert_eq!(identity.key_hex(), "0102");
    }

    #[test]
    fn test_missing_identity() {
        let psk = PskConfig {
            identities: Vec::new(),
            kex_mode: KexMode::PSK,
        };
        let program = Program::client(Implementation::OpenSsl).with_psk(psk);
        assert!(matches!(
            program.psk_identity(),
            Err(CompatError::MissingPskIdentity(_))
        ));
        assert!(program.cmd().is_err());
    }

    #[test]
    fn test_default_key_hex() {
        assert_eq!(
            PskIdentity::default().key_hex(),
            "6162636465666768696a6b6c6d6e6f70"
        );
    }

    #[test]
    fn test_select_expected_kex_mode() {
        let gnutls = Program::server(Implementation::GnuTls).with_psk(PskConfig::new(
            PskIdentity::default(),
            KexMode::EPHEMERAL_ALL,
        ));
        assert_eq!(gnutls.select_expected_kex_mode(KexMode::PSK_ALL), None);

        let openssl = Program::server(Implementation::OpenSsl).with_psk(PskConfig::new(
            PskIdentity::default(),
            KexMode::EPHEMERAL_ALL,
        ));
        assert_eq!(
            openssl.select_expected_kex_mode(KexMode::PSK_ALL),
            Some(KexMode::PSK_EPHEMERAL)
        );

        // Certificate-only programs accept plain (EC)DHE
        let cert = Program::server(Implementation::MbedTls);
        assert_eq!(
            cert.select_expected_kex_mode(KexMode::ALL),
            Some(KexMode::EPHEMERAL)
        );
    }
}
