//! TLS 1.3 interoperability test suites.
//!
//! Each suite walks a product of client implementation, server
//! implementation and some parameter space, builds both [`Program`]s and
//! renders one [`TestCase`] per combination. Combinations without an
//! Mbed TLS side are skipped: the script exists to test Mbed TLS.
//!
//! | Suite    | Parameter space                                 |
//! |----------|-------------------------------------------------|
//! | `compat` | cipher suite × named group × signature algorithm |
//! | `hrr`    | client group × server group (distinct)          |
//! | `psk`    | client kex mode × server kex mode               |

mod testcase;

pub use testcase::TestCase;

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, Result};
use crate::kex::KexMode;
use crate::program::{Implementation, Program, PskConfig, PskIdentity};
use crate::registry::{CipherSuite, NamedGroup, SignatureAlgorithm};

/// Script name written into the banner
pub const SCRIPT_NAME: &str = "tls13-compat.sh";

/// Available suites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestSuite {
    /// Certificate handshakes over every algorithm combination
    Compat,
    /// HelloRetryRequest on key share group mismatch
    Hrr,
    /// PSK key exchange mode negotiation
    Psk,
}

impl TestSuite {
    /// All suites in generation order
    pub fn all() -> [Self; 3] {
        [Self::Compat, Self::Hrr, Self::Psk]
    }

    /// Suite name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compat => "compat",
            Self::Hrr => "hrr",
            Self::Psk => "psk",
        }
    }

    /// Generate every test case of this suite
    pub fn generate(&self, options: &GenerateOptions) -> Result<Vec<TestCase>> {
        let cases = match self {
            Self::Compat => generate_compat_tests(options)?,
            Self::Hrr => generate_hrr_tests(options)?,
            Self::Psk => generate_psk_tests(options)?,
        };
        tracing::debug!(suite = self.name(), count = cases.len(), "generated suite");
        Ok(cases)
    }
}

impl fmt::Display for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestSuite {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compat" => Ok(Self::Compat),
            "hrr" => Ok(Self::Hrr),
            "psk" => Ok(Self::Psk),
            _ => Err(CompatError::UnknownTestSuite(s.to_string())),
        }
    }
}

/// Suite names in generation order, space separated
pub fn suite_list() -> String {
    TestSuite::all()
        .iter()
        .map(|suite| suite.name())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Knobs shared by all suites
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// PSK used by the `psk` suite
    pub psk_identity: PskIdentity,
    /// Middlebox compatibility mode, applied to every program of every suite
    pub compat_mode: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            psk_identity: PskIdentity::default(),
            compat_mode: true,
        }
    }
}

fn has_mbedtls(client: Implementation, server: Implementation) -> bool {
    client == Implementation::MbedTls || server == Implementation::MbedTls
}

/// Client/server pairs that involve Mbed TLS, in generation order
fn implementation_pairs() -> impl Iterator<Item = (Implementation, Implementation)> {
    Implementation::all()
        .into_iter()
        .flat_map(|client| Implementation::all().into_iter().map(move |server| (client, server)))
        .filter(|(client, server)| has_mbedtls(*client, *server))
}

/// Certificate handshake with one fixed cipher suite, group and
/// signature algorithm on both sides.
pub fn generate_compat_test(
    client: Implementation,
    server: Implementation,
    cipher: CipherSuite,
    named_group: NamedGroup,
    sig_alg: SignatureAlgorithm,
    options: &GenerateOptions,
) -> Result<TestCase> {
    let name = format!(
        "TLS 1.3 {}->{}: {},{},{}",
        client.initial(),
        server.initial(),
        cipher.short_name(),
        named_group,
        sig_alg
    );

    let configure = |program: Program| {
        program
            .with_cipher_suite(cipher)
            .with_named_group(named_group)
            .with_signature_algorithm(sig_alg)
            .with_cert_signature_algorithm(sig_alg)
            .with_compat_mode(options.compat_mode)
    };
    let server_program = configure(Program::server(server));
    let client_program = configure(Program::client(client));

    Ok(
        TestCase::from_programs(name, &server_program, &client_program, 0)?
            .with_checks([r#"-C "received HelloRetryRequest message""#.to_string()]),
    )
}

/// Certificate handshake where the client's first key share is not
/// acceptable to the server, forcing a HelloRetryRequest.
pub fn generate_hrr_compat_test(
    client: Implementation,
    server: Implementation,
    client_named_group: NamedGroup,
    server_named_group: NamedGroup,
    cert_sig_alg: SignatureAlgorithm,
    options: &GenerateOptions,
) -> Result<TestCase> {
    let name = format!(
        "TLS 1.3 {}->{}: HRR {} -> {}",
        client.initial(),
        server.initial(),
        client_named_group,
        server_named_group
    );

    let server_program = Program::server(server)
        .with_named_group(server_named_group)
        .with_cert_signature_algorithm(cert_sig_alg)
        .with_compat_mode(options.compat_mode);
    let client_program = Program::client(client)
        .with_named_group(client_named_group)
        .with_named_group(server_named_group)
        .with_cert_signature_algorithm(cert_sig_alg)
        .with_compat_mode(options.compat_mode);

    let mut hrr_checks = server_program.hrr_post_checks(server_named_group);
    hrr_checks.extend(client_program.hrr_post_checks(server_named_group));

    Ok(TestCase::from_programs(name, &server_program, &client_program, 0)?.with_checks(hrr_checks))
}

/// PSK handshake between a client offering `client_kex_mode` and a server
/// accepting `server_kex_mode`.
///
/// The expected mode comes from the server's negotiation policy. When the
/// model predicts no agreement the client must fail.
pub fn generate_psk_test(
    client: Implementation,
    server: Implementation,
    client_kex_mode: KexMode,
    server_kex_mode: KexMode,
    options: &GenerateOptions,
) -> Result<TestCase> {
    let server_program = Program::server(server)
        .with_psk(PskConfig::new(options.psk_identity.clone(), server_kex_mode))
        .with_compat_mode(options.compat_mode);
    let client_program = Program::client(client)
        .with_psk(PskConfig::new(options.psk_identity.clone(), client_kex_mode))
        .with_compat_mode(options.compat_mode);

    let expected = server_program.select_expected_kex_mode(client_kex_mode);
    let outcome = expected.map_or_else(|| "fail".to_string(), |mode| mode.to_string());
    let name = format!(
        "TLS 1.3 {}->{}: PSK {}/{} -> {}",
        client.initial(),
        server.initial(),
        client_kex_mode,
        server_kex_mode,
        outcome
    );
    let exit_value = if expected.is_some() { 0 } else { 1 };

    let mut kex_checks = server_program.kex_mode_checks(expected);
    kex_checks.extend(client_program.kex_mode_checks(expected));

    Ok(
        TestCase::from_programs(name, &server_program, &client_program, exit_value)?
            .with_checks(kex_checks),
    )
}

/// Every cipher suite × named group × signature algorithm combination
pub fn generate_compat_tests(options: &GenerateOptions) -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();
    for (client, server) in implementation_pairs() {
        for cipher in CipherSuite::all() {
            for named_group in NamedGroup::all() {
                for sig_alg in SignatureAlgorithm::all() {
                    cases.push(generate_compat_test(
                        client,
                        server,
                        cipher,
                        named_group,
                        sig_alg,
                        options,
                    )?);
                }
            }
        }
    }
    Ok(cases)
}

/// Every ordered pair of distinct groups
pub fn generate_hrr_tests(options: &GenerateOptions) -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();
    for (client, server) in implementation_pairs() {
        for client_group in NamedGroup::all() {
            for server_group in NamedGroup::all() {
                if client_group == server_group {
                    continue;
                }
                cases.push(generate_hrr_compat_test(
                    client,
                    server,
                    client_group,
                    server_group,
                    SignatureAlgorithm::EcdsaSecp256r1Sha256,
                    options,
                )?);
            }
        }
    }
    Ok(cases)
}

/// Every pair of named key exchange mode configurations
pub fn generate_psk_tests(options: &GenerateOptions) -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();
    for (client, server) in implementation_pairs() {
        for client_mode in KexMode::NAMED {
            for server_mode in KexMode::NAMED {
                cases.push(generate_psk_test(
                    client,
                    server,
                    client_mode,
                    server_mode,
                    options,
                )?);
            }
        }
    }
    Ok(cases)
}

/// Generate the selected suites in the order given
pub fn generate(suites: &[TestSuite], options: &GenerateOptions) -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();
    for suite in suites {
        cases.extend(suite.generate(options)?);
    }
    Ok(cases)
}

/// Render a complete shell fragment: banner followed by the test cases.
pub fn render_script(cases: &[TestCase], command_line: &str) -> String {
    let mut out = String::new();
    out.push_str("#!/bin/sh\n\n");
    out.push_str(&format!("# {SCRIPT_NAME}\n"));
    out.push_str("#\n");
    out.push_str("# Purpose\n");
    out.push_str("#\n");
    out.push_str("# TLS 1.3 interoperability test cases. They are generated by\n");
    out.push_str(&format!("# `{command_line}`.\n"));
    out.push_str("#\n");
    out.push_str("# Do not edit this file by hand. Change the generator and regenerate it.\n");
    out.push_str("#\n\n");

    let body: Vec<String> = cases.iter().map(|case| case.to_string()).collect();
    out.push_str(&body.join("\n\n"));
    out.push('\n');
    out
}

/// Write `text` to `path`, or to stdout when no path is given
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!("wrote {}", path.display());
        },
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        },
    }
    Ok(())
}

/// Generate, render and write the selected suites.
///
/// Returns the number of test cases written.
pub fn output_test_cases(
    suites: &[TestSuite],
    output: Option<&Path>,
    command_line: &str,
    options: &GenerateOptions,
) -> Result<usize> {
    let cases = generate(suites, options)?;
    tracing::info!("generated {} test cases", cases.len());
    write_output(output, &render_script(&cases, command_line))?;
    Ok(cases.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_names() {
        for suite in TestSuite::all() {
            assert_eq!(suite.name().parse::<TestSuite>().unwrap(), suite);
        }
        assert!(matches!(
            "dtls".parse::<TestSuite>(),
            Err(CompatError::UnknownTestSuite(_))
        ));
    }

    #[test]
    fn test_suite_list() {
        assert_eq!(suite_list(), "compat hrr psk");
    }

    #[test]
    fn test_pairs_require_mbedtls() {
        let pairs: Vec<_> = implementation_pairs().collect();
        assert_eq!(pairs.len(), 5);
        assert!(pairs.iter().all(|(c, s)| has_mbedtls(*c, *s)));
        assert_eq!(pairs[0], (Implementation::OpenSsl, Implementation::MbedTls));
    }

    #[test]
    fn test_compat_test_name() {
        let case = generate_compat_test(
            Implementation::OpenSsl,
            Implementation::MbedTls,
            CipherSuite::Aes128GcmSha256,
            NamedGroup::Secp256r1,
            SignatureAlgorithm::EcdsaSecp256r1Sha256,
            &GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(
            case.name,
            "TLS 1.3 O->M: AES_128_GCM_SHA256,secp256r1,ecdsa_secp256r1_sha256"
        );
        assert_eq!(case.exit_value, 0);
        assert_eq!(
            case.checks.last().unwrap(),
            r#"-C "received HelloRetryRequest message""#
        );
    }

    #[test]
    fn test_hrr_client_offers_both_groups() {
        let case = generate_hrr_compat_test(
            Implementation::MbedTls,
            Implementation::GnuTls,
            NamedGroup::X25519,
            NamedGroup::Secp384r1,
            SignatureAlgorithm::EcdsaSecp256r1Sha256,
            &GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(case.name, "TLS 1.3 M->G: HRR x25519 -> secp384r1");
        assert!(case.client_cmd.contains("groups=x25519,secp384r1"));
        assert!(case
            .checks
            .contains(&r#"-c "received HelloRetryRequest message""#.to_string()));
    }

    #[test]
    fn test_psk_failure_expects_exit_one() {
        let case = generate_psk_test(
            Implementation::MbedTls,
            Implementation::GnuTls,
            KexMode::PSK_ALL,
            KexMode::EPHEMERAL_ALL,
            &GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(case.name, "TLS 1.3 M->G: PSK psk_all/ephemeral_all -> fail");
        assert_eq!(case.exit_value, 1);
        assert_eq!(case.checks, vec![r#"-C "Selected key exchange mode: ""#]);
    }

    #[test]
    fn test_psk_success_against_generic_server() {
        let case = generate_psk_test(
            Implementation::GnuTls,
            Implementation::MbedTls,
            KexMode::PSK_ALL,
            KexMode::EPHEMERAL_ALL,
            &GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(
            case.name,
            "TLS 1.3 G->M: PSK psk_all/ephemeral_all -> psk_ephemeral"
        );
        assert_eq!(case.exit_value, 0);
        assert!(case
            .checks
            .contains(&r#"-s "key exchange mode: psk_ephemeral""#.to_string()));
    }

    #[test]
    fn test_psk_follows_compat_mode() {
        let options = GenerateOptions {
            compat_mode: false,
            ..GenerateOptions::default()
        };
        let case = generate_psk_test(
            Implementation::MbedTls,
            Implementation::MbedTls,
            KexMode::ALL,
            KexMode::ALL,
            &options,
        )
        .unwrap();
        assert!(case
            .pre_checks
            .contains(&"requires_config_disabled MBEDTLS_SSL_TLS1_3_COMPATIBILITY_MODE".to_string()));
        assert!(!case
            .pre_checks
            .contains(&"requires_config_enabled MBEDTLS_SSL_TLS1_3_COMPATIBILITY_MODE".to_string()));
    }

    #[test]
    fn test_suite_sizes() {
        let options = GenerateOptions::default();
        assert_eq!(generate_compat_tests(&options).unwrap().len(), 5 * 5 * 6 * 4);
        assert_eq!(generate_hrr_tests(&options).unwrap().len(), 5 * 6 * 5);
        assert_eq!(generate_psk_tests(&options).unwrap().len(), 5 * 6 * 6);
    }

    #[test]
    fn test_render_script_banner() {
        let script = render_script(&[], "tls13-compat generate");
        assert!(script.starts_with("#!/bin/sh\n\n# tls13-compat.sh\n"));
        assert!(script.contains("# `tls13-compat generate`.\n"));
    }
}
