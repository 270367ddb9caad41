//! Mbed TLS `ssl_client2` / `ssl_server2` command lines.
//!
//! Mbed TLS is the implementation under test, so its debug output is what
//! the generated checks look at: negotiated cipher suite, signature
//! algorithm, group and, for PSK handshakes, the key exchange mode.

use super::{CommandBuilder, Program};
use crate::error::Result;
use crate::kex::KexMode;
use crate::registry::tables::MBEDTLS_NAMED_GROUP_CONFIG;
use crate::registry::NamedGroup;

/// Mbed TLS command builder
#[derive(Debug, Clone, Copy, Default)]
pub struct MbedTls;

/// Build option enabling one key exchange mode
fn kex_mode_config(mode: KexMode) -> &'static str {
    if mode == KexMode::PSK {
        "MBEDTLS_SSL_TLS1_3_KEY_EXCHANGE_MODE_PSK_ENABLED"
    } else if mode == KexMode::PSK_EPHEMERAL {
        "MBEDTLS_SSL_TLS1_3_KEY_EXCHANGE_MODE_PSK_EPHEMERAL_ENABLED"
    } else {
        "MBEDTLS_SSL_TLS1_3_KEY_EXCHANGE_MODE_EPHEMERAL_ENABLED"
    }
}

fn pre_cmd(program: &Program) -> Vec<String> {
    let certs = program.cert_sig_algs();
    if program.is_server() {
        let mut ret = vec!["$P_SRV".to_string()];
        for sig_alg in &certs {
            let cert = sig_alg.certificate();
            ret.push(format!("crt_file={} key_file={}", cert.cert_file, cert.key_file));
        }
        ret
    } else {
        let mut ret = vec!["$P_CLI".to_string()];
        if let Some(first) = certs.first() {
            ret.push(format!("ca_file={}", first.certificate().ca_file));
        }
        ret
    }
}

fn groups_arg(program: &Program) -> Option<String> {
    if program.named_groups().is_empty() {
        return None;
    }
    let groups: Vec<&str> = program.named_groups().iter().map(|g| g.name()).collect();
    Some(format!("groups={}", groups.join(",")))
}

fn psk_cmd(program: &Program) -> Result<Vec<String>> {
    let identity = program.psk_identity()?;
    let mut ret = pre_cmd(program);
    ret.push("debug_level=4".to_string());
    ret.push("force_version=tls13".to_string());
    ret.push(format!("tls13_kex_modes={}", program.kex_mode()));

    if program.is_server() {
        ret.push(format!("psk_list={},{}", identity.identity, identity.key_hex()));
    } else {
        ret.push(format!("psk_identity={}", identity.identity));
        ret.push(format!("psk={}", identity.key_hex()));
    }

    ret.extend(groups_arg(program));

    if program.is_server() {
        ret.push("cookies=0 tickets=0".to_string());
    }
    Ok(ret)
}

fn cert_cmd(program: &Program) -> Vec<String> {
    let mut ret = pre_cmd(program);
    ret.push("debug_level=4".to_string());
    ret.push("force_version=tls13".to_string());

    if !program.ciphers().is_empty() {
        let ciphers: Vec<&str> = program.ciphers().iter().map(|c| c.name()).collect();
        ret.push(format!("force_ciphersuite={}", ciphers.join(",")));
    }

    let sig_algs = program.advertised_sig_algs();
    if !sig_algs.is_empty() {
        let sig_algs: Vec<&str> = sig_algs.iter().map(|s| s.name()).collect();
        ret.push(format!("sig_algs={}", sig_algs.join(",")));
    }

    ret.extend(groups_arg(program));

    if program.is_server() {
        ret.push("tls13_kex_modes=ephemeral cookies=0 tickets=0".to_string());
    }
    ret
}

impl CommandBuilder for MbedTls {
    fn pre_checks(&self, program: &Program) -> Vec<String> {
        let side = if program.is_server() {
            "MBEDTLS_SSL_SRV_C"
        } else {
            "MBEDTLS_SSL_CLI_C"
        };
        let mut ret = vec![
            format!("requires_config_enabled {side}"),
            "requires_config_enabled MBEDTLS_DEBUG_C".to_string(),
        ];

        for mode in program.kex_mode().iter() {
            ret.push(format!("requires_config_enabled {}", kex_mode_config(mode)));
        }

        if program.compat_mode() {
            ret.push("requires_config_enabled MBEDTLS_SSL_TLS1_3_COMPATIBILITY_MODE".to_string());
        } else {
            ret.push("requires_config_disabled MBEDTLS_SSL_TLS1_3_COMPATIBILITY_MODE".to_string());
        }

        if program.advertised_sig_algs().iter().any(|s| s.is_rsa_pss()) {
            ret.push("requires_config_enabled MBEDTLS_X509_RSASSA_PSS_SUPPORT".to_string());
        }

        for group in program.named_groups() {
            if let Some(option) = MBEDTLS_NAMED_GROUP_CONFIG.get(group.name()) {
                ret.push(format!("requires_config_enabled {option}"));
            }
        }
        ret
    }

    fn cmd(&self, program: &Program) -> Result<Vec<String>> {
        match program.psk() {
            Some(_) => psk_cmd(program),
            None => Ok(cert_cmd(program)),
        }
    }

    fn post_checks(&self, program: &Program) -> Vec<String> {
        if program.psk().is_some() {
            return Vec::new();
        }

        let mut checks = vec!["Protocol is TLSv1.3".to_string()];
        if program.is_server() {
            if let Some(cipher) = program.ciphers().first() {
                checks.push(format!(
                    "server hello, chosen ciphersuite: {} ( id={:04} )",
                    cipher.name(),
                    cipher.iana_value()
                ));
            }
            if let Some(sig_alg) = program.sig_algs().first() {
                checks.push(format!(
                    "received signature algorithm: 0x{:x}",
                    sig_alg.iana_value()
                ));
            }
            for group in program.named_groups() {
                checks.push(format!(
                    "got named group: {}({:04x})",
                    group.name(),
                    group.iana_value()
                ));
            }
            checks.push("Certificate verification was skipped".to_string());
            checks.iter().map(|c| format!(r#"-s "{c}""#)).collect()
        } else {
            if let Some(cipher) = program.ciphers().first() {
                checks.push(format!(
                    "server hello, chosen ciphersuite: ( {:04x} ) - {}",
                    cipher.iana_value(),
                    cipher.name()
                ));
            }
            if let Some(sig_alg) = program.sig_algs().first() {
                checks.push(format!(
                    "Certificate Verify: Signature algorithm ( {:04x} )",
                    sig_alg.iana_value()
                ));
            }
            for group in program.named_groups() {
                checks.push(format!(
                    "NamedGroup: {} ( {:x} )",
                    group.name(),
                    group.iana_value()
                ));
            }
            checks.push("Verifying peer X.509 certificate... ok".to_string());
            checks.iter().map(|c| format!(r#"-c "{c}""#)).collect()
        }
    }

    fn hrr_post_checks(&self, program: &Program, group: NamedGroup) -> Vec<String> {
        if program.is_server() {
            vec![format!(r#"-s "HRR selected_group: {}""#, group.name())]
        } else {
            vec![r#"-c "received HelloRetryRequest message""#.to_string()]
        }
    }

    fn kex_mode_checks(&self, program: &Program, expected: Option<KexMode>) -> Vec<String> {
        let (flag, negated, line) = if program.is_server() {
            ("-s", "-S", "key exchange mode: ")
        } else {
            ("-c", "-C", "Selected key exchange mode: ")
        };
        match expected {
            Some(mode) => vec![
                format!(r#"{flag} "Protocol is TLSv1.3""#),
                format!(r#"{flag} "{line}{mode}""#),
            ],
            None => vec![format!(r#"{negated} "{line}""#)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Implementation, PskConfig, PskIdentity};
    use crate::registry::{CipherSuite, SignatureAlgorithm};

    #[test]
    fn test_cert_server_cmd() {
        let server = Program::server(Implementation::MbedTls)
            .with_cipher_suite(CipherSuite::Aes128GcmSha256)
            .with_signature_algorithm(SignatureAlgorithm::EcdsaSecp256r1Sha256)
            .with_cert_signature_algorithm(SignatureAlgorithm::EcdsaSecp256r1Sha256)
            .with_named_group(NamedGroup::Secp256r1);
        assert_eq!(
            server.cmd().unwrap(),
            vec![
                "$P_SRV",
                "crt_file=data_files/ecdsa_secp256r1.crt key_file=data_files/ecdsa_secp256r1.key",
                "debug_level=4",
                "force_version=tls13",
                "force_ciphersuite=TLS_AES_128_GCM_SHA256",
                "sig_algs=ecdsa_secp256r1_sha256",
                "groups=secp256r1",
                "tls13_kex_modes=ephemeral cookies=0 tickets=0",
            ]
        );
    }

    #[test]
    fn test_cert_server_post_checks() {
        let server = Program::server(Implementation::MbedTls)
            .with_cipher_suite(CipherSuite::Aes128GcmSha256)
            .with_signature_algorithm(SignatureAlgorithm::EcdsaSecp384r1Sha384)
            .with_named_group(NamedGroup::X25519);
        assert_eq!(
            server.post_checks(),
            vec![
                r#"-s "Protocol is TLSv1.3""#,
                r#"-s "server hello, chosen ciphersuite: TLS_AES_128_GCM_SHA256 ( id=4865 )""#,
                r#"-s "received signature algorithm: 0x503""#,
                r#"-s "got named group: x25519(001d)""#,
                r#"-s "Certificate verification was skipped""#,
            ]
        );
    }

    #[test]
    fn test_cert_client_post_checks() {
        let client = Program::client(Implementation::MbedTls)
            .with_cipher_suite(CipherSuite::Chacha20Poly1305Sha256)
            .with_signature_algorithm(SignatureAlgorithm::RsaPssRsaeSha256)
            .with_named_group(NamedGroup::Ffdhe2048);
        assert_eq!(
            client.post_checks(),
            vec![
                r#"-c "Protocol is TLSv1.3""#,
                r#"-c "server hello, chosen ciphersuite: ( 1303 ) - TLS_CHACHA20_POLY1305_SHA256""#,
                r#"-c "Certificate Verify: Signature algorithm ( 0804 )""#,
                r#"-c "NamedGroup: ffdhe2048 ( 100 )""#,
                r#"-c "Verifying peer X.509 certificate... ok""#,
            ]
        );
    }

    #[test]
    fn test_pre_checks() {
        let client = Program::client(Implementation::MbedTls)
            .with_signature_algorithm(SignatureAlgorithm::RsaPssRsaeSha256)
            .with_named_group(NamedGroup::X448)
            .with_compat_mode(false);
        assert_eq!(
            client.pre_checks(),
            vec![
                "requires_config_enabled MBEDTLS_SSL_CLI_C",
                "requires_config_enabled MBEDTLS_DEBUG_C",
                "requires_config_enabled MBEDTLS_SSL_TLS1_3_KEY_EXCHANGE_MODE_EPHEMERAL_ENABLED",
                "requires_config_disabled MBEDTLS_SSL_TLS1_3_COMPATIBILITY_MODE",
                "requires_config_enabled MBEDTLS_X509_RSASSA_PSS_SUPPORT",
                "requires_config_enabled PSA_WANT_ECC_MONTGOMERY_448",
            ]
        );
    }

    #[test]
    fn test_psk_pre_checks_follow_kex_mode() {
        let psk = PskConfig::new(PskIdentity::default(), KexMode::PSK_ALL);
        let server = Program::server(Implementation::MbedTls).with_psk(psk);
        let checks = server.pre_checks();
        assert!(checks.contains(
            &"requires_config_enabled MBEDTLS_SSL_TLS1_3_KEY_EXCHANGE_MODE_PSK_ENABLED".to_string()
        ));
        assert!(checks.contains(
            &"requires_config_enabled MBEDTLS_SSL_TLS1_3_KEY_EXCHANGE_MODE_PSK_EPHEMERAL_ENABLED"
                .to_string()
        ));
        assert!(!checks.contains(
            &"requires_config_enabled MBEDTLS_SSL_TLS1_3_KEY_EXCHANGE_MODE_EPHEMERAL_ENABLED"
                .to_string()
        ));
    }

    #[test]
    fn test_psk_client_cmd() {
        let psk = PskConfig::new(PskIdentity::default(), KexMode::EPHEMERAL_ALL);
        let client = Program::client(Implementation::MbedTls)
            .with_psk(psk)
            .with_named_group(NamedGroup::X25519);
        assert_eq!(
            client.cmd().unwrap(),
            vec![
                "$P_CLI",
                "debug_level=4",
                "force_version=tls13",
                "tls13_kex_modes=ephemeral_all",
                "psk_identity=Client_identity",
                "psk=6162636465666768696a6b6c6d6e6f70",
                "groups=x25519",
            ]
        );
    }

    #[test]
    fn test_psk_server_cmd() {
        let psk = PskConfig::new(PskIdentity::new("id", vec![0xab]), KexMode::PSK);
        let server = Program::server(Implementation::MbedTls).with_psk(psk);
        assert_eq!(
            server.cmd().unwrap(),
            vec![
                "$P_SRV",
                "debug_level=4",
                "force_version=tls13",
                "tls13_kex_modes=psk",
                "psk_list=id,ab",
                "cookies=0 tickets=0",
            ]
        );
    }

    #[test]
    fn test_kex_mode_checks() {
        let psk = PskConfig::new(PskIdentity::default(), KexMode::ALL);
        let server = Program::server(Implementation::MbedTls).with_psk(psk.clone());
        assert_eq!(
            server.kex_mode_checks(Some(KexMode::PSK_EPHEMERAL)),
            vec![
                r#"-s "Protocol is TLSv1.3""#,
                r#"-s "key exchange mode: psk_ephemeral""#,
            ]
        );
        assert_eq!(
            server.kex_mode_checks(None),
            vec![r#"-S "key exchange mode: ""#]
        );

        let client = Program::client(Implementation::MbedTls).with_psk(psk);
        assert_eq!(
            client.kex_mode_checks(Some(KexMode::PSK)),
            vec![
                r#"-c "Protocol is TLSv1.3""#,
                r#"-c "Selected key exchange mode: psk""#,
            ]
        );
    }

    #[test]
    fn test_hrr_post_checks() {
        let server = Program::server(Implementation::MbedTls);
        assert_eq!(
            server.hrr_post_checks(NamedGroup::Secp384r1),
            vec![r#"-s "HRR selected_group: secp384r1""#]
        );
        let client = Program::client(Implementation::MbedTls);
        assert_eq!(
            client.hrr_post_checks(NamedGroup::Secp384r1),
            vec![r#"-c "received HelloRetryRequest message""#]
        );
    }
}
