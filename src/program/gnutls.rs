//! GnuTLS `gnutls-cli` / `gnutls-serv` command lines.
//!
//! GnuTLS is configured through a priority string rather than individual
//! flags. Its PSK negotiation also deviates from the default rule, so it
//! reports [`NegotiationPolicy::AlternateWithOverride`].

use super::{CommandBuilder, Program};
use crate::error::Result;
use crate::kex::{KexMode, NegotiationPolicy};
use crate::registry::tables::{GNUTLS_CIPHER_SUITE, GNUTLS_NAMED_GROUP, GNUTLS_SIGNATURE_ALGORITHM};

/// GnuTLS command builder
#[derive(Debug, Clone, Copy, Default)]
pub struct GnuTls;

/// Password file gnutls-serv reads PSKs from
pub const PSK_PASSWD_FILE: &str = "data_files/passwd.psk";

/// Translate canonical names through `table`, skipping items already in
/// `out`.
fn push_priority_items(
    out: &mut Vec<&'static str>,
    names: impl IntoIterator<Item = &'static str>,
    table: &phf::Map<&'static str, &'static [&'static str]>,
) {
    for name in names {
        for &item in table.get(name).copied().unwrap_or_default() {
            if !out.contains(&item) {
                out.push(item);
            }
        }
    }
}

fn cert_priority_string(program: &Program) -> String {
    let mut items = Vec::new();

    if program.ciphers().is_empty() {
        items.extend(["CIPHER-ALL", "MAC-ALL"]);
    } else {
        push_priority_items(
            &mut items,
            program.ciphers().iter().map(|c| c.name()),
            &GNUTLS_CIPHER_SUITE,
        );
    }

    if program.sig_algs().is_empty() {
        items.push("SIGN-ALL");
    } else {
        push_priority_items(
            &mut items,
            program.advertised_sig_algs().iter().map(|s| s.name()),
            &GNUTLS_SIGNATURE_ALGORITHM,
        );
    }

    if program.named_groups().is_empty() {
        items.push("GROUP-ALL");
    } else {
        push_priority_items(
            &mut items,
            program.named_groups().iter().map(|g| g.name()),
            &GNUTLS_NAMED_GROUP,
        );
    }

    let mut priority = std::iter::once("NONE")
        .chain(items)
        .chain(std::iter::once("VERS-TLS1.3"))
        .collect::<Vec<_>>()
        .join(":+");
    priority.push_str(":%NO_TICKETS");
    if !program.compat_mode() {
        priority.push_str(":%DISABLE_TLS13_COMPAT_MODE");
    }
    priority
}

fn psk_priority_string(program: &Program) -> String {
    let mut items = vec![
        "NORMAL".to_string(),
        "-VERS-ALL".to_string(),
        "+VERS-TLS1.3".to_string(),
        "-KX-ALL".to_string(),
        "+ECDHE-PSK".to_string(),
        "+DHE-PSK".to_string(),
    ];
    if program.kex_mode().contains(KexMode::PSK) {
        items.push("+PSK".to_string());
    }
    if !program.named_groups().is_empty() {
        items.push("-GROUP-ALL".to_string());
        for group in program.named_groups() {
            for item in GNUTLS_NAMED_GROUP.get(group.name()).copied().unwrap_or_default() {
                items.push(format!("+{item}"));
            }
        }
    }
    items.join(":")
}

fn pre_cmd(program: &Program) -> Vec<String> {
    let certs = program.cert_sig_algs();
    if program.is_server() {
        let mut ret: Vec<String> = [
            "$G_NEXT_SRV_NO_CERT",
            "--http",
            "--disable-client-cert",
            "--debug=4",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for sig_alg in &certs {
            let cert = sig_alg.certificate();
            ret.push(format!(
                "--x509certfile {} --x509keyfile {}",
                cert.cert_file, cert.key_file
            ));
        }
        ret
    } else {
        let mut ret: Vec<String> = ["$G_NEXT_CLI_NO_CERT", "--debug=4", "--single-key-send"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(first) = certs.first() {
            ret.push(format!("--x509cafile {}", first.certificate().ca_file));
        }
        ret
    }
}

impl CommandBuilder for GnuTls {
    fn pre_checks(&self, _program: &Program) -> Vec<String> {
        vec![
            "requires_gnutls_tls1_3".to_string(),
            "requires_gnutls_next_no_ticket".to_string(),
            "requires_gnutls_next_disable_tls13_compat".to_string(),
        ]
    }

    fn cmd(&self, program: &Program) -> Result<Vec<String>> {
        let mut ret = pre_cmd(program);
        if program.psk().is_none() {
            ret.push(format!("--priority={}", cert_priority_string(program)));
            return Ok(ret);
        }

        let priority = psk_priority_string(program);
        if program.is_server() {
            ret.extend([
                "--priority".to_string(),
                priority,
                format!("--pskpasswd {PSK_PASSWD_FILE}"),
            ]);
        } else {
            let identity = program.psk_identity()?;
            ret.extend([
                "--priority".to_string(),
                priority,
                "--pskusername".to_string(),
                identity.identity.clone(),
                "--pskkey".to_string(),
                identity.key_hex(),
                "localhost".to_string(),
            ]);
        }
        Ok(ret)
    }

    fn post_checks(&self, program: &Program) -> Vec<String> {
        if program.is_server() && program.psk().is_none() {
            vec![r#"-c "HTTP/1.0 200 OK""#.to_string()]
        } else {
            Vec::new()
        }
    }

    fn negotiation_policy(&self) -> NegotiationPolicy {
        NegotiationPolicy::AlternateWithOverride
    }
}
