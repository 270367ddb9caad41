//! OpenSSL `s_client` / `s_server` command lines.

use super::{CommandBuilder, Program};
use crate::error::Result;
use crate::kex::KexMode;
use crate::registry::tables::OPENSSL_NAMED_GROUP;

/// OpenSSL command builder
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSsl;

fn groups_arg(program: &Program) -> Option<String> {
    if program.named_groups().is_empty() {
        return None;
    }
    let groups: Vec<&str> = program
        .named_groups()
        .iter()
        .filter_map(|group| OPENSSL_NAMED_GROUP.get(group.name()).copied())
        .collect();
    Some(format!("-groups {}", groups.join(":")))
}

fn pre_cmd(program: &Program) -> Vec<String> {
    let certs = program.cert_sig_algs();
    if program.is_server() {
        let mut ret = vec!["$O_NEXT_SRV_NO_CERT".to_string()];
        for sig_alg in &certs {
            let cert = sig_alg.certificate();
            ret.push(format!("-cert {} -key {}", cert.cert_file, cert.key_file));
        }
        ret
    } else {
        let mut ret = vec!["$O_NEXT_CLI_NO_CERT".to_string()];
        if let Some(first) = certs.first() {
            ret.push(format!("-CAfile {}", first.certificate().ca_file));
        }
        ret
    }
}

fn psk_cmd(program: &Program) -> Result<Vec<String>> {
    let identity = program.psk_identity()?;
    let mut ret = pre_cmd(program);
    ret.extend([
        "-tls1_3".to_string(),
        "-msg".to_string(),
        "-psk_identity".to_string(),
        identity.identity.clone(),
        "-psk".to_string(),
        identity.key_hex(),
    ]);

    if program.kex_mode().contains(KexMode::PSK) {
        ret.push("-allow_no_dhe_kex".to_string());
    }
    ret.extend(groups_arg(program));
    Ok(ret)
}

fn cert_cmd(program: &Program) -> Vec<String> {
    let mut ret = pre_cmd(program);

    if !program.ciphers().is_empty() {
        let ciphers: Vec<&str> = program.ciphers().iter().map(|c| c.name()).collect();
        ret.push(format!("-ciphersuites {}", ciphers.join(":")));
    }

    if !program.sig_algs().is_empty() {
        let sig_algs: Vec<&str> = program
            .advertised_sig_algs()
            .iter()
            .map(|s| s.name())
            .collect();
        ret.push(format!("-sigalgs {}", sig_algs.join(":")));
    }

    ret.extend(groups_arg(program));

    ret.push("-msg -tls1_3".to_string());
    if !program.compat_mode() {
        ret.push("-no_middlebox".to_string());
    }

    if program.is_server() {
        ret.push("-num_tickets 0 -no_resume_ephemeral -no_cache".to_string());
    }
    ret
}

impl CommandBuilder for OpenSsl {
    fn pre_checks(&self, program: &Program) -> Vec<String> {
        // ffdh groups need OpenSSL 3.0
        if program.named_groups().iter().any(|g| g.is_ffdh()) {
            vec!["requires_openssl_tls1_3_with_ffdh".to_string()]
        } else {
            vec!["requires_openssl_tls1_3".to_string()]
        }
    }

    fn cmd(&self, program: &Program) -> Result<Vec<String>> {
        match program.psk() {
            Some(_) => psk_cmd(program),
            None => Ok(cert_cmd(program)),
        }
    }

    fn post_checks(&self, program: &Program) -> Vec<String> {
        if program.is_server() && program.psk().is_none() {
            vec![r#"-c "HTTP/1.0 200 ok""#.to_string()]
        } else {
            Vec::new()
        }
    }
}
