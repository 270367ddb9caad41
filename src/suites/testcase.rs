//! `ssl-opt.sh` test case rendering.

use std::fmt;

use crate::error::Result;
use crate::program::Program;

/// Width of `run_test ` so continuation lines line up under the name.
const CONTINUATION_INDENT: usize = 9;

/// One `run_test` invocation plus the requirement lines guarding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Test name shown by ssl-opt.sh
    pub name: String,
    /// `requires_*` lines, deduplicated
    pub pre_checks: Vec<String>,
    /// Server command line
    pub server_cmd: String,
    /// Client command line
    pub client_cmd: String,
    /// Expected client exit status
    pub exit_value: i32,
    /// Output checks (`-s`, `-c`, `-S`, `-C`)
    pub checks: Vec<String>,
}

impl TestCase {
    /// Assemble a test from a server and a client program.
    ///
    /// Requirement lines come from the server first, then the client.
    /// Both sides' post-handshake checks are included.
    pub fn from_programs(
        name: impl Into<String>,
        server: &Program,
        client: &Program,
        exit_value: i32,
    ) -> Result<Self> {
        let mut pre_checks: Vec<String> = Vec::new();
        for line in server.pre_checks().into_iter().chain(client.pre_checks()) {
            if !pre_checks.contains(&line) {
                pre_checks.push(line);
            }
        }

        let mut checks = server.post_checks();
        checks.extend(client.post_checks());

        Ok(Self {
            name: name.into(),
            pre_checks,
            server_cmd: server.cmd()?.join(" "),
            client_cmd: client.cmd()?.join(" "),
            exit_value,
            checks,
        })
    }

    /// Append output checks
    pub fn with_checks(mut self, checks: impl IntoIterator<Item = String>) -> Self {
        self.checks.extend(checks);
        self
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.pre_checks {
            writeln!(f, "{line}")?;
        }

        let mut parts = vec![
            format!(r#"run_test "{}""#, self.name),
            format!(r#""{}""#, self.server_cmd),
            format!(r#""{}""#, self.client_cmd),
            self.exit_value.to_string(),
        ];
        parts.extend(self.checks.iter().cloned());

        let separator = format!(" \\\n{}", " ".repeat(CONTINUATION_INDENT));
        f.write_str(&parts.join(&separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Implementation;
    use crate::registry::SignatureAlgorithm;

    fn sample() -> TestCase {
        TestCase {
            name: "sample".to_string(),
            pre_checks: vec!["requires_openssl_tls1_3".to_string()],
            server_cmd: "$P_SRV a=1".to_string(),
            client_cmd: "$O_NEXT_CLI_NO_CERT -msg".to_string(),
            exit_value: 0,
            checks: vec![r#"-s "ok""#.to_string()],
        }
    }

    #[test]
    fn test_render_layout() {
        let expected = concat!(
            "requires_openssl_tls1_3\n",
            "run_test \"sample\" \\\n",
            "         \"$P_SRV a=1\" \\\n",
            "         \"$O_NEXT_CLI_NO_CERT -msg\" \\\n",
            "         0 \\\n",
            "         -s \"ok\"",
        );
        assert_eq!(sample().to_string(), expected);
    }

    #[test]
    fn test_with_checks_appends() {
        let case = sample().with_checks([r#"-c "more""#.to_string()]);
        assert_eq!(case.checks.len(), 2);
        assert!(case.to_string().ends_with(r#"-c "more""#));
    }

    #[test]
    fn test_from_programs_dedups_requirements() {
        let server = Program::server(Implementation::MbedTls)
            .with_cert_signature_algorithm(SignatureAlgorithm::EcdsaSecp256r1Sha256);
        let client = Program::client(Implementation::MbedTls)
            .with_cert_signature_algorithm(SignatureAlgorithm::EcdsaSecp256r1Sha256);
        let case = TestCase::from_programs("M->M", &server, &client, 0).unwrap();

        let debug_lines = case
            .pre_checks
            .iter()
            .filter(|l| l.ends_with("MBEDTLS_DEBUG_C"))
            .count();
        assert_eq!(debug_lines, 1);
        assert!(case.pre_checks[0].ends_with("MBEDTLS_SSL_SRV_C"));
        assert!(case.server_cmd.starts_with("$P_SRV crt_file="));
        assert!(case.client_cmd.starts_with("$P_CLI ca_file=data_files/test-ca2.crt"));
    }
}
