//! # tls13-compat - TLS 1.3 interoperability test generation
//!
//! Generates `ssl-opt.sh` test cases that run Mbed TLS against OpenSSL and
//! GnuTLS (and against itself) over TLS 1.3, and predicts for every PSK
//! handshake which key exchange mode the two peers must settle on.
//!
//! ## Features
//!
//! - **Key exchange mode model**: bit-flag [`KexMode`] sets and the
//!   per-implementation [`NegotiationPolicy`] that resolves a pair of them
//! - **Command builders**: OpenSSL, GnuTLS and Mbed TLS command lines for
//!   certificate and PSK handshakes, client and server
//! - **Test suites**: `compat`, `hrr` and `psk`, rendered as `run_test`
//!   invocations with their requirement lines and output checks
//!
//! ## Negotiation
//!
//! Modes are bit flags: `psk = 1`, `ephemeral = 2`, `psk_ephemeral = 4`.
//! The generic rule intersects both sides and picks the first match in the
//! order `psk_ephemeral`, `psk`, `ephemeral`:
//!
//! | Local           | Peer            | Generic         | Alternate (GnuTLS) |
//! |-----------------|-----------------|-----------------|--------------------|
//! | `all`           | `psk_all`       | `psk_ephemeral` | `psk_ephemeral`    |
//! | `ephemeral_all` | `psk_all`       | `psk_ephemeral` | none               |
//! | `ephemeral`     | `ephemeral_all` | `ephemeral`     | `ephemeral`        |
//! | `psk`           | `ephemeral`     | none            | none               |
//!
//! ## Quick Start
//!
//! ```rust
//! use tls13_compat::{Implementation, KexMode, Program};
//!
//! let server = Program::server(Implementation::GnuTls);
//! // GnuTLS server with ephemeral_all, client offering psk_all
//! let expected = server
//!     .negotiation_policy()
//!     .resolve(KexMode::EPHEMERAL_ALL, KexMode::PSK_ALL);
//! assert_eq!(expected, None);
//! ```
//!
//! Generating a whole suite:
//!
//! ```rust
//! use tls13_compat::suites::{GenerateOptions, TestSuite};
//!
//! let cases = TestSuite::Psk.generate(&GenerateOptions::default()).unwrap();
//! assert_eq!(cases.len(), 180);
//! println!("{}", cases[0]);
//! ```

pub mod config;
pub mod error;
pub mod kex;
pub mod predict;
pub mod program;
pub mod registry;
pub mod suites;

// Re-exports for convenience
pub use config::{Config, EnvOverrides};
pub use error::{CompatError, Result};
pub use kex::{KexMode, NegotiationPolicy};
pub use predict::Prediction;
pub use program::{CommandBuilder, Implementation, Program, PskConfig, PskIdentity, Role};
pub use registry::{CipherSuite, NamedGroup, SignatureAlgorithm};
pub use suites::{GenerateOptions, TestCase, TestSuite};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Expected key exchange mode when `implementation` runs with `local` and
/// its peer offers `peer`.
pub fn predict_kex_mode(
    implementation: Implementation,
    local: KexMode,
    peer: KexMode,
) -> Option<KexMode> {
    Prediction::new(implementation, local, peer).expected
}
