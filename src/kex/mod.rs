//! TLS 1.3 key exchange modes and their negotiation model.
//!
//! [`KexMode`] is the bit-flag set a peer is configured with, and
//! [`NegotiationPolicy`] turns a `(local, peer)` pair into the single mode
//! the handshake is expected to select.
//!
//! # Usage
//!
//! ```rust
//! use tls13_compat::kex::{KexMode, NegotiationPolicy};
//!
//! let expected = NegotiationPolicy::Generic.resolve(KexMode::ALL, KexMode::PSK_ALL);
//! assert_eq!(expected, Some(KexMode::PSK_EPHEMERAL));
//!
//! // GnuTLS does not complete this one
//! let expected = NegotiationPolicy::AlternateWithOverride
//!     .resolve(KexMode::EPHEMERAL_ALL, KexMode::PSK_ALL);
//! assert_eq!(expected, None);
//! ```

mod mode;
mod negotiation;

pub use mode::KexMode;
pub use negotiation::{
    resolve_alternate, resolve_generic, NegotiationPolicy, OverrideKey, ALTERNATE_OVERRIDES,
};
