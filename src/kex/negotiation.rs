//! Expected key exchange mode for a pair of peers.
//!
//! Given what each side is configured to accept, predict which single mode
//! a correct handshake settles on. The prediction is the oracle a generated
//! test asserts against, so library quirks are modelled as explicit
//! overrides on top of the shared default rather than folded into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::KexMode;
use crate::error::{CompatError, Result};

/// Candidates in the order the default rule tries them.
const PRIORITY: [KexMode; 3] = [KexMode::PSK_EPHEMERAL, KexMode::PSK, KexMode::EPHEMERAL];

/// Key for the override table. Ordered: `(peer, local)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverrideKey {
    /// Mode the remote side offers
    pub peer: KexMode,
    /// Mode this side is configured with
    pub local: KexMode,
}

/// Known pairs where the alternate library deviates from the default rule.
///
/// `None` means the handshake fails.
pub const ALTERNATE_OVERRIDES: &[(OverrideKey, Option<KexMode>)] = &[(
    OverrideKey {
        peer: KexMode::PSK_ALL,
        local: KexMode::EPHEMERAL_ALL,
    },
    None,
)];

/// How an implementation picks a mode from what both peers accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationPolicy {
    /// psk_ephemeral, then psk, then ephemeral
    #[default]
    Generic,
    /// Generic rule behind a table of hard-coded exceptions
    AlternateWithOverride,
}

impl NegotiationPolicy {
    /// Resolve the expected mode for `local` talking to `peer`.
    pub fn resolve(self, local: KexMode, peer: KexMode) -> Option<KexMode> {
        match self {
            NegotiationPolicy::Generic => resolve_generic(local, peer),
            NegotiationPolicy::AlternateWithOverride => resolve_alternate(local, peer),
        }
    }

    /// Get policy name
    pub fn name(&self) -> &'static str {
        match self {
            NegotiationPolicy::Generic => "generic",
            NegotiationPolicy::AlternateWithOverride => "alternate_with_override",
        }
    }
}

impl fmt::Display for NegotiationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NegotiationPolicy {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "alternate" | "alternate_with_override" => Ok(Self::AlternateWithOverride),
            _ => Err(CompatError::Config(format!("Unknown negotiation policy: {s}"))),
        }
    }
}

/// First candidate in priority order that survives in `common`.
fn pick_by_priority(common: KexMode) -> Option<KexMode> {
    PRIORITY.into_iter().find(|candidate| common.intersects(*candidate))
}

/// Default negotiation: intersect, then take the most preferred survivor.
pub fn resolve_generic(local: KexMode, peer: KexMode) -> Option<KexMode> {
    pick_by_priority(local & peer)
}

/// Negotiation for libraries with known deviations from the default rule.
///
/// The override table is consulted first and is keyed by the ordered
/// `(peer, local)` pair, so swapping the arguments can change the result.
pub fn resolve_alternate(local: KexMode, peer: KexMode) -> Option<KexMode> {
    let key = OverrideKey { peer, local };
    if let Some((_, result)) = ALTERNATE_OVERRIDES.iter().find(|(k, _)| *k == key) {
        tracing::trace!(%peer, %local, "negotiation override hit");
        return *result;
    }

    let common = local & peer;
    if common == KexMode::EPHEMERAL_ALL {
        return Some(KexMode::PSK_EPHEMERAL);
    }
    pick_by_priority(common)
}
