//! Expected key exchange mode for a single PSK handshake.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kex::{KexMode, NegotiationPolicy};
use crate::program::Implementation;

/// Outcome the selecting side's policy predicts for `(local, peer)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Implementation doing the selection
    pub implementation: Implementation,
    /// Its negotiation policy
    pub policy: NegotiationPolicy,
    /// Modes the selecting side is configured with
    pub local: KexMode,
    /// Modes the peer offers
    pub peer: KexMode,
    /// Selected mode, `None` when the handshake must fail
    pub expected: Option<KexMode>,
}

impl Prediction {
    /// Resolve `(local, peer)` under `implementation`'s policy
    pub fn new(implementation: Implementation, local: KexMode, peer: KexMode) -> Self {
        let policy = implementation.negotiation_policy();
        Self {
            implementation,
            policy,
            local,
            peer,
            expected: policy.resolve(local, peer),
        }
    }

    /// Same as [`Prediction::new`] from command-line spellings
    pub fn parse(implementation: &str, local: &str, peer: &str) -> Result<Self> {
        Ok(Self::new(implementation.parse()?, local.parse()?, peer.parse()?))
    }

    /// Mode name, or `none` when no mode is agreed
    pub fn outcome(&self) -> String {
        self.expected
            .map_or_else(|| "none".to_string(), |mode| mode.to_string())
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a prediction written by [`Prediction::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outcome())
    }
}
