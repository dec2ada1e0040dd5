//! The tagged result of a damage application.
//!
//! Every native damage path returns [`DamageOutcome`] directly. Combatant
//! hooks written against the older calling convention return a loosely typed
//! [`RawDamageResult`] instead; [`normalize`] is the single place where those
//! forms are interpreted, so resolver code only ever switches on the enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of applying one hit to a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Health was reduced (possibly by zero) and the combatant survives in
    /// its current state.
    Damaged,
    /// The combatant entered a transient pre-death state: an armed
    /// detonation or a deferred death. It is not removed yet.
    Exploding,
    /// The combatant is terminal.
    Died,
}

impl DamageOutcome {
    /// Returns true for [`DamageOutcome::Died`].
    #[must_use]
    pub const fn is_kill(self) -> bool {
        matches!(self, Self::Died)
    }
}

impl fmt::Display for DamageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Damaged => write!(f, "damaged"),
            Self::Exploding => write!(f, "exploding"),
            Self::Died => write!(f, "died"),
        }
    }
}

/// Legacy return forms of a combatant damage hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDamageResult {
    /// The hook returned nothing.
    Unit,
    /// The hook returned a death flag.
    Flag(bool),
    /// The hook returned a transition tag such as `"pending"`.
    Sentinel(String),
}

/// Maps a legacy hook result onto [`DamageOutcome`].
///
/// Unknown sentinels are treated as plain damage.
#[must_use]
pub fn normalize(raw: RawDamageResult) -> DamageOutcome {
    match raw {
        RawDamageResult::Unit | RawDamageResult::Flag(false) => DamageOutcome::Damaged,
        RawDamageResult::Flag(true) => DamageOutcome::Died,
        RawDamageResult::Sentinel(tag) => match tag.as_str() {
            "pending" | "exploding" | "armed" => DamageOutcome::Exploding,
            "dead" | "died" => DamageOutcome::Died,
            other => {
                tracing::warn!(sentinel = other, "unknown damage sentinel, treating as damage");
                DamageOutcome::Damaged
            }
        },
    }
}

impl From<RawDamageResult> for DamageOutcome {
    fn from(raw: RawDamageResult) -> Self {
        normalize(raw)
    }
}

impl From<bool> for DamageOutcome {
    fn from(died: bool) -> Self {
        normalize(RawDamageResult::Flag(died))
    }
}

impl From<()> for DamageOutcome {
    fn from((): ()) -> Self {
        normalize(RawDamageResult::Unit)
    }
}
