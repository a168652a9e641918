//! Battle fingerprinting
//!
//! The same match shows up in the history of every participant. To count it
//! once, each match is identified by a SHA-256 digest over its timestamp and
//! the display names of all participants sorted into one canonical order, so
//! the digest does not depend on which team the fetching player was on.

use crate::battle::TeamMember;
use sha2::{Digest, Sha256};
use std::fmt;

/// Separates names inside the digest input so "ab"+"c" and "a"+"bc" differ
const NAME_SEPARATOR: &[u8] = &[0x1f];

/// Content digest identifying one real match
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BattleFingerprint([u8; 32]);

impl BattleFingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded digest (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for BattleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BattleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BattleFingerprint({})", &self.to_hex()[..12])
    }
}

/// Computes battle fingerprints
pub struct BattleHasher;

impl BattleHasher {
    /// Fingerprints a two-team battle
    ///
    /// Swapping `team_a` and `team_b` yields the same fingerprint.
    pub fn fingerprint(
        timestamp: &str,
        team_a: &[TeamMember],
        team_b: &[TeamMember],
    ) -> BattleFingerprint {
        Self::fingerprint_names(
            timestamp,
            team_a.iter().chain(team_b.iter()).map(|m| m.name.as_str()),
        )
    }

    /// Fingerprints a battle with any number of teams
    pub fn fingerprint_teams(timestamp: &str, teams: &[Vec<TeamMember>]) -> BattleFingerprint {
        Self::fingerprint_names(
            timestamp,
            teams.iter().flatten().map(|m| m.name.as_str()),
        )
    }

    /// Fingerprints a timestamp and an unordered collection of display names
    pub fn fingerprint_names<'a>(
        timestamp: &str,
        names: impl IntoIterator<Item = &'a str>,
    ) -> BattleFingerprint {
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(timestamp.as_bytes());
        for name in names {
            hasher.update(NAME_SEPARATOR);
            hasher.update(name.as_bytes());
        }

        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        BattleFingerprint(bytes)
    }
}
