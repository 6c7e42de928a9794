//! Role vocabulary normalization
//!
//! A partial data migration left two spellings in production for the same
//! roles: `transporteur` is persisted as `transporter`, and some rows still
//! carry `coordinateur` where the canonical value is `coordinator`. This
//! module confines both legacy spellings; application code only ever sees
//! the canonical [`Role`] enum, and the string-level shim functions exist
//! for the persistence boundary and for payloads arriving in either
//! vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical role vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Transporteur,
    Coordinator,
    Admin,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Role; 4] = [Role::Client, Role::Transporteur, Role::Coordinator, Role::Admin];

    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Transporteur => "transporteur",
            Role::Coordinator => "coordinator",
            Role::Admin => "admin",
        }
    }

    /// The spelling written to the database. `transporteur` rows were
    /// migrated to `transporter`; everything else is stored canonically.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Role::Transporteur => "transporter",
            other => other.as_str(),
        }
    }

    /// Parse a role from either vocabulary (canonical or legacy).
    pub fn from_db_str(value: &str) -> Option<Role> {
        match from_db_role(value.trim()) {
            "client" => Some(Role::Client),
            "transporteur" => Some(Role::Transporteur),
            "coordinator" => Some(Role::Coordinator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical role string → persisted spelling. Only `transporteur` has a
/// legacy alias on the write side; `coordinator` is written as-is (the
/// `coordinateur` rows are a one-way migration artifact, read-only).
pub fn to_db_role(role: &str) -> &str {
    match role {
        "transporteur" => "transporter",
        other => other,
    }
}

/// Persisted spelling → canonical role string. Unknown values pass
/// through unchanged.
pub fn from_db_role(role: &str) -> &str {
    match role {
        "transporter" => "transporteur",
        "coordinateur" => "coordinator",
        other => other,
    }
}

/// Compare a persisted role value against an expected role, tolerating
/// either vocabulary on both sides. Absent input never matches.
pub fn has_role(actual: Option<&str>, expected: &str) -> bool {
    match actual {
        Some(actual) => from_db_role(actual.trim()) == from_db_role(expected),
        None => false,
    }
}

/// True if the actual role matches any of the expected roles.
pub fn has_any_role(actual: Option<&str>, expected: &[&str]) -> bool {
    expected.iter().any(|e| has_role(actual, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_db_role_maps_legacy_spellings() {
        assert_eq!(from_db_role("transporter"), "transporteur");
        assert_eq!(from_db_role("coordinateur"), "coordinator");
        assert_eq!(from_db_role("client"), "client");
        assert_eq!(from_db_role("admin"), "admin");
    }

    #[test]
    fn absent_role_maps_to_absent() {
        let role: Option<&str> = None;
        assert_eq!(role.map(from_db_role), None);
    }

    #[test]
    fn to_db_role_only_aliases_transporteur() {
        assert_eq!(to_db_role("transporteur"), "transporter");
        // No write-side alias exists for coordinator.
        assert_eq!(to_db_role("coordinator"), "coordinator");
        assert_eq!(to_db_role("client"), "client");
    }

    #[test]
    fn has_role_matches_across_vocabularies() {
        assert!(has_role(Some("transporter"), "transporteur"));
        assert!(has_role(Some("transporteur"), "transporteur"));
        assert!(has_role(Some("coordinateur"), "coordinator"));
        assert!(!has_role(Some("client"), "transporteur"));
        assert!(!has_role(None, "client"));
    }

    #[test]
    fn has_any_role_checks_each_entry() {
        assert!(has_any_role(Some("transporter"), &["client", "transporteur"]));
        assert!(!has_any_role(Some("admin"), &["client", "transporteur"]));
        assert!(!has_any_role(None, &["client"]));
    }

    #[test]
    fn enum_round_trips_through_db_spelling() {
        for role in Role::ALL {
            assert_eq!(Role::from_db_str(role.as_db_str()), Some(role));
        }
        assert_eq!(Role::from_db_str("coordinateur"), Some(Role::Coordinator));
        assert_eq!(Role::from_db_str("unknown"), None);
    }
}
