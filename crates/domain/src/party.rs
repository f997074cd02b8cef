//! Parties exchanging value in an authorize action.

use serde::{Deserialize, Serialize};

/// Kind of party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    Person,
    Organization,
}

/// Membership program a person belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub membership_number: String,
    pub program_name: Option<String>,
}

/// A person or organization taking part in a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub type_of: PartyType,
    pub name: Option<String>,
    pub member_of: Option<Membership>,
}

impl Party {
    /// Creates a person without membership.
    pub fn person(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_of: PartyType::Person,
            name: None,
            member_of: None,
        }
    }

    /// Creates an organization party.
    pub fn organization(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_of: PartyType::Organization,
            name: Some(name.into()),
            member_of: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches a membership.
    pub fn with_membership(mut self, membership_number: impl Into<String>) -> Self {
        self.member_of = Some(Membership {
            membership_number: membership_number.into(),
            program_name: None,
        });
        self
    }

    /// Returns true if the party has an active membership association.
    pub fn is_member(&self) -> bool {
        self.member_of.is_some()
    }

    /// Name shown to the remote ledger, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        assert!(!Party::person("p1").is_member());
        assert!(Party::person("p1").with_membership("M-001").is_member());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(Party::person("p1").display_name(), "p1");
        assert_eq!(Party::organization("o1", "Cinema").display_name(), "Cinema");
    }
}
