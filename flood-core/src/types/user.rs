//! User and role types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{UserId, WardId};

/// User role. Authorization is an explicit check on this attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Resident,
    Authority,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Resident => "resident",
            Role::Authority => "authority",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "resident" => Some(Role::Resident),
            "authority" => Some(Role::Authority),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Resident
    }
}

/// Registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub subscribed_wards: Vec<WardId>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            email: None,
            phone_number: None,
            role,
            is_active: true,
            subscribed_wards: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn subscribe(mut self, ward_id: WardId) -> Self {
        if !self.subscribed_wards.contains(&ward_id) {
            self.subscribed_wards.push(ward_id);
        }
        self
    }

    pub fn is_authority(&self) -> bool {
        self.role == Role::Authority
    }

    /// Deliverable email address, if any (blank addresses count as none)
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_email_skips_blank() {
        let user = UserRecord::new(UserId::new("u1"), "wanjiru", Role::Resident).with_email("  ");
        assert_eq!(user.contact_email(), None);

        let user = user.with_email("wanjiru@example.org");
        assert_eq!(user.contact_email(), Some("wanjiru@example.org"));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Authority"), Some(Role::Authority));
        assert_eq!(Role::parse("admin"), None);
    }
}
