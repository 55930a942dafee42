// src/host/identity.rs
// Caller identity resolution for API requests

use serde::{Deserialize, Serialize};

/// Right required to create and edit sprite sheet data.
pub const EDIT_SPRITES_RIGHT: &str = "edit_sprites";

/// A configured account the service will act for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub name: String,
    #[serde(default)]
    pub rights: Vec<String>,
}

/// The resolved caller of one request. Id 0 is the anonymous caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub id: i64,
    pub name: String,
    pub rights: Vec<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            name: "(anonymous)".to_string(),
            rights: Vec::new(),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.id > 0
    }

    pub fn is_allowed(&self, right: &str) -> bool {
        self.rights.iter().any(|r| r == right)
    }
}

/// Maps the request's user field to a caller.
pub trait IdentityProvider {
    fn resolve(&self, user: Option<&str>) -> Caller;
}

/// Identity backed by the configured user list. Users are numbered from
/// 1 in list order; unknown or missing names resolve to anonymous.
pub struct SettingsIdentityProvider {
    users: Vec<UserEntry>,
}

impl SettingsIdentityProvider {
    pub fn new(users: Vec<UserEntry>) -> Self {
        Self { users }
    }
}

impl IdentityProvider for SettingsIdentityProvider {
    fn resolve(&self, user: Option<&str>) -> Caller {
        let name = match user {
            Some(name) if !name.is_empty() => name,
            _ => return Caller::anonymous(),
        };
        match self.users.iter().position(|u| u.name == name) {
            Some(index) => Caller {
                id: index as i64 + 1,
                name: self.users[index].name.clone(),
                rights: self.users[index].rights.clone(),
            },
            None => Caller::anonymous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SettingsIdentityProvider {
        SettingsIdentityProvider::new(vec![
            UserEntry {
                name: "alexia".to_string(),
                rights: vec![EDIT_SPRITES_RIGHT.to_string()],
            },
            UserEntry {
                name: "viewer".to_string(),
                rights: vec![],
            },
        ])
    }

    #[test]
    fn known_users_get_stable_nonzero_ids() {
        let provider = provider();
        let alexia = provider.resolve(Some("alexia"));
        assert_eq!(alexia.id, 1);
        assert!(alexia.is_registered());
        assert!(alexia.is_allowed(EDIT_SPRITES_RIGHT));

        let viewer = provider.resolve(Some("viewer"));
        assert_eq!(viewer.id, 2);
        assert!(viewer.is_registered());
        assert!(!viewer.is_allowed(EDIT_SPRITES_RIGHT));
    }

    #[test]
    fn unknown_and_missing_users_are_anonymous() {
        let provider = provider();
        for caller in [
            provider.resolve(Some("stranger")),
            provider.resolve(Some("")),
            provider.resolve(None),
        ] {
            assert_eq!(caller.id, 0);
            assert!(!caller.is_registered());
            assert!(!caller.is_allowed(EDIT_SPRITES_RIGHT));
        }
    }
}
