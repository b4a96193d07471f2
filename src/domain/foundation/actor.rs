//! Who is performing an operation.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

/// Authenticated caller of a command or query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the caller owns the resource or is an admin.
    pub fn can_access(&self, owner: &UserId) -> bool {
        self.is_admin() || &self.user_id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customers_only_access_their_own_resources() {
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();
        let actor = Actor::customer(alice.clone());

        assert!(actor.can_access(&alice));
        assert!(!actor.can_access(&bob));
    }

    #[test]
    fn admins_access_everything() {
        let actor = Actor::admin(UserId::new("root").unwrap());
        assert!(actor.can_access(&UserId::new("bob").unwrap()));
    }
}
