//! Role-based access policy.
//!
//! | Operation                | anonymous | user  | admin |
//! |--------------------------|-----------|-------|-------|
//! | list / view              | deny      | allow | allow |
//! | create / update / delete | deny      | deny  | allow |
//! | search by ingredient     | deny      | allow | allow |
//! | view alcohol content     | deny      | allow | allow |

use serde::Serialize;
use uuid::Uuid;

use crate::types::{Operation, Resource, Role, Scope};

/// Authenticated caller, resolved from a bearer token by the auth middleware
#[derive(Clone, Debug, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    /// Effective role for this request (stored role narrowed by token scopes)
    pub role: Role,
    pub scopes: Vec<Scope>,
    #[serde(skip)]
    pub token_id: Uuid,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Who is making the request. Passed explicitly into every handler.
#[derive(Clone, Debug)]
pub enum Actor {
    Anonymous,
    Authenticated(Identity),
}

impl Actor {
    pub fn role(&self) -> Option<Role> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated(identity) => Some(identity.role),
        }
    }

    /// The identity, or `NotAuthenticated` for anonymous callers
    pub fn identity(&self) -> Result<&Identity, PolicyError> {
        match self {
            Actor::Anonymous => Err(PolicyError::NotAuthenticated),
            Actor::Authenticated(identity) => Ok(identity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    NotAuthenticated,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Unauthenticated.")]
    NotAuthenticated,
    #[error("This action is unauthorized: {operation:?} on {resource} requires the admin role")]
    Forbidden { operation: Operation, resource: Resource },
}

/// Pure policy table lookup. Both resource kinds currently share the same rules.
pub fn decide(role: Option<Role>, operation: Operation, _resource: Resource) -> Decision {
    match (role, operation) {
        (None, _) => Decision::NotAuthenticated,
        (Some(Role::Admin), _) => Decision::Allow,
        (Some(Role::User), op) if op.mutates() => Decision::Forbidden,
        (Some(Role::User), _) => Decision::Allow,
    }
}

pub fn authorize(actor: &Actor, operation: Operation, resource: Resource) -> Result<&Identity, PolicyError> {
    match decide(actor.role(), operation, resource) {
        Decision::Allow => actor.identity(),
        Decision::NotAuthenticated => Err(PolicyError::NotAuthenticated),
        Decision::Forbidden => {
            if let Actor::Authenticated(identity) = actor {
                tracing::warn!(
                    "Denied {:?} on {} for user {} ({})",
                    operation,
                    resource,
                    identity.user_id,
                    identity.role
                );
            }
            Err(PolicyError::Forbidden { operation, resource })
        }
    }
}
