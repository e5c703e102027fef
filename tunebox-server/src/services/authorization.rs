//! Authorization Gate
//!
//! `authorize` is the pure decision; `AccessGate::require` resolves the
//! username it needs and turns an `Allowed` decision into a `Grant`.
//! Mutating library operations take a `Grant`, so they cannot run without
//! the check having happened first.

use std::sync::Arc;
use thiserror::Error;
use tunebox_common::db::UserId;
use tunebox_common::Error as StoreError;

use super::identity::{IdentityError, IdentityService};
use super::sessions::SessionIdentity;

/// Role a request must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Any authenticated user
    Listener,
    /// The single administrator principal
    Admin,
}

/// Outcome of the pure authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("You do not have permission to modify the catalog")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Decide whether a session may act in `role`
///
/// `username` is the session user's name as resolved from the Credential
/// Store (`None` if unknown); it only matters for `Role::Admin`.
pub fn authorize(
    session: &SessionIdentity,
    username: Option<&str>,
    role: Role,
    admin_username: &str,
) -> Authorization {
    if session.user_id.is_none() {
        return Authorization::Unauthenticated;
    }
    match role {
        Role::Listener => Authorization::Allowed,
        Role::Admin if username == Some(admin_username) => Authorization::Allowed,
        Role::Admin => Authorization::Forbidden,
    }
}

/// Proof that a session passed the gate for a given role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    user_id: UserId,
    role: Role,
}

impl Grant {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Fails unless this grant was issued for `role` (Admin implies Listener)
    pub fn ensure(&self, role: Role) -> Result<(), AuthorizationError> {
        match (self.role, role) {
            (Role::Admin, _) | (Role::Listener, Role::Listener) => Ok(()),
            (Role::Listener, Role::Admin) => Err(AuthorizationError::Forbidden),
        }
    }
}

#[derive(Clone)]
pub struct AccessGate {
    identity: IdentityService,
    admin_username: Arc<str>,
}

impl AccessGate {
    pub fn new(identity: IdentityService, admin_username: impl Into<Arc<str>>) -> Self {
        Self {
            identity,
            admin_username: admin_username.into(),
        }
    }

    /// Run the gate for `role`; the username lookup happens only for Admin
    pub async fn require(
        &self,
        session: &SessionIdentity,
        role: Role,
    ) -> Result<Grant, AuthorizationError> {
        let Some(user_id) = session.user_id else {
            return Err(AuthorizationError::Unauthenticated);
        };

        let username = match role {
            Role::Listener => None,
            Role::Admin => match self.identity.username_of(user_id).await {
                Ok(name) => Some(name),
                Err(IdentityError::Store(e)) => return Err(e.into()),
                Err(_) => None,
            },
        };

        match authorize(session, username.as_deref(), role, &self.admin_username) {
            Authorization::Allowed => Ok(Grant { user_id, role }),
            Authorization::Unauthenticated => Err(AuthorizationError::Unauthenticated),
            Authorization::Forbidden => Err(AuthorizationError::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    fn signed_in(user_id: UserId) -> SessionIdentity {
        SessionIdentity {
            token: Some(uuid::Uuid::new_v4()),
            user_id: Some(user_id),
        }
    }

    #[test]
    fn test_no_session_is_unauthenticated() {
        let anonymous = SessionIdentity::anonymous();

        assert_eq!(
            authorize(&anonymous, None, Role::Listener, "admin"),
            Authorization::Unauthenticated
        );
        assert_eq!(
            authorize(&anonymous, Some("admin"), Role::Admin, "admin"),
            Authorization::Unauthenticated
        );
    }

    #[test]
    fn test_admin_role_requires_admin_username() {
        let session = signed_in(1);

        assert_eq!(authorize(&session, Some("admin"), Role::Admin, "admin"), Authorization::Allowed);
        assert_eq!(authorize(&session, Some("bob"), Role::Admin, "admin"), Authorization::Forbidden);
        assert_eq!(authorize(&session, None, Role::Admin, "admin"), Authorization::Forbidden);
        assert_eq!(authorize(&session, Some("Admin"), Role::Admin, "admin"), Authorization::Forbidden);
    }

    #[test]
    fn test_listener_role_needs_only_a_session() {
        assert_eq!(authorize(&signed_in(5), None, Role::Listener, "admin"), Authorization::Allowed);
    }

    #[test]
    fn test_grant_role_hierarchy() {
        let admin = Grant { user_id: 1, role: Role::Admin };
        let listener = Grant { user_id: 2, role: Role::Listener };

        assert!(admin.ensure(Role::Admin).is_ok());
        assert!(admin.ensure(Role::Listener).is_ok());
        assert!(listener.ensure(Role::Listener).is_ok());
        assert!(matches!(listener.ensure(Role::Admin), Err(AuthorizationError::Forbidden)));
    }

    #[tokio::test]
    async fn test_gate_resolves_username_from_store() {
        let (pool, _dir) = test_pool().await;
        let identity = IdentityService::new(pool);
        let admin_id = identity.register("admin", "pw").await.unwrap();
        let user_id = identity.register("bob", "pw").await.unwrap();
        let gate = AccessGate::new(identity, "admin");

        let grant = gate.require(&signed_in(admin_id), Role::Admin).await.unwrap();
        assert_eq!(grant.user_id(), admin_id);

        assert!(matches!(
            gate.require(&signed_in(user_id), Role::Admin).await,
            Err(AuthorizationError::Forbidden)
        ));
        assert!(matches!(
            gate.require(&signed_in(999), Role::Admin).await,
            Err(AuthorizationError::Forbidden)
        ));
        assert!(matches!(
            gate.require(&SessionIdentity::anonymous(), Role::Listener).await,
            Err(AuthorizationError::Unauthenticated)
        ));
    }
}
