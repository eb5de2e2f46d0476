//! Authentication context contract.
//!
//! The coordinator treats an unauthenticated context as "do not enable
//! sync" and reacts to signed-in/signed-out notifications delivered as
//! service commands.

use std::sync::RwLock;

/// Read-only view of the current authenticated principal.
pub trait AuthContext: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn current_principal_id(&self) -> Option<String>;
}

/// Session-backed auth context used by the application shell and tests.
#[derive(Default)]
pub struct SessionAuth {
    principal: RwLock<Option<String>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context already signed in as the given principal.
    pub fn signed_in(principal_id: impl Into<String>) -> Self {
        Self {
            principal: RwLock::new(Some(principal_id.into())),
        }
    }

    pub fn sign_in(&self, principal_id: impl Into<String>) {
        *self.principal.write().unwrap() = Some(principal_id.into());
    }

    pub fn sign_out(&self) {
        *self.principal.write().unwrap() = None;
    }
}

impl AuthContext for SessionAuth {
    fn is_authenticated(&self) -> bool {
        self.principal.read().unwrap().is_some()
    }

    fn current_principal_id(&self) -> Option<String> {
        self.principal.read().unwrap().clone()
    }
}
