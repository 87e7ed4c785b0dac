//! Admin credential comparison.

use subtle::ConstantTimeEq;

/// Shared admin secret, injected at startup and compared in constant time.
#[derive(Clone)]
pub struct AdminCredential {
    secret: String,
    actor: String,
}

impl AdminCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            actor: "Admin".to_string(),
        }
    }

    /// Name stamped into `approvedBy` when this credential moderates a record.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn verify(&self, presented: &str) -> bool {
        if self.secret.is_empty() || presented.len() != self.secret.len() {
            return false;
        }
        presented.as_bytes().ct_eq(self.secret.as_bytes()).into()
    }
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}
