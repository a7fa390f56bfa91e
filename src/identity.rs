//! Identity resolution
//!
//! The store only needs to know which actor is current. Authentication itself
//! lives elsewhere; these resolvers just report the outcome.

use std::sync::RwLock;
use crate::domain::value_objects::ActorId;

pub trait IdentityResolver: Send + Sync {
    /// Current actor, `"guest"` when nobody is signed in.
    fn current_actor_id(&self) -> ActorId;
}

/// Always reports the same actor. Used per request by the HTTP layer.
#[derive(Clone, Debug, Default)]
pub struct FixedIdentity(ActorId);

impl FixedIdentity {
    pub fn new(actor: ActorId) -> Self { Self(actor) }
}

impl IdentityResolver for FixedIdentity {
    fn current_actor_id(&self) -> ActorId { self.0.clone() }
}

/// Session-scoped identity that flips between guest and a signed-in user.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    user: RwLock<Option<ActorId>>,
}

impl SessionIdentity {
    pub fn new() -> Self { Self::default() }

    pub fn login(&self, user: ActorId) {
        tracing::info!(actor = %user, "session signed in");
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }

    pub fn logout(&self) {
        if let Some(user) = self.user.write().unwrap_or_else(|e| e.into_inner()).take() {
            tracing::info!(actor = %user, "session signed out");
        }
    }
}

impl IdentityResolver for SessionIdentity {
    fn current_actor_id(&self) -> ActorId {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_identity_transitions() {
        let session = SessionIdentity::new();
        assert!(session.current_actor_id().is_guest());
        session.login(ActorId::new("user-42").unwrap());
        assert_eq!(session.current_actor_id().as_str(), "user-42");
        session.logout();
        assert!(session.current_actor_id().is_guest());
    }

    #[test]
    fn test_fixed_identity() {
        let fixed = FixedIdentity::new(ActorId::new("user-7").unwrap());
        assert_eq!(fixed.current_actor_id().as_str(), "user-7");
        assert!(FixedIdentity::default().current_actor_id().is_guest());
    }
}
