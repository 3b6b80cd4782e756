//! Session gate.
//!
//! Reports who is signed in so the dashboard can show or hide account
//! sections. Identity never feeds into profiling or recommendations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthGate: Send + Sync {
    async fn current_user(&self) -> Option<UserIdentity>;

    async fn is_authenticated(&self) -> bool {
        self.current_user().await.is_some()
    }
}

/// No sign-in configured
#[derive(Clone, Copy, Debug, Default)]
pub struct AnonymousGate;

#[async_trait]
impl AuthGate for AnonymousGate {
    async fn current_user(&self) -> Option<UserIdentity> {
        None
    }
}

/// A fixed local user, for single-user deployments
#[derive(Clone, Debug)]
pub struct StaticUserGate {
    user: UserIdentity,
}

impl StaticUserGate {
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user: UserIdentity { id: id.into(), email },
        }
    }
}

#[async_trait]
impl AuthGate for StaticUserGate {
    async fn current_user(&self) -> Option<UserIdentity> {
        Some(self.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gates_report_session_state() {
        assert!(!AnonymousGate.is_authenticated().await);

        let gate = StaticUserGate::new("local", Some("me@example.com".into()));
        assert!(gate.is_authenticated().await);
        assert_eq!(gate.current_user().await.unwrap().id, "local");
    }
}
