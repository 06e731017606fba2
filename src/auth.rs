use crate::errors::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::{header::AUTHORIZATION, request::Parts};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub display_name: Option<String>,
    pub anonymous: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{provider} rejected sign-in: {reason}")]
    Rejected {
        provider: &'static str,
        reason: String,
    },
    #[error("Login failed.")]
    AllProvidersFailed,
    #[error("Guest login failed.")]
    GuestDisabled,
    #[error("not signed in")]
    UnknownSession,
}

/// One way of turning a sign-in request into a user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn sign_in(&self, name: &str) -> Result<User, AuthError>;
}

/// Identity by name alone: there is no password or other credential check,
/// so anyone who types a display name gets that account and its habits.
/// The same name always maps to the same user id, so data survives restarts.
#[derive(Debug, Default)]
pub struct LocalAccounts;

#[async_trait]
impl IdentityProvider for LocalAccounts {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn sign_in(&self, name: &str) -> Result<User, AuthError> {
        let display = name.trim();
        if display.is_empty() || display.chars().count() > MAX_NAME_LEN {
            return Err(AuthError::Rejected {
                provider: self.name(),
                reason: format!("name must be 1-{MAX_NAME_LEN} characters"),
            });
        }
        let slug = account_slug(display);
        if slug.is_empty() {
            return Err(AuthError::Rejected {
                provider: self.name(),
                reason: "name needs at least one letter or digit".into(),
            });
        }
        Ok(User {
            uid: format!("acct-{slug}"),
            display_name: Some(display.to_string()),
            anonymous: false,
        })
    }
}

fn account_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Sign-in front door: tries each interactive provider in order, hands out
/// guest identities, and tracks bearer-token sessions in memory.
pub struct Authenticator {
    providers: Vec<Arc<dyn IdentityProvider>>,
    allow_guest: bool,
    sessions: RwLock<HashMap<String, User>>,
}

impl Authenticator {
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>, allow_guest: bool) -> Self {
        Self {
            providers,
            allow_guest,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn local(allow_guest: bool) -> Self {
        Self::new(vec![Arc::new(LocalAccounts)], allow_guest)
    }

    pub async fn sign_in(&self, name: &str) -> Result<(String, User), AuthError> {
        for provider in &self.providers {
            match provider.sign_in(name).await {
                Ok(user) => return Ok(self.open_session(user).await),
                Err(err) => warn!(provider = provider.name(), "sign-in attempt failed: {err}"),
            }
        }
        Err(AuthError::AllProvidersFailed)
    }

    pub async fn sign_in_guest(&self) -> Result<(String, User), AuthError> {
        if !self.allow_guest {
            return Err(AuthError::GuestDisabled);
        }
        let user = User {
            uid: format!("guest-{}", uuid::Uuid::new_v4().simple()),
            display_name: None,
            anonymous: true,
        };
        Ok(self.open_session(user).await)
    }

    /// Returns whether a session was actually closed.
    pub async fn sign_out(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(user) = &removed {
            info!(uid = %user.uid, "signed out");
        }
        removed.is_some()
    }

    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        self.sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AuthError::UnknownSession)
    }

    async fn open_session(&self, user: User) -> (String, User) {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.write().await.insert(token.clone(), user.clone());
        info!(uid = %user.uid, anonymous = user.anonymous, "signed in");
        (token, user)
    }
}

/// The signed-in user behind a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Event streams cannot set headers, so they pass the token in the query.
        let token = match bearer_token(parts) {
            Some(token) => token,
            None => Query::<TokenQuery>::from_request_parts(parts, state)
                .await
                .ok()
                .and_then(|Query(query)| query.token)
                .ok_or_else(|| AppError::unauthorized("sign in first"))?,
        };
        let user = state.auth.current_user(&token).await?;
        Ok(Self { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    #[async_trait]
    impl IdentityProvider for Refusing {
        fn name(&self) -> &'static str {
            "popup"
        }

        async fn sign_in(&self, _name: &str) -> Result<User, AuthError> {
            Err(AuthError::Rejected {
                provider: "popup",
                reason: "closed by user".into(),
            })
        }
    }

    #[tokio::test]
    async fn local_accounts_map_names_to_stable_ids() {
        let a = LocalAccounts.sign_in("  Ada Lovelace ").await.unwrap();
        let b = LocalAccounts.sign_in("ada   lovelace").await.unwrap();
        assert_eq!(a.uid, "acct-ada-lovelace");
        assert_eq!(a.uid, b.uid);
        assert_eq!(a.display_name.as_deref(), Some("Ada Lovelace"));
        assert!(!a.anonymous);
    }

    #[tokio::test]
    async fn local_accounts_reject_blank_names() {
        assert!(LocalAccounts.sign_in("   ").await.is_err());
        assert!(LocalAccounts.sign_in("!!!").await.is_err());
    }

    #[tokio::test]
    async fn sign_in_falls_back_to_next_provider() {
        let auth = Authenticator::new(vec![Arc::new(Refusing), Arc::new(LocalAccounts)], true);
        let (token, user) = auth.sign_in("grace").await.unwrap();
        assert_eq!(user.uid, "acct-grace");
        assert_eq!(auth.current_user(&token).await.unwrap(), user);
    }

    #[tokio::test]
    async fn sign_in_fails_when_every_provider_refuses() {
        let auth = Authenticator::new(vec![Arc::new(Refusing)], true);
        let err = auth.sign_in("grace").await.unwrap_err();
        assert!(matches!(err, AuthError::AllProvidersFailed));
        assert_eq!(err.to_string(), "Login failed.");
    }

    #[tokio::test]
    async fn guest_sessions_are_anonymous_and_unique() {
        let auth = Authenticator::local(true);
        let (t1, u1) = auth.sign_in_guest().await.unwrap();
        let (t2, u2) = auth.sign_in_guest().await.unwrap();
        assert!(u1.anonymous);
        assert_ne!(u1.uid, u2.uid);
        assert_ne!(t1, t2);

        let locked = Authenticator::local(false);
        assert!(matches!(locked.sign_in_guest().await, Err(AuthError::GuestDisabled)));
    }

    #[tokio::test]
    async fn sign_out_ends_session() {
        let auth = Authenticator::local(true);
        let (token, _) = auth.sign_in_guest().await.unwrap();
        assert!(auth.sign_out(&token).await);
        assert!(!auth.sign_out(&token).await);
        assert!(matches!(auth.current_user(&token).await, Err(AuthError::UnknownSession)));
    }
}
