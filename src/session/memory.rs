//! In-process identity provider.
//!
//! Accounts live in memory for the lifetime of the provider. Used for local
//! development and tests; deployments plug in the hosted identity service.

use super::{AuthUser, IdentityProvider, SignUpAttributes};
use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    current: Option<AuthUser>,
    next_id: u64,
}

/// Identity provider keeping accounts in a map
#[derive(Default)]
pub struct MemoryIdentityProvider {
    state: Mutex<State>,
}

fn identity_error(message: &str) -> Error {
    Error::Identity {
        message: message.to_string(),
    }
}

impl MemoryIdentityProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| identity_error("Identity store is unavailable"))
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _attributes: &SignUpAttributes,
    ) -> Result<AuthUser> {
        let key = email.trim().to_lowercase();
        if !key.contains('@') {
            return Err(identity_error("Invalid email address"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(identity_error("Password should be at least 6 characters"));
        }

        let mut state = self.state()?;
        if state.accounts.contains_key(&key) {
            return Err(identity_error("User already registered"));
        }
        state.next_id += 1;
        let user = AuthUser {
            id: format!("user-{}", state.next_id),
            email: key.clone(),
        };
        state.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let mut state = self.state()?;
        let user = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.user.clone())
            .ok_or_else(|| identity_error("Invalid login credentials"))?;
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.state()?.current = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.state()?.current.clone())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_sign_up_rules() {
        let provider = MemoryIdentityProvider::new();
        let attrs = SignUpAttributes::default();

        assert!(provider.sign_up("no-at-sign", "secret123", &attrs).await.is_err());
        assert!(provider.sign_up("a@example.com", "short", &attrs).await.is_err());

        let user = provider
            .sign_up("A@Example.com", "secret123", &attrs)
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(provider.current_user().await.unwrap(), Some(user));

        assert!(provider.sign_up("a@example.com", "secret123", &attrs).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let provider = MemoryIdentityProvider::new();
        provider
            .sign_up("b@example.com", "secret123", &SignUpAttributes::default())
            .await
            .unwrap();
        provider.sign_out().await.unwrap();
        assert!(provider.current_user().await.unwrap().is_none());

        assert!(provider.sign_in("b@example.com", "nope").await.is_err());
        let user = provider.sign_in("b@example.com", "secret123").await.unwrap();
        assert_eq!(provider.current_user().await.unwrap(), Some(user));
    }
}
