//! Identity session provider.
//!
//! [`Session`] wraps an [`IdentityProvider`] and the store, keeps the current user and
//! profile, and publishes every change through a `tokio::sync::watch` channel. Views
//! and wizards take a [`SessionState`] snapshot as a constructor argument instead of
//! reaching for ambient state.
//!
//! Role checks here are a UX guard. Real enforcement belongs to the store's access
//! policy; nothing in this crate should treat [`SessionState::require_admin`] as a
//! security boundary.

/// In-process identity provider for local development and tests
pub mod memory;

use crate::{
    core::profiles,
    errors::{Error, Result},
    models::{UserProfile, UserRole},
};
use sea_orm::DatabaseConnection;
use std::future::Future;
use tokio::sync::watch;
use tracing::{error, info, instrument};

/// An authenticated identity as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Identity id, shared with the profile row
    pub id: String,
    /// Sign-in email
    pub email: String,
}

/// Extra attributes captured at sign-up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpAttributes {
    /// Display name stored on the new profile
    pub name: String,
}

/// Current identity, profile and loading flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Signed-in identity, if any
    pub user: Option<AuthUser>,
    /// Stored profile; `None` until it loads or if it was never created
    pub profile: Option<UserProfile>,
    /// True until the first session lookup finishes
    pub loading: bool,
}

impl SessionState {
    /// Signed-in state with an optional profile.
    #[must_use]
    pub const fn signed_in(user: AuthUser, profile: Option<UserProfile>) -> Self {
        Self {
            user: Some(user),
            profile,
            loading: false,
        }
    }

    /// Whether the profile carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|p| p.role == UserRole::Admin)
    }

    /// The signed-in user, or [`Error::NotAuthenticated`].
    pub fn require_user(&self) -> Result<&AuthUser> {
        self.user.as_ref().ok_or(Error::NotAuthenticated)
    }

    /// The signed-in admin, or [`Error::NotAuthenticated`] / [`Error::Unauthorized`].
    pub fn require_admin(&self) -> Result<&AuthUser> {
        let user = self.require_user()?;
        if self.is_admin() {
            Ok(user)
        } else {
            Err(Error::Unauthorized)
        }
    }

    /// Name recorded on submissions: profile name, else the email's local part, else
    /// "Anonymous".
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self
            .profile
            .as_ref()
            .map(|p| p.name.trim())
            .filter(|n| !n.is_empty())
        {
            return name.to_string();
        }
        self.user
            .as_ref()
            .and_then(|u| u.email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("Anonymous")
            .to_string()
    }
}

/// The identity capability of the backend
pub trait IdentityProvider: Send + Sync {
    /// Registers a new identity and signs it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &SignUpAttributes,
    ) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Signs in with email and password.
    fn sign_in(&self, email: &str, password: &str) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Ends the current session.
    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;

    /// The identity of the current session, if any.
    fn current_user(&self) -> impl Future<Output = Result<Option<AuthUser>>> + Send;
}

/// Session store shared by every view
pub struct Session<P> {
    provider: P,
    db: DatabaseConnection,
    state: watch::Sender<SessionState>,
}

impl<P: IdentityProvider> Session<P> {
    /// Creates a session in the loading state. Call [`Session::restore`] next.
    pub fn new(provider: P, db: DatabaseConnection) -> Self {
        let (state, _) = watch::channel(SessionState {
            loading: true,
            ..SessionState::default()
        });
        Self {
            provider,
            db,
            state,
        }
    }

    /// Store handle for data access calls made on behalf of this session.
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every sign-in, sign-out and profile refresh.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn publish(&self, state: SessionState) -> SessionState {
        self.state.send_replace(state.clone());
        state
    }

    /// Loads the profile for `user`. A failed lookup is logged and leaves the profile
    /// empty; the user stays signed in.
    async fn load_profile(&self, user: &AuthUser) -> Option<UserProfile> {
        match profiles::get_profile(&self.db, &user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Error fetching profile for {}: {}", user.id, e);
                None
            }
        }
    }

    async fn publish_user(&self, user: Option<AuthUser>) -> SessionState {
        match user {
            Some(user) => {
                let profile = self.load_profile(&user).await;
                self.publish(SessionState::signed_in(user, profile))
            }
            None => self.publish(SessionState::default()),
        }
    }

    /// Picks up an existing session from the provider.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<SessionState> {
        let user = match self.provider.current_user().await {
            Ok(user) => user,
            Err(e) => {
                self.publish(SessionState::default());
                return Err(e);
            }
        };
        Ok(self.publish_user(user).await)
    }

    /// Registers, creates the profile row and signs in.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SessionState> {
        let attributes = SignUpAttributes {
            name: name.trim().to_string(),
        };
        let user = self.provider.sign_up(email, password, &attributes).await?;

        if profiles::get_profile(&self.db, &user.id).await?.is_none() {
            profiles::create_profile(&self.db, &user.id, &user.email, &attributes.name, UserRole::User)
                .await?;
        }

        info!("Signed up {}", user.id);
        Ok(self.publish_user(Some(user)).await)
    }

    /// Signs in and loads the profile.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionState> {
        let user = self.provider.sign_in(email, password).await?;
        info!("Signed in {}", user.id);
        Ok(self.publish_user(Some(user)).await)
    }

    /// Signs out and clears the profile.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.provider.sign_out().await;
        self.publish(SessionState::default());
        result
    }

    /// Re-reads the profile after the user edited it.
    pub async fn refresh_profile(&self) -> Result<SessionState> {
        let state = self.snapshot();
        let user = state.require_user()?.clone();
        let profile = profiles::get_profile(&self.db, &user.id).await?;
        Ok(self.publish(SessionState::signed_in(user, profile)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::memory::MemoryIdentityProvider;
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_sign_up_creates_profile_and_notifies() -> Result<()> {
        let db = setup_test_db().await?;
        let session = Session::new(MemoryIdentityProvider::new(), db);
        let mut changes = session.subscribe();
        assert!(session.snapshot().loading);

        let state = session
            .sign_up("asha@example.com", "secret123", "Asha")
            .await?;
        assert_eq!(state.profile.as_ref().unwrap().name, "Asha");
        assert!(!state.is_admin());

        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().user, state.user);

        session.sign_out().await?;
        assert!(session.snapshot().user.is_none());
        assert!(changes.has_changed().unwrap());
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_and_sign_in() -> Result<()> {
        let db = setup_test_db().await?;
        let session = Session::new(MemoryIdentityProvider::new(), db);

        let restored = session.restore().await?;
        assert!(restored.user.is_none());
        assert!(!restored.loading);

        session.sign_up("kamal@example.com", "secret123", "Kamal").await?;
        session.sign_out().await?;

        let result = session.sign_in("kamal@example.com", "wrong-password").await;
        assert!(matches!(result.unwrap_err(), Error::Identity { .. }));

        let state = session.sign_in("kamal@example.com", "secret123").await?;
        assert_eq!(state.require_user()?.email, "kamal@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_guard() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "admin-1", "Root").await?;
        let user = session_for(&db, "admin-1").await?;
        assert!(matches!(user.require_admin().unwrap_err(), Error::Unauthorized));

        let admin = admin_session(&db).await?;
        assert!(admin.require_admin().is_ok());

        assert!(matches!(
            SessionState::default().require_admin().unwrap_err(),
            Error::NotAuthenticated
        ));
        Ok(())
    }

    #[test]
    fn test_display_name_fallbacks() {
        let user = AuthUser {
            id: "u-1".to_string(),
            email: "nimal@example.com".to_string(),
        };
        let state = SessionState::signed_in(user, None);
        assert_eq!(state.display_name(), "nimal");
        assert_eq!(SessionState::default().display_name(), "Anonymous");
    }
}
