//! Collaborators the session controller depends on.
//!
//! The controller never talks to an SSO server, a profile database or an
//! HTTP response directly. Hosts plug those in through these traits.

use async_trait::async_trait;
use portico_core::Uid;
use rootcause::Report;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::context::RequestContext;
use crate::error::{AuthenticationError, ProfileError, RedirectError};
use crate::user::UserProfile;

/// Answers "who is authenticated on this request" in standalone mode.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the authenticated user, or `None` for an anonymous request.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError::Unavailable` when the answer cannot be
    /// determined.
    async fn current_user(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Uid>, Report<AuthenticationError>>;
}

/// Loads and stores user profiles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the profile for `uid`, if the user is known.
    async fn get_user(&self, uid: &Uid) -> Result<Option<UserProfile>, Report<ProfileError>>;

    /// Persists changes to a profile.
    async fn save_user(&self, profile: UserProfile) -> Result<(), Report<ProfileError>>;
}

/// Receives the single sign-out redirect.
pub trait RedirectSink {
    /// Sends the client to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect cannot be issued.
    fn redirect(&mut self, url: &str) -> Result<(), Report<RedirectError>>;
}

/// Redirect sink that captures the target for the host to turn into a
/// response later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingRedirect {
    target: Option<String>,
}

impl RecordingRedirect {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the captured redirect target.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub fn into_target(self) -> Option<String> {
        self.target
    }
}

impl RedirectSink for RecordingRedirect {
    fn redirect(&mut self, url: &str) -> Result<(), Report<RedirectError>> {
        if self.target.is_some() {
            return Err(RedirectError::AlreadyRedirected.into());
        }
        if url.chars().any(char::is_control) {
            return Err(RedirectError::InvalidTarget {
                target: url.to_string(),
                reason: "contains control characters".to_string(),
            }
            .into());
        }
        self.target = Some(url.to_string());
        Ok(())
    }
}

/// Process-local profile store.
///
/// With auto-provisioning enabled, looking up an unknown user creates a
/// profile with default preferences.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    profiles: RwLock<HashMap<Uid, UserProfile>>,
    auto_provision: bool,
}

impl InMemoryUserDirectory {
    #[must_use]
    pub fn new(auto_provision: bool) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            auto_provision,
        }
    }

    /// Creates a store pre-populated with `profiles`.
    #[must_use]
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|p| (p.uid().clone(), p))
            .collect();
        Self {
            profiles: RwLock::new(profiles),
            auto_provision: false,
        }
    }

    /// Returns the number of stored profiles.
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, uid: &Uid) -> Result<Option<UserProfile>, Report<ProfileError>> {
        if let Some(profile) = self.profiles.read().await.get(uid) {
            return Ok(Some(profile.clone()));
        }
        if !self.auto_provision {
            return Ok(None);
        }

        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(uid.clone())
            .or_insert_with(|| {
                tracing::debug!(uid = %uid, "provisioning profile");
                UserProfile::new(uid.clone())
            })
            .clone();
        Ok(Some(profile))
    }

    async fn save_user(&self, profile: UserProfile) -> Result<(), Report<ProfileError>> {
        let mut profiles = self.profiles.write().await;
        if !self.auto_provision && !profiles.contains_key(profile.uid()) {
            return Err(ProfileError::NotFound {
                uid: profile.uid().clone(),
            }
            .into());
        }
        profiles.insert(profile.uid().clone(), profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_redirect_captures_target() {
        let mut sink = RecordingRedirect::new();
        sink.redirect("https://cas.example.edu/logout?service=x")
            .expect("redirect");
        assert_eq!(sink.target(), Some("https://cas.example.edu/logout?service=x"));
    }

    #[test]
    fn recording_redirect_rejects_second_redirect() {
        let mut sink = RecordingRedirect::new();
        sink.redirect("https://a.example.edu/").expect("first redirect");
        assert!(sink.redirect("https://b.example.edu/").is_err());
        assert_eq!(sink.into_target().as_deref(), Some("https://a.example.edu/"));
    }

    #[test]
    fn recording_redirect_rejects_control_characters() {
        let mut sink = RecordingRedirect::new();
        assert!(sink.redirect("https://cas.example.edu/\r\nSet-Cookie: x").is_err());
        assert!(sink.target().is_none());
    }

    #[tokio::test]
    async fn directory_without_provisioning_returns_none() {
        let directory = InMemoryUserDirectory::new(false);
        let found = directory.get_user(&Uid::new("alice")).await.expect("lookup");
        assert!(found.is_none());
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn directory_provisions_unknown_users() {
        let directory = InMemoryUserDirectory::new(true);
        let found = directory.get_user(&Uid::new("alice")).await.expect("lookup");
        assert_eq!(found.map(|p| p.uid().clone()), Some(Uid::new("alice")));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn save_unknown_profile_fails_without_provisioning() {
        let directory = InMemoryUserDirectory::new(false);
        let result = directory.save_user(UserProfile::new(Uid::new("mallory"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn save_replaces_existing_profile() {
        let directory = InMemoryUserDirectory::with_profiles([UserProfile::new(Uid::new("bob"))]);
        let mut profile = directory
            .get_user(&Uid::new("bob"))
            .await
            .expect("lookup")
            .expect("profile");
        profile.set_accessibility_mode("high-contrast");
        directory.save_user(profile).await.expect("save");

        let reloaded = directory
            .get_user(&Uid::new("bob"))
            .await
            .expect("lookup")
            .expect("profile");
        assert_eq!(reloaded.accessibility_mode(), "high-contrast");
    }
}
