//! Persistent user profile.
//!
//! Profiles are owned by the user directory collaborator. The session state
//! only remembers the identifier of the last user it saw and reads or writes
//! profile fields through the directory.

use chrono::{DateTime, Utc};
use portico_core::Uid;
use serde::{Deserialize, Serialize};

/// Accessibility mode assigned to profiles that never chose one.
pub const DEFAULT_ACCESSIBILITY_MODE: &str = "default";

/// Persistent preferences of a user known to the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Principal identifier, as established by authentication.
    uid: Uid,
    /// Preferred UI language (ISO 639 code).
    language: Option<String>,
    /// Accessibility rendering mode chosen by the user.
    accessibility_mode: String,
    /// When the profile was created.
    created_at: DateTime<Utc>,
    /// When the profile was last updated.
    updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a profile with default preferences.
    #[must_use]
    pub fn new(uid: Uid) -> Self {
        let now = Utc::now();
        Self {
            uid,
            language: None,
            accessibility_mode: DEFAULT_ACCESSIBILITY_MODE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub fn accessibility_mode(&self) -> &str {
        &self.accessibility_mode
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the preferred language.
    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
        self.updated_at = Utc::now();
    }

    /// Sets the accessibility mode.
    pub fn set_accessibility_mode(&mut self, mode: impl Into<String>) {
        self.accessibility_mode = mode.into();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_has_defaults() {
        let profile = UserProfile::new(Uid::new("alice"));

        assert_eq!(profile.uid().as_str(), "alice");
        assert_eq!(profile.accessibility_mode(), DEFAULT_ACCESSIBILITY_MODE);
        assert!(profile.language().is_none());
        assert_eq!(profile.created_at(), profile.updated_at());
    }

    #[test]
    fn set_accessibility_mode_updates_timestamp() {
        let mut profile = UserProfile::new(Uid::new("alice"));
        let original_updated_at = profile.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(1));

        profile.set_accessibility_mode("high-contrast");

        assert_eq!(profile.accessibility_mode(), "high-contrast");
        assert!(profile.updated_at() > original_updated_at);
    }

    #[test]
    fn set_language_updates_timestamp() {
        let mut profile = UserProfile::new(Uid::new("alice"));
        let original_updated_at = profile.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(1));

        profile.set_language(Some("fr".to_string()));

        assert_eq!(profile.language(), Some("fr"));
        assert!(profile.updated_at() > original_updated_at);
    }

    #[test]
    fn profile_serialization_roundtrip() {
        let mut profile = UserProfile::new(Uid::new("carol"));
        profile.set_language(Some("de".to_string()));

        let json = serde_json::to_string(&profile).expect("serialize");
        let parsed: UserProfile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(profile, parsed);
    }
}
