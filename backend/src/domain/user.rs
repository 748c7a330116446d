//! User identity and profile data model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for user identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The uid was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// The uid carried whitespace padding or a path separator.
    #[error("user id must not contain whitespace padding or '/'")]
    InvalidId,
    /// A website value was not an absolute http(s) URL.
    #[error("website must be an absolute http or https URL")]
    InvalidWebsite,
    /// A photo URL was not an absolute http(s) URL.
    #[error("photo URL must be an absolute http or https URL")]
    InvalidPhotoUrl,
}

/// Opaque user identifier issued by the auth provider.
///
/// The uid becomes a document path segment (`users/{uid}`), so it must be
/// non-empty, unpadded and free of `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use pinboard::domain::UserId;
    ///
    /// let uid = UserId::new("Xk2fQ9").expect("valid uid");
    /// assert_eq!(uid.as_ref(), "Xk2fQ9");
    /// assert!(UserId::new("a/b").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id || id.contains('/') {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Generate a random uid, used by in-memory auth adapters.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Signed-in identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Provider uid.
    pub uid: UserId,
    /// Display name, if the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Email address used to sign in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Provider-side avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Identity {
    /// Build an identity with only a uid.
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Attach an avatar URL.
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    /// Username derived from the local part of the email address.
    ///
    /// # Examples
    /// ```
    /// use pinboard::domain::{Identity, UserId};
    ///
    /// let identity = Identity::new(UserId::new("u1").expect("uid")).with_email("ada@example.com");
    /// assert_eq!(identity.username().as_deref(), Some("ada"));
    /// ```
    pub fn username(&self) -> Option<String> {
        self.email.as_deref().and_then(username_from_email)
    }
}

/// Derive the username shown on the profile page from an email address.
pub fn username_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next().unwrap_or_default().trim();
    if local.is_empty() {
        None
    } else {
        Some(local.to_owned())
    }
}

/// Editable profile stored at `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Free-text biography.
    #[serde(default)]
    pub bio: String,
    /// Personal website; empty when unset.
    #[serde(default)]
    pub website: String,
    /// Avatar URL; empty when unset.
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    /// Email-derived username; never edited directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl UserProfile {
    /// Display name composed from first and last name, if either is set.
    pub fn display_name(&self) -> Option<String> {
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }

    /// Check the URL-shaped fields.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if !is_blank_or_http_url(&self.website) {
            return Err(UserValidationError::InvalidWebsite);
        }
        if !is_blank_or_http_url(&self.photo_url) {
            return Err(UserValidationError::InvalidPhotoUrl);
        }
        Ok(())
    }
}

fn is_blank_or_http_url(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || url::Url::parse(trimmed)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
}
