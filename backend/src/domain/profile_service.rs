//! Read and edit the `users/{uid}` profile document.
//!
//! Saving a profile also mirrors the display name and avatar to the auth
//! provider. The document is the source of truth: a failed provider update
//! is logged and the save still succeeds.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{AuthProvider, DocumentStore, ProviderProfile};
use super::{Document, DocumentPath, Error, FieldValue, Fields, Identity, SessionToken, UserProfile};

const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";
const BIO: &str = "bio";
const WEBSITE: &str = "website";
const PHOTO_URL: &str = "photoURL";
const USERNAME: &str = "username";

/// Profile use-cases.
pub struct ProfileService<S: ?Sized, A: ?Sized> {
    store: Arc<S>,
    provider: Arc<A>,
}

impl<S: ?Sized, A: ?Sized> Clone for ProfileService<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<S, A> ProfileService<S, A>
where
    S: DocumentStore + ?Sized,
    A: AuthProvider + ?Sized,
{
    /// Create the service.
    pub fn new(store: Arc<S>, provider: Arc<A>) -> Self {
        Self { store, provider }
    }

    /// Load the profile, falling back to provider data for missing fields.
    pub async fn load(&self, identity: &Identity) -> Result<UserProfile, Error> {
        let document = self.store.get(&DocumentPath::user(&identity.uid)).await?;
        let mut profile = document.as_ref().map(decode_profile).unwrap_or_default();
        if profile.photo_url.is_empty() {
            profile.photo_url = identity.photo_url.clone().unwrap_or_default();
        }
        if profile.username.is_none() {
            profile.username = identity.username();
        }
        Ok(profile)
    }

    /// Validate and store `profile`. The username is always re-derived from
    /// the signed-in email.
    pub async fn update(
        &self,
        identity: &Identity,
        token: &SessionToken,
        mut profile: UserProfile,
    ) -> Result<UserProfile, Error> {
        profile
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        profile.website = profile.website.trim().to_owned();
        profile.photo_url = profile.photo_url.trim().to_owned();
        profile.username = identity.username();

        self.store
            .set(&DocumentPath::user(&identity.uid), encode_profile(&profile))
            .await?;
        debug!(uid = %identity.uid, "profile saved");

        let mirror = ProviderProfile {
            display_name: profile.display_name(),
            photo_url: Some(profile.photo_url.clone()).filter(|url| !url.is_empty()),
        };
        if let Err(err) = self.provider.update_profile(token, &mirror).await {
            warn!(uid = %identity.uid, error = %err, "provider profile update failed");
        }
        Ok(profile)
    }
}

fn decode_profile(document: &Document) -> UserProfile {
    let text = |name: &str| document.string(name).unwrap_or_default().to_owned();
    UserProfile {
        first_name: text(FIRST_NAME),
        last_name: text(LAST_NAME),
        bio: text(BIO),
        website: text(WEBSITE),
        photo_url: text(PHOTO_URL),
        username: document.string(USERNAME).map(str::to_owned),
    }
}

fn encode_profile(profile: &UserProfile) -> Fields {
    let mut fields = Fields::new();
    fields.insert(FIRST_NAME.to_owned(), profile.first_name.clone().into());
    fields.insert(LAST_NAME.to_owned(), profile.last_name.clone().into());
    fields.insert(BIO.to_owned(), profile.bio.clone().into());
    fields.insert(WEBSITE.to_owned(), profile.website.clone().into());
    fields.insert(PHOTO_URL.to_owned(), profile.photo_url.clone().into());
    fields.insert(
        USERNAME.to_owned(),
        profile
            .username
            .clone()
            .map_or(FieldValue::Null, FieldValue::String),
    );
    fields
}
