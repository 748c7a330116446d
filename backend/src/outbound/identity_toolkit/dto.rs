//! Request and response bodies for the Identity Toolkit `accounts:*` API.

use serde::{Deserialize, Serialize};

use crate::domain::{Identity, UserId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateRequestDto<'a> {
    pub(super) id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) photo_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(super) delete_attribute: Vec<&'static str>,
    pub(super) return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LookupRequestDto<'a> {
    pub(super) id_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountDto {
    pub(super) local_id: String,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) display_name: Option<String>,
    #[serde(default)]
    pub(super) photo_url: Option<String>,
    #[serde(default)]
    pub(super) id_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct LookupResponseDto {
    #[serde(default)]
    pub(super) users: Vec<AccountDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: String,
}

impl AccountDto {
    pub(super) fn into_identity(self) -> Result<Identity, String> {
        let uid = UserId::new(self.local_id).map_err(|err| err.to_string())?;
        let mut identity = Identity::new(uid);
        identity.email = self.email.filter(|value| !value.is_empty());
        identity.display_name = self.display_name.filter(|value| !value.is_empty());
        identity.photo_url = self.photo_url.filter(|value| !value.is_empty());
        Ok(identity)
    }
}
