//! Session cookie configuration.
//!
//! Settings come from `PINBOARD_SESSION_*` environment variables. Debug
//! builds fall back to development defaults with a warning; release builds
//! reject anything missing or malformed so a misconfigured deployment fails
//! at startup rather than issuing weak cookies.

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite, time::Duration};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

use crate::domain::{SESSION_COOKIE, SESSION_TTL_SECS};

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/pinboard_session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const KEY_FILE_ENV: &str = "PINBOARD_SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "PINBOARD_SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "PINBOARD_SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "PINBOARD_SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pinboard::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Session settings derived from configuration toggles.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("PINBOARD_SESSION_SAMESITE=None requires PINBOARD_SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("PINBOARD_SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use pinboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = bool_from_env(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = bool_from_env(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key_from_env(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Cookie session middleware carrying the auth session.
///
/// The cookie is named after [`SESSION_COOKIE`], encrypted, HTTP-only and
/// persisted for [`SESSION_TTL_SECS`].
pub fn session_middleware(settings: SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    let SessionSettings {
        key,
        cookie_secure,
        same_site,
    } = settings;
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::seconds(SESSION_TTL_SECS)),
        )
        .build()
}

fn fallback_or<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(%error, "using development default");
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn bool_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default_value: bool,
) -> Result<bool, SessionConfigError> {
    match env.string(name) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => fallback_or(
                mode,
                default_value,
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                },
            ),
        },
        None => fallback_or(mode, default_value, SessionConfigError::MissingEnv { name }),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = env.string(SAMESITE_ENV) else {
        return fallback_or(
            mode,
            default_same_site,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
        );
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => fallback_or(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => fallback_or(
            mode,
            default_same_site,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use mockable::MockEnv;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn key_file(len: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp key file");
        file.write_all(&vec![b'a'; len]).expect("write key");
        file
    }

    fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
        HashMap::from([
            (KEY_FILE_ENV, key.path().display().to_string()),
            (COOKIE_SECURE_ENV, "1".to_owned()),
            (SAMESITE_ENV, "Strict".to_owned()),
            (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
        ])
    }

    fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
        match session_settings_from_env(&mock_env(vars), BuildMode::Release) {
            Ok(_) => panic!("release settings should be rejected"),
            Err(error) => error,
        }
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV)]
    #[case(SAMESITE_ENV)]
    #[case(ALLOW_EPHEMERAL_ENV)]
    fn release_requires_every_toggle(#[case] missing: &'static str) {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.remove(missing);

        let err = release_error(vars);
        assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
    }

    #[rstest]
    #[case("maybe")]
    #[case("")]
    fn release_rejects_invalid_bool(#[case] value: &str) {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(COOKIE_SECURE_ENV, value.to_owned());

        let err = release_error(vars);
        assert!(matches!(
            err,
            SessionConfigError::InvalidEnv { name: COOKIE_SECURE_ENV, .. }
        ));
    }

    #[test]
    fn release_rejects_ephemeral_keys() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(ALLOW_EPHEMERAL_ENV, "1".to_owned());

        assert!(matches!(
            release_error(vars),
            SessionConfigError::EphemeralNotAllowed
        ));
    }

    #[test]
    fn release_rejects_short_key() {
        let key = key_file(SESSION_KEY_MIN_LEN - 1);
        let err = release_error(release_vars(&key));
        assert!(matches!(err, SessionConfigError::KeyTooShort { length, .. } if length == 63));
    }

    #[test]
    fn release_rejects_missing_key_file() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(KEY_FILE_ENV, "/nonexistent/pinboard/session_key".to_owned());

        assert!(matches!(
            release_error(vars),
            SessionConfigError::KeyRead { .. }
        ));
    }

    #[test]
    fn release_rejects_insecure_same_site_none() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
        vars.insert(SAMESITE_ENV, "None".to_owned());

        assert!(matches!(
            release_error(vars),
            SessionConfigError::InsecureSameSiteNone
        ));
    }

    #[test]
    fn release_accepts_complete_settings() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let env = mock_env(release_vars(&key));

        let settings =
            session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[test]
    fn debug_defaults_allow_ephemeral_key() {
        let env = mock_env(HashMap::new());
        let settings =
            session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[test]
    fn debug_invalid_same_site_falls_back() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let mut vars = release_vars(&key);
        vars.insert(SAMESITE_ENV, "sideways".to_owned());

        let settings = session_settings_from_env(&mock_env(vars), BuildMode::Debug)
            .expect("debug falls back");
        assert_eq!(settings.same_site, SameSite::Lax);
    }
}
