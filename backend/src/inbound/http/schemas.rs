//! OpenAPI schema definitions for domain types.
//!
//! Error, identity and profile types stay free of utoipa derives. The
//! wrappers below mirror their serialised shape so handlers can reference
//! them in `#[utoipa::path]` response bodies.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The resource already exists.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service (store, auth or image provider) is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "collection \"Travel\" already exists")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Identity`].
///
/// The signed-in user as reported by the auth provider.
#[derive(ToSchema)]
#[schema(as = crate::domain::Identity, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct IdentitySchema {
    /// Provider-issued user id.
    #[schema(example = "pT3q9xK2")]
    uid: String,
    display_name: Option<String>,
    #[schema(example = "ada@example.com")]
    email: Option<String>,
    photo_url: Option<String>,
}

/// OpenAPI schema for [`crate::domain::UserProfile`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserProfile)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserProfileSchema {
    #[schema(rename = "firstName", example = "Ada")]
    first_name: String,
    #[schema(rename = "lastName", example = "Lovelace")]
    last_name: String,
    bio: String,
    #[schema(example = "https://example.com")]
    website: String,
    #[schema(rename = "photoURL")]
    photo_url: String,
    /// Derived from the email's local part; ignored on update.
    #[schema(example = "ada")]
    username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        let schema_json = schema_to_json::<ErrorSchema>();
        assert!(schema_json.contains("traceId"));
        assert!(!schema_json.contains("trace_id"));
    }

    #[test]
    fn profile_schema_matches_document_fields() {
        let schema_json = schema_to_json::<UserProfileSchema>();
        for field in ["firstName", "lastName", "photoURL", "website", "bio"] {
            assert!(schema_json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn identity_schema_is_camel_case() {
        assert_eq!(IdentitySchema::name(), "crate.domain.Identity");
        assert!(schema_to_json::<IdentitySchema>().contains("displayName"));
    }
}
