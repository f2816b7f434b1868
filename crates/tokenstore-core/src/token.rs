//! Token information model.
//!
//! [`TokenInfo`] is the capability set an OAuth 2.0 server hands to the store:
//! getters for the authorization code, access token and refresh token together
//! with their creation times and lifetimes. The store never constructs or
//! validates these values, it only reads and serializes them.
//!
//! [`Token`] is the concrete value written as the record payload and returned
//! by lookups. It implements [`TokenInfo`] itself, so a token read back from the
//! store can be handed to it again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::StoreResult;

/// Read access to the data of an issued OAuth 2.0 grant.
///
/// Any subset of code, access token and refresh token may be absent depending
/// on the grant type. Empty strings are treated the same as `None`.
pub trait TokenInfo: Send + Sync {
    /// Client the grant was issued to.
    fn client_id(&self) -> &str;

    /// Resource owner that authorized the grant (empty for client credentials).
    fn user_id(&self) -> &str;

    /// Redirect URI used in the authorization request.
    fn redirect_uri(&self) -> &str;

    /// Granted scopes (space-separated).
    fn scope(&self) -> &str;

    /// Authorization code value.
    fn code(&self) -> Option<&str>;

    /// When the authorization code was issued.
    fn code_created_at(&self) -> OffsetDateTime;

    /// Authorization code lifetime.
    fn code_expires_in(&self) -> Duration;

    /// Access token value.
    fn access(&self) -> Option<&str>;

    /// When the access token was issued.
    fn access_created_at(&self) -> OffsetDateTime;

    /// Access token lifetime.
    fn access_expires_in(&self) -> Duration;

    /// Refresh token value.
    fn refresh(&self) -> Option<&str>;

    /// When the refresh token was issued.
    fn refresh_created_at(&self) -> OffsetDateTime;

    /// Refresh token lifetime.
    fn refresh_expires_in(&self) -> Duration;
}

/// Returns the value if it is present and non-empty.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn unix_epoch() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

/// Serializable token information.
///
/// Timestamps are encoded as RFC 3339 strings and lifetimes as humantime
/// strings (`"1h"`, `"30m"`), so payloads stay readable in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Client the grant was issued to.
    #[serde(default)]
    pub client_id: String,

    /// Resource owner that authorized the grant.
    #[serde(default)]
    pub user_id: String,

    /// Redirect URI of the authorization request.
    #[serde(default)]
    pub redirect_uri: String,

    /// Granted scopes (space-separated).
    #[serde(default)]
    pub scope: String,

    /// Authorization code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// When the authorization code was issued.
    #[serde(default = "unix_epoch", with = "time::serde::rfc3339")]
    pub code_created_at: OffsetDateTime,

    /// Authorization code lifetime.
    #[serde(default, with = "humantime_serde")]
    pub code_expires_in: Duration,

    /// Access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    /// When the access token was issued.
    #[serde(default = "unix_epoch", with = "time::serde::rfc3339")]
    pub access_created_at: OffsetDateTime,

    /// Access token lifetime.
    #[serde(default, with = "humantime_serde")]
    pub access_expires_in: Duration,

    /// Refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,

    /// When the refresh token was issued.
    #[serde(default = "unix_epoch", with = "time::serde::rfc3339")]
    pub refresh_created_at: OffsetDateTime,

    /// Refresh token lifetime.
    #[serde(default, with = "humantime_serde")]
    pub refresh_expires_in: Duration,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            user_id: String::new(),
            redirect_uri: String::new(),
            scope: String::new(),
            code: None,
            code_created_at: OffsetDateTime::UNIX_EPOCH,
            code_expires_in: Duration::ZERO,
            access: None,
            access_created_at: OffsetDateTime::UNIX_EPOCH,
            access_expires_in: Duration::ZERO,
            refresh: None,
            refresh_created_at: OffsetDateTime::UNIX_EPOCH,
            refresh_expires_in: Duration::ZERO,
        }
    }
}

impl Token {
    /// Create an empty token for a client.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Set the resource owner.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Attach an authorization code.
    #[must_use]
    pub fn with_code(
        mut self,
        code: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.code = Some(code.into());
        self.code_created_at = created_at;
        self.code_expires_in = expires_in;
        self
    }

    /// Attach an access token.
    #[must_use]
    pub fn with_access(
        mut self,
        access: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.access = Some(access.into());
        self.access_created_at = created_at;
        self.access_expires_in = expires_in;
        self
    }

    /// Attach a refresh token.
    #[must_use]
    pub fn with_refresh(
        mut self,
        refresh: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.refresh = Some(refresh.into());
        self.refresh_created_at = created_at;
        self.refresh_expires_in = expires_in;
        self
    }

    /// Snapshot any [`TokenInfo`] implementation into a `Token`.
    #[must_use]
    pub fn from_info(info: &dyn TokenInfo) -> Self {
        Self {
            client_id: info.client_id().to_string(),
            user_id: info.user_id().to_string(),
            redirect_uri: info.redirect_uri().to_string(),
            scope: info.scope().to_string(),
            code: present(info.code()).map(str::to_string),
            code_created_at: info.code_created_at(),
            code_expires_in: info.code_expires_in(),
            access: present(info.access()).map(str::to_string),
            access_created_at: info.access_created_at(),
            access_expires_in: info.access_expires_in(),
            refresh: present(info.refresh()).map(str::to_string),
            refresh_created_at: info.refresh_created_at(),
            refresh_expires_in: info.refresh_expires_in(),
        }
    }

    /// Encode this token as the JSON payload stored in basic records.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_payload(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a token from a stored payload.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload is not a valid token.
    pub fn from_payload(payload: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

impl TokenInfo for Token {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn scope(&self) -> &str {
        &self.scope
    }

    fn code(&self) -> Option<&str> {
        present(self.code.as_deref())
    }

    fn code_created_at(&self) -> OffsetDateTime {
        self.code_created_at
    }

    fn code_expires_in(&self) -> Duration {
        self.code_expires_in
    }

    fn access(&self) -> Option<&str> {
        present(self.access.as_deref())
    }

    fn access_created_at(&self) -> OffsetDateTime {
        self.access_created_at
    }

    fn access_expires_in(&self) -> Duration {
        self.access_expires_in
    }

    fn refresh(&self) -> Option<&str> {
        present(self.refresh.as_deref())
    }

    fn refresh_created_at(&self) -> OffsetDateTime {
        self.refresh_created_at
    }

    fn refresh_expires_in(&self) -> Duration {
        self.refresh_expires_in
    }
}
