//! Authentication state shared by every command.
//!
//! # Design
//! - The session is read once at startup; a missing or unreadable entry means
//!   guest, never an error.
//! - Header encoding stays here so the API client only ever sees a `HeaderMap`.
//! - Affordances (who may add torrents or comment) derive from "is a user
//!   present" alone; the role is informational.

use anyhow::{Context, anyhow};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use seedshelf_api_models::{AuthResponse, User};

use crate::client::{CliError, CliResult};
use crate::storage::KeyValueStore;

pub(crate) const TOKEN_KEY: &str = "seedshelf.token";
pub(crate) const USER_KEY: &str = "seedshelf.user";

/// Authenticated identity held by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) token: String,
    pub(crate) user: User,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

/// Auth-gated affordances derived from the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Controls {
    pub(crate) can_add_torrent: bool,
    pub(crate) can_comment: bool,
    pub(crate) show_login: bool,
    pub(crate) show_logout: bool,
}

impl Controls {
    const fn for_presence(signed_in: bool) -> Self {
        Self {
            can_add_torrent: signed_in,
            can_comment: signed_in,
            show_login: !signed_in,
            show_logout: signed_in,
        }
    }
}

/// In-memory session mirrored into a persistent key/value store.
pub(crate) struct AuthState {
    store: Box<dyn KeyValueStore>,
    session: Option<Session>,
}

impl AuthState {
    /// Read the persisted session, falling back to guest on any problem.
    pub(crate) fn load_from_storage(store: Box<dyn KeyValueStore>) -> Self {
        let session = match read_session(store.as_ref()) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(
                    error = %format!("{err:#}"),
                    "ignoring unreadable session; continuing as guest"
                );
                None
            }
        };
        if let Some(session) = &session {
            tracing::debug!(username = %session.user.username, "restored session");
        }
        Self { store, session }
    }

    /// Replace the session in memory and in the store.
    pub(crate) fn save(&mut self, token: String, user: User) -> CliResult<()> {
        let encoded = serde_json::to_string(&user)
            .map_err(|err| CliError::failure(anyhow!("failed to encode user: {err}")))?;
        self.store.set(TOKEN_KEY, &token)?;
        self.store.set(USER_KEY, &encoded)?;
        self.session = Some(Session { token, user });
        Ok(())
    }

    /// Return to guest state and drop the persisted entries.
    pub(crate) fn clear(&mut self) -> CliResult<()> {
        self.session = None;
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }

    /// Backing store, shared with other persisted client state.
    pub(crate) fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub(crate) const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) const fn controls(&self) -> Controls {
        Controls::for_presence(self.is_authenticated())
    }

    /// Return `extra` plus a bearer `Authorization` header when signed in.
    pub(crate) fn auth_headers(&self, mut extra: HeaderMap) -> HeaderMap {
        let Some(session) = &self.session else {
            return extra;
        };
        match HeaderValue::from_str(&format!("Bearer {}", session.token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                extra.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("session token is not a valid header value; sending without it");
            }
        }
        extra
    }

    /// Fail with a validation error unless a user is signed in.
    pub(crate) fn require_session(&self, action: &str) -> CliResult<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| CliError::validation(format!("log in to {action} (seedshelf login)")))
    }
}

fn read_session(store: &dyn KeyValueStore) -> anyhow::Result<Option<Session>> {
    let token = store
        .get(TOKEN_KEY)
        .context("failed to read persisted token")?
        .filter(|token| !token.trim().is_empty());
    let user = store.get(USER_KEY).context("failed to read persisted user")?;

    match (token, user) {
        (Some(token), Some(user)) => {
            let user: User =
                serde_json::from_str(&user).context("persisted user is not valid JSON")?;
            Ok(Some(Session { token, user }))
        }
        (None, None) => Ok(None),
        _ => Err(anyhow!("persisted session is incomplete")),
    }
}
