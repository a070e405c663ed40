//! Session store.
//!
//! Holds the signed-in user and their bearer token. Persistence follows the
//! same discipline as the cart: load once, write on every change after
//! hydration. The token and the profile live under separate keys; when the
//! session ends both keys are removed.

use std::sync::Arc;
use std::time::Duration;

use mangaverse_core::{UserId, UserRole};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::shell::{Notification, Route, Shell};
use crate::storage::{Storage, StorageError};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "userToken";

/// Storage key of the serialized user profile.
pub const USER_KEY: &str = "userInfo";

/// Delay between the login greeting and the redirect home.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

impl UserProfile {
    /// First word of the display name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub token: SecretString,
}

impl Session {
    pub fn new(user: UserProfile, token: impl Into<String>) -> Self {
        Self {
            user,
            token: SecretString::from(token.into()),
        }
    }
}

/// Client-side session state container.
pub struct AuthStore {
    storage: Arc<dyn Storage>,
    shell: Arc<dyn Shell>,
    session: Option<Session>,
    hydrated: bool,
    /// Cleared when the saved session could not be read, so it is never removed.
    persist: bool,
    tx: watch::Sender<Option<UserProfile>>,
}

impl AuthStore {
    /// Create an unauthenticated, not yet hydrated store.
    pub fn new(storage: Arc<dyn Storage>, shell: Arc<dyn Shell>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            storage,
            shell,
            session: None,
            hydrated: false,
            persist: true,
            tx,
        }
    }

    /// Create a store and immediately hydrate it.
    pub fn load(storage: Arc<dyn Storage>, shell: Arc<dyn Shell>) -> Self {
        let mut store = Self::new(storage, shell);
        store.hydrate();
        store
    }

    /// Restore a saved session. Only the first call has any effect.
    ///
    /// A saved profile that fails to parse is discarded together with its
    /// token and the store stays signed out. If storage cannot be read the
    /// store stays signed out and leaves the saved keys alone.
    pub fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }

        let saved = self
            .read(TOKEN_KEY)
            .and_then(|token| self.read(USER_KEY).map(|user| (token, user)));
        match saved {
            Ok((Some(token), Some(raw_user))) => {
                match serde_json::from_str::<UserProfile>(&raw_user) {
                    Ok(user) => {
                        debug!(user_id = %user.id, "session restored from storage");
                        self.session = Some(Session::new(user, token));
                    }
                    Err(e) => {
                        warn!(error = %e, "discarding corrupt saved session");
                        self.remove_saved();
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "failed to read saved session; sign-ins will not be saved");
                self.persist = false;
            }
        }

        self.hydrated = true;
        self.tx.send_replace(self.user().cloned());
    }

    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// True iff both a user and a token are present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The raw bearer token, for `Authorization` headers.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.expose_secret())
    }

    /// Observe the signed-in user.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.tx.subscribe()
    }

    /// Sign in: store the session, greet the user, refresh and head home.
    pub fn login(&mut self, session: Session) {
        let greeting = format!("Welcome back, {}!", session.user.first_name());
        info!(user_id = %session.user.id, "user logged in");
        self.set(Some(session));

        self.shell.notify(Notification::success(greeting));
        self.shell.refresh();
        self.shell.navigate_after(Route::Home, LOGIN_REDIRECT_DELAY);
    }

    /// Store a session without any user-facing effects.
    pub fn establish(&mut self, session: Session) {
        self.set(Some(session));
    }

    /// Sign out and head home.
    pub fn logout(&mut self) {
        info!("user logged out");
        self.set(None);

        self.shell
            .notify(Notification::success("You have been logged out."));
        self.shell.refresh();
        self.shell.navigate(Route::Home);
    }

    fn set(&mut self, session: Option<Session>) {
        match &session {
            Some(s) => set_sentry_user(&s.user.id, Some(&s.user.email)),
            None => clear_sentry_user(),
        }
        self.session = session;
        self.commit();
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get(key)?.filter(|v| !v.is_empty()))
    }

    fn remove_saved(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to clear saved session");
            }
        }
    }

    fn commit(&self) {
        self.tx.send_replace(self.user().cloned());

        if !self.hydrated || !self.persist {
            return;
        }
        let Some(session) = &self.session else {
            self.remove_saved();
            return;
        };
        match serde_json::to_string(&session.user) {
            Ok(json) => {
                let written = self
                    .storage
                    .set(USER_KEY, &json)
                    .and_then(|()| self.storage.set(TOKEN_KEY, session.token.expose_secret()));
                if let Err(e) = written {
                    warn!(error = %e, "failed to persist session");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize session"),
        }
    }
}
