use std::fmt;

use serde::Serialize;

use crate::browsing::{BrowsingBuffer, DEFAULT_BROWSING_CAPACITY};
use crate::domain::user::{User, UserId};
use crate::errors::StoreError;
use crate::index::ChainedIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    LoggedOut,
    LoggedIn(UserId),
}

/// The session state an operation needs before it may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRequirement {
    LoggedIn,
    LoggedOut,
}

impl fmt::Display for SessionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedIn => f.write_str("logged in"),
            Self::LoggedOut => f.write_str("logged out"),
        }
    }
}

/// One caller's login slot plus the browsing history recorded during it.
///
/// Sessions are plain values owned by the caller; the store never holds one.
#[derive(Clone, Debug)]
pub struct Session {
    state: SessionState,
    history: BrowsingBuffer,
    clear_history_on_logout: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_BROWSING_CAPACITY)
    }
}

impl Session {
    pub fn new(browsing_capacity: usize) -> Self {
        Self {
            state: SessionState::LoggedOut,
            history: BrowsingBuffer::new(browsing_capacity),
            clear_history_on_logout: true,
        }
    }

    /// When `clear` is false the browsing history outlives logout and carries
    /// over to the next user of this session.
    pub fn clear_history_on_logout(mut self, clear: bool) -> Self {
        self.clear_history_on_logout = clear;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_user(&self) -> Option<UserId> {
        match self.state {
            SessionState::LoggedIn(user_id) => Some(user_id),
            SessionState::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn history(&self) -> &BrowsingBuffer {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut BrowsingBuffer {
        &mut self.history
    }

    pub fn login(
        &mut self,
        users: &ChainedIndex<UserId, User>,
        user_id: UserId,
        secret: &str,
    ) -> Result<UserId, StoreError> {
        self.require_logged_out("login")?;

        let authenticated = users.lookup(&user_id).is_some_and(|user| user.secret.matches(secret));
        if !authenticated {
            tracing::debug!(
                event_name = "store.session.login_rejected",
                user_id = user_id.0,
                "login rejected"
            );
            return Err(StoreError::InvalidCredentials);
        }

        self.state = SessionState::LoggedIn(user_id);
        tracing::info!(event_name = "store.session.logged_in", user_id = user_id.0, "user logged in");
        Ok(user_id)
    }

    /// Returns the user that was logged out.
    pub fn logout(&mut self) -> Result<UserId, StoreError> {
        let user_id = self.require_logged_in("logout")?;

        self.state = SessionState::LoggedOut;
        if self.clear_history_on_logout {
            self.history.clear();
        }
        tracing::info!(
            event_name = "store.session.logged_out",
            user_id = user_id.0,
            "user logged out"
        );
        Ok(user_id)
    }

    pub fn require_logged_in(&self, operation: &'static str) -> Result<UserId, StoreError> {
        self.current_user().ok_or(StoreError::InvalidSessionState {
            operation,
            required: SessionRequirement::LoggedIn,
        })
    }

    pub fn require_logged_out(&self, operation: &'static str) -> Result<(), StoreError> {
        match self.state {
            SessionState::LoggedOut => Ok(()),
            SessionState::LoggedIn(_) => Err(StoreError::InvalidSessionState {
                operation,
                required: SessionRequirement::LoggedOut,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionRequirement, SessionState};
    use crate::domain::user::{Secret, User, UserId};
    use crate::errors::StoreError;
    use crate::index::ChainedIndex;

    fn users() -> ChainedIndex<UserId, User> {
        let mut users = ChainedIndex::with_defaults("user");
        for (id, name, secret) in [(1, "ada", "lovelace"), (2, "alan", "turing")] {
            let user = User {
                id: UserId(id),
                name: name.to_string(),
                email: format!("{name}@example.com"),
                secret: Secret::new(secret),
            };
            users.insert(user.id, user).expect("seed user");
        }
        users
    }

    #[test]
    fn login_with_correct_secret_moves_to_logged_in() {
        let users = users();
        let mut session = Session::default();

        let user_id = session.login(&users, UserId(1), "lovelace").expect("login");
        assert_eq!(user_id, UserId(1));
        assert_eq!(session.state(), SessionState::LoggedIn(UserId(1)));
    }

    #[test]
    fn wrong_secret_or_unknown_user_leaves_session_logged_out() {
        let users = users();
        let mut session = Session::default();

        let wrong_secret = session.login(&users, UserId(1), "turing").expect_err("bad secret");
        let unknown_user = session.login(&users, UserId(99), "lovelace").expect_err("unknown user");

        assert_eq!(wrong_secret, StoreError::InvalidCredentials);
        assert_eq!(unknown_user, StoreError::InvalidCredentials);
        assert_eq!(session.state(), SessionState::LoggedOut);
    }

    #[test]
    fn login_while_logged_in_is_rejected_without_state_change() {
        let users = users();
        let mut session = Session::default();
        session.login(&users, UserId(1), "lovelace").expect("login");

        let error = session.login(&users, UserId(2), "turing").expect_err("second login");
        assert_eq!(
            error,
            StoreError::InvalidSessionState {
                operation: "login",
                required: SessionRequirement::LoggedOut
            }
        );
        assert_eq!(session.current_user(), Some(UserId(1)));
    }

    #[test]
    fn logout_while_logged_out_reports_no_session() {
        let mut session = Session::default();

        let error = session.logout().expect_err("no session");
        assert_eq!(error.user_message(), "No user is currently logged in.");
        assert_eq!(session.state(), SessionState::LoggedOut);
    }

    #[test]
    fn logout_clears_history_by_default() {
        let users = users();
        let mut session = Session::default();
        session.login(&users, UserId(1), "lovelace").expect("login");
        session.history_mut().record("books").expect("record");

        assert_eq!(session.logout().expect("logout"), UserId(1));
        assert!(session.history().is_empty());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn history_can_be_retained_across_logins() {
        let users = users();
        let mut session = Session::new(3).clear_history_on_logout(false);
        session.login(&users, UserId(1), "lovelace").expect("login");
        session.history_mut().record("books").expect("record");
        session.logout().expect("logout");

        session.login(&users, UserId(2), "turing").expect("login as second user");
        assert_eq!(session.history().snapshot(), ["books"]);
        assert_eq!(session.history().capacity(), 3);
    }
}
