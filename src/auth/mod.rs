//! User accounts, password hashing and cookie-based sessions.
//!
//! A session is created by signing up or logging in, and it is checked by the
//! auth guards for every protected route. Handlers behind a guard receive the
//! [Session] through `Extension<Session>`.

mod credentials;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod session;
mod sign_up;
mod user;

pub use credentials::{hash_new_password, verify_credentials};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, api_auth_guard, auth_guard};
pub use password::PasswordHash;
pub use session::{
    DEFAULT_SESSION_DURATION, Session, invalidate_session_cookie, require_auth, set_session_cookie,
};
pub use sign_up::{get_sign_up_page, post_sign_up};
pub use user::{User, UserID, create_user, create_user_table};

#[cfg(test)]
pub(crate) use session::COOKIE_SESSION;
#[cfg(test)]
pub use user::get_user_by_username;

use crate::Error;

/// The ways authenticating a user can fail.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    /// A required form field was left empty.
    ///
    /// Holds the user-facing name of the field, e.g. "Username".
    #[error("{0} is required.")]
    MissingField(&'static str),

    /// Another user already registered this username.
    #[error("User {0} is already registered.")]
    DuplicateUsername(String),

    /// No user is registered with the given username.
    #[error("no user is registered with that username")]
    UnknownUser,

    /// The password does not match the stored hash.
    #[error("the password is incorrect")]
    BadPassword,

    /// The request does not carry a valid, unexpired session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// An infrastructure error occurred while checking credentials.
    #[error(transparent)]
    Internal(#[from] Error),
}

impl From<rusqlite::Error> for AuthError {
    fn from(error: rusqlite::Error) -> Self {
        AuthError::Internal(error.into())
    }
}
