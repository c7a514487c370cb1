//! Checks credentials for signing up and logging in.

use rusqlite::Connection;

use crate::{
    PasswordHash,
    auth::{AuthError, User, user::get_user_by_username},
};

/// Check the sign-up fields and hash `password` for a new user.
///
/// This does not touch the database, so callers can hash before taking the
/// connection lock. Store the result with [create_user](crate::auth::create_user).
///
/// # Errors
///
/// Returns a:
/// - [AuthError::MissingField] if `username` or `password` is empty,
/// - or [AuthError::Internal] if the password could not be hashed.
pub fn hash_new_password(
    username: &str,
    password: &str,
    password_hash_cost: u32,
) -> Result<PasswordHash, AuthError> {
    if username.is_empty() {
        return Err(AuthError::MissingField("Username"));
    }

    if password.is_empty() {
        return Err(AuthError::MissingField("Password"));
    }

    Ok(PasswordHash::new(password, password_hash_cost)?)
}

/// Find the user registered with `username` and check their `password`.
///
/// # Errors
///
/// Returns a:
/// - [AuthError::MissingField] if `username` or `password` is empty,
/// - [AuthError::UnknownUser] if no user is registered with `username`,
/// - [AuthError::BadPassword] if `password` does not match,
/// - or [AuthError::Internal] if the user could not be loaded or the hash could not be checked.
pub fn verify_credentials(
    username: &str,
    password: &str,
    connection: &Connection,
) -> Result<User, AuthError> {
    if username.is_empty() {
        return Err(AuthError::MissingField("Username"));
    }

    if password.is_empty() {
        return Err(AuthError::MissingField("Password"));
    }

    let user = get_user_by_username(username, connection)?;

    let is_password_valid = user.password_hash.verify(password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        crate::Error::HashingError(error.to_string())
    })?;

    if is_password_valid {
        Ok(user)
    } else {
        Err(AuthError::BadPassword)
    }
}

#[cfg(test)]
mod credentials_tests {
    use rusqlite::Connection;

    use crate::{
        auth::{AuthError, User, create_user},
        db::initialize,
    };

    use super::{hash_new_password, verify_credentials};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn sign_up_user(
        username: &str,
        password: &str,
        cost: u32,
        conn: &Connection,
    ) -> Result<User, AuthError> {
        let password_hash = hash_new_password(username, password, cost)?;

        create_user(username, password_hash, conn)
    }

    #[test]
    fn log_in_succeeds_right_after_sign_up() {
        let conn = get_test_connection();
        let cases = [("alice", "pw1"), ("bob", "a much longer passphrase"), ("ü", "ß")];

        for (username, password) in cases {
            let signed_up = sign_up_user(username, password, 4, &conn).unwrap();
            let logged_in = verify_credentials(username, password, &conn).unwrap();

            assert_eq!(signed_up, logged_in);
        }
    }

    #[test]
    fn sign_up_fails_on_empty_username() {
        let result = hash_new_password("", "pw1", 4);

        assert_eq!(result, Err(AuthError::MissingField("Username")));
    }

    #[test]
    fn sign_up_fails_on_empty_password() {
        let result = hash_new_password("alice", "", 4);

        assert_eq!(result, Err(AuthError::MissingField("Password")));
    }

    #[test]
    fn new_password_hash_verifies_password() {
        let password_hash = hash_new_password("alice", "pw1", 4).unwrap();

        assert_ne!(password_hash.as_ref(), "pw1");
        assert!(password_hash.verify("pw1").unwrap());
        assert!(!password_hash.verify("pw2").unwrap());
    }

    #[test]
    fn sign_up_fails_on_duplicate_username() {
        let conn = get_test_connection();
        sign_up_user("alice", "pw1", 4, &conn).unwrap();

        let result = sign_up_user("alice", "pw2", 4, &conn);

        assert_eq!(result, Err(AuthError::DuplicateUsername("alice".to_owned())));
    }

    #[test]
    fn log_in_fails_on_unknown_user() {
        let conn = get_test_connection();

        let result = verify_credentials("nobody", "pw1", &conn);

        assert_eq!(result, Err(AuthError::UnknownUser));
    }

    #[test]
    fn log_in_fails_on_wrong_password() {
        let conn = get_test_connection();
        sign_up_user("alice", "pw1", 4, &conn).unwrap();

        let result = verify_credentials("alice", "wrong", &conn);

        assert_eq!(result, Err(AuthError::BadPassword));
    }

    #[test]
    fn log_in_fails_on_missing_password() {
        let conn = get_test_connection();
        sign_up_user("alice", "pw1", 4, &conn).unwrap();

        let result = verify_credentials("alice", "", &conn);

        assert_eq!(result, Err(AuthError::MissingField("Password")));
    }
}
