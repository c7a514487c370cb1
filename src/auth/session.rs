//! Defines the session stored in the private session cookie and the functions to read and write it.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{AuthError, User, UserID},
};

pub(crate) const COOKIE_SESSION: &str = "session";

/// The default duration for which a session is valid after the most recent request.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::minutes(30);

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the session expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The logged-in user for the current browser visit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the logged-in user.
    pub user_id: UserID,
    /// The name of the logged-in user, shown in the navigation bar.
    pub username: String,
    /// The session is rejected at and after this time.
    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    pub expires_at: OffsetDateTime,
}

impl Session {
    fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}

/// Start a session for `user` by adding the session cookie to the cookie jar.
///
/// The session expires `duration` from now, unless a later authenticated request extends it.
///
/// # Errors
///
/// Returns an [Error::InvalidSessionCookie] if the session could not be encoded.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    user: &User,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let session = Session {
        user_id: user.id,
        username: user.username.clone(),
        expires_at: OffsetDateTime::now_utc() + duration,
    };

    write_session(jar, &session)
}

fn write_session(jar: PrivateCookieJar, session: &Session) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(session)
        .map_err(|error| Error::InvalidSessionCookie(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, value))
            .path("/")
            .expires(session.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
///
/// Calling this on a jar without a session has the same result, so logging out twice is harmless.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the session from `jar`, the gate for every protected operation.
///
/// # Errors
///
/// Returns [AuthError::NotAuthenticated] if the session cookie is missing,
/// cannot be decrypted or decoded, or has expired.
pub fn require_auth(jar: &PrivateCookieJar) -> Result<Session, AuthError> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(AuthError::NotAuthenticated)?;

    let session: Session =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| AuthError::NotAuthenticated)?;

    if session.is_expired() {
        return Err(AuthError::NotAuthenticated);
    }

    Ok(session)
}

/// Set the expiry of `session` to the latest of UTC now plus `duration` and its current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
pub(crate) fn extend_session(
    jar: PrivateCookieJar,
    session: &Session,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidSessionCookie("session expiry overflowed".to_owned()))?;

    let extended = Session {
        expires_at: max(session.expires_at, new_expiry),
        ..session.clone()
    };

    write_session(jar, &extended)
}

#[cfg(test)]
mod session_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, UtcOffset, macros::datetime};

    use crate::{
        PasswordHash,
        auth::{AuthError, User, UserID},
    };

    use super::{
        COOKIE_SESSION, DEFAULT_SESSION_DURATION, Session, extend_session,
        invalidate_session_cookie, require_auth, set_session_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn test_user() -> User {
        User {
            id: UserID::new(1),
            username: "alice".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn serialise_session() {
        let session = Session {
            user_id: UserID::new(1),
            username: "alice".to_owned(),
            expires_at: datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC),
        };
        let expected = r#"{"user_id":1,"username":"alice","expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#;

        let actual = serde_json::to_string(&session).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_session_with_midnight_expiry() {
        let expected = Session {
            user_id: UserID::new(1),
            username: "alice".to_owned(),
            expires_at: datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC),
        };
        let session_string = r#"{"user_id":1,"username":"alice","expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let actual: Session = serde_json::from_str(session_string).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn can_set_and_read_session() {
        let jar = set_session_cookie(get_jar(), &test_user(), DEFAULT_SESSION_DURATION).unwrap();

        let session = require_auth(&jar).unwrap();

        assert_eq!(session.user_id, UserID::new(1));
        assert_eq!(session.username, "alice");
        assert_date_time_close!(
            session.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_SESSION_DURATION
        );
    }

    #[test]
    fn session_cookie_is_locked_down() {
        let jar = set_session_cookie(get_jar(), &test_user(), DEFAULT_SESSION_DURATION).unwrap();
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn require_auth_fails_without_cookie() {
        assert_eq!(require_auth(&get_jar()), Err(AuthError::NotAuthenticated));
    }

    #[test]
    fn require_auth_fails_on_expired_session() {
        let jar = set_session_cookie(get_jar(), &test_user(), Duration::seconds(-1)).unwrap();

        assert_eq!(require_auth(&jar), Err(AuthError::NotAuthenticated));
    }

    #[test]
    fn require_auth_fails_on_garbage_cookie() {
        let jar = get_jar().add(Cookie::new(COOKIE_SESSION, "FOOBAR"));

        assert_eq!(require_auth(&jar), Err(AuthError::NotAuthenticated));
    }

    #[test]
    fn can_extend_session() {
        let jar = set_session_cookie(get_jar(), &test_user(), Duration::seconds(5)).unwrap();
        let session = require_auth(&jar).unwrap();

        let jar = extend_session(jar, &session, Duration::minutes(10)).unwrap();
        let extended = require_auth(&jar).unwrap();

        assert_date_time_close!(
            extended.expires_at,
            OffsetDateTime::now_utc() + Duration::minutes(10)
        );
    }

    #[test]
    fn extend_session_never_shortens_it() {
        let jar = set_session_cookie(get_jar(), &test_user(), Duration::days(7)).unwrap();
        let session = require_auth(&jar).unwrap();

        let jar = extend_session(jar, &session, Duration::seconds(5)).unwrap();

        assert_eq!(require_auth(&jar).unwrap().expires_at, session.expires_at);
    }

    #[test]
    fn invalidate_session_is_idempotent() {
        let jar = set_session_cookie(get_jar(), &test_user(), DEFAULT_SESSION_DURATION).unwrap();

        let once = invalidate_session_cookie(jar);
        let twice = invalidate_session_cookie(invalidate_session_cookie(get_jar()));

        for jar in [once, twice] {
            let cookie = jar.get(COOKIE_SESSION).unwrap();
            assert_eq!(cookie.value(), "deleted");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert_eq!(require_auth(&jar), Err(AuthError::NotAuthenticated));
        }
    }
}
