//! One-shot notices that survive a redirect.
//!
//! A handler stores a [FlashMessage] in a private cookie and the next page
//! that renders takes it out of the jar again, so each message is shown once.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

pub(crate) const COOKIE_FLASH: &str = "flash";

/// Whether a flash message reports a success or a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    /// The previous action succeeded.
    Success,
    /// The previous action could not be completed.
    Error,
}

/// A message for the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Decides how the message is styled.
    pub kind: FlashKind,
    /// The text shown to the user.
    pub message: String,
}

impl FlashMessage {
    /// A message announcing that an action succeeded.
    pub fn success(message: &str) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.to_owned(),
        }
    }

    /// A message explaining why an action did not happen.
    pub fn error(message: &str) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.to_owned(),
        }
    }

    /// Render the message as a banner.
    pub fn into_html(self) -> Markup {
        let (kind, style) = match self.kind {
            FlashKind::Success => (
                "success",
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400",
            ),
            FlashKind::Error => (
                "error",
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400",
            ),
        };

        html! {
            div class="w-full max-w-md mx-auto px-4 pt-4"
            {
                div class=(style) role="alert" data-flash=(kind)
                {
                    (self.message)
                }
            }
        }
    }
}

/// Store `message` so that the next rendered page shows it.
///
/// A message that is already waiting is replaced.
pub fn set_flash(jar: PrivateCookieJar, message: FlashMessage) -> PrivateCookieJar {
    let value = match serde_json::to_string(&message) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("Could not encode flash message {message:?}: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((COOKIE_FLASH, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Remove the waiting flash message from `jar`, if any.
///
/// The returned jar must be part of the response, otherwise the message is
/// shown again on the following page.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<FlashMessage>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let message = serde_json::from_str(cookie.value_trimmed())
        .inspect_err(|error| tracing::warn!("Discarding unreadable flash message: {error}"))
        .ok();

    let jar = jar.remove(
        Cookie::build((COOKIE_FLASH, ""))
            .path("/")
            .max_age(Duration::ZERO),
    );

    (jar, message)
}

#[cfg(test)]
mod flash_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};

    use super::{COOKIE_FLASH, FlashKind, FlashMessage, set_flash, take_flash};

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        PrivateCookieJar::new(Key::from(&hash))
    }

    #[test]
    fn take_returns_message_once() {
        let jar = set_flash(get_jar(), FlashMessage::success("Logged in successfully!"));

        let (jar, message) = take_flash(jar);
        let (_, second) = take_flash(jar);

        assert_eq!(
            message,
            Some(FlashMessage {
                kind: FlashKind::Success,
                message: "Logged in successfully!".to_owned()
            })
        );
        assert_eq!(second, None);
    }

    #[test]
    fn take_without_message_returns_none() {
        let (_, message) = take_flash(get_jar());

        assert_eq!(message, None);
    }

    #[test]
    fn later_message_replaces_earlier_one() {
        let jar = set_flash(get_jar(), FlashMessage::success("first"));
        let jar = set_flash(jar, FlashMessage::error("second"));

        let (_, message) = take_flash(jar);

        assert_eq!(message, Some(FlashMessage::error("second")));
    }

    #[test]
    fn unreadable_message_is_dropped() {
        let jar = get_jar().add(Cookie::new(COOKIE_FLASH, "not json"));

        let (jar, message) = take_flash(jar);

        assert_eq!(message, None);
        assert!(jar.get(COOKIE_FLASH).is_none());
    }

    #[test]
    fn renders_message_text() {
        let html = FlashMessage::error("Please log in to access this page.")
            .into_html()
            .into_string();

        assert!(html.contains("Please log in to access this page."));
        assert!(html.contains(r#"data-flash="error""#));
    }
}
