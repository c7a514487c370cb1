//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The rest of the auth module handles the lower level credential and cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState,
    app_state::lock_connection,
    auth::{
        AuthError, redirect::normalize_redirect_url, set_session_cookie, verify_credentials,
    },
    endpoints,
    flash::{FlashMessage, set_flash, take_flash},
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_sign_up, password_input, username_input},
    internal_server_error::InternalServerError,
    navigation::NavBar,
};

/// Shown for both an unknown username and a wrong password.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the new session lasts without further requests.
    pub session_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

fn log_in_form(username: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_VIEW)
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (username_input(username))
            (password_input(error_message))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                (link(endpoints::SIGN_UP_VIEW, "Sign up here"))
            }
        }
    }
}

fn log_in_page(
    username: &str,
    error_message: Option<&str>,
    redirect_url: Option<&str>,
    flash: Option<FlashMessage>,
) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::LOG_IN_VIEW, None).into_html())
        (log_in_sign_up("Log in to your account", &log_in_form(username, error_message, redirect_url)))
    };

    base("Log In", flash, &content)
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(
    jar: PrivateCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let (jar, flash) = take_flash(jar);

    (jar, log_in_page("", None, redirect_url.as_deref(), flash)).into_response()
}

/// The raw data entered by the user in the log-in form.
///
/// Missing fields deserialize as empty strings so that they are reported
/// in the form like any other validation error.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client is redirected to the
/// dashboard page, or to the page they were sent away from.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let result = match lock_connection(&state.db_connection) {
        Ok(connection) => {
            verify_credentials(&user_data.username, &user_data.password, &connection)
        }
        Err(error) => return error.into_response(),
    };

    let user = match result {
        Ok(user) => user,
        Err(AuthError::UnknownUser | AuthError::BadPassword) => {
            return log_in_page(
                &user_data.username,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                redirect_url,
                None,
            )
            .into_response();
        }
        Err(error @ AuthError::MissingField(_)) => {
            return log_in_page(
                &user_data.username,
                Some(&error.to_string()),
                redirect_url,
                None,
            )
            .into_response();
        }
        Err(AuthError::Internal(error)) => return error.into_response(),
        Err(error) => {
            tracing::error!("Unexpected error while logging in: {error}");
            return InternalServerError::default().into_response();
        }
    };

    tracing::info!("User {} logged in", user.id);

    let jar = match set_session_cookie(jar, &user, state.session_duration) {
        Ok(jar) => jar,
        Err(error) => return error.into_response(),
    };
    let jar = set_flash(jar, FlashMessage::success("Logged in successfully!"));

    (jar, Redirect::to(redirect_url.unwrap_or(endpoints::ROOT))).into_response()
}
