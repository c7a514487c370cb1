//! The sign-up page and the handler that registers a new user.
//!
//! Signing up logs the new user in straight away.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
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
    auth::{AuthError, create_user, hash_new_password, set_session_cookie},
    endpoints,
    flash::{FlashMessage, set_flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, base, link, log_in_sign_up, password_input,
        username_input,
    },
    internal_server_error::InternalServerError,
    navigation::NavBar,
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the new session lasts without further requests.
    pub session_duration: Duration,
    /// The bcrypt cost for the new password hash.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

fn sign_up_form(username: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::SIGN_UP_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (username_input(username))
            (password_input(None))

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Sign up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

fn sign_up_page(username: &str, error_message: Option<&str>, flash: Option<FlashMessage>) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::SIGN_UP_VIEW, None).into_html())
        (log_in_sign_up("Create an account", &sign_up_form(username, error_message)))
    };

    base("Sign Up", flash, &content)
}

/// Display the sign-up page.
pub async fn get_sign_up_page(jar: PrivateCookieJar) -> Response {
    let (jar, flash) = take_flash(jar);

    (jar, sign_up_page("", None, flash)).into_response()
}

/// The raw data entered by the user in the sign-up form.
#[derive(Clone, Deserialize)]
pub struct SignUpData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Handler for sign-up requests via the POST method.
///
/// A new user is logged in and redirected to the dashboard. Otherwise the
/// form is shown again with the reason the account could not be created.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<SignUpData>,
) -> Response {
    let result = hash_new_password(
        &user_data.username,
        &user_data.password,
        state.password_hash_cost,
    )
    .and_then(|password_hash| {
        let connection = lock_connection(&state.db_connection)?;
        create_user(&user_data.username, password_hash, &connection)
    });

    let user = match result {
        Ok(user) => user,
        Err(error @ (AuthError::MissingField(_) | AuthError::DuplicateUsername(_))) => {
            return sign_up_page(&user_data.username, Some(&error.to_string()), None)
                .into_response();
        }
        Err(AuthError::Internal(error)) => return error.into_response(),
        Err(error) => {
            tracing::error!("Unexpected error while signing up: {error}");
            return InternalServerError::default().into_response();
        }
    };

    tracing::info!("Registered user {} as {}", user.username, user.id);

    let jar = match set_session_cookie(jar, &user, state.session_duration) {
        Ok(jar) => jar,
        Err(error) => return error.into_response(),
    };
    let jar = set_flash(jar, FlashMessage::success("Account created successfully!"));

    (jar, Redirect::to(endpoints::ROOT)).into_response()
}
