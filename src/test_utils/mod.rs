#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use rusqlite::Connection;

use crate::AppState;

pub(crate) use form::{
    assert_form_action, assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button, must_get_form,
};
pub(crate) use html::{assert_valid_html, get_flash_message, parse_html_document, select_text};
pub(crate) use http::{assert_content_type, assert_redirect, assert_status_ok, get_header};

/// An [AppState] over a fresh in-memory database with a cheap bcrypt cost.
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "42")
        .expect("Could not create app state")
        .with_password_hash_cost(4)
}
