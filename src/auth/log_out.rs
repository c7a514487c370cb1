//! Log-out route handler that invalidates the session cookie and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::invalidate_session_cookie,
    endpoints,
    flash::{FlashMessage, set_flash},
};

/// Invalidate the session cookie and redirect the client to the dashboard.
///
/// Works the same with or without a session, so logging out twice is harmless.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_session_cookie(jar);
    let jar = set_flash(jar, FlashMessage::success("You have been logged out."));

    (jar, Redirect::to(endpoints::ROOT)).into_response()
}
