//! Authentication middleware that validates the session cookie, extends sessions, and rejects anonymous requests.

use axum::{
    Json,
    extract::{FromRef, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use serde_json::json;
use time::Duration;

use crate::{
    AppState,
    auth::{
        invalidate_session_cookie, redirect::build_log_in_redirect_url, require_auth,
        session::extend_session,
    },
    flash::{FlashMessage, set_flash},
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts after the most recent authenticated request.
    pub session_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Run `request` for the session in `jar`, or answer with `on_unauthenticated`.
///
/// The session is placed into the request extensions and its expiry is
/// pushed forward on the way out.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
    on_unauthenticated: impl FnOnce(PrivateCookieJar, &Request) -> Response,
) -> Response {
    let session = match require_auth(&jar) {
        Ok(session) => session,
        Err(_) => return on_unauthenticated(jar, &request),
    };

    request.extensions_mut().insert(session.clone());
    let response = next.run(request).await;

    let jar = match extend_session(jar, &session, state.session_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending session: {error}. Leaving the session as is.");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();

    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function for the HTML pages that checks for a valid session.
///
/// The [crate::auth::Session] is placed into the request and the request executed normally if the
/// session is valid, otherwise the client is redirected to the log-in page with a flash message.
///
/// **Note**: Route handlers can use the function argument `Extension(session): Extension<Session>` to receive the session.
pub async fn auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, jar, request, next, |jar, request| {
        let redirect_url = build_log_in_redirect_url(request);
        let jar = set_flash(
            invalidate_session_cookie(jar),
            FlashMessage::error("Please log in to access this page."),
        );

        (jar, Redirect::to(&redirect_url)).into_response()
    })
    .await
}

/// Middleware function for the JSON API that checks for a valid session.
///
/// Anonymous requests get a `401 Unauthorized` JSON error instead of a redirect.
///
/// **Note**: Route handlers can use the function argument `Extension(session): Extension<Session>` to receive the session.
pub async fn api_auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, jar, request, next, |_, _| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not authenticated" })),
        )
            .into_response()
    })
    .await
}
