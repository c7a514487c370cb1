//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::get,
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        AuthState, api_auth_guard, auth_guard, get_log_in_page, get_log_out, get_sign_up_page,
        post_log_in, post_sign_up,
    },
    dashboard::get_dashboard_page,
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_add_transaction_page,
        get_expenses_page, get_transaction_endpoint, list_transactions_endpoint,
        post_add_transaction, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Pages that need a session redirect anonymous visitors to the log-in page,
/// while the JSON API answers them with `401 Unauthorized`.
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState::from_ref(&state);

    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page))
        .route(
            endpoints::SIGN_UP_VIEW,
            get(get_sign_up_page).post(post_sign_up),
        )
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page).post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out));

    let protected_pages = Router::new()
        .route(
            endpoints::ADD_TRANSACTION_VIEW,
            get(get_add_transaction_page).post(post_add_transaction),
        )
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_guard,
        ));

    let protected_api = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_API,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, api_auth_guard));

    unprotected_routes
        .merge(protected_pages)
        .merge(protected_api)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
