//! This file defines the dashboard route and its handlers.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    app_state::lock_connection,
    auth::{Session, require_auth},
    endpoints,
    flash::{FlashMessage, take_flash},
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency, link},
    navigation::NavBar,
    transaction::{
        StoreError, Transaction, TransactionState, get_balance, list_transactions,
        transactions_table,
    },
};

/// How many transactions the dashboard shows.
const RECENT_TRANSACTION_COUNT: u32 = 5;

fn balance_card(balance: Decimal) -> Markup {
    let style = if balance.is_sign_negative() && !balance.is_zero() {
        "text-4xl font-bold text-red-700 dark:text-red-300"
    } else {
        "text-4xl font-bold text-green-700 dark:text-green-300"
    };

    html! {
        div class="w-full p-6 bg-white rounded-lg shadow dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold text-gray-500 dark:text-gray-400" { "Balance" }
            p id="balance" class=(style) { (format_currency(balance)) }
        }
    }
}

fn recent_transactions(transactions: &[Transaction]) -> Markup {
    html! {
        section class="space-y-4 w-full"
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h2 class="text-xl font-bold" { "Recent Transactions" }

                @if !transactions.is_empty() {
                    a href=(endpoints::EXPENSES_VIEW) class=(LINK_STYLE) { "View all" }
                }
            }

            @if transactions.is_empty() {
                p id="empty-state" class="text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet. "
                    (link(endpoints::ADD_TRANSACTION_VIEW, "Add your first transaction"))
                    "."
                }
            } @else {
                (transactions_table(transactions, false))
            }
        }
    }
}

fn anonymous_welcome() -> Markup {
    html! {
        section class="space-y-4 w-full"
        {
            h2 class="text-xl font-bold" { "Welcome to MoneyPal" }

            p id="empty-state" class="text-gray-500 dark:text-gray-400"
            {
                (link(endpoints::LOG_IN_VIEW, "Log in"))
                " or "
                (link(endpoints::SIGN_UP_VIEW, "sign up"))
                " to start tracking your income and expenses."
            }
        }
    }
}

fn dashboard_view(
    session: Option<&Session>,
    balance: Decimal,
    transactions: &[Transaction],
    flash: Option<FlashMessage>,
) -> Markup {
    let username = session.map(|session| session.username.as_str());

    let content = html! {
        (NavBar::new(endpoints::ROOT, username).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-8 w-full lg:max-w-5xl"
            {
                (balance_card(balance))

                @if session.is_some() {
                    (recent_transactions(transactions))
                } @else {
                    (anonymous_welcome())
                }
            }
        }
    };

    base("Dashboard", flash, &content)
}

/// Display the balance and the most recent transactions of the logged-in user.
///
/// Visitors without a session see a zero balance and links to log in or sign up.
pub async fn get_dashboard_page(
    State(state): State<TransactionState>,
    jar: PrivateCookieJar,
) -> Response {
    let session = require_auth(&jar).ok();
    let (jar, flash) = take_flash(jar);

    let Some(session) = session else {
        return (jar, dashboard_view(None, Decimal::ZERO, &[], flash)).into_response();
    };

    let summary = lock_connection(&state.db_connection)
        .map_err(StoreError::from)
        .and_then(|connection| {
            let balance = get_balance(session.user_id, &connection)?;
            let transactions =
                list_transactions(session.user_id, Some(RECENT_TRANSACTION_COUNT), &connection)?;

            Ok((balance, transactions))
        });

    match summary {
        Ok((balance, transactions)) => (
            jar,
            dashboard_view(Some(&session), balance, &transactions, flash),
        )
            .into_response(),
        Err(StoreError::Internal(error)) => error.into_response(),
        Err(error) => {
            tracing::error!("Could not load the dashboard for {}: {error}", session.user_id);
            crate::Error::NotFound.into_response()
        }
    }
}
