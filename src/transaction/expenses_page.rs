//! The page listing every transaction of the logged-in user.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    app_state::lock_connection,
    auth::Session,
    endpoints,
    flash::{FlashMessage, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    transaction::{
        core::{TransactionState, list_transactions},
        models::{StoreError, Transaction},
        view::transactions_table,
    },
};

/// The dialog `static/app.js` fills in to edit a transaction through the JSON API.
fn edit_dialog() -> Markup {
    html! {
        dialog id="edit-dialog" class="rounded-lg shadow p-6 w-full max-w-md bg-white dark:bg-gray-800"
        {
            form id="edit-form" method="dialog" class="space-y-4"
            {
                h2 class="text-lg font-bold text-gray-900 dark:text-white" { "Edit Transaction" }

                input type="hidden" id="edit-url";

                div
                {
                    label for="edit-title" class=(FORM_LABEL_STYLE) { "Title" }
                    input type="text" id="edit-title" name="title" class=(FORM_TEXT_INPUT_STYLE) required;
                }

                div
                {
                    label for="edit-description" class=(FORM_LABEL_STYLE) { "Description" }
                    input type="text" id="edit-description" name="description" class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="edit-amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input
                        type="number"
                        id="edit-amount"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        max="999999999999.99"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                div
                {
                    label for="edit-type" class=(FORM_LABEL_STYLE) { "Type" }
                    select id="edit-type" name="type" class=(FORM_TEXT_INPUT_STYLE) required
                    {
                        option value="expense" { "Expense" }
                        option value="income" { "Income" }
                    }
                }

                div
                {
                    label for="edit-date" class=(FORM_LABEL_STYLE) { "Date" }
                    input type="date" id="edit-date" name="date" class=(FORM_TEXT_INPUT_STYLE) required;
                }

                p id="edit-error" class="text-red-500 text-base hidden" {}

                div class="flex gap-4"
                {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                    button type="button" id="edit-cancel" class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
                }
            }
        }
    }
}

fn expenses_page(
    username: &str,
    transactions: &[Transaction],
    flash: Option<FlashMessage>,
) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::EXPENSES_VIEW, Some(username)).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::ADD_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                @if transactions.is_empty() {
                    p id="empty-state" class="text-gray-500 dark:text-gray-400"
                    {
                        "No transactions yet."
                    }
                } @else {
                    (transactions_table(transactions, true))
                }
            }
        }

        (edit_dialog())
    };

    base("Transactions", flash, &content)
}

/// Renders the full list of the user's transactions, newest first.
pub async fn get_expenses_page(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Response {
    let transactions = match lock_connection(&state.db_connection) {
        Ok(connection) => list_transactions(session.user_id, None, &connection),
        Err(error) => return error.into_response(),
    };

    let transactions = match transactions {
        Ok(transactions) => transactions,
        Err(StoreError::Internal(error)) => return error.into_response(),
        Err(error) => {
            tracing::error!("Could not list transactions: {error}");
            return crate::Error::NotFound.into_response();
        }
    };

    let (jar, flash) = take_flash(jar);

    (jar, expenses_page(&session.username, &transactions, flash)).into_response()
}
