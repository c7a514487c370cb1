//! The page with the form for adding a transaction, and the handler for its submissions.

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use time::OffsetDateTime;

use crate::{
    app_state::lock_connection,
    auth::Session,
    endpoints,
    flash::{FlashMessage, set_flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    transaction::{
        core::{TransactionState, create_transaction},
        models::{DATE_FORMAT, StoreError, TransactionInput},
    },
};

fn add_transaction_form(input: &TransactionInput, error_message: Option<&str>) -> Markup {
    let is_expense = input.transaction_type != "income";

    html! {
        form
            method="post"
            action=(endpoints::ADD_TRANSACTION_VIEW)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "Title" }
                input
                    type="text"
                    name="title"
                    id="title"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(input.title);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description (optional)" }
                input
                    type="text"
                    name="description"
                    id="description"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(input.description);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    min="0.01"
                    max="999999999999.99"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(input.amount);
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select name="type" id="type" class=(FORM_TEXT_INPUT_STYLE) required
                {
                    option value="expense" selected[is_expense] { "Expense" }
                    option value="income" selected[!is_expense] { "Income" }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                input
                    type="date"
                    name="date"
                    id="date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(input.date);
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Add Transaction"
            }
        }
    }
}

fn add_transaction_page(
    username: &str,
    input: &TransactionInput,
    error_message: Option<&str>,
    flash: Option<FlashMessage>,
) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::ADD_TRANSACTION_VIEW, Some(username)).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Add Transaction" }
            (add_transaction_form(input, error_message))
        }
    };

    base("Add Transaction", flash, &content)
}

/// Renders the page for adding a transaction, with today's date filled in.
pub async fn get_add_transaction_page(
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Response {
    let today = OffsetDateTime::now_utc().date();
    let input = TransactionInput {
        transaction_type: "expense".to_owned(),
        date: today.format(DATE_FORMAT).unwrap_or_default(),
        ..Default::default()
    };
    let (jar, flash) = take_flash(jar);

    (
        jar,
        add_transaction_page(&session.username, &input, None, flash),
    )
        .into_response()
}

/// A route handler for adding a transaction, redirects to the dashboard on success.
///
/// Invalid input is shown again in the form along with the reason it was rejected.
pub async fn post_add_transaction(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
    Form(input): Form<TransactionInput>,
) -> Response {
    let new_transaction = match input.validate() {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            return add_transaction_page(&session.username, &input, Some(&error.to_string()), None)
                .into_response();
        }
    };

    let result = match lock_connection(&state.db_connection) {
        Ok(connection) => create_transaction(session.user_id, &new_transaction, &connection),
        Err(error) => return error.into_response(),
    };

    match result {
        Ok(transaction) => {
            tracing::debug!(
                "User {} added transaction {}",
                session.user_id,
                transaction.id
            );
            let jar = set_flash(jar, FlashMessage::success("Transaction added successfully!"));

            (jar, Redirect::to(endpoints::ROOT)).into_response()
        }
        Err(StoreError::Internal(error)) => error.into_response(),
        Err(error) => {
            add_transaction_page(&session.username, &input, Some(&error.to_string()), None)
                .into_response()
        }
    }
}
