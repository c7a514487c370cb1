//! HTML rendering of transaction tables.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, format_currency,
    },
    transaction::models::{DATE_FORMAT, Transaction, TransactionType},
};

fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Expense => "text-red-700 dark:text-red-300",
        TransactionType::Income => "text-green-700 dark:text-green-300",
    }
}

/// The amount with a sign showing whether it was earned or spent, e.g. "+$100.00".
pub(crate) fn format_signed_amount(transaction: &Transaction) -> String {
    let formatted = format_currency(transaction.amount.as_decimal());

    match transaction.transaction_type {
        TransactionType::Income => format!("+{formatted}"),
        TransactionType::Expense => format!("-{formatted}"),
    }
}

fn format_date(transaction: &Transaction) -> String {
    transaction
        .date
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string())
}

/// A table of `transactions` in the given order.
///
/// With `with_actions` set, each row gets edit and delete buttons that are
/// wired up by `static/app.js`.
pub(crate) fn transactions_table(transactions: &[Transaction], with_actions: bool) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md rounded w-full"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        @if with_actions {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class={(TABLE_ROW_STYLE) " transaction-item"} data-id=(transaction.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (format_date(transaction)) }
                            td class=(TABLE_CELL_STYLE) { (transaction.title) }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td
                                class={(TABLE_CELL_STYLE) " text-right " (amount_class(transaction.transaction_type))}
                                data-type=(transaction.transaction_type.as_str())
                            {
                                (format_signed_amount(transaction))
                            }

                            @if with_actions {
                                td class={(TABLE_CELL_STYLE) " flex gap-4"}
                                {
                                    button
                                        type="button"
                                        class=(BUTTON_SECONDARY_STYLE)
                                        data-action="edit"
                                        data-id=(transaction.id)
                                        data-url=(format_endpoint(endpoints::TRANSACTION_API, transaction.id))
                                    {
                                        "Edit"
                                    }

                                    button
                                        type="button"
                                        class=(BUTTON_DELETE_STYLE)
                                        data-action="delete"
                                        data-id=(transaction.id)
                                        data-url=(format_endpoint(endpoints::TRANSACTION_API, transaction.id))
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
