//! Transactions: the income and expense records of each user.
//!
//! This module contains:
//! - The `Transaction` model with its `Amount` and `TransactionType` field types
//! - Database functions for storing, listing and changing transactions
//! - The balance of a user
//! - The add-transaction and transaction list pages, and the JSON API

mod add_page;
mod api;
mod balance;
mod core;
mod expenses_page;
mod models;
mod view;

pub use add_page::{get_add_transaction_page, post_add_transaction};
pub use api::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use balance::get_balance;
pub use core::{TransactionState, create_transaction_table, list_transactions};
pub use expenses_page::get_expenses_page;
pub use models::{Amount, StoreError, Transaction, TransactionType};

pub(crate) use view::transactions_table;

#[cfg(test)]
pub use core::create_transaction;
#[cfg(test)]
pub use models::NewTransaction;
