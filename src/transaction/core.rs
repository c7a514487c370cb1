//! Defines the transaction table and the queries for storing, listing and changing transactions.
//!
//! Every query is scoped to a user. Reads, updates and deletes of another
//! user's transaction behave exactly like those of a transaction that does
//! not exist.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    AppState, UserID,
    transaction::models::{NewTransaction, StoreError, Transaction, TransactionId},
};

/// The state needed by the transaction pages and API.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                amount TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Listing a user's transactions by date is the most common query.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Store `transaction` for the user `user_id`.
///
/// # Errors
/// Returns a [StoreError::Internal] if there is an SQL error, e.g. `user_id` does not refer to a
/// registered user.
pub fn create_transaction(
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, StoreError> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, title, description, amount, type, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, title, description, amount, type, date",
        )?
        .query_row(
            (
                user_id,
                &transaction.title,
                &transaction.description,
                transaction.amount,
                transaction.transaction_type,
                transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the transactions of `user_id`, newest first.
///
/// Transactions on the same date are listed in the order they were created.
/// At most `limit` transactions are returned if `limit` is set.
///
/// # Errors
/// Returns a [StoreError::Internal] if there is an SQL error.
pub fn list_transactions(
    user_id: UserID,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<Transaction>, StoreError> {
    // A negative limit means no limit in SQLite.
    let limit = limit.map_or(-1, i64::from);

    connection
        .prepare(
            "SELECT id, user_id, title, description, amount, type, date FROM \"transaction\"
             WHERE user_id = ?1
             ORDER BY date DESC, id ASC
             LIMIT ?2",
        )?
        .query_map((user_id, limit), map_transaction_row)?
        .map(|row| row.map_err(StoreError::from))
        .collect()
}

/// Get the transaction `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns a [StoreError::Internal] if there is an SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Transaction>, StoreError> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, title, description, amount, type, date FROM \"transaction\"
             WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id), map_transaction_row)
        .optional()?;

    Ok(transaction)
}

/// Overwrite every field of the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [StoreError::NotFound] if `id` does not refer to a transaction of `user_id`,
/// - or [StoreError::Internal] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<(), StoreError> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET title = ?1, description = ?2, amount = ?3, type = ?4, date = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            &transaction.title,
            &transaction.description,
            transaction.amount,
            transaction.transaction_type,
            transaction.date,
            id,
            user_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(StoreError::NotFound);
    }

    Ok(())
}

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [StoreError::NotFound] if `id` does not refer to a transaction of `user_id`,
/// - or [StoreError::Internal] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), StoreError> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(StoreError::NotFound);
    }

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns `id, user_id, title, description, amount, type, date` in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        transaction_type: row.get(5)?,
        date: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
