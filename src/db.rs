//! Creates and resets the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not exist yet.
///
/// Also enables foreign key enforcement for `connection`.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Drop all application tables and their data, then create them again.
///
/// # Errors
/// Returns an [Error::SqlError] if the tables could not be dropped or created.
pub fn reset(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        "BEGIN EXCLUSIVE;
         DROP TABLE IF EXISTS \"transaction\";
         DROP TABLE IF EXISTS user;
         COMMIT;",
    )?;

    initialize(connection)
}

/// Check whether the application tables already exist.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema could not be queried.
pub fn is_initialized(connection: &Connection) -> Result<bool, Error> {
    let table_count: i64 = connection.query_row(
        "SELECT COUNT(name) FROM sqlite_master
         WHERE type = 'table' AND name IN ('user', 'transaction')",
        [],
        |row| row.get(0),
    )?;

    Ok(table_count > 0)
}
