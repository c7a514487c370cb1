//! Computes a user's balance from their transactions.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error, UserID,
    transaction::models::{Amount, StoreError, TransactionType},
};

/// Income minus expenses over every transaction of `user_id`, zero if they have none.
///
/// The amounts are summed as exact decimals, never as floats.
///
/// # Errors
/// Returns a [StoreError::Internal] if there is an SQL error, a stored amount is
/// invalid, or the sum does not fit in a [Decimal].
pub fn get_balance(user_id: UserID, connection: &Connection) -> Result<Decimal, StoreError> {
    let mut statement =
        connection.prepare("SELECT amount, type FROM \"transaction\" WHERE user_id = ?1")?;

    statement
        .query_map([user_id], |row| {
            let amount: Amount = row.get(0)?;
            let transaction_type: TransactionType = row.get(1)?;

            Ok(transaction_type.signed(amount))
        })?
        .try_fold(Decimal::ZERO, |balance, amount| add_to_balance(balance, amount?))
}

fn add_to_balance(balance: Decimal, amount: Decimal) -> Result<Decimal, StoreError> {
    balance.checked_add(amount).ok_or_else(|| {
        tracing::error!("Balance overflowed adding {amount} to {balance}");
        StoreError::Internal(Error::AmountOverflow)
    })
}

#[cfg(test)]
mod balance_tests {
    use std::{str::FromStr, sync::Mutex};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error, PasswordHash, UserID,
        app_state::lock_connection,
        auth::create_user,
        db::initialize,
        transaction::{
            core::{create_transaction, delete_transaction},
            models::{NewTransaction, StoreError, TransactionType},
        },
    };

    use super::{add_to_balance, get_balance};

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user_id = create_user("alice", PasswordHash::new_unchecked("hunter2"), &conn)
            .unwrap()
            .id;

        (conn, user_id)
    }

    fn add(
        user_id: UserID,
        amount: &str,
        transaction_type: TransactionType,
        conn: &Connection,
    ) -> i64 {
        let transaction = NewTransaction {
            title: "test".to_owned(),
            description: String::new(),
            amount: amount.parse().unwrap(),
            transaction_type,
            date: date!(2024 - 01 - 01),
        };

        create_transaction(user_id, &transaction, conn).unwrap().id
    }

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn balance_is_zero_without_transactions() {
        let (conn, user_id) = get_test_connection();

        assert_eq!(get_balance(user_id, &conn), Ok(Decimal::ZERO));
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let (conn, user_id) = get_test_connection();
        add(user_id, "100", TransactionType::Income, &conn);
        add(user_id, "30", TransactionType::Expense, &conn);

        assert_eq!(get_balance(user_id, &conn), Ok(dec("70")));
    }

    #[test]
    fn balance_is_exact() {
        let (conn, user_id) = get_test_connection();
        add(user_id, "1.00", TransactionType::Income, &conn);
        for _ in 0..10 {
            add(user_id, "0.10", TransactionType::Expense, &conn);
        }

        assert_eq!(get_balance(user_id, &conn), Ok(Decimal::ZERO));
    }

    #[test]
    fn each_transaction_moves_balance_by_its_amount() {
        let (conn, user_id) = get_test_connection();
        add(user_id, "12.34", TransactionType::Income, &conn);
        let before = get_balance(user_id, &conn).unwrap();

        let id = add(user_id, "0.01", TransactionType::Expense, &conn);
        assert_eq!(get_balance(user_id, &conn), Ok(before - dec("0.01")));

        delete_transaction(id, user_id, &conn).unwrap();
        add(user_id, "7.5", TransactionType::Income, &conn);
        assert_eq!(get_balance(user_id, &conn), Ok(before + dec("7.5")));
    }

    #[test]
    fn balance_only_counts_own_transactions() {
        let (conn, alice) = get_test_connection();
        let bob = create_user("bob", PasswordHash::new_unchecked("hunter2"), &conn)
            .unwrap()
            .id;
        add(alice, "100", TransactionType::Income, &conn);
        add(bob, "40", TransactionType::Expense, &conn);

        assert_eq!(get_balance(alice, &conn), Ok(dec("100")));
        assert_eq!(get_balance(bob, &conn), Ok(dec("-40")));
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        assert_eq!(
            add_to_balance(Decimal::MAX, Decimal::ONE),
            Err(StoreError::Internal(Error::AmountOverflow))
        );
        assert_eq!(
            add_to_balance(Decimal::MIN, -Decimal::ONE),
            Err(StoreError::Internal(Error::AmountOverflow))
        );
        assert_eq!(add_to_balance(Decimal::MAX, -Decimal::ONE), Ok(Decimal::MAX - Decimal::ONE));
    }

    #[test]
    fn huge_stored_amounts_do_not_poison_the_connection() {
        let (conn, user_id) = get_test_connection();
        for _ in 0..2 {
            conn.execute(
                "INSERT INTO \"transaction\" (user_id, title, amount, type, date)
                VALUES (?1, 'huge', '79228162514264337593543950335', 'income', '2024-01-01')",
                [user_id],
            )
            .unwrap();
        }
        let db_connection = Mutex::new(conn);

        let result = get_balance(user_id, &lock_connection(&db_connection).unwrap());

        assert!(
            matches!(result, Err(StoreError::Internal(_))),
            "want an internal error, got {result:?}"
        );
        let conn = lock_connection(&db_connection).expect("the lock should not be poisoned");
        conn.execute("DELETE FROM \"transaction\" WHERE title = 'huge'", [])
            .unwrap();
        add(user_id, "999999999999.99", TransactionType::Income, &conn);
        add(user_id, "999999999999.99", TransactionType::Income, &conn);
        assert_eq!(get_balance(user_id, &conn), Ok(dec("1999999999999.98")));
    }
}
