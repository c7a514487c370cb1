//! The transaction model, its field types, and the validation of submitted transactions.

use std::{fmt, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, UserID};

/// The database ID of a transaction.
pub type TransactionId = i64;

/// The format of transaction dates, e.g. "2024-01-31".
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Amounts must be strictly less than this.
pub const AMOUNT_LIMIT: i64 = 1_000_000_000_000;

/// The most digits an amount may have after the decimal point.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// The ways reading or writing transactions can fail.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    /// The transaction does not exist or belongs to another user.
    #[error("Transaction not found")]
    NotFound,

    /// The amount is not a positive, finite number.
    #[error("Amount must be a positive number.")]
    InvalidAmount,

    /// The amount is too large or has more than [AMOUNT_DECIMAL_PLACES] decimal places.
    #[error("Amount must be less than 1,000,000,000,000 and have at most 2 decimal places.")]
    AmountOutOfRange,

    /// A required field was left empty, e.g. "Title".
    #[error("{0} is required.")]
    MissingField(&'static str),

    /// The type is neither "income" nor "expense".
    #[error("Type must be either income or expense.")]
    InvalidType,

    /// The date is not a calendar date in the format YYYY-MM-DD.
    #[error("Date must be a valid date in the format YYYY-MM-DD.")]
    InvalidDate,

    /// An infrastructure error occurred while accessing the store.
    #[error(transparent)]
    Internal(#[from] Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            error => StoreError::Internal(error.into()),
        }
    }
}

/// An amount of money, always greater than zero and less than [AMOUNT_LIMIT],
/// with at most [AMOUNT_DECIMAL_PLACES] decimal places.
///
/// Whether the money came in or went out is recorded by [TransactionType].
/// Amounts are exact decimals and are stored as text so that they are never
/// rounded on the way in or out of the database. Within these bounds every
/// amount is also exactly representable as a JSON number, and summing them
/// cannot overflow a [Decimal] in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount from `value`.
    ///
    /// # Errors
    /// Returns a:
    /// - [StoreError::InvalidAmount] if `value` is zero or negative,
    /// - or [StoreError::AmountOutOfRange] if `value` is at least [AMOUNT_LIMIT] or
    ///   has more than [AMOUNT_DECIMAL_PLACES] decimal places.
    pub fn new(value: Decimal) -> Result<Self, StoreError> {
        if value <= Decimal::ZERO {
            return Err(StoreError::InvalidAmount);
        }

        if value >= Decimal::from(AMOUNT_LIMIT) || value.normalize().scale() > AMOUNT_DECIMAL_PLACES
        {
            return Err(StoreError::AmountOutOfRange);
        }

        Ok(Self(value))
    }

    /// The amount as a decimal number.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = StoreError;

    /// Parse plain ("12.34") or scientific ("1.5e2") decimal notation.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();

        let value = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| StoreError::InvalidAmount)?;

        Self::new(value.normalize())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Parsing the decimal text rounds to the nearest float, which prints
        // back as the same digits for any valid amount.
        let value: f64 = self
            .0
            .to_string()
            .parse()
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = deserializer.deserialize_any(NumberOrStringVisitor)?;

        text.parse().map_err(de::Error::custom)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in forms, JSON and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// `amount` with the sign this type has in a balance.
    pub fn signed(&self, amount: Amount) -> Decimal {
        match self {
            TransactionType::Income => amount.as_decimal(),
            TransactionType::Expense => -amount.as_decimal(),
        }
    }
}

impl FromStr for TransactionType {
    type Err = StoreError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(StoreError::InvalidType),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A single income or expense of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// A short name for the transaction, e.g. "Salary".
    pub title: String,
    /// Optional details, empty if none were given.
    pub description: String,
    /// How much money was earned or spent.
    pub amount: Amount,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
}

/// The fields of a transaction that has passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub title: String,
    pub description: String,
    pub amount: Amount,
    pub transaction_type: TransactionType,
    pub date: Date,
}

/// Transaction fields as submitted through the add form or the JSON API.
///
/// Every field is kept as text so that a bad value can be reported back to the
/// user instead of failing the whole request. Missing fields are empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub description: String,
    /// A JSON number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub amount: String,
    #[serde(default, rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub date: String,
}

impl TransactionInput {
    /// Check the submitted fields and convert them into a [NewTransaction].
    ///
    /// # Errors
    /// Returns the first problem found, in field order:
    /// - [StoreError::MissingField] if the title or date is empty,
    /// - [StoreError::InvalidAmount] if the amount is not a positive number,
    /// - [StoreError::InvalidType] if the type is not "income" or "expense",
    /// - [StoreError::InvalidDate] if the date is not formatted as YYYY-MM-DD.
    pub fn validate(&self) -> Result<NewTransaction, StoreError> {
        if self.title.trim().is_empty() {
            return Err(StoreError::MissingField("Title"));
        }

        let amount = self.amount.parse()?;
        let transaction_type = self.transaction_type.parse()?;

        let date = self.date.trim();
        if date.is_empty() {
            return Err(StoreError::MissingField("Date"));
        }
        let date = Date::parse(date, DATE_FORMAT).map_err(|_| StoreError::InvalidDate)?;

        Ok(NewTransaction {
            title: self.title.clone(),
            description: self.description.clone(),
            amount,
            transaction_type,
            date,
        })
    }
}

/// Accept a string, a number or null and keep it as text.
fn deserialize_optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(NumberOrStringVisitor)
}

struct NumberOrStringVisitor;

impl de::Visitor<'_> for NumberOrStringVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    // The shortest representation that reads back as the same float, so 0.1 stays "0.1".
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod amount_tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{AMOUNT_LIMIT, Amount, StoreError, TransactionType};

    #[test]
    fn parses_positive_amounts() {
        for (text, want) in [("100", "100"), ("0.10", "0.1"), (" 12.5 ", "12.5"), ("1e2", "100")] {
            let amount: Amount = text.parse().unwrap();

            assert_eq!(amount.as_decimal(), Decimal::from_str(want).unwrap());
        }
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        for text in ["0", "-5", "", "abc", "NaN", "inf", "1.2.3"] {
            assert_eq!(
                text.parse::<Amount>(),
                Err(StoreError::InvalidAmount),
                "parsing {text:?}"
            );
        }
    }

    #[test]
    fn rejects_amounts_out_of_range() {
        let too_large = AMOUNT_LIMIT.to_string();
        for text in [too_large.as_str(), "5e28", "79228162514264337593543950335", "0.001", "1.005"] {
            assert_eq!(
                text.parse::<Amount>(),
                Err(StoreError::AmountOutOfRange),
                "parsing {text:?}"
            );
        }
    }

    #[test]
    fn accepts_amounts_at_the_bounds() {
        for text in ["0.01", "999999999999.99", "1.50"] {
            assert!(text.parse::<Amount>().is_ok(), "parsing {text:?}");
        }
    }

    #[test]
    fn serializes_largest_amount_exactly() {
        for text in ["999999999999.99", "123456789012.34", "0.01", "0.3"] {
            let amount: Amount = text.parse().unwrap();

            let json = serde_json::to_string(&amount).unwrap();

            assert_eq!(json, text);
            assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), amount);
        }
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_number: Amount = serde_json::from_str("0.1").unwrap();
        let from_string: Amount = serde_json::from_str("\"0.1\"").unwrap();

        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_decimal(), Decimal::from_str("0.1").unwrap());
    }

    #[test]
    fn serializes_as_json_number() {
        let amount: Amount = "12.5".parse().unwrap();

        assert_eq!(serde_json::to_string(&amount).unwrap(), "12.5");
    }

    #[test]
    fn signed_amounts() {
        let amount: Amount = "30".parse().unwrap();

        assert_eq!(TransactionType::Income.signed(amount), Decimal::from(30));
        assert_eq!(TransactionType::Expense.signed(amount), Decimal::from(-30));
    }
}
