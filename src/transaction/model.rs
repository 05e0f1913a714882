use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transaction,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Transaction => "Transaction",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown transaction type '{0}'")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deposit" => Ok(TransactionType::Deposit),
            "Withdrawal" => Ok(TransactionType::Withdrawal),
            "Transaction" => Ok(TransactionType::Transaction),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = UnknownTransactionType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One account's balance snapshot right after a money movement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: i32,
    pub receiving_account_number: i32,
    pub sending_account_number: Option<i32>,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub transaction_type: TransactionType,
    pub account_id: i32,
    pub account_balance: Decimal,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTransactionRecord {
    pub receiving_account_number: i32,
    pub sending_account_number: Option<i32>,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub transaction_type: TransactionType,
    pub account_id: i32,
    pub account_balance: Decimal,
    pub message: Option<String>,
}

impl NewTransactionRecord {
    pub fn deposit(
        receiving_account_number: i32,
        amount: Decimal,
        account_id: i32,
        account_balance: Decimal,
        message: Option<String>,
    ) -> Self {
        Self {
            receiving_account_number,
            sending_account_number: None,
            amount,
            timestamp: Utc::now(),
            transaction_type: TransactionType::Deposit,
            account_id,
            account_balance,
            message,
        }
    }

    /// One side of a transfer; `account_id` and `account_balance` belong to
    /// the side being recorded.
    pub fn transfer_side(
        sending_account_number: i32,
        receiving_account_number: i32,
        amount: Decimal,
        account_id: i32,
        account_balance: Decimal,
        message: Option<String>,
    ) -> Self {
        Self {
            receiving_account_number,
            sending_account_number: Some(sending_account_number),
            amount,
            timestamp: Utc::now(),
            transaction_type: TransactionType::Transaction,
            account_id,
            account_balance,
            message,
        }
    }

    pub fn into_record(self, id: i32) -> TransactionRecord {
        TransactionRecord {
            id,
            receiving_account_number: self.receiving_account_number,
            sending_account_number: self.sending_account_number,
            amount: self.amount,
            timestamp: self.timestamp,
            transaction_type: self.transaction_type,
            account_id: self.account_id,
            account_balance: self.account_balance,
            message: self.message,
        }
    }
}

/// Both ledger entries written by a successful transfer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub sender: TransactionRecord,
    pub receiver: TransactionRecord,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Success,
    InvalidAmount,
    InsufficientFunds,
    BankAccountNotFound,
    SameAccount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_text_round_trip() {
        for kind in [
            TransactionType::Deposit,
            TransactionType::Withdrawal,
            TransactionType::Transaction,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionType>().unwrap(), kind);
        }
        assert!("Refund".parse::<TransactionType>().is_err());
    }
}
