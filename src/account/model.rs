use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub id: i32,
    pub account_number: i32,
    pub name: String,
    pub owner_id: i32,
    pub balance: Decimal,
}

/// An account not yet written to the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_number: i32,
    pub name: String,
    pub owner_id: i32,
    pub balance: Decimal,
}

impl NewAccount {
    pub fn new(account_number: i32, name: &str, owner_id: i32) -> Self {
        Self {
            account_number,
            name: name.to_string(),
            owner_id,
            balance: Decimal::ZERO,
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn into_account(self, id: i32) -> Account {
        Account {
            id,
            account_number: self.account_number,
            name: self.name,
            owner_id: self.owner_id,
            balance: self.balance,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Valid,
    NotFound,
    InvalidAccountName,
    InvalidOwnerId,
}

/// Outcome of deleting a user or an account.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    NotFound,
    /// Something still holds a nonzero balance; nothing was removed.
    FundsRemaining,
}
