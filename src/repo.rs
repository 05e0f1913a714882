//! Persistence seam.
//!
//! A [`DbConnection`] hands out [`LedgerTx`] units of work. Every read and
//! write a service performs goes through one `LedgerTx`; nothing is durable
//! until [`LedgerTx::commit`] runs, and dropping the unit of work rolls it
//! back. That is what keeps a transfer's two balance updates and two ledger
//! rows all-or-nothing.

pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::account::model::{Account, NewAccount};
use crate::transaction::model::{NewTransactionRecord, TransactionRecord};
use crate::user::model::User;

#[async_trait]
pub trait DbConnection: Send + Sync {
    type Tx: LedgerTx;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error>;
    fn print_pool_stats(&self);
}

#[async_trait]
pub trait LedgerTx: Send {
    async fn fetch_user_by_id(&mut self, id: i32) -> Result<Option<User>, sqlx::Error>;
    async fn fetch_user_by_user_name(
        &mut self,
        user_name: &str,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn fetch_users(&mut self, take: i64) -> Result<Vec<User>, sqlx::Error>;
    async fn insert_user(&mut self, user: &User) -> Result<i32, sqlx::Error>;
    async fn delete_user(&mut self, id: i32) -> Result<u64, sqlx::Error>;

    async fn fetch_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error>;
    /// Like [`LedgerTx::fetch_account_by_id`], but holds the row until the
    /// unit of work ends where the backend supports row locks.
    async fn lock_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error>;
    async fn fetch_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error>;
    async fn lock_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error>;
    async fn fetch_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error>;
    async fn lock_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error>;
    async fn insert_account(&mut self, account: &NewAccount) -> Result<i32, sqlx::Error>;
    async fn update_balance(
        &mut self,
        account_id: i32,
        balance: Decimal,
    ) -> Result<(), sqlx::Error>;
    /// Removes the account together with its ledger rows.
    async fn delete_account(&mut self, id: i32) -> Result<u64, sqlx::Error>;

    async fn insert_record(&mut self, record: &NewTransactionRecord) -> Result<i32, sqlx::Error>;
    async fn fetch_record(&mut self, id: i32) -> Result<Option<TransactionRecord>, sqlx::Error>;
    async fn fetch_records_by_account(
        &mut self,
        account_id: i32,
    ) -> Result<Vec<TransactionRecord>, sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;
}
